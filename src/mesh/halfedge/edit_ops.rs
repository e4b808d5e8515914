// Copyright (C) 2023 setzer22 and contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::prelude::*;

/// Everything `join_faces` consumed or created. The vectors run parallel:
/// `border_faces[i]` is the face `border_edges[i]` bounded before the join,
/// which callers use to look up bookkeeping keyed by the consumed faces.
#[derive(Debug, Clone)]
pub struct JoinFacesResult {
    pub new_face: FaceId,
    pub border_edges: Vec<HalfEdgeId>,
    pub border_faces: Vec<FaceId>,
    pub removed_edges: Vec<HalfEdgeId>,
    pub removed_vertices: Vec<VertexId>,
}

/// Adds a new vertex inside `old_face` and connects it to every vertex of the
/// face boundary, replacing the degree-d face with d triangles. `old_face` is
/// consumed. The new vertex's halfedge points toward the origin of
/// `old_face`'s stored halfedge.
pub fn inscribe_vertex<T>(
    mesh: &mut HalfEdgeMesh<T>,
    old_face: FaceId,
    payload: T,
) -> Result<VertexId> {
    if !mesh.face_exists(old_face) {
        bail!("inscribe_vertex: face {old_face:?} is stale");
    }
    let edges = mesh.face_edges(old_face);
    let degree = edges.len();
    debug_assert!(degree >= 3, "inscribe_vertex requires a face of degree 3+");

    let new_vertex = mesh.alloc_vertex(payload, None);
    let from: SVec<HalfEdgeId> = (0..degree)
        .map(|_| mesh.alloc_halfedge(HalfEdge::default()))
        .collect();
    let to: SVec<HalfEdgeId> = (0..degree)
        .map(|_| mesh.alloc_halfedge(HalfEdge::default()))
        .collect();
    let faces: SVec<FaceId> = (0..degree).map(|_| mesh.alloc_face(None)).collect();

    for i in 0..degree {
        let i_prev = if i == 0 { degree - 1 } else { i - 1 };
        let i_next = if i == degree - 1 { 0 } else { i + 1 };

        let origin = mesh.at_halfedge(edges[i]).vertex().try_end()?;

        mesh[from[i]].twin = Some(to[i]);
        mesh[to[i]].twin = Some(from[i]);

        mesh[from[i]].vertex = Some(new_vertex);
        mesh[to[i]].vertex = Some(origin);

        mesh[from[i]].next = Some(edges[i]);
        mesh[from[i]].prev = Some(to[i_next]);
        mesh[to[i]].next = Some(from[i_prev]);
        mesh[to[i]].prev = Some(edges[i_prev]);

        mesh[from[i]].face = Some(faces[i]);
        mesh[to[i]].face = Some(faces[i_prev]);

        mesh[faces[i]].halfedge = Some(from[i]);

        mesh[edges[i]].next = Some(to[i_next]);
        mesh[edges[i]].prev = Some(from[i]);
        mesh[edges[i]].face = Some(faces[i]);
    }

    mesh[new_vertex].halfedge = Some(from[0]);
    mesh.remove_face(old_face);

    Ok(new_vertex)
}

/// Removes the undirected edge of `h`, merging its two incident faces into a
/// new one. Both halfedges and both faces are consumed. The endpoints keep
/// valid halfedge pointers that skip the removed edge.
///
/// The incident faces must be distinct and neither endpoint may have degree
/// 2, or the result would contain a dangling vertex.
pub fn remove_edge<T>(mesh: &mut HalfEdgeMesh<T>, h: HalfEdgeId) -> Result<FaceId> {
    let t = mesh.at_halfedge(h).twin().try_end()?;
    let u = mesh.at_halfedge(h).vertex().try_end()?;
    let v = mesh.at_halfedge(t).vertex().try_end()?;

    let h_next = mesh.at_halfedge(h).next().try_end()?;
    let h_prev = mesh.at_halfedge(h).previous().try_end()?;
    let t_next = mesh.at_halfedge(t).next().try_end()?;
    let t_prev = mesh.at_halfedge(t).previous().try_end()?;

    let f_h = mesh.at_halfedge(h).face().try_end()?;
    let f_t = mesh.at_halfedge(t).face().try_end()?;

    debug_assert!(f_h != f_t, "remove_edge requires two distinct incident faces");
    #[cfg(debug_assertions)]
    {
        let deg_u = mesh.at_vertex(u).outgoing_halfedges()?.len();
        let deg_v = mesh.at_vertex(v).outgoing_halfedges()?.len();
        debug_assert!(
            deg_u > 2 && deg_v > 2,
            "remove_edge would leave a dangling vertex"
        );
    }

    let upper_edges = mesh.face_edges(f_h);
    let lower_edges = mesh.face_edges(f_t);

    let new_face = mesh.alloc_face(Some(h_next));
    for e in upper_edges.iter_cpy().chain(lower_edges.iter_cpy()) {
        mesh[e].face = Some(new_face);
    }

    mesh[h_prev].next = Some(t_next);
    mesh[t_next].prev = Some(h_prev);
    mesh[t_prev].next = Some(h_next);
    mesh[h_next].prev = Some(t_prev);

    // t_next exits u and h_next exits v, so both endpoints stay anchored
    mesh[u].halfedge = Some(t_next);
    mesh[v].halfedge = Some(h_next);

    mesh.remove_halfedge(h);
    mesh.remove_halfedge(t);
    mesh.remove_face(f_h);
    mesh.remove_face(f_t);

    Ok(new_face)
}

/// Joins a set of faces sharing one connected outside border into a single
/// face. Everything strictly inside the border (edges between two input
/// faces, vertices surrounded by input faces) is consumed, as are the input
/// faces themselves. The behavior is undefined when the faces do not share a
/// single connected outside border.
///
/// The border ordering is deterministic: the walk starts at the first
/// halfedge of the first input face whose twin lies outside the set.
pub fn join_faces<T>(mesh: &mut HalfEdgeMesh<T>, faces: &[FaceId]) -> Result<JoinFacesResult> {
    if faces.is_empty() {
        bail!("join_faces: no faces to join");
    }

    let cycles: Vec<SVec<HalfEdgeId>> = faces.iter().map(|&f| mesh.face_edges(f)).collect();

    // Clear tags on all halfedges of the input faces, their twins, and their
    // origin vertices. Only these tags are read below, so no global reset is
    // needed.
    for cycle in &cycles {
        for &e in cycle {
            let twin = mesh.at_halfedge(e).twin().try_end()?;
            let origin = mesh.at_halfedge(e).vertex().try_end()?;
            mesh[e].tag = 0;
            mesh[twin].tag = 0;
            mesh[origin].tag = 0;
        }
    }

    // Mark membership
    for cycle in &cycles {
        for &e in cycle {
            mesh[e].tag = 1;
        }
    }

    // A member halfedge whose twin is unmarked lies on the outside border
    let mut start = None;
    'search: for cycle in &cycles {
        for &e in cycle {
            let twin = mesh.at_halfedge(e).twin().try_end()?;
            if mesh[twin].tag == 0 {
                start = Some(e);
                break 'search;
            }
        }
    }
    let start = start.ok_or_else(|| anyhow!("join_faces: faces have no outside border"))?;

    // Walk the border: step to the next edge, then rotate around its origin
    // until another border edge shows up
    let mut border_edges = vec![];
    let mut border_faces = vec![];
    let mut curr = start;
    let mut count = 0;
    loop {
        if count > MAX_LOOP_ITERATIONS {
            panic!("Max number of iterations reached. Is the mesh malformed?");
        }
        count += 1;

        curr = mesh.at_halfedge(curr).next().try_end()?;
        let mut rotations = 0;
        loop {
            if rotations > MAX_LOOP_ITERATIONS {
                panic!("Max number of iterations reached. Is the mesh malformed?");
            }
            rotations += 1;

            let twin = mesh.at_halfedge(curr).twin().try_end()?;
            if mesh[twin].tag == 0 {
                break;
            }
            curr = mesh.at_halfedge(twin).next().try_end()?;
        }
        border_edges.push(curr);
        border_faces.push(mesh.at_halfedge(curr).face().try_end()?);
        if curr == start {
            break;
        }
    }

    // Border origins survive; any origin still unmarked is interior
    for &e in &border_edges {
        let origin = mesh.at_halfedge(e).vertex().try_end()?;
        mesh[origin].tag = 1;
    }

    let mut removed_edges = vec![];
    let mut removed_vertices = vec![];
    let mut seen_vertices = HashSet::new();
    for cycle in &cycles {
        for &e in cycle {
            let twin = mesh.at_halfedge(e).twin().try_end()?;
            if mesh[twin].tag == 1 {
                removed_edges.push(e);
            }
            let origin = mesh.at_halfedge(e).vertex().try_end()?;
            if mesh[origin].tag == 0 && seen_vertices.insert(origin) {
                removed_vertices.push(origin);
            }
        }
    }

    for &e in &removed_edges {
        mesh.remove_halfedge(e);
    }
    for &v in &removed_vertices {
        mesh.remove_vertex(v);
    }
    for &f in faces {
        mesh.remove_face(f);
    }

    // Wire the border cycle to the replacement face
    let new_face = mesh.alloc_face(Some(border_edges[0]));
    let n = border_edges.len();
    for i in 0..n {
        let i_prev = if i == 0 { n - 1 } else { i - 1 };
        let i_next = if i == n - 1 { 0 } else { i + 1 };
        let e = border_edges[i];
        let origin = mesh.at_halfedge(e).vertex().try_end()?;
        mesh[e].face = Some(new_face);
        mesh[e].next = Some(border_edges[i_next]);
        mesh[e].prev = Some(border_edges[i_prev]);
        mesh[origin].halfedge = Some(e);
    }

    Ok(JoinFacesResult {
        new_face,
        border_edges,
        border_faces,
        removed_edges,
        removed_vertices,
    })
}

/// Dissolves a degree-2 vertex, replacing its two edges with a single edge
/// bridging its two neighbors. The new halfedges inherit the incident faces
/// of the old ones. Returns the new halfedge lying on the same face as the
/// vertex's stored halfedge, or `None` (without mutating anything) when the
/// vertex does not have degree exactly 2.
pub fn remove_redundant_vertex<T>(
    mesh: &mut HalfEdgeMesh<T>,
    v: VertexId,
) -> Result<Option<HalfEdgeId>> {
    let outgoing = mesh.at_vertex(v).outgoing_halfedges()?;
    if outgoing.len() != 2 {
        return Ok(None);
    }

    let out_a = outgoing[0];
    let out_b = outgoing[1];
    let in_a = mesh.at_halfedge(out_a).twin().try_end()?; // p -> v
    let in_b = mesh.at_halfedge(out_b).twin().try_end()?; // q -> v
    let p = mesh.at_halfedge(in_a).vertex().try_end()?;
    let q = mesh.at_halfedge(in_b).vertex().try_end()?;

    debug_assert!(p != q, "remove_redundant_vertex on a doubled edge");
    debug_assert_eq!(mesh.at_halfedge(in_a).next().end(), out_b);
    debug_assert_eq!(mesh.at_halfedge(in_b).next().end(), out_a);

    // f1 is the face along p -> v -> q, f2 the one along q -> v -> p
    let f1 = mesh.at_halfedge(in_a).face().try_end()?;
    let f2 = mesh.at_halfedge(in_b).face().try_end()?;

    let in_a_prev = mesh.at_halfedge(in_a).previous().try_end()?;
    let out_b_next = mesh.at_halfedge(out_b).next().try_end()?;
    let in_b_prev = mesh.at_halfedge(in_b).previous().try_end()?;
    let out_a_next = mesh.at_halfedge(out_a).next().try_end()?;

    // The face the caller's return value is anchored to
    let rep_face = mesh.at_halfedge(out_a).face().try_end()?;

    let h_pq = mesh.alloc_halfedge(HalfEdge::default());
    let h_qp = mesh.alloc_halfedge(HalfEdge::default());

    mesh[h_pq].twin = Some(h_qp);
    mesh[h_qp].twin = Some(h_pq);
    mesh[h_pq].vertex = Some(p);
    mesh[h_qp].vertex = Some(q);
    mesh[h_pq].face = Some(f1);
    mesh[h_qp].face = Some(f2);
    mesh[h_pq].next = Some(out_b_next);
    mesh[h_pq].prev = Some(in_a_prev);
    mesh[h_qp].next = Some(out_a_next);
    mesh[h_qp].prev = Some(in_b_prev);

    mesh[in_a_prev].next = Some(h_pq);
    mesh[out_b_next].prev = Some(h_pq);
    mesh[in_b_prev].next = Some(h_qp);
    mesh[out_a_next].prev = Some(h_qp);

    // Faces and endpoints may point at the halfedges we are about to remove
    if mesh[f1].halfedge == Some(in_a) || mesh[f1].halfedge == Some(out_b) {
        mesh[f1].halfedge = Some(h_pq);
    }
    if mesh[f2].halfedge == Some(in_b) || mesh[f2].halfedge == Some(out_a) {
        mesh[f2].halfedge = Some(h_qp);
    }
    if mesh[p].halfedge == Some(in_a) {
        mesh[p].halfedge = Some(h_pq);
    }
    if mesh[q].halfedge == Some(in_b) {
        mesh[q].halfedge = Some(h_qp);
    }

    mesh.remove_halfedge(out_a);
    mesh.remove_halfedge(out_b);
    mesh.remove_halfedge(in_a);
    mesh.remove_halfedge(in_b);
    mesh.remove_vertex(v);

    Ok(Some(if rep_face == f1 { h_pq } else { h_qp }))
}
