// Copyright (C) 2023 setzer22 and contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::*;

/// Builds a closed polygon with one vertex per payload, visited in the given
/// order by the inner face. The outer face holds the twin halfedges, so the
/// result is a closed two-faced 2-manifold. Returns the inner face.
///
/// Fails when given fewer than three payloads.
pub fn make_polygon<T: Clone>(mesh: &mut HalfEdgeMesh<T>, data: &[T]) -> Result<FaceId> {
    let degree = data.len();
    if degree < 3 {
        bail!("Cannot build polygons with fewer than three vertices");
    }

    let inner_face = mesh.alloc_face(None);
    let outer_face = mesh.alloc_face(None);

    let vertices: SVec<VertexId> = data
        .iter()
        .map(|payload| mesh.alloc_vertex(payload.clone(), None))
        .collect();
    let forward: SVec<HalfEdgeId> = (0..degree)
        .map(|_| mesh.alloc_halfedge(HalfEdge::default()))
        .collect();
    let backward: SVec<HalfEdgeId> = (0..degree)
        .map(|_| mesh.alloc_halfedge(HalfEdge::default()))
        .collect();

    for i in 0..degree {
        let i_prev = if i == 0 { degree - 1 } else { i - 1 };
        let i_next = if i == degree - 1 { 0 } else { i + 1 };

        mesh[vertices[i]].halfedge = Some(forward[i]);

        mesh[forward[i]].vertex = Some(vertices[i]);
        mesh[backward[i]].vertex = Some(vertices[i_next]);

        mesh[forward[i]].twin = Some(backward[i]);
        mesh[backward[i]].twin = Some(forward[i]);

        mesh[forward[i]].next = Some(forward[i_next]);
        mesh[backward[i]].next = Some(backward[i_prev]);

        mesh[forward[i]].prev = Some(forward[i_prev]);
        mesh[backward[i]].prev = Some(backward[i_next]);

        mesh[forward[i]].face = Some(inner_face);
        mesh[backward[i]].face = Some(outer_face);
    }

    mesh[inner_face].halfedge = Some(forward[0]);
    mesh[outer_face].halfedge = Some(backward[0]);

    Ok(inner_face)
}

/// Builds a triangle. See [`make_polygon`].
pub fn make_triangle<T: Clone>(mesh: &mut HalfEdgeMesh<T>, a: T, b: T, c: T) -> Result<FaceId> {
    make_polygon(mesh, &[a, b, c])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn polygon_needs_three_vertices() {
        let mut mesh = HalfEdgeMesh::<i32>::new();
        assert!(make_polygon(&mut mesh, &[1, 2]).is_err());
    }

    #[test]
    fn triangle_has_three_edges() {
        let mut mesh = HalfEdgeMesh::new();
        let f = make_triangle(&mut mesh, 0, 1, 2).unwrap();
        assert_eq!(mesh.face_edges(f).len(), 3);
        assert_eq!(mesh.num_halfedges(), 6);
        assert_eq!(mesh.num_faces(), 2);
    }

    #[test]
    fn polygon_cycles_are_consistent() {
        let mut mesh = HalfEdgeMesh::new();
        let f = make_polygon(&mut mesh, &[0, 1, 2, 3, 4]).unwrap();

        let edges = mesh.face_edges(f);
        assert_eq!(edges.len(), 5);
        for &e in &edges {
            assert_eq!(mesh.at_halfedge(e).twin().twin().end(), e);
            assert_eq!(mesh.at_halfedge(e).next().previous().end(), e);
            assert_eq!(mesh.at_halfedge(e).previous().next().end(), e);
        }

        // The inner cycle visits payloads in input order
        let labels: Vec<i32> = mesh
            .face_vertices(f)
            .iter()
            .map(|&v| *mesh.payload(v))
            .collect();
        assert_eq!(labels, vec![0, 1, 2, 3, 4]);

        // The outer face has the same degree, reversed orientation
        let outer = mesh.at_face(f).halfedge().twin().face().end();
        assert_eq!(mesh.face_edges(outer).len(), 5);
    }
}
