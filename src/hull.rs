// Copyright (C) 2023 setzer22 and contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::collections::BTreeSet;

use num_traits::Zero;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::mesh::halfedge::edit_ops::{self, JoinFacesResult};
use crate::prelude::*;

/// The points in the incremental insertion at which the hull engine notifies
/// its observer. The observer receives the current peak vertex (the last
/// vertex added to the hull) and may block to pace the engine, but must not
/// mutate the mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HullPhase {
    InitialTetrahedron,
    AfterJoinFaces,
    AfterInscribeVertex,
    AfterMergeFaces,
    AfterRemoveRedundantVertices,
}

/// Orientation of `point` against the supporting plane of `face`, read from
/// the first three corners of the face cycle. Positive means the face is
/// visible from the point.
pub fn face_point_orientation<P: Position3>(
    mesh: &HalfEdgeMesh<P>,
    face: FaceId,
    point: Point3<P::Scalar>,
) -> P::Scalar {
    let face_ref = mesh.at_face(face);
    let start = face_ref.halfedge();
    let a = start.vertex().end();
    let b = start.next().vertex().end();
    let c = start.next().next().vertex().end();
    orientation(
        mesh.position(a),
        mesh.position(b),
        mesh.position(c),
        point,
    )
}

/// Computes the convex hull of `points`, returning the hull mesh and one of
/// its vertices. Returns `None` when the input has fewer than three distinct,
/// non-collinear points. Coplanar (but not collinear) input produces a flat
/// two-faced polygon.
pub fn compute_convex_hull_3d<P>(points: &[P]) -> Option<(HalfEdgeMesh<P>, VertexId)>
where
    P: Position3 + Clone,
{
    compute_convex_hull_3d_with(points, &mut rand::rng(), |_, _| {})
}

/// Like [`compute_convex_hull_3d`], with an observer notified at every
/// [`HullPhase`] of the incremental insertion.
pub fn compute_convex_hull_3d_with_observer<P, O>(
    points: &[P],
    observer: O,
) -> Option<(HalfEdgeMesh<P>, VertexId)>
where
    P: Position3 + Clone,
    O: FnMut(HullPhase, VertexId),
{
    compute_convex_hull_3d_with(points, &mut rand::rng(), observer)
}

/// The fully parameterized entry point: callers that need reproducible runs
/// pass a seeded RNG for the insertion-order shuffle.
#[profiling::function]
pub fn compute_convex_hull_3d_with<P, R, O>(
    points: &[P],
    rng: &mut R,
    observer: O,
) -> Option<(HalfEdgeMesh<P>, VertexId)>
where
    P: Position3 + Clone,
    R: Rng + ?Sized,
    O: FnMut(HullPhase, VertexId),
{
    hull_impl(points, rng, observer).ok().flatten()
}

fn hull_impl<P, R, O>(
    points: &[P],
    rng: &mut R,
    observer: O,
) -> Result<Option<(HalfEdgeMesh<P>, VertexId)>>
where
    P: Position3 + Clone,
    R: Rng + ?Sized,
    O: FnMut(HullPhase, VertexId),
{
    let zero = P::Scalar::zero();

    // Scan for up to four seed points spanning a proper tetrahedron. Points
    // that don't extend the span accumulate into `remaining`.
    let mut seeds: SVec<P> = SVec::new();
    let mut remaining: Vec<P> = Vec::new();
    for point in points {
        match seeds.len() {
            0 => seeds.push(point.clone()),
            1 => {
                if point.position() != seeds[0].position() {
                    seeds.push(point.clone());
                } else {
                    remaining.push(point.clone());
                }
            }
            2 => {
                if !collinear(seeds[0].position(), seeds[1].position(), point.position()) {
                    seeds.push(point.clone());
                } else {
                    remaining.push(point.clone());
                }
            }
            3 => {
                let side = orientation(
                    seeds[0].position(),
                    seeds[1].position(),
                    seeds[2].position(),
                    point.position(),
                );
                if side == zero {
                    remaining.push(point.clone());
                } else {
                    if side < zero {
                        seeds.swap(0, 1);
                    }
                    seeds.push(point.clone());
                }
            }
            _ => remaining.push(point.clone()),
        }
    }

    match seeds.len() {
        0..=2 => Ok(None),
        3 => planar_hull(points, &seeds).map(Some),
        _ => incremental_hull(seeds, remaining, rng, observer).map(Some),
    }
}

/// 2D convex hull (monotone chains) for input that is coplanar but not
/// collinear. The seed triple fixes the working plane and its normal fixes
/// what "left turn" means.
fn planar_hull<P>(points: &[P], seeds: &[P]) -> Result<(HalfEdgeMesh<P>, VertexId)>
where
    P: Position3 + Clone,
{
    let zero = P::Scalar::zero();
    let normal = vector_product(
        seeds[1].position() - seeds[0].position(),
        seeds[2].position() - seeds[0].position(),
    );

    let mut sorted: Vec<P> = points.to_vec();
    sorted.sort_by(|a, b| a.position().lexicographic_cmp(&b.position()));
    sorted.dedup_by(|a, b| a.position() == b.position());

    let turns_left = |a: &P, b: &P, c: &P| {
        scalar_product(
            vector_product(b.position() - a.position(), c.position() - b.position()),
            normal,
        ) > zero
    };

    fn build_chain<'a, P: Clone + 'a>(
        points: impl Iterator<Item = &'a P>,
        turns_left: impl Fn(&P, &P, &P) -> bool,
    ) -> Vec<P> {
        let mut chain: Vec<P> = vec![];
        for p in points {
            while chain.len() >= 2 && !turns_left(&chain[chain.len() - 2], &chain[chain.len() - 1], p)
            {
                chain.pop();
            }
            chain.push(p.clone());
        }
        chain
    }

    let mut cycle = build_chain(sorted.iter(), &turns_left);
    let mut upper = build_chain(sorted.iter().rev(), &turns_left);
    // Chain endpoints coincide; drop one copy of each
    cycle.pop();
    upper.pop();
    cycle.extend(upper);

    let mut mesh = HalfEdgeMesh::new();
    let face = halfedge::primitives::make_polygon(&mut mesh, &cycle)?;
    let vertex = mesh.at_face(face).halfedge().vertex().try_end()?;
    Ok((mesh, vertex))
}

fn incremental_hull<P, R, O>(
    seeds: SVec<P>,
    mut remaining: Vec<P>,
    rng: &mut R,
    mut observer: O,
) -> Result<(HalfEdgeMesh<P>, VertexId)>
where
    P: Position3 + Clone,
    R: Rng + ?Sized,
    O: FnMut(HullPhase, VertexId),
{
    let zero = P::Scalar::zero();
    let mut mesh = HalfEdgeMesh::new();

    let mut seeds = seeds.into_iter();
    let (s0, s1, s2, s3) = seeds
        .next_tuple()
        .ok_or_else(|| anyhow!("incremental hull needs four seed points"))?;

    let base = halfedge::primitives::make_triangle(&mut mesh, s0, s1, s2)?;
    let mut peak = edit_ops::inscribe_vertex(&mut mesh, base, s3)?;
    observer(HullPhase::InitialTetrahedron, peak);

    // Randomizing the insertion order is what makes the total conflict work
    // expected-linear
    remaining.shuffle(rng);

    let mut conflicts = ConflictGraph::new(remaining.len());
    let initial_faces = {
        let spokes = mesh.at_vertex(peak).outgoing_halfedges()?;
        let mut faces: Vec<FaceId> = spokes
            .iter()
            .map(|&h| mesh.at_halfedge(h).face().try_end())
            .collect::<Result<_, _>>()?;
        // The base triangle sits across the ring edge of any peak triangle
        faces.push(mesh.at_halfedge(spokes[0]).next().twin().face().try_end()?);
        faces
    };
    for &face in &initial_faces {
        for (idx, point) in remaining.iter().enumerate() {
            if face_point_orientation(&mesh, face, point.position()) > zero {
                conflicts.link(idx, face);
            }
        }
    }

    for point_idx in 0..remaining.len() {
        let visible = conflicts.visible_faces(point_idx);
        if visible.is_empty() {
            // The point lies inside the current hull
            continue;
        }
        let point = remaining[point_idx].clone();

        let join = edit_ops::join_faces(&mut mesh, &visible)?;
        if !mesh.vertex_exists(peak) {
            // The previous peak was interior to the joined region
            peak = mesh.at_halfedge(join.border_edges[0]).vertex().try_end()?;
        }
        observer(HullPhase::AfterJoinFaces, peak);

        let border_vertices: Vec<VertexId> = join
            .border_edges
            .iter()
            .map(|&e| mesh.at_halfedge(e).vertex().try_end())
            .collect::<Result<_, _>>()?;

        peak = edit_ops::inscribe_vertex(&mut mesh, join.new_face, point)?;
        observer(HullPhase::AfterInscribeVertex, peak);

        merge_coplanar_faces(
            &mut mesh,
            &mut conflicts,
            &remaining,
            point_idx,
            peak,
            &join,
            &border_vertices,
        )?;
        observer(HullPhase::AfterMergeFaces, peak);

        // The joined faces leave the conflict graph
        for &face in &visible {
            conflicts.drop_face(face);
        }

        // Border vertices sandwiched between two merged coplanar faces have
        // degree 2 now and are interior to the merged plane
        for &v in &border_vertices {
            if mesh.vertex_exists(v) {
                edit_ops::remove_redundant_vertex(&mut mesh, v)?;
            }
        }
        observer(HullPhase::AfterRemoveRedundantVertices, peak);

        #[cfg(debug_assertions)]
        conflicts.assert_symmetric();
    }

    Ok((mesh, peak))
}

struct Rim {
    spoke: HalfEdgeId,
    border_edge: HalfEdgeId,
    /// Conflict-list source: the joined face this border edge belonged to
    owner: FaceId,
    /// The live neighbor across the border edge at inscription time
    across: FaceId,
    coplanar: bool,
}

/// Coplanar-face merging after a vertex inscription (the degenerate-input
/// half of the hull algorithm). Every new triangle coplanar with its border
/// neighbor is dissolved into it; the surviving new triangles get their
/// conflict lists, sourced from the two old faces that flanked their border
/// edge.
fn merge_coplanar_faces<P>(
    mesh: &mut HalfEdgeMesh<P>,
    conflicts: &mut ConflictGraph,
    remaining: &[P],
    point_idx: usize,
    peak: VertexId,
    join: &JoinFacesResult,
    border_vertices: &[VertexId],
) -> Result<()>
where
    P: Position3 + Clone,
{
    let zero = P::Scalar::zero();

    let spokes = mesh.at_vertex(peak).outgoing_halfedges()?;
    let d = spokes.len();
    debug_assert_eq!(d, join.border_edges.len());

    let mut rims = Vec::with_capacity(d);
    for (j, &spoke) in spokes.iter().enumerate() {
        let border_edge = mesh.at_halfedge(spoke).next().try_end()?;
        debug_assert_eq!(border_edge, join.border_edges[j]);

        let across = mesh.at_halfedge(border_edge).twin().face().try_end()?;
        // The neighbor's vertex adjacent to the shared edge; it fixes the
        // neighbor's plane together with the edge endpoints
        let opposite = mesh
            .at_halfedge(border_edge)
            .twin()
            .next()
            .dst_vertex()
            .try_end()?;
        let triangle = mesh.at_halfedge(spoke).face().try_end()?;
        let coplanar = face_point_orientation(mesh, triangle, mesh.position(opposite)) == zero;

        rims.push(Rim {
            spoke,
            border_edge,
            owner: join.border_faces[j],
            across,
            coplanar,
        });
    }

    // First pass: two consecutive coplanar triangles over the same neighbor
    // enclose a spoke lying inside the shared plane. Collapse it, leaving the
    // run's interior border vertices at degree 2.
    let mut skip = vec![false; d];
    for j in 0..d {
        let jn = (j + 1) % d;
        if rims[j].coplanar
            && rims[jn].coplanar
            && rims[j].across == rims[jn].across
            && !skip[jn]
        {
            skip[jn] = true;
            edit_ops::remove_edge(mesh, rims[jn].spoke)?;
        }
    }

    // Second pass: dissolve each coplanar run into its neighbor, and compute
    // conflicts for the triangles that stay
    for j in 0..d {
        if skip[j] {
            continue;
        }
        if rims[j].coplanar {
            // Interior run vertices sit between two border edges of the same
            // plane; merge those edges pairwise until one bridge remains
            let mut m = (j + 1) % d;
            while skip[m] {
                edit_ops::remove_redundant_vertex(mesh, border_vertices[m])?.ok_or_else(|| {
                    anyhow!("coplanar run vertex was expected to have degree 2")
                })?;
                m = (m + 1) % d;
            }

            let bridge = mesh.at_halfedge(rims[j].spoke).next().try_end()?;
            let target = mesh.at_halfedge(bridge).twin().face().try_end()?;
            let merged = edit_ops::remove_edge(mesh, bridge)?;
            // The merged face extends the neighbor inside its own plane, so
            // it inherits the neighbor's conflicts unchanged
            conflicts.transfer_face(target, merged);
        } else {
            // A conflict of the new triangle must have been a conflict of one
            // of the two old faces flanking its border edge; anything else
            // could not see past them. This is what keeps the total conflict
            // work bounded.
            let triangle = mesh.at_halfedge(rims[j].spoke).face().try_end()?;
            let across_live = mesh.at_halfedge(rims[j].border_edge).twin().face().try_end()?;

            let mut candidates: Vec<usize> = conflicts
                .points_of(rims[j].owner)
                .iter()
                .chain(conflicts.points_of(across_live).iter())
                .copied()
                .filter(|&q| q > point_idx)
                .collect();
            candidates.sort_unstable();
            candidates.dedup();

            for q in candidates {
                if face_point_orientation(mesh, triangle, remaining[q].position()) > zero {
                    conflicts.link(q, triangle);
                }
            }
        }
    }

    Ok(())
}

/// Bipartite bookkeeping between unprocessed points and current hull faces:
/// a point is linked to every face it can see. The face side keys on the
/// versioned face ids, so it stays valid for faces the mesh has already
/// consumed until they are explicitly dropped.
struct ConflictGraph {
    faces_of_point: Vec<BTreeSet<FaceId>>,
    points_of_face: HashMap<FaceId, Vec<usize>>,
}

impl ConflictGraph {
    fn new(num_points: usize) -> Self {
        Self {
            faces_of_point: vec![BTreeSet::new(); num_points],
            points_of_face: HashMap::new(),
        }
    }

    fn link(&mut self, point: usize, face: FaceId) {
        self.faces_of_point[point].insert(face);
        self.points_of_face.entry(face).or_default().push(point);
    }

    /// The faces `point` sees, in deterministic (id) order.
    fn visible_faces(&self, point: usize) -> Vec<FaceId> {
        self.faces_of_point[point].iter().copied().collect()
    }

    fn points_of(&self, face: FaceId) -> &[usize] {
        self.points_of_face
            .get(&face)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn drop_face(&mut self, face: FaceId) {
        if let Some(points) = self.points_of_face.remove(&face) {
            for point in points {
                self.faces_of_point[point].remove(&face);
            }
        }
    }

    /// Moves `from`'s conflict list onto `to`, rewriting the point side.
    fn transfer_face(&mut self, from: FaceId, to: FaceId) {
        if let Some(points) = self.points_of_face.remove(&from) {
            for &point in &points {
                let faces = &mut self.faces_of_point[point];
                faces.remove(&from);
                faces.insert(to);
            }
            self.points_of_face.insert(to, points);
        }
    }

    #[cfg(debug_assertions)]
    fn assert_symmetric(&self) {
        for (face, points) in &self.points_of_face {
            for &point in points {
                debug_assert!(
                    self.faces_of_point[point].contains(face),
                    "conflict graph asymmetry: face {face:?} lists point {point}"
                );
            }
        }
        for (point, faces) in self.faces_of_point.iter().enumerate() {
            for face in faces {
                debug_assert!(
                    self.points_of_face
                        .get(face)
                        .is_some_and(|pts| pts.contains(&point)),
                    "conflict graph asymmetry: point {point} lists face {face:?}"
                );
            }
        }
    }
}
