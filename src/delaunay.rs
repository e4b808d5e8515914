// Copyright (C) 2023 setzer22 and contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use num_traits::{One, Zero};

use crate::hull::compute_convex_hull_3d;
use crate::mesh::halfedge::edit_ops;
use crate::prelude::*;

/// The vertex payload of a triangulation mesh: the lifted input point with
/// its original index as label.
pub type TriangulationPoint<F> = LabeledPoint<F, usize>;

/// Whether `face`'s outward normal points strictly downward.
pub fn face_directed_down<P: Position3>(mesh: &HalfEdgeMesh<P>, face: FaceId) -> bool {
    let zero = P::Scalar::zero();
    let face_ref = mesh.at_face(face);
    let start = face_ref.halfedge();
    let p0 = mesh.position(start.vertex().end());
    let p1 = mesh.position(start.next().vertex().end());
    let p2 = mesh.position(start.next().next().vertex().end());
    let z_plus = Point3::new(zero, zero, P::Scalar::one());
    determinant(p1 - p0, p2 - p0, z_plus) < zero
}

/// Computes the Delaunay triangulation of `points` by lifting them onto the
/// paraboloid `z = x² + y²` and taking the lower envelope of their 3D convex
/// hull. Returns the triangulation mesh together with its outer (unbounded)
/// face; the remaining faces are the Delaunay cells, labeled with the input
/// indices. Returns `None` for fewer than three distinct points or collinear
/// input.
///
/// Faces whose normal is exactly vertical belong to the boundary of the
/// lower envelope (they appear when boundary points are concyclic), so they
/// are folded into the outer face along with the upward ones.
#[profiling::function]
pub fn delaunay_triangulation<F: Scalar>(
    points: &[Point2<F>],
) -> Option<(HalfEdgeMesh<TriangulationPoint<F>>, FaceId)> {
    let lifted: Vec<TriangulationPoint<F>> = points
        .iter()
        .enumerate()
        .map(|(i, p)| LabeledPoint {
            position: Point3::new(p.x, p.y, p.x * p.x + p.y * p.y),
            label: i,
        })
        .collect();

    let (mut mesh, vertex) = compute_convex_hull_3d(&lifted)?;

    let mut seen = HashSet::new();
    let mut upper_faces = vec![];
    for e in explore_graph(&mesh, vertex) {
        let face = mesh.at_halfedge(e).face().end();
        if seen.insert(face) && !face_directed_down(&mesh, face) {
            upper_faces.push(face);
        }
    }

    let join = edit_ops::join_faces(&mut mesh, &upper_faces).ok()?;
    Some((mesh, join.new_face))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::halfedge::primitives::make_polygon;

    #[test]
    fn downward_test_matches_normals() {
        let mut mesh = HalfEdgeMesh::new();
        let up = make_polygon(
            &mut mesh,
            &[
                Point3::new(0, 0, 0),
                Point3::new(10, 0, 0),
                Point3::new(10, 0, 10),
            ],
        )
        .unwrap();
        // Vertical face: not downward
        assert!(!face_directed_down(&mesh, up));

        let mut mesh = HalfEdgeMesh::new();
        let tilted_up = make_polygon(
            &mut mesh,
            &[
                Point3::new(0, 0, 0),
                Point3::new(10, 0, 0),
                Point3::new(10, 1, 10),
            ],
        )
        .unwrap();
        assert!(!face_directed_down(&mesh, tilted_up));

        let mut mesh = HalfEdgeMesh::new();
        let tilted_down = make_polygon(
            &mut mesh,
            &[
                Point3::new(0, 0, 0),
                Point3::new(10, 0, 0),
                Point3::new(10, -1, 10),
            ],
        )
        .unwrap();
        assert!(face_directed_down(&mesh, tilted_down));
    }
}
