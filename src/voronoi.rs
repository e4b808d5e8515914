// Copyright (C) 2023 setzer22 and contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use num_traits::One;
use serde::{Deserialize, Serialize};

use crate::delaunay::delaunay_triangulation;
use crate::prelude::*;

/// A Voronoi vertex. Unbounded cells are closed off with directions instead
/// of positions: when `at_infinity` is set, `(x, y)` is a direction vector
/// (not normalized, so integer scalars stay exact) pointing out of the
/// diagram.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VoronoiPoint<F> {
    pub x: F,
    pub y: F,
    pub at_infinity: bool,
}

/// A Voronoi edge, as two indices into [`VoronoiDiagram::points`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoronoiEdge {
    pub u: usize,
    pub v: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VoronoiDiagram<F> {
    pub points: Vec<VoronoiPoint<F>>,
    pub edges: Vec<VoronoiEdge>,
}

/// Circumcenter of the triangle spanned by the first three corners of
/// `face`, in the xy-plane. For faces of higher degree (coplanar-merged
/// cells, which are concyclic by construction) any three corners give the
/// same center.
fn circumcenter<P: Position3>(mesh: &HalfEdgeMesh<P>, face: FaceId) -> VoronoiPoint<P::Scalar> {
    let two = P::Scalar::one() + P::Scalar::one();
    let face_ref = mesh.at_face(face);
    let start = face_ref.halfedge();
    let a = mesh.position(start.vertex().end());
    let b = mesh.position(start.next().vertex().end());
    let c = mesh.position(start.next().next().vertex().end());

    let d = two * (a.x * (b.y - c.y) + b.x * (c.y - a.y) + c.x * (a.y - b.y));
    let a2 = a.x * a.x + a.y * a.y;
    let b2 = b.x * b.x + b.y * b.y;
    let c2 = c.x * c.x + c.y * c.y;

    VoronoiPoint {
        x: (a2 * (b.y - c.y) + b2 * (c.y - a.y) + c2 * (a.y - b.y)) / d,
        y: (a2 * (c.x - b.x) + b2 * (a.x - c.x) + c2 * (b.x - a.x)) / d,
        at_infinity: false,
    }
}

/// Builds the Voronoi diagram dual to a Delaunay triangulation: one vertex
/// per internal face (the circumcenter), one point at infinity per outer-face
/// halfedge, and one edge per undirected triangulation edge.
pub fn voronoi_diagram<P: Position3>(
    mesh: &HalfEdgeMesh<P>,
    outer_face: FaceId,
) -> VoronoiDiagram<P::Scalar> {
    let mut result = VoronoiDiagram {
        points: vec![],
        edges: vec![],
    };

    // Each internal face and each outer-face halfedge maps to exactly one
    // point; circumcenters are computed once.
    let mut internal_face_points = HashMap::<FaceId, usize>::new();
    let mut outer_edge_points = HashMap::<HalfEdgeId, usize>::new();

    let start_vertex = mesh.at_face(outer_face).halfedge().vertex().end();
    let all_edges = explore_graph(mesh, start_vertex);

    for &e in &all_edges {
        let face = mesh.at_halfedge(e).face().end();
        if face != outer_face {
            if !internal_face_points.contains_key(&face) {
                internal_face_points.insert(face, result.points.len());
                let center = circumcenter(mesh, face);
                result.points.push(center);
            }
        } else {
            let a = mesh.position(mesh.at_halfedge(e).vertex().end());
            let b = mesh.position(mesh.at_halfedge(e).twin().vertex().end());
            outer_edge_points.insert(e, result.points.len());
            result.points.push(VoronoiPoint {
                x: b.y - a.y,
                y: a.x - b.x,
                at_infinity: true,
            });
        }
    }

    // One Voronoi edge per twin pair
    for &e in &all_edges {
        let twin = mesh.at_halfedge(e).twin().end();
        if e < twin {
            let f_e = mesh.at_halfedge(e).face().end();
            let f_t = mesh.at_halfedge(twin).face().end();
            let (u, v) = if f_e == outer_face && f_t == outer_face {
                continue;
            } else if f_e == outer_face {
                (outer_edge_points[&e], internal_face_points[&f_t])
            } else if f_t == outer_face {
                (outer_edge_points[&twin], internal_face_points[&f_e])
            } else {
                (internal_face_points[&f_e], internal_face_points[&f_t])
            };
            result.edges.push(VoronoiEdge { u, v });
        }
    }

    result
}

/// Computes the Voronoi diagram of a set of points in the plane. Returns
/// `None` for degenerate input (fewer than three distinct points, or all of
/// them collinear).
pub fn compute_voronoi_diagram<F: Scalar>(points: &[Point2<F>]) -> Option<VoronoiDiagram<F>> {
    let (mesh, outer_face) = delaunay_triangulation(points)?;
    Some(voronoi_diagram(&mesh, outer_face))
}
