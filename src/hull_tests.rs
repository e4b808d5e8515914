// Copyright (C) 2023 setzer22 and contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;

use crate::delaunay::delaunay_triangulation;
use crate::hull::{
    compute_convex_hull_3d_with, face_point_orientation, HullPhase,
};
use crate::prelude::*;
use crate::voronoi::compute_voronoi_diagram;

type Pt = Point3<i64>;

fn hull_of(points: &[Pt], seed: u64) -> (HalfEdgeMesh<Pt>, VertexId) {
    let mut rng = StdRng::seed_from_u64(seed);
    compute_convex_hull_3d_with(points, &mut rng, |_, _| {}).expect("hull should exist")
}

/// Checks the halfedge structure invariants on everything reachable from
/// `vertex`: twin/next/prev consistency, no degenerate edges, and closed
/// face cycles that partition the reachable halfedges.
fn assert_structural_invariants<T>(mesh: &HalfEdgeMesh<T>, vertex: VertexId) {
    let all_edges = explore_graph(mesh, vertex);
    assert!(!all_edges.is_empty());

    for &h in &all_edges {
        let twin = mesh.at_halfedge(h).twin().end();
        assert_ne!(twin, h);
        assert_eq!(mesh.at_halfedge(twin).twin().end(), h);
        assert_eq!(mesh.at_halfedge(h).next().previous().end(), h);
        assert_eq!(mesh.at_halfedge(h).previous().next().end(), h);
        assert_ne!(
            mesh.at_halfedge(h).vertex().end(),
            mesh.at_halfedge(twin).vertex().end()
        );
    }

    // Face cycles close and stay within their face, and together they cover
    // the reachable halfedges exactly once
    let mut seen_faces = HashSet::new();
    let mut total = 0;
    for &h in &all_edges {
        let face = mesh.at_halfedge(h).face().end();
        if seen_faces.insert(face) {
            for e in mesh.face_edges(face) {
                assert_eq!(mesh.at_halfedge(e).face().end(), face);
            }
            total += mesh.face_edges(face).len();
        }
    }
    assert_eq!(total, all_edges.len());
}

fn hull_vertex_count<T>(mesh: &HalfEdgeMesh<T>, vertex: VertexId) -> usize {
    explore_graph(mesh, vertex)
        .iter()
        .map(|&h| mesh.at_halfedge(h).vertex().end())
        .collect::<HashSet<_>>()
        .len()
}

#[test]
fn tetrahedron_hull() {
    let pts = [
        Pt::new(0, 0, 0),
        Pt::new(1, 0, 0),
        Pt::new(0, 1, 0),
        Pt::new(0, 0, 1),
    ];
    let (mesh, v) = hull_of(&pts, 1);
    assert_eq!(explore_graph(&mesh, v).len(), 12);
    assert_structural_invariants(&mesh, v);
}

#[test]
fn hull_faces_point_away_from_the_interior() {
    let pts = [
        Pt::new(0, 0, 0),
        Pt::new(10, 0, 0),
        Pt::new(0, 10, 0),
        Pt::new(0, 0, 10),
    ];
    let (mesh, v) = hull_of(&pts, 1);
    let inside = Pt::new(1, 1, 1);

    let mut faces = HashSet::new();
    for h in explore_graph(&mesh, v) {
        faces.insert(mesh.at_halfedge(h).face().end());
    }
    assert_eq!(faces.len(), 4);
    for face in faces {
        assert_eq!(mesh.face_edges(face).len(), 3);
        assert!(face_point_orientation(&mesh, face, inside) < 0);
    }
}

#[test]
fn interior_point_is_rejected() {
    let pts = [
        Pt::new(0, 0, 0),
        Pt::new(10, 0, 0),
        Pt::new(0, 10, 0),
        Pt::new(0, 0, 10),
        Pt::new(1, 1, 1),
    ];
    for seed in 0..5 {
        let (mesh, v) = hull_of(&pts, seed);
        assert_eq!(explore_graph(&mesh, v).len(), 12);
    }
}

#[test]
fn far_corner_replaces_origin() {
    let pts = [
        Pt::new(0, 0, 0),
        Pt::new(10, 0, 0),
        Pt::new(0, 10, 0),
        Pt::new(0, 0, 10),
        Pt::new(-100, -100, -100),
    ];
    for seed in 0..5 {
        let (mesh, v) = hull_of(&pts, seed);
        let all_edges = explore_graph(&mesh, v);
        assert_eq!(all_edges.len(), 12);
        for h in &all_edges {
            let origin = mesh.at_halfedge(*h).vertex().end();
            assert_ne!(*mesh.payload(origin), Pt::new(0, 0, 0));
        }
        assert_structural_invariants(&mesh, v);
    }
}

#[test]
fn collinear_extension_collapses_to_a_dipyramid() {
    let mut pts = vec![
        Pt::new(0, 0, 0),
        Pt::new(10, 0, 0),
        Pt::new(0, 10, 0),
        Pt::new(0, 0, 10),
    ];
    for t in 6..=100 {
        pts.push(Pt::new(t, t, t));
    }
    for seed in 0..5 {
        let (mesh, v) = hull_of(&pts, seed);
        let all_edges = explore_graph(&mesh, v);
        assert_eq!(all_edges.len(), 18);
        for h in &all_edges {
            let p = mesh.payload(mesh.at_halfedge(*h).vertex().end());
            assert_eq!(p.x % 10 + p.y % 10 + p.z % 10, 0);
        }
        assert_structural_invariants(&mesh, v);
    }
}

#[test]
fn two_peaks_over_a_tetrahedron() {
    let pts = [
        Pt::new(0, 0, 0),
        Pt::new(10, 0, 0),
        Pt::new(0, 10, 0),
        Pt::new(0, 0, 10),
        Pt::new(6, 6, 6),
        Pt::new(7, 7, 7),
    ];
    for seed in 0..5 {
        let (mesh, v) = hull_of(&pts, seed);
        assert_eq!(explore_graph(&mesh, v).len(), 18);
    }
}

#[test]
fn planar_input_three_points() {
    let pts = [Pt::new(0, 0, 0), Pt::new(0, 1, 10), Pt::new(2, 5, 4)];
    let (mesh, v) = hull_of(&pts, 1);
    assert_eq!(explore_graph(&mesh, v).len(), 6);
    assert_structural_invariants(&mesh, v);
}

#[test]
fn planar_input_drops_interior_points() {
    let pts = [
        Pt::new(0, 0, 0),
        Pt::new(0, 0, 10),
        Pt::new(0, 10, 0),
        Pt::new(0, 10, 10),
        Pt::new(0, 5, 5),
    ];
    let (mesh, v) = hull_of(&pts, 1);
    let face = mesh.at_vertex(v).halfedge().face().end();
    assert_eq!(mesh.face_edges(face).len(), 4);
}

#[test]
fn planar_fallback_hull_is_a_pentagon() {
    let pts = [
        Pt::new(0, 0, 0),
        Pt::new(0, 0, 10),
        Pt::new(0, 10, 0),
        Pt::new(0, 10, 10),
        Pt::new(0, 5, 5),
        Pt::new(0, 13, 5),
    ];
    let (mesh, v) = hull_of(&pts, 1);
    let face = mesh.at_vertex(v).halfedge().face().end();
    assert_eq!(mesh.face_edges(face).len(), 5);
    assert_structural_invariants(&mesh, v);
}

#[test]
fn planar_fallback_tolerates_duplicates() {
    let pts = [
        Pt::new(0, 0, 0),
        Pt::new(0, 0, 10),
        Pt::new(0, 0, 10),
        Pt::new(0, 10, 0),
        Pt::new(0, 5, 5),
        Pt::new(0, 0, 0),
    ];
    let (mesh, v) = hull_of(&pts, 1);
    let face = mesh.at_vertex(v).halfedge().face().end();
    assert_eq!(mesh.face_edges(face).len(), 3);
}

#[test]
fn cube_lattice_hull_is_the_cube() {
    let mut pts = vec![];
    for i in 0..6 {
        for j in 0..6 {
            for k in 0..6 {
                pts.push(Pt::new(i, j, k));
            }
        }
    }
    for seed in 0..10 {
        let (mesh, v) = hull_of(&pts, seed);
        let all_edges = explore_graph(&mesh, v);
        assert_eq!(all_edges.len(), 24);
        assert_eq!(hull_vertex_count(&mesh, v), 8);
        assert_structural_invariants(&mesh, v);
    }
}

#[test]
fn sphere_hull_keeps_every_point() {
    use std::f64::consts::PI;

    let num_points = 1000;
    let mut rng = StdRng::seed_from_u64(7);
    let mut pts = Vec::with_capacity(num_points);
    for _ in 0..num_points {
        let phi = rng.random_range(0.0..2.0 * PI);
        let theta = rng.random_range(0.0..PI) - PI / 2.0;
        pts.push(Point3::new(
            phi.cos() * theta.cos(),
            phi.sin() * theta.cos(),
            theta.sin(),
        ));
    }

    let mut hull_rng = StdRng::seed_from_u64(13);
    let (mesh, v) =
        compute_convex_hull_3d_with(&pts, &mut hull_rng, |_, _| {}).expect("hull should exist");
    let all_edges = explore_graph(&mesh, v);
    assert_eq!(hull_vertex_count(&mesh, v), num_points);
    assert_eq!(all_edges.len(), 6 * num_points - 12);
    assert_structural_invariants(&mesh, v);
}

#[test]
fn paraboloid_hull_contains_all_points() {
    let mut pts = vec![];
    for i in 0..30i64 {
        for j in 0..30i64 {
            pts.push(Pt::new(i, j, i * i + j * j));
        }
    }
    let (mesh, v) = hull_of(&pts, 3);
    assert_structural_invariants(&mesh, v);

    // No input point lies strictly outside any hull face
    let mut faces = HashSet::new();
    for h in explore_graph(&mesh, v) {
        faces.insert(mesh.at_halfedge(h).face().end());
    }
    for face in faces {
        for p in &pts {
            assert!(face_point_orientation(&mesh, face, *p) <= 0);
        }
    }
}

#[test]
fn observer_sees_every_phase_in_order() {
    let pts = [
        Pt::new(0, 0, 0),
        Pt::new(10, 0, 0),
        Pt::new(0, 10, 0),
        Pt::new(0, 0, 10),
        Pt::new(-100, -100, -100),
    ];
    let mut phases = vec![];
    let mut rng = StdRng::seed_from_u64(1);
    compute_convex_hull_3d_with(&pts, &mut rng, |phase, _peak| phases.push(phase))
        .expect("hull should exist");

    assert_eq!(
        phases,
        vec![
            HullPhase::InitialTetrahedron,
            HullPhase::AfterJoinFaces,
            HullPhase::AfterInscribeVertex,
            HullPhase::AfterMergeFaces,
            HullPhase::AfterRemoveRedundantVertices,
        ]
    );
}

#[test]
fn degenerate_inputs_yield_no_hull() {
    let mut rng = StdRng::seed_from_u64(1);
    let empty: [Pt; 0] = [];
    assert!(compute_convex_hull_3d_with(&empty, &mut rng, |_, _| {}).is_none());

    let two = [Pt::new(0, 0, 0), Pt::new(1, 2, 3)];
    assert!(compute_convex_hull_3d_with(&two, &mut rng, |_, _| {}).is_none());

    let collinear_pts: Vec<Pt> = (0..10).map(|t| Pt::new(t, 2 * t, 3 * t)).collect();
    assert!(compute_convex_hull_3d_with(&collinear_pts, &mut rng, |_, _| {}).is_none());
}

/* ============================= */
/*  Delaunay triangulation       */
/* ============================= */

fn delaunay_edge_labels(points: &[Point2<i64>]) -> (usize, HashSet<(usize, usize)>) {
    let (mesh, outer_face) = delaunay_triangulation(points).expect("triangulation should exist");
    let outer_degree = mesh.face_edges(outer_face).len();

    let start = mesh.at_face(outer_face).halfedge().vertex().end();
    let mut labels = HashSet::new();
    for h in explore_graph(&mesh, start) {
        let (src, dst) = mesh.at_halfedge(h).src_dst_pair().unwrap();
        let u = mesh.payload(src).label;
        let v = mesh.payload(dst).label;
        if u < v {
            labels.insert((u, v));
        }
    }
    (outer_degree, labels)
}

#[test]
fn delaunay_picks_the_empty_circle_diagonal() {
    // (6, 6) is close enough to the far corner that the diagonal through it
    // wins
    let pts = [
        Point2::new(0, 0),
        Point2::new(0, 10),
        Point2::new(10, 0),
        Point2::new(6, 6),
    ];
    let (outer_degree, labels) = delaunay_edge_labels(&pts);
    assert_eq!(outer_degree, 4);
    let expected: HashSet<(usize, usize)> =
        [(0, 1), (0, 2), (0, 3), (1, 3), (2, 3)].into_iter().collect();
    assert_eq!(labels, expected);
}

#[test]
fn delaunay_keeps_the_hull_edge_when_the_point_is_far() {
    let pts = [
        Point2::new(0, 0),
        Point2::new(0, 10),
        Point2::new(10, 0),
        Point2::new(13, 13),
    ];
    let (outer_degree, labels) = delaunay_edge_labels(&pts);
    assert_eq!(outer_degree, 4);
    let expected: HashSet<(usize, usize)> =
        [(0, 1), (0, 2), (1, 2), (1, 3), (2, 3)].into_iter().collect();
    assert_eq!(labels, expected);
}

#[test]
fn delaunay_of_five_points() {
    let pts = [
        Point2::new(0, 0),
        Point2::new(0, 10),
        Point2::new(10, 0),
        Point2::new(10, 10),
        Point2::new(17, 5),
    ];
    let (outer_degree, labels) = delaunay_edge_labels(&pts);
    assert_eq!(outer_degree, 5);
    let expected: HashSet<(usize, usize)> = [(0, 1), (0, 2), (1, 3), (2, 3), (2, 4), (3, 4)]
        .into_iter()
        .collect();
    assert_eq!(labels, expected);
}

#[test]
fn delaunay_of_a_cocircular_square() {
    let pts = [
        Point2::new(0, 0),
        Point2::new(0, 10),
        Point2::new(10, 0),
        Point2::new(10, 10),
    ];
    let (outer_degree, labels) = delaunay_edge_labels(&pts);
    assert_eq!(outer_degree, 4);
    // Cocircular: no diagonal, the square face survives whole
    let expected: HashSet<(usize, usize)> =
        [(0, 1), (0, 2), (1, 3), (2, 3)].into_iter().collect();
    assert_eq!(labels, expected);
}

#[test]
fn delaunay_grid_preserves_square_cells() {
    let grid_size = 10i64;
    let mut pts = vec![];
    for x in 0..grid_size {
        for y in 0..grid_size {
            pts.push(Point2::new(x, y));
        }
    }

    let (mesh, outer_face) = delaunay_triangulation(&pts).expect("triangulation should exist");
    let start = mesh.at_face(outer_face).halfedge().vertex().end();
    let all_edges = explore_graph(&mesh, start);
    assert_eq!(all_edges.len() as i64, 4 * grid_size * (grid_size - 1));

    for h in &all_edges {
        let face = mesh.at_halfedge(*h).face().end();
        if face == outer_face {
            assert_eq!(mesh.face_edges(face).len() as i64, grid_size * 4 - 4);
        } else {
            assert_eq!(mesh.face_edges(face).len(), 4);
        }
    }
}

#[test]
fn delaunay_triangles_have_empty_circumcircles() {
    let pts = [
        Point2::new(0i64, 0),
        Point2::new(9, 1),
        Point2::new(3, 8),
        Point2::new(12, 7),
        Point2::new(5, 3),
        Point2::new(7, 11),
        Point2::new(1, 5),
    ];
    let (mesh, outer_face) = delaunay_triangulation(&pts).expect("triangulation should exist");

    let start = mesh.at_face(outer_face).halfedge().vertex().end();
    let mut faces = HashSet::new();
    for h in explore_graph(&mesh, start) {
        let face = mesh.at_halfedge(h).face().end();
        if face != outer_face {
            faces.insert(face);
        }
    }

    for face in faces {
        let corners = mesh.face_vertices(face);
        let a = mesh.position(corners[0]);
        let b = mesh.position(corners[1]);
        let c = mesh.position(corners[2]);
        // z = x² + y², so the in-circle test is the lifted orientation test
        let winding = (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x);
        for p in &pts {
            let lifted = Point3::new(p.x, p.y, p.x * p.x + p.y * p.y);
            let side = orientation(a, b, c, lifted);
            assert!(
                side * winding.signum() >= 0,
                "point {p:?} lies strictly inside a circumcircle"
            );
        }
    }
}

/* ============================= */
/*  Voronoi diagrams             */
/* ============================= */

#[test]
fn voronoi_of_five_points() {
    let pts = [
        Point2::new(0.0f64, 0.0),
        Point2::new(0.0, 10.0),
        Point2::new(10.0, 0.0),
        Point2::new(10.0, 10.0),
        Point2::new(17.0, 5.0),
    ];
    let diagram = compute_voronoi_diagram(&pts).expect("diagram should exist");

    assert_eq!(diagram.points.len(), 7);
    assert_eq!(diagram.edges.len(), 6);

    let finite: Vec<_> = diagram.points.iter().filter(|p| !p.at_infinity).collect();
    assert_eq!(finite.len(), 2);
    assert!(finite
        .iter()
        .any(|p| (p.x - 5.0).abs() < 1e-9 && (p.y - 5.0).abs() < 1e-9));
    assert!(finite
        .iter()
        .any(|p| (p.x - 82.0 / 7.0).abs() < 1e-9 && (p.y - 5.0).abs() < 1e-9));

    // Every edge endpoint is a valid point index
    for edge in &diagram.edges {
        assert!(edge.u < diagram.points.len());
        assert!(edge.v < diagram.points.len());
    }
}

#[test]
fn voronoi_edge_count_matches_delaunay_edge_count() {
    let pts = [
        Point2::new(0.0f64, 0.0),
        Point2::new(4.0, 1.0),
        Point2::new(2.0, 5.0),
        Point2::new(6.0, 6.0),
        Point2::new(8.0, 2.0),
        Point2::new(1.0, 8.0),
    ];
    let (mesh, outer_face) = delaunay_triangulation(&pts).expect("triangulation should exist");
    let start = mesh.at_face(outer_face).halfedge().vertex().end();
    let delaunay_undirected = explore_graph(&mesh, start).len() / 2;

    let diagram = compute_voronoi_diagram(&pts).expect("diagram should exist");
    assert_eq!(diagram.edges.len(), delaunay_undirected);
}

#[test]
fn voronoi_of_degenerate_input_is_none() {
    let collinear_pts: Vec<Point2<f64>> = (0..5).map(|t| Point2::new(t as f64, t as f64)).collect();
    assert!(compute_voronoi_diagram(&collinear_pts).is_none());
}
