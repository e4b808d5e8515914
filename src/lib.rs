// Copyright (C) 2023 setzer22 and contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/// Some useful re-exports
pub mod prelude;

/// Points and the geometric predicates built on them
pub mod math;

/// The halfedge graph data structure and main edit operations
pub mod mesh;

/// Randomized incremental 3D convex hull over the halfedge mesh
pub mod hull;

/// Delaunay triangulation via the paraboloid lift
pub mod delaunay;

/// Voronoi diagrams as the dual of the Delaunay triangulation
pub mod voronoi;

#[cfg(test)]
mod hull_tests;
