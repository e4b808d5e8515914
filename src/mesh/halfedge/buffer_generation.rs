// Copyright (C) 2023 setzer22 and contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use slotmap::SecondaryMap;

use super::*;

/// A vertex the way a viewer consumes it: a position plus an RGB color.
#[derive(Debug, Clone, Copy)]
pub struct SceneVertex<F> {
    pub position: Point3<F>,
    pub color: [f32; 3],
}

/// Plain-data scene suitable for uploading to a renderer: one entry per mesh
/// vertex, an index buffer for a triangle list (faces, fan-triangulated) and
/// one for a line list (one segment per undirected edge). No GPU types leak
/// into this crate; the viewer owns those.
#[derive(Debug, Clone, Default)]
pub struct RenderingScene<F> {
    pub vertices: Vec<SceneVertex<F>>,
    pub triangle_indices: Vec<u32>,
    pub line_indices: Vec<u32>,
}

impl<P: Position3> HalfEdgeMesh<P> {
    /// Generates the [`RenderingScene`] for this mesh.
    #[profiling::function]
    pub fn generate_rendering_scene(&self, color: [f32; 3]) -> Result<RenderingScene<P::Scalar>> {
        let mut v_id_to_idx = SecondaryMap::<VertexId, u32>::new();
        let mut vertices = Vec::with_capacity(self.num_vertices());

        for (idx, (v, _)) in self.iter_vertices().enumerate() {
            v_id_to_idx.insert(v, idx as u32);
            vertices.push(SceneVertex {
                position: self.position(v),
                color,
            });
        }

        let mut triangle_indices = vec![];
        for (face_id, _face) in self.iter_faces() {
            let face_vertices = self.face_vertices(face_id);
            let v1 = face_vertices[0];
            for (&v2, &v3) in face_vertices[1..].iter().tuple_windows() {
                triangle_indices.push(v_id_to_idx[v1]);
                triangle_indices.push(v_id_to_idx[v2]);
                triangle_indices.push(v_id_to_idx[v3]);
            }
        }

        let mut line_indices = vec![];
        let mut visited = HashSet::new();
        for (h, halfedge) in self.iter_halfedges() {
            let tw = halfedge
                .twin()
                .ok_or_else(|| anyhow!("All halfedges should have a twin"))?;
            if visited.contains(&tw) {
                continue;
            } else {
                visited.insert(h);
            }

            let (src, dst) = self.at_halfedge(h).src_dst_pair()?;
            line_indices.push(v_id_to_idx[src]);
            line_indices.push(v_id_to_idx[dst]);
        }

        Ok(RenderingScene {
            vertices,
            triangle_indices,
            line_indices,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::halfedge::primitives::make_polygon;

    #[test]
    fn scene_buffers_cover_the_mesh() {
        let mut mesh = HalfEdgeMesh::new();
        make_polygon(
            &mut mesh,
            &[
                Point3::new(0, 0, 0),
                Point3::new(1, 0, 0),
                Point3::new(1, 1, 0),
                Point3::new(0, 1, 0),
            ],
        )
        .unwrap();

        let scene = mesh.generate_rendering_scene([1.0, 1.0, 1.0]).unwrap();
        assert_eq!(scene.vertices.len(), 4);
        // Two faces (inner and outer), fan-triangulated into two triangles each
        assert_eq!(scene.triangle_indices.len(), 12);
        // One segment per undirected edge
        assert_eq!(scene.line_indices.len(), 8);
    }
}
