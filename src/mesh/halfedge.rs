// Copyright (C) 2023 setzer22 and contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use slotmap::{SecondaryMap, SlotMap};

use crate::prelude::*;

/// Implements indexing traits so the mesh data structure can be used to access
/// vertex, face or halfedge information using ids as indices.
pub mod mesh_index_impls;

/// Type-safe wrappers over the internal allocator indices used as pointers
pub mod id_types;
pub use id_types::*;

/// An API to represent type-safe and error-handled graph traversals over a mesh
pub mod traversals;
pub use traversals::*;

/// Building closed polygons from scratch
pub mod primitives;

/// Structural surgery on the mesh: vertex inscription, edge removal, face
/// joining and redundant vertex removal
pub mod edit_ops;

/// Generate vertex and index buffers suitable to be uploaded to the GPU for
/// rendering
pub mod buffer_generation;
pub use buffer_generation::*;

/// HalfEdge meshes are a type of linked list. This means it is sometimes
/// impossible to ensure some algorithms will terminate when the mesh is
/// malformed. To ensure the code never goes into an infinite loop, this max
/// number of iterations will be performed before giving an error. This error
/// should be large enough, as faces with a very large number of vertices may
/// trigger it.
pub const MAX_LOOP_ITERATIONS: usize = 8196;

#[derive(Debug, Default, Clone)]
pub struct HalfEdge {
    twin: Option<HalfEdgeId>,
    next: Option<HalfEdgeId>,
    prev: Option<HalfEdgeId>,
    vertex: Option<VertexId>,
    face: Option<FaceId>,

    /// Transient working storage for `edit_ops::join_faces`. Meaningless
    /// outside a single operation.
    tag: usize,
}

#[derive(Debug, Default, Clone)]
pub struct Vertex {
    halfedge: Option<HalfEdgeId>,

    /// Transient working storage for `edit_ops::join_faces`.
    tag: usize,
}

#[derive(Debug, Default, Clone)]
pub struct Face {
    halfedge: Option<HalfEdgeId>,
}

/// A halfedge mesh with vertex payloads of type `T`. The payload is the only
/// data the mesh stores besides connectivity; the geometry algorithms in this
/// crate use payloads implementing [`Position3`].
///
/// Entities live in one arena per kind. Removing an entity retires its
/// versioned key, so any handle kept across a surgery operation that consumed
/// it becomes detectably stale instead of aliasing a new entity.
#[derive(Debug, Clone)]
pub struct HalfEdgeMesh<T> {
    vertices: SlotMap<VertexId, Vertex>,
    faces: SlotMap<FaceId, Face>,
    halfedges: SlotMap<HalfEdgeId, HalfEdge>,
    payloads: SecondaryMap<VertexId, T>,
}

impl<T> Default for HalfEdgeMesh<T> {
    fn default() -> Self {
        Self {
            vertices: SlotMap::with_key(),
            faces: SlotMap::with_key(),
            halfedges: SlotMap::with_key(),
            payloads: SecondaryMap::new(),
        }
    }
}

impl<T> HalfEdgeMesh<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the edges of a given face, in cycle order starting from the
    /// face's stored halfedge.
    pub fn face_edges(&self, face_id: FaceId) -> SVec<HalfEdgeId> {
        let h0 = self[face_id].halfedge.expect("Face should have a halfedge");
        self.halfedge_loop(h0)
    }

    pub fn face_vertices(&self, face_id: FaceId) -> SVec<VertexId> {
        self.face_edges(face_id)
            .iter()
            .map(|e| self.at_halfedge(*e).vertex().end())
            .collect()
    }

    /// Follows the `next` pointer from `h0` until closing the loop.
    pub fn halfedge_loop(&self, h0: HalfEdgeId) -> SVec<HalfEdgeId> {
        let mut ret: SVec<HalfEdgeId> = smallvec::smallvec![h0];
        let mut h = h0;

        let mut count = 0;

        loop {
            if count > MAX_LOOP_ITERATIONS {
                panic!("Max number of iterations reached. Is the mesh malformed?");
            }
            count += 1;

            h = self[h].next.expect("Halfedges should form a loop");
            if h == h0 {
                break;
            } else {
                ret.push(h);
            }
        }
        ret
    }

    pub fn iter_vertices(&self) -> impl Iterator<Item = (VertexId, &Vertex)> {
        self.vertices.iter()
    }

    pub fn iter_faces(&self) -> impl Iterator<Item = (FaceId, &Face)> {
        self.faces.iter()
    }

    pub fn iter_halfedges(&self) -> impl Iterator<Item = (HalfEdgeId, &HalfEdge)> {
        self.halfedges.iter()
    }

    /// Adds a new vertex to the mesh, disconnected from everything else.
    /// Returns its handle.
    fn alloc_vertex(&mut self, payload: T, halfedge: Option<HalfEdgeId>) -> VertexId {
        let v = self.vertices.insert(Vertex { halfedge, tag: 0 });
        self.payloads.insert(v, payload);
        v
    }

    /// Adds a new halfedge to the mesh, disconnected from everything else.
    /// Returns its handle.
    fn alloc_halfedge(&mut self, halfedge: HalfEdge) -> HalfEdgeId {
        self.halfedges.insert(halfedge)
    }

    /// Adds a new face to the mesh, disconnected from everything else. Returns
    /// its handle.
    fn alloc_face(&mut self, halfedge: Option<HalfEdgeId>) -> FaceId {
        self.faces.insert(Face { halfedge })
    }

    /// Removes a vertex from the mesh. This does not attempt to preserve mesh
    /// connectivity and should only be used as part of internal operations.
    fn remove_vertex(&mut self, vertex: VertexId) {
        self.vertices.remove(vertex);
        self.payloads.remove(vertex);
    }

    /// Removes a halfedge from the mesh. This does not attempt to preserve
    /// mesh connectivity and should only be used as part of internal
    /// operations.
    fn remove_halfedge(&mut self, halfedge: HalfEdgeId) {
        self.halfedges.remove(halfedge);
    }

    /// Removes a face from the mesh. This does not attempt to preserve mesh
    /// connectivity and should only be used as part of internal operations.
    fn remove_face(&mut self, face: FaceId) {
        self.faces.remove(face);
    }

    /// The payload stored for `vertex`.
    pub fn payload(&self, vertex: VertexId) -> &T {
        self.payloads
            .get(vertex)
            .unwrap_or_else(|| panic!("No payload for vertex {vertex:?}. Has it been deleted?"))
    }

    pub fn vertex_exists(&self, vertex: VertexId) -> bool {
        self.vertices.contains_key(vertex)
    }

    pub fn face_exists(&self, face: FaceId) -> bool {
        self.faces.contains_key(face)
    }

    pub fn halfedge_exists(&self, halfedge: HalfEdgeId) -> bool {
        self.halfedges.contains_key(halfedge)
    }

    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    pub fn num_halfedges(&self) -> usize {
        self.halfedges.len()
    }
}

impl<P: Position3> HalfEdgeMesh<P> {
    /// The position of `vertex`, read from its payload.
    pub fn position(&self, vertex: VertexId) -> Point3<P::Scalar> {
        self.payload(vertex).position()
    }
}

impl Vertex {
    pub fn halfedge(&self) -> Option<HalfEdgeId> {
        self.halfedge
    }
}

impl Face {
    pub fn halfedge(&self) -> Option<HalfEdgeId> {
        self.halfedge
    }
}

impl HalfEdge {
    pub fn twin(&self) -> Option<HalfEdgeId> {
        self.twin
    }

    pub fn next(&self) -> Option<HalfEdgeId> {
        self.next
    }

    pub fn prev(&self) -> Option<HalfEdgeId> {
        self.prev
    }

    pub fn vertex(&self) -> Option<VertexId> {
        self.vertex
    }

    pub fn face(&self) -> Option<FaceId> {
        self.face
    }
}
