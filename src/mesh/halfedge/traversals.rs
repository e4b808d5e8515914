// Copyright (C) 2023 setzer22 and contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::collections::VecDeque;

use super::*;

pub trait Location {}

impl Location for VertexId {}
impl Location for FaceId {}
impl Location for HalfEdgeId {}
impl Location for bool {}

#[derive(Copy, Clone, Debug)]
pub enum TraversalError {
    VertexHasNoHalfedge(VertexId),
    FaceHasNoHalfedge(FaceId),
    HalfEdgeHasNoNext(HalfEdgeId),
    HalfEdgeHasNoPrev(HalfEdgeId),
    HalfEdgeHasNoTwin(HalfEdgeId),
    HalfEdgeHasNoVertex(HalfEdgeId),
    HalfEdgeHasNoFace(HalfEdgeId),
}
impl std::fmt::Display for TraversalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("{self:?}"))
    }
}
impl std::error::Error for TraversalError {}

pub struct ValidTraversal<'a, T, L>
where
    L: Location,
{
    inner: &'a HalfEdgeMesh<T>,
    location: L,
}

// Manual impls: a derive would require T: Copy, but traversals are Copy for
// any payload type
impl<'a, T, L: Location + Copy> Clone for ValidTraversal<'a, T, L> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<'a, T, L: Location + Copy> Copy for ValidTraversal<'a, T, L> {}

pub type Traversal<'a, T, L> = Result<ValidTraversal<'a, T, L>, TraversalError>;

/* ===================== */
/* Traversal on vertices */
/* ===================== */

pub trait VertexTraversal<'a, T> {
    fn halfedge(&'a self) -> Traversal<'a, T, HalfEdgeId>;
}

impl<'a, T> VertexTraversal<'a, T> for Traversal<'a, T, VertexId> {
    fn halfedge(&'a self) -> Traversal<'a, T, HalfEdgeId> {
        self.and_then(|valid| {
            Ok(ValidTraversal {
                inner: valid.inner,
                location: valid.inner[valid.location]
                    .halfedge
                    .ok_or(TraversalError::VertexHasNoHalfedge(valid.location))?,
            })
        })
    }
}

/* ================== */
/* Traversal on faces */
/* ================== */

pub trait FaceTraversal<'a, T> {
    fn halfedge(&'a self) -> Traversal<'a, T, HalfEdgeId>;
}
impl<'a, T> FaceTraversal<'a, T> for Traversal<'a, T, FaceId> {
    fn halfedge(&'a self) -> Traversal<'a, T, HalfEdgeId> {
        self.and_then(|valid| {
            Ok(ValidTraversal {
                inner: valid.inner,
                location: valid.inner[valid.location]
                    .halfedge
                    .ok_or(TraversalError::FaceHasNoHalfedge(valid.location))?,
            })
        })
    }
}

/* ====================== */
/* Traversal on halfedges */
/* ====================== */

pub trait HalfEdgeTraversal<'a, T> {
    fn twin(&'a self) -> Traversal<'a, T, HalfEdgeId>;
    fn next(&'a self) -> Traversal<'a, T, HalfEdgeId>;
    fn previous(&'a self) -> Traversal<'a, T, HalfEdgeId>;
    fn face(&'a self) -> Traversal<'a, T, FaceId>;
    fn vertex(&'a self) -> Traversal<'a, T, VertexId>;
}

impl<'a, T> HalfEdgeTraversal<'a, T> for Traversal<'a, T, HalfEdgeId> {
    fn twin(&'a self) -> Traversal<'a, T, HalfEdgeId> {
        self.and_then(|valid| {
            Ok(ValidTraversal {
                inner: valid.inner,
                location: valid.inner[valid.location]
                    .twin
                    .ok_or(TraversalError::HalfEdgeHasNoTwin(valid.location))?,
            })
        })
    }

    fn next(&'a self) -> Traversal<'a, T, HalfEdgeId> {
        self.and_then(|valid| {
            Ok(ValidTraversal {
                inner: valid.inner,
                location: valid.inner[valid.location]
                    .next
                    .ok_or(TraversalError::HalfEdgeHasNoNext(valid.location))?,
            })
        })
    }

    fn previous(&'a self) -> Traversal<'a, T, HalfEdgeId> {
        self.and_then(|valid| {
            Ok(ValidTraversal {
                inner: valid.inner,
                location: valid.inner[valid.location]
                    .prev
                    .ok_or(TraversalError::HalfEdgeHasNoPrev(valid.location))?,
            })
        })
    }

    fn face(&'a self) -> Traversal<'a, T, FaceId> {
        self.and_then(|valid| {
            Ok(ValidTraversal {
                inner: valid.inner,
                location: valid.inner[valid.location]
                    .face
                    .ok_or(TraversalError::HalfEdgeHasNoFace(valid.location))?,
            })
        })
    }

    fn vertex(&'a self) -> Traversal<'a, T, VertexId> {
        self.and_then(|valid| {
            Ok(ValidTraversal {
                inner: valid.inner,
                location: valid.inner[valid.location]
                    .vertex
                    .ok_or(TraversalError::HalfEdgeHasNoVertex(valid.location))?,
            })
        })
    }
}

/* =================== */
/*  Generic traversal  */
/* =================== */

pub trait AnyTraversal<'a, L> {
    fn end(&'a self) -> L;
    fn try_end(&'a self) -> Result<L, TraversalError>;
}
impl<'a, T, L> AnyTraversal<'a, L> for Traversal<'a, T, L>
where
    L: Location + Copy,
{
    fn end(&'a self) -> L {
        self.map(|valid| valid.location)
            .unwrap_or_else(|err| panic!("Error during traversal: {err:?}"))
    }

    fn try_end(&'a self) -> Result<L, TraversalError> {
        self.map(|valid| valid.location)
    }
}

/* ============ */
/*  Initiators  */
/* ============ */

impl<T> HalfEdgeMesh<T> {
    pub fn at_halfedge(&self, halfedge_id: HalfEdgeId) -> Traversal<'_, T, HalfEdgeId> {
        Ok(ValidTraversal {
            inner: self,
            location: halfedge_id,
        })
    }

    pub fn at_face(&self, face_id: FaceId) -> Traversal<'_, T, FaceId> {
        Ok(ValidTraversal {
            inner: self,
            location: face_id,
        })
    }

    pub fn at_vertex(&self, vertex_id: VertexId) -> Traversal<'_, T, VertexId> {
        Ok(ValidTraversal {
            inner: self,
            location: vertex_id,
        })
    }
}

/* ================ */
/*  Vertex Helpers  */
/* ================ */

pub trait VertexTraversalHelpers<'a, T> {
    fn outgoing_halfedges(&'a self) -> Result<SVec<HalfEdgeId>, TraversalError>;
}

impl<'a, T> VertexTraversalHelpers<'a, T> for Traversal<'a, T, VertexId> {
    /// Returns the halfedges exiting this vertex, in rotation order: each one
    /// is the twin of its predecessor's `prev`.
    fn outgoing_halfedges(&'a self) -> Result<SVec<HalfEdgeId>, TraversalError> {
        self.and_then(|valid| {
            let mut halfedges = SVec::new();
            // Could be a disconnected vertex. Return an empty list in that case.
            if let Some(h0) = valid.inner[valid.location].halfedge {
                let mut h = h0;
                loop {
                    halfedges.push(h);
                    h = valid.inner.at_halfedge(h).cycle_around_fan().try_end()?;
                    if h == h0 {
                        break;
                    }
                }
            }
            Ok(halfedges)
        })
    }
}

/* ================== */
/*  Halfedge Helpers  */
/* ================== */

pub trait HalfedgeTraversalHelpers<'a, T> {
    fn cycle_around_fan(&'a self) -> Traversal<'a, T, HalfEdgeId>;
    fn src_vertex(&'a self) -> Traversal<'a, T, VertexId>;
    fn dst_vertex(&'a self) -> Traversal<'a, T, VertexId>;
    fn src_dst_pair(&'a self) -> Result<(VertexId, VertexId), TraversalError>;
}
impl<'a, T> HalfedgeTraversalHelpers<'a, T> for Traversal<'a, T, HalfEdgeId> {
    fn cycle_around_fan(&'a self) -> Traversal<'a, T, HalfEdgeId> {
        self.and_then(|valid| {
            Ok(ValidTraversal {
                inner: valid.inner,
                location: self.previous().twin().try_end()?,
            })
        })
    }

    fn src_vertex(&'a self) -> Traversal<'a, T, VertexId> {
        self.vertex()
    }

    fn dst_vertex(&'a self) -> Traversal<'a, T, VertexId> {
        self.and_then(|valid| {
            Ok(ValidTraversal {
                inner: valid.inner,
                location: self.twin().vertex().try_end()?,
            })
        })
    }

    fn src_dst_pair(&'a self) -> Result<(VertexId, VertexId), TraversalError> {
        Ok((self.src_vertex().try_end()?, self.dst_vertex().try_end()?))
    }
}

/* ================== */
/*  Graph exploration */
/* ================== */

/// Breadth-first discovery of every halfedge reachable from `vertex` through
/// the `twin`, `next` and `prev` pointers. Each reachable halfedge is
/// produced exactly once, in a deterministic order. Returns an empty list
/// when the vertex is stale or disconnected.
pub fn explore_graph<T>(mesh: &HalfEdgeMesh<T>, vertex: VertexId) -> Vec<HalfEdgeId> {
    let Some(h0) = mesh.vertex(vertex).and_then(Vertex::halfedge) else {
        return vec![];
    };

    let mut seen = HashSet::new();
    let mut queue = VecDeque::new();
    let mut discovered = vec![];

    seen.insert(h0);
    queue.push_back(h0);

    while let Some(h) = queue.pop_front() {
        discovered.push(h);
        let halfedge = &mesh[h];
        for neighbor in [halfedge.twin, halfedge.next, halfedge.prev]
            .into_iter()
            .flatten()
        {
            if seen.insert(neighbor) {
                queue.push_back(neighbor);
            }
        }
    }

    discovered
}
