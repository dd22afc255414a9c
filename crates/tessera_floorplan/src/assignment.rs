//! The vertex-to-slot mapping produced by the coarse partitioner.

use crate::error::FloorplanError;
use crate::slot::Slot;
use std::collections::{BTreeMap, HashMap};
use tessera_common::Interner;
use tessera_device::{ResourceKind, ResourceVector};
use tessera_graph::{DataflowGraph, Edge, VertexId};

/// Resource usage of one slot against its capacity.
#[derive(Debug, Clone)]
pub struct SlotUsage {
    /// The slot.
    pub slot: Slot,
    /// Summed usage of the vertices placed in it.
    pub usage: ResourceVector,
    /// Resource kinds whose usage exceeds the slot's capacity.
    pub exceeded: Vec<ResourceKind>,
}

/// Vertex-to-slot mapping and its inverse.
///
/// Every vertex of the graph appears exactly once, and slots that hold
/// vertices never overlap. The assignment is read-only for the rest of the
/// backend.
#[derive(Debug, Clone)]
pub struct PartitionAssignment {
    v2s: HashMap<VertexId, Slot>,
    s2v: BTreeMap<Slot, Vec<VertexId>>,
}

impl PartitionAssignment {
    /// Builds and validates an assignment.
    ///
    /// # Errors
    ///
    /// [`FloorplanError::DuplicateAssignment`] if a vertex appears twice,
    /// [`FloorplanError::UnassignedVertex`] if one is missing, and
    /// [`FloorplanError::OverlappingSlots`] if two occupied slots overlap.
    pub fn new(
        graph: &DataflowGraph,
        interner: &Interner,
        entries: impl IntoIterator<Item = (VertexId, Slot)>,
    ) -> Result<Self, FloorplanError> {
        let name_of = |v: VertexId| interner.resolve(graph.vertex(v).name).to_string();

        let mut v2s = HashMap::new();
        let mut s2v: BTreeMap<Slot, Vec<VertexId>> = BTreeMap::new();
        for (vertex, slot) in entries {
            if v2s.insert(vertex, slot.clone()).is_some() {
                return Err(FloorplanError::DuplicateAssignment(name_of(vertex)));
            }
            s2v.entry(slot).or_default().push(vertex);
        }
        if let Some(missing) = graph.vertices().find(|v| !v2s.contains_key(&v.id)) {
            return Err(FloorplanError::UnassignedVertex(name_of(missing.id)));
        }

        let occupied: Vec<&Slot> = s2v.keys().collect();
        for (i, a) in occupied.iter().enumerate() {
            for b in &occupied[i + 1..] {
                if a.rect().intersects(&b.rect()) {
                    return Err(FloorplanError::OverlappingSlots(a.name(), b.name()));
                }
            }
        }
        for vertices in s2v.values_mut() {
            vertices.sort();
        }
        Ok(Self { v2s, s2v })
    }

    /// The slot a vertex is assigned to.
    ///
    /// # Panics
    ///
    /// Panics if the vertex is not part of the graph this assignment was
    /// validated against.
    pub fn slot_of(&self, vertex: VertexId) -> &Slot {
        &self.v2s[&vertex]
    }

    /// The vertices assigned to a slot, in ID order.
    pub fn vertices_in(&self, slot: &Slot) -> &[VertexId] {
        self.s2v.get(slot).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The occupied slots in coordinate order.
    pub fn slots(&self) -> impl Iterator<Item = &Slot> {
        self.s2v.keys()
    }

    /// Returns `true` if the edge's endpoints sit in different slots.
    pub fn is_inter_slot(&self, edge: &Edge) -> bool {
        self.slot_of(edge.src) != self.slot_of(edge.dst)
    }

    /// Per-slot usage against capacity.
    pub fn usage(&self, graph: &DataflowGraph) -> Vec<SlotUsage> {
        self.s2v
            .iter()
            .map(|(slot, vertices)| {
                let usage: ResourceVector =
                    vertices.iter().map(|&v| graph.vertex(v).resources).sum();
                SlotUsage {
                    slot: slot.clone(),
                    usage,
                    exceeded: usage.exceeding(slot.resource_capacity()),
                }
            })
            .collect()
    }
}
