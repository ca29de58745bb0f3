//! Model graph: owns nodes and routes observations, messages and masks.

use scirs2_core::ndarray::ArrayD;
use std::collections::HashMap;

use crate::config::LogPdfConfig;
use crate::density::DensitySource;
use crate::error::{Result, VmpError};
use crate::logpdf::LogPdf;
use crate::mask::Mask;
use crate::message::ParentMessage;
use crate::node::{Node, NodeId};

/// Directed graph of nodes, parents before children.
///
/// Nodes can only reference parents that are already in the graph, so
/// insertion order is a topological order.
#[derive(Debug, Default)]
pub struct ModelGraph {
    /// Nodes in insertion order
    nodes: Vec<Box<dyn Node>>,
    /// Name -> id
    names: HashMap<String, NodeId>,
    /// Adjacency: parent -> (child, parent slot in child)
    children: HashMap<NodeId, Vec<(NodeId, usize)>>,
}

impl ModelGraph {
    /// Create a new empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node. All its parents must already be in the graph and its name
    /// must be unique.
    pub fn add_node<N: Node + 'static>(&mut self, node: N) -> Result<NodeId> {
        let id = NodeId(self.nodes.len());

        if self.names.contains_key(node.name()) {
            return Err(VmpError::InvalidConfig(format!(
                "duplicate node name '{}'",
                node.name()
            )));
        }
        for &parent in node.parents() {
            self.node(parent)?;
        }

        for (slot, &parent) in node.parents().iter().enumerate() {
            self.children.entry(parent).or_default().push((id, slot));
        }
        self.names.insert(node.name().to_string(), id);
        self.nodes.push(Box::new(node));

        tracing::trace!(node = %id, total = self.nodes.len(), "added node");
        Ok(id)
    }

    /// Build a [`LogPdf`] node over existing parents and add it.
    pub fn add_logpdf(
        &mut self,
        name: impl Into<String>,
        density: DensitySource,
        parents: Vec<NodeId>,
        config: LogPdfConfig,
    ) -> Result<NodeId> {
        let node = LogPdf::new(self, name, density, parents, config)?;
        self.add_node(node)
    }

    /// Get a node.
    pub fn node(&self, id: NodeId) -> Result<&dyn Node> {
        self.nodes
            .get(id.0)
            .map(|node| node.as_ref())
            .ok_or_else(|| VmpError::NodeNotFound(id.to_string()))
    }

    /// Get a node mutably.
    pub fn node_mut(&mut self, id: NodeId) -> Result<&mut (dyn Node + 'static)> {
        match self.nodes.get_mut(id.0) {
            Some(node) => Ok(node.as_mut()),
            None => Err(VmpError::NodeNotFound(id.to_string())),
        }
    }

    /// Look up a node id by name.
    pub fn id_of(&self, name: &str) -> Option<NodeId> {
        self.names.get(name).copied()
    }

    /// Children of a node with the parent slot they use.
    pub fn children_of(&self, id: NodeId) -> &[(NodeId, usize)] {
        self.children.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Get number of nodes.
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Check if graph is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Ids in insertion (topological) order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId)
    }

    /// Observe a node and refresh the masks of the whole graph.
    pub fn observe(
        &mut self,
        id: NodeId,
        x: ArrayD<f64>,
        extra: Vec<ArrayD<f64>>,
        mask: Mask,
    ) -> Result<()> {
        self.node_mut(id)?.observe(x, extra, mask)?;
        self.propagate_masks()
    }

    /// Message from `child` to its parent in slot `index`.
    pub fn message_to_parent(&self, child: NodeId, index: usize) -> Result<ParentMessage<'_>> {
        self.node(child)?.message_to_parent(self, index)
    }

    /// Recompute every node's mask from its observations and its children.
    ///
    /// Children come after parents, so one reverse sweep reaches every node
    /// after all of its children.
    pub fn propagate_masks(&mut self) -> Result<()> {
        let mut from_children = vec![Mask::all_inactive(); self.nodes.len()];

        for idx in (0..self.nodes.len()).rev() {
            let children_mask = std::mem::replace(&mut from_children[idx], Mask::all_inactive());
            self.nodes[idx].set_children_mask(children_mask)?;

            let node = &self.nodes[idx];
            for (slot, &parent) in node.parents().iter().enumerate() {
                let to_parent = node.mask_to_parent(slot, self.nodes[parent.0].plates())?;
                from_children[parent.0] = from_children[parent.0].or(&to_parent)?;
            }
        }

        tracing::trace!(nodes = self.nodes.len(), "propagated masks");
        Ok(())
    }
}
