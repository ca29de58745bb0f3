//! Stochastic messages from a node to one of its parents.

use scirs2_core::ndarray::ArrayD;
use scirs2_core::random::RngCore;

use crate::density::DensitySource;
use crate::error::Result;
use crate::graph::ModelGraph;
use crate::mask::Mask;
use crate::node::{Node, NodeId};

/// A message to a parent together with the plates it applies to.
#[derive(Debug)]
pub struct ParentMessage<'a> {
    pub sampler: MessageSampler<'a>,
    /// Active plates of the message, on the parent's plate axes
    pub mask: Mask,
}

/// Monte-Carlo estimator of the expected log-density as a function of one
/// parent's value.
///
/// Every call to [`evaluate`](Self::evaluate) draws a fresh sample of the
/// node's own value and of every other parent. Calls at the same `x` therefore
/// return different values; callers that search over `x` (line searches,
/// finite differences) see this noise, since no random numbers are shared
/// between calls.
#[derive(Debug)]
pub struct MessageSampler<'a> {
    graph: &'a ModelGraph,
    node: &'a dyn Node,
    density: &'a DensitySource,
    index: usize,
    samples: usize,
}

impl<'a> MessageSampler<'a> {
    pub(crate) fn new(
        graph: &'a ModelGraph,
        node: &'a dyn Node,
        density: &'a DensitySource,
        index: usize,
        samples: usize,
    ) -> Self {
        Self {
            graph,
            node,
            density,
            index,
            samples,
        }
    }

    /// Index of the targeted parent.
    pub fn parent_index(&self) -> usize {
        self.index
    }

    /// Target parent's id in the graph.
    pub fn parent(&self) -> NodeId {
        self.node.parents()[self.index]
    }

    /// Draws averaged by [`estimate`](Self::estimate).
    pub fn samples(&self) -> usize {
        self.samples
    }

    /// Single-draw estimate of the log-density with `x` in the target slot.
    pub fn evaluate(&self, x: &ArrayD<f64>, rng: &mut dyn RngCore) -> Result<ArrayD<f64>> {
        let value = self.node.random(rng)?;

        let parents = self.node.parents();
        let mut inputs = Vec::with_capacity(parents.len());
        for (j, &parent) in parents.iter().enumerate() {
            if j == self.index {
                inputs.push(x.clone());
            } else {
                inputs.push(self.graph.node(parent)?.random(rng)?);
            }
        }

        self.density.evaluate(&value, &inputs)
    }

    /// Average of `samples` independent [`evaluate`](Self::evaluate) calls.
    pub fn estimate(&self, x: &ArrayD<f64>, rng: &mut dyn RngCore) -> Result<ArrayD<f64>> {
        let mut total = self.evaluate(x, rng)?;
        for _ in 1..self.samples {
            total = &total + &self.evaluate(x, rng)?;
        }
        Ok(total / self.samples as f64)
    }
}
