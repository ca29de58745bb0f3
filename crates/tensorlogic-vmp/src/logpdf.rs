//! Node with an arbitrary log-density.
//!
//! [`LogPdf`] is an exponential-family node whose distribution is known only
//! through a user supplied log-density `log p(x | parents)`. It has no closed
//! form moments, so the message to a parent is a Monte-Carlo estimator of the
//! expected log-density as a function of that parent's value.
//!
//! # Example
//!
//! ```
//! use scirs2_core::ndarray::{Array, ArrayD};
//! use tensorlogic_vmp::{Constant, DensitySource, LogPdfConfig, Mask, ModelGraph, Node};
//!
//! let mut graph = ModelGraph::new();
//! let mu = graph
//!     .add_node(Constant::new("mu", Array::from_vec(vec![0.0; 4]).into_dyn(), 0).unwrap())
//!     .unwrap();
//! let x = graph
//!     .add_logpdf(
//!         "x",
//!         DensitySource::from_fn(|x: &ArrayD<f64>, p: &[ArrayD<f64>]| {
//!             Ok((x - &p[0]).mapv(|d| -d * d))
//!         }),
//!         vec![mu],
//!         LogPdfConfig::default(),
//!     )
//!     .unwrap();
//!
//! graph
//!     .observe(x, Array::zeros(vec![4]).into_dyn(), vec![], Mask::all_active())
//!     .unwrap();
//! assert!(graph.node(x).unwrap().observed().is_all_active());
//! ```

use scirs2_core::ndarray::ArrayD;
use scirs2_core::random::RngCore;

use crate::config::LogPdfConfig;
use crate::density::DensitySource;
use crate::distribution::{Distribution, LogPdfDistribution};
use crate::error::Result;
use crate::graph::ModelGraph;
use crate::mask::Mask;
use crate::message::{MessageSampler, ParentMessage};
use crate::moments::MomentsPolicy;
use crate::node::{ExponentialFamily, Node, NodeId};
use crate::plates::total_plates;

/// General node with an arbitrary probability density function.
#[derive(Debug)]
pub struct LogPdf {
    base: ExponentialFamily,
    density: DensitySource,
    distribution: LogPdfDistribution,
    samples: usize,
}

impl LogPdf {
    /// Build a node from a density and parents already present in `graph`.
    ///
    /// The node has a single moment slot with dims `[config.shape]`. Its plates
    /// are the broadcast union of the parents' plates, or `config.plates` when
    /// given. Moments start undefined.
    pub fn new(
        graph: &ModelGraph,
        name: impl Into<String>,
        density: DensitySource,
        parents: Vec<NodeId>,
        config: LogPdfConfig,
    ) -> Result<Self> {
        config.validate()?;

        let distribution = LogPdfDistribution;
        let mut parent_plates = Vec::with_capacity(parents.len());
        for (i, &parent) in parents.iter().enumerate() {
            let plates = graph.node(parent)?.plates();
            parent_plates.push(distribution.plates_from_parent(i, plates));
        }
        let plates = total_plates(config.plates.as_deref(), &parent_plates)?;
        let dims = vec![config.shape];

        let base = ExponentialFamily::new(name, parents, plates, dims, MomentsPolicy::Undefined);
        tracing::debug!(
            node = %base.name(),
            plates = ?base.plates(),
            dims = ?base.dims(),
            density = density.kind(),
            samples = config.samples,
            "created log-density node"
        );

        Ok(Self {
            base,
            density,
            distribution,
            samples: config.samples,
        })
    }

    pub fn density(&self) -> &DensitySource {
        &self.density
    }

    pub fn distribution(&self) -> &LogPdfDistribution {
        &self.distribution
    }

    pub fn samples(&self) -> usize {
        self.samples
    }
}

impl Node for LogPdf {
    fn base(&self) -> &ExponentialFamily {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ExponentialFamily {
        &mut self.base
    }

    /// The density has no sampler of its own; a draw is the fixed value set by
    /// `observe` or by the inference loop.
    fn random(&self, _rng: &mut dyn RngCore) -> Result<ArrayD<f64>> {
        Ok(self.get_moments()?[0].clone())
    }

    fn mask_to_parent(&self, index: usize, parent_plates: &[usize]) -> Result<Mask> {
        self.check_parent_index(index)?;
        let mask = self.distribution.compute_mask_to_parent(index, self.mask())?;
        let seen = self.distribution.plates_to_parent(index, self.plates());
        Mask::from(mask.broadcast_to(&seen)?).reduce_to_plates(parent_plates)
    }

    fn message_to_parent<'a>(
        &'a self,
        graph: &'a ModelGraph,
        index: usize,
    ) -> Result<ParentMessage<'a>> {
        self.check_parent_index(index)?;
        let parent = self.parents()[index];
        let parent_plates = graph.node(parent)?.plates();
        let mask = self.mask_to_parent(index, parent_plates)?;

        tracing::trace!(
            node = %self.name(),
            parent = %parent,
            index,
            "sampled message to parent"
        );

        Ok(ParentMessage {
            sampler: MessageSampler::new(graph, self, &self.density, index, self.samples),
            mask,
        })
    }
}
