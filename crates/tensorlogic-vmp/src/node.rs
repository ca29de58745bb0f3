//! Node contract and the shared exponential-family state.
//!
//! Every node in a [`ModelGraph`](crate::graph::ModelGraph) exposes plates,
//! dims, a mask and its current moments. The bookkeeping for those lives in
//! [`ExponentialFamily`], which concrete nodes embed and hand out through
//! [`Node::base`].

use scirs2_core::ndarray::{ArrayD, IxDyn, Zip};
use scirs2_core::random::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, VmpError};
use crate::graph::ModelGraph;
use crate::mask::Mask;
use crate::message::ParentMessage;
use crate::moments::{MomentState, MomentsPolicy};
use crate::plates::moment_shape;

/// Index of a node inside a [`ModelGraph`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// State common to all stochastic nodes.
#[derive(Clone, Debug)]
pub struct ExponentialFamily {
    name: String,
    parents: Vec<NodeId>,
    plates: Vec<usize>,
    dims: Vec<Vec<usize>>,
    policy: MomentsPolicy,
    moments: MomentState,
    observed: Mask,
    children_mask: Mask,
    mask: Mask,
}

impl ExponentialFamily {
    /// Create a node state with undefined moments and nothing observed.
    pub fn new(
        name: impl Into<String>,
        parents: Vec<NodeId>,
        plates: Vec<usize>,
        dims: Vec<Vec<usize>>,
        policy: MomentsPolicy,
    ) -> Self {
        Self {
            name: name.into(),
            parents,
            plates,
            dims,
            policy,
            moments: MomentState::Undefined,
            observed: Mask::all_inactive(),
            children_mask: Mask::all_inactive(),
            mask: Mask::all_inactive(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parents(&self) -> &[NodeId] {
        &self.parents
    }

    pub fn plates(&self) -> &[usize] {
        &self.plates
    }

    pub fn dims(&self) -> &[Vec<usize>] {
        &self.dims
    }

    pub fn policy(&self) -> &MomentsPolicy {
        &self.policy
    }

    pub fn moments(&self) -> &MomentState {
        &self.moments
    }

    pub fn observed(&self) -> &Mask {
        &self.observed
    }

    pub fn mask(&self) -> &Mask {
        &self.mask
    }

    /// Shape of moment `index`: `plates ++ dims[index]`.
    pub fn get_shape(&self, index: usize) -> Result<Vec<usize>> {
        let dims = self.dims.get(index).ok_or_else(|| {
            VmpError::InvalidConfig(format!(
                "node '{}' has {} moments, requested moment {}",
                self.name,
                self.dims.len(),
                index
            ))
        })?;
        Ok(moment_shape(&self.plates, dims))
    }

    /// Overwrite the masked-active entries of the moments with `u`.
    ///
    /// Shapes must match `plates ++ dims[i]` exactly. Entries outside the mask
    /// keep their previous values (NaN if the moments were undefined). Nothing
    /// is modified when validation fails.
    pub fn set_moments(&mut self, u: Vec<ArrayD<f64>>, mask: &Mask) -> Result<()> {
        self.moments = MomentState::Fixed(self.merge_moments(u, mask)?);
        Ok(())
    }

    /// Fix the node to observed data.
    ///
    /// Converts `x` (and `extra`) into statistics with the node's moments
    /// policy, checks the shape contract, sets the moments under `mask` and
    /// marks the masked copies as observed.
    pub fn observe(&mut self, x: ArrayD<f64>, extra: Vec<ArrayD<f64>>, mask: Mask) -> Result<()> {
        mask.broadcast_to(&self.plates)?;
        // Policies convert per plate copy, so the data must already have the
        // node's shape
        if self.policy.is_defined() {
            let expected = self.get_shape(0)?;
            if x.shape() != expected.as_slice() {
                return Err(VmpError::ShapeMismatch {
                    index: 0,
                    got: x.shape().to_vec(),
                    expected,
                });
            }
        }

        let u = self.policy.fixed_moments(x, extra, &mask)?;
        let merged = self.merge_moments(u, &mask)?;
        let new_mask = self.children_mask.or(&mask)?;

        self.moments = MomentState::Fixed(merged);
        self.observed = mask;
        self.mask = new_mask;

        tracing::debug!(
            node = %self.name,
            plates = ?self.plates,
            policy = self.policy.name(),
            all_observed = self.observed.is_all_active(),
            "observed node"
        );
        Ok(())
    }

    /// Replace the mask contributed by children and recompute the node mask.
    ///
    /// Observed copies stay active whatever the children say.
    pub fn set_children_mask(&mut self, children_mask: Mask) -> Result<()> {
        children_mask.broadcast_to(&self.plates)?;
        self.mask = children_mask.or(&self.observed)?;
        self.children_mask = children_mask;
        Ok(())
    }

    fn check_shapes(&self, u: &[ArrayD<f64>]) -> Result<()> {
        if u.len() != self.dims.len() {
            return Err(VmpError::MomentCountMismatch {
                expected: self.dims.len(),
                got: u.len(),
            });
        }
        for (index, (v, dims)) in u.iter().zip(&self.dims).enumerate() {
            let expected = moment_shape(&self.plates, dims);
            if v.shape() != expected.as_slice() {
                return Err(VmpError::ShapeMismatch {
                    index,
                    got: v.shape().to_vec(),
                    expected,
                });
            }
        }
        Ok(())
    }

    fn merge_moments(&self, u: Vec<ArrayD<f64>>, mask: &Mask) -> Result<Vec<ArrayD<f64>>> {
        self.check_shapes(&u)?;
        let active = mask.broadcast_to(&self.plates)?;
        if active.iter().all(|&m| m) {
            return Ok(u);
        }

        let mut merged = Vec::with_capacity(u.len());
        for (i, (new, dims)) in u.into_iter().zip(&self.dims).enumerate() {
            let mut prior = match &self.moments {
                MomentState::Fixed(old) => old[i].clone(),
                MomentState::Undefined => ArrayD::from_elem(IxDyn(new.shape()), f64::NAN),
            };
            let active = mask.broadcast_over(&self.plates, dims)?;
            Zip::from(&mut prior)
                .and(&new)
                .and(&active)
                .for_each(|p, &n, &m| {
                    if m {
                        *p = n;
                    }
                });
            merged.push(prior);
        }
        Ok(merged)
    }
}

/// Graph-facing contract of a node.
///
/// Implementors embed an [`ExponentialFamily`]; the provided methods read the
/// shared state from it.
pub trait Node: fmt::Debug {
    fn base(&self) -> &ExponentialFamily;

    fn base_mut(&mut self) -> &mut ExponentialFamily;

    /// Draw one sample of the node's value from its current posterior.
    fn random(&self, rng: &mut dyn RngCore) -> Result<ArrayD<f64>>;

    fn name(&self) -> &str {
        self.base().name()
    }

    fn parents(&self) -> &[NodeId] {
        self.base().parents()
    }

    fn plates(&self) -> &[usize] {
        self.base().plates()
    }

    fn dims(&self) -> &[Vec<usize>] {
        self.base().dims()
    }

    fn mask(&self) -> &Mask {
        self.base().mask()
    }

    fn observed(&self) -> &Mask {
        self.base().observed()
    }

    fn get_shape(&self, index: usize) -> Result<Vec<usize>> {
        self.base().get_shape(index)
    }

    fn get_moments(&self) -> Result<&[ArrayD<f64>]> {
        self.base()
            .moments()
            .as_slice()
            .ok_or_else(|| VmpError::MomentsUndefined(self.name().to_string()))
    }

    /// Mean and variance of the value.
    ///
    /// The default treats the first moment as a point value with no spread.
    fn get_mean_and_variance(&self) -> Result<(ArrayD<f64>, ArrayD<f64>)> {
        let mean = self.get_moments()?[0].clone();
        let variance = ArrayD::zeros(mean.raw_dim());
        Ok((mean, variance))
    }

    fn observe(&mut self, x: ArrayD<f64>, extra: Vec<ArrayD<f64>>, mask: Mask) -> Result<()> {
        self.base_mut().observe(x, extra, mask)
    }

    fn set_children_mask(&mut self, mask: Mask) -> Result<()> {
        self.base_mut().set_children_mask(mask)
    }

    /// The node's mask as seen by parent `index`, collapsed onto
    /// `parent_plates`.
    fn mask_to_parent(&self, index: usize, parent_plates: &[usize]) -> Result<Mask> {
        self.check_parent_index(index)?;
        self.mask().reduce_to_plates(parent_plates)
    }

    /// Message from this node to parent `index`.
    fn message_to_parent<'a>(
        &'a self,
        _graph: &'a ModelGraph,
        index: usize,
    ) -> Result<ParentMessage<'a>> {
        self.check_parent_index(index)?;
        Err(VmpError::Unsupported(format!(
            "node '{}' does not send messages to its parents",
            self.name()
        )))
    }

    fn check_parent_index(&self, index: usize) -> Result<()> {
        let count = self.parents().len();
        if index >= count {
            return Err(VmpError::ParentIndexOutOfRange { index, count });
        }
        Ok(())
    }
}
