//! Distribution policies: how a family relates its plates and masks to those
//! of its parents.

use std::fmt;

use crate::error::Result;
use crate::mask::Mask;

/// Plate and mask bookkeeping shared by every node of a family.
///
/// Policies carry no mutable state and may be shared between nodes. The
/// defaults describe the common case where plates pass through unchanged.
pub trait Distribution: Send + Sync + fmt::Debug {
    /// Plates a child inherits from parent `index` with plates `parent_plates`.
    fn plates_from_parent(&self, _index: usize, parent_plates: &[usize]) -> Vec<usize> {
        parent_plates.to_vec()
    }

    /// Plates parent `index` sees for a child with plates `plates`.
    fn plates_to_parent(&self, _index: usize, plates: &[usize]) -> Vec<usize> {
        plates.to_vec()
    }

    /// Part of the child's mask that applies to parent `index`, still on the
    /// child's plate axes.
    fn compute_mask_to_parent(&self, _index: usize, mask: &Mask) -> Result<Mask> {
        Ok(mask.clone())
    }
}

/// Marker distribution for nodes defined only by a log-density.
///
/// It has no analytic moments, so messages to parents must be estimated by
/// sampling.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LogPdfDistribution;

impl Distribution for LogPdfDistribution {}
