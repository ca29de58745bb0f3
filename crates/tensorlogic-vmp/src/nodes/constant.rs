//! Deterministic node.

use scirs2_core::ndarray::ArrayD;
use scirs2_core::random::RngCore;

use crate::error::{Result, VmpError};
use crate::mask::Mask;
use crate::moments::MomentsPolicy;
use crate::node::{ExponentialFamily, Node};

/// Node with a fixed value.
///
/// The trailing `ndim` axes of the value are the variable's own dims; the
/// leading axes are plates. Every copy counts as observed.
#[derive(Debug, Clone)]
pub struct Constant {
    base: ExponentialFamily,
}

impl Constant {
    pub fn new(name: impl Into<String>, value: ArrayD<f64>, ndim: usize) -> Result<Self> {
        if ndim > value.ndim() {
            return Err(VmpError::InvalidConfig(format!(
                "constant of rank {} cannot have {} variable dimensions",
                value.ndim(),
                ndim
            )));
        }
        let split = value.ndim() - ndim;
        let plates = value.shape()[..split].to_vec();
        let dims = vec![value.shape()[split..].to_vec()];

        let mut base = ExponentialFamily::new(name, vec![], plates, dims, MomentsPolicy::Undefined);
        base.observe(value, vec![], Mask::all_active())?;
        Ok(Self { base })
    }
}

impl Node for Constant {
    fn base(&self) -> &ExponentialFamily {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ExponentialFamily {
        &mut self.base
    }

    fn random(&self, _rng: &mut dyn RngCore) -> Result<ArrayD<f64>> {
        Ok(self.get_moments()?[0].clone())
    }

    fn observe(&mut self, _x: ArrayD<f64>, _extra: Vec<ArrayD<f64>>, _mask: Mask) -> Result<()> {
        Err(VmpError::Unsupported(format!(
            "constant '{}' cannot be observed",
            self.name()
        )))
    }
}
