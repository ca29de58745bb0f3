//! Scalar Gaussian node with fixed variational parameters.

use scirs2_core::ndarray::{ArrayD, Zip};
use scirs2_core::random::{Rng, RngCore};
use std::sync::Arc;

use crate::error::{Result, VmpError};
use crate::mask::Mask;
use crate::moments::{GaussianMoments, Moments, MomentsPolicy};
use crate::node::{ExponentialFamily, Node};

/// Draw from N(0, 1) with the Box-Muller transform.
pub fn standard_normal(rng: &mut dyn RngCore) -> f64 {
    // 1 - U keeps the logarithm finite
    let u1: f64 = 1.0 - rng.random::<f64>();
    let u2: f64 = rng.random();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

/// Independent Gaussian posterior `q(x) = N(mean, variance)` per plate.
///
/// Moments are `[E[x], E[x²]]`. Observing the node pins the observed copies
/// (their variance becomes zero).
#[derive(Debug, Clone)]
pub struct Gaussian {
    base: ExponentialFamily,
}

impl Gaussian {
    pub fn new(name: impl Into<String>, mean: ArrayD<f64>, variance: ArrayD<f64>) -> Result<Self> {
        if mean.shape() != variance.shape() {
            return Err(VmpError::InvalidConfig(format!(
                "mean shape {:?} differs from variance shape {:?}",
                mean.shape(),
                variance.shape()
            )));
        }
        if variance.iter().any(|&v| !(v.is_finite() && v >= 0.0)) {
            return Err(VmpError::InvalidConfig(
                "variance must be finite and non-negative".to_string(),
            ));
        }

        let policy = GaussianMoments::new(0);
        let dims = policy.dims_from_shape(&[])?;
        let plates = mean.shape().to_vec();
        let second = &mean * &mean + &variance;

        let mut base = ExponentialFamily::new(
            name,
            vec![],
            plates,
            dims,
            MomentsPolicy::Defined(Arc::new(policy)),
        );
        base.set_moments(vec![mean, second], &Mask::all_active())?;
        Ok(Self { base })
    }

    fn mean_and_variance(&self) -> Result<(ArrayD<f64>, ArrayD<f64>)> {
        let u = self.get_moments()?;
        let mean = u[0].clone();
        let variance = Zip::from(&u[1])
            .and(&mean)
            .map_collect(|&second, &m| (second - m * m).max(0.0));
        Ok((mean, variance))
    }
}

impl Node for Gaussian {
    fn base(&self) -> &ExponentialFamily {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ExponentialFamily {
        &mut self.base
    }

    fn random(&self, rng: &mut dyn RngCore) -> Result<ArrayD<f64>> {
        let (mean, variance) = self.mean_and_variance()?;
        Ok(Zip::from(&mean)
            .and(&variance)
            .map_collect(|&m, &v| m + v.sqrt() * standard_normal(rng)))
    }

    fn get_mean_and_variance(&self) -> Result<(ArrayD<f64>, ArrayD<f64>)> {
        self.mean_and_variance()
    }
}
