//! User supplied log-densities.
//!
//! A density can be given either as a type implementing [`LogDensity`] or as a
//! plain closure. The choice is made once, when the [`DensitySource`] is built,
//! and evaluation dispatches on the stored variant.

use scirs2_core::ndarray::ArrayD;
use std::fmt;
use std::sync::Arc;

use crate::error::{Result, VmpError};

/// A log-density over a node's value and its parents' values.
///
/// Implementations return one log-density contribution per plate copy; the
/// arrays they receive have shape `plates ++ dims[0]` of the respective node.
pub trait LogDensity: Send + Sync {
    fn log_density(&self, value: &ArrayD<f64>, parents: &[ArrayD<f64>]) -> Result<ArrayD<f64>>;
}

type DensityFn = dyn Fn(&ArrayD<f64>, &[ArrayD<f64>]) -> Result<ArrayD<f64>> + Send + Sync;

/// How a node's log-density is provided.
#[derive(Clone)]
pub enum DensitySource {
    /// Object exposing a `log_density` method.
    Method(Arc<dyn LogDensity>),
    /// Bare callable.
    Callable(Arc<DensityFn>),
}

impl DensitySource {
    pub fn from_method(density: impl LogDensity + 'static) -> Self {
        Self::Method(Arc::new(density))
    }

    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&ArrayD<f64>, &[ArrayD<f64>]) -> Result<ArrayD<f64>> + Send + Sync + 'static,
    {
        Self::Callable(Arc::new(f))
    }

    /// Evaluate the log-density. Errors from the density propagate unchanged.
    pub fn evaluate(&self, value: &ArrayD<f64>, parents: &[ArrayD<f64>]) -> Result<ArrayD<f64>> {
        match self {
            Self::Method(density) => density.log_density(value, parents),
            Self::Callable(f) => f(value, parents),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Method(_) => "method",
            Self::Callable(_) => "callable",
        }
    }
}

impl fmt::Debug for DensitySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DensitySource").field(&self.kind()).finish()
    }
}

/// Gaussian log-density `log N(x | μ, 1/τ)` with the mean taken from the first
/// parent and a fixed precision τ.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GaussianLogDensity {
    pub precision: f64,
}

impl GaussianLogDensity {
    pub fn new(precision: f64) -> Result<Self> {
        if !(precision.is_finite() && precision > 0.0) {
            return Err(VmpError::InvalidConfig(format!(
                "precision must be positive and finite, got {}",
                precision
            )));
        }
        Ok(Self { precision })
    }
}

impl LogDensity for GaussianLogDensity {
    fn log_density(&self, value: &ArrayD<f64>, parents: &[ArrayD<f64>]) -> Result<ArrayD<f64>> {
        let mean = parents
            .first()
            .ok_or_else(|| VmpError::Density("gaussian density needs a mean parent".to_string()))?;
        let norm = 0.5 * (self.precision / (2.0 * std::f64::consts::PI)).ln();
        let diff = value - mean;
        Ok(diff.mapv(|d| norm - 0.5 * self.precision * d * d))
    }
}
