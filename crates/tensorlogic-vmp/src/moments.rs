//! Moments: sufficient statistics and conversion policies.
//!
//! A [`Moments`] policy knows how a family turns raw data into its tuple of
//! sufficient statistics. Nodes without an analytic family carry
//! [`MomentsPolicy::Undefined`] and use the raw value as their only statistic.

use scirs2_core::ndarray::{ArrayD, Dimension, IxDyn, Zip};
use std::fmt;
use std::sync::Arc;

use crate::error::{Result, VmpError};
use crate::mask::Mask;

/// Conversion of raw observations into sufficient statistics.
pub trait Moments: Send + Sync + fmt::Debug {
    /// Family name for diagnostics.
    fn name(&self) -> &str;

    /// Per-plate shape of each statistic for a variable of shape `shape`.
    fn dims_from_shape(&self, shape: &[usize]) -> Result<Vec<Vec<usize>>>;

    /// Compute the statistics of observed `data`.
    ///
    /// `mask` marks the plate copies that are actually observed; entries
    /// outside it are converted but not validated.
    fn compute_fixed_moments(
        &self,
        data: &ArrayD<f64>,
        extra: &[ArrayD<f64>],
        mask: &Mask,
    ) -> Result<Vec<ArrayD<f64>>>;
}

/// Which moments conversion a node uses.
#[derive(Clone, Debug, Default)]
pub enum MomentsPolicy {
    /// No analytic form: statistics are the raw value plus any extra arrays.
    #[default]
    Undefined,
    /// Family-specific conversion.
    Defined(Arc<dyn Moments>),
}

impl MomentsPolicy {
    pub fn is_defined(&self) -> bool {
        matches!(self, MomentsPolicy::Defined(_))
    }

    pub fn name(&self) -> &str {
        match self {
            MomentsPolicy::Defined(policy) => policy.name(),
            MomentsPolicy::Undefined => "undefined",
        }
    }

    /// Convert observed data into statistics according to the policy.
    pub fn fixed_moments(
        &self,
        data: ArrayD<f64>,
        extra: Vec<ArrayD<f64>>,
        mask: &Mask,
    ) -> Result<Vec<ArrayD<f64>>> {
        match self {
            MomentsPolicy::Defined(policy) => policy.compute_fixed_moments(&data, &extra, mask),
            MomentsPolicy::Undefined => {
                let mut u = Vec::with_capacity(1 + extra.len());
                u.push(data);
                u.extend(extra);
                Ok(u)
            }
        }
    }
}

/// Current statistics held by a node.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum MomentState {
    /// Not yet observed or updated.
    #[default]
    Undefined,
    /// Statistics, one array per moment slot.
    Fixed(Vec<ArrayD<f64>>),
}

impl MomentState {
    pub fn is_defined(&self) -> bool {
        matches!(self, MomentState::Fixed(_))
    }

    pub fn as_slice(&self) -> Option<&[ArrayD<f64>]> {
        match self {
            MomentState::Fixed(u) => Some(u),
            MomentState::Undefined => None,
        }
    }
}

/// Gaussian statistics `[x, x xᵀ]` over the last `ndim` axes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GaussianMoments {
    pub ndim: usize,
}

impl GaussianMoments {
    pub fn new(ndim: usize) -> Self {
        Self { ndim }
    }

    /// Outer product of `x` with itself over the trailing `ndim` axes.
    fn outer(&self, x: &ArrayD<f64>) -> ArrayD<f64> {
        let split = x.ndim() - self.ndim;
        let mut shape = x.shape().to_vec();
        shape.extend_from_slice(&x.shape()[split..]);

        ArrayD::from_shape_fn(IxDyn(&shape), |idx| {
            let idx = idx.slice();
            let left = &idx[..split + self.ndim];
            let right: Vec<usize> = idx[..split]
                .iter()
                .chain(&idx[split + self.ndim..])
                .copied()
                .collect();
            x[left] * x[right.as_slice()]
        })
    }
}

impl Moments for GaussianMoments {
    fn name(&self) -> &str {
        "gaussian"
    }

    fn dims_from_shape(&self, shape: &[usize]) -> Result<Vec<Vec<usize>>> {
        if shape.len() != self.ndim {
            return Err(VmpError::InvalidConfig(format!(
                "gaussian moments of {} dimensions cannot describe shape {:?}",
                self.ndim, shape
            )));
        }
        let mut squared = shape.to_vec();
        squared.extend_from_slice(shape);
        Ok(vec![shape.to_vec(), squared])
    }

    fn compute_fixed_moments(
        &self,
        data: &ArrayD<f64>,
        _extra: &[ArrayD<f64>],
        _mask: &Mask,
    ) -> Result<Vec<ArrayD<f64>>> {
        if data.ndim() < self.ndim {
            return Err(VmpError::InvalidObservation(format!(
                "gaussian observation needs at least {} axes, got {}",
                self.ndim,
                data.ndim()
            )));
        }
        Ok(vec![data.clone(), self.outer(data)])
    }
}

/// Gamma statistics `[x, ln x]` for scalar positive variables.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GammaMoments;

impl Moments for GammaMoments {
    fn name(&self) -> &str {
        "gamma"
    }

    fn dims_from_shape(&self, shape: &[usize]) -> Result<Vec<Vec<usize>>> {
        if !shape.is_empty() {
            return Err(VmpError::InvalidConfig(format!(
                "gamma moments are scalar, got shape {:?}",
                shape
            )));
        }
        Ok(vec![vec![], vec![]])
    }

    fn compute_fixed_moments(
        &self,
        data: &ArrayD<f64>,
        _extra: &[ArrayD<f64>],
        mask: &Mask,
    ) -> Result<Vec<ArrayD<f64>>> {
        let active = mask.broadcast_to(data.shape())?;
        let mut invalid = false;
        Zip::from(data).and(&active).for_each(|&x, &m| {
            if m && !(x > 0.0) {
                invalid = true;
            }
        });
        if invalid {
            return Err(VmpError::InvalidObservation(
                "gamma observations must be positive".to_string(),
            ));
        }
        Ok(vec![data.clone(), data.mapv(f64::ln)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use scirs2_core::ndarray::Array;

    #[test]
    fn test_undefined_policy_passes_raw_value_through() {
        let x = Array::from_vec(vec![1.0, 2.0]).into_dyn();
        let extra = Array::from_vec(vec![3.0, 4.0]).into_dyn();
        let u = MomentsPolicy::Undefined
            .fixed_moments(x.clone(), vec![extra.clone()], &Mask::all_active())
            .unwrap();
        assert_eq!(u, vec![x, extra]);
    }

    #[test]
    fn test_gaussian_scalar_moments() {
        let policy = GaussianMoments::new(0);
        let x = Array::from_vec(vec![1.0, -2.0, 3.0]).into_dyn();
        let u = policy
            .compute_fixed_moments(&x, &[], &Mask::all_active())
            .unwrap();
        assert_eq!(u[1].shape(), &[3]);
        assert_abs_diff_eq!(u[1][[1]], 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_gaussian_vector_outer_product() {
        let policy = GaussianMoments::new(1);
        assert_eq!(
            policy.dims_from_shape(&[2]).unwrap(),
            vec![vec![2], vec![2, 2]]
        );

        let x = Array::from_shape_vec(vec![1, 2], vec![2.0, 3.0])
            .unwrap()
            .into_dyn();
        let u = policy
            .compute_fixed_moments(&x, &[], &Mask::all_active())
            .unwrap();
        assert_eq!(u[1].shape(), &[1, 2, 2]);
        assert_abs_diff_eq!(u[1][[0, 0, 1]], 6.0, epsilon = 1e-12);
        assert_abs_diff_eq!(u[1][[0, 1, 1]], 9.0, epsilon = 1e-12);
    }

    #[test]
    fn test_gamma_rejects_non_positive_active_entries() {
        let x = Array::from_vec(vec![1.0, -1.0]).into_dyn();
        let err = GammaMoments
            .compute_fixed_moments(&x, &[], &Mask::all_active())
            .unwrap_err();
        assert!(matches!(err, VmpError::InvalidObservation(_)));

        // Masked-out entry is not validated
        let mask = Mask::from_shape_vec(vec![2], vec![true, false]).unwrap();
        assert!(GammaMoments.compute_fixed_moments(&x, &[], &mask).is_ok());
    }

    #[test]
    fn test_gamma_rejects_nan() {
        let x = Array::from_vec(vec![1.0, f64::NAN]).into_dyn();
        let err = GammaMoments
            .compute_fixed_moments(&x, &[], &Mask::all_active())
            .unwrap_err();
        assert!(matches!(err, VmpError::InvalidObservation(_)));
    }

    #[test]
    fn test_policy_names() {
        assert_eq!(MomentsPolicy::Undefined.name(), "undefined");
        assert_eq!(
            MomentsPolicy::Defined(Arc::new(GammaMoments)).name(),
            "gamma"
        );
        assert_eq!(GaussianMoments::new(1).name(), "gaussian");
    }

    #[test]
    fn test_moment_state_accessors() {
        assert!(!MomentState::Undefined.is_defined());
        assert!(MomentState::Undefined.as_slice().is_none());
        let state = MomentState::Fixed(vec![ArrayD::zeros(IxDyn(&[2]))]);
        assert_eq!(state.as_slice().map(<[_]>::len), Some(1));
    }
}
