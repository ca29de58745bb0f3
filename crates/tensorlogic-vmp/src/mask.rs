//! Plate masks.
//!
//! A [`Mask`] marks which plate copies of a variable are active. Masks are
//! stored compactly and broadcast against the plates on demand, so a scalar
//! `true` means "every copy is active" whatever the plates are.

use scirs2_core::ndarray::{ArrayD, Axis, IxDyn, Zip};

use crate::error::{Result, VmpError};
use crate::plates::{broadcast_pair, is_broadcastable_to, moment_shape};

/// Boolean plate mask, broadcastable against a node's plates.
#[derive(Clone, Debug, PartialEq)]
pub struct Mask {
    values: ArrayD<bool>,
}

impl Mask {
    /// Scalar mask with every copy active.
    pub fn all_active() -> Self {
        Self::from(true)
    }

    /// Scalar mask with every copy inactive.
    pub fn all_inactive() -> Self {
        Self::from(false)
    }

    /// Build a mask from a shape and row-major values.
    pub fn from_shape_vec(shape: Vec<usize>, values: Vec<bool>) -> Result<Self> {
        let expected: usize = shape.iter().product();
        let got = values.len();
        let values = ArrayD::from_shape_vec(IxDyn(&shape), values).map_err(|_| {
            VmpError::InvalidConfig(format!(
                "mask of shape {:?} needs {} values, got {}",
                shape, expected, got
            ))
        })?;
        Ok(Self { values })
    }

    /// Shape of the stored (unbroadcast) mask.
    pub fn shape(&self) -> &[usize] {
        self.values.shape()
    }

    /// Underlying boolean array.
    pub fn as_array(&self) -> &ArrayD<bool> {
        &self.values
    }

    /// True when every stored entry is active.
    pub fn is_all_active(&self) -> bool {
        self.values.iter().all(|&v| v)
    }

    /// True when at least one stored entry is active.
    pub fn is_any_active(&self) -> bool {
        self.values.iter().any(|&v| v)
    }

    /// Expand the mask to exactly `plates`.
    pub fn broadcast_to(&self, plates: &[usize]) -> Result<ArrayD<bool>> {
        if !is_broadcastable_to(self.shape(), plates) {
            return Err(self.invalid_for(plates));
        }
        self.values
            .broadcast(IxDyn(plates))
            .map(|view| view.to_owned())
            .ok_or_else(|| self.invalid_for(plates))
    }

    /// Expand the mask to `plates ++ dims`, repeating each plate entry over the
    /// trailing variable axes.
    pub fn broadcast_over(&self, plates: &[usize], dims: &[usize]) -> Result<ArrayD<bool>> {
        let mut expanded = self.broadcast_to(plates)?;
        for _ in dims {
            let ndim = expanded.ndim();
            expanded = expanded.insert_axis(Axis(ndim));
        }
        let full = moment_shape(plates, dims);
        expanded
            .broadcast(IxDyn(&full))
            .map(|view| view.to_owned())
            .ok_or_else(|| self.invalid_for(plates))
    }

    /// Elementwise logical or, broadcasting both masks.
    pub fn or(&self, other: &Mask) -> Result<Mask> {
        let shape = broadcast_pair(self.shape(), other.shape())?;
        let left = self.broadcast_to(&shape)?;
        let right = other.broadcast_to(&shape)?;
        let values = Zip::from(&left)
            .and(&right)
            .map_collect(|&a, &b| a || b);
        Ok(Self { values })
    }

    /// Collapse the mask onto `parent_plates`.
    ///
    /// Axes the parent does not have, or has with length 1, are reduced with
    /// logical or. A parent plate is active iff some active child plate maps
    /// onto it.
    pub fn reduce_to_plates(&self, parent_plates: &[usize]) -> Result<Mask> {
        let mut values = self.values.clone();
        let ndim = values.ndim();
        let leading = ndim.saturating_sub(parent_plates.len());

        for k in 0..ndim {
            let len = values.shape()[k];
            let collapse = if k < leading {
                true
            } else {
                let parent = parent_plates[parent_plates.len() - (ndim - k)];
                if parent == 1 {
                    len != 1
                } else if len == 1 || len == parent {
                    false
                } else {
                    return Err(VmpError::PlateMismatch {
                        left: self.shape().to_vec(),
                        right: parent_plates.to_vec(),
                    });
                }
            };
            if collapse {
                values = values
                    .map_axis(Axis(k), |lane| lane.iter().any(|&v| v))
                    .insert_axis(Axis(k));
            }
        }

        // Drop the (now unit) leading axes the parent does not have
        for _ in 0..leading {
            values = values.index_axis_move(Axis(0), 0);
        }

        Ok(Self { values })
    }

    fn invalid_for(&self, plates: &[usize]) -> VmpError {
        VmpError::InvalidMask {
            mask: self.shape().to_vec(),
            plates: plates.to_vec(),
        }
    }
}

impl Default for Mask {
    fn default() -> Self {
        Self::all_active()
    }
}

impl From<bool> for Mask {
    fn from(value: bool) -> Self {
        Self {
            values: ArrayD::from_elem(IxDyn(&[]), value),
        }
    }
}

impl From<ArrayD<bool>> for Mask {
    fn from(values: ArrayD<bool>) -> Self {
        Self { values }
    }
}
