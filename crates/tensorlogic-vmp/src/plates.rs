//! Plate shape arithmetic.
//!
//! Plates follow numpy broadcasting: shapes are aligned on the right, an axis of
//! length 1 (or a missing leading axis) broadcasts against any length, and any
//! other pair of lengths must agree.

use crate::error::{Result, VmpError};

/// Broadcast two plate shapes together.
pub fn broadcast_pair(left: &[usize], right: &[usize]) -> Result<Vec<usize>> {
    let ndim = left.len().max(right.len());
    let mut out = vec![1; ndim];

    for (k, slot) in out.iter_mut().enumerate() {
        // Offsets from the right
        let a = axis_from_right(left, ndim - 1 - k);
        let b = axis_from_right(right, ndim - 1 - k);
        *slot = match (a, b) {
            (x, y) if x == y => x,
            (1, y) => y,
            (x, 1) => x,
            _ => {
                return Err(VmpError::PlateMismatch {
                    left: left.to_vec(),
                    right: right.to_vec(),
                })
            }
        };
    }

    Ok(out)
}

/// Broadcast any number of plate shapes. An empty list gives `[]`.
pub fn broadcast_shapes<'a, I>(shapes: I) -> Result<Vec<usize>>
where
    I: IntoIterator<Item = &'a [usize]>,
{
    shapes
        .into_iter()
        .try_fold(Vec::new(), |acc, shape| broadcast_pair(&acc, shape))
}

/// Whether `shape` broadcasts into `target` without growing it.
pub fn is_broadcastable_to(shape: &[usize], target: &[usize]) -> bool {
    matches!(broadcast_pair(shape, target), Ok(ref s) if s.as_slice() == target)
}

/// Total plates of a node from an optional explicit override and the plates
/// induced by each parent.
///
/// Without an override the result is the broadcast union of the parent plates.
/// With an override every parent plate shape must broadcast into it.
pub fn total_plates(explicit: Option<&[usize]>, parent_plates: &[Vec<usize>]) -> Result<Vec<usize>> {
    match explicit {
        None => broadcast_shapes(parent_plates.iter().map(Vec::as_slice)),
        Some(plates) => {
            for parent in parent_plates {
                if !is_broadcastable_to(parent, plates) {
                    return Err(VmpError::PlateMismatch {
                        left: parent.clone(),
                        right: plates.to_vec(),
                    });
                }
            }
            Ok(plates.to_vec())
        }
    }
}

/// Full array shape of a moment: `plates ++ dims`.
pub fn moment_shape(plates: &[usize], dims: &[usize]) -> Vec<usize> {
    plates.iter().chain(dims.iter()).copied().collect()
}

fn axis_from_right(shape: &[usize], offset: usize) -> usize {
    if offset < shape.len() {
        shape[shape.len() - 1 - offset]
    } else {
        1
    }
}
