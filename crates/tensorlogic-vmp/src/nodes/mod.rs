//! Concrete nodes used as parents of log-density nodes.
//!
//! These carry fixed variational parameters; their update equations belong to
//! the inference loop and are not part of this crate.

mod constant;
mod gaussian;

pub use constant::Constant;
pub use gaussian::{standard_normal, Gaussian};
