//! Variational message passing nodes with arbitrary log-densities.
//!
//! This crate provides the node contract of a variational Bayesian inference
//! engine. A model is a graph of random-variable nodes that exchange expected
//! sufficient statistics ("moments") with their parents and children.
//!
//! # Core Concepts
//!
//! - **Plates**: broadcast shape of independent copies of a variable
//! - **Moments**: sufficient statistics, converted from data by a [`Moments`] policy
//! - **Masks**: which plate copies are observed or otherwise active
//! - **LogPdf**: a node defined only by a log-density; its messages to parents
//!   are Monte-Carlo estimates rather than closed-form expectations
//!
//! # Architecture
//!
//! ```text
//! ModelGraph ── owns ──> Node (ExponentialFamily state)
//!     │                    │
//!     │ observe            │ message_to_parent(i)
//!     ▼                    ▼
//! shape contract      MessageSampler(x, rng) ── density(own, parents[i := x])
//!     │
//!     ▼
//! propagate_masks: child mask ──or──> parent plates
//! ```

mod config;
mod density;
mod distribution;
mod error;
mod graph;
mod logpdf;
mod mask;
mod message;
mod moments;
mod node;
pub mod nodes;
pub mod plates;

#[cfg(feature = "structured-logging")]
pub mod logging;

pub use config::{Approximation, LogPdfConfig};
pub use density::{DensitySource, GaussianLogDensity, LogDensity};
pub use distribution::{Distribution, LogPdfDistribution};
pub use error::{Result, VmpError};
pub use graph::ModelGraph;
pub use logpdf::LogPdf;
pub use mask::Mask;
pub use message::{MessageSampler, ParentMessage};
pub use moments::{GammaMoments, GaussianMoments, MomentState, Moments, MomentsPolicy};
pub use node::{ExponentialFamily, Node, NodeId};
pub use nodes::{Constant, Gaussian};
