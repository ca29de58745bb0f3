//! Construction configuration for log-density nodes.

use serde::{Deserialize, Serialize};

use crate::error::{Result, VmpError};

/// Strategy for computing messages to parents without sampling.
///
/// Reserved for analytic or Laplace-style messages. No variant is supported
/// yet; requesting one fails validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Approximation {
    /// Closed-form expectation of the log-density
    Analytic,
    /// Second-order expansion around the mode
    Laplace,
}

/// Configuration of a [`LogPdf`](crate::LogPdf) node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogPdfConfig {
    /// Per-plate shape of the variable
    pub shape: Vec<usize>,
    /// Monte-Carlo draws averaged by `MessageSampler::estimate`
    pub samples: usize,
    /// Explicit plates; parents' plates must broadcast into them
    pub plates: Option<Vec<usize>>,
    /// Alternative message strategy (unsupported)
    pub approximation: Option<Approximation>,
}

impl Default for LogPdfConfig {
    fn default() -> Self {
        Self {
            shape: Vec::new(),
            samples: 10,
            plates: None,
            approximation: None,
        }
    }
}

impl LogPdfConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_shape(mut self, shape: Vec<usize>) -> Self {
        self.shape = shape;
        self
    }

    pub fn with_samples(mut self, samples: usize) -> Self {
        self.samples = samples;
        self
    }

    pub fn with_plates(mut self, plates: Vec<usize>) -> Self {
        self.plates = Some(plates);
        self
    }

    pub fn with_approximation(mut self, approximation: Approximation) -> Self {
        self.approximation = Some(approximation);
        self
    }

    /// Reject unsupported settings before any node state is built.
    pub fn validate(&self) -> Result<()> {
        if let Some(approximation) = self.approximation {
            return Err(VmpError::UnsupportedApproximation(format!(
                "{:?} messages are not implemented; only sampling is available",
                approximation
            )));
        }
        if self.samples == 0 {
            return Err(VmpError::InvalidConfig(
                "samples must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
