//! Per-node protocol parameters

use crate::config::ConfigError;
use serde::{Deserialize, Serialize};

/// The values every node is configured with before the simulation starts.
///
/// Only `p_malicious` and `num_rounds` influence the compliant algorithm; the
/// other two are carried so strategies can see the full environment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConsensusParams {
    pub p_graph: f64,
    pub p_malicious: f64,
    pub p_tx_distribution: f64,
    pub num_rounds: usize,
}

impl ConsensusParams {
    pub fn new(
        p_graph: f64,
        p_malicious: f64,
        p_tx_distribution: f64,
        num_rounds: usize,
    ) -> Result<Self, ConfigError> {
        let params = Self {
            p_graph,
            p_malicious,
            p_tx_distribution,
            num_rounds,
        };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_probability("p_graph", self.p_graph)?;
        check_probability("p_malicious", self.p_malicious)?;
        check_probability("p_tx_distribution", self.p_tx_distribution)?;
        if self.num_rounds == 0 {
            return Err(ConfigError::ZeroRounds);
        }
        Ok(())
    }

    /// Votes a followee-reported transaction needs in the final round.
    ///
    /// `floor(trusted * p_malicious)`, where `trusted` counts followees that
    /// were never blacklisted.
    pub fn min_votes(&self, trusted_followees: usize) -> usize {
        (trusted_followees as f64 * self.p_malicious).floor() as usize
    }
}

fn check_probability(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::ProbabilityOutOfRange { name, value });
    }
    Ok(())
}
