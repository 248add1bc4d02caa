//! Simulation configuration

use crate::consensus::ConsensusParams;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub const DEFAULT_NUM_NODES: usize = 100;
pub const DEFAULT_NUM_TRANSACTIONS: usize = 500;
pub const DEFAULT_SEED: u64 = 42;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{name} must be within [0, 1], got {value}")]
    ProbabilityOutOfRange { name: &'static str, value: f64 },

    #[error("num_rounds must be at least 1")]
    ZeroRounds,

    #[error("num_nodes must be at least 1")]
    ZeroNodes,
}

/// Behaviour assigned to nodes picked as malicious.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum MaliciousStrategy {
    DoNothing,
    Intermittent,
    #[default]
    SendOne,
    /// Each malicious node draws one of the other three.
    Mixed,
}

impl fmt::Display for MaliciousStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MaliciousStrategy::DoNothing => "do-nothing",
            MaliciousStrategy::Intermittent => "intermittent",
            MaliciousStrategy::SendOne => "send-one",
            MaliciousStrategy::Mixed => "mixed",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub num_nodes: usize,
    pub p_graph: f64,
    pub p_malicious: f64,
    pub p_tx_distribution: f64,
    pub num_rounds: usize,
    pub num_transactions: usize,
    pub seed: u64,
    pub strategy: MaliciousStrategy,
}

impl SimulationConfig {
    pub fn new(p_graph: f64, p_malicious: f64, p_tx_distribution: f64, num_rounds: usize) -> Self {
        Self {
            num_nodes: DEFAULT_NUM_NODES,
            p_graph,
            p_malicious,
            p_tx_distribution,
            num_rounds,
            num_transactions: DEFAULT_NUM_TRANSACTIONS,
            seed: DEFAULT_SEED,
            strategy: MaliciousStrategy::default(),
        }
    }

    pub fn with_num_nodes(mut self, num_nodes: usize) -> Self {
        self.num_nodes = num_nodes;
        self
    }

    pub fn with_num_transactions(mut self, num_transactions: usize) -> Self {
        self.num_transactions = num_transactions;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_strategy(mut self, strategy: MaliciousStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.node_params().validate()?;
        if self.num_nodes == 0 {
            return Err(ConfigError::ZeroNodes);
        }
        Ok(())
    }

    /// Parameters handed to every node.
    pub fn node_params(&self) -> ConsensusParams {
        ConsensusParams {
            p_graph: self.p_graph,
            p_malicious: self.p_malicious,
            p_tx_distribution: self.p_tx_distribution,
            num_rounds: self.num_rounds,
        }
    }
}
