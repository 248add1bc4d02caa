//! Trust-based consensus among peers on a fixed follow-graph, with a
//! round-synchronous simulation harness and adversarial node strategies.

pub mod config;
pub mod consensus;
pub mod logger;
pub mod simulation;

pub use config::{ConfigError, MaliciousStrategy, SimulationConfig};
