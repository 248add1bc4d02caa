//! Simulation harness for the trust consensus protocol
//!
//! Builds a random follow-graph, mixes compliant and malicious nodes, seeds
//! them from a shared transaction universe and drives the synchronous rounds.
//!
//! ## Structure
//! - `graph.rs` - directed follow-graph
//! - `runner.rs` - sequential harness, proposal routing, errors
//! - `concurrent.rs` - one tokio task per node with a round barrier
//! - `report.rs` - agreement measurement and report printing
//! - `tests.rs` - unit tests

pub use concurrent::run_concurrent;
pub use graph::FollowGraph;
pub use report::{
    fingerprint, print_simulation_report, AgreementStats, RoundSummary, SetSummary,
    SimulationReport,
};
pub use runner::{route_proposals, NetworkTally, NodeRole, Simulation, SimulationError};

pub mod concurrent;
pub mod graph;
pub mod report;
pub mod runner;
