//! Trust-based consensus over a fixed follow-graph
//!
//! Nodes only learn about transactions through the peers they follow. A
//! compliant node keeps per-followee evidence, blacklists followees that
//! report inconsistently across rounds, and on the last round votes on what
//! remains.
//!
//! ## Structure
//! - `traits.rs` - the `Node` capability every strategy implements
//! - `types.rs` - transactions, candidates, ledger slots, node phases
//! - `ledger.rs` - per-followee evidence and the blacklist
//! - `params.rs` - per-node configuration and the quorum threshold
//! - `observer.rs` - optional diagnostics hook
//! - `error.rs` - protocol misuse errors
//! - `algorithms/` - compliant node and adversarial strategies
//! - `tests.rs` - unit tests

// Re-export public API
pub use error::ProtocolViolation;
pub use ledger::{Blacklist, BlacklistReason, FolloweeLedger};
pub use observer::{FinalizationOutcome, RoundObserver, TracingObserver};
pub use params::ConsensusParams;
pub use traits::Node;
pub use types::{Candidate, NodePhase, Slot, Transaction};

// Strategy implementations
pub mod algorithms;

// Tests
#[cfg(test)]
#[path = "tests.rs"]
mod tests;

// Internal modules
mod error;
mod ledger;
mod observer;
mod params;
mod traits;
mod types;
