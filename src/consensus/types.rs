//! Consensus types and data structures

use serde::{Deserialize, Serialize};
use std::fmt;

/// A unit of gossiped content. Identity is the id alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
}

impl Transaction {
    pub fn new(id: i64) -> Self {
        Self { id }
    }
}

impl From<i64> for Transaction {
    fn from(id: i64) -> Self {
        Self::new(id)
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tx#{}", self.id)
    }
}

/// One followee's proposal of one transaction in one round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Candidate {
    pub tx: Transaction,
    /// Index of the proposing node in the follow-graph.
    pub sender: usize,
}

impl Candidate {
    pub fn new(tx: Transaction, sender: usize) -> Self {
        Self { tx, sender }
    }
}

/// Key of an evidence slot in a node's ledger.
///
/// `Own` holds the node's seed transactions, `Followee(i)` what followee `i`
/// has reported so far, and `Accepted` the collapsed result after the final
/// round. The ordering puts `Own` first so iteration is deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Slot {
    Own,
    Followee(usize),
    Accepted,
}

/// Lifecycle of a node running the trust protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NodePhase {
    /// Followees not yet recorded.
    Uninitialized,
    /// Followees recorded, no round received yet.
    Ready,
    /// Rounds `1..num_rounds` have been received; holds the last one.
    Gathering(usize),
    /// The final round has been processed.
    Finalized,
}

impl fmt::Display for NodePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodePhase::Uninitialized => write!(f, "uninitialized"),
            NodePhase::Ready => write!(f, "ready"),
            NodePhase::Gathering(round) => write!(f, "gathering(round {})", round),
            NodePhase::Finalized => write!(f, "finalized"),
        }
    }
}
