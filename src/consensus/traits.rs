//! Node capability trait

use crate::consensus::error::ProtocolViolation;
use crate::consensus::types::{Candidate, Transaction};
use std::collections::HashSet;

/// The four-operation protocol every participant exposes to the harness.
///
/// Compliant and adversarial strategies are alternative implementations; the
/// harness picks one per node at construction time.
pub trait Node: Send {
    /// Record which nodes this one follows. `followees[i]` is true iff this
    /// node trusts node `i`. Called exactly once.
    fn set_followees(&mut self, followees: &[bool]) -> Result<(), ProtocolViolation>;

    /// Record the node's own seed transactions. Called exactly once, after
    /// [`Node::set_followees`].
    fn set_pending_transactions(
        &mut self,
        transactions: &HashSet<Transaction>,
    ) -> Result<(), ProtocolViolation>;

    /// Transactions this node currently proposes to its followers.
    fn send_to_followers(&self) -> HashSet<Transaction>;

    /// Ingest everything addressed to this node in one round.
    fn receive_from_followees(
        &mut self,
        candidates: &HashSet<Candidate>,
    ) -> Result<(), ProtocolViolation>;

    fn name(&self) -> &str;
}
