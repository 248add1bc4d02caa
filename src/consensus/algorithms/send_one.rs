//! Malicious node that repeats a single transaction forever

use crate::consensus::{Candidate, Node, ProtocolViolation, Transaction};
use std::collections::HashSet;

#[derive(Debug, Default)]
pub struct SendOneNode {
    pending: Option<Transaction>,
}

impl SendOneNode {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Node for SendOneNode {
    fn set_followees(&mut self, _followees: &[bool]) -> Result<(), ProtocolViolation> {
        Ok(())
    }

    /// Keeps the smallest seed id so runs stay reproducible. An empty seed
    /// leaves the node with nothing to send.
    fn set_pending_transactions(
        &mut self,
        transactions: &HashSet<Transaction>,
    ) -> Result<(), ProtocolViolation> {
        self.pending = transactions.iter().min().copied();
        Ok(())
    }

    fn send_to_followers(&self) -> HashSet<Transaction> {
        self.pending.into_iter().collect()
    }

    fn receive_from_followees(
        &mut self,
        _candidates: &HashSet<Candidate>,
    ) -> Result<(), ProtocolViolation> {
        Ok(())
    }

    fn name(&self) -> &str {
        "Send-One-Tx"
    }
}
