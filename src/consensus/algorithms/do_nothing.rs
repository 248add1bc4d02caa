//! Malicious node that never proposes anything

use crate::consensus::{Candidate, Node, ProtocolViolation, Transaction};
use std::collections::HashSet;

#[derive(Debug, Default)]
pub struct DoNothingNode;

impl DoNothingNode {
    pub fn new() -> Self {
        Self
    }
}

impl Node for DoNothingNode {
    fn set_followees(&mut self, _followees: &[bool]) -> Result<(), ProtocolViolation> {
        Ok(())
    }

    fn set_pending_transactions(
        &mut self,
        _transactions: &HashSet<Transaction>,
    ) -> Result<(), ProtocolViolation> {
        Ok(())
    }

    fn send_to_followers(&self) -> HashSet<Transaction> {
        HashSet::new()
    }

    fn receive_from_followees(
        &mut self,
        _candidates: &HashSet<Candidate>,
    ) -> Result<(), ProtocolViolation> {
        Ok(())
    }

    fn name(&self) -> &str {
        "Do-Nothing"
    }
}
