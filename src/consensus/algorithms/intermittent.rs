//! Malicious node that behaves compliantly every other round
//!
//! Runs a full [`CompliantNode`] underneath but only forwards its output on
//! odd rounds, sending the empty set in between. Followers see it go silent
//! after the first round and blacklist it.

use crate::consensus::algorithms::compliant::CompliantNode;
use crate::consensus::{Candidate, ConsensusParams, Node, ProtocolViolation, Transaction};
use std::collections::HashSet;

pub struct IntermittentNode {
    inner: CompliantNode,
    current_round: usize,
}

impl IntermittentNode {
    pub fn new(params: ConsensusParams) -> Self {
        Self {
            inner: CompliantNode::new(params),
            current_round: 1,
        }
    }

    fn is_speaking(&self) -> bool {
        self.current_round % 2 == 1
    }
}

impl Node for IntermittentNode {
    fn set_followees(&mut self, followees: &[bool]) -> Result<(), ProtocolViolation> {
        self.inner.set_followees(followees)
    }

    fn set_pending_transactions(
        &mut self,
        transactions: &HashSet<Transaction>,
    ) -> Result<(), ProtocolViolation> {
        self.inner.set_pending_transactions(transactions)
    }

    fn send_to_followers(&self) -> HashSet<Transaction> {
        if self.is_speaking() {
            self.inner.send_to_followers()
        } else {
            HashSet::new()
        }
    }

    fn receive_from_followees(
        &mut self,
        candidates: &HashSet<Candidate>,
    ) -> Result<(), ProtocolViolation> {
        self.inner.receive_from_followees(candidates)?;
        self.current_round += 1;
        Ok(())
    }

    fn name(&self) -> &str {
        "Intermittent-Compliant"
    }
}
