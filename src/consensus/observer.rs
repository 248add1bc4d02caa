//! Optional diagnostics hook for node internals

use crate::consensus::ledger::BlacklistReason;
use serde::Serialize;

/// Summary of a node's final round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FinalizationOutcome {
    pub followee_count: usize,
    pub blacklisted: usize,
    pub min_votes: usize,
    pub candidates: usize,
    pub accepted: usize,
}

/// Receives events from a node. Every method defaults to a no-op, and a node
/// behaves identically with or without an observer attached.
pub trait RoundObserver: Send + Sync {
    fn on_blacklisted(&self, _followee: usize, _reason: BlacklistReason, _round: usize) {}

    fn on_round_processed(&self, _round: usize, _senders: usize, _evidence: usize) {}

    fn on_finalized(&self, _outcome: &FinalizationOutcome) {}
}

/// Forwards node events to `tracing`, tagged with the node's index.
#[derive(Debug, Clone, Copy)]
pub struct TracingObserver {
    node: usize,
}

impl TracingObserver {
    pub fn for_node(node: usize) -> Self {
        Self { node }
    }
}

impl RoundObserver for TracingObserver {
    fn on_blacklisted(&self, followee: usize, reason: BlacklistReason, round: usize) {
        tracing::debug!(
            node = self.node,
            followee,
            round,
            reason = %reason,
            "Followee blacklisted"
        );
    }

    fn on_round_processed(&self, round: usize, senders: usize, evidence: usize) {
        tracing::trace!(node = self.node, round, senders, evidence, "Round processed");
    }

    fn on_finalized(&self, outcome: &FinalizationOutcome) {
        tracing::debug!(
            node = self.node,
            followees = outcome.followee_count,
            blacklisted = outcome.blacklisted,
            min_votes = outcome.min_votes,
            candidates = outcome.candidates,
            accepted = outcome.accepted,
            "Node finalized"
        );
    }
}
