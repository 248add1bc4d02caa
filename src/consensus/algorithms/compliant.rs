//! Compliant trust-based consensus node
//!
//! A node follows a fixed set of peers and, for every round but the last,
//! gathers what they report. Followees that go silent after contributing, or
//! that stop reporting something they reported before, are blacklisted for
//! good. On the final round the remaining evidence is put to a vote with a
//! threshold derived from the expected fraction of malicious peers.

use crate::consensus::error::ProtocolViolation;
use crate::consensus::ledger::{Blacklist, BlacklistReason, FolloweeLedger};
use crate::consensus::observer::{FinalizationOutcome, RoundObserver};
use crate::consensus::params::ConsensusParams;
use crate::consensus::traits::Node;
use crate::consensus::types::{Candidate, NodePhase, Slot, Transaction};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

/// Transactions observed in a single round, grouped by sender.
type Observations = BTreeMap<usize, HashSet<Transaction>>;

/// Vote count per followee-reported transaction, plus the threshold they are
/// held to.
#[derive(Debug, Clone)]
pub struct Tally {
    pub votes: HashMap<Transaction, usize>,
    pub own: HashSet<Transaction>,
    pub min_votes: usize,
}

impl Tally {
    /// Own transactions plus every voted transaction meeting the threshold.
    pub fn accepted(&self) -> HashSet<Transaction> {
        self.votes
            .iter()
            .filter(|&(_, &count)| count >= self.min_votes)
            .map(|(tx, _)| *tx)
            .chain(self.own.iter().copied())
            .collect()
    }

    pub fn candidate_count(&self) -> usize {
        self.own
            .iter()
            .filter(|tx| !self.votes.contains_key(*tx))
            .count()
            + self.votes.len()
    }
}

pub struct CompliantNode {
    params: ConsensusParams,
    followees: Option<Vec<bool>>,
    followee_count: usize,
    blacklist: Blacklist,
    ledger: FolloweeLedger,
    pending_set: bool,
    receive_round: usize,
    observer: Option<Arc<dyn RoundObserver>>,
}

impl CompliantNode {
    pub fn new(params: ConsensusParams) -> Self {
        Self {
            params,
            followees: None,
            followee_count: 0,
            blacklist: Blacklist::default(),
            ledger: FolloweeLedger::new(),
            pending_set: false,
            receive_round: 0,
            observer: None,
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn RoundObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn params(&self) -> &ConsensusParams {
        &self.params
    }

    pub fn phase(&self) -> NodePhase {
        if self.followees.is_none() {
            NodePhase::Uninitialized
        } else if self.receive_round == 0 {
            NodePhase::Ready
        } else if self.receive_round < self.params.num_rounds {
            NodePhase::Gathering(self.receive_round)
        } else {
            NodePhase::Finalized
        }
    }

    /// Number of rounds received so far.
    pub fn round(&self) -> usize {
        self.receive_round
    }

    pub fn followee_count(&self) -> usize {
        self.followee_count
    }

    pub fn blacklist(&self) -> &Blacklist {
        &self.blacklist
    }

    pub fn ledger(&self) -> &FolloweeLedger {
        &self.ledger
    }

    /// Count votes over the current evidence without changing any state.
    pub fn tally(&self) -> Tally {
        let trusted = self.followee_count.saturating_sub(self.blacklist.len());
        let min_votes = self.params.min_votes(trusted);

        let mut votes: HashMap<Transaction, usize> = HashMap::new();
        for (index, txs) in self.ledger.followees() {
            if self.blacklist.contains(index) {
                continue;
            }
            for tx in txs {
                *votes.entry(*tx).or_insert(0) += 1;
            }
        }

        Tally {
            votes,
            own: self.ledger.get(Slot::Own).cloned().unwrap_or_default(),
            min_votes,
        }
    }

    fn check_senders(
        followees: &[bool],
        candidates: &HashSet<Candidate>,
    ) -> Result<(), ProtocolViolation> {
        for candidate in candidates {
            match followees.get(candidate.sender) {
                None => {
                    return Err(ProtocolViolation::SenderOutOfRange {
                        sender: candidate.sender,
                        node_count: followees.len(),
                    })
                }
                Some(false) => {
                    return Err(ProtocolViolation::NotAFollowee {
                        sender: candidate.sender,
                    })
                }
                Some(true) => {}
            }
        }
        Ok(())
    }

    fn group_by_sender(candidates: &HashSet<Candidate>) -> Observations {
        let mut observed = Observations::new();
        for candidate in candidates {
            observed
                .entry(candidate.sender)
                .or_default()
                .insert(candidate.tx);
        }
        observed
    }

    /// Blacklist every trusted followee whose report this round is missing
    /// or no longer covers what it reported before. Runs before absorption.
    fn check_consistency(&mut self, observed: &Observations, round: usize) {
        let offenders: Vec<(usize, BlacklistReason)> = self
            .ledger
            .followees()
            .filter(|(index, _)| !self.blacklist.contains(*index))
            .filter_map(|(index, known)| match observed.get(&index) {
                None => Some((index, BlacklistReason::WentSilent)),
                Some(reported) if !known.is_subset(reported) => {
                    Some((index, BlacklistReason::DroppedTransactions))
                }
                Some(_) => None,
            })
            .collect();

        for (index, reason) in offenders {
            if self.blacklist.insert(index) {
                if let Some(observer) = &self.observer {
                    observer.on_blacklisted(index, reason, round);
                }
            }
        }
    }

    fn absorb(&mut self, observed: Observations) {
        for (sender, txs) in observed {
            if self.blacklist.contains(sender) {
                continue;
            }
            self.ledger.absorb(Slot::Followee(sender), txs);
        }
    }

    fn finalize(&mut self) {
        let tally = self.tally();
        let accepted = tally.accepted();

        let outcome = FinalizationOutcome {
            followee_count: self.followee_count,
            blacklisted: self.blacklist.len(),
            min_votes: tally.min_votes,
            candidates: tally.candidate_count(),
            accepted: accepted.len(),
        };

        self.ledger.collapse(accepted);

        if let Some(observer) = &self.observer {
            observer.on_finalized(&outcome);
        }
    }
}

impl Node for CompliantNode {
    fn set_followees(&mut self, followees: &[bool]) -> Result<(), ProtocolViolation> {
        if self.followees.is_some() {
            return Err(ProtocolViolation::FolloweesAlreadySet);
        }
        self.followee_count = followees.iter().filter(|f| **f).count();
        self.blacklist = Blacklist::with_capacity(followees.len());
        self.followees = Some(followees.to_vec());
        Ok(())
    }

    fn set_pending_transactions(
        &mut self,
        transactions: &HashSet<Transaction>,
    ) -> Result<(), ProtocolViolation> {
        if self.followees.is_none() {
            return Err(ProtocolViolation::FolloweesNotSet);
        }
        if self.pending_set {
            return Err(ProtocolViolation::PendingAlreadySet);
        }
        self.ledger.absorb(Slot::Own, transactions.iter().copied());
        self.pending_set = true;
        Ok(())
    }

    fn send_to_followers(&self) -> HashSet<Transaction> {
        self.ledger
            .iter()
            .filter(|(slot, _)| match slot {
                Slot::Followee(index) => !self.blacklist.contains(*index),
                Slot::Own | Slot::Accepted => true,
            })
            .flat_map(|(_, txs)| txs.iter().copied())
            .collect()
    }

    fn receive_from_followees(
        &mut self,
        candidates: &HashSet<Candidate>,
    ) -> Result<(), ProtocolViolation> {
        let followees = self
            .followees
            .as_deref()
            .ok_or(ProtocolViolation::FolloweesNotSet)?;
        if self.receive_round >= self.params.num_rounds {
            return Err(ProtocolViolation::RoundLimitExceeded {
                num_rounds: self.params.num_rounds,
            });
        }
        Self::check_senders(followees, candidates)?;

        let observed = Self::group_by_sender(candidates);
        self.receive_round += 1;
        let round = self.receive_round;

        if round < self.params.num_rounds {
            let senders = observed.len();
            self.check_consistency(&observed, round);
            self.absorb(observed);
            if let Some(observer) = &self.observer {
                let evidence = self.ledger.iter().map(|(_, txs)| txs.len()).sum();
                observer.on_round_processed(round, senders, evidence);
            }
        } else {
            self.absorb(observed);
            self.finalize();
        }

        Ok(())
    }

    fn name(&self) -> &str {
        "Compliant"
    }
}
