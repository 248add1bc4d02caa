//! Per-node evidence store and blacklist

use crate::consensus::types::{Slot, Transaction};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::fmt;

/// Why a followee stopped being trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BlacklistReason {
    /// Sent nothing in a round after having contributed evidence earlier.
    WentSilent,
    /// Sent a set missing something it reported in an earlier round.
    DroppedTransactions,
}

impl fmt::Display for BlacklistReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlacklistReason::WentSilent => write!(f, "went silent"),
            BlacklistReason::DroppedTransactions => write!(f, "dropped transactions"),
        }
    }
}

/// Cumulative evidence, keyed by [`Slot`].
#[derive(Debug, Clone, Default)]
pub struct FolloweeLedger {
    slots: BTreeMap<Slot, HashSet<Transaction>>,
}

impl FolloweeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, slot: Slot) -> Option<&HashSet<Transaction>> {
        self.slots.get(&slot)
    }

    /// Union `txs` into `slot`. Entries only ever grow.
    pub fn absorb<I>(&mut self, slot: Slot, txs: I)
    where
        I: IntoIterator<Item = Transaction>,
    {
        self.slots.entry(slot).or_default().extend(txs);
    }

    pub fn followees(&self) -> impl Iterator<Item = (usize, &HashSet<Transaction>)> + '_ {
        self.slots.iter().filter_map(|(slot, txs)| match slot {
            Slot::Followee(index) => Some((*index, txs)),
            _ => None,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (Slot, &HashSet<Transaction>)> + '_ {
        self.slots.iter().map(|(slot, txs)| (*slot, txs))
    }

    /// Discard every slot and keep only `accepted` under [`Slot::Accepted`].
    pub fn collapse(&mut self, accepted: HashSet<Transaction>) {
        self.slots.clear();
        self.slots.insert(Slot::Accepted, accepted);
    }

    pub fn is_collapsed(&self) -> bool {
        self.slots.contains_key(&Slot::Accepted)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Followees excluded from gathering and from the final vote. Never shrinks.
#[derive(Debug, Clone, Default)]
pub struct Blacklist {
    flags: Vec<bool>,
    count: usize,
}

impl Blacklist {
    pub fn with_capacity(node_count: usize) -> Self {
        Self {
            flags: vec![false; node_count],
            count: 0,
        }
    }

    /// Returns `true` if the followee was newly added.
    pub fn insert(&mut self, index: usize) -> bool {
        match self.flags.get_mut(index) {
            Some(flag) if !*flag => {
                *flag = true;
                self.count += 1;
                true
            }
            _ => false,
        }
    }

    pub fn contains(&self, index: usize) -> bool {
        self.flags.get(index).copied().unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn members(&self) -> impl Iterator<Item = usize> + '_ {
        self.flags
            .iter()
            .enumerate()
            .filter_map(|(index, flag)| flag.then_some(index))
    }
}
