//! Convergence measurement and reporting

use crate::config::SimulationConfig;
use crate::consensus::Transaction;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Short SHA-256 over the sorted ids of a transaction set.
pub fn fingerprint(transactions: &HashSet<Transaction>) -> String {
    let sorted: BTreeSet<&Transaction> = transactions.iter().collect();
    let mut hasher = Sha256::new();
    for tx in sorted {
        hasher.update(tx.id.to_le_bytes());
    }
    let digest = format!("{:x}", hasher.finalize());
    digest[..16].to_string()
}

/// The most common output set among a group of nodes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SetSummary {
    pub fingerprint: String,
    pub size: usize,
    pub weight: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgreementStats {
    pub nodes: usize,
    pub distinct_sets: usize,
    pub winner: Option<SetSummary>,
    pub consensus_pct: f64,
}

impl AgreementStats {
    pub fn measure<'a, I>(outputs: I) -> Self
    where
        I: IntoIterator<Item = &'a HashSet<Transaction>>,
    {
        let mut groups: BTreeMap<BTreeSet<Transaction>, usize> = BTreeMap::new();
        let mut nodes = 0;
        for output in outputs {
            *groups.entry(output.iter().copied().collect()).or_insert(0) += 1;
            nodes += 1;
        }

        let mut winner: Option<(&BTreeSet<Transaction>, usize)> = None;
        for (set, weight) in &groups {
            if winner.map_or(true, |(_, best)| *weight > best) {
                winner = Some((set, *weight));
            }
        }

        let winner = winner.map(|(set, weight)| {
            let set: HashSet<Transaction> = set.iter().copied().collect();
            SetSummary {
                fingerprint: fingerprint(&set),
                size: set.len(),
                weight,
            }
        });

        let consensus_pct = match (&winner, nodes) {
            (Some(summary), n) if n > 0 => 100.0 * summary.weight as f64 / n as f64,
            _ => 0.0,
        };

        Self {
            nodes,
            distinct_sets: groups.len(),
            winner,
            consensus_pct,
        }
    }

    /// True when every measured node reported the same set.
    pub fn is_unanimous(&self) -> bool {
        self.distinct_sets <= 1
    }
}

/// Agreement after one round, over all nodes and over compliant ones only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoundSummary {
    pub round: usize,
    pub blacklist_events: usize,
    pub all: AgreementStats,
    pub compliant: AgreementStats,
}

#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub config: SimulationConfig,
    pub malicious_nodes: usize,
    pub edges: usize,
    pub finalized_nodes: usize,
    pub rounds: Vec<RoundSummary>,
}

impl SimulationReport {
    pub fn final_round(&self) -> Option<&RoundSummary> {
        self.rounds.last()
    }

    pub fn total_blacklist_events(&self) -> usize {
        self.rounds.iter().map(|r| r.blacklist_events).sum()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

fn winner_column(stats: &AgreementStats) -> String {
    match &stats.winner {
        Some(w) => format!("{} ({} tx, {} nodes)", w.fingerprint, w.size, w.weight),
        None => "N/A".to_string(),
    }
}

/// Print per-round agreement in a formatted table
pub fn print_simulation_report(report: &SimulationReport) {
    let config = &report.config;
    println!("\n{}", "=".repeat(120));
    println!("  Trust Consensus Simulation");
    println!(
        "  p_graph={} p_malicious={} p_txDistribution={} numRounds={} numNodes={} strategy={} seed={}",
        config.p_graph,
        config.p_malicious,
        config.p_tx_distribution,
        config.num_rounds,
        config.num_nodes,
        config.strategy,
        config.seed
    );
    println!(
        "  malicious nodes: {}/{} ({:.0}%), edges: {}",
        report.malicious_nodes,
        config.num_nodes,
        100.0 * report.malicious_nodes as f64 / config.num_nodes.max(1) as f64,
        report.edges
    );
    println!("{}", "=".repeat(120));
    println!();
    println!(
        "{:<6} | {:<10} | {:<8} | {:<10} | {:<36} | {:<8} | {:<12}",
        "Round", "Blacklist", "Sets", "Consensus", "Winner (compliant)", "C-Sets", "C-Consensus"
    );
    println!("{}", "-".repeat(120));

    for round in &report.rounds {
        println!(
            "{:<6} | {:<10} | {:<8} | {:<9.2}% | {:<36} | {:<8} | {:.2}%",
            round.round,
            round.blacklist_events,
            round.all.distinct_sets,
            round.all.consensus_pct,
            winner_column(&round.compliant),
            round.compliant.distinct_sets,
            round.compliant.consensus_pct
        );
    }

    println!("{}", "=".repeat(120));
    println!();

    if let Some(last) = report.final_round() {
        println!("Summary:");
        println!();
        println!(
            "  Compliant agreement: {:.2}% across {} compliant nodes",
            last.compliant.consensus_pct, last.compliant.nodes
        );
        println!(
            "  Unanimous among compliant nodes: {}",
            if last.compliant.is_unanimous() { "Yes" } else { "No" }
        );
        println!(
            "  Blacklist events: {}, finalized nodes: {}",
            report.total_blacklist_events(),
            report.finalized_nodes
        );
        println!();
    }
}
