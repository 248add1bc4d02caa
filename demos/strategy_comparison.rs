//! Compare how compliant nodes fare against each adversary strategy

use trust_consensus::config::{MaliciousStrategy, SimulationConfig};
use trust_consensus::simulation::{run_concurrent, Simulation, SimulationReport};

const ROUNDS: usize = 10;
const SEEDS: [u64; 5] = [1, 2, 3, 4, 5];

struct StrategyResult {
    strategy: MaliciousStrategy,
    avg_consensus_pct: f64,
    unanimous_runs: usize,
    avg_blacklist_events: f64,
}

fn summarize(strategy: MaliciousStrategy, reports: &[SimulationReport]) -> StrategyResult {
    let count = reports.len().max(1) as f64;
    let finals: Vec<_> = reports.iter().filter_map(|r| r.final_round()).collect();

    StrategyResult {
        strategy,
        avg_consensus_pct: finals.iter().map(|f| f.compliant.consensus_pct).sum::<f64>() / count,
        unanimous_runs: finals.iter().filter(|f| f.compliant.is_unanimous()).count(),
        avg_blacklist_events: reports
            .iter()
            .map(|r| r.total_blacklist_events() as f64)
            .sum::<f64>()
            / count,
    }
}

#[tokio::main]
async fn main() {
    println!("\n{}", "=".repeat(80));
    println!("  Adversary Strategy Comparison");
    println!("  p_graph=0.2 p_malicious=0.3 p_txDistribution=0.05 numRounds={}", ROUNDS);
    println!("  Seeds per strategy: {}", SEEDS.len());
    println!("{}", "=".repeat(80));
    println!();

    let mut results = Vec::new();
    for strategy in [
        MaliciousStrategy::DoNothing,
        MaliciousStrategy::Intermittent,
        MaliciousStrategy::SendOne,
        MaliciousStrategy::Mixed,
    ] {
        let mut reports = Vec::new();
        for seed in SEEDS {
            let config = SimulationConfig::new(0.2, 0.3, 0.05, ROUNDS)
                .with_seed(seed)
                .with_strategy(strategy);
            let simulation = match Simulation::new(config) {
                Ok(simulation) => simulation,
                Err(e) => {
                    println!("{}: setup failed: {}", strategy, e);
                    continue;
                }
            };
            match run_concurrent(simulation).await {
                Ok(report) => reports.push(report),
                Err(e) => println!("{} (seed {}): run failed: {}", strategy, seed, e),
            }
        }
        results.push(summarize(strategy, &reports));
    }

    println!(
        "{:<14} | {:<16} | {:<10} | {}",
        "Strategy", "Avg C-Consensus", "Unanimous", "Avg Blacklist"
    );
    println!("{}", "-".repeat(80));
    for result in &results {
        println!(
            "{:<14} | {:<15.2}% | {:<10} | {:.1}",
            result.strategy.to_string(),
            result.avg_consensus_pct,
            format!("{}/{}", result.unanimous_runs, SEEDS.len()),
            result.avg_blacklist_events
        );
    }
    println!("{}", "=".repeat(80));
    println!();
}
