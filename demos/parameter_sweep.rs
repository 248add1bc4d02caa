//! Parameter sweep over the classic grid
//!
//! p_graph in {.1, .2, .3}, p_malicious in {.15, .30, .45},
//! p_txDistribution in {.01, .05, .10}, numRounds in {10, 20}: 54 runs.

use trust_consensus::config::SimulationConfig;
use trust_consensus::simulation::Simulation;

fn main() {
    println!("\n{}", "=".repeat(100));
    println!("  Trust Consensus Parameter Sweep (54 combinations)");
    println!("{}", "=".repeat(100));
    println!();
    println!(
        "{:<8} | {:<11} | {:<9} | {:<7} | {:<10} | {:<12} | {:<10} | {}",
        "p_graph", "p_malicious", "p_txDist", "rounds", "malicious", "C-Consensus", "C-Sets", "Blacklist"
    );
    println!("{}", "-".repeat(100));

    let mut unanimous = 0;
    let mut total = 0;

    for p_graph in [0.1, 0.2, 0.3] {
        for p_malicious in [0.15, 0.30, 0.45] {
            for p_tx_distribution in [0.01, 0.05, 0.10] {
                for num_rounds in [10, 20] {
                    let config =
                        SimulationConfig::new(p_graph, p_malicious, p_tx_distribution, num_rounds);
                    let report = match Simulation::new(config).and_then(Simulation::run) {
                        Ok(report) => report,
                        Err(e) => {
                            println!("{:<8} | run failed: {}", p_graph, e);
                            continue;
                        }
                    };
                    total += 1;

                    if let Some(last) = report.final_round() {
                        if last.compliant.is_unanimous() {
                            unanimous += 1;
                        }
                        println!(
                            "{:<8} | {:<11} | {:<9} | {:<7} | {:<10} | {:<11.2}% | {:<10} | {}",
                            p_graph,
                            p_malicious,
                            p_tx_distribution,
                            num_rounds,
                            report.malicious_nodes,
                            last.compliant.consensus_pct,
                            last.compliant.distinct_sets,
                            report.total_blacklist_events()
                        );
                    }
                }
            }
        }
    }

    println!("{}", "=".repeat(100));
    println!();
    println!(
        "Compliant nodes unanimous in {}/{} runs",
        unanimous, total
    );
    println!();
}
