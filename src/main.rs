//! Trust consensus simulator CLI
//!
//! ```bash
//! # original argument order: p_graph p_malicious p_txDistribution numRounds [numNodes]
//! trust-consensus 0.1 0.3 0.05 10
//! trust-consensus 0.2 0.15 0.01 20 200 --strategy mixed --seed 7 --json
//! ```

use clap::Parser;
use std::error::Error;
use trust_consensus::config::{MaliciousStrategy, SimulationConfig, DEFAULT_NUM_NODES};
use trust_consensus::simulation::{print_simulation_report, run_concurrent, Simulation};
use trust_consensus::{log_with_context, logger};

#[derive(Parser, Debug)]
#[command(name = "trust-consensus")]
#[command(version, about = "Simulate trust-based consensus with Byzantine followees", long_about = None)]
struct Args {
    /// Probability that an edge exists in the follow-graph (.1, .2, .3)
    #[arg(env = "TRUST_CONSENSUS_P_GRAPH")]
    p_graph: f64,

    /// Probability that a node is malicious (.15, .30, .45)
    #[arg(env = "TRUST_CONSENSUS_P_MALICIOUS")]
    p_malicious: f64,

    /// Probability of seeding each transaction at each node (.01, .05, .10)
    #[arg(env = "TRUST_CONSENSUS_P_TX_DISTRIBUTION")]
    p_tx_distribution: f64,

    /// Number of rounds every node runs for (10, 20)
    #[arg(env = "TRUST_CONSENSUS_NUM_ROUNDS")]
    num_rounds: usize,

    /// Number of nodes to create
    #[arg(env = "TRUST_CONSENSUS_NUM_NODES", default_value_t = DEFAULT_NUM_NODES)]
    num_nodes: usize,

    /// Size of the valid transaction universe
    #[arg(long, env = "TRUST_CONSENSUS_TRANSACTIONS", default_value = "500")]
    transactions: usize,

    /// Random seed; equal seeds give identical runs
    #[arg(long, env = "TRUST_CONSENSUS_SEED", default_value = "42")]
    seed: u64,

    /// Behaviour of malicious nodes
    #[arg(long, value_enum, env = "TRUST_CONSENSUS_STRATEGY", default_value_t = MaliciousStrategy::SendOne)]
    strategy: MaliciousStrategy,

    /// Run every node in its own task
    #[arg(long, env = "TRUST_CONSENSUS_CONCURRENT")]
    concurrent: bool,

    /// Print the report as JSON instead of a table
    #[arg(long)]
    json: bool,

    /// Include source locations and host details in logs
    #[arg(long)]
    detailed_log: bool,
}

impl Args {
    fn to_config(&self) -> SimulationConfig {
        SimulationConfig::new(
            self.p_graph,
            self.p_malicious,
            self.p_tx_distribution,
            self.num_rounds,
        )
        .with_num_nodes(self.num_nodes)
        .with_num_transactions(self.transactions)
        .with_seed(self.seed)
        .with_strategy(self.strategy)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Loaded before parsing so `.env` can supply TRUST_CONSENSUS_* values.
    dotenvy::dotenv().ok();
    let args = Args::parse();

    if args.detailed_log {
        logger::init_logger_detailed();
    } else {
        logger::init_logger();
    }

    let config = args.to_config();
    let simulation = Simulation::new(config)?;
    let report = if args.concurrent {
        run_concurrent(simulation).await?
    } else {
        simulation.run()?
    };

    if args.json {
        println!("{}", report.to_json()?);
    } else {
        print_simulation_report(&report);
    }

    if let Some(last) = report.final_round() {
        log_with_context!(
            info,
            compliant_consensus_pct = last.compliant.consensus_pct,
            unanimous = last.compliant.is_unanimous(),
            "Simulation finished"
        );
    }

    Ok(())
}
