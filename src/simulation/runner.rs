//! Sequential round-by-round simulation harness.

use crate::config::{ConfigError, MaliciousStrategy, SimulationConfig};
use crate::consensus::algorithms::{CompliantNode, DoNothingNode, IntermittentNode, SendOneNode};
use crate::consensus::{
    BlacklistReason, Candidate, FinalizationOutcome, Node, ProtocolViolation, RoundObserver,
    Transaction, TracingObserver,
};
use crate::simulation::graph::FollowGraph;
use crate::simulation::report::{AgreementStats, RoundSummary, SimulationReport};
use parking_lot::Mutex;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("node {node} ({role}) violated the protocol: {source}")]
    Protocol {
        node: usize,
        role: NodeRole,
        #[source]
        source: ProtocolViolation,
    },

    #[error("node {node} task stopped before the simulation finished")]
    NodeUnavailable { node: usize },
}

/// What a node was constructed as. `Mixed` is resolved per node, so a role
/// always names a concrete strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NodeRole {
    Compliant,
    Malicious(MaliciousStrategy),
}

impl NodeRole {
    pub fn is_compliant(&self) -> bool {
        matches!(self, NodeRole::Compliant)
    }
}

impl std::fmt::Display for NodeRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeRole::Compliant => write!(f, "compliant"),
            NodeRole::Malicious(strategy) => write!(f, "malicious/{}", strategy),
        }
    }
}

/// Counts node events across the whole network. Shared by every node's
/// observer, possibly from several tasks at once.
#[derive(Debug, Default)]
pub struct NetworkTally {
    blacklisted_per_round: Mutex<BTreeMap<usize, usize>>,
    finalized: Mutex<Vec<FinalizationOutcome>>,
}

impl NetworkTally {
    pub fn blacklisted_in(&self, round: usize) -> usize {
        self.blacklisted_per_round
            .lock()
            .get(&round)
            .copied()
            .unwrap_or(0)
    }

    pub fn finalized(&self) -> usize {
        self.finalized.lock().len()
    }
}

/// Observer attached to each compliant node: logs via `tracing` and feeds the
/// shared tally.
struct NodeObserver {
    log: TracingObserver,
    tally: Arc<NetworkTally>,
}

impl RoundObserver for NodeObserver {
    fn on_blacklisted(&self, followee: usize, reason: BlacklistReason, round: usize) {
        self.log.on_blacklisted(followee, reason, round);
        *self.tally.blacklisted_per_round.lock().entry(round).or_insert(0) += 1;
    }

    fn on_round_processed(&self, round: usize, senders: usize, evidence: usize) {
        self.log.on_round_processed(round, senders, evidence);
    }

    fn on_finalized(&self, outcome: &FinalizationOutcome) {
        self.log.on_finalized(outcome);
        self.tally.finalized.lock().push(*outcome);
    }
}

pub struct Simulation {
    pub(crate) config: SimulationConfig,
    pub(crate) graph: FollowGraph,
    pub(crate) nodes: Vec<Box<dyn Node>>,
    pub(crate) roles: Vec<NodeRole>,
    pub(crate) valid: HashSet<Transaction>,
    pub(crate) tally: Arc<NetworkTally>,
}

impl Simulation {
    /// Build the population, the follow-graph and the initial transaction
    /// distribution, and hand every node its followees and seed.
    pub fn new(config: SimulationConfig) -> Result<Self, SimulationError> {
        config.validate()?;

        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let tally = Arc::new(NetworkTally::default());
        let params = config.node_params();

        let roles: Vec<NodeRole> = (0..config.num_nodes)
            .map(|_| pick_role(&mut rng, &config))
            .collect();
        let mut nodes: Vec<Box<dyn Node>> = roles
            .iter()
            .enumerate()
            .map(|(index, role)| -> Box<dyn Node> {
                match role {
                    NodeRole::Compliant => {
                        let observer = NodeObserver {
                            log: TracingObserver::for_node(index),
                            tally: tally.clone(),
                        };
                        Box::new(CompliantNode::new(params).with_observer(Arc::new(observer)))
                    }
                    NodeRole::Malicious(MaliciousStrategy::DoNothing) => {
                        Box::new(DoNothingNode::new())
                    }
                    NodeRole::Malicious(MaliciousStrategy::Intermittent) => {
                        Box::new(IntermittentNode::new(params))
                    }
                    NodeRole::Malicious(_) => Box::new(SendOneNode::new()),
                }
            })
            .collect();

        let malicious = roles.iter().filter(|r| !r.is_compliant()).count();
        info!(
            p_graph = config.p_graph,
            p_malicious = config.p_malicious,
            p_tx_distribution = config.p_tx_distribution,
            num_rounds = config.num_rounds,
            num_nodes = config.num_nodes,
            strategy = %config.strategy,
            seed = config.seed,
            malicious,
            "Simulation created"
        );

        let graph = FollowGraph::random(config.num_nodes, config.p_graph, &mut rng);
        for (index, node) in nodes.iter_mut().enumerate() {
            node.set_followees(graph.followees_of(index))
                .map_err(|source| protocol_error(index, roles[index], source))?;
        }

        // Ordered so the draw below is reproducible for a given seed.
        let mut universe: Vec<Transaction> = Vec::with_capacity(config.num_transactions);
        let mut valid = HashSet::with_capacity(config.num_transactions);
        while universe.len() < config.num_transactions {
            let tx = Transaction::new(rng.random::<i64>());
            if valid.insert(tx) {
                universe.push(tx);
            }
        }

        for (index, node) in nodes.iter_mut().enumerate() {
            let seed: HashSet<Transaction> = universe
                .iter()
                .filter(|_| rng.random::<f64>() < config.p_tx_distribution)
                .copied()
                .collect();
            node.set_pending_transactions(&seed)
                .map_err(|source| protocol_error(index, roles[index], source))?;
        }

        debug!(edges = graph.edge_count(), transactions = valid.len(), "Network seeded");

        Ok(Self {
            config,
            graph,
            nodes,
            roles,
            valid,
            tally,
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn graph(&self) -> &FollowGraph {
        &self.graph
    }

    pub fn roles(&self) -> &[NodeRole] {
        &self.roles
    }

    /// Current output of every node.
    pub fn outputs(&self) -> Vec<HashSet<Transaction>> {
        self.nodes.iter().map(|node| node.send_to_followers()).collect()
    }

    /// Drive all rounds in a single thread.
    pub fn run(mut self) -> Result<SimulationReport, SimulationError> {
        let mut recorder = RoundRecorder::new(&self.roles, self.tally.clone());
        let mut outputs = self.outputs();

        for round in 1..=self.config.num_rounds {
            let inboxes = route_proposals(&self.graph, &self.valid, &outputs);
            for (index, (node, inbox)) in self.nodes.iter_mut().zip(&inboxes).enumerate() {
                node.receive_from_followees(inbox)
                    .map_err(|source| protocol_error(index, self.roles[index], source))?;
            }
            outputs = self.outputs();
            recorder.record(round, &outputs);
        }

        Ok(recorder.finish(&self.config, &self.graph))
    }
}

fn pick_role(rng: &mut ChaCha8Rng, config: &SimulationConfig) -> NodeRole {
    if rng.random::<f64>() >= config.p_malicious {
        return NodeRole::Compliant;
    }
    let strategy = match config.strategy {
        MaliciousStrategy::Mixed => match rng.random_range(0..3) {
            0 => MaliciousStrategy::DoNothing,
            1 => MaliciousStrategy::Intermittent,
            _ => MaliciousStrategy::SendOne,
        },
        other => other,
    };
    NodeRole::Malicious(strategy)
}

pub(crate) fn protocol_error(
    node: usize,
    role: NodeRole,
    source: ProtocolViolation,
) -> SimulationError {
    SimulationError::Protocol { node, role, source }
}

/// Fan each node's proposals out to its followers as candidates. Ids outside
/// the valid universe are dropped. Every node gets an inbox, possibly empty.
pub fn route_proposals(
    graph: &FollowGraph,
    valid: &HashSet<Transaction>,
    outputs: &[HashSet<Transaction>],
) -> Vec<HashSet<Candidate>> {
    let mut inboxes = vec![HashSet::new(); graph.len()];
    for (sender, proposals) in outputs.iter().enumerate() {
        for tx in proposals.iter().filter(|tx| valid.contains(*tx)) {
            for &follower in graph.followers_of(sender) {
                inboxes[follower].insert(Candidate::new(*tx, sender));
            }
        }
    }
    inboxes
}

/// Accumulates per-round agreement for both harnesses.
pub(crate) struct RoundRecorder {
    compliant: Vec<bool>,
    tally: Arc<NetworkTally>,
    rounds: Vec<RoundSummary>,
}

impl RoundRecorder {
    pub(crate) fn new(roles: &[NodeRole], tally: Arc<NetworkTally>) -> Self {
        Self {
            compliant: roles.iter().map(NodeRole::is_compliant).collect(),
            tally,
            rounds: Vec::new(),
        }
    }

    pub(crate) fn record(&mut self, round: usize, outputs: &[HashSet<Transaction>]) {
        let all = AgreementStats::measure(outputs);
        let compliant = AgreementStats::measure(
            outputs
                .iter()
                .zip(&self.compliant)
                .filter(|(_, compliant)| **compliant)
                .map(|(output, _)| output),
        );
        let summary = RoundSummary {
            round,
            blacklist_events: self.tally.blacklisted_in(round),
            all,
            compliant,
        };

        info!(
            round,
            distinct_sets = summary.all.distinct_sets,
            consensus_pct = summary.all.consensus_pct,
            compliant_consensus_pct = summary.compliant.consensus_pct,
            blacklisted = summary.blacklist_events,
            "Round complete"
        );

        self.rounds.push(summary);
    }

    pub(crate) fn finish(self, config: &SimulationConfig, graph: &FollowGraph) -> SimulationReport {
        SimulationReport {
            config: config.clone(),
            malicious_nodes: self.compliant.iter().filter(|c| !**c).count(),
            edges: graph.edge_count(),
            finalized_nodes: self.tally.finalized(),
            rounds: self.rounds,
        }
    }
}
