//! Task-per-node harness
//!
//! Every node lives in its own tokio task and is driven over a command
//! channel. The coordinator collects every reply of a phase before starting
//! the next one, so no node sees round `r + 1` traffic while another is still
//! in round `r`.

use crate::consensus::{Candidate, Node, ProtocolViolation, Transaction};
use crate::simulation::report::SimulationReport;
use crate::simulation::runner::{
    protocol_error, route_proposals, RoundRecorder, Simulation, SimulationError,
};
use std::collections::HashSet;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::debug;

enum Command {
    Send(oneshot::Sender<HashSet<Transaction>>),
    Receive(
        HashSet<Candidate>,
        oneshot::Sender<Result<(), ProtocolViolation>>,
    ),
}

struct NodeHandle {
    commands: mpsc::Sender<Command>,
    task: JoinHandle<()>,
}

fn spawn_node(mut node: Box<dyn Node>) -> NodeHandle {
    let (commands, mut inbox) = mpsc::channel(1);
    let task = tokio::spawn(async move {
        while let Some(command) = inbox.recv().await {
            match command {
                Command::Send(reply) => {
                    let _ = reply.send(node.send_to_followers());
                }
                Command::Receive(candidates, reply) => {
                    let _ = reply.send(node.receive_from_followees(&candidates));
                }
            }
        }
    });
    NodeHandle { commands, task }
}

/// Ask every node for its output and wait for all of them.
async fn snapshot(handles: &[NodeHandle]) -> Result<Vec<HashSet<Transaction>>, SimulationError> {
    let mut pending = Vec::with_capacity(handles.len());
    for (node, handle) in handles.iter().enumerate() {
        let (reply, response) = oneshot::channel();
        handle
            .commands
            .send(Command::Send(reply))
            .await
            .map_err(|_| SimulationError::NodeUnavailable { node })?;
        pending.push(response);
    }

    let mut outputs = Vec::with_capacity(pending.len());
    for (node, response) in pending.into_iter().enumerate() {
        outputs.push(
            response
                .await
                .map_err(|_| SimulationError::NodeUnavailable { node })?,
        );
    }
    Ok(outputs)
}

/// Deliver one round of inboxes and wait until every node has processed it.
async fn deliver(
    handles: &[NodeHandle],
    inboxes: Vec<HashSet<Candidate>>,
) -> Result<Vec<Result<(), ProtocolViolation>>, SimulationError> {
    let mut pending = Vec::with_capacity(handles.len());
    for (node, (handle, inbox)) in handles.iter().zip(inboxes).enumerate() {
        let (reply, response) = oneshot::channel();
        handle
            .commands
            .send(Command::Receive(inbox, reply))
            .await
            .map_err(|_| SimulationError::NodeUnavailable { node })?;
        pending.push(response);
    }

    let mut results = Vec::with_capacity(pending.len());
    for (node, response) in pending.into_iter().enumerate() {
        results.push(
            response
                .await
                .map_err(|_| SimulationError::NodeUnavailable { node })?,
        );
    }
    Ok(results)
}

/// Run a prepared simulation with one task per node. Produces the same
/// report as [`Simulation::run`] for the same configuration.
pub async fn run_concurrent(simulation: Simulation) -> Result<SimulationReport, SimulationError> {
    let Simulation {
        config,
        graph,
        nodes,
        roles,
        valid,
        tally,
    } = simulation;

    let handles: Vec<NodeHandle> = nodes.into_iter().map(spawn_node).collect();
    debug!(tasks = handles.len(), "Node tasks spawned");

    let mut recorder = RoundRecorder::new(&roles, tally);
    let mut outputs = snapshot(&handles).await?;

    for round in 1..=config.num_rounds {
        let inboxes = route_proposals(&graph, &valid, &outputs);
        let results = deliver(&handles, inboxes).await?;
        for (node, result) in results.into_iter().enumerate() {
            result.map_err(|source| protocol_error(node, roles[node], source))?;
        }
        outputs = snapshot(&handles).await?;
        recorder.record(round, &outputs);
    }

    for (node, handle) in handles.into_iter().enumerate() {
        drop(handle.commands);
        handle
            .task
            .await
            .map_err(|_| SimulationError::NodeUnavailable { node })?;
    }

    Ok(recorder.finish(&config, &graph))
}
