//! Async driver for [`WorkflowMachine`].
//!
//! The driver owns the machine on a single tokio task. Operator events reach
//! it over an mpsc channel, effects run on their own tasks and only their
//! outcomes come back, and every change is published as a
//! [`WorkflowSnapshot`] on a watch channel.

use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn, Instrument};

use crate::config::WorkflowConfig;
use crate::telemetry::create_workflow_span;
use crate::workflow::context::WorkflowContext;
use crate::workflow::effects::Collaborators;
use crate::workflow::errors::WorkflowError;
use crate::workflow::state_machine::{EffectLaunch, Resolution, Step, WorkflowMachine};
use crate::workflow::transitions::TransitionPolicy;
use crate::workflow::types::{
    EffectKind, EffectOutcome, EffectRequest, EffectTicket, WorkflowEvent, WorkflowSnapshot,
    WorkflowState,
};

const COMMAND_BUFFER: usize = 32;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrchestratorOptions {
    /// Settle an effect as failed when it runs longer than this
    pub effect_timeout: Option<Duration>,
    pub policy: TransitionPolicy,
}

impl OrchestratorOptions {
    pub fn from_config(config: &WorkflowConfig) -> Result<Self, WorkflowError> {
        let effect_timeout = match config.effect_timeout_seconds {
            Some(0) => {
                return Err(WorkflowError::Config(
                    "effect_timeout_seconds must be greater than zero".to_string(),
                ))
            }
            Some(seconds) => Some(Duration::from_secs(seconds)),
            None => None,
        };

        Ok(Self {
            effect_timeout,
            policy: TransitionPolicy {
                clear_reports_on_restart: config.clear_reports_on_restart,
            },
        })
    }
}

#[derive(Debug)]
enum Command {
    Event(WorkflowEvent),
    Shutdown,
}

/// The single effect whose completion the machine is waiting on
#[derive(Debug)]
struct PendingEffect {
    ticket: EffectTicket,
    request: EffectRequest,
    handle: JoinHandle<Option<EffectOutcome>>,
}

#[derive(Debug)]
pub struct WorkflowOrchestrator {
    machine: WorkflowMachine,
    collaborators: Collaborators,
    options: OrchestratorOptions,
    snapshots: watch::Sender<WorkflowSnapshot>,
}

impl WorkflowOrchestrator {
    pub fn new(
        context: WorkflowContext,
        collaborators: Collaborators,
        options: OrchestratorOptions,
    ) -> Self {
        let machine = WorkflowMachine::new(context).with_policy(options.policy);
        let (snapshots, _) = watch::channel(machine.snapshot());
        Self {
            machine,
            collaborators,
            options,
            snapshots,
        }
    }

    pub fn with_workflow_id(mut self, workflow_id: impl Into<String>) -> Self {
        self.machine = self.machine.with_workflow_id(workflow_id);
        self.snapshots.send_replace(self.machine.snapshot());
        self
    }

    /// Move the orchestrator onto its own task and hand back the control handle
    pub fn spawn(self) -> WorkflowHandle {
        let (commands, receiver) = mpsc::channel(COMMAND_BUFFER);
        let snapshots = self.snapshots.subscribe();
        let context = self.machine.context();
        let span = create_workflow_span(
            self.machine.workflow_id(),
            context.base_path(),
            context.destination_path(),
        );
        let workflow_id = self.machine.workflow_id().to_string();
        let task = tokio::spawn(self.run(receiver).instrument(span));

        WorkflowHandle {
            workflow_id,
            commands,
            snapshots,
            task,
        }
    }

    async fn run(mut self, mut commands: mpsc::Receiver<Command>) -> Result<(), WorkflowError> {
        info!(
            workflow_id = %self.machine.workflow_id(),
            effect_timeout = ?self.options.effect_timeout,
            "Workflow orchestrator started"
        );
        let mut pending: Option<PendingEffect> = None;

        let result = loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(Command::Event(event)) => {
                        if let Some(step) = self.machine.handle_event(event) {
                            self.enter(step, &mut pending);
                        }
                    }
                    Some(Command::Shutdown) | None => break Ok(()),
                },
                (ticket, outcome) = settle(&mut pending), if pending.is_some() => {
                    pending = None;
                    let resolution = match outcome {
                        Some(outcome) => self.machine.resolve(ticket, outcome),
                        None => Resolution::Faulted {
                            reason: format!("effect for {} settled without an outcome", ticket.state),
                        },
                    };
                    match resolution {
                        Resolution::Applied(step) => self.enter(step, &mut pending),
                        Resolution::Stale => {}
                        Resolution::Faulted { reason } => {
                            break Err(WorkflowError::Faulted {
                                state: self.machine.state(),
                                reason,
                            });
                        }
                    }
                }
            }
            self.publish();
        };

        if let Some(effect) = pending.take() {
            debug!(state = %effect.ticket.state, "Aborting pending effect on shutdown");
            effect.handle.abort();
        }
        self.publish();

        match &result {
            Ok(()) => info!(
                workflow_id = %self.machine.workflow_id(),
                state = %self.machine.state(),
                "Workflow orchestrator stopped"
            ),
            Err(e) => error!(
                workflow_id = %self.machine.workflow_id(),
                error = %e,
                "Workflow orchestrator halted"
            ),
        }
        result
    }

    /// React to a state entry: drop whatever belonged to the previous
    /// occupancy and launch the new entry effect
    fn enter(&self, step: Step, pending: &mut Option<PendingEffect>) {
        if let Some(stale) = pending.take() {
            debug!(
                from_state = %step.from,
                ticket_generation = stale.ticket.generation,
                "Cancelling effect of a state that was left"
            );
            stale.handle.abort();
        }

        if let Some(launch) = step.effect {
            *pending = self.launch(launch);
        }
    }

    fn launch(&self, launch: EffectLaunch) -> Option<PendingEffect> {
        let EffectLaunch { ticket, request } = launch;
        let collaborators = self.collaborators.clone();
        let kind = request.kind();

        if kind == EffectKind::NotifyErrors {
            tokio::spawn(
                async move {
                    collaborators.execute(request).await;
                }
                .in_current_span(),
            );
            return None;
        }

        let effect_timeout = self.options.effect_timeout;
        let task_request = request.clone();
        let handle = tokio::spawn(
            async move { run_effect(collaborators, task_request, effect_timeout).await }
                .in_current_span(),
        );
        Some(PendingEffect {
            ticket,
            request,
            handle,
        })
    }

    fn publish(&self) {
        let snapshot = self.machine.snapshot();
        self.snapshots.send_if_modified(|current| {
            if *current == snapshot {
                false
            } else {
                *current = snapshot;
                true
            }
        });
    }
}

async fn run_effect(
    collaborators: Collaborators,
    request: EffectRequest,
    effect_timeout: Option<Duration>,
) -> Option<EffectOutcome> {
    let fallback = request.clone();
    let kind = request.kind();
    let run = collaborators.execute(request);

    match effect_timeout {
        Some(limit) => match tokio::time::timeout(limit, run).await {
            Ok(outcome) => outcome,
            Err(_) => {
                warn!(effect = ?kind, timeout = ?limit, "Effect timed out");
                fallback.failure_outcome(format!("{:?} effect timed out after {:?}", kind, limit))
            }
        },
        None => run.await,
    }
}

/// Wait for the pending effect task. A task that panicked settles as the
/// failure of the effect it was running.
async fn settle(pending: &mut Option<PendingEffect>) -> (EffectTicket, Option<EffectOutcome>) {
    let Some(effect) = pending.as_mut() else {
        return std::future::pending().await;
    };

    match (&mut effect.handle).await {
        Ok(outcome) => (effect.ticket, outcome),
        Err(e) => {
            error!(state = %effect.ticket.state, error = %e, "Effect task failed");
            let outcome = effect
                .request
                .failure_outcome(format!("{:?} effect task failed: {}", effect.request.kind(), e));
            (effect.ticket, outcome)
        }
    }
}

/// Caller-side control of a running workflow
#[derive(Debug)]
pub struct WorkflowHandle {
    workflow_id: String,
    commands: mpsc::Sender<Command>,
    snapshots: watch::Receiver<WorkflowSnapshot>,
    task: JoinHandle<Result<(), WorkflowError>>,
}

impl WorkflowHandle {
    pub fn workflow_id(&self) -> &str {
        &self.workflow_id
    }

    pub async fn send(&self, event: WorkflowEvent) -> Result<(), WorkflowError> {
        self.commands
            .send(Command::Event(event))
            .await
            .map_err(|_| WorkflowError::OrchestratorStopped)
    }

    pub async fn start_scan(&self) -> Result<(), WorkflowError> {
        self.send(WorkflowEvent::StartScan).await
    }

    pub async fn restart(&self) -> Result<(), WorkflowError> {
        self.send(WorkflowEvent::Restart).await
    }

    pub fn subscribe(&self) -> watch::Receiver<WorkflowSnapshot> {
        self.snapshots.clone()
    }

    pub fn snapshot(&self) -> WorkflowSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Wait until a published snapshot satisfies `predicate`
    pub async fn wait_until(
        &self,
        mut predicate: impl FnMut(&WorkflowSnapshot) -> bool,
    ) -> Result<WorkflowSnapshot, WorkflowError> {
        let mut receiver = self.snapshots.clone();
        let snapshot = receiver
            .wait_for(|snapshot| predicate(snapshot))
            .await
            .map_err(|_| WorkflowError::OrchestratorStopped)?;
        Ok(snapshot.clone())
    }

    pub async fn wait_for_state(
        &self,
        state: WorkflowState,
    ) -> Result<WorkflowSnapshot, WorkflowError> {
        self.wait_until(|snapshot| snapshot.state == state).await
    }

    /// Stop the driver, abandoning any pending effect, and return the last
    /// published snapshot. A driver that already halted reports why.
    pub async fn shutdown(self) -> Result<WorkflowSnapshot, WorkflowError> {
        let _ = self.commands.send(Command::Shutdown).await;
        match self.task.await {
            Ok(Ok(())) => Ok(self.snapshots.borrow().clone()),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(WorkflowError::OrchestratorStopped),
        }
    }
}
