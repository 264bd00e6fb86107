use chrono::Utc;
use tracing::{debug, error, info, warn};

use crate::telemetry::generate_correlation_id;
use crate::workflow::context::WorkflowContext;
use crate::workflow::transitions::{transition, MachineInput, Transition, TransitionPolicy};
use crate::workflow::types::{
    EffectOutcome, EffectRequest, EffectTicket, TransitionRecord, TransitionTrigger,
    WorkflowEvent, WorkflowSnapshot, WorkflowState,
};

/// Effect the caller must launch after a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectLaunch {
    pub ticket: EffectTicket,
    pub request: EffectRequest,
}

/// An applied transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub from: WorkflowState,
    pub to: WorkflowState,
    pub effect: Option<EffectLaunch>,
}

/// What happened to a settled effect
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Applied(Step),
    /// The machine left the state that launched the effect; result discarded
    Stale,
    /// The outcome could not be applied and the instance is halted
    Faulted { reason: String },
}

/// Synchronous core of the workflow orchestrator.
///
/// Owns the state, the context and the generation counter. The generation is
/// bumped on every state entry and stamped on every launched effect, so an
/// outcome that arrives after the machine moved on is recognised and dropped.
#[derive(Debug, Clone)]
pub struct WorkflowMachine {
    workflow_id: String,
    state: WorkflowState,
    context: WorkflowContext,
    generation: u64,
    policy: TransitionPolicy,
    fault: Option<String>,
    history: Vec<TransitionRecord>,
}

impl WorkflowMachine {
    pub fn new(context: WorkflowContext) -> Self {
        Self {
            workflow_id: generate_correlation_id(),
            state: WorkflowState::Idle,
            context,
            generation: 0,
            policy: TransitionPolicy::default(),
            fault: None,
            history: Vec::new(),
        }
    }

    pub fn with_policy(mut self, policy: TransitionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_workflow_id(mut self, workflow_id: impl Into<String>) -> Self {
        self.workflow_id = workflow_id.into();
        self
    }

    pub fn workflow_id(&self) -> &str {
        &self.workflow_id
    }

    pub fn state(&self) -> WorkflowState {
        self.state
    }

    pub fn context(&self) -> &WorkflowContext {
        &self.context
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn history(&self) -> &[TransitionRecord] {
        &self.history
    }

    pub fn is_faulted(&self) -> bool {
        self.fault.is_some()
    }

    pub fn fault(&self) -> Option<&str> {
        self.fault.as_deref()
    }

    /// Ticket identifying the current state occupancy
    pub fn current_ticket(&self) -> EffectTicket {
        EffectTicket {
            generation: self.generation,
            state: self.state,
        }
    }

    /// Handle an operator event. Events that do not apply to the current
    /// state are ignored and return `None`.
    pub fn handle_event(&mut self, event: WorkflowEvent) -> Option<Step> {
        if let Some(reason) = &self.fault {
            warn!(
                workflow_id = %self.workflow_id,
                event = %event,
                reason = %reason,
                "Ignoring event for faulted workflow"
            );
            return None;
        }

        let input = MachineInput::Event(event);
        match transition(self.state, &self.context, &input, self.policy) {
            Some(next) => Some(self.apply(next, TransitionTrigger::Event(event))),
            None => {
                debug!(
                    workflow_id = %self.workflow_id,
                    state = %self.state,
                    event = %event,
                    "Event not accepted in current state"
                );
                None
            }
        }
    }

    /// Feed back the outcome of an effect launched under `ticket`
    pub fn resolve(&mut self, ticket: EffectTicket, outcome: EffectOutcome) -> Resolution {
        if let Some(reason) = &self.fault {
            return Resolution::Faulted {
                reason: reason.clone(),
            };
        }

        if ticket != self.current_ticket() {
            debug!(
                workflow_id = %self.workflow_id,
                ticket_generation = ticket.generation,
                ticket_state = %ticket.state,
                generation = self.generation,
                state = %self.state,
                "Discarding stale effect outcome"
            );
            return Resolution::Stale;
        }

        let trigger = TransitionTrigger::Effect {
            kind: outcome.kind(),
            status: outcome.status(),
        };
        let input = MachineInput::Effect(outcome);
        match transition(self.state, &self.context, &input, self.policy) {
            Some(next) => Resolution::Applied(self.apply(next, trigger)),
            None => {
                let reason = format!(
                    "{:?} outcome cannot be applied in state {}",
                    trigger, self.state
                );
                error!(
                    workflow_id = %self.workflow_id,
                    state = %self.state,
                    reason = %reason,
                    "Workflow faulted"
                );
                self.fault = Some(reason.clone());
                Resolution::Faulted { reason }
            }
        }
    }

    pub fn snapshot(&self) -> WorkflowSnapshot {
        WorkflowSnapshot {
            workflow_id: self.workflow_id.clone(),
            state: self.state,
            context: self.context.clone(),
            generation: self.generation,
            transitions_count: self.history.len(),
            last_transition: self.history.last().cloned(),
            faulted: self.is_faulted(),
        }
    }

    fn apply(&mut self, next: Transition, trigger: TransitionTrigger) -> Step {
        let from = self.state;
        self.generation += 1;
        self.state = next.target;
        self.context = next.context;

        let record = TransitionRecord {
            from,
            to: next.target,
            trigger,
            generation: self.generation,
            detail: next.detail,
            timestamp: Utc::now(),
        };

        match &record.detail {
            Some(detail) => warn!(
                workflow_id = %self.workflow_id,
                from_state = %record.from,
                to_state = %record.to,
                trigger = ?record.trigger,
                detail = %detail,
                "Workflow state transition after failure"
            ),
            None => info!(
                workflow_id = %self.workflow_id,
                from_state = %record.from,
                to_state = %record.to,
                trigger = ?record.trigger,
                generation = record.generation,
                "Workflow state transition"
            ),
        }
        self.history.push(record);

        let effect = EffectRequest::for_state(self.state, &self.context).map(|request| {
            EffectLaunch {
                ticket: self.current_ticket(),
                request,
            }
        });

        Step {
            from,
            to: self.state,
            effect,
        }
    }
}
