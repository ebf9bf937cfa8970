use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::time::timeout;
use uuid::Uuid;

use crate::error::{AgentError, Result};
use crate::memory::Transcript;
use crate::tools::ToolSet;
use crate::trajectory::{StepEvent, Trajectory};
use crate::types::{Offer, Proposal, Proposer, ProposerError};
use reins_core::{
    evaluate, unmet_requirements, ActionId, History, Invocation, Legality, RequirementSet, RunSpec,
};

// ─── RunReport ────────────────────────────────────────────────────────────

/// The terminal result of a finalized run: the answer plus the full
/// invocation history and trajectory for post-hoc inspection.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub answer: String,
    /// Steps consumed, including the finalize step.
    pub steps_consumed: u32,
    /// Proposals rejected across the whole run (violations + transport
    /// failures), none of which consumed a step.
    pub rejections: u32,
    pub history: History,
    pub trajectory: Vec<StepEvent>,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
}

// ─── Controller ───────────────────────────────────────────────────────────

/// The requirement-constrained execution controller.
///
/// Drives the step loop: evaluates legality, offers the proposer a choice
/// set (the mandate when one is pending, otherwise the catalog minus the
/// forbidden set), validates the proposal, executes the chosen tool, and
/// appends the invocation. Conceptually each step moves through
/// `AwaitProposal → Validating → { Executing, Rejected, Finalized }`;
/// rejected proposals loop back to `AwaitProposal` without consuming a
/// step, and the loop ends `Finalized` or exhausted.
///
/// The controller exclusively owns the history and step counter of each
/// run; independent runs share nothing mutable and may execute in
/// parallel.
pub struct Controller {
    set: RequirementSet,
    tools: ToolSet,
    proposer: Box<dyn Proposer>,
    step_budget: u32,
    retry_limit: u32,
    step_timeout: Duration,
}

impl std::fmt::Debug for Controller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Controller")
            .field("set", &self.set)
            .field("step_budget", &self.step_budget)
            .field("retry_limit", &self.retry_limit)
            .field("step_timeout", &self.step_timeout)
            .finish_non_exhaustive()
    }
}

impl Controller {
    /// Compile `spec` against the tool set's catalog and build a
    /// controller. Every configuration error surfaces here, before any
    /// step runs.
    pub fn new(spec: &RunSpec, tools: ToolSet, proposer: Box<dyn Proposer>) -> Result<Self> {
        let catalog = tools.catalog();
        let set = spec.compile(&catalog)?;
        Ok(Self {
            set,
            tools,
            proposer,
            step_budget: spec.step_budget,
            retry_limit: spec.retry_limit,
            step_timeout: spec.step_timeout(),
        })
    }

    /// Drive one run to completion.
    pub async fn run(&self, task: &str) -> Result<RunReport> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let started = std::time::Instant::now();

        let mut history = History::new();
        let mut transcript = Transcript::new();
        transcript.push_user(task);
        let mut trajectory = Trajectory::new();
        let mut rejections = 0u32;
        let mut current_step = 1u32;

        tracing::info!(%run_id, step_budget = self.step_budget, "run started");

        loop {
            // Termination policy, checked before soliciting anything: the
            // budget here, finalization eligibility inside `evaluate`.
            if self.over_budget(current_step) {
                return Err(AgentError::BudgetExhausted {
                    steps_consumed: current_step - 1,
                    unmet: unmet_requirements(&self.set, &history),
                });
            }

            let legality = evaluate(&self.set, &history, current_step)?;
            let offer = self.build_offer(&legality);
            if offer.actions.is_empty() && !offer.may_finalize {
                return Err(AgentError::Deadlocked {
                    step: current_step,
                    unmet: unmet_requirements(&self.set, &history),
                });
            }
            trajectory.record(StepEvent::Offered {
                step: current_step,
                actions: offer.actions.iter().map(ToString::to_string).collect(),
                may_finalize: offer.may_finalize,
                forced: !legality.mandatory.is_empty(),
            });

            let proposal = self
                .solicit(&transcript, &offer, current_step, &mut trajectory, &mut rejections)
                .await?;

            match proposal {
                Proposal::Finalize { answer } => {
                    trajectory.record(StepEvent::Finalized { step: current_step });
                    return Ok(RunReport {
                        run_id,
                        answer,
                        steps_consumed: current_step,
                        rejections,
                        history,
                        trajectory: trajectory.into_events(),
                        started_at,
                        duration_ms: started.elapsed().as_millis() as u64,
                    });
                }
                Proposal::Invoke { action, input } => {
                    transcript.push_assistant(format!("{action}: {input}"));
                    let invocation = self.execute(action, &input, current_step).await;
                    trajectory.record(StepEvent::Invoked {
                        step: current_step,
                        action: invocation.action.to_string(),
                        succeeded: invocation.succeeded(),
                    });
                    transcript.push_observation(match &invocation.outcome {
                        reins_core::InvocationOutcome::Success { observation } => {
                            observation.clone()
                        }
                        reins_core::InvocationOutcome::Failure { error } => {
                            format!("{} failed: {error}", invocation.action)
                        }
                    });
                    history.append(invocation);
                    current_step += 1;
                }
            }
        }
    }

    /// Finalize never happened in time: `step_budget` counts every resolved
    /// step, including the finalize step itself.
    fn over_budget(&self, current_step: u32) -> bool {
        current_step > self.step_budget
    }

    /// The choice set for this step. A pending mandate takes precedence
    /// over everything, including finalization; otherwise the proposer may
    /// pick any non-forbidden action, plus finalize once every minimum is
    /// met.
    fn build_offer(&self, legality: &Legality) -> Offer {
        if !legality.mandatory.is_empty() {
            return Offer {
                actions: self
                    .set
                    .catalog()
                    .iter()
                    .filter(|a| legality.mandatory.contains(*a))
                    .cloned()
                    .collect(),
                may_finalize: false,
            };
        }
        Offer {
            actions: self
                .set
                .catalog()
                .iter()
                .filter(|a| !legality.forbidden.contains(*a))
                .cloned()
                .collect(),
            may_finalize: legality.finalizable,
        }
    }

    /// Obtain a proposal the offer permits. Violations and proposer
    /// failures are rejected and re-prompted without consuming a step,
    /// up to `retry_limit` rejections; the next failure is fatal.
    async fn solicit(
        &self,
        transcript: &Transcript,
        offer: &Offer,
        step: u32,
        trajectory: &mut Trajectory,
        rejections: &mut u32,
    ) -> Result<Proposal> {
        let mut attempts = 0u32;
        loop {
            let outcome = match timeout(self.step_timeout, self.proposer.propose(transcript, offer))
                .await
            {
                Err(_) => Err(ProposerError::TimedOut),
                Ok(result) => result,
            };

            let (violation, detail) = match outcome {
                Ok(proposal) if offer.permits(&proposal) => return Ok(proposal),
                Ok(Proposal::Invoke { action, .. }) => {
                    (true, format!("'{action}' is not in the offered set"))
                }
                Ok(Proposal::Finalize { .. }) => {
                    (true, "finalization is not currently allowed".to_string())
                }
                Err(e) => (false, e.to_string()),
            };

            attempts += 1;
            *rejections += 1;
            trajectory.record(StepEvent::Rejected {
                step,
                attempt: attempts,
                detail: detail.clone(),
            });

            if attempts > self.retry_limit {
                return Err(if violation {
                    AgentError::ProposalViolation {
                        step,
                        attempts,
                        last: detail,
                    }
                } else {
                    AgentError::ProposerFailed {
                        step,
                        attempts,
                        last: detail,
                    }
                });
            }
        }
    }

    /// Execute the chosen action under the per-step timeout. Never fatal:
    /// failures and timeouts become failed invocations, so frequency and
    /// adjacency bookkeeping stay consistent.
    async fn execute(&self, action: ActionId, input: &str, step: u32) -> Invocation {
        let Some(tool) = self.tools.get(&action) else {
            // Unreachable when the offer came from the catalog; recorded
            // rather than panicking.
            return Invocation::failure(action, step, "no such tool registered");
        };
        match timeout(self.step_timeout, tool.execute(input)).await {
            Ok(Ok(observation)) => Invocation::success(action, step, observation.text),
            Ok(Err(e)) => Invocation::failure(action, step, e.to_string()),
            Err(_) => Invocation::failure(
                action,
                step,
                format!("timed out after {}s", self.step_timeout.as_secs()),
            ),
        }
    }
}
