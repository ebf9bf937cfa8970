use reins_core::{CoreError, UnmetRequirement};
use thiserror::Error;

fn join_unmet(unmet: &[UnmetRequirement]) -> String {
    unmet
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Error)]
pub enum AgentError {
    /// Configuration errors and unsatisfiable mandates from the core.
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("duplicate tool registered: {0}")]
    DuplicateTool(String),

    #[error(
        "proposer chose outside the offered set {attempts} time(s) at step {step}; last: {last}"
    )]
    ProposalViolation {
        step: u32,
        attempts: u32,
        last: String,
    },

    #[error("proposer failed {attempts} time(s) at step {step}; last: {last}")]
    ProposerFailed {
        step: u32,
        attempts: u32,
        last: String,
    },

    #[error(
        "step budget exhausted after {steps_consumed} step(s); unmet requirements: [{}]",
        join_unmet(.unmet)
    )]
    BudgetExhausted {
        steps_consumed: u32,
        unmet: Vec<UnmetRequirement>,
    },

    #[error(
        "no legal action available at step {step} and finalization is not yet allowed; unmet requirements: [{}]",
        join_unmet(.unmet)
    )]
    Deadlocked {
        step: u32,
        unmet: Vec<UnmetRequirement>,
    },
}

pub type Result<T> = std::result::Result<T, AgentError>;
