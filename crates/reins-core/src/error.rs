use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid action slug '{0}': must be lowercase alphanumeric with hyphens or underscores (the wildcard '*' is only valid inside force_after)")]
    InvalidSlug(String),

    #[error("duplicate action in catalog: {0}")]
    DuplicateAction(String),

    #[error("unknown action '{action}' referenced by requirement on '{target}'")]
    UnknownAction { target: String, action: String },

    #[error("requirement on '{target}': min_invocations ({min}) exceeds max_invocations ({max})")]
    InvalidBounds { target: String, min: u32, max: u32 },

    #[error("requirement on '{target}': force_at_step must be >= 1")]
    InvalidForceStep { target: String },

    #[error("conflicting force_at_step {step}: claimed by both '{first}' and '{second}'")]
    ConflictingForce {
        step: u32,
        first: String,
        second: String,
    },

    #[error("overlapping force_after triggers: '{first}' and '{second}' are both mandated after '{trigger}'")]
    OverlappingForceTriggers {
        first: String,
        second: String,
        trigger: String,
    },

    #[error("step_budget must be >= 1")]
    InvalidStepBudget,

    #[error("unsatisfiable mandate at step {step}: '{action}' is both mandatory and forbidden ({reason})")]
    UnsatisfiableMandate {
        step: u32,
        action: String,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
