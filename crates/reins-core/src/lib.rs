//! Requirement model and legality evaluation for requirement-governed
//! agent runs.
//!
//! A run is constrained by a declarative [`RequirementSet`]: per-action
//! forcing (`force_at_step`, `force_after`), ordering (`only_after`),
//! frequency bounds (`min_invocations`/`max_invocations`), and adjacency
//! (`consecutive_allowed`). At every step the pure [`legality::evaluate`]
//! function folds the requirements over the run's [`History`] and reports
//! which actions are mandatory, which are forbidden, and whether the run
//! may finalize.
//!
//! This crate is synchronous and side-effect free; the async step loop that
//! consumes these verdicts lives in `reins-agent`.

pub mod action;
pub mod error;
pub mod history;
pub mod legality;
pub mod requirement;
pub mod spec;

pub use action::{ActionId, ActionRef, Catalog};
pub use error::{CoreError, Result};
pub use history::{History, Invocation, InvocationOutcome};
pub use legality::{evaluate, unmet_requirements, Legality, UnmetRequirement};
pub use requirement::{Requirement, RequirementSet};
pub use spec::RunSpec;
