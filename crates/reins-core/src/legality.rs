use crate::action::ActionId;
use crate::error::{CoreError, Result};
use crate::history::History;
use crate::requirement::RequirementSet;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

// ---------------------------------------------------------------------------
// Legality
// ---------------------------------------------------------------------------

/// The per-step verdict: which actions the controller must force, which it
/// must withhold, and whether the run may finalize this step.
///
/// Evaluation is a pure function of (requirements, history, step), so
/// re-evaluating on a retry yields the identical verdict: a pending force
/// is re-asserted until the step actually resolves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Legality {
    pub mandatory: BTreeSet<ActionId>,
    pub forbidden: BTreeSet<ActionId>,
    /// True iff every `min_invocations` is met and no mandate is pending.
    pub finalizable: bool,
}

// ---------------------------------------------------------------------------
// evaluate
// ---------------------------------------------------------------------------

/// Compute the legality verdict for `current_step`.
///
/// Ordering: frequency/adjacency/prerequisite checks build the forbidden
/// set, force rules build the mandatory set, and a mandated action that is
/// simultaneously forbidden is an [`CoreError::UnsatisfiableMandate`] rather
/// than a silent resolution. When the mandatory set is non-empty it takes
/// precedence: the controller offers exactly that set.
pub fn evaluate(set: &RequirementSet, history: &History, current_step: u32) -> Result<Legality> {
    let previous = history.last();

    // Forbidden, with the reason kept for mandate-conflict reporting.
    let mut forbidden: BTreeMap<ActionId, String> = BTreeMap::new();
    for req in set.requirements() {
        if let Some(max) = req.max_invocations {
            if history.success_count(&req.target) >= max {
                forbidden
                    .entry(req.target.clone())
                    .or_insert_with(|| format!("max_invocations ({max}) reached"));
            }
        }

        if !req.consecutive_allowed {
            if let Some(prev) = previous {
                // Adjacency is about step order, not success: a failed
                // attempt still occupied the previous step.
                if prev.action == req.target {
                    forbidden
                        .entry(req.target.clone())
                        .or_insert_with(|| "consecutive invocations not allowed".to_string());
                }
            }
        }

        for prereq in &req.only_after {
            if history.success_count(prereq) == 0 {
                forbidden
                    .entry(req.target.clone())
                    .or_insert_with(|| format!("prerequisite '{prereq}' has not succeeded yet"));
            }
        }
    }

    // Mandatory: a force_at_step claiming this step, or a force_after whose
    // trigger set contains the action that just ran. A force is one-shot:
    // it is consumed by the step that satisfies it, so the target's own
    // invocation is not a fresh trigger (otherwise `force_after: ['*']`
    // with `consecutive_allowed: false` could never be satisfied).
    let mut mandatory: BTreeSet<ActionId> = BTreeSet::new();
    for req in set.requirements() {
        if req.force_at_step == Some(current_step) {
            mandatory.insert(req.target.clone());
        }
        if let Some(prev) = previous {
            if prev.action != req.target
                && req.force_after.iter().any(|t| t.matches(&prev.action))
            {
                mandatory.insert(req.target.clone());
            }
        }
    }

    if mandatory.len() > 1 {
        let mut actions = mandatory.iter();
        let first = actions.next().map(ToString::to_string).unwrap_or_default();
        let rest: Vec<String> = actions.map(ToString::to_string).collect();
        return Err(CoreError::UnsatisfiableMandate {
            step: current_step,
            action: first,
            reason: format!("also mandated alongside {}", rest.join(", ")),
        });
    }

    if let Some(action) = mandatory.iter().find(|a| forbidden.contains_key(*a)) {
        return Err(CoreError::UnsatisfiableMandate {
            step: current_step,
            action: action.to_string(),
            reason: forbidden[action].clone(),
        });
    }

    let mins_met = set
        .requirements()
        .iter()
        .all(|req| history.success_count(&req.target) >= req.min_invocations);
    let finalizable = mins_met && mandatory.is_empty();

    Ok(Legality {
        mandatory,
        forbidden: forbidden.into_keys().collect(),
        finalizable,
    })
}

// ---------------------------------------------------------------------------
// Unmet requirements
// ---------------------------------------------------------------------------

/// A `min_invocations` bound that a run has not satisfied. Named in budget
/// and deadlock failures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnmetRequirement {
    pub target: ActionId,
    pub required_min: u32,
    pub successes: u32,
}

impl std::fmt::Display for UnmetRequirement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {}/{} successful invocations",
            self.target, self.successes, self.required_min
        )
    }
}

/// Every requirement whose minimum is still unmet, in declaration order.
pub fn unmet_requirements(set: &RequirementSet, history: &History) -> Vec<UnmetRequirement> {
    set.requirements()
        .iter()
        .filter_map(|req| {
            let successes = history.success_count(&req.target);
            if successes < req.min_invocations {
                Some(UnmetRequirement {
                    target: req.target.clone(),
                    required_min: req.min_invocations,
                    successes,
                })
            } else {
                None
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
