use crate::action::ActionId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// InvocationOutcome
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InvocationOutcome {
    /// The action ran and returned an observation.
    Success { observation: String },
    /// The action ran and failed (including per-step timeouts).
    Failure { error: String },
}

// ---------------------------------------------------------------------------
// Invocation
// ---------------------------------------------------------------------------

/// One executed (or failed) action at a given step. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invocation {
    pub action: ActionId,
    /// 1-based step index the action occupied.
    pub step: u32,
    pub outcome: InvocationOutcome,
    pub recorded_at: DateTime<Utc>,
}

impl Invocation {
    pub fn success(action: ActionId, step: u32, observation: impl Into<String>) -> Self {
        Self {
            action,
            step,
            outcome: InvocationOutcome::Success {
                observation: observation.into(),
            },
            recorded_at: Utc::now(),
        }
    }

    pub fn failure(action: ActionId, step: u32, error: impl Into<String>) -> Self {
        Self {
            action,
            step,
            outcome: InvocationOutcome::Failure {
                error: error.into(),
            },
            recorded_at: Utc::now(),
        }
    }

    pub fn succeeded(&self) -> bool {
        matches!(self.outcome, InvocationOutcome::Success { .. })
    }
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

/// Append-only log of invocations, scoped to a single run.
///
/// Owned exclusively by the execution controller; the legality evaluator
/// only reads it. Exactly one entry is appended per executed step; a
/// finalize step appends nothing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct History {
    entries: Vec<Invocation>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, invocation: Invocation) {
        self.entries.push(invocation);
    }

    pub fn last(&self) -> Option<&Invocation> {
        self.entries.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Invocation> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Successful invocations of `action` so far. Failed attempts occupy a
    /// step but never count toward min/max bounds.
    pub fn success_count(&self, action: &ActionId) -> u32 {
        self.entries
            .iter()
            .filter(|inv| inv.succeeded() && &inv.action == action)
            .count() as u32
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ActionId;

    fn id(s: &str) -> ActionId {
        ActionId::new(s).unwrap()
    }

    #[test]
    fn success_count_ignores_failures() {
        let mut history = History::new();
        history.append(Invocation::success(id("search"), 1, "found it"));
        history.append(Invocation::failure(id("search"), 2, "timed out"));
        history.append(Invocation::success(id("search"), 3, "found more"));

        assert_eq!(history.success_count(&id("search")), 2);
        assert_eq!(history.success_count(&id("think")), 0);
        assert_eq!(history.len(), 3);
    }

    #[test]
    fn last_sees_failures_too() {
        let mut history = History::new();
        history.append(Invocation::success(id("think"), 1, "ok"));
        history.append(Invocation::failure(id("search"), 2, "boom"));

        let last = history.last().unwrap();
        assert_eq!(last.action, id("search"));
        assert!(!last.succeeded());
    }

    #[test]
    fn invocation_json_roundtrip() {
        let inv = Invocation::failure(id("search"), 4, "connection reset");
        let json = serde_json::to_string(&inv).unwrap();
        assert!(json.contains("\"type\":\"failure\""));
        let parsed: Invocation = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, inv);
    }
}
