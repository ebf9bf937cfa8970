use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// StepEvent
// ---------------------------------------------------------------------------

/// One observable event in a run's step loop, retained for post-hoc
/// inspection and mirrored to `tracing` as it happens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StepEvent {
    /// The controller put a choice set in front of the proposer.
    Offered {
        step: u32,
        actions: Vec<String>,
        may_finalize: bool,
        /// True when the offer is a mandate rather than a free choice.
        forced: bool,
    },
    /// A proposal was rejected without consuming the step.
    Rejected { step: u32, attempt: u32, detail: String },
    /// An action ran (or failed) and was committed to history.
    Invoked {
        step: u32,
        action: String,
        succeeded: bool,
    },
    /// The run produced its final answer.
    Finalized { step: u32 },
}

// ---------------------------------------------------------------------------
// Trajectory
// ---------------------------------------------------------------------------

/// Ordered recorder of step events for one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    events: Vec<StepEvent>,
}

impl Trajectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, event: StepEvent) {
        match &event {
            StepEvent::Offered {
                step,
                actions,
                may_finalize,
                forced,
            } => {
                tracing::debug!(
                    step = *step,
                    actions = ?actions,
                    may_finalize = *may_finalize,
                    forced = *forced,
                    "offer"
                );
            }
            StepEvent::Rejected {
                step,
                attempt,
                detail,
            } => {
                tracing::warn!(
                    step = *step,
                    attempt = *attempt,
                    detail = %detail,
                    "proposal rejected"
                );
            }
            StepEvent::Invoked {
                step,
                action,
                succeeded,
            } => {
                tracing::info!(
                    step = *step,
                    action = %action,
                    succeeded = *succeeded,
                    "invoked"
                );
            }
            StepEvent::Finalized { step } => {
                tracing::info!(step = *step, "finalized");
            }
        }
        self.events.push(event);
    }

    pub fn events(&self) -> &[StepEvent] {
        &self.events
    }

    pub fn into_events(self) -> Vec<StepEvent> {
        self.events
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_keep_order_and_serialize_tagged() {
        let mut trajectory = Trajectory::new();
        trajectory.record(StepEvent::Offered {
            step: 1,
            actions: vec!["think".into()],
            may_finalize: false,
            forced: true,
        });
        trajectory.record(StepEvent::Invoked {
            step: 1,
            action: "think".into(),
            succeeded: true,
        });

        assert_eq!(trajectory.events().len(), 2);
        let json = serde_json::to_string(trajectory.events()).unwrap();
        assert!(json.contains("\"type\":\"offered\""));
        assert!(json.contains("\"type\":\"invoked\""));
    }
}
