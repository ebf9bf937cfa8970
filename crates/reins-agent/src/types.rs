use crate::memory::Transcript;
use async_trait::async_trait;
use reins_core::ActionId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Proposal
// ---------------------------------------------------------------------------

/// What the proposer wants to do with the current step: invoke one action
/// with an input string, or finalize the run with an answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Proposal {
    Invoke { action: ActionId, input: String },
    Finalize { answer: String },
}

// ---------------------------------------------------------------------------
// Offer
// ---------------------------------------------------------------------------

/// The choice set the controller puts in front of the proposer for one
/// step. When a mandate is pending, `actions` is exactly the mandatory set
/// and `may_finalize` is false.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Offer {
    pub actions: Vec<ActionId>,
    pub may_finalize: bool,
}

impl Offer {
    pub fn permits(&self, proposal: &Proposal) -> bool {
        match proposal {
            Proposal::Invoke { action, .. } => self.actions.contains(action),
            Proposal::Finalize { .. } => self.may_finalize,
        }
    }
}

// ---------------------------------------------------------------------------
// Observation
// ---------------------------------------------------------------------------

/// The result of one successful tool execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub text: String,
    /// Structured payload, when the tool has one (e.g. parsed API output).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl Observation {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            data: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Collaborator errors
// ---------------------------------------------------------------------------

/// Failures of the propose call. All variants are retryable up to the
/// run's retry limit.
#[derive(Debug, Error)]
pub enum ProposerError {
    #[error("transport: {0}")]
    Transport(String),

    #[error("malformed proposal: {0}")]
    Malformed(String),

    #[error("proposal timed out")]
    TimedOut,
}

/// Failures of a tool execution. Non-fatal to the run; recorded as a
/// failed invocation.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("{0}")]
    Failed(String),

    #[error("http: {0}")]
    Http(#[from] reqwest::Error),
}

// ---------------------------------------------------------------------------
// Collaborator contracts
// ---------------------------------------------------------------------------

/// The external decision maker (typically a chat model). Must pick from the
/// offered set; the controller validates and re-prompts on violations.
#[async_trait]
pub trait Proposer: Send + Sync {
    async fn propose(
        &self,
        transcript: &Transcript,
        offer: &Offer,
    ) -> std::result::Result<Proposal, ProposerError>;
}

/// A named unit of work the agent can invoke. Stateless across steps;
/// failures are absorbed into the run's history.
///
/// `name` is the raw slug; it is validated as an [`ActionId`] when the tool
/// is registered in a `ToolSet`.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    async fn execute(&self, input: &str) -> std::result::Result<Observation, ToolError>;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> ActionId {
        s.parse().unwrap()
    }

    #[test]
    fn offer_permits_listed_action() {
        let offer = Offer {
            actions: vec![id("think")],
            may_finalize: false,
        };
        assert!(offer.permits(&Proposal::Invoke {
            action: id("think"),
            input: String::new(),
        }));
        assert!(!offer.permits(&Proposal::Invoke {
            action: id("search"),
            input: String::new(),
        }));
    }

    #[test]
    fn offer_gates_finalization() {
        let finalize = Proposal::Finalize {
            answer: "done".into(),
        };
        let closed = Offer {
            actions: vec![id("think")],
            may_finalize: false,
        };
        let open = Offer {
            actions: vec![id("think")],
            may_finalize: true,
        };
        assert!(!closed.permits(&finalize));
        assert!(open.permits(&finalize));
    }

    #[test]
    fn proposal_json_shape() {
        let p = Proposal::Invoke {
            action: id("search"),
            input: "quantum computing".into(),
        };
        let json = serde_json::to_string(&p).unwrap();
        assert!(json.contains("\"type\":\"invoke\""));
        let parsed: Proposal = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, p);
    }
}
