//! `reins-agent`: the requirement-constrained execution controller.
//!
//! Drives an agent's step loop under the constraints compiled by
//! `reins-core`. The two external collaborators are trait objects:
//!
//! ```text
//! RunSpec + ToolSet
//!     │
//!     ▼
//! Controller      ← per step: evaluate legality, build the offer
//!     │              solicit a Proposal (retry on violations)
//!     ▼              execute the tool, append the Invocation
//! Proposer        ← e.g. ChatProposer over an OpenAI-compatible endpoint
//! Tool            ← e.g. ThinkTool, WikipediaTool
//!     │
//!     ▼
//! RunReport       ← answer + history + trajectory, or a structured
//!                   failure naming the unmet requirements
//! ```
//!
//! Both external calls run under the per-step timeout; a tool timeout is
//! committed as a failed invocation so frequency and adjacency bookkeeping
//! stay consistent.

pub mod chat;
pub mod controller;
pub mod error;
pub mod memory;
pub mod tools;
pub mod trajectory;
pub mod types;


pub use chat::{ChatConfig, ChatProposer};
pub use controller::{Controller, RunReport};
pub use error::{AgentError, Result};
pub use memory::{MemoryMessage, Role, Transcript};
pub use tools::{ThinkTool, ToolSet, WikipediaTool};
pub use trajectory::{StepEvent, Trajectory};
pub use types::{Observation, Offer, Proposal, Proposer, ProposerError, Tool, ToolError};
