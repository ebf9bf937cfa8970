use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Role / MemoryMessage
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// The task the run was started with.
    User,
    /// An action the agent chose (and its input).
    Assistant,
    /// What the chosen action returned, or why it failed.
    Observation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryMessage {
    pub role: Role,
    pub text: String,
}

// ---------------------------------------------------------------------------
// Transcript
// ---------------------------------------------------------------------------

/// Unbounded conversational memory for one run. The controller appends the
/// task, every chosen action, and every observation; the proposer reads the
/// whole transcript as context.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    messages: Vec<MemoryMessage>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_user(&mut self, text: impl Into<String>) {
        self.push(Role::User, text);
    }

    pub fn push_assistant(&mut self, text: impl Into<String>) {
        self.push(Role::Assistant, text);
    }

    pub fn push_observation(&mut self, text: impl Into<String>) {
        self.push(Role::Observation, text);
    }

    fn push(&mut self, role: Role, text: impl Into<String>) {
        self.messages.push(MemoryMessage {
            role,
            text: text.into(),
        });
    }

    pub fn messages(&self) -> &[MemoryMessage] {
        &self.messages
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transcript_preserves_order() {
        let mut t = Transcript::new();
        t.push_user("analyze the risks");
        t.push_assistant("think: break the problem down");
        t.push_observation("Your thoughts have been recorded.");

        let roles: Vec<Role> = t.messages().iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::User, Role::Assistant, Role::Observation]);
    }
}
