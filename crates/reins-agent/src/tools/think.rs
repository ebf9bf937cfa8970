use crate::types::{Observation, Tool, ToolError};
use async_trait::async_trait;

/// Side-effect-free reasoning scratchpad.
///
/// The input is the model's own thought; the controller has already placed
/// it on the transcript, so the observation is a fixed acknowledgement.
/// Useful as the target of forcing requirements ("think first", "think
/// after every tool call").
#[derive(Debug, Default)]
pub struct ThinkTool;

impl ThinkTool {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Tool for ThinkTool {
    fn name(&self) -> &str {
        "think"
    }

    fn description(&self) -> &str {
        "Write out your reasoning before acting. Input: your current thoughts, \
         plan, or analysis of the observations so far."
    }

    async fn execute(&self, input: &str) -> Result<Observation, ToolError> {
        if input.trim().is_empty() {
            return Err(ToolError::Failed("empty thought".to_string()));
        }
        Ok(Observation::text("Your thoughts have been recorded."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn acknowledges_a_thought() {
        let obs = ThinkTool::new()
            .execute("the question has three parts; research part two first")
            .await
            .unwrap();
        assert_eq!(obs.text, "Your thoughts have been recorded.");
    }

    #[tokio::test]
    async fn rejects_empty_thought() {
        assert!(ThinkTool::new().execute("   ").await.is_err());
    }
}
