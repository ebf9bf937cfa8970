use crate::memory::{Role, Transcript};
use crate::tools::ToolSet;
use crate::types::{Offer, Proposal, Proposer, ProposerError};
use async_trait::async_trait;
use serde_json::json;

// ---------------------------------------------------------------------------
// ChatConfig
// ---------------------------------------------------------------------------

/// Connection settings for an OpenAI-compatible chat-completions endpoint.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// Base URL up to (not including) `/chat/completions`.
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub temperature: f32,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key: None,
            temperature: 0.0,
        }
    }
}

// ---------------------------------------------------------------------------
// ChatProposer
// ---------------------------------------------------------------------------

/// A proposer backed by a chat model. Each call renders the offer into a
/// system prompt, replays the transcript, and asks the model for a single
/// JSON object naming its choice. Anything the model returns that does not
/// parse into an offered choice is a retryable [`ProposerError`]; the
/// controller owns the retry budget.
pub struct ChatProposer {
    config: ChatConfig,
    client: reqwest::Client,
    tool_descriptions: Vec<(String, String)>,
}

impl ChatProposer {
    pub fn new(config: ChatConfig, tools: &ToolSet) -> Self {
        let tool_descriptions = tools
            .catalog()
            .iter()
            .filter_map(|id| {
                tools
                    .get(id)
                    .map(|t| (id.to_string(), t.description().to_string()))
            })
            .collect();
        Self {
            config,
            client: reqwest::Client::new(),
            tool_descriptions,
        }
    }

    fn system_prompt(&self, offer: &Offer) -> String {
        let mut prompt = String::from(
            "You are an agent that solves tasks by invoking tools one at a time.\n\
             Available tools:\n",
        );
        for (name, description) in &self.tool_descriptions {
            prompt.push_str(&format!("- {name}: {description}\n"));
        }
        prompt.push_str("\nThis step you may choose exactly one of: ");
        let mut choices: Vec<String> = offer.actions.iter().map(ToString::to_string).collect();
        if offer.may_finalize {
            choices.push("final_answer".to_string());
        }
        prompt.push_str(&choices.join(", "));
        prompt.push_str(
            "\n\nRespond with a single JSON object and nothing else.\n\
             To invoke a tool: {\"action\": \"<tool>\", \"input\": \"<input>\"}\n",
        );
        if offer.may_finalize {
            prompt.push_str(
                "To finish with your answer: {\"final_answer\": \"<complete answer>\"}\n",
            );
        }
        prompt
    }

    fn request_body(&self, transcript: &Transcript, offer: &Offer) -> serde_json::Value {
        let mut messages = vec![json!({
            "role": "system",
            "content": self.system_prompt(offer),
        })];
        for msg in transcript.messages() {
            let (role, prefix) = match msg.role {
                Role::User => ("user", ""),
                Role::Assistant => ("assistant", ""),
                Role::Observation => ("user", "Observation: "),
            };
            messages.push(json!({
                "role": role,
                "content": format!("{prefix}{}", msg.text),
            }));
        }
        json!({
            "model": self.config.model,
            "messages": messages,
            "temperature": self.config.temperature,
        })
    }
}

#[async_trait]
impl Proposer for ChatProposer {
    async fn propose(
        &self,
        transcript: &Transcript,
        offer: &Offer,
    ) -> Result<Proposal, ProposerError> {
        let url = format!("{}/chat/completions", self.config.base_url);
        let mut request = self
            .client
            .post(&url)
            .json(&self.request_body(transcript, offer));
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ProposerError::Transport(e.to_string()))?
            .error_for_status()
            .map_err(|e| ProposerError::Transport(e.to_string()))?;

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ProposerError::Transport(e.to_string()))?;
        let content = body["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| ProposerError::Malformed("response has no message content".into()))?;

        parse_choice(content)
    }
}

// ---------------------------------------------------------------------------
// Choice parsing
// ---------------------------------------------------------------------------

/// Parse the model's reply into a proposal. Tolerates markdown code fences;
/// everything else must be the documented one-object shape. The controller
/// still validates the choice against the offer.
fn parse_choice(content: &str) -> Result<Proposal, ProposerError> {
    let trimmed = strip_fences(content);
    let value: serde_json::Value = serde_json::from_str(trimmed)
        .map_err(|e| ProposerError::Malformed(format!("not a JSON object: {e}")))?;

    if let Some(answer) = value.get("final_answer").and_then(|v| v.as_str()) {
        return Ok(Proposal::Finalize {
            answer: answer.to_string(),
        });
    }

    let action = value
        .get("action")
        .and_then(|v| v.as_str())
        .ok_or_else(|| ProposerError::Malformed("missing 'action' or 'final_answer'".into()))?;
    let input = value
        .get("input")
        .and_then(|v| v.as_str())
        .unwrap_or_default();

    Ok(Proposal::Invoke {
        action: action
            .parse()
            .map_err(|e| ProposerError::Malformed(format!("bad action name: {e}")))?,
        input: input.to_string(),
    })
}

fn strip_fences(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use reins_core::ActionId;

    fn offer(actions: &[&str], may_finalize: bool) -> Offer {
        Offer {
            actions: actions
                .iter()
                .map(|s| s.parse::<ActionId>().unwrap())
                .collect(),
            may_finalize,
        }
    }

    #[test]
    fn parses_invoke_choice() {
        let proposal =
            parse_choice(r#"{"action": "wikipedia", "input": "quantum computing"}"#).unwrap();
        assert_eq!(
            proposal,
            Proposal::Invoke {
                action: "wikipedia".parse().unwrap(),
                input: "quantum computing".into(),
            }
        );
    }

    #[test]
    fn parses_final_answer() {
        let proposal = parse_choice(r#"{"final_answer": "42"}"#).unwrap();
        assert_eq!(
            proposal,
            Proposal::Finalize {
                answer: "42".into()
            }
        );
    }

    #[test]
    fn strips_code_fences() {
        let content = "```json\n{\"action\": \"think\", \"input\": \"hmm\"}\n```";
        let proposal = parse_choice(content).unwrap();
        assert!(matches!(proposal, Proposal::Invoke { .. }));
    }

    #[test]
    fn rejects_prose() {
        assert!(matches!(
            parse_choice("I think I should search Wikipedia."),
            Err(ProposerError::Malformed(_))
        ));
    }

    #[test]
    fn rejects_invalid_action_name() {
        assert!(matches!(
            parse_choice(r#"{"action": "Not A Tool"}"#),
            Err(ProposerError::Malformed(_))
        ));
    }

    #[test]
    fn system_prompt_lists_only_offered_choices() {
        let tools = ToolSet::builtin().unwrap();
        let proposer = ChatProposer::new(ChatConfig::default(), &tools);

        let closed = proposer.system_prompt(&offer(&["think"], false));
        assert!(closed.contains("choose exactly one of: think\n"));
        assert!(!closed.contains("final_answer"));

        let open = proposer.system_prompt(&offer(&["think", "wikipedia"], true));
        assert!(open.contains("think, wikipedia, final_answer"));
        assert!(open.contains("{\"final_answer\""));
    }

    #[test]
    fn request_body_replays_transcript() {
        let tools = ToolSet::builtin().unwrap();
        let proposer = ChatProposer::new(ChatConfig::default(), &tools);
        let mut transcript = Transcript::new();
        transcript.push_user("analyze the risks");
        transcript.push_assistant("think: break it down");
        transcript.push_observation("Your thoughts have been recorded.");

        let body = proposer.request_body(&transcript, &offer(&["think"], false));
        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 4); // system + 3 transcript entries
        assert_eq!(messages[0]["role"], "system");
        assert_eq!(messages[3]["content"], "Observation: Your thoughts have been recorded.");
    }
}
