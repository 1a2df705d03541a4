use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

use crate::wire::{ChatRole, ModelRequest};

/// OpenAI chat-completions provider using strict `json_schema` response format.
pub struct OpenAIProvider {
    model: String,
    api_key: String,
    api_base: String,
    client: Client,
    timeout_secs: u64,
}

impl OpenAIProvider {
    pub fn new(model: String, api_key: String, api_base: String, timeout_secs: u64) -> Self {
        Self {
            model,
            api_key,
            api_base,
            client: Client::new(),
            timeout_secs,
        }
    }
}

/// Strict mode wants every object closed with `additionalProperties: false`.
pub fn to_strict_schema(schema: &Value) -> Value {
    match schema {
        Value::Object(map) => {
            let mut out: serde_json::Map<String, Value> =
                map.iter().map(|(k, v)| (k.clone(), to_strict_schema(v))).collect();
            if map.get("type").and_then(Value::as_str) == Some("object") {
                out.insert("additionalProperties".into(), Value::Bool(false));
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.iter().map(to_strict_schema).collect()),
        other => other.clone(),
    }
}

fn build_messages(req: &ModelRequest) -> Vec<Value> {
    let mut messages = Vec::with_capacity(req.turns.len() + 1);
    if let Some(system) = &req.system {
        messages.push(json!({ "role": "system", "content": system }));
    }
    for t in &req.turns {
        let role = match t.role {
            ChatRole::User => "user",
            ChatRole::Model => "assistant",
        };
        messages.push(json!({ "role": role, "content": t.content }));
    }
    messages
}

#[async_trait]
impl super::Provider for OpenAIProvider {
    async fn send(&self, req: &ModelRequest, debug: bool) -> Result<String> {
        let mut body = json!({
            "model": self.model,
            "messages": build_messages(req),
            "response_format": {
                "type": "json_schema",
                "json_schema": {
                    "name": "planner_response",
                    "strict": true,
                    "schema": to_strict_schema(&req.schema)
                }
            }
        });
        if let Some(s) = req.sampling {
            body["temperature"] = json!(s.temperature);
            body["top_p"] = json!(s.top_p);
        }

        let url = format!("{}/v1/chat/completions", self.api_base.trim_end_matches('/'));
        if debug {
            eprintln!(
                "debug[openai]: HTTP POST {} body:\n{}",
                url,
                serde_json::to_string_pretty(&body)?
            );
        }

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .timeout(Duration::from_secs(self.timeout_secs))
            .json(&body)
            .send()
            .await
            .context("openai request failed")?;

        let status = resp.status();
        let text = resp.text().await.context("openai read body failed")?;

        if debug {
            eprintln!("debug[openai]: raw status: {}", status);
            eprintln!("debug[openai]: raw response:\n{}", &text);
        }

        if !status.is_success() {
            return Err(anyhow!("OpenAI API error ({}): {}", status, text));
        }

        // Minimal structs to parse the chat response
        #[derive(Deserialize)]
        struct ChatMessage {
            #[serde(default)]
            content: Option<String>,
        }
        #[derive(Deserialize)]
        struct Choice {
            message: ChatMessage,
        }
        #[derive(Deserialize)]
        struct ChatResponse {
            choices: Vec<Choice>,
        }

        let parsed: ChatResponse = serde_json::from_str(&text)
            .map_err(|e| anyhow!("Failed to parse OpenAI response: {e}\nRaw: {text}"))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| anyhow!("openai: empty content"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::{calendar_schema, ChatMessage as Turn};

    #[test]
    fn strict_schema_closes_every_object() {
        let s = to_strict_schema(&calendar_schema());
        assert_eq!(s["additionalProperties"], false);
        assert_eq!(s["properties"]["contentPlan"]["items"]["additionalProperties"], false);
        assert!(s["properties"]["contentPlan"].get("additionalProperties").is_none());
    }

    #[test]
    fn model_turns_become_assistant_messages() {
        let req = ModelRequest {
            stage: "refine".into(),
            system: Some("sys".into()),
            turns: vec![Turn::user("prompt"), Turn::model("{}"), Turn::user("shorter")],
            schema: calendar_schema(),
            sampling: None,
        };
        let roles: Vec<String> = build_messages(&req)
            .iter()
            .map(|m| m["role"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(roles, vec!["system", "user", "assistant", "user"]);
    }
}
