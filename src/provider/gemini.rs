use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use super::Provider;
use crate::wire::{ChatRole, ModelRequest};

pub struct GeminiProvider {
    model: String,
    api_key: String,
    api_base: String,
    client: Client,
    timeout: Duration,
}

impl GeminiProvider {
    pub fn new(model: String, api_key: String, api_base: String, timeout_secs: u64) -> Self {
        Self {
            model,
            api_key,
            api_base,
            client: Client::new(),
            timeout: Duration::from_secs(timeout_secs),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<SystemInstruction<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct SystemInstruction<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<PartOut>,
}

#[derive(Deserialize)]
struct PartOut {
    #[serde(default)]
    text: String,
}

/// Gemini's schema dialect spells types in upper case (`OBJECT`, `STRING`, ...).
pub fn to_gemini_schema(schema: &Value) -> Value {
    match schema {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| {
                    let v = match (k.as_str(), v) {
                        ("type", Value::String(t)) => Value::String(t.to_uppercase()),
                        _ => to_gemini_schema(v),
                    };
                    (k.clone(), v)
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(to_gemini_schema).collect()),
        other => other.clone(),
    }
}

fn role_name(role: ChatRole) -> &'static str {
    match role {
        ChatRole::User => "user",
        ChatRole::Model => "model",
    }
}

#[async_trait]
impl Provider for GeminiProvider {
    async fn send(&self, req: &ModelRequest, debug: bool) -> Result<String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_base.trim_end_matches('/'),
            self.model
        );
        let body = GenerateRequest {
            contents: req
                .turns
                .iter()
                .map(|t| Content { role: role_name(t.role), parts: vec![Part { text: &t.content }] })
                .collect(),
            system_instruction: req
                .system
                .as_deref()
                .map(|s| SystemInstruction { parts: vec![Part { text: s }] }),
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: to_gemini_schema(&req.schema),
                temperature: req.sampling.map(|s| s.temperature),
                top_p: req.sampling.map(|s| s.top_p),
            },
        };

        if debug {
            eprintln!("debug[gemini]: POST {} ({} turns)", url, req.turns.len());
        }

        let resp = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .context("gemini request failed")?;

        let status = resp.status();
        let text = resp.text().await.context("gemini read body failed")?;
        if debug {
            eprintln!("debug[gemini]: raw status: {}", status);
            eprintln!("debug[gemini]: raw body:\n{}\n", text);
        }
        if !status.is_success() {
            bail!("Gemini API error ({}): {}", status, text);
        }

        let parsed: GenerateResponse = serde_json::from_str(&text)
            .map_err(|e| anyhow!("gemini response parse error: {}", e))?;

        let content: String = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().map(|p| p.text).collect())
            .unwrap_or_default();

        if content.is_empty() {
            bail!("gemini: empty content");
        }
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn schema_types_are_uppercased_recursively() {
        let s = json!({
            "type": "object",
            "properties": { "items": { "type": "array", "items": { "type": "number", "description": "type" } } },
            "required": ["items"]
        });
        let g = to_gemini_schema(&s);
        assert_eq!(g["type"], "OBJECT");
        assert_eq!(g["properties"]["items"]["type"], "ARRAY");
        assert_eq!(g["properties"]["items"]["items"]["type"], "NUMBER");
        assert_eq!(g["properties"]["items"]["items"]["description"], "type");
        assert_eq!(g["required"], json!(["items"]));
    }
}
