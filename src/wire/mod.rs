use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};

/// ========================================
/// Domain data and model wire shapes
/// ========================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationMode {
    Calendar,
    Script,
}

impl GenerationMode {
    /// Top-level key the model must answer under.
    pub fn payload_key(self) -> &'static str {
        match self {
            GenerationMode::Calendar => "contentPlan",
            GenerationMode::Script => "script",
        }
    }

    pub fn response_schema(self) -> Value {
        match self {
            GenerationMode::Calendar => calendar_schema(),
            GenerationMode::Script => script_schema(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SocialLinks {
    pub instagram: String,
    pub linked_in: String,
    pub x: String,
    pub facebook: String,
    pub youtube: String,
    pub pinterest: String,
}

/// One calendar day's content unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentEntry {
    #[serde(deserialize_with = "integral_day")]
    pub day: u32,
    pub platform: String,
    pub content_type: String,
    pub idea: String,
    pub caption: String,
    pub hashtags: String,
}

// Schema-constrained decoders emit NUMBER, so `3.0` must be accepted as day 3.
fn integral_day<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
    let n = serde_json::Number::deserialize(d)?;
    if let Some(v) = n.as_u64() {
        return u32::try_from(v).map_err(|_| D::Error::custom(format!("day {v} out of range")));
    }
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f >= 0.0 && f <= u32::MAX as f64 => Ok(f as u32),
        _ => Err(D::Error::custom(format!("day must be a non-negative integer, got {n}"))),
    }
}

/// Entries in display order: ascending by day, ties keep their input order.
pub fn sorted_by_day(entries: &[ContentEntry]) -> Vec<ContentEntry> {
    let mut out = entries.to_vec();
    out.sort_by_key(|e| e.day);
    out
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarPayload {
    #[serde(rename = "contentPlan")]
    pub content_plan: Vec<ContentEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptPayload {
    pub script: String,
}

/// The artifact currently on display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Artifact {
    Calendar(Vec<ContentEntry>),
    Script(String),
}

impl Artifact {
    pub fn mode(&self) -> GenerationMode {
        match self {
            Artifact::Calendar(_) => GenerationMode::Calendar,
            Artifact::Script(_) => GenerationMode::Script,
        }
    }

    /// Re-serialise as the JSON object the model is expected to produce.
    pub fn to_payload_json(&self) -> serde_json::Result<String> {
        match self {
            Artifact::Calendar(entries) => serde_json::to_string(&CalendarPayload {
                content_plan: entries.clone(),
            }),
            Artifact::Script(script) => serde_json::to_string(&ScriptPayload {
                script: script.clone(),
            }),
        }
    }

    /// Decode a JSON value into the artifact for `mode`, checking field presence and types.
    pub fn from_payload(mode: GenerationMode, value: Value) -> serde_json::Result<Self> {
        match mode {
            GenerationMode::Calendar => {
                let p: CalendarPayload = serde_json::from_value(value)?;
                Ok(Artifact::Calendar(p.content_plan))
            }
            GenerationMode::Script => {
                let p: ScriptPayload = serde_json::from_value(value)?;
                if p.script.is_empty() {
                    return Err(serde_json::Error::custom("`script` is empty"));
                }
                Ok(Artifact::Script(p.script))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: ChatRole::User, content: content.into() }
    }

    pub fn model(content: impl Into<String>) -> Self {
        Self { role: ChatRole::Model, content: content.into() }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompanyProfile {
    pub id: String,
    pub name: String,
    pub niche: String,
    pub social_links: SocialLinks,
    pub previous_content_text: String,
    pub reference_text: String,
    pub style_text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sampling {
    pub temperature: f32,
    pub top_p: f32,
}

/// Provider-neutral request: an optional system instruction, the ordered turns,
/// and the JSON schema the reply must satisfy.
#[derive(Debug, Clone, Serialize)]
pub struct ModelRequest {
    pub stage: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    pub turns: Vec<ChatMessage>,
    pub schema: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sampling: Option<Sampling>,
}

pub fn calendar_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "contentPlan": {
                "type": "array",
                "description": "A 30-day content plan.",
                "items": {
                    "type": "object",
                    "properties": {
                        "day": { "type": "number", "description": "Day of the month (1-30)." },
                        "platform": { "type": "string", "description": "Target social media platform (e.g., Instagram, LinkedIn, X)." },
                        "contentType": { "type": "string", "description": "Type of content (e.g., Reel, Post, Carousel)." },
                        "idea": { "type": "string", "description": "The core idea, hook, or title for the content." },
                        "caption": { "type": "string", "description": "A detailed, engaging caption written in the user's voice." },
                        "hashtags": { "type": "string", "description": "Relevant hashtags separated by spaces." }
                    },
                    "required": ["day", "platform", "contentType", "idea", "caption", "hashtags"]
                }
            }
        },
        "required": ["contentPlan"]
    })
}

pub fn script_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "script": {
                "type": "string",
                "description": "A complete, ready-to-use video script with scene descriptions, dialogue and calls to action."
            }
        },
        "required": ["script"]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(day: u32, idea: &str) -> ContentEntry {
        ContentEntry {
            day,
            platform: "Instagram".into(),
            content_type: "Post".into(),
            idea: idea.into(),
            caption: "c".into(),
            hashtags: "#a".into(),
        }
    }

    #[test]
    fn display_order_is_ascending_by_day() {
        let input = vec![entry(3, "c"), entry(1, "a"), entry(2, "b")];
        let days: Vec<u32> = sorted_by_day(&input).iter().map(|e| e.day).collect();
        assert_eq!(days, vec![1, 2, 3]);
    }

    #[test]
    fn duplicate_days_keep_input_order() {
        let input = vec![entry(2, "first"), entry(1, "x"), entry(2, "second")];
        let ideas: Vec<String> = sorted_by_day(&input).into_iter().map(|e| e.idea).collect();
        assert_eq!(ideas, vec!["x", "first", "second"]);
    }

    #[test]
    fn day_accepts_integral_float_and_rejects_fraction() {
        let ok = json!({"day": 4.0, "platform": "X", "contentType": "Post", "idea": "i", "caption": "c", "hashtags": "#h"});
        let e: ContentEntry = serde_json::from_value(ok).unwrap();
        assert_eq!(e.day, 4);

        let bad = json!({"day": 4.5, "platform": "X", "contentType": "Post", "idea": "i", "caption": "c", "hashtags": "#h"});
        assert!(serde_json::from_value::<ContentEntry>(bad).is_err());

        let text = json!({"day": "4", "platform": "X", "contentType": "Post", "idea": "i", "caption": "c", "hashtags": "#h"});
        assert!(serde_json::from_value::<ContentEntry>(text).is_err());
    }

    #[test]
    fn payload_json_uses_model_key_names() {
        let a = Artifact::Calendar(vec![entry(1, "Intro")]);
        let v: Value = serde_json::from_str(&a.to_payload_json().unwrap()).unwrap();
        assert_eq!(v["contentPlan"][0]["contentType"], "Post");
        assert_eq!(v["contentPlan"][0]["day"], 1);

        let s = Artifact::Script("VO: hi".into());
        assert_eq!(s.to_payload_json().unwrap(), r#"{"script":"VO: hi"}"#);
    }

    #[test]
    fn social_links_serialise_in_fixed_key_order() {
        let links = SocialLinks { linked_in: "in/me".into(), ..Default::default() };
        let s = serde_json::to_string(&links).unwrap();
        assert_eq!(
            s,
            r#"{"instagram":"","linkedIn":"in/me","x":"","facebook":"","youtube":"","pinterest":""}"#
        );
    }
}
