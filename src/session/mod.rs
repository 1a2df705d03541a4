//! Refinement sessions.
//!
//! A session is bound to one generation mode and one response schema. The
//! provider APIs are stateless, so the session owns the authoritative turn
//! history: it is seeded with the original prompt and the first result, and a
//! follow-up exchange is only committed once the provider has answered.

use serde_json::Value;

use crate::errors::{PlannerError, PlannerResult};
use crate::prompt;
use crate::wire::{Artifact, ChatMessage, GenerationMode, ModelRequest};

pub const CALENDAR_UPDATED: &str =
    "I've updated the content plan based on your feedback. The changes are reflected in the table above.";
pub const SCRIPT_UPDATED: &str =
    "I've updated the video script based on your feedback. The changes are reflected above.";
pub const CHAT_ERROR: &str = "Sorry, I encountered an error. Please try again or refine your request.";

#[derive(Debug, Clone, PartialEq)]
pub struct RefineSession {
    mode: GenerationMode,
    system: String,
    history: Vec<ChatMessage>,
}

impl RefineSession {
    pub fn open(prompt_text: &str, first: &Artifact) -> PlannerResult<Self> {
        let mode = first.mode();
        let seed = first
            .to_payload_json()
            .map_err(|e| PlannerError::Generation(format!("could not re-serialise result: {e}")))?;
        let system = match mode {
            GenerationMode::Calendar => prompt::calendar_refine_instruction(),
            GenerationMode::Script => prompt::script_refine_instruction(),
        };
        Ok(Self {
            mode,
            system,
            history: vec![ChatMessage::user(prompt_text), ChatMessage::model(seed)],
        })
    }

    pub fn mode(&self) -> GenerationMode {
        self.mode
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    /// The request for one follow-up: full history plus the new user turn.
    pub fn request(&self, message: &str) -> ModelRequest {
        let mut turns = self.history.clone();
        turns.push(ChatMessage::user(message));
        ModelRequest {
            stage: "refine".into(),
            system: Some(self.system.clone()),
            turns,
            schema: self.mode.response_schema(),
            sampling: None,
        }
    }

    pub fn commit(&mut self, message: &str, reply: &str) {
        self.history.push(ChatMessage::user(message));
        self.history.push(ChatMessage::model(reply));
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum SessionState {
    #[default]
    Uninitialized,
    Active(RefineSession),
}

impl SessionState {
    pub fn active(&self) -> Option<&RefineSession> {
        match self {
            SessionState::Active(s) => Some(s),
            SessionState::Uninitialized => None,
        }
    }

    pub fn active_mut(&mut self) -> Option<&mut RefineSession> {
        match self {
            SessionState::Active(s) => Some(s),
            SessionState::Uninitialized => None,
        }
    }
}

/// What a refine reply does to the workspace.
#[derive(Debug, Clone, PartialEq)]
pub enum Reconciled {
    /// Replace the displayed artifact wholesale and post a fixed confirmation.
    Replace { artifact: Artifact, message: &'static str },
    /// Show the reply text verbatim as a chat message.
    Conversation(String),
}

pub fn reconcile(mode: GenerationMode, reply: &str) -> Reconciled {
    let value: Value = match serde_json::from_str(reply) {
        Ok(v) => v,
        Err(_) => return Reconciled::Conversation(reply.to_string()),
    };
    if value.get(mode.payload_key()).is_none() {
        return Reconciled::Conversation(reply.to_string());
    }
    match Artifact::from_payload(mode, value) {
        Ok(artifact) => {
            let message = match mode {
                GenerationMode::Calendar => CALENDAR_UPDATED,
                GenerationMode::Script => SCRIPT_UPDATED,
            };
            Reconciled::Replace { artifact, message }
        }
        Err(e) => {
            log::warn!("refine reply had `{}` but failed validation: {e}", mode.payload_key());
            Reconciled::Conversation(reply.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::ContentEntry;

    fn entry(day: u32) -> ContentEntry {
        ContentEntry {
            day,
            platform: "Instagram".into(),
            content_type: "Reel".into(),
            idea: format!("idea {day}"),
            caption: "cap".into(),
            hashtags: "#x".into(),
        }
    }

    #[test]
    fn open_seeds_prompt_and_first_result() {
        let s = RefineSession::open("PROMPT", &Artifact::Script("VO: hi".into())).unwrap();
        assert_eq!(s.mode(), GenerationMode::Script);
        assert_eq!(
            s.history(),
            &[ChatMessage::user("PROMPT"), ChatMessage::model(r#"{"script":"VO: hi"}"#)]
        );
    }

    #[test]
    fn request_appends_message_without_committing() {
        let mut s = RefineSession::open("P", &Artifact::Calendar(vec![entry(1)])).unwrap();
        let req = s.request("make day 1 a carousel");
        assert_eq!(req.turns.len(), 3);
        assert!(req.system.as_deref().unwrap().contains("'contentPlan'"));
        assert_eq!(req.schema["required"], serde_json::json!(["contentPlan"]));
        assert_eq!(s.history().len(), 2);

        s.commit("make day 1 a carousel", "{}");
        assert_eq!(s.history().len(), 4);
        assert_eq!(s.history()[3], ChatMessage::model("{}"));
    }

    #[test]
    fn calendar_reply_replaces_wholesale() {
        let reply = r##"{"contentPlan":[{"day":2,"platform":"LinkedIn","contentType":"Post","idea":"new","caption":"c","hashtags":"#b"}]}"##;
        match reconcile(GenerationMode::Calendar, reply) {
            Reconciled::Replace { artifact: Artifact::Calendar(entries), message } => {
                assert_eq!(entries.len(), 1);
                assert_eq!(entries[0].platform, "LinkedIn");
                assert_eq!(message, CALENDAR_UPDATED);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn plain_text_is_conversation() {
        let reply = "Which days should I change?";
        assert_eq!(
            reconcile(GenerationMode::Calendar, reply),
            Reconciled::Conversation(reply.to_string())
        );
    }

    #[test]
    fn valid_json_without_expected_key_is_shown_raw() {
        let reply = r#"{"script":"VO: hello"}"#;
        assert_eq!(
            reconcile(GenerationMode::Calendar, reply),
            Reconciled::Conversation(reply.to_string())
        );
        let wrong_type = r#"{"contentPlan":"not an array"}"#;
        assert_eq!(
            reconcile(GenerationMode::Calendar, wrong_type),
            Reconciled::Conversation(wrong_type.to_string())
        );
    }

    #[test]
    fn script_reply_replaces_script() {
        let r = reconcile(GenerationMode::Script, r#"{"script":"VISUAL: kitchen"}"#);
        assert_eq!(
            r,
            Reconciled::Replace { artifact: Artifact::Script("VISUAL: kitchen".into()), message: SCRIPT_UPDATED }
        );
    }

    #[test]
    fn empty_script_reply_is_shown_raw() {
        let reply = r#"{"script":""}"#;
        assert_eq!(
            reconcile(GenerationMode::Script, reply),
            Reconciled::Conversation(reply.to_string())
        );
    }
}
