use serde_json::Value;
use std::sync::Arc;

use crate::errors::{PlannerError, PlannerResult};
use crate::provider::DynProvider;
use crate::transcript::Transcript;
use crate::wire::{Artifact, ChatMessage, GenerationMode, ModelRequest, Sampling};

/// Decode the model's text into the artifact for `mode`.
///
/// Non-JSON text is a `Generation` error. JSON without the expected top-level
/// key, or with fields of the wrong type, is a `Schema` error: the provider's
/// schema enforcement is not taken on trust.
pub fn parse_artifact(mode: GenerationMode, text: &str) -> PlannerResult<Artifact> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| PlannerError::Generation(format!("response was not valid JSON: {e}")))?;
    let key = mode.payload_key();
    if value.get(key).is_none() {
        return Err(PlannerError::Schema(format!("missing top-level `{key}`")));
    }
    Artifact::from_payload(mode, value).map_err(|e| PlannerError::Schema(e.to_string()))
}

/// One-shot structured generation against the configured provider.
pub struct GenerationClient {
    provider: DynProvider,
    sampling: Sampling,
    debug: bool,
    transcript: Option<Arc<Transcript>>,
}

impl GenerationClient {
    pub fn new(provider: DynProvider, sampling: Sampling, debug: bool) -> Self {
        Self { provider, sampling, debug, transcript: None }
    }

    pub fn with_transcript(mut self, transcript: Arc<Transcript>) -> Self {
        self.transcript = Some(transcript);
        self
    }

    pub fn provider(&self) -> &DynProvider {
        &self.provider
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    pub fn transcript(&self) -> Option<&Transcript> {
        self.transcript.as_deref()
    }

    pub fn request(&self, mode: GenerationMode, prompt: &str) -> ModelRequest {
        let stage = match mode {
            GenerationMode::Calendar => "generate.calendar",
            GenerationMode::Script => "generate.script",
        };
        ModelRequest {
            stage: stage.into(),
            system: None,
            turns: vec![ChatMessage::user(prompt)],
            schema: mode.response_schema(),
            sampling: Some(self.sampling),
        }
    }

    /// No retry and no partial result: any failure is the whole answer.
    pub async fn generate(&self, mode: GenerationMode, prompt: &str) -> PlannerResult<Artifact> {
        let req = self.request(mode, prompt);
        let text = self.provider.send(&req, self.debug).await.map_err(|e| {
            log::error!("{} call failed: {e:#}", req.stage);
            PlannerError::Generation(format!("{e:#}"))
        })?;
        if let Some(t) = &self.transcript {
            t.record(&req.stage, &req, &text);
        }
        parse_artifact(mode, &text).map_err(|e| {
            log::error!("{} returned an unusable payload: {e}", req.stage);
            e
        })
    }
}
