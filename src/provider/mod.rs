use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::Arc;

use crate::cli::ProviderKind;
use crate::config::Config;
use crate::wire::ModelRequest;

pub mod gemini;
pub mod openai;

/// A hosted model that answers a schema-constrained request with raw text.
/// Adapters own transport and envelope decoding; JSON payload handling stays
/// with the caller.
#[async_trait]
pub trait Provider: Send + Sync {
    async fn send(&self, req: &ModelRequest, debug: bool) -> Result<String>;
}

pub type DynProvider = Arc<dyn Provider>;

pub fn make_provider(cfg: &Config) -> Result<DynProvider> {
    match cfg.provider {
        ProviderKind::Gemini => {
            let api_key = std::env::var("GEMINI_API_KEY")
                .or_else(|_| std::env::var("API_KEY"))
                .map_err(|_| anyhow!("GEMINI_API_KEY (or API_KEY) env var is not set"))?;
            Ok(Arc::new(gemini::GeminiProvider::new(
                cfg.model.clone(),
                api_key,
                cfg.gemini_api_base.clone(),
                cfg.timeout_secs,
            )))
        }
        ProviderKind::OpenAI => {
            let api_key = std::env::var("OPENAI_API_KEY")
                .map_err(|_| anyhow!("OPENAI_API_KEY env var is not set"))?;
            Ok(Arc::new(openai::OpenAIProvider::new(
                cfg.model.clone(),
                api_key,
                cfg.openai_api_base.clone(),
                cfg.timeout_secs,
            )))
        }
    }
}

/// In-memory provider that replays canned replies, for tests.
#[cfg(test)]
pub mod scripted {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::VecDeque;
    use tokio::sync::Notify;

    #[derive(Default)]
    pub struct ScriptedProvider {
        replies: Mutex<VecDeque<Result<String, String>>>,
        pub requests: Mutex<Vec<ModelRequest>>,
        gate: Option<Arc<Notify>>,
    }

    impl ScriptedProvider {
        pub fn new<I, S>(replies: I) -> Self
        where
            I: IntoIterator<Item = Result<S, S>>,
            S: Into<String>,
        {
            Self {
                replies: Mutex::new(
                    replies
                        .into_iter()
                        .map(|r| r.map(Into::into).map_err(Into::into))
                        .collect(),
                ),
                requests: Mutex::new(Vec::new()),
                gate: None,
            }
        }

        /// Every `send` waits for a `notify_one` on the gate before answering.
        pub fn gated(mut self, gate: Arc<Notify>) -> Self {
            self.gate = Some(gate);
            self
        }

        pub fn request_count(&self) -> usize {
            self.requests.lock().len()
        }
    }

    #[async_trait]
    impl Provider for ScriptedProvider {
        async fn send(&self, req: &ModelRequest, _debug: bool) -> Result<String> {
            self.requests.lock().push(req.clone());
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            let next = self.replies.lock().pop_front();
            match next {
                Some(Ok(text)) => Ok(text),
                Some(Err(e)) => Err(anyhow!(e)),
                None => Err(anyhow!("no scripted reply left")),
            }
        }
    }
}
