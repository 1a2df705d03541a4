//! Orchestration: form → aggregated inputs → prompt → first generation →
//! refinement session → reconciled follow-ups.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::context::{self, AggregatedInputs};
use crate::errors::{PlannerError, PlannerResult};
use crate::form::FormState;
use crate::generate::GenerationClient;
use crate::prompt::{self, CalendarContext, ScriptContext};
use crate::session::{reconcile, Reconciled, RefineSession, SessionState, CHAT_ERROR};
use crate::wire::{sorted_by_day, Artifact, ChatMessage, ContentEntry, GenerationMode};

pub const GENERATION_FAILED: &str = "Failed to generate content. ";

/// Everything the user currently sees, plus the session behind it.
#[derive(Debug, Clone, Default)]
pub struct Workspace {
    pub artifact: Option<Artifact>,
    pub chat: Vec<ChatMessage>,
    pub error: Option<String>,
    session: SessionState,
    generation: u64,
}

impl Workspace {
    pub fn session(&self) -> &SessionState {
        &self.session
    }

    /// Calendar rows in display order.
    pub fn calendar(&self) -> Option<Vec<ContentEntry>> {
        match &self.artifact {
            Some(Artifact::Calendar(entries)) => Some(sorted_by_day(entries)),
            _ => None,
        }
    }

    pub fn script(&self) -> Option<&str> {
        match &self.artifact {
            Some(Artifact::Script(s)) => Some(s),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefineOutcome {
    /// The displayed artifact was replaced.
    Replaced,
    /// The reply was shown as a chat message.
    Conversation,
    /// A newer generation started while the call was in flight; the reply was dropped.
    Stale,
}

/// Holds a busy flag for its lifetime and clears it on every exit path.
struct BusyGuard<'a>(&'a AtomicBool);

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> PlannerResult<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| BusyGuard(flag))
            .map_err(|_| PlannerError::Busy)
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub fn build_prompt(form: &FormState, inputs: &AggregatedInputs) -> String {
    match form.mode {
        GenerationMode::Calendar => prompt::calendar_prompt(&CalendarContext {
            niche: &form.niche,
            social_links: &form.social_links,
            previous_content: &inputs.previous_content,
            reference: &inputs.reference,
            style: &inputs.style,
        }),
        GenerationMode::Script => prompt::script_prompt(&ScriptContext {
            niche: &form.niche,
            video_idea: &form.video_idea,
            video_description: &form.video_description,
            video_audience: &form.video_audience,
            reference: &inputs.reference,
            style: &inputs.style,
        }),
    }
}

pub struct Planner {
    client: GenerationClient,
    workspace: Mutex<Workspace>,
    generating: AtomicBool,
    refining: AtomicBool,
}

impl Planner {
    pub fn new(client: GenerationClient) -> Self {
        Self {
            client,
            workspace: Mutex::new(Workspace::default()),
            generating: AtomicBool::new(false),
            refining: AtomicBool::new(false),
        }
    }

    pub fn snapshot(&self) -> Workspace {
        self.workspace.lock().clone()
    }

    pub fn is_busy(&self) -> bool {
        self.generating.load(Ordering::Acquire) || self.refining.load(Ordering::Acquire)
    }

    /// Top-level generation. Discards the previous artifact, chat and session
    /// before anything else happens.
    pub async fn generate(&self, form: &FormState) -> PlannerResult<Artifact> {
        if let Err(e) = form.validate() {
            log::warn!("generation refused: {e}");
            self.workspace.lock().error = Some(e.to_string());
            return Err(e);
        }
        let _busy = BusyGuard::acquire(&self.generating)?;

        {
            let mut ws = self.workspace.lock();
            ws.artifact = None;
            ws.chat.clear();
            ws.error = None;
            ws.session = SessionState::Uninitialized;
            ws.generation += 1;
        }

        let result = match self.run_generation(form).await {
            Ok((prompt_text, artifact)) => {
                RefineSession::open(&prompt_text, &artifact).map(|session| (session, artifact))
            }
            Err(e) => Err(e),
        };

        let mut ws = self.workspace.lock();
        match result {
            Ok((session, artifact)) => {
                ws.artifact = Some(artifact.clone());
                ws.session = SessionState::Active(session);
                Ok(artifact)
            }
            Err(e) => {
                log::error!("generation failed: {e}");
                ws.error = Some(format!("{GENERATION_FAILED}{e}"));
                Err(e)
            }
        }
    }

    async fn run_generation(&self, form: &FormState) -> PlannerResult<(String, Artifact)> {
        let inputs = context::aggregate(form).await?;
        let prompt_text = build_prompt(form, &inputs);
        let artifact = self.client.generate(form.mode, &prompt_text).await?;
        Ok((prompt_text, artifact))
    }

    /// Send one follow-up through the active session.
    ///
    /// Only one refine may be in flight: a second call is rejected with
    /// `Busy` before anything is appended. Otherwise the user's message is
    /// appended immediately and is always followed by exactly one model
    /// message, unless a newer generation superseded the session meanwhile.
    pub async fn refine(&self, message: &str) -> PlannerResult<RefineOutcome> {
        if message.trim().is_empty() {
            return Err(PlannerError::Input("message is empty".into()));
        }
        let _busy = BusyGuard::acquire(&self.refining)?;

        let (req, mode, generation) = {
            let mut ws = self.workspace.lock();
            ws.chat.push(ChatMessage::user(message));
            let active = ws.session.active().map(|s| (s.request(message), s.mode()));
            match active {
                Some((req, mode)) => (req, mode, ws.generation),
                None => {
                    log::warn!("refine called without an active session");
                    ws.chat.push(ChatMessage::model(CHAT_ERROR));
                    return Err(PlannerError::NoSession);
                }
            }
        };

        let result = self.client.provider().send(&req, self.client.debug()).await;
        if let (Ok(reply), Some(t)) = (&result, self.client.transcript()) {
            t.record(&req.stage, &req, reply);
        }

        let mut ws = self.workspace.lock();
        if ws.generation != generation {
            log::warn!("dropping refine reply from superseded generation {generation}");
            return Ok(RefineOutcome::Stale);
        }
        let reply = match result {
            Ok(reply) => reply,
            Err(e) => {
                log::error!("refine call failed: {e:#}");
                ws.chat.push(ChatMessage::model(CHAT_ERROR));
                return Err(PlannerError::Chat(format!("{e:#}")));
            }
        };

        if let Some(session) = ws.session.active_mut() {
            session.commit(message, &reply);
        }
        match reconcile(mode, &reply) {
            Reconciled::Replace { artifact, message } => {
                ws.artifact = Some(artifact);
                ws.chat.push(ChatMessage::model(message));
                Ok(RefineOutcome::Replaced)
            }
            Reconciled::Conversation(text) => {
                ws.chat.push(ChatMessage::model(text));
                Ok(RefineOutcome::Conversation)
            }
        }
    }
}
