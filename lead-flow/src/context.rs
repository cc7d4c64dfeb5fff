use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{RwLock, broadcast};
use tracing::warn;

use crate::{
    lead::{LeadField, LeadInfo},
    message::Message,
    section::Section,
    stage::ConversationStage,
};

const EVENT_BUFFER: usize = 64;

#[derive(Debug, Default)]
struct SessionState {
    stage: ConversationStage,
    lead: LeadInfo,
    transcript: Vec<Message>,
    section: Section,
    user_input: Option<String>,
}

/// Session state shared between the dialogue tasks and the reply timers
#[derive(Clone, Debug)]
pub struct Context {
    state: Arc<RwLock<SessionState>>,
    events: broadcast::Sender<Message>,
}

impl Context {
    pub fn new() -> Self {
        Self::with_section(Section::default())
    }

    pub fn with_section(section: Section) -> Self {
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        let state = SessionState {
            section,
            ..SessionState::default()
        };
        Self {
            state: Arc::new(RwLock::new(state)),
            events,
        }
    }

    pub async fn stage(&self) -> ConversationStage {
        self.state.read().await.stage
    }

    pub(crate) async fn set_stage(&self, stage: ConversationStage) {
        self.state.write().await.stage = stage;
    }

    pub async fn lead(&self) -> LeadInfo {
        self.state.read().await.lead.clone()
    }

    /// Record a lead field. Out-of-order or repeated writes are dropped.
    pub async fn record_lead(&self, field: LeadField, value: impl Into<String>) -> bool {
        let recorded = self.state.write().await.lead.record(field, value);
        if !recorded {
            warn!(%field, "lead field not recorded: already set or out of order");
        }
        recorded
    }

    pub async fn section(&self) -> Section {
        self.state.read().await.section
    }

    pub(crate) async fn set_section(&self, section: Section) {
        self.state.write().await.section = section;
    }

    /// The utterance of the turn being executed, if any
    pub async fn user_input(&self) -> Option<String> {
        self.state.read().await.user_input.clone()
    }

    pub(crate) async fn set_user_input(&self, input: Option<String>) {
        self.state.write().await.user_input = input;
    }

    /// Append to the transcript and notify subscribers.
    pub async fn push_message(&self, message: Message) {
        self.state.write().await.transcript.push(message.clone());
        // nobody listening is fine
        let _ = self.events.send(message);
    }

    pub async fn transcript(&self) -> Vec<Message> {
        self.state.read().await.transcript.clone()
    }

    pub async fn transcript_len(&self) -> usize {
        self.state.read().await.transcript.len()
    }

    /// Messages appended from now on
    pub fn subscribe(&self) -> broadcast::Receiver<Message> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> ContextSnapshot {
        let state = self.state.read().await;
        ContextSnapshot {
            stage: state.stage,
            lead: state.lead.clone(),
            section: state.section,
            transcript: state.transcript.clone(),
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything the presentation layer needs to draw the widget
#[derive(Debug, Clone, Serialize)]
pub struct ContextSnapshot {
    pub stage: ConversationStage,
    pub lead: LeadInfo,
    pub section: Section,
    pub transcript: Vec<Message>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_transcript_is_append_only_and_broadcast() {
        let context = Context::new();
        let mut events = context.subscribe();

        context.push_message(Message::user("Olá")).await;
        context.push_message(Message::assistant("Oi!")).await;

        let transcript = context.transcript().await;
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript[0].text, "Olá");
        assert_eq!(transcript[1].text, "Oi!");

        assert_eq!(events.recv().await.unwrap().text, "Olá");
        assert_eq!(events.recv().await.unwrap().text, "Oi!");
    }

    #[tokio::test]
    async fn test_record_lead_through_context() {
        let context = Context::with_section(Section::Lots);
        assert_eq!(context.section().await, Section::Lots);

        assert!(!context.record_lead(LeadField::Email, "maria@ex.com").await);
        assert!(context.record_lead(LeadField::Name, "Maria").await);
        assert_eq!(context.lead().await.name.as_deref(), Some("Maria"));
    }
}
