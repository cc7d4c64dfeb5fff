//! The floating chat widget: at most one session per page load.
//!
//! Opening the widget creates the session and greets the visitor, closing it only hides
//! the conversation, and reloading the page throws everything away.

use std::sync::Arc;

use tracing::info;

use crate::{
    config::AssistantConfig,
    error::{FlowError, Result},
    session::{Session, TurnOutcome},
    tracker::{SectionChange, SectionTracker},
};

pub struct AssistantWidget {
    config: Arc<AssistantConfig>,
    tracker: SectionTracker,
    session: Option<Session>,
    open: bool,
}

impl AssistantWidget {
    pub fn new(config: AssistantConfig) -> Result<Self> {
        config.validate()?;
        let tracker = SectionTracker::from_layout(&config.layout);
        Ok(Self {
            config: Arc::new(config),
            tracker,
            session: None,
            open: false,
        })
    }

    pub fn config(&self) -> &AssistantConfig {
        &self.config
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn tracker(&self) -> &SectionTracker {
        &self.tracker
    }

    /// Show the widget, starting a session on first open
    pub async fn open(&mut self) -> Result<&Session> {
        let session = match self.session.take() {
            Some(session) => session,
            None => {
                let session = Session::new(&self.config, self.tracker.current())?;
                info!(session_id = session.id(), "session created");
                session
            }
        };
        // no-op unless the transcript is still empty
        let started = session.start().await;
        let session = self.session.insert(session);
        started?;

        self.open = true;
        Ok(session)
    }

    /// Hide the widget. Replies still in flight keep landing in the transcript.
    pub fn close(&mut self) {
        self.open = false;
    }

    pub async fn toggle(&mut self) -> Result<bool> {
        if self.open {
            self.close();
        } else {
            self.open().await?;
        }
        Ok(self.open)
    }

    /// Forward a typed message. Only possible while the widget is open.
    pub async fn submit(&self, utterance: &str) -> Result<TurnOutcome> {
        match (&self.session, self.open) {
            (Some(session), true) => session.submit(utterance).await,
            _ => Err(FlowError::WidgetClosed),
        }
    }

    /// Feed a scroll offset from the page
    pub async fn scroll(&mut self, offset: f64) -> Option<SectionChange> {
        let change = self.tracker.observe(offset)?;
        if let Some(session) = &self.session {
            session.on_section_change(change).await;
        }
        Some(change)
    }

    /// Page reload: the session is torn down and its pending replies cancelled.
    pub fn reload(&mut self) {
        if let Some(session) = self.session.take() {
            session.teardown();
        }
        self.tracker = SectionTracker::from_layout(&self.config.layout);
        self.open = false;
        info!("widget reloaded");
    }
}
