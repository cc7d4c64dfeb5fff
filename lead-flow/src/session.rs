use std::{
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use rand::{SeedableRng, rngs::StdRng};
use serde::Serialize;
use tokio::time::Instant;
use tracing::{Instrument, Span, debug, info, info_span};
use uuid::Uuid;

use crate::{
    config::{AssistantConfig, TimingConfig},
    context::{Context, ContextSnapshot},
    error::{FlowError, Result},
    graph::Graph,
    message::Message,
    section::Section,
    selector::ResponseSelector,
    stage::ConversationStage,
    scheduler::ReplyScheduler,
    tasks::lead_capture_graph,
    tracker::SectionChange,
};

/// What happened to a submitted utterance
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Empty or whitespace only; nothing changed
    Ignored,
    Accepted {
        from: ConversationStage,
        to: ConversationStage,
        /// Delay before the assistant's answer shows up
        reply_in: Option<Duration>,
    },
}

impl TurnOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, TurnOutcome::Accepted { .. })
    }
}

/// One visitor's conversation with the assistant, from widget open to page reload
pub struct Session {
    id: String,
    context: Context,
    graph: Arc<Graph>,
    selector: Arc<ResponseSelector>,
    scheduler: ReplyScheduler,
    timing: TimingConfig,
    jitter: Mutex<StdRng>,
    last_nudge: Mutex<Option<Instant>>,
    span: Span,
}

impl Session {
    pub fn new(config: &AssistantConfig, section: Section) -> Result<Self> {
        config.validate()?;
        let selector = Arc::new(ResponseSelector::with_seed(&config.replies, config.seed));
        let graph = Arc::new(lead_capture_graph(config, selector.clone())?);
        // separate stream so delay jitter does not shift reply selection
        let jitter = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(1)),
            None => StdRng::from_os_rng(),
        };
        Ok(Self::with_parts(
            graph,
            selector,
            config.timing.clone(),
            jitter,
            section,
        ))
    }

    pub fn with_parts(
        graph: Arc<Graph>,
        selector: Arc<ResponseSelector>,
        timing: TimingConfig,
        jitter: StdRng,
        section: Section,
    ) -> Self {
        let id = Uuid::new_v4().to_string();
        let span = info_span!("session", session_id = %id);
        Self {
            id,
            context: Context::with_section(section),
            graph,
            selector,
            scheduler: ReplyScheduler::new(),
            timing,
            jitter: Mutex::new(jitter),
            last_nudge: Mutex::new(None),
            span,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn selector(&self) -> &ResponseSelector {
        &self.selector
    }

    /// Greet the visitor if the conversation has not started yet.
    ///
    /// Returns `true` when the welcome prompt was scheduled.
    pub async fn start(&self) -> Result<bool> {
        self.ensure_live()?;
        self.greet().instrument(self.span.clone()).await
    }

    async fn greet(&self) -> Result<bool> {
        if self.context.stage().await != ConversationStage::Initial
            || self.context.transcript_len().await > 0
        {
            return Ok(false);
        }

        self.context.set_user_input(None).await;
        let result = self.graph.execute_session(&self.context).await?;
        if let Some(text) = result.response {
            self.deliver("welcome", self.timing.welcome_delay(), text);
        }
        Ok(true)
    }

    /// Handle one utterance typed by the visitor.
    ///
    /// The user message is appended right away and the stage moves immediately; the
    /// assistant's answer is delivered after the typing delay.
    pub async fn submit(&self, utterance: &str) -> Result<TurnOutcome> {
        self.ensure_live()?;
        self.take_turn(utterance).instrument(self.span.clone()).await
    }

    async fn take_turn(&self, utterance: &str) -> Result<TurnOutcome> {
        if utterance.trim().is_empty() {
            debug!("ignoring empty utterance");
            return Ok(TurnOutcome::Ignored);
        }

        self.context.set_user_input(Some(utterance.to_string())).await;
        let result = self.graph.execute_session(&self.context).await;
        self.context.set_user_input(None).await;
        // a failed turn leaves the transcript untouched
        let result = result?;
        self.context.push_message(Message::user(utterance)).await;

        let reply_in = match result.response {
            Some(text) => {
                let delay = {
                    let mut rng = self.jitter.lock().unwrap_or_else(PoisonError::into_inner);
                    self.timing.reply_delay(&mut *rng)
                };
                self.deliver("reply", delay, text);
                Some(delay)
            }
            None => None,
        };

        Ok(TurnOutcome::Accepted {
            from: result.from,
            to: result.to,
            reply_in,
        })
    }

    /// Record the new section and, once the lead is captured, schedule a contextual
    /// nudge for it. Returns `true` when a nudge was scheduled.
    pub async fn on_section_change(&self, change: SectionChange) -> bool {
        self.nudge(change).instrument(self.span.clone()).await
    }

    async fn nudge(&self, change: SectionChange) -> bool {
        self.context.set_section(change.to).await;
        if self.scheduler.is_cancelled() || !self.context.stage().await.is_steady() {
            return false;
        }

        let now = Instant::now();
        let mut last = self.last_nudge.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = *last {
            if now.duration_since(previous) < self.timing.nudge_cooldown() {
                debug!(section = %change.to, "nudge skipped, cooling down");
                return false;
            }
        }

        match self.selector.nudge(change.to) {
            Some(text) => {
                // only a nudge actually sent starts the cooldown
                *last = Some(now);
                info!(section = %change.to, "scheduling contextual nudge");
                self.deliver("nudge", self.timing.nudge_delay(), text);
                true
            }
            None => false,
        }
    }

    fn deliver(&self, label: &'static str, delay: Duration, text: String) {
        let context = self.context.clone();
        self.scheduler.schedule(label, delay, async move {
            context.push_message(Message::assistant(text)).await;
        });
    }

    fn ensure_live(&self) -> Result<()> {
        if self.scheduler.is_cancelled() {
            return Err(FlowError::SessionClosed(self.id.clone()));
        }
        Ok(())
    }

    /// The assistant is "typing" while any delivery is pending
    pub fn is_typing(&self) -> bool {
        self.scheduler.pending() > 0
    }

    /// Wait for every scheduled reply and nudge to land
    pub async fn wait_idle(&self) {
        self.scheduler.wait_idle().await;
    }

    /// End the session. Pending replies and nudges are cancelled.
    pub fn teardown(&self) {
        let _enter = self.span.enter();
        info!("session torn down");
        self.scheduler.cancel_all();
    }

    pub fn is_live(&self) -> bool {
        !self.scheduler.is_cancelled()
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            id: self.id.clone(),
            typing: self.is_typing(),
            state: self.context.snapshot().await,
        }
    }
}

/// Context snapshot plus session-level flags
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub id: String,
    pub typing: bool,
    #[serde(flatten)]
    pub state: ContextSnapshot,
}
