use async_trait::async_trait;
use tracing::info;

use crate::{
    context::Context,
    error::Result,
    stage::ConversationStage,
    task::{NextAction, Task, TaskResult},
};

/// Opens the conversation and asks for the visitor's name
pub struct WelcomeTask {
    prompt: String,
}

impl WelcomeTask {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
        }
    }
}

#[async_trait]
impl Task for WelcomeTask {
    fn stage(&self) -> ConversationStage {
        ConversationStage::Initial
    }

    async fn run(&self, _context: Context) -> Result<TaskResult> {
        info!("running task: {}", self.stage());
        Ok(TaskResult::new(Some(self.prompt.clone()), NextAction::Continue))
    }
}
