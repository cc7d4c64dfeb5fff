use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::{
    context::Context,
    error::{FlowError, Result},
    selector::ResponseSelector,
    stage::ConversationStage,
    task::{NextAction, Task, TaskResult},
};

/// Steady state once the lead is captured: answers with a canned reply
pub struct FreeFormTask {
    selector: Arc<ResponseSelector>,
}

impl FreeFormTask {
    pub fn new(selector: Arc<ResponseSelector>) -> Self {
        Self { selector }
    }
}

#[async_trait]
impl Task for FreeFormTask {
    fn stage(&self) -> ConversationStage {
        ConversationStage::FreeForm
    }

    async fn run(&self, _context: Context) -> Result<TaskResult> {
        info!("running task: {}", self.stage());
        let reply = self
            .selector
            .reply()
            .ok_or_else(|| FlowError::TaskExecutionFailed("reply pool is empty".to_string()))?;

        Ok(TaskResult::new(Some(reply), NextAction::WaitForInput))
    }
}
