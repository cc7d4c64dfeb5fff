use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{context::Context, error::Result, stage::ConversationStage};

/// Result of a task execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskResult {
    /// Assistant message to deliver
    pub response: Option<String>,
    /// Next action to take
    pub next_action: NextAction,
    /// Stage of the task that produced this result; filled in by the graph
    #[serde(skip)]
    pub stage: ConversationStage,
}

impl TaskResult {
    pub fn new(response: Option<String>, next_action: NextAction) -> Self {
        Self {
            response,
            next_action,
            stage: ConversationStage::default(),
        }
    }
}

/// Defines what should happen after a task completes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NextAction {
    /// Move the conversation along the outgoing edge
    Continue,
    /// Stay on this stage for the next turn
    WaitForInput,
}

/// One stage of the scripted dialogue
#[async_trait]
pub trait Task: Send + Sync {
    /// Stage this task answers for
    fn stage(&self) -> ConversationStage;

    /// Execute the task with the given context
    async fn run(&self, context: Context) -> Result<TaskResult>;
}
