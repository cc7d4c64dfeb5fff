use std::path::PathBuf;

use thiserror::Error;

use crate::stage::ConversationStage;

#[derive(Error, Debug)]
pub enum FlowError {
    #[error("No task registered for stage: {0}")]
    TaskNotFound(ConversationStage),

    #[error("Stage {0} already has a task")]
    DuplicateTask(ConversationStage),

    #[error("Edge {from} -> {to} would move the conversation backwards")]
    BackwardEdge {
        from: ConversationStage,
        to: ConversationStage,
    },

    #[error("Task execution failed: {0}")]
    TaskExecutionFailed(String),

    #[error("Context error: {0}")]
    ContextError(String),

    #[error("Failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Unknown page section: {0}")]
    UnknownSection(String),

    #[error("Session {0} has been torn down")]
    SessionClosed(String),

    #[error("The assistant widget is closed")]
    WidgetClosed,
}

pub type Result<T> = std::result::Result<T, FlowError>;
