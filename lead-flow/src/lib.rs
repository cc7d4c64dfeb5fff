pub mod chart;
pub mod config;
pub mod context;
pub mod error;
pub mod graph;
pub mod lead;
pub mod message;
pub mod scheduler;
pub mod section;
pub mod selector;
pub mod session;
pub mod stage;
pub mod task;
pub mod tasks;
pub mod tracker;
pub mod validation;
pub mod widget;

// Re-export commonly used types
pub use config::AssistantConfig;
pub use context::{Context, ContextSnapshot};
pub use error::{FlowError, Result};
pub use graph::{ExecutionResult, Graph, GraphBuilder};
pub use lead::{LeadField, LeadInfo, LeadSummary};
pub use message::{Message, Sender};
pub use scheduler::ReplyScheduler;
pub use section::Section;
pub use selector::{ResponseSelector, select_reply};
pub use session::{Session, SessionSnapshot, TurnOutcome};
pub use stage::ConversationStage;
pub use task::{NextAction, Task, TaskResult};
pub use tracker::{SectionBounds, SectionChange, SectionTracker};
pub use widget::AssistantWidget;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_lead_capture_graph_walks_the_script() {
        let config = AssistantConfig::default();
        let selector = Arc::new(ResponseSelector::with_seed(&config.replies, Some(1)));
        let graph = tasks::lead_capture_graph(&config, selector).unwrap();
        let context = Context::new();

        let welcome = graph.execute_session(&context).await.unwrap();
        assert_eq!(welcome.to, ConversationStage::AwaitingName);
        assert!(welcome.response.unwrap().contains("Machado"));
        assert_eq!(context.lead().await, LeadInfo::default());

        let mut stages = Vec::new();
        for input in ["Maria", "47999998888", "maria@ex.com", "Quero saber mais"] {
            context.set_user_input(Some(input.to_string())).await;
            let result = graph.execute_session(&context).await.unwrap();
            stages.push(result.to);
        }
        assert_eq!(
            stages,
            vec![
                ConversationStage::AwaitingPhone,
                ConversationStage::AwaitingEmail,
                ConversationStage::FreeForm,
                ConversationStage::FreeForm,
            ]
        );
        assert!(context.lead().await.is_complete());
    }
}
