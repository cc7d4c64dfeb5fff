// Lead-capture dialogue tasks
pub mod collect_contact;
pub mod free_form;
pub mod welcome;

use std::sync::Arc;

use crate::{
    config::AssistantConfig,
    error::Result,
    graph::{Graph, GraphBuilder},
    selector::ResponseSelector,
    stage::ConversationStage,
};

// Re-export task implementations
pub use collect_contact::CollectContactTask;
pub use free_form::FreeFormTask;
pub use welcome::WelcomeTask;

/// Wire the scripted dialogue: welcome, name, phone, e-mail, then free-form chat.
pub fn lead_capture_graph(
    config: &AssistantConfig,
    selector: Arc<ResponseSelector>,
) -> Result<Graph> {
    use ConversationStage::*;

    let script = &config.script;
    GraphBuilder::new("lead_capture")
        .add_task(Arc::new(WelcomeTask::new(script.welcome_for(&config.persona))))
        .add_task(Arc::new(CollectContactTask::name(script.name_reply.clone())))
        .add_task(Arc::new(CollectContactTask::phone(script.phone_reply.clone())))
        .add_task(Arc::new(CollectContactTask::email(script.email_reply.clone())))
        .add_task(Arc::new(FreeFormTask::new(selector)))
        .add_edge(Initial, AwaitingName)
        .add_edge(AwaitingName, AwaitingPhone)
        .add_edge(AwaitingPhone, AwaitingEmail)
        .add_edge(AwaitingEmail, FreeForm)
        .build()
}
