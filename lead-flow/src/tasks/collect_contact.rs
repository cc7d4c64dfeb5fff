use async_trait::async_trait;
use tracing::info;

use crate::{
    config::NAME_PLACEHOLDER,
    context::Context,
    error::{FlowError, Result},
    lead::LeadField,
    stage::ConversationStage,
    task::{NextAction, Task, TaskResult},
    validation::{looks_like_email, looks_like_phone},
};

/// Stores the visitor's answer as one lead field and asks the next question.
///
/// Whatever the visitor typed is accepted; there is no re-prompt for a malformed phone
/// number or e-mail address.
pub struct CollectContactTask {
    field: LeadField,
    reply: String,
}

impl CollectContactTask {
    /// `reply` may contain `{name}`, replaced with the answer
    pub fn name(reply: impl Into<String>) -> Self {
        Self {
            field: LeadField::Name,
            reply: reply.into(),
        }
    }

    pub fn phone(reply: impl Into<String>) -> Self {
        Self {
            field: LeadField::Phone,
            reply: reply.into(),
        }
    }

    pub fn email(reply: impl Into<String>) -> Self {
        Self {
            field: LeadField::Email,
            reply: reply.into(),
        }
    }

    pub fn field(&self) -> LeadField {
        self.field
    }
}

#[async_trait]
impl Task for CollectContactTask {
    fn stage(&self) -> ConversationStage {
        match self.field {
            LeadField::Name => ConversationStage::AwaitingName,
            LeadField::Phone => ConversationStage::AwaitingPhone,
            LeadField::Email => ConversationStage::AwaitingEmail,
        }
    }

    async fn run(&self, context: Context) -> Result<TaskResult> {
        info!("running task: {}", self.stage());
        let answer = context
            .user_input()
            .await
            .ok_or_else(|| FlowError::ContextError("user input not found".to_string()))?;

        match self.field {
            LeadField::Phone if !looks_like_phone(&answer) => {
                info!("phone answer does not look like a number, keeping it anyway");
            }
            LeadField::Email if !looks_like_email(&answer) => {
                info!("email answer does not look like an address, keeping it anyway");
            }
            _ => {}
        }

        context.record_lead(self.field, answer.clone()).await;

        let response = match self.field {
            LeadField::Name => self.reply.replace(NAME_PLACEHOLDER, &answer),
            _ => self.reply.clone(),
        };

        Ok(TaskResult::new(Some(response), NextAction::Continue))
    }
}
