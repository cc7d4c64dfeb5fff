use dashmap::DashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info};

use crate::{
    context::Context,
    error::{FlowError, Result},
    stage::ConversationStage,
    task::{NextAction, Task, TaskResult},
};

/// Edge between stages in the dialogue
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Edge {
    pub from: ConversationStage,
    pub to: ConversationStage,
}

/// The scripted dialogue: one task per stage, forward edges between them
pub struct Graph {
    pub id: String,
    tasks: DashMap<ConversationStage, Arc<dyn Task>>,
    edges: Mutex<Vec<Edge>>,
}

impl Graph {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tasks: DashMap::new(),
            edges: Mutex::new(Vec::new()),
        }
    }

    /// Add a task to the graph
    pub fn add_task(&self, task: Arc<dyn Task>) -> Result<&Self> {
        let stage = task.stage();
        if self.tasks.contains_key(&stage) {
            return Err(FlowError::DuplicateTask(stage));
        }
        self.tasks.insert(stage, task);
        Ok(self)
    }

    /// Add an edge between stages. Edges may only point forward.
    pub fn add_edge(&self, from: ConversationStage, to: ConversationStage) -> Result<&Self> {
        if to <= from {
            return Err(FlowError::BackwardEdge { from, to });
        }
        self.edges
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Edge { from, to });
        Ok(self)
    }

    /// Run the task for the context's current stage and move the stage along.
    ///
    /// Exactly one task runs per call.
    pub async fn execute_session(&self, context: &Context) -> Result<ExecutionResult> {
        let from = context.stage().await;
        let result = self.execute_single_task(from, context.clone()).await?;

        let to = match result.next_action {
            NextAction::Continue => self.find_next_stage(result.stage).unwrap_or(result.stage),
            NextAction::WaitForInput => result.stage,
        };

        if to != from {
            info!(%from, %to, "conversation advanced");
            context.set_stage(to).await;
        } else {
            debug!(stage = %from, "conversation stays");
        }

        Ok(ExecutionResult {
            response: result.response,
            from,
            to,
        })
    }

    /// Execute a single task without touching the stage
    async fn execute_single_task(
        &self,
        stage: ConversationStage,
        context: Context,
    ) -> Result<TaskResult> {
        // clone out of the map so no shard lock is held across the await
        let task = self
            .tasks
            .get(&stage)
            .map(|entry| entry.clone())
            .ok_or(FlowError::TaskNotFound(stage))?;

        let mut result = task.run(context).await?;

        // Set the stage in the result to track which task generated it
        result.stage = stage;

        Ok(result)
    }

    /// Find the stage the outgoing edge points to
    pub fn find_next_stage(&self, current: ConversationStage) -> Option<ConversationStage> {
        let edges = self.edges.lock().unwrap_or_else(PoisonError::into_inner);
        edges
            .iter()
            .find(|edge| edge.from == current)
            .map(|edge| edge.to)
    }

    /// Get a task by stage
    pub fn get_task(&self, stage: ConversationStage) -> Option<Arc<dyn Task>> {
        self.tasks.get(&stage).map(|entry| entry.clone())
    }

    pub fn has_task(&self, stage: ConversationStage) -> bool {
        self.tasks.contains_key(&stage)
    }
}

/// Builder for creating graphs
pub struct GraphBuilder {
    graph: Graph,
    error: Option<FlowError>,
}

impl GraphBuilder {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            graph: Graph::new(id),
            error: None,
        }
    }

    pub fn add_task(mut self, task: Arc<dyn Task>) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.graph.add_task(task) {
                self.error = Some(e);
            }
        }
        self
    }

    pub fn add_edge(mut self, from: ConversationStage, to: ConversationStage) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.graph.add_edge(from, to) {
                self.error = Some(e);
            }
        }
        self
    }

    /// Finish the graph. Every stage must have a task.
    pub fn build(self) -> Result<Graph> {
        if let Some(e) = self.error {
            return Err(e);
        }
        if let Some(missing) = ConversationStage::ALL
            .into_iter()
            .find(|stage| !self.graph.has_task(*stage))
        {
            return Err(FlowError::TaskNotFound(missing));
        }
        Ok(self.graph)
    }
}

/// What one step of the dialogue produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    pub response: Option<String>,
    pub from: ConversationStage,
    pub to: ConversationStage,
}

impl ExecutionResult {
    pub fn advanced(&self) -> bool {
        self.from != self.to
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct EchoTask {
        stage: ConversationStage,
        next: NextAction,
    }

    #[async_trait]
    impl Task for EchoTask {
        fn stage(&self) -> ConversationStage {
            self.stage
        }

        async fn run(&self, context: Context) -> Result<TaskResult> {
            let input = context.user_input().await.unwrap_or_default();
            Ok(TaskResult::new(
                Some(format!("{}: {}", self.stage, input)),
                self.next.clone(),
            ))
        }
    }

    fn echo(stage: ConversationStage, next: NextAction) -> Arc<dyn Task> {
        Arc::new(EchoTask { stage, next })
    }

    fn linear_graph() -> GraphBuilder {
        use ConversationStage::*;
        GraphBuilder::new("test")
            .add_task(echo(Initial, NextAction::Continue))
            .add_task(echo(AwaitingName, NextAction::Continue))
            .add_task(echo(AwaitingPhone, NextAction::Continue))
            .add_task(echo(AwaitingEmail, NextAction::Continue))
            .add_task(echo(FreeForm, NextAction::WaitForInput))
            .add_edge(Initial, AwaitingName)
            .add_edge(AwaitingName, AwaitingPhone)
            .add_edge(AwaitingPhone, AwaitingEmail)
            .add_edge(AwaitingEmail, FreeForm)
    }

    #[tokio::test]
    async fn test_execute_session_runs_one_step() {
        let graph = linear_graph().build().unwrap();
        let context = Context::new();
        context.set_user_input(Some("hi".to_string())).await;

        let result = graph.execute_session(&context).await.unwrap();
        assert_eq!(result.response.as_deref(), Some("initial: hi"));
        assert!(result.advanced());
        assert_eq!(context.stage().await, ConversationStage::AwaitingName);
    }

    #[tokio::test]
    async fn test_wait_for_input_keeps_stage() {
        let graph = linear_graph().build().unwrap();
        let context = Context::new();
        context.set_stage(ConversationStage::FreeForm).await;

        let result = graph.execute_session(&context).await.unwrap();
        assert!(!result.advanced());
        assert_eq!(context.stage().await, ConversationStage::FreeForm);
    }

    #[test]
    fn test_backward_edge_is_rejected() {
        let result = linear_graph()
            .add_edge(ConversationStage::FreeForm, ConversationStage::AwaitingName)
            .build();
        assert!(matches!(result, Err(FlowError::BackwardEdge { .. })));
    }

    #[test]
    fn test_missing_stage_is_rejected() {
        let result = GraphBuilder::new("partial")
            .add_task(echo(ConversationStage::Initial, NextAction::Continue))
            .build();
        assert!(matches!(
            result,
            Err(FlowError::TaskNotFound(ConversationStage::AwaitingName))
        ));
    }

    #[test]
    fn test_duplicate_stage_is_rejected() {
        let result = linear_graph()
            .add_task(echo(ConversationStage::FreeForm, NextAction::WaitForInput))
            .build();
        assert!(matches!(
            result,
            Err(FlowError::DuplicateTask(ConversationStage::FreeForm))
        ));
    }
}
