//! L4 — task context. Pure session transform, no file I/O.

use crate::layer::{LayerContext, LayerProcessor, LayerResult};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use synapse_core::error::LayerError;

pub struct TaskLayer;

#[async_trait]
impl LayerProcessor for TaskLayer {
    fn name(&self) -> &'static str {
        "task"
    }

    fn layer_index(&self) -> u8 {
        4
    }

    fn timeout(&self) -> Duration {
        Duration::from_millis(20)
    }

    async fn process(&self, ctx: &LayerContext<'_>) -> Result<Option<LayerResult>, LayerError> {
        let Some(task) = ctx.session.active_task.as_ref() else {
            return Ok(None);
        };

        let mut rules = vec![format!("Active Task: {}", task.id)];
        if let Some(story) = &task.story {
            rules.push(format!("Story: {story}"));
        }
        if let Some(executor) = &task.executor_type {
            rules.push(format!("Executor: {executor}"));
        }

        let mut result = LayerResult::for_layer(self.layer_index());
        result
            .metadata
            .insert("task_id".into(), Value::String(task.id.clone()));
        result.metadata.insert(
            "story".into(),
            task.story.clone().map(Value::String).unwrap_or(Value::Null),
        );
        result.metadata.insert(
            "executor_type".into(),
            task.executor_type
                .clone()
                .map(Value::String)
                .unwrap_or(Value::Null),
        );
        result.rules = rules;
        Ok(Some(result))
    }
}
