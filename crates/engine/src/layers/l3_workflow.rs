//! L3 — active-workflow rules, keyed on the manifest's `workflowTrigger`.

use crate::layer::{LayerContext, LayerProcessor, LayerResult};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use synapse_core::error::LayerError;

pub struct WorkflowLayer;

#[async_trait]
impl LayerProcessor for WorkflowLayer {
    fn name(&self) -> &'static str {
        "workflow"
    }

    fn layer_index(&self) -> u8 {
        3
    }

    fn timeout(&self) -> Duration {
        Duration::from_millis(15)
    }

    async fn process(&self, ctx: &LayerContext<'_>) -> Result<Option<LayerResult>, LayerError> {
        let Some(workflow) = ctx.session.active_workflow.as_ref() else {
            return Ok(None);
        };
        let Some((_, spec)) = ctx.config.manifest.domain_for_workflow(&workflow.id) else {
            return Ok(None);
        };

        let rules = super::read_rules(&ctx.config.synapse_dir.join(&spec.file)).await;
        if rules.is_empty() {
            return Ok(None);
        }

        let mut result = LayerResult::for_layer(self.layer_index());
        result
            .metadata
            .insert("workflow_id".into(), Value::String(workflow.id.clone()));
        result.metadata.insert(
            "phase".into(),
            workflow
                .current_phase
                .as_ref()
                .map(|p| Value::String(p.clone()))
                .unwrap_or(Value::Null),
        );
        result
            .metadata
            .insert("source".into(), Value::String(spec.file.clone()));
        result.rules = rules;
        Ok(Some(result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::EngineConfig;
    use synapse_core::session::ActiveWorkflow;
    use synapse_core::Session;
    use synapse_domain::parse_manifest_str;
    use tempfile::tempdir;

    fn session_with_workflow(id: &str, phase: Option<&str>) -> Session {
        Session {
            active_workflow: Some(ActiveWorkflow {
                id: id.into(),
                current_step: None,
                current_phase: phase.map(String::from),
                started_at: None,
                instance_id: None,
            }),
            ..Session::default()
        }
    }

    #[tokio::test]
    async fn loads_workflow_rules_with_phase() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("workflow-story-dev"), "Follow the story plan\n").unwrap();
        let config = EngineConfig {
            root: dir.path().to_path_buf(),
            synapse_dir: dir.path().to_path_buf(),
            manifest: parse_manifest_str(
                "WORKFLOW_STORY_DEV_WORKFLOW_TRIGGER=story_development\n",
                dir.path(),
            )
            .unwrap(),
            devmode: false,
        };
        let session = session_with_workflow("story_development", Some("implementation"));
        let ctx = LayerContext {
            prompt: "p",
            session: &session,
            config: &config,
            completed: &[],
        };

        let result = WorkflowLayer.process(&ctx).await.unwrap().unwrap();
        assert_eq!(result.rules, vec!["Follow the story plan"]);
        assert_eq!(result.metadata["layer"], Value::from(3));
        assert_eq!(
            result.metadata["workflow_id"],
            Value::String("story_development".into())
        );
        assert_eq!(result.metadata["phase"], Value::String("implementation".into()));
    }

    #[tokio::test]
    async fn phase_is_null_when_unset() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("workflow-qa"), "QA pass\n").unwrap();
        let config = EngineConfig {
            root: dir.path().to_path_buf(),
            synapse_dir: dir.path().to_path_buf(),
            manifest: parse_manifest_str("WORKFLOW_QA_WORKFLOW_TRIGGER=qa_pass\n", dir.path())
                .unwrap(),
            devmode: false,
        };
        let session = session_with_workflow("qa_pass", None);
        let ctx = LayerContext {
            prompt: "p",
            session: &session,
            config: &config,
            completed: &[],
        };
        let result = WorkflowLayer.process(&ctx).await.unwrap().unwrap();
        assert_eq!(result.metadata["phase"], Value::Null);
    }

    #[tokio::test]
    async fn absent_without_workflow_or_trigger_match() {
        let dir = tempdir().unwrap();
        let config = EngineConfig {
            root: dir.path().to_path_buf(),
            synapse_dir: dir.path().to_path_buf(),
            manifest: parse_manifest_str("WORKFLOW_QA_WORKFLOW_TRIGGER=qa_pass\n", dir.path())
                .unwrap(),
            devmode: false,
        };

        let none = Session::default();
        let ctx = LayerContext {
            prompt: "p",
            session: &none,
            config: &config,
            completed: &[],
        };
        assert!(WorkflowLayer.process(&ctx).await.unwrap().is_none());

        let unmatched = session_with_workflow("unknown_flow", None);
        let ctx = LayerContext {
            prompt: "p",
            session: &unmatched,
            config: &config,
            completed: &[],
        };
        assert!(WorkflowLayer.process(&ctx).await.unwrap().is_none());
    }
}
