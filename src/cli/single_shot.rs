//! Non-interactive mode: one utterance in, one JSON body out

use tracing::error;

use crate::agent::Orchestrator;
use crate::core::RunResult;
use crate::llm::LLMProvider;

/// Check the models, then run `utterance` once
///
/// A failed model check becomes the `{"error": ...}` body rather than an
/// early exit.
pub async fn single_shot(
    orchestrator: &Orchestrator,
    llm: &dyn LLMProvider,
    utterance: &str,
) -> RunResult {
    if let Err(e) = orchestrator.initialize(llm).await {
        error!(provider = llm.name(), error = %e, "model check failed");
        return RunResult::failed(&e);
    }

    orchestrator.run(utterance).await
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::agent::{AgentRoster, ScriptedAgent};
    use crate::core::config::OrchestrationConfig;
    use crate::core::{ChatMessage, Config, Result, ToolDefinition, TriageError};
    use crate::llm::{GenerateOptions, LLMResponse};

    /// Provider whose server cannot be reached
    struct Unreachable;

    #[async_trait]
    impl LLMProvider for Unreachable {
        async fn chat(
            &self,
            _model: &str,
            _messages: &[ChatMessage],
            _options: Option<GenerateOptions>,
        ) -> Result<LLMResponse> {
            Err(TriageError::ollama("connection refused"))
        }

        async fn chat_with_tools(
            &self,
            _model: &str,
            _messages: &[ChatMessage],
            _tools: &[ToolDefinition],
            _options: Option<GenerateOptions>,
        ) -> Result<LLMResponse> {
            Err(TriageError::ollama("connection refused"))
        }

        async fn is_model_available(&self, _model: &str) -> Result<bool> {
            Err(TriageError::ollama("connection refused"))
        }

        async fn list_models(&self) -> Result<Vec<String>> {
            Err(TriageError::ollama("connection refused"))
        }

        fn name(&self) -> &str {
            "unreachable"
        }
    }

    #[tokio::test]
    async fn test_unreachable_server_yields_error_body() {
        let llm = Arc::new(Unreachable);
        let orch = Orchestrator::from_config(&Config::default(), llm.clone()).unwrap();

        let result = single_shot(&orch, llm.as_ref(), "What is the return policy").await;

        let failure = result.failure().unwrap();
        assert_eq!(failure.kind, "ollama");
        let body = serde_json::to_value(&result).unwrap();
        assert_eq!(body["error"]["kind"], "ollama");
        assert!(body.get("response").is_none());
    }

    #[tokio::test]
    async fn test_runs_after_model_check() {
        let triage = Arc::new(ScriptedAgent::new("TriageAgent").reply(
            r#"{"type": "cqa_result", "response": {"answers": [{"answer": "30 days"}]}, "terminated": "True"}"#,
        ));
        let roster = AgentRoster::new(
            vec![triage.clone(), Arc::new(ScriptedAgent::new("HeadSupportAgent"))],
            "TriageAgent",
            "HeadSupportAgent",
        )
        .unwrap();
        let orch = Orchestrator::new(Arc::new(roster), &OrchestrationConfig::default());

        // Scripted agents name no model, so only the catalog listing is consulted
        let result = single_shot(&orch, &Catalog, "return policy?").await;
        assert_eq!(serde_json::to_value(&result).unwrap(), json!({"response": "30 days"}));
        assert_eq!(triage.calls(), 1);
    }

    struct Catalog;

    #[async_trait]
    impl LLMProvider for Catalog {
        async fn chat(
            &self,
            _model: &str,
            _messages: &[ChatMessage],
            _options: Option<GenerateOptions>,
        ) -> Result<LLMResponse> {
            Ok(LLMResponse::default())
        }

        async fn chat_with_tools(
            &self,
            _model: &str,
            _messages: &[ChatMessage],
            _tools: &[ToolDefinition],
            _options: Option<GenerateOptions>,
        ) -> Result<LLMResponse> {
            Ok(LLMResponse::default())
        }

        async fn is_model_available(&self, _model: &str) -> Result<bool> {
            Ok(true)
        }

        async fn list_models(&self) -> Result<Vec<String>> {
            Ok(Vec::new())
        }

        fn name(&self) -> &str {
            "catalog"
        }
    }
}
