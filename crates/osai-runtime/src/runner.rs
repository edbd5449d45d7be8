//! One job from registration to removal.

use std::sync::Arc;

use osai_core::{JobId, Message, TokenUsage};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument};

use crate::errors::RunError;
use crate::events::EventSink;
use crate::jobs::{JobGuard, JobRegistry};
use crate::orchestrator::{Orchestrator, RunOutcome, RunRequest, RunStatus};
use crate::session::AgentSession;

/// Inputs for [`run_job`].
#[derive(Debug)]
pub struct JobSpec {
    /// Registered job id.
    pub job_id: JobId,
    /// Session supplying the client and tools.
    pub session: AgentSession,
    /// User task.
    pub task: String,
    /// Context and attachment turns.
    pub initial_messages: Vec<Message>,
    /// System instruction.
    pub system_prompt: String,
    /// Iteration ceiling.
    pub max_iterations: u32,
}

fn failed(error: RunError) -> RunOutcome {
    RunOutcome {
        status: RunStatus::Failed,
        transcript: Vec::new(),
        usage: TokenUsage::default(),
        iterations: 0,
        error: Some(error),
    }
}

/// Run a registered job to completion. The registry entry is removed when
/// this returns or unwinds.
#[instrument(skip_all, fields(job_id = %spec.job_id, session_id = %spec.session.id))]
pub async fn run_job(
    spec: JobSpec,
    jobs: Arc<JobRegistry>,
    cancel: CancellationToken,
    sink: &dyn EventSink,
) -> RunOutcome {
    let _guard = JobGuard::new(jobs, spec.job_id.clone());

    // Descriptors read the live screen size, which is a blocking call.
    let tools = spec.session.tools.clone();
    let descriptors = match tokio::task::spawn_blocking(move || tools.descriptors()).await {
        Ok(Ok(descriptors)) => descriptors,
        Ok(Err(e)) => {
            error!(error = %e, "failed to build tool descriptors");
            return failed(RunError::Internal(e.to_string()));
        }
        Err(e) => {
            error!(error = %e, "descriptor worker failed");
            return failed(RunError::Internal(e.to_string()));
        }
    };

    let orchestrator = Orchestrator::new(spec.session.client.clone(), spec.session.tools.clone());
    let request = RunRequest {
        task: spec.task,
        initial_messages: spec.initial_messages,
        tools: descriptors,
        system_prompt: spec.system_prompt,
        max_iterations: spec.max_iterations,
    };
    let outcome = orchestrator.run(request, &cancel, sink).await;
    info!(
        status = outcome.status.as_str(),
        iterations = outcome.iterations,
        input_tokens = outcome.usage.input_tokens,
        output_tokens = outcome.usage.output_tokens,
        "job finished"
    );
    outcome
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use assert_matches::assert_matches;
    use osai_core::{ContentPart, SessionId, ToolDescriptor, ToolKind};
    use osai_llm::{LlmClient, LlmRequest, LlmResponse, ProviderResult};
    use osai_tools::{DesktopTool, DriverError, ToolError, ToolRegistry};
    use serde_json::{Value, json};

    use super::*;
    use crate::events::AgentEvent;

    struct Done;

    #[async_trait]
    impl LlmClient for Done {
        fn provider(&self) -> &str {
            "scripted"
        }
        fn model(&self) -> &str {
            "scripted-1"
        }
        async fn complete(&self, request: LlmRequest<'_>) -> ProviderResult<LlmResponse> {
            let names: Vec<&str> = request.tools.iter().map(|t| t.name.as_str()).collect();
            Ok(LlmResponse::text(names.join(","), TokenUsage::default()))
        }
    }

    struct Tool {
        broken: bool,
    }

    impl DesktopTool for Tool {
        fn name(&self) -> &str {
            "computer"
        }
        fn descriptor(&self) -> Result<ToolDescriptor, ToolError> {
            if self.broken {
                return Err(DriverError::Unavailable("no display".into()).into());
            }
            Ok(ToolDescriptor::new("computer", ToolKind::ComputerUse))
        }
        fn execute(&self, _input: &Value) -> Result<Vec<ContentPart>, ToolError> {
            Ok(vec![])
        }
    }

    struct Null;

    #[async_trait]
    impl EventSink for Null {
        async fn emit(&self, _event: AgentEvent) {}
    }

    fn spec(broken: bool) -> JobSpec {
        let mut tools = ToolRegistry::new();
        tools.register(Arc::new(Tool { broken }));
        JobSpec {
            job_id: JobId::new(),
            session: AgentSession {
                id: SessionId::new(),
                provider: "scripted".into(),
                client: Arc::new(Done),
                tools: Arc::new(tools),
                capabilities: json!({}),
            },
            task: "go".into(),
            initial_messages: vec![],
            system_prompt: String::new(),
            max_iterations: 3,
        }
    }

    #[tokio::test]
    async fn completes_and_unregisters() {
        let jobs = Arc::new(JobRegistry::new());
        let spec = spec(false);
        let id = spec.job_id.clone();
        jobs.register(id.clone(), CancellationToken::new());

        let out = run_job(spec, jobs.clone(), CancellationToken::new(), &Null).await;
        assert_eq!(out.status, RunStatus::Completed);
        assert_eq!(out.final_text(), "computer");
        assert!(!jobs.contains(&id));
    }

    #[tokio::test]
    async fn descriptor_failure_fails_and_unregisters() {
        let jobs = Arc::new(JobRegistry::new());
        let spec = spec(true);
        let id = spec.job_id.clone();
        jobs.register(id.clone(), CancellationToken::new());

        let out = run_job(spec, jobs.clone(), CancellationToken::new(), &Null).await;
        assert_eq!(out.status, RunStatus::Failed);
        assert_matches!(out.error, Some(RunError::Internal(_)));
        assert!(!jobs.contains(&id));
    }
}
