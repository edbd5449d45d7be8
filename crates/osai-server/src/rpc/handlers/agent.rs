//! Agent handlers: run, cancel.

use std::sync::Arc;

use async_trait::async_trait;
use osai_core::JobId;
use osai_runtime::{
    AgentSession, Attachment, ContextMessage, JobSpec, build_initial_transcript, parse_list, run_job,
};
use osai_settings::AgentSettings;
use serde_json::{Map, Value, json};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::rpc::context::{RpcContext, ServerDeps};
use crate::rpc::errors::RpcError;
use crate::rpc::handlers::{open_session, opt_string_param, params_object};
use crate::rpc::registry::MethodHandler;
use crate::websocket::notify::{ChannelSink, FinalReport, JobEvent, JobMessage};

/// Start a job and acknowledge with its id; progress follows as
/// notifications.
pub struct RunAgentHandler;

#[async_trait]
impl MethodHandler for RunAgentHandler {
    #[instrument(skip(self, params, ctx), fields(method = "agent.run", conn_id = %ctx.conn_id))]
    async fn handle(&self, params: Option<Value>, ctx: &RpcContext) -> Result<Value, RpcError> {
        let params = params_object(params.as_ref())?;
        let task = params
            .and_then(|p| p.get("task"))
            .and_then(Value::as_str)
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| RpcError::invalid_params("Missing 'task'"))?
            .to_owned();
        let provider = opt_string_param(params, "provider")?;
        let max_iterations = max_iterations_param(params, &ctx.deps.agent)?;
        let context = parse_list::<ContextMessage>(params.and_then(|p| p.get("context")));
        let attachments = parse_list::<Attachment>(params.and_then(|p| p.get("attachments")));

        let session = open_session(ctx, provider).await?;

        let job_id = JobId::new();
        let token = ctx.cancel.child_token();
        ctx.deps.jobs.register(job_id.clone(), token.clone());
        info!(
            job_id = %job_id,
            session_id = %session.id,
            provider = %session.provider,
            max_iterations,
            attachments = attachments.len(),
            "agent.run started"
        );

        let result = json!({ "jobId": job_id, "sessionId": session.id });
        let launch = Launch {
            job_id,
            session,
            task,
            context,
            attachments,
            max_iterations,
            token,
            deps: ctx.deps.clone(),
            tx: ctx.job_tx.clone(),
        };
        drop(tokio::spawn(supervise(launch)));

        Ok(result)
    }
}

/// Flag a job for cancellation. Unknown and finished jobs still succeed.
pub struct CancelAgentHandler;

#[async_trait]
impl MethodHandler for CancelAgentHandler {
    #[instrument(skip(self, params, ctx), fields(method = "agent.cancel", conn_id = %ctx.conn_id))]
    async fn handle(&self, params: Option<Value>, ctx: &RpcContext) -> Result<Value, RpcError> {
        let params = params_object(params.as_ref())?;
        let job_id = match params.and_then(|p| p.get("jobId")) {
            Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };
        let Some(job_id) = job_id else {
            warn!("agent.cancel missing jobId");
            return Ok(json!({ "ok": false, "jobId": null }));
        };

        let found = ctx.deps.jobs.cancel(&job_id);
        info!(job_id, found, "agent.cancel");
        Ok(json!({ "ok": true, "jobId": job_id }))
    }
}

fn max_iterations_param(
    params: Option<&Map<String, Value>>,
    agent: &AgentSettings,
) -> Result<u32, RpcError> {
    let raw = match params.and_then(|p| p.get("maxIterations")) {
        None | Some(Value::Null) => return Ok(agent.default_max_iterations),
        Some(v) => v,
    };
    let parsed = match raw {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    let limit = agent.max_iterations_limit;
    parsed
        .filter(|n| (1..=u64::from(limit)).contains(n))
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| {
            RpcError::invalid_params(format!(
                "'maxIterations' must be an integer between 1 and {limit}"
            ))
        })
}

struct Launch {
    job_id: JobId,
    session: AgentSession,
    task: String,
    context: Vec<ContextMessage>,
    attachments: Vec<Attachment>,
    max_iterations: u32,
    token: CancellationToken,
    deps: Arc<ServerDeps>,
    tx: mpsc::Sender<JobMessage>,
}

/// Run the job on its own task and always report `event.final`, even when
/// that task panics.
async fn supervise(launch: Launch) {
    let Launch {
        job_id,
        session,
        task,
        context,
        attachments,
        max_iterations,
        token,
        deps,
        tx,
    } = launch;

    let worker = {
        let deps = deps.clone();
        let job_id = job_id.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            let initial_messages =
                build_initial_transcript(&context, &attachments, deps.content_store.as_ref()).await;
            let sink = ChannelSink::new(job_id.clone(), tx);
            let spec = JobSpec {
                job_id,
                session,
                task,
                initial_messages,
                system_prompt: deps.agent.system_prompt.clone(),
                max_iterations,
            };
            run_job(spec, deps.jobs.clone(), token, &sink).await
        })
    };

    let report = match worker.await {
        Ok(outcome) => FinalReport::from_outcome(&outcome),
        Err(e) => {
            error!(job_id = %job_id, error = %e, "job task failed");
            deps.jobs.remove(&job_id);
            FinalReport::failed(format!("Internal error: {e}"), None)
        }
    };
    let status = report.status;
    let message = JobMessage {
        job_id: job_id.clone(),
        event: JobEvent::Finished(report),
    };
    if tx.send(message).await.is_err() {
        debug!(job_id = %job_id, "connection gone before final event");
    }
    info!(job_id = %job_id, status = status.as_str(), "agent.run finished");
}
