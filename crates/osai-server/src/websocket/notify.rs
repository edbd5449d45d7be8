//! Job events on their way back to a connection, and their notification
//! encoding.

use async_trait::async_trait;
use osai_core::{JobId, TokenUsage};
use osai_runtime::{AgentEvent, EventSink, RunOutcome, RunStatus};
use serde_json::{Value, json};
use tokio::sync::mpsc;
use tracing::debug;

use crate::rpc::types::RpcNotification;

/// Terminal status as reported to clients.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FinalStatus {
    /// Completed, including hitting the iteration ceiling.
    Ok,
    /// Ended by an error or a panic.
    Fail,
    /// Ended by `agent.cancel` or connection close.
    Cancelled,
}

impl FinalStatus {
    /// Wire label.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Fail => "fail",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Payload of `event.final`.
#[derive(Clone, Debug, PartialEq)]
pub struct FinalReport {
    /// Terminal status.
    pub status: FinalStatus,
    /// Assistant text of the run, joined and trimmed.
    pub text: String,
    /// Cumulative usage.
    pub usage: TokenUsage,
    /// Iterations started.
    pub iterations: u32,
    /// Failure message.
    pub error: Option<String>,
    /// Protocol code for the failure, when it has one.
    pub code: Option<i32>,
}

impl FinalReport {
    /// Summarize a finished run.
    pub fn from_outcome(outcome: &RunOutcome) -> Self {
        let status = match outcome.status {
            RunStatus::Completed => FinalStatus::Ok,
            RunStatus::Cancelled => FinalStatus::Cancelled,
            RunStatus::Failed => FinalStatus::Fail,
        };
        let (error, code) = match (&outcome.error, status) {
            (Some(e), _) => (Some(e.to_string()), e.code()),
            (None, FinalStatus::Fail) => (Some("Run ended unexpectedly".to_owned()), None),
            (None, _) => (None, None),
        };
        Self {
            status,
            text: outcome.final_text(),
            usage: outcome.usage,
            iterations: outcome.iterations,
            error,
            code,
        }
    }

    /// A failure with no run to summarize, e.g. the job task panicked.
    pub fn failed(error: impl Into<String>, code: Option<i32>) -> Self {
        Self {
            status: FinalStatus::Fail,
            text: String::new(),
            usage: TokenUsage::default(),
            iterations: 0,
            error: Some(error.into()),
            code,
        }
    }

    fn to_params(&self, job_id: &JobId) -> Value {
        let mut params = json!({
            "jobId": job_id,
            "status": self.status.as_str(),
            "text": self.text,
            "usage": self.usage,
            "iterations": self.iterations,
        });
        if let Some(error) = &self.error {
            params["error"] = json!(error);
        }
        if let Some(code) = self.code {
            params["code"] = json!(code);
        }
        params
    }
}

/// Anything a job sends back to its connection.
#[derive(Clone, Debug, PartialEq)]
pub enum JobEvent {
    /// A step of the run.
    Agent(AgentEvent),
    /// The run is over; always the last message for a job.
    Finished(FinalReport),
}

/// A job event tagged with its job.
#[derive(Clone, Debug, PartialEq)]
pub struct JobMessage {
    /// Originating job.
    pub job_id: JobId,
    /// What happened.
    pub event: JobEvent,
}

impl JobMessage {
    /// Whether this is the job's last message.
    pub fn is_final(&self) -> bool {
        matches!(self.event, JobEvent::Finished(_))
    }

    /// Encode as a JSON-RPC notification.
    pub fn to_notification(&self) -> RpcNotification {
        let job_id = &self.job_id;
        let (method, params) = match &self.event {
            JobEvent::Agent(AgentEvent::AssistantText { text }) => (
                "event.log",
                json!({ "jobId": job_id, "level": "info", "message": text }),
            ),
            JobEvent::Agent(AgentEvent::ToolCall { name, input, .. }) => (
                "event.action",
                json!({ "jobId": job_id, "name": name, "status": "start", "meta": input }),
            ),
            JobEvent::Agent(AgentEvent::ToolResultText {
                tool_use_id,
                name,
                text,
                is_error,
            }) => (
                "event.action",
                json!({
                    "jobId": job_id,
                    "name": "tool_result",
                    "status": if *is_error { "error" } else { "ok" },
                    "meta": { "tool": name, "toolUseId": tool_use_id, "text": text },
                }),
            ),
            JobEvent::Agent(AgentEvent::ToolResultImage {
                media_type, data, ..
            }) => (
                "event.screenshot",
                json!({
                    "jobId": job_id,
                    "mime": media_type,
                    "data": data,
                    "ts": chrono::Utc::now().to_rfc3339(),
                }),
            ),
            JobEvent::Agent(AgentEvent::Progress {
                iteration,
                max_iterations,
            }) => (
                "event.progress",
                json!({ "jobId": job_id, "iteration": iteration, "maxIterations": max_iterations }),
            ),
            JobEvent::Agent(AgentEvent::Usage(usage)) => (
                "event.usage",
                json!({
                    "jobId": job_id,
                    "input_tokens": usage.input_tokens,
                    "output_tokens": usage.output_tokens,
                }),
            ),
            JobEvent::Finished(report) => ("event.final", report.to_params(job_id)),
        };
        RpcNotification::new(method, params)
    }
}

/// `EventSink` that forwards onto a connection's bounded job channel.
///
/// A full channel suspends the job, which is the backpressure.
pub struct ChannelSink {
    job_id: JobId,
    tx: mpsc::Sender<JobMessage>,
}

impl ChannelSink {
    /// Sink for one job.
    pub fn new(job_id: JobId, tx: mpsc::Sender<JobMessage>) -> Self {
        Self { job_id, tx }
    }
}

#[async_trait]
impl EventSink for ChannelSink {
    async fn emit(&self, event: AgentEvent) {
        let message = JobMessage {
            job_id: self.job_id.clone(),
            event: JobEvent::Agent(event),
        };
        if self.tx.send(message).await.is_err() {
            debug!(job_id = %self.job_id, "connection closed, dropping event");
        }
    }
}
