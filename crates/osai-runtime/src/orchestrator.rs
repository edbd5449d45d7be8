//! Bounded tool-use loop.
//!
//! Each iteration sends the whole transcript to the model. A reply with no
//! tool calls ends the run; otherwise every call is dispatched in order on a
//! blocking worker and the results go back as one user turn.

use std::sync::Arc;

use osai_core::{ContentPart, Message, TokenUsage, ToolCall, ToolDescriptor};
use osai_llm::{LlmClient, LlmRequest};
use osai_tools::{ToolOutput, ToolRegistry};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument};

use crate::errors::RunError;
use crate::events::{AgentEvent, EventSink};

/// How a run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunStatus {
    /// Finished normally, including hitting the iteration ceiling.
    Completed,
    /// Ended by an error.
    Failed,
    /// Ended by its cancellation token.
    Cancelled,
}

impl RunStatus {
    /// Lowercase label.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Everything one run needs besides its collaborators.
#[derive(Clone, Debug)]
pub struct RunRequest {
    /// The user's task, appended as the last user turn.
    pub task: String,
    /// Prior turns (context, attachments) placed before the task.
    pub initial_messages: Vec<Message>,
    /// Tools declared to the model.
    pub tools: Vec<ToolDescriptor>,
    /// System instruction.
    pub system_prompt: String,
    /// Iteration ceiling.
    pub max_iterations: u32,
}

/// How a run ended.
#[derive(Debug)]
pub struct RunOutcome {
    /// Terminal status.
    pub status: RunStatus,
    /// Transcript as it stood when the run stopped.
    pub transcript: Vec<Message>,
    /// Usage summed over every model call.
    pub usage: TokenUsage,
    /// Iterations started.
    pub iterations: u32,
    /// Set when `status` is `Failed`.
    pub error: Option<RunError>,
}

impl RunOutcome {
    /// Every non-empty assistant text part, newline joined and trimmed.
    pub fn final_text(&self) -> String {
        self.transcript
            .iter()
            .filter(|m| m.role == osai_core::Role::Assistant)
            .flat_map(|m| m.content.iter().filter_map(ContentPart::as_text))
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
            .trim()
            .to_owned()
    }
}

/// Drives one LLM client and one tool registry.
#[derive(Clone)]
pub struct Orchestrator {
    client: Arc<dyn LlmClient>,
    tools: Arc<ToolRegistry>,
}

struct Progress {
    transcript: Vec<Message>,
    usage: TokenUsage,
    iterations: u32,
}

impl Progress {
    fn finish(self, status: RunStatus, error: Option<RunError>) -> RunOutcome {
        RunOutcome {
            status,
            transcript: self.transcript,
            usage: self.usage,
            iterations: self.iterations,
            error,
        }
    }
}

impl Orchestrator {
    /// Bind a client and a tool registry.
    pub fn new(client: Arc<dyn LlmClient>, tools: Arc<ToolRegistry>) -> Self {
        Self { client, tools }
    }

    /// Run the loop to a terminal state. Never panics on provider or tool
    /// failures; those end up in the outcome.
    #[instrument(skip_all, fields(provider = self.client.provider(), max_iterations = request.max_iterations))]
    pub async fn run(
        &self,
        request: RunRequest,
        cancel: &CancellationToken,
        sink: &dyn EventSink,
    ) -> RunOutcome {
        let RunRequest {
            task,
            mut initial_messages,
            tools,
            system_prompt,
            max_iterations,
        } = request;
        initial_messages.push(Message::user_text(task));
        let mut state = Progress {
            transcript: initial_messages,
            usage: TokenUsage::default(),
            iterations: 0,
        };

        for iteration in 1..=max_iterations {
            if cancel.is_cancelled() {
                info!(iteration, "run cancelled");
                return state.finish(RunStatus::Cancelled, None);
            }
            state.iterations = iteration;
            sink.emit(AgentEvent::Progress {
                iteration,
                max_iterations,
            })
            .await;

            let llm_request = LlmRequest {
                system: &system_prompt,
                messages: &state.transcript,
                tools: &tools,
            };
            let response = match self.client.complete(llm_request).await {
                Ok(response) => response,
                Err(e) => {
                    let err = RunError::from(e);
                    error!(iteration, category = err.category(), error = %err, "model call failed");
                    return state.finish(RunStatus::Failed, Some(err));
                }
            };

            state.usage.accumulate(response.usage);
            sink.emit(AgentEvent::Usage(state.usage)).await;

            let calls = response.tool_calls();
            let text = response.joined_text();
            state.transcript.push(Message::assistant(response.content));
            if !text.is_empty() {
                sink.emit(AgentEvent::AssistantText { text }).await;
            }
            if calls.is_empty() {
                debug!(iteration, "model finished without tool calls");
                return state.finish(RunStatus::Completed, None);
            }

            let mut results = Vec::with_capacity(calls.len());
            for call in calls {
                sink.emit(AgentEvent::ToolCall {
                    id: call.id.clone(),
                    name: call.name.clone(),
                    input: call.input.clone(),
                })
                .await;
                let output = self.dispatch(&call).await;
                emit_output(sink, &call, &output).await;
                results.push(output.into_result_part(call.id));
            }
            state.transcript.push(Message::user(results));
        }

        info!(max_iterations, "iteration ceiling reached");
        state.finish(RunStatus::Completed, None)
    }

    async fn dispatch(&self, call: &ToolCall) -> ToolOutput {
        let tools = self.tools.clone();
        let owned = call.clone();
        match tokio::task::spawn_blocking(move || tools.dispatch(&owned)).await {
            Ok(output) => output,
            Err(e) => {
                error!(tool = %call.name, error = %e, "tool worker failed");
                ToolOutput {
                    parts: vec![ContentPart::text(format!("Error: tool worker failed: {e}"))],
                    is_error: true,
                }
            }
        }
    }
}

async fn emit_output(sink: &dyn EventSink, call: &ToolCall, output: &ToolOutput) {
    for part in &output.parts {
        match part {
            ContentPart::Text { text } => {
                sink.emit(AgentEvent::ToolResultText {
                    tool_use_id: call.id.clone(),
                    name: call.name.clone(),
                    text: text.clone(),
                    is_error: output.is_error,
                })
                .await;
            }
            ContentPart::Image { media_type, data } => {
                sink.emit(AgentEvent::ToolResultImage {
                    tool_use_id: call.id.clone(),
                    media_type: media_type.clone(),
                    data: data.clone(),
                })
                .await;
            }
            ContentPart::ToolUse { .. } | ContentPart::ToolResult { .. } => {}
        }
    }
}
