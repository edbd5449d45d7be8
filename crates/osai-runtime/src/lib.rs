//! # osai-runtime
//!
//! Everything between a protocol request and the OS: job bookkeeping, the
//! tool-use loop, and the collaborator contracts it is wired through.
//!
//! - **Jobs**: [`JobRegistry`] maps job ids to cancellation tokens; [`JobGuard`]
//!   removes the entry on every exit path
//! - **Orchestrator**: bounded LLM ↔ tool loop emitting [`AgentEvent`]s
//! - **Sessions**: [`SessionFactory`] builds a client and tool set per credential
//! - **Attachments**: [`ContentStore`] resolves uploaded file ids to bytes
//! - **Runner**: [`run_job`] ties a session, a registry entry and a sink together

#![deny(unsafe_code)]

pub mod attachments;
pub mod errors;
pub mod events;
pub mod jobs;
pub mod orchestrator;
pub mod runner;
pub mod session;

pub use attachments::{
    Attachment, ContentStore, ContextMessage, DirectoryStore, build_initial_transcript, parse_list,
};
pub use errors::{CREDENTIAL_ERROR_CODE, CredentialError, RunError, SessionError, StoreError};
pub use events::{AgentEvent, EventSink};
pub use jobs::{JobGuard, JobRegistry};
pub use orchestrator::{Orchestrator, RunOutcome, RunRequest, RunStatus};
pub use runner::{JobSpec, run_job};
pub use session::{AgentSession, Credential, SessionFactory, default_capabilities, resolve_credential};
