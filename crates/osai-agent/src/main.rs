//! # osai-agent
//!
//! OS-AI agent backend binary. Loads settings, installs logging, builds the
//! input driver and session factory, and serves `/ws` until Ctrl-C.

#![deny(unsafe_code)]

mod session_factory;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use osai_core::logging::init_subscriber;
use osai_runtime::{Credential, DirectoryStore, JobRegistry};
use osai_server::{OsAiServer, ServerConfig, ServerDeps};
use osai_settings::Settings;
use osai_tools::{InputDriver, Platform, ScreenSize, UnavailableDriver};
use tracing::{info, warn};

use crate::session_factory::DefaultSessionFactory;

/// Logical size reported when no real display is attached.
const FALLBACK_SCREEN: ScreenSize = ScreenSize {
    width: 1280,
    height: 800,
};

/// OS-AI agent backend.
#[derive(Parser, Debug)]
#[command(name = "os-ai-agent", about = "OS-AI agent backend", version)]
struct Cli {
    /// Host to bind (overrides settings).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind, 0 for auto-assign (overrides settings).
    #[arg(long)]
    port: Option<u16>,

    /// Path to the settings file.
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Default log filter when `RUST_LOG` is unset (overrides settings).
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    fn apply(&self, settings: &mut Settings) {
        if let Some(host) = &self.host {
            settings.server.host.clone_from(host);
        }
        if let Some(port) = self.port {
            settings.server.port = port;
        }
        if let Some(level) = &self.log_level {
            settings.logging.level.clone_from(level);
        }
    }
}

fn default_upload_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".os-ai").join("uploads")
}

fn unavailable_driver(reason: impl Into<String>) -> Arc<dyn InputDriver> {
    Arc::new(UnavailableDriver::new(FALLBACK_SCREEN, reason))
}

#[cfg(feature = "desktop")]
fn build_driver() -> Arc<dyn InputDriver> {
    match osai_tools::desktop::DesktopDriver::new() {
        Ok(driver) => {
            info!("desktop input driver ready");
            Arc::new(driver)
        }
        Err(e) => {
            warn!(error = %e, "desktop input unavailable, computer actions will fail");
            unavailable_driver(e.to_string())
        }
    }
}

#[cfg(not(feature = "desktop"))]
fn build_driver() -> Arc<dyn InputDriver> {
    warn!("built without the desktop feature, computer actions will fail");
    unavailable_driver("built without the `desktop` feature")
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings_path = cli.settings.clone().unwrap_or_else(osai_settings::settings_path);
    let mut settings = osai_settings::load_settings_from_path(&settings_path)
        .with_context(|| format!("Failed to load settings from {}", settings_path.display()))?;
    cli.apply(&mut settings);

    init_subscriber(&settings.logging.level, settings.logging.json);
    info!(path = %settings_path.display(), "settings loaded");

    let upload_dir = settings
        .attachments
        .upload_dir
        .as_deref()
        .map_or_else(default_upload_dir, PathBuf::from);
    let fallback_credential = osai_settings::process_credential().and_then(Credential::new);
    info!(
        upload_dir = %upload_dir.display(),
        fallback_credential = fallback_credential.is_some(),
        "runtime configured"
    );

    let sessions = DefaultSessionFactory::new(
        settings.provider.clone(),
        build_driver(),
        Platform::current(),
    );
    let deps = ServerDeps {
        jobs: Arc::new(JobRegistry::new()),
        sessions: Arc::new(sessions),
        content_store: Arc::new(DirectoryStore::new(upload_dir)),
        agent: settings.agent.clone(),
        fallback_credential,
    };

    let server = OsAiServer::new(ServerConfig::from_settings(&settings.server), deps);
    let (addr, handle) = server
        .listen()
        .await
        .with_context(|| format!("Failed to bind {}", server.config().bind_addr()))?;
    info!(%addr, "OS-AI agent ready");

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;
    info!("shutdown requested");

    let cancelled = server.deps().jobs.cancel_all();
    if cancelled > 0 {
        info!(cancelled, "cancelled in-flight jobs");
    }
    server.shutdown().graceful_shutdown(vec![handle], None).await;
    info!("shutdown complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_overrides_settings() {
        let cli = Cli::parse_from(["os-ai-agent", "--host", "0.0.0.0", "--port", "9000", "--log-level", "debug"]);
        let mut settings = Settings::default();
        cli.apply(&mut settings);
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.server.port, 9000);
        assert_eq!(settings.logging.level, "debug");
    }

    #[test]
    fn cli_without_flags_keeps_settings() {
        let cli = Cli::parse_from(["os-ai-agent"]);
        let mut settings = Settings::default();
        let before = settings.server.port;
        cli.apply(&mut settings);
        assert_eq!(settings.server.port, before);
        assert!(cli.settings.is_none());
    }

    #[test]
    fn default_upload_dir_under_home() {
        assert!(default_upload_dir().ends_with(".os-ai/uploads"));
    }
}
