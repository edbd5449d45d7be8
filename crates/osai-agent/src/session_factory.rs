//! Default session factory: one Anthropic client and a `computer` tool per
//! session, bound to the connection's credential.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use osai_core::SessionId;
use osai_llm::RetryPolicy;
use osai_llm::anthropic::{AnthropicClient, AnthropicConfig};
use osai_runtime::{
    AgentSession, Credential, CredentialError, SessionError, SessionFactory, default_capabilities,
};
use osai_settings::ProviderSettings;
use osai_tools::{ComputerTool, InputDriver, Platform, ToolRegistry};
use tracing::debug;

const ANTHROPIC: &str = "anthropic";

/// Builds sessions from the `provider` settings section.
pub struct DefaultSessionFactory {
    provider: ProviderSettings,
    driver: Arc<dyn InputDriver>,
    platform: Platform,
}

impl DefaultSessionFactory {
    /// Create a factory sharing `driver` across every session.
    pub fn new(provider: ProviderSettings, driver: Arc<dyn InputDriver>, platform: Platform) -> Self {
        Self {
            provider,
            driver,
            platform,
        }
    }

    fn client_config(&self, credential: &Credential) -> AnthropicConfig {
        AnthropicConfig {
            api_key: credential.expose().to_owned(),
            model: self.provider.model.clone(),
            base_url: self.provider.base_url.clone(),
            max_tokens: self.provider.max_tokens,
            computer_tool_type: self.provider.computer_tool_type.clone(),
            beta: self.provider.beta.clone(),
            timeout: Duration::from_secs(self.provider.request_timeout_secs),
            retry: RetryPolicy {
                max_retries: self.provider.max_retries,
                ..RetryPolicy::default()
            },
        }
    }
}

#[async_trait]
impl SessionFactory for DefaultSessionFactory {
    async fn create(
        &self,
        provider: Option<&str>,
        credential: Option<&Credential>,
    ) -> Result<AgentSession, SessionError> {
        let credential = credential.ok_or(CredentialError::Missing)?;
        let name = provider
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .unwrap_or(&self.provider.default_provider);
        if !name.eq_ignore_ascii_case(ANTHROPIC) {
            return Err(SessionError::UnknownProvider(name.to_owned()));
        }

        let client = AnthropicClient::new(self.client_config(credential)).map_err(|e| {
            if e.is_auth() {
                SessionError::Credential(CredentialError::Rejected)
            } else {
                SessionError::Backend(e.to_string())
            }
        })?;

        let mut tools = ToolRegistry::new();
        tools.register(Arc::new(
            ComputerTool::new(self.driver.clone(), self.platform)
                .with_tool_type(self.provider.computer_tool_type.clone()),
        ));

        let session = AgentSession {
            id: SessionId::new(),
            provider: ANTHROPIC.to_owned(),
            client: Arc::new(client),
            tools: Arc::new(tools),
            capabilities: default_capabilities(),
        };
        debug!(session_id = %session.id, model = %self.provider.model, "session built");
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use osai_llm::LlmClient;
    use osai_tools::{ScreenSize, UnavailableDriver};

    fn factory() -> DefaultSessionFactory {
        let driver = Arc::new(UnavailableDriver::new(
            ScreenSize {
                width: 1280,
                height: 800,
            },
            "test",
        ));
        DefaultSessionFactory::new(ProviderSettings::default(), driver, Platform::current())
    }

    #[tokio::test]
    async fn missing_credential() {
        assert_matches!(
            factory().create(None, None).await,
            Err(SessionError::Credential(CredentialError::Missing))
        );
    }

    #[tokio::test]
    async fn unknown_provider() {
        let cred = Credential::new("sk-test").unwrap();
        assert_matches!(
            factory().create(Some("mystery"), Some(&cred)).await,
            Err(SessionError::UnknownProvider(p)) if p == "mystery"
        );
    }

    #[tokio::test]
    async fn default_provider_session() {
        let cred = Credential::new("sk-test").unwrap();
        let session = factory().create(None, Some(&cred)).await.unwrap();
        assert_eq!(session.provider, "anthropic");
        assert_eq!(session.tools.names(), vec!["computer"]);
        assert_eq!(session.capabilities["jsonrpc"], true);
        assert_eq!(session.client.model(), ProviderSettings::default().model);
    }

    #[tokio::test]
    async fn provider_name_case_insensitive() {
        let cred = Credential::new("sk-test").unwrap();
        let session = factory().create(Some("Anthropic"), Some(&cred)).await.unwrap();
        assert_eq!(session.provider, "anthropic");
    }

    #[test]
    fn retry_budget_comes_from_settings() {
        let mut f = factory();
        f.provider.max_retries = 5;
        let cred = Credential::new("sk-test").unwrap();
        assert_eq!(f.client_config(&cred).retry.max_retries, 5);
    }

    #[tokio::test]
    async fn sessions_are_distinct() {
        let cred = Credential::new("sk-test").unwrap();
        let f = factory();
        let a = f.create(None, Some(&cred)).await.unwrap();
        let b = f.create(None, Some(&cred)).await.unwrap();
        assert_ne!(a.id, b.id);
    }
}
