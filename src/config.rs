//! Service configuration.
//!
//! Everything the pipeline needs from the outside world (model choice,
//! sampling parameters, Pinata credentials, timeouts, upload limits) lives in
//! one immutable [`ServiceConfig`], built once at startup via
//! [`ServiceConfigBuilder`] and passed into constructors. Request handling
//! never reads the environment.

use crate::error::TestgenError;
use edgequake_llm::LLMProvider;
use std::fmt;
use std::sync::Arc;

/// Default Pinata API root.
pub const DEFAULT_PINATA_API_URL: &str = "https://api.pinata.cloud";

/// Default generation model.
pub const DEFAULT_MODEL: &str = "gpt-4.1-nano";

/// Default LLM provider name.
pub const DEFAULT_PROVIDER: &str = "openai";

/// Configuration for the upload-generate-publish service.
///
/// # Example
/// ```rust
/// use pdf_testgen::{PinataCredentials, ServiceConfig};
///
/// let config = ServiceConfig::builder()
///     .model("gpt-4.1-mini")
///     .temperature(0.7)
///     .pinata_credentials(PinataCredentials::jwt("eyJhbGciOi..."))
///     .build()
///     .unwrap();
/// assert_eq!(config.max_tokens, 1500);
/// ```
#[derive(Clone)]
pub struct ServiceConfig {
    /// LLM model identifier. If None, uses [`DEFAULT_MODEL`].
    pub model: Option<String>,

    /// LLM provider name ("openai", "anthropic", "ollama", ...).
    /// If None, uses [`DEFAULT_PROVIDER`].
    pub provider_name: Option<String>,

    /// Pre-constructed LLM provider. Takes precedence over `provider_name`.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// Sampling temperature. Default: 0.7.
    pub temperature: f32,

    /// Maximum completion tokens for the three generated tests. Default: 1500.
    pub max_tokens: usize,

    /// Per-generation-call timeout in seconds. Default: 60.
    pub api_timeout_secs: u64,

    /// Pinata API root, without trailing slash. Default: [`DEFAULT_PINATA_API_URL`].
    pub pinata_api_url: String,

    /// Pinata credentials. Absence is reported when a pin is attempted.
    pub pinata_credentials: Option<PinataCredentials>,

    /// Per-pin-request timeout in seconds. Default: 120.
    pub pin_timeout_secs: u64,

    /// Largest accepted request body in bytes. Default: 20 MiB.
    pub max_upload_bytes: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            model: None,
            provider_name: None,
            provider: None,
            temperature: 0.7,
            max_tokens: 1500,
            api_timeout_secs: 60,
            pinata_api_url: DEFAULT_PINATA_API_URL.to_string(),
            pinata_credentials: None,
            pin_timeout_secs: 120,
            max_upload_bytes: 20 * 1024 * 1024,
        }
    }
}

impl fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("pinata_api_url", &self.pinata_api_url)
            .field("pinata_credentials", &self.pinata_credentials)
            .field("pin_timeout_secs", &self.pin_timeout_secs)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .finish()
    }
}

impl ServiceConfig {
    /// Create a new builder for `ServiceConfig`.
    pub fn builder() -> ServiceConfigBuilder {
        ServiceConfigBuilder {
            config: Self::default(),
        }
    }

    /// Model to request, falling back to [`DEFAULT_MODEL`].
    pub fn model_or_default(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_MODEL)
    }

    /// Provider to create, falling back to [`DEFAULT_PROVIDER`].
    pub fn provider_name_or_default(&self) -> &str {
        self.provider_name.as_deref().unwrap_or(DEFAULT_PROVIDER)
    }
}

/// Builder for [`ServiceConfig`].
#[derive(Debug)]
pub struct ServiceConfigBuilder {
    config: ServiceConfig,
}

impl ServiceConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn pinata_api_url(mut self, url: impl Into<String>) -> Self {
        self.config.pinata_api_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn pinata_credentials(mut self, credentials: PinataCredentials) -> Self {
        self.config.pinata_credentials = Some(credentials);
        self
    }

    pub fn pin_timeout_secs(mut self, secs: u64) -> Self {
        self.config.pin_timeout_secs = secs;
        self
    }

    pub fn max_upload_bytes(mut self, bytes: usize) -> Self {
        self.config.max_upload_bytes = bytes;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ServiceConfig, TestgenError> {
        let c = &self.config;
        if c.max_tokens == 0 {
            return Err(TestgenError::InvalidConfig(
                "max_tokens must be ≥ 1".into(),
            ));
        }
        if c.api_timeout_secs == 0 || c.pin_timeout_secs == 0 {
            return Err(TestgenError::InvalidConfig(
                "timeouts must be ≥ 1 second".into(),
            ));
        }
        if c.max_upload_bytes < 1024 {
            return Err(TestgenError::InvalidConfig(format!(
                "max_upload_bytes must be ≥ 1024, got {}",
                c.max_upload_bytes
            )));
        }
        if !c.pinata_api_url.starts_with("http://") && !c.pinata_api_url.starts_with("https://") {
            return Err(TestgenError::InvalidConfig(format!(
                "Pinata API URL must be http(s), got '{}'",
                c.pinata_api_url
            )));
        }
        Ok(self.config)
    }
}

// ── Credentials ──────────────────────────────────────────────────────────

/// How requests to Pinata are authenticated.
#[derive(Clone, PartialEq, Eq)]
pub enum PinataCredentials {
    /// Legacy key pair sent as `pinata_api_key` / `pinata_secret_api_key` headers.
    KeyPair { api_key: String, secret_api_key: String },
    /// Scoped JWT sent as `Authorization: Bearer <jwt>`.
    Jwt(String),
}

impl PinataCredentials {
    pub fn key_pair(api_key: impl Into<String>, secret_api_key: impl Into<String>) -> Self {
        PinataCredentials::KeyPair {
            api_key: api_key.into(),
            secret_api_key: secret_api_key.into(),
        }
    }

    pub fn jwt(token: impl Into<String>) -> Self {
        PinataCredentials::Jwt(token.into())
    }

    /// Pick credentials from optional settings. A non-empty JWT wins; a key
    /// pair is used only when both halves are non-empty.
    pub fn from_parts(
        api_key: Option<String>,
        secret_api_key: Option<String>,
        jwt: Option<String>,
    ) -> Option<Self> {
        let non_empty = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        if let Some(token) = non_empty(jwt) {
            return Some(PinataCredentials::Jwt(token));
        }
        match (non_empty(api_key), non_empty(secret_api_key)) {
            (Some(api_key), Some(secret_api_key)) => Some(PinataCredentials::KeyPair {
                api_key,
                secret_api_key,
            }),
            _ => None,
        }
    }
}

impl fmt::Debug for PinataCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PinataCredentials::KeyPair { .. } => f.write_str("KeyPair(<redacted>)"),
            PinataCredentials::Jwt(_) => f.write_str("Jwt(<redacted>)"),
        }
    }
}
