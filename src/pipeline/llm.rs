//! Test generation: extracted text → three similar tests via an LLM.
//!
//! All prompt wording lives in [`crate::prompts`]; this module only builds
//! the request, applies the fixed sampling parameters and the call timeout,
//! and turns every failure into a [`GenerationError`]. A failed call never
//! yields text, so nothing downstream can mistake an error message for
//! generated content.

use crate::config::ServiceConfig;
use crate::error::GenerationError;
use crate::prompts::{similar_tests_prompt, SYSTEM_PROMPT};
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider, ProviderFactory};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Text returned by a successful generation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generated {
    pub text: String,
    pub input_tokens: usize,
    pub output_tokens: usize,
}

/// Produces new tests from the text of an existing one.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, source: &str) -> Result<Generated, GenerationError>;
}

/// [`Generator`] backed by an `edgequake-llm` provider.
pub struct LlmGenerator {
    provider: Arc<dyn LLMProvider>,
    options: CompletionOptions,
    timeout: Duration,
}

impl LlmGenerator {
    pub fn new(provider: Arc<dyn LLMProvider>, config: &ServiceConfig) -> Self {
        Self {
            provider,
            options: build_options(config),
            timeout: Duration::from_secs(config.api_timeout_secs),
        }
    }
}

#[async_trait]
impl Generator for LlmGenerator {
    async fn generate(&self, source: &str) -> Result<Generated, GenerationError> {
        let start = Instant::now();
        let messages = vec![
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user(similar_tests_prompt(source)),
        ];

        let response = within_timeout(
            self.timeout,
            self.provider.chat(&messages, Some(&self.options)),
        )
        .await?
        .map_err(|e| GenerationError::Provider {
            message: e.to_string(),
        })?;

        debug!(
            "Generation: {} input tokens, {} output tokens, {:?}",
            response.prompt_tokens,
            response.completion_tokens,
            start.elapsed()
        );

        let text = response.content.trim().to_string();
        if text.is_empty() {
            return Err(GenerationError::EmptyResponse);
        }
        Ok(Generated {
            text,
            input_tokens: response.prompt_tokens,
            output_tokens: response.completion_tokens,
        })
    }
}

/// Stand-in installed when no provider could be created at startup.
///
/// Startup proceeds; every generation call fails with
/// [`GenerationError::NotConfigured`].
#[derive(Debug, Clone)]
pub struct UnconfiguredGenerator {
    provider: String,
    hint: String,
}

impl UnconfiguredGenerator {
    pub fn new(provider: impl Into<String>, hint: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            hint: hint.into(),
        }
    }
}

#[async_trait]
impl Generator for UnconfiguredGenerator {
    async fn generate(&self, _source: &str) -> Result<Generated, GenerationError> {
        Err(GenerationError::NotConfigured {
            provider: self.provider.clone(),
            hint: self.hint.clone(),
        })
    }
}

/// Resolve the generator from configuration.
///
/// 1. **Pre-built provider** (`config.provider`) is used as-is.
/// 2. Otherwise the named provider and model are created through
///    [`ProviderFactory::create_llm_provider`], which reads the provider's
///    API key (`OPENAI_API_KEY`, ...) once, here.
///
/// A provider that cannot be created is logged and replaced by an
/// [`UnconfiguredGenerator`].
pub fn resolve_generator(config: &ServiceConfig) -> Arc<dyn Generator> {
    if let Some(ref provider) = config.provider {
        return Arc::new(LlmGenerator::new(Arc::clone(provider), config));
    }

    let name = config.provider_name_or_default();
    let model = config.model_or_default();
    match ProviderFactory::create_llm_provider(name, model) {
        Ok(provider) => {
            info!("Using LLM provider '{}' with model '{}'", name, model);
            Arc::new(LlmGenerator::new(provider, config))
        }
        Err(e) => {
            warn!(
                "LLM provider '{}' is not configured ({}); generation requests will fail until it is",
                name, e
            );
            Arc::new(UnconfiguredGenerator::new(name, e.to_string()))
        }
    }
}

/// Build `CompletionOptions` from the service config.
fn build_options(config: &ServiceConfig) -> CompletionOptions {
    CompletionOptions {
        temperature: Some(config.temperature),
        max_tokens: Some(config.max_tokens),
        ..Default::default()
    }
}

/// Await `fut`, giving up after `limit`.
async fn within_timeout<F: Future>(limit: Duration, fut: F) -> Result<F::Output, GenerationError> {
    tokio::time::timeout(limit, fut)
        .await
        .map_err(|_| GenerationError::Timeout {
            secs: limit.as_secs(),
        })
}
