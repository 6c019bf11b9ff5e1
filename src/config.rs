use crate::chunker::{DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE};
use crate::error::{Error, Result};
use tracing::debug;

const DEFAULT_TIMEOUT_SECS: u64 = 60;
const DEFAULT_SUMMARY_COUNT: usize = 5;
const BASE_URL_ENV: &str = "LLM_BASE_URL";

/// Hosted chat-completion provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    /// Groq's OpenAI-compatible endpoint
    Groq,
    /// OpenAI
    OpenAi,
}

impl Provider {
    /// Returns the default API base URL for this provider.
    #[must_use]
    pub const fn base_url(self) -> &'static str {
        match self {
            Self::Groq => "https://api.groq.com/openai/v1",
            Self::OpenAi => "https://api.openai.com/v1",
        }
    }

    /// Returns the environment variable holding this provider's API key.
    #[must_use]
    pub const fn api_key_var(self) -> &'static str {
        match self {
            Self::Groq => "GROQ_API_KEY",
            Self::OpenAi => "OPENAI_API_KEY",
        }
    }
}

/// Resolved connection settings for one provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Provider being called
    pub provider: Provider,
    /// API base URL without trailing slash
    pub base_url: String,
    /// Bearer token
    pub api_key: String,
}

/// Configuration shared by every assistant.
///
/// Use [`Config::builder()`] to construct a new configuration, or
/// [`Config::from_env()`] to pick up API keys from the environment.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct Config {
    /// Forces every task onto this provider instead of its preset's
    pub provider: Option<Provider>,

    /// Explicit API key, used for whichever provider is called
    pub api_key: Option<String>,

    /// Groq API key found in the environment
    pub groq_api_key: Option<String>,

    /// OpenAI API key found in the environment
    pub openai_api_key: Option<String>,

    /// Overrides the provider's base URL
    pub base_url: Option<String>,

    /// Overrides the model id of every preset
    pub model: Option<String>,

    /// HTTP request timeout in seconds
    pub timeout_secs: u64,

    /// Chunk window size in words
    pub chunk_size: usize,

    /// Words shared by consecutive chunks
    pub chunk_overlap: usize,

    /// Bullet points / sentences requested per summary
    pub summary_count: usize,
}

impl Config {
    /// Creates a new configuration builder.
    ///
    /// # Examples
    ///
    /// ```
    /// use llm_assist::Config;
    ///
    /// let config = Config::builder()
    ///     .api_key("gsk_test")
    ///     .chunk_size(200)
    ///     .build()
    ///     .expect("valid configuration");
    /// ```
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Builds a default configuration from the environment (and `.env`).
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails.
    pub fn from_env() -> Result<Self> {
        ConfigBuilder::from_env().build()
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `chunk_size` is not greater than `chunk_overlap`
    /// - `timeout_secs` or `summary_count` is zero
    /// - `base_url` is not an http(s) URL
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size <= self.chunk_overlap {
            return Err(Error::invalid_chunk_configuration(
                self.chunk_size,
                self.chunk_overlap,
            ));
        }

        if self.timeout_secs == 0 {
            return Err(Error::config("timeout_secs must be greater than 0"));
        }

        if self.summary_count == 0 {
            return Err(Error::config("summary_count must be greater than 0"));
        }

        if let Some(ref url) = self.base_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(Error::config(format!(
                    "base_url must start with http:// or https://: {url}"
                )));
            }
        }

        if let Some(ref model) = self.model {
            if model.trim().is_empty() {
                return Err(Error::config("model must not be empty"));
            }
        }

        Ok(())
    }

    /// Resolves the endpoint for a task whose preset prefers `default_provider`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingApiKey`] if no key is known for the provider.
    pub fn endpoint(&self, default_provider: Provider) -> Result<Endpoint> {
        let provider = self.provider.unwrap_or(default_provider);

        let env_key = match provider {
            Provider::Groq => self.groq_api_key.as_ref(),
            Provider::OpenAi => self.openai_api_key.as_ref(),
        };

        let not_blank = |key: &&String| !key.trim().is_empty();
        let api_key = self
            .api_key
            .as_ref()
            .filter(not_blank)
            .or_else(|| env_key.filter(not_blank))
            .cloned()
            .ok_or_else(|| Error::MissingApiKey {
                var: provider.api_key_var().to_string(),
            })?;

        let base_url = self
            .base_url
            .as_deref()
            .unwrap_or_else(|| provider.base_url())
            .trim_end_matches('/')
            .to_string();

        Ok(Endpoint {
            provider,
            base_url,
            api_key,
        })
    }

    /// Returns a copy of this configuration that uses `key` for every provider.
    #[must_use]
    pub fn with_api_key(&self, key: impl Into<String>) -> Self {
        Self {
            api_key: Some(key.into()),
            ..self.clone()
        }
    }

    /// Returns `preset_model` unless a model override is configured.
    #[must_use]
    pub fn model_or<'a>(&'a self, preset_model: &'a str) -> &'a str {
        self.model.as_deref().unwrap_or(preset_model)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: None,
            api_key: None,
            groq_api_key: None,
            openai_api_key: None,
            base_url: None,
            model: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            summary_count: DEFAULT_SUMMARY_COUNT,
        }
    }
}

/// Builder for creating a [`Config`].
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    provider: Option<Provider>,
    api_key: Option<String>,
    groq_api_key: Option<String>,
    openai_api_key: Option<String>,
    base_url: Option<String>,
    model: Option<String>,
    timeout_secs: Option<u64>,
    chunk_size: Option<usize>,
    chunk_overlap: Option<usize>,
    summary_count: Option<usize>,
}

impl ConfigBuilder {
    /// Creates a builder seeded from the process environment.
    ///
    /// Loads a `.env` file from the working directory first, if present.
    #[must_use]
    pub fn from_env() -> Self {
        if let Ok(path) = dotenv::dotenv() {
            debug!("Loaded environment from {}", path.display());
        }

        Self {
            groq_api_key: std::env::var(Provider::Groq.api_key_var()).ok(),
            openai_api_key: std::env::var(Provider::OpenAi.api_key_var()).ok(),
            base_url: std::env::var(BASE_URL_ENV).ok(),
            ..Self::default()
        }
    }

    /// Forces every task onto the given provider.
    #[must_use]
    pub fn provider(mut self, provider: Provider) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Sets an explicit API key.
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the Groq API key.
    #[must_use]
    pub fn groq_api_key(mut self, key: impl Into<String>) -> Self {
        self.groq_api_key = Some(key.into());
        self
    }

    /// Sets the OpenAI API key.
    #[must_use]
    pub fn openai_api_key(mut self, key: impl Into<String>) -> Self {
        self.openai_api_key = Some(key.into());
        self
    }

    /// Overrides the API base URL.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Overrides the model id of every preset.
    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Sets the HTTP timeout in seconds.
    #[must_use]
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Sets the chunk window size in words.
    #[must_use]
    pub fn chunk_size(mut self, words: usize) -> Self {
        self.chunk_size = Some(words);
        self
    }

    /// Sets the chunk overlap in words.
    #[must_use]
    pub fn chunk_overlap(mut self, words: usize) -> Self {
        self.chunk_overlap = Some(words);
        self
    }

    /// Sets the number of points or sentences per summary.
    #[must_use]
    pub fn summary_count(mut self, count: usize) -> Self {
        self.summary_count = Some(count);
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails.
    pub fn build(self) -> Result<Config> {
        let config = Config {
            provider: self.provider,
            api_key: self.api_key,
            groq_api_key: self.groq_api_key,
            openai_api_key: self.openai_api_key,
            base_url: self.base_url,
            model: self.model,
            timeout_secs: self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
            chunk_size: self.chunk_size.unwrap_or(DEFAULT_CHUNK_SIZE),
            chunk_overlap: self.chunk_overlap.unwrap_or(DEFAULT_CHUNK_OVERLAP),
            summary_count: self.summary_count.unwrap_or(DEFAULT_SUMMARY_COUNT),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::builder().build().unwrap();

        assert_eq!(config.chunk_size, DEFAULT_CHUNK_SIZE);
        assert_eq!(config.chunk_overlap, DEFAULT_CHUNK_OVERLAP);
        assert_eq!(config.summary_count, DEFAULT_SUMMARY_COUNT);
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_invalid_chunk_limits() {
        let result = Config::builder().chunk_size(50).chunk_overlap(50).build();
        assert!(matches!(
            result,
            Err(Error::InvalidChunkConfiguration {
                chunk_size: 50,
                overlap: 50
            })
        ));
    }

    #[test]
    fn test_invalid_timeout_and_count() {
        assert!(Config::builder().timeout_secs(0).build().is_err());
        assert!(Config::builder().summary_count(0).build().is_err());
    }

    #[test]
    fn test_invalid_base_url() {
        let result = Config::builder().base_url("api.groq.com").build();
        assert!(result.unwrap_err().is_config());
    }

    #[test]
    fn test_empty_model_rejected() {
        assert!(Config::builder().model("  ").build().is_err());
    }

    #[test]
    fn test_endpoint_uses_provider_key() {
        let config = Config::builder()
            .groq_api_key("gsk_1")
            .openai_api_key("sk_2")
            .build()
            .unwrap();

        let groq = config.endpoint(Provider::Groq).unwrap();
        assert_eq!(groq.api_key, "gsk_1");
        assert_eq!(groq.base_url, "https://api.groq.com/openai/v1");

        let openai = config.endpoint(Provider::OpenAi).unwrap();
        assert_eq!(openai.api_key, "sk_2");
        assert_eq!(openai.base_url, "https://api.openai.com/v1");
    }

    #[test]
    fn test_endpoint_overrides() {
        let config = Config::builder()
            .provider(Provider::Groq)
            .api_key("explicit")
            .openai_api_key("sk_2")
            .base_url("http://localhost:8080/v1/")
            .build()
            .unwrap();

        let endpoint = config.endpoint(Provider::OpenAi).unwrap();
        assert_eq!(endpoint.provider, Provider::Groq);
        assert_eq!(endpoint.api_key, "explicit");
        assert_eq!(endpoint.base_url, "http://localhost:8080/v1");
    }

    #[test]
    fn test_missing_api_key() {
        let config = Config::builder().groq_api_key("   ").build().unwrap();
        let err = config.endpoint(Provider::Groq).unwrap_err();

        assert!(matches!(err, Error::MissingApiKey { ref var } if var == "GROQ_API_KEY"));
        assert!(err.is_config());
    }

    #[test]
    fn test_blank_explicit_key_falls_back_to_env_key() {
        let config = Config::builder()
            .api_key("")
            .groq_api_key("gsk_real")
            .build()
            .unwrap();

        assert_eq!(config.endpoint(Provider::Groq).unwrap().api_key, "gsk_real");
        assert!(config.endpoint(Provider::OpenAi).is_err());
    }

    #[test]
    fn test_with_api_key() {
        let config = Config::builder().chunk_size(120).build().unwrap();
        assert!(config.endpoint(Provider::Groq).is_err());

        let keyed = config.with_api_key("typed-in");
        assert_eq!(keyed.endpoint(Provider::Groq).unwrap().api_key, "typed-in");
        assert_eq!(keyed.chunk_size, 120);
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_model_override() {
        let config = Config::builder().build().unwrap();
        assert_eq!(config.model_or("llama-3.1-8b-instant"), "llama-3.1-8b-instant");

        let config = Config::builder().model("mixtral").build().unwrap();
        assert_eq!(config.model_or("llama-3.1-8b-instant"), "mixtral");
    }
}
