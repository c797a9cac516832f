#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{
    net::SocketAddr,
    sync::{Arc, Mutex, OnceLock},
};

use anyhow::{Context, Result};
use async_openai::types::{ImageDetail, ReasoningEffort};
use reqwest::Client;

use crate::{error::GradeError, usage::Pricing};

/// Endpoint used when `OPENAI_ENDPOINT` is unset.
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
/// Vision-capable model used when `OPENAI_MODEL` is unset.
pub const DEFAULT_MODEL: &str = "o4-mini-2025-04-16";
/// Address the form is served on when neither `--bind` nor
/// `ESSAY_GRADER_BIND` is given.
pub const DEFAULT_BIND: &str = "127.0.0.1:8501";

/// The one variable that must be set.
const API_KEY_VAR: &str = "OPENAI_API_KEY";

/// Parses the optional reasoning-effort value into the OpenAI enum. Unset or
/// unrecognised values leave the field off the request, since non-reasoning
/// models reject it.
fn parse_reasoning_effort(val: Option<String>) -> Option<ReasoningEffort> {
    match val?.trim().to_ascii_lowercase().as_str() {
        "low" => Some(ReasoningEffort::Low),
        "medium" => Some(ReasoningEffort::Medium),
        "high" => Some(ReasoningEffort::High),
        _ => None,
    }
}

/// Parses the optional image-detail hint, defaulting to `auto`.
fn parse_image_detail(val: Option<String>) -> ImageDetail {
    match val
        .map(|s| s.trim().to_ascii_lowercase())
        .as_deref()
        .unwrap_or("auto")
    {
        "low" => ImageDetail::Low,
        "high" => ImageDetail::High,
        _ => ImageDetail::Auto,
    }
}

/// Returns the trimmed value of `key`, treating blank values as unset.
fn non_blank<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

/// OpenAI credentials and optional tuning parameters sourced from the
/// environment.
#[derive(Clone, Debug)]
pub struct OpenAiEnv {
    /// Base URL for the OpenAI-compatible API endpoint.
    api_base:         String,
    /// API key used to authenticate requests.
    api_key:          String,
    /// Model identifier for chat completions.
    model:            String,
    /// Optional temperature override.
    temperature:      Option<f32>,
    /// Optional top-p override.
    top_p:            Option<f32>,
    /// Reasoning effort hint, sent only when configured.
    reasoning_effort: Option<ReasoningEffort>,
    /// Resolution hint for the essay image.
    image_detail:     ImageDetail,
}

impl OpenAiEnv {
    /// Builds the OpenAI settings from a variable lookup. Only the API key is
    /// required; everything else has a default.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, GradeError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key =
            non_blank(&lookup, API_KEY_VAR).ok_or(GradeError::MissingConfig(API_KEY_VAR))?;
        let api_base = non_blank(&lookup, "OPENAI_ENDPOINT")
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
            .trim_end_matches('/')
            .to_owned();
        let model = non_blank(&lookup, "OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let temperature =
            non_blank(&lookup, "OPENAI_TEMPERATURE").and_then(|s| s.parse::<f32>().ok());
        let top_p = non_blank(&lookup, "OPENAI_TOP_P").and_then(|s| s.parse::<f32>().ok());
        let reasoning_effort = parse_reasoning_effort(lookup("OPENAI_REASONING_EFFORT"));
        let image_detail = parse_image_detail(lookup("OPENAI_IMAGE_DETAIL"));

        Ok(Self {
            api_base,
            api_key,
            model,
            temperature,
            top_p,
            reasoning_effort,
            image_detail,
        })
    }

    /// Returns the API base URL.
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Returns the API key.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Returns the model identifier.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Returns the configured temperature, if any.
    pub fn temperature(&self) -> Option<f32> {
        self.temperature
    }

    /// Returns the configured top_p, if any.
    pub fn top_p(&self) -> Option<f32> {
        self.top_p
    }

    /// Returns the reasoning effort, if configured.
    pub fn reasoning_effort(&self) -> Option<ReasoningEffort> {
        self.reasoning_effort.clone()
    }

    /// Returns the image detail hint.
    pub fn image_detail(&self) -> ImageDetail {
        self.image_detail.clone()
    }
}

/// Runtime configuration shared across the crate.
pub struct ConfigState {
    /// OpenAI settings; `None` when the API key is missing.
    openai:      Option<OpenAiEnv>,
    /// Shared reqwest HTTP client reused for every API call.
    http_client: Client,
    /// Token prices used for the cost summary.
    pricing:     Pricing,
    /// Address the web form listens on.
    bind:        String,
}

impl ConfigState {
    /// Builds a configuration from a variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let http_client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to construct shared HTTP client")?;

        let defaults = Pricing::default();
        let pricing = Pricing::new(
            read_price(&lookup, "ESSAY_GRADER_INPUT_PRICE", defaults.input_per_million()),
            read_price(&lookup, "ESSAY_GRADER_OUTPUT_PRICE", defaults.output_per_million()),
        );

        let bind = non_blank(&lookup, "ESSAY_GRADER_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string());

        Ok(Self {
            openai: OpenAiEnv::from_lookup(&lookup).ok(),
            http_client,
            pricing,
            bind,
        })
    }

    /// Returns the OpenAI settings, or `MissingConfig` for the API key.
    pub fn openai(&self) -> Result<&OpenAiEnv, GradeError> {
        self.openai
            .as_ref()
            .ok_or(GradeError::MissingConfig(API_KEY_VAR))
    }

    /// Returns a clone of the shared reqwest HTTP client.
    pub fn http_client(&self) -> Client {
        self.http_client.clone()
    }

    /// Returns the token prices.
    pub fn pricing(&self) -> Pricing {
        self.pricing
    }

    /// Parses the configured bind address.
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        self.bind
            .parse()
            .with_context(|| format!("`{}` is not a valid socket address", self.bind))
    }
}

/// Shared configuration handle used throughout the crate.
#[derive(Clone)]
pub struct ConfigHandle(Arc<ConfigState>);

impl ConfigHandle {
    /// Wraps a configuration built elsewhere, e.g. in tests.
    pub fn new(state: ConfigState) -> Self {
        Self(Arc::new(state))
    }
}

impl std::ops::Deref for ConfigHandle {
    type Target = ConfigState;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Global storage for the lazily constructed configuration state.
static CONFIG_SLOT: OnceLock<Mutex<Option<Arc<ConfigState>>>> = OnceLock::new();

/// Returns the mutex guarding the global configuration slot.
fn slot() -> &'static Mutex<Option<Arc<ConfigState>>> {
    CONFIG_SLOT.get_or_init(|| Mutex::new(None))
}

/// Ensure the global configuration has been initialized from the process
/// environment and return a handle.
pub fn ensure_initialized() -> Result<ConfigHandle> {
    let mut guard = slot().lock().expect("config slot poisoned");
    if let Some(cfg) = guard.as_ref() {
        return Ok(ConfigHandle(Arc::clone(cfg)));
    }

    let cfg = Arc::new(ConfigState::from_lookup(|key| std::env::var(key).ok())?);
    *guard = Some(Arc::clone(&cfg));
    Ok(ConfigHandle(cfg))
}

/// Returns the configured OpenAI settings, failing fast when the API key is
/// missing.
pub fn openai_config() -> Result<OpenAiEnv> {
    let handle = ensure_initialized()?;
    Ok(handle.openai()?.clone())
}

/// Parses a USD-per-million-tokens price, falling back to `default` when the
/// variable is missing, unparsable, or negative.
fn read_price<F>(lookup: &F, key: &str, default: f64) -> f64
where
    F: Fn(&str) -> Option<String>,
{
    non_blank(lookup, key)
        .and_then(|value| value.parse::<f64>().ok())
        .filter(|price| price.is_finite() && *price >= 0.0)
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn missing_api_key_fails_fast() {
        let err = OpenAiEnv::from_lookup(lookup(&[("OPENAI_MODEL", "gpt-4o")])).unwrap_err();
        assert!(matches!(err, GradeError::MissingConfig("OPENAI_API_KEY")));

        let err = OpenAiEnv::from_lookup(lookup(&[("OPENAI_API_KEY", "   ")])).unwrap_err();
        assert!(matches!(err, GradeError::MissingConfig("OPENAI_API_KEY")));
    }

    #[test]
    fn defaults_fill_in_optional_values() {
        let env = OpenAiEnv::from_lookup(lookup(&[("OPENAI_API_KEY", "sk-test")])).unwrap();
        assert_eq!(env.api_key(), "sk-test");
        assert_eq!(env.api_base(), DEFAULT_API_BASE);
        assert_eq!(env.model(), DEFAULT_MODEL);
        assert_eq!(env.temperature(), None);
        assert!(env.reasoning_effort().is_none());
        assert!(matches!(env.image_detail(), ImageDetail::Auto));
    }

    #[test]
    fn overrides_are_trimmed_and_parsed() {
        let env = OpenAiEnv::from_lookup(lookup(&[
            ("OPENAI_API_KEY", " sk-test \n"),
            ("OPENAI_ENDPOINT", "http://localhost:8080/v1/"),
            ("OPENAI_MODEL", "gpt-4o"),
            ("OPENAI_TEMPERATURE", "0.2"),
            ("OPENAI_TOP_P", "not-a-number"),
            ("OPENAI_REASONING_EFFORT", "HIGH"),
            ("OPENAI_IMAGE_DETAIL", "high"),
        ]))
        .unwrap();
        assert_eq!(env.api_key(), "sk-test");
        assert_eq!(env.api_base(), "http://localhost:8080/v1");
        assert_eq!(env.model(), "gpt-4o");
        assert_eq!(env.temperature(), Some(0.2));
        assert_eq!(env.top_p(), None);
        assert!(matches!(env.reasoning_effort(), Some(ReasoningEffort::High)));
        assert!(matches!(env.image_detail(), ImageDetail::High));
    }

    #[test]
    fn state_reads_pricing_and_bind() {
        let state = ConfigState::from_lookup(lookup(&[
            ("ESSAY_GRADER_INPUT_PRICE", "2.5"),
            ("ESSAY_GRADER_OUTPUT_PRICE", "-1"),
            ("ESSAY_GRADER_BIND", "0.0.0.0:9000"),
        ]))
        .unwrap();
        assert!(matches!(state.openai(), Err(GradeError::MissingConfig("OPENAI_API_KEY"))));
        assert_eq!(state.pricing().input_per_million(), 2.5);
        assert_eq!(state.pricing().output_per_million(), Pricing::default().output_per_million());
        assert_eq!(state.bind_addr().unwrap().port(), 9000);
    }
}
