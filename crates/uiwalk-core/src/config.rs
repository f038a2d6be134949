//! Configuration for recognition, generation and history settings.
//!
//! Load order: `.uiwalk/config.toml` → environment variables → defaults.

use crate::case::ReviewType;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level uiwalk configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UiwalkConfig {
    pub llm: LlmConfig,
    pub recognition: RecognitionConfig,
    pub generation: GenerationConfig,
    pub history: HistoryConfig,
}

/// Language model connection and request-size settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// `deepseek`, `openai` or `anthropic`.
    pub provider: String,
    /// Model name. The provider's default model is used when unset.
    pub model: Option<String>,
    /// Override for OpenAI-compatible endpoints.
    pub base_url: Option<String>,
    /// Falls back to the `<PROVIDER>_API_KEY` environment variable.
    pub api_key: Option<String>,
    pub temperature: f64,
    pub max_tokens: u32,
    /// Per-request timeout. Expiry is handled like any other call failure.
    pub timeout_secs: u64,
    /// Characters of document content forwarded per module.
    pub content_prefix_chars: usize,
    /// Characters of the review rules document embedded in prompts.
    pub rules_prefix_chars: usize,
    /// Characters of document content sent for module analysis.
    pub analysis_prefix_chars: usize,
    /// Review rules document, relative to the project root.
    pub rules_path: PathBuf,
}

/// Module recognition settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognitionConfig {
    pub max_modules: usize,
    /// Ask the model to segment the document when a provider is available.
    pub use_ai: bool,
}

/// Case generation settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub review_type: ReviewType,
    /// Generate modules concurrently. Output order is unaffected.
    pub parallel: bool,
}

/// Run history settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub max_entries: usize,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "deepseek".to_string(),
            model: None,
            base_url: None,
            api_key: None,
            temperature: 0.3,
            max_tokens: 4096,
            timeout_secs: 60,
            content_prefix_chars: 1500,
            rules_prefix_chars: 3000,
            analysis_prefix_chars: 3000,
            rules_path: PathBuf::from(".uiwalk").join("review-rules.md"),
        }
    }
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            max_modules: 50,
            use_ai: true,
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { max_entries: 50 }
    }
}

impl LlmConfig {
    /// The configured API key, or the provider's conventional environment variable.
    /// Empty keys and the placeholder `dummy` count as absent.
    pub fn resolve_api_key(&self) -> Option<String> {
        let from_env = || {
            let var = format!("{}_API_KEY", self.provider.to_ascii_uppercase());
            std::env::var(var).ok()
        };
        self.api_key
            .clone()
            .or_else(from_env)
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty() && k != "dummy")
    }
}

/// Helper to parse an env var and apply it to a config field.
fn env_override<T: std::str::FromStr>(var: &str, target: &mut T) {
    if let Ok(v) = std::env::var(var)
        && let Ok(n) = v.parse()
    {
        *target = n;
    }
}

fn env_override_opt(var: &str, target: &mut Option<String>) {
    if let Ok(v) = std::env::var(var)
        && !v.trim().is_empty()
    {
        *target = Some(v.trim().to_string());
    }
}

impl UiwalkConfig {
    /// Load config from `.uiwalk/config.toml` in the project root, with env var overrides.
    /// Falls back to defaults if no config file exists.
    pub fn load(project_root: &Path) -> Result<Self> {
        let config_path = crate::storage::uiwalk_dir(project_root).join("config.toml");

        let mut config: Self = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .with_context(|| format!("failed to read {}", config_path.display()))?;
            toml::from_str(&content)
                .with_context(|| format!("invalid config in {}", config_path.display()))?
        } else {
            Self::default()
        };

        env_override("UIWALK_PROVIDER", &mut config.llm.provider);
        env_override_opt("UIWALK_MODEL", &mut config.llm.model);
        env_override_opt("UIWALK_BASE_URL", &mut config.llm.base_url);
        env_override("UIWALK_TEMPERATURE", &mut config.llm.temperature);
        env_override("UIWALK_TIMEOUT_SECS", &mut config.llm.timeout_secs);
        env_override("UIWALK_MAX_MODULES", &mut config.recognition.max_modules);
        env_override("UIWALK_PARALLEL", &mut config.generation.parallel);

        config.llm.provider = config.llm.provider.trim().to_lowercase();
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            anyhow::bail!(
                "llm.temperature ({}) must be between 0.0 and 2.0",
                self.llm.temperature
            );
        }
        if self.llm.timeout_secs == 0 {
            anyhow::bail!("llm.timeout_secs must be greater than zero");
        }
        if self.recognition.max_modules == 0 {
            anyhow::bail!("recognition.max_modules must be greater than zero");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = UiwalkConfig::default();
        assert_eq!(config.llm.provider, "deepseek");
        assert_eq!(config.llm.temperature, 0.3);
        assert_eq!(config.llm.timeout_secs, 60);
        assert_eq!(config.llm.content_prefix_chars, 1500);
        assert_eq!(config.llm.rules_prefix_chars, 3000);
        assert_eq!(config.recognition.max_modules, 50);
        assert!(config.recognition.use_ai);
        assert_eq!(config.generation.review_type, ReviewType::Standard);
        assert!(!config.generation.parallel);
        assert_eq!(config.history.max_entries, 50);
    }

    #[test]
    fn test_config_from_toml() {
        let toml_str = r#"
[llm]
provider = "openai"
model = "gpt-4o-mini"
content_prefix_chars = 800

[generation]
review_type = "competitive"
parallel = true
"#;
        let config: UiwalkConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.llm.provider, "openai");
        assert_eq!(config.llm.model.as_deref(), Some("gpt-4o-mini"));
        assert_eq!(config.llm.content_prefix_chars, 800);
        assert_eq!(config.generation.review_type, ReviewType::Competitive);
        assert!(config.generation.parallel);
        // Defaults for unspecified fields
        assert_eq!(config.llm.rules_prefix_chars, 3000);
        assert_eq!(config.recognition.max_modules, 50);
    }

    #[test]
    fn test_config_load_nonexistent() {
        let config = UiwalkConfig::load(Path::new("/nonexistent/path")).unwrap();
        assert_eq!(config.history.max_entries, 50);
    }

    #[test]
    fn test_load_rejects_out_of_range_temperature() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join(".uiwalk");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("config.toml"), "[llm]\ntemperature = 3.5\n").unwrap();

        let err = UiwalkConfig::load(tmp.path()).unwrap_err();
        assert!(err.to_string().contains("temperature"));
    }

    #[test]
    fn test_validate_rejects_zero_module_cap() {
        let mut config = UiwalkConfig::default();
        config.recognition.max_modules = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_placeholder_api_key_counts_as_absent() {
        let mut llm = LlmConfig {
            provider: "uiwalk-test-provider".into(),
            ..LlmConfig::default()
        };
        llm.api_key = Some("dummy".into());
        assert_eq!(llm.resolve_api_key(), None);
        llm.api_key = Some("   ".into());
        assert_eq!(llm.resolve_api_key(), None);
        llm.api_key = Some(" sk-123 ".into());
        assert_eq!(llm.resolve_api_key().as_deref(), Some("sk-123"));
    }
}
