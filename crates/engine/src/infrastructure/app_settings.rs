//! Engine settings.
//!
//! Loaded from `TACTICIAN_*` environment variables (a `.env` file is honoured by
//! the binary), falling back to defaults for anything missing or unparseable.
//! Backend model/endpoint/credential values are opaque here and handed to the
//! transport adapter verbatim.
//!
//! Description generation and turn recommendation each get their own backend,
//! read from `TACTICIAN_CACHE_LLM_*` and `TACTICIAN_COMBAT_LLM_*`. A role key
//! that is unset falls back to the shared `TACTICIAN_LLM_*` key, then to the
//! role's default.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use tactician_domain::{clamp_recommendation_count, Difficulty, DomainError};

/// Which text-generation API to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProvider {
    /// OpenAI chat completions.
    OpenAi,
    /// A local server: OpenAI-compatible endpoint first, Ollama's native API second.
    Ollama,
    Anthropic,
    Gemini,
}

impl LlmProvider {
    pub fn default_base_url(&self) -> &'static str {
        match self {
            Self::OpenAi => "https://api.openai.com",
            Self::Ollama => "http://localhost:11434",
            Self::Anthropic => "https://api.anthropic.com",
            Self::Gemini => "https://generativelanguage.googleapis.com/v1beta",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Self::OpenAi => "gpt-4o-mini",
            Self::Ollama => "llama3.2",
            Self::Anthropic => "claude-3-5-haiku-latest",
            Self::Gemini => "gemini-1.5-flash",
        }
    }

    /// Remote providers refuse requests without a key.
    pub fn requires_api_key(&self) -> bool {
        !matches!(self, Self::Ollama)
    }
}

impl fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::OpenAi => "openai",
            Self::Ollama => "ollama",
            Self::Anthropic => "anthropic",
            Self::Gemini => "gemini",
        };
        f.write_str(name)
    }
}

impl FromStr for LlmProvider {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "ollama" | "local" => Ok(Self::Ollama),
            "anthropic" | "claude" => Ok(Self::Anthropic),
            "gemini" | "google" => Ok(Self::Gemini),
            other => Err(DomainError::parse(format!("Unknown LLM provider: {}", other))),
        }
    }
}

/// How hard a reasoning model should think. Only OpenAI receives it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReasoningEffort {
    Low,
    Medium,
    High,
}

impl ReasoningEffort {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for ReasoningEffort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReasoningEffort {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(DomainError::parse(format!("Unknown reasoning effort: {}", other))),
        }
    }
}

/// The two jobs a text-generation backend is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmRole {
    /// Condensing item descriptions for the action cache.
    ActionCache,
    /// Per-turn tactical recommendations.
    Combat,
}

impl LlmRole {
    /// Prefix of this role's environment keys.
    pub fn env_prefix(&self) -> &'static str {
        match self {
            Self::ActionCache => "TACTICIAN_CACHE_LLM",
            Self::Combat => "TACTICIAN_COMBAT_LLM",
        }
    }

    /// Cheap local model for bulk descriptions, a hosted one for tactics.
    pub fn default_settings(&self) -> LlmSettings {
        match self {
            Self::ActionCache => LlmSettings {
                max_tokens: 1000,
                ..LlmSettings::for_provider(LlmProvider::Ollama)
            },
            Self::Combat => LlmSettings {
                max_tokens: 2000,
                ..LlmSettings::for_provider(LlmProvider::OpenAi)
            },
        }
    }
}

impl fmt::Display for LlmRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ActionCache => "action cache",
            Self::Combat => "combat",
        })
    }
}

/// Backend selection, passed through to the transport adapter.
#[derive(Debug, Clone, PartialEq)]
pub struct LlmSettings {
    pub provider: LlmProvider,
    pub model: String,
    pub base_url: String,
    pub api_key: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub reasoning_effort: Option<ReasoningEffort>,
    /// Advisory request timeout; only the HTTP client enforces it.
    pub request_timeout: Duration,
}

impl LlmSettings {
    pub fn for_provider(provider: LlmProvider) -> Self {
        Self {
            provider,
            model: provider.default_model().to_string(),
            base_url: provider.default_base_url().to_string(),
            api_key: None,
            temperature: 0.7,
            max_tokens: 1500,
            reasoning_effort: None,
            request_timeout: Duration::from_secs(60),
        }
    }

    /// Read one role's backend. `env_or` already drops blank values.
    fn load(role: LlmRole, env_or: &dyn Fn(&str) -> Option<String>) -> Self {
        let prefix = role.env_prefix();
        let key = |name: &str| {
            env_or(&format!("{}_{}", prefix, name))
                .or_else(|| env_or(&format!("TACTICIAN_LLM_{}", name)))
        };
        let role_defaults = role.default_settings();

        let provider = key("PROVIDER")
            .and_then(|v| match v.parse::<LlmProvider>() {
                Ok(provider) => Some(provider),
                Err(e) => {
                    tracing::warn!(error = %e, role = %role, "Ignoring LLM provider");
                    None
                }
            })
            .unwrap_or(role_defaults.provider);
        let defaults = if provider == role_defaults.provider {
            role_defaults
        } else {
            LlmSettings::for_provider(provider)
        };

        let reasoning_effort =
            key("REASONING_EFFORT").and_then(|v| match v.parse::<ReasoningEffort>() {
                Ok(effort) => Some(effort),
                Err(e) => {
                    tracing::warn!(error = %e, role = %role, "Ignoring reasoning effort");
                    None
                }
            });

        Self {
            provider,
            model: key("MODEL").unwrap_or(defaults.model),
            base_url: key("BASE_URL").unwrap_or(defaults.base_url),
            api_key: key("API_KEY"),
            temperature: parse_or(key("TEMPERATURE"), defaults.temperature),
            max_tokens: parse_or(key("MAX_TOKENS"), defaults.max_tokens),
            reasoning_effort: reasoning_effort.or(defaults.reasoning_effort),
            request_timeout: Duration::from_secs(parse_or(
                env_or("TACTICIAN_REQUEST_TIMEOUT_SECS"),
                defaults.request_timeout.as_secs(),
            )),
        }
    }
}

/// All configurable engine settings
#[derive(Debug, Clone, PartialEq)]
pub struct TacticianSettings {
    /// Freshness window of the action description cache
    pub cache_ttl: Duration,
    /// Recommendations requested per activation category (1-5)
    pub recommendation_count: usize,
    pub difficulty: Difficulty,
    /// Default log level for the engine's own targets becomes `debug`
    pub debug_logging: bool,
    /// How many recent log entries are shown to the recommender
    pub recent_action_limit: usize,
    /// JSON encounter snapshot read by the binary
    pub encounter_path: Option<String>,
    /// Backend that condenses item descriptions
    pub cache_llm: LlmSettings,
    /// Backend that recommends turns
    pub combat_llm: LlmSettings,
}

impl Default for TacticianSettings {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(60 * 60),
            recommendation_count: 3,
            difficulty: Difficulty::Normal,
            debug_logging: false,
            recent_action_limit: 5,
            encounter_path: None,
            cache_llm: LlmRole::ActionCache.default_settings(),
            combat_llm: LlmRole::Combat.default_settings(),
        }
    }
}

impl TacticianSettings {
    /// Load from environment variables, using defaults for missing values
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from any key/value source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let env_or = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let difficulty = env_or("TACTICIAN_DIFFICULTY")
            .and_then(|v| match v.parse::<Difficulty>() {
                Ok(difficulty) => Some(difficulty),
                Err(e) => {
                    tracing::warn!(error = %e, "Ignoring TACTICIAN_DIFFICULTY");
                    None
                }
            })
            .unwrap_or(defaults.difficulty);

        Self {
            cache_ttl: Duration::from_secs(parse_or(
                env_or("TACTICIAN_CACHE_TTL_SECS"),
                defaults.cache_ttl.as_secs(),
            )),
            recommendation_count: clamp_recommendation_count(parse_or(
                env_or("TACTICIAN_RECOMMENDATION_COUNT"),
                defaults.recommendation_count,
            )),
            difficulty,
            debug_logging: parse_or(env_or("TACTICIAN_DEBUG_LOGGING"), defaults.debug_logging),
            recent_action_limit: parse_or(
                env_or("TACTICIAN_RECENT_ACTION_LIMIT"),
                defaults.recent_action_limit,
            ),
            encounter_path: env_or("TACTICIAN_ENCOUNTER_PATH"),
            cache_llm: LlmSettings::load(LlmRole::ActionCache, &env_or),
            combat_llm: LlmSettings::load(LlmRole::Combat, &env_or),
        }
    }

    pub fn llm(&self, role: LlmRole) -> &LlmSettings {
        match role {
            LlmRole::ActionCache => &self.cache_llm,
            LlmRole::Combat => &self.combat_llm,
        }
    }

    /// Configuration problems worth telling the user about; empty when usable.
    pub fn issues(&self) -> Vec<String> {
        let mut issues = Vec::new();
        for role in [LlmRole::ActionCache, LlmRole::Combat] {
            let llm = self.llm(role);
            if llm.provider.requires_api_key() && llm.api_key.is_none() {
                issues.push(format!(
                    "{}: provider '{}' needs {}_API_KEY",
                    role,
                    llm.provider,
                    role.env_prefix()
                ));
            }
            if llm.base_url.trim().is_empty() {
                issues.push(format!("{}: endpoint URL is empty", role));
            }
        }
        issues
    }
}

fn parse_or<T: FromStr>(value: Option<String>, default: T) -> T {
    value.and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> TacticianSettings {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        TacticianSettings::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_when_nothing_set() {
        let settings = load(&[]);
        assert_eq!(settings, TacticianSettings::default());
        assert_eq!(settings.cache_ttl, Duration::from_secs(3600));
    }

    #[test]
    fn each_role_has_its_own_default_backend() {
        let settings = load(&[]);

        assert_eq!(settings.cache_llm.provider, LlmProvider::Ollama);
        assert_eq!(settings.cache_llm.model, "llama3.2");
        assert_eq!(settings.cache_llm.base_url, "http://localhost:11434");
        assert_eq!(settings.cache_llm.max_tokens, 1000);

        assert_eq!(settings.combat_llm.provider, LlmProvider::OpenAi);
        assert_eq!(settings.combat_llm.model, "gpt-4o-mini");
        assert_eq!(settings.combat_llm.max_tokens, 2000);
    }

    #[test]
    fn reads_overrides() {
        let settings = load(&[
            ("TACTICIAN_CACHE_TTL_SECS", "120"),
            ("TACTICIAN_DIFFICULTY", "Deadly"),
            ("TACTICIAN_DEBUG_LOGGING", "true"),
            ("TACTICIAN_COMBAT_LLM_PROVIDER", "anthropic"),
            ("TACTICIAN_COMBAT_LLM_API_KEY", "sk-test"),
        ]);

        assert_eq!(settings.cache_ttl, Duration::from_secs(120));
        assert_eq!(settings.difficulty, Difficulty::Deadly);
        assert!(settings.debug_logging);
        assert_eq!(settings.combat_llm.provider, LlmProvider::Anthropic);
        assert_eq!(settings.combat_llm.base_url, "https://api.anthropic.com");
        assert_eq!(settings.combat_llm.model, "claude-3-5-haiku-latest");
        assert_eq!(settings.combat_llm.api_key.as_deref(), Some("sk-test"));
        assert_eq!(settings.cache_llm, LlmRole::ActionCache.default_settings());
    }

    #[test]
    fn role_keys_are_independent() {
        let settings = load(&[
            ("TACTICIAN_CACHE_LLM_MODEL", "mistral"),
            ("TACTICIAN_CACHE_LLM_MAX_TOKENS", "800"),
            ("TACTICIAN_CACHE_LLM_REASONING_EFFORT", "low"),
            ("TACTICIAN_COMBAT_LLM_MODEL", "o3-mini"),
            ("TACTICIAN_COMBAT_LLM_REASONING_EFFORT", "High"),
        ]);

        assert_eq!(settings.cache_llm.model, "mistral");
        assert_eq!(settings.cache_llm.max_tokens, 800);
        assert_eq!(settings.cache_llm.reasoning_effort, Some(ReasoningEffort::Low));
        assert_eq!(settings.combat_llm.model, "o3-mini");
        assert_eq!(settings.combat_llm.max_tokens, 2000);
        assert_eq!(settings.combat_llm.reasoning_effort, Some(ReasoningEffort::High));
    }

    #[test]
    fn shared_keys_fill_in_for_both_roles() {
        let settings = load(&[
            ("TACTICIAN_LLM_PROVIDER", "gemini"),
            ("TACTICIAN_LLM_API_KEY", "shared"),
            ("TACTICIAN_COMBAT_LLM_API_KEY", "combat-only"),
        ]);

        assert_eq!(settings.cache_llm.provider, LlmProvider::Gemini);
        assert_eq!(settings.combat_llm.provider, LlmProvider::Gemini);
        assert_eq!(settings.cache_llm.api_key.as_deref(), Some("shared"));
        assert_eq!(settings.combat_llm.api_key.as_deref(), Some("combat-only"));
        assert_eq!(settings.cache_llm.model, "gemini-1.5-flash");
    }

    #[test]
    fn local_is_an_alias_for_ollama() {
        let settings = load(&[("TACTICIAN_COMBAT_LLM_PROVIDER", "local")]);
        assert_eq!(settings.combat_llm.provider, LlmProvider::Ollama);
        assert_eq!(settings.combat_llm.model, "llama3.2");
    }

    #[test]
    fn recommendation_count_is_clamped() {
        assert_eq!(load(&[("TACTICIAN_RECOMMENDATION_COUNT", "12")]).recommendation_count, 5);
        assert_eq!(load(&[("TACTICIAN_RECOMMENDATION_COUNT", "0")]).recommendation_count, 1);
    }

    #[test]
    fn invalid_values_fall_back_to_defaults() {
        let settings = load(&[
            ("TACTICIAN_CACHE_TTL_SECS", "soon"),
            ("TACTICIAN_DIFFICULTY", "heroic"),
            ("TACTICIAN_CACHE_LLM_PROVIDER", "skynet"),
            ("TACTICIAN_COMBAT_LLM_REASONING_EFFORT", "extreme"),
        ]);
        assert_eq!(settings.cache_ttl, Duration::from_secs(3600));
        assert_eq!(settings.difficulty, Difficulty::Normal);
        assert_eq!(settings.cache_llm.provider, LlmProvider::Ollama);
        assert!(settings.combat_llm.reasoning_effort.is_none());
    }

    #[test]
    fn tpk_difficulty_is_accepted() {
        assert_eq!(load(&[("TACTICIAN_DIFFICULTY", "tpk")]).difficulty, Difficulty::Tpk);
    }

    #[test]
    fn blank_api_key_is_none() {
        let settings = load(&[("TACTICIAN_COMBAT_LLM_API_KEY", "  ")]);
        assert!(settings.combat_llm.api_key.is_none());
    }

    #[test]
    fn missing_remote_key_is_reported_per_role() {
        let issues = load(&[]).issues();
        assert_eq!(
            issues,
            vec!["combat: provider 'openai' needs TACTICIAN_COMBAT_LLM_API_KEY".to_string()]
        );

        let configured = load(&[("TACTICIAN_COMBAT_LLM_API_KEY", "sk-test")]);
        assert!(configured.issues().is_empty());
    }
}
