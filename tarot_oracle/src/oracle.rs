//! The interpretation requester.
//!
//! [`Oracle::request_interpretation`] never fails: every outcome, including a
//! missing key or a dead connection, becomes display text in the reading's
//! locale.

use std::env;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tarot_deck::{DrawnCard, Locale, Spread};
use tracing::{info, warn};

use crate::gemini::{GeminiClient, DEFAULT_ENDPOINT, DEFAULT_MODEL};
use crate::generator::{GenerationError, TextGenerator};
use crate::prompt::ReadingPrompt;

/// Environment variables consulted for the key, first hit wins.
const KEY_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

// ════════════════════════════════════════════════════════════════════════════
// OracleConfig
// ════════════════════════════════════════════════════════════════════════════

/// The `[oracle]` section of the app config.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleConfig {
    pub api_key:      Option<String>,
    pub model:        String,
    pub endpoint:     String,
    pub temperature:  f32,
    pub top_p:        f32,
    pub timeout_secs: u64,
}

impl Default for OracleConfig {
    fn default() -> Self {
        OracleConfig {
            api_key:      None,
            model:        DEFAULT_MODEL.to_string(),
            endpoint:     DEFAULT_ENDPOINT.to_string(),
            temperature:  0.9,
            top_p:        0.9,
            timeout_secs: 60,
        }
    }
}

impl OracleConfig {
    /// Defaults plus whatever key the environment provides.
    pub fn from_env() -> Self {
        OracleConfig::default().with_env_overrides()
    }

    /// Replace the key with `GEMINI_API_KEY` or `API_KEY` when either is set
    /// and non-blank.
    pub fn with_env_overrides(self) -> Self {
        let found = KEY_VARS.iter()
            .filter_map(|name| env::var(name).ok())
            .find(|v| !v.trim().is_empty());
        self.with_key_override(found)
    }

    fn with_key_override(mut self, key: Option<String>) -> Self {
        if let Some(key) = key {
            self.api_key = Some(key);
        }
        self
    }

    /// True when a usable (non-blank) key is configured.
    pub fn has_credential(&self) -> bool {
        self.credential().is_some()
    }

    fn credential(&self) -> Option<&str> {
        self.api_key.as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// FailureText
// ════════════════════════════════════════════════════════════════════════════

/// The fixed strings shown in place of an interpretation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureText {
    MissingKey,
    Permission,
    Interrupted,
    Silent,
}

impl FailureText {
    pub fn text(self, locale: Locale) -> &'static str {
        match (self, locale) {
            (FailureText::MissingKey, Locale::Zh)  => "错误：缺少 API 密钥。",
            (FailureText::MissingKey, Locale::En)  => "Error: API key missing.",
            (FailureText::Permission, Locale::Zh)  => "神谕密钥无效或无权访问该模型。",
            (FailureText::Permission, Locale::En)  => "The oracle key is invalid or lacks permission for this model.",
            (FailureText::Interrupted, Locale::Zh) => "神秘连接中断了。",
            (FailureText::Interrupted, Locale::En) => "The mystical connection was interrupted.",
            (FailureText::Silent, Locale::Zh)      => "神灵保持沉默。",
            (FailureText::Silent, Locale::En)      => "The spirits are silent.",
        }
    }

    /// Which failure a generation error maps to.
    pub fn for_error(error: &GenerationError) -> FailureText {
        if error.is_permission() {
            FailureText::Permission
        } else {
            FailureText::Interrupted
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Reading
// ════════════════════════════════════════════════════════════════════════════

/// Everything the requester needs from a finished draw.
#[derive(Clone, Debug, PartialEq)]
pub struct Reading {
    pub question: String,
    pub spread:   Spread,
    pub cards:    Vec<DrawnCard>,
}

// ════════════════════════════════════════════════════════════════════════════
// Oracle
// ════════════════════════════════════════════════════════════════════════════

/// Stateless per call.  Cloning shares the underlying generator.
#[derive(Clone)]
pub struct Oracle {
    generator: Option<Arc<dyn TextGenerator>>,
}

impl fmt::Debug for Oracle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Oracle")
            .field("has_credential", &self.has_credential())
            .finish()
    }
}

impl Oracle {
    /// Build the production oracle.  A config without a key yields an oracle
    /// that answers every request with [`FailureText::MissingKey`].
    pub fn from_config(config: &OracleConfig) -> Result<Self, GenerationError> {
        let Some(key) = config.credential() else {
            warn!("no oracle API key configured");
            return Ok(Oracle::without_credential());
        };

        let client = GeminiClient::new(key, Duration::from_secs(config.timeout_secs))?
            .endpoint(&config.endpoint)
            .model(&config.model)
            .sampling(config.temperature, config.top_p);

        Ok(Oracle::with_generator(Arc::new(client)))
    }

    pub fn with_generator(generator: Arc<dyn TextGenerator>) -> Self {
        Oracle { generator: Some(generator) }
    }

    pub fn without_credential() -> Self {
        Oracle { generator: None }
    }

    pub fn has_credential(&self) -> bool {
        self.generator.is_some()
    }

    /// Ask for an interpretation of `drawn`.  Always returns display text.
    pub async fn request_interpretation(
        &self,
        question:    &str,
        spread_name: &str,
        drawn:       &[DrawnCard],
        locale:      Locale,
    ) -> String {
        let Some(generator) = &self.generator else {
            return FailureText::MissingKey.text(locale).to_string();
        };

        let prompt = ReadingPrompt::new(question)
            .spread_name(spread_name)
            .cards(drawn)
            .locale(locale)
            .build();

        info!(cards = drawn.len(), %locale, "requesting interpretation");

        match generator.generate(&prompt).await {
            Ok(text) if text.trim().is_empty() => {
                warn!("generator returned empty text");
                FailureText::Silent.text(locale).to_string()
            }
            Ok(text) => text,
            Err(e) => {
                let failure = FailureText::for_error(&e);
                warn!(error = %e, ?failure, "interpretation failed");
                failure.text(locale).to_string()
            }
        }
    }

    /// Convenience wrapper over a finished [`Reading`].
    pub async fn interpret(&self, reading: &Reading, locale: Locale) -> String {
        self.request_interpretation(
            &reading.question,
            reading.spread.name(locale),
            &reading.cards,
            locale,
        )
        .await
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
