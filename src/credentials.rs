//! API credential providers.
//!
//! The query service asks a [`CredentialProvider`] for the key on every
//! request, so a key added to the environment or config after startup is
//! picked up without a rebuild. An empty string means "not configured".
//! How the key is stored (and whether it is encrypted at rest) is the
//! provider's business.

use regex::Regex;
use std::sync::LazyLock;

use crate::config::CredentialsConfig;

static KEY_FORMAT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^sk-ant-api\d+-[A-Za-z0-9_-]+$").expect("static regex"));

/// Supplies the language-model API key.
pub trait CredentialProvider: Send + Sync {
    /// The plaintext key, or an empty string when none is configured.
    fn get_api_key(&self) -> String;
}

/// Reads the key from an environment variable at call time.
pub struct EnvCredentialProvider {
    var: String,
}

impl EnvCredentialProvider {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl CredentialProvider for EnvCredentialProvider {
    fn get_api_key(&self) -> String {
        std::env::var(&self.var).unwrap_or_default()
    }
}

/// A fixed key, e.g. from `[credentials].api_key`.
pub struct StaticCredentialProvider {
    key: String,
}

impl StaticCredentialProvider {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl CredentialProvider for StaticCredentialProvider {
    fn get_api_key(&self) -> String {
        self.key.clone()
    }
}

/// Pick the provider for `[credentials]`: inline key first, then env var.
pub fn create_provider(config: &CredentialsConfig) -> Box<dyn CredentialProvider> {
    match config.api_key.as_deref() {
        Some(key) if !key.trim().is_empty() => Box::new(StaticCredentialProvider::new(key)),
        _ => Box::new(EnvCredentialProvider::new(config.api_key_env.clone())),
    }
}

/// Configuration state of a key, as reported by `sitebot status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyStatus {
    Missing,
    InvalidFormat,
    Ready,
}

/// Classify a key. The format check is advisory; requests are not gated on it.
pub fn key_status(key: &str) -> KeyStatus {
    let key = key.trim();
    if key.is_empty() {
        KeyStatus::Missing
    } else if !KEY_FORMAT.is_match(key) {
        KeyStatus::InvalidFormat
    } else {
        KeyStatus::Ready
    }
}
