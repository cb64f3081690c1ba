use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use sitebot_core::models::SiteInfo;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub site: SiteConfig,
    pub content: ContentConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub credentials: CredentialsConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SiteConfig {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub url: String,
}

impl SiteConfig {
    pub fn to_site_info(&self) -> SiteInfo {
        SiteInfo {
            name: self.name.clone(),
            description: self.description.clone(),
            home_url: self.url.clone(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ContentConfig {
    /// `json` (a content export file) or `filesystem` (a directory of pages).
    #[serde(default = "default_source")]
    pub source: String,
    pub path: PathBuf,
    /// Prefix joined with each page's relative path to form its URL
    /// (filesystem source only). Defaults to the site URL.
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_include_globs")]
    pub include_globs: Vec<String>,
    #[serde(default)]
    pub exclude_globs: Vec<String>,
    #[serde(default)]
    pub follow_symlinks: bool,
}

fn default_source() -> String {
    "json".to_string()
}

fn default_include_globs() -> Vec<String> {
    vec![
        "**/*.html".to_string(),
        "**/*.htm".to_string(),
        "**/*.md".to_string(),
        "**/*.txt".to_string(),
    ]
}

#[derive(Debug, Deserialize, Clone)]
pub struct LlmConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            api_version: default_api_version(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
            system_prompt: default_system_prompt(),
        }
    }
}

fn default_endpoint() -> String {
    "https://api.anthropic.com/v1/messages".to_string()
}
fn default_model() -> String {
    "claude-3-7-sonnet-20250219".to_string()
}
fn default_api_version() -> String {
    "2023-06-01".to_string()
}
fn default_temperature() -> f64 {
    0.7
}
fn default_max_tokens() -> u32 {
    4096
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_system_prompt() -> String {
    "You are a helpful website assistant. Use the provided content to answer questions. \
     If you can't find relevant information in the content, say so."
        .to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct CredentialsConfig {
    /// Environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// Inline API key. Takes precedence over `api_key_env` when set.
    #[serde(default)]
    pub api_key: Option<String>,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_api_key_env(),
            api_key: None,
        }
    }
}

fn default_api_key_env() -> String {
    "ANTHROPIC_API_KEY".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub bind: String,
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    validate(&config)?;

    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    if config.site.name.trim().is_empty() {
        anyhow::bail!("site.name must not be empty");
    }

    match config.content.source.as_str() {
        "json" | "filesystem" => {}
        other => anyhow::bail!(
            "Unknown content source: '{}'. Must be json or filesystem.",
            other
        ),
    }

    if config.llm.max_tokens == 0 {
        anyhow::bail!("llm.max_tokens must be > 0");
    }

    if config.llm.timeout_secs == 0 {
        anyhow::bail!("llm.timeout_secs must be > 0");
    }

    if !(0.0..=1.0).contains(&config.llm.temperature) {
        anyhow::bail!("llm.temperature must be in [0.0, 1.0]");
    }

    if config.server.bind.trim().is_empty() {
        anyhow::bail!("server.bind must not be empty");
    }

    Ok(())
}
