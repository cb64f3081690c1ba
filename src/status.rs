//! `sitebot status`: configuration and index health at a glance.
//!
//! Reports whether an API key is available (and whether it looks like an
//! Anthropic key), which model and content source are configured, and how
//! many records the index would hold. The key itself is never printed.

use anyhow::Result;

use crate::config::Config;
use crate::credentials::{self, KeyStatus};
use crate::repository::load_index;

pub async fn run_status(config: &Config) -> Result<()> {
    let key = credentials::create_provider(&config.credentials).get_api_key();
    let key_line = match credentials::key_status(&key) {
        KeyStatus::Missing => format!(
            "not configured (set {} or [credentials].api_key)",
            config.credentials.api_key_env
        ),
        KeyStatus::InvalidFormat => "invalid format (expected sk-ant-api…)".to_string(),
        KeyStatus::Ready => "ready".to_string(),
    };

    println!("Sitebot Status");
    println!("==============");
    println!();
    println!("  Site:        {}", config.site.name);
    println!("  URL:         {}", config.site.url);
    println!("  API key:     {}", key_line);
    println!("  Model:       {}", config.llm.model);
    println!("  Endpoint:    {}", config.llm.endpoint);
    println!(
        "  Content:     {} ({})",
        config.content.source,
        config.content.path.display()
    );

    match load_index(config).await {
        Ok(index) => {
            println!("  Records:     {}", index.len());
            println!("  Fingerprint: {}", index.fingerprint());
        }
        Err(e) => {
            println!("  Records:     unavailable ({:#})", e);
        }
    }
    println!();

    Ok(())
}
