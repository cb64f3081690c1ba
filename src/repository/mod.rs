//! Content repository adapters.
//!
//! A [`ContentRepository`] pulls published content from an external store
//! and hands it to the index builder as [`RawRecord`]s. Each record is
//! delivered as its own `Result`, so a single unreadable entry is dropped
//! by the builder instead of failing the whole scan.
//!
//! | Source | Adapter | Reads |
//! |--------|---------|-------|
//! | `json` | [`JsonExportRepository`] | a content export file |
//! | `filesystem` | [`FilesystemRepository`] | a directory of pages |
//! | (in-process) | [`StaticRepository`] | records held in memory |

mod fs;
mod json;

pub use fs::FilesystemRepository;
pub use json::JsonExportRepository;

use anyhow::{bail, Result};
use async_trait::async_trait;
use sitebot_core::index::{self, ContentIndex};
use sitebot_core::models::{RawRecord, SiteInfo};

use crate::config::Config;

/// A source of published site content.
///
/// # Example
///
/// ```rust
/// use async_trait::async_trait;
/// use anyhow::Result;
/// use sitebot::repository::ContentRepository;
/// use sitebot_core::models::{RawRecord, SiteInfo};
///
/// struct NothingPublished(SiteInfo);
///
/// #[async_trait]
/// impl ContentRepository for NothingPublished {
///     fn name(&self) -> &str { "nothing" }
///     fn site_info(&self) -> SiteInfo { self.0.clone() }
///     async fn scan(&self) -> Result<Vec<Result<RawRecord>>> { Ok(Vec::new()) }
/// }
/// ```
#[async_trait]
pub trait ContentRepository: Send + Sync {
    /// Short label used in logs (e.g. `"json"`).
    fn name(&self) -> &str;

    /// Site-level name, description, and home URL.
    fn site_info(&self) -> SiteInfo;

    /// Read every published record, in the store's natural order.
    ///
    /// The outer error means the store itself is unreachable. Inner errors
    /// are per-record and are skipped by the index builder.
    async fn scan(&self) -> Result<Vec<Result<RawRecord>>>;
}

/// Records held in memory. Used by tests and embedding applications.
pub struct StaticRepository {
    site: SiteInfo,
    records: Vec<RawRecord>,
}

impl StaticRepository {
    pub fn new(site: SiteInfo, records: Vec<RawRecord>) -> Self {
        Self { site, records }
    }
}

#[async_trait]
impl ContentRepository for StaticRepository {
    fn name(&self) -> &str {
        "static"
    }

    fn site_info(&self) -> SiteInfo {
        self.site.clone()
    }

    async fn scan(&self) -> Result<Vec<Result<RawRecord>>> {
        Ok(self.records.iter().cloned().map(Ok).collect())
    }
}

/// Create the repository selected by `[content].source`.
pub fn create_repository(config: &Config) -> Result<Box<dyn ContentRepository>> {
    let site = config.site.to_site_info();
    match config.content.source.as_str() {
        "json" => Ok(Box::new(JsonExportRepository::new(
            config.content.path.clone(),
            site,
        ))),
        "filesystem" => Ok(Box::new(FilesystemRepository::from_config(
            &config.content,
            site,
        )?)),
        other => bail!("Unknown content source: {}", other),
    }
}

/// Scan the configured repository once and build an index from it, without
/// a running service. Used by the offline CLI commands.
pub async fn load_index(config: &Config) -> Result<ContentIndex> {
    let repository = create_repository(config)?;
    let records = repository.scan().await?;
    Ok(index::build(records, &repository.site_info()))
}
