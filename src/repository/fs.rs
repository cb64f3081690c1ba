//! Filesystem adapter for static sites.
//!
//! Walks a directory of published pages (`.html`, `.md`, `.txt` by default)
//! and turns each file into a record:
//!
//! - **id**: path relative to the root
//! - **title**: the HTML `<title>`, the first Markdown `# ` heading, or the
//!   file stem
//! - **url**: `base_url` joined with the relative path
//!
//! Files are visited in sorted path order so rebuilds are deterministic.
//! An unreadable file becomes a per-record error, not a scan failure.

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use globset::{Glob, GlobSet, GlobSetBuilder};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use walkdir::WalkDir;

use sitebot_core::models::{RawRecord, RecordId, SiteInfo};

use super::ContentRepository;
use crate::config::ContentConfig;

static HTML_TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title\s*>").expect("static regex"));

#[derive(Clone)]
pub struct FilesystemRepository {
    root: PathBuf,
    base_url: String,
    include: GlobSet,
    exclude: GlobSet,
    follow_symlinks: bool,
    site: SiteInfo,
}

impl FilesystemRepository {
    pub fn from_config(config: &ContentConfig, site: SiteInfo) -> Result<Self> {
        let include = build_globset(&config.include_globs)?;

        let mut excludes = vec!["**/.git/**".to_string(), "**/node_modules/**".to_string()];
        excludes.extend(config.exclude_globs.iter().cloned());
        let exclude = build_globset(&excludes)?;

        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| site.home_url.clone());

        Ok(Self {
            root: config.path.clone(),
            base_url,
            include,
            exclude,
            follow_symlinks: config.follow_symlinks,
            site,
        })
    }

    fn scan_blocking(&self) -> Result<Vec<Result<RawRecord>>> {
        if !self.root.is_dir() {
            bail!(
                "Filesystem content root does not exist: {}",
                self.root.display()
            );
        }

        let mut entries: Vec<Result<(PathBuf, String)>> = Vec::new();

        let walker = WalkDir::new(&self.root)
            .follow_links(self.follow_symlinks)
            .sort_by_file_name();
        for entry in walker {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    entries.push(Err(anyhow!("walk error: {}", e)));
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let relative = path.strip_prefix(&self.root).unwrap_or(path);
            let rel_str = relative.to_string_lossy().replace('\\', "/");

            if self.exclude.is_match(&rel_str) || !self.include.is_match(&rel_str) {
                continue;
            }

            entries.push(Ok((path.to_path_buf(), rel_str)));
        }

        Ok(entries
            .into_iter()
            .map(|e| e.and_then(|(path, rel)| self.file_to_record(&path, &rel)))
            .collect())
    }

    fn file_to_record(&self, path: &Path, relative_path: &str) -> Result<RawRecord> {
        let body = std::fs::read_to_string(path)
            .map_err(|e| anyhow!("failed to read {}: {}", path.display(), e))?;

        let title = extract_title(path, &body);

        Ok(RawRecord {
            id: Some(RecordId::Text(relative_path.to_string())),
            title: Some(title),
            raw_body: body,
            excerpt: None,
            metadata: Default::default(),
            canonical_url: Some(join_url(&self.base_url, relative_path)),
        })
    }
}

#[async_trait]
impl ContentRepository for FilesystemRepository {
    fn name(&self) -> &str {
        "filesystem"
    }

    fn site_info(&self) -> SiteInfo {
        self.site.clone()
    }

    async fn scan(&self) -> Result<Vec<Result<RawRecord>>> {
        let repo = self.clone();
        tokio::task::spawn_blocking(move || repo.scan_blocking()).await?
    }
}

fn extract_title(path: &Path, body: &str) -> String {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    let found = match ext.as_str() {
        "html" | "htm" => HTML_TITLE
            .captures(body)
            .map(|c| c[1].trim().to_string()),
        "md" | "markdown" => body
            .lines()
            .find_map(|l| l.strip_prefix("# "))
            .map(|t| t.trim().to_string()),
        _ => None,
    };

    found.filter(|t| !t.is_empty()).unwrap_or_else(|| {
        path.file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default()
    })
}

fn join_url(base: &str, relative: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), relative.trim_start_matches('/'))
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}
