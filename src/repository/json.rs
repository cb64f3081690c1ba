//! JSON content export adapter.
//!
//! Reads a file holding either a bare array of records or an object with a
//! `records` array. Each record is decoded on its own:
//!
//! ```json
//! {
//!   "records": [
//!     {
//!       "id": 42,
//!       "title": "Pricing Plans",
//!       "content": "<p>Our plans start at $10/mo</p>",
//!       "excerpt": "Plans and prices",
//!       "meta": { "tier": ["basic", "pro"], "_edit_lock": "1700000000:1" },
//!       "url": "https://acme.test/pricing"
//!     }
//!   ]
//! }
//! ```
//!
//! `title`, `content`, and `excerpt` may also use the `{"rendered": "..."}`
//! shape of the WordPress REST API; `content` may be spelled `body` and
//! `url` may be spelled `link` or `permalink`.

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;

use sitebot_core::models::{RawRecord, RecordId, SiteInfo};

use super::ContentRepository;

pub struct JsonExportRepository {
    path: PathBuf,
    site: SiteInfo,
}

impl JsonExportRepository {
    pub fn new(path: PathBuf, site: SiteInfo) -> Self {
        Self { path, site }
    }
}

#[async_trait]
impl ContentRepository for JsonExportRepository {
    fn name(&self) -> &str {
        "json"
    }

    fn site_info(&self) -> SiteInfo {
        self.site.clone()
    }

    async fn scan(&self) -> Result<Vec<Result<RawRecord>>> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read content export: {}", self.path.display()))?;
        parse_export(&content)
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TextField {
    Plain(String),
    Rendered { rendered: String },
}

impl TextField {
    fn into_string(self) -> String {
        match self {
            TextField::Plain(s) => s,
            TextField::Rendered { rendered } => rendered,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ExportRecord {
    id: Option<RecordId>,
    #[serde(default)]
    title: Option<TextField>,
    #[serde(default, alias = "body")]
    content: Option<TextField>,
    #[serde(default)]
    excerpt: Option<TextField>,
    #[serde(default)]
    meta: BTreeMap<String, Value>,
    #[serde(default, alias = "link", alias = "permalink")]
    url: Option<String>,
}

impl From<ExportRecord> for RawRecord {
    fn from(r: ExportRecord) -> Self {
        let metadata = r
            .meta
            .into_iter()
            .map(|(key, value)| {
                let mut values = Vec::new();
                flatten_meta_value(&value, &mut values);
                (key, values)
            })
            .collect();

        RawRecord {
            id: r.id,
            title: r.title.map(TextField::into_string),
            raw_body: r.content.map(TextField::into_string).unwrap_or_default(),
            excerpt: r.excerpt.map(TextField::into_string),
            metadata,
            canonical_url: r.url,
        }
    }
}

/// Parse an export document into per-record results.
pub fn parse_export(content: &str) -> Result<Vec<Result<RawRecord>>> {
    let doc: Value = serde_json::from_str(content).context("Content export is not valid JSON")?;

    let items = match doc {
        Value::Array(items) => items,
        Value::Object(mut obj) => match obj.remove("records") {
            Some(Value::Array(items)) => items,
            _ => bail!("Content export object has no `records` array"),
        },
        _ => bail!("Content export must be an array or an object with `records`"),
    };

    Ok(items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            serde_json::from_value::<ExportRecord>(item)
                .map(RawRecord::from)
                .map_err(|e| anyhow!("export record {}: {}", i, e))
        })
        .collect())
}

/// Turn a metadata value into searchable strings.
fn flatten_meta_value(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::Null => {}
        Value::String(s) => out.push(s.clone()),
        Value::Bool(b) => out.push(b.to_string()),
        Value::Number(n) => out.push(n.to_string()),
        Value::Array(items) => items.iter().for_each(|v| flatten_meta_value(v, out)),
        Value::Object(map) => map.values().for_each(|v| flatten_meta_value(v, out)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_with_records() {
        let json = r#"{"records": [
            {"id": 42, "title": "Pricing Plans", "content": "<p>Our plans</p>",
             "meta": {"tier": ["basic", "pro"], "_edit_lock": "1:1", "count": 3},
             "url": "https://acme.test/pricing"}
        ]}"#;
        let records = parse_export(json).unwrap();
        assert_eq!(records.len(), 1);
        let r = records[0].as_ref().unwrap();
        assert_eq!(r.id, Some(RecordId::Int(42)));
        assert_eq!(r.title.as_deref(), Some("Pricing Plans"));
        assert_eq!(r.raw_body, "<p>Our plans</p>");
        assert_eq!(r.metadata["tier"], vec!["basic", "pro"]);
        assert_eq!(r.metadata["count"], vec!["3"]);
        assert_eq!(r.metadata["_edit_lock"], vec!["1:1"]);
        assert_eq!(r.canonical_url.as_deref(), Some("https://acme.test/pricing"));
    }

    #[test]
    fn test_bare_array_and_aliases() {
        let json = r#"[
            {"id": "about", "title": {"rendered": "About"}, "body": "Hi",
             "excerpt": {"rendered": "<p>Short</p>"}, "link": "/about"}
        ]"#;
        let records = parse_export(json).unwrap();
        let r = records[0].as_ref().unwrap();
        assert_eq!(r.id, Some(RecordId::Text("about".to_string())));
        assert_eq!(r.title.as_deref(), Some("About"));
        assert_eq!(r.raw_body, "Hi");
        assert_eq!(r.excerpt.as_deref(), Some("<p>Short</p>"));
        assert_eq!(r.canonical_url.as_deref(), Some("/about"));
    }

    #[test]
    fn test_bad_record_isolated() {
        let json = r#"[
            {"id": 1, "title": "Good", "url": "/g"},
            {"id": 2, "title": ["not", "a", "string"], "url": "/b"},
            "just a string",
            {"id": 4, "title": "Also good", "url": "/a"}
        ]"#;
        let records = parse_export(json).unwrap();
        assert_eq!(records.len(), 4);
        assert!(records[0].is_ok());
        assert!(records[1].is_err());
        assert!(records[2].is_err());
        assert!(records[3].is_ok());
    }

    #[test]
    fn test_invalid_document_is_error() {
        assert!(parse_export("not json").is_err());
        assert!(parse_export(r#"{"posts": []}"#).is_err());
        assert!(parse_export("42").is_err());
    }
}
