//! In-memory content index.
//!
//! [`build`] normalizes raw repository records into [`IndexRecord`]s and
//! appends the synthetic site-information record. The index is never
//! updated in place: a rebuild produces a fresh [`ContentIndex`] which is
//! published through [`SharedIndex`] with a single atomic pointer swap, so
//! concurrent readers see either the old index or the new one in full.
//!
//! # Normalization
//!
//! 1. Strip markup from the body and the excerpt.
//! 2. Append every value of every public metadata key (keys starting with
//!    `_` are internal and skipped), markup-stripped.
//! 3. Join the non-empty parts with a single space.
//!
//! Titles are kept verbatim. Records that fail to normalize are logged and
//! omitted: the adapter reported an error, the record has no id or
//! canonical URL, its id is the reserved site id `0`, or an earlier record
//! in the same build already used its id.

use anyhow::{anyhow, bail, Result};
use arc_swap::ArcSwap;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::sync::Arc;

use crate::markup::strip_tags;
use crate::models::{IndexRecord, RawRecord, RecordId, SiteInfo, SITE_RECORD_TITLE};

/// Prefix marking a metadata key as internal.
const INTERNAL_META_PREFIX: char = '_';

/// An immutable, ordered corpus of index records plus the site it belongs to.
///
/// Order is repository iteration order with the synthetic site record last.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentIndex {
    site: SiteInfo,
    records: Vec<IndexRecord>,
}

impl ContentIndex {
    pub fn site(&self) -> &SiteInfo {
        &self.site
    }

    pub fn records(&self) -> &[IndexRecord] {
        &self.records
    }

    /// Number of records, including the synthetic site record.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Always false: the synthetic site record is always present.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// SHA-256 over every record's id, title, url and body, hex encoded.
    ///
    /// Two builds over identical input produce the same fingerprint.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for record in &self.records {
            let id = record.id.to_string();
            for field in [
                id.as_str(),
                record.title.as_str(),
                record.url.as_str(),
                record.body.as_str(),
            ] {
                hasher.update((field.len() as u64).to_le_bytes());
                hasher.update(field.as_bytes());
            }
        }
        format!("{:x}", hasher.finalize())
    }
}

/// Build a content index from repository output.
///
/// Never fails: individual bad records are skipped with a warning and the
/// synthetic site record is always appended, so the result holds at least
/// one record.
pub fn build<I>(records: I, site: &SiteInfo) -> ContentIndex
where
    I: IntoIterator<Item = Result<RawRecord>>,
{
    let mut out = Vec::new();
    let mut seen = HashSet::new();
    let mut skipped = 0usize;

    for (position, item) in records.into_iter().enumerate() {
        let normalized = item.and_then(normalize).and_then(|record| {
            if !seen.insert(record.id.clone()) {
                bail!("duplicate record id {}", record.id);
            }
            Ok(record)
        });
        match normalized {
            Ok(record) => out.push(record),
            Err(e) => {
                skipped += 1;
                tracing::warn!(position, error = %e, "skipping content record");
            }
        }
    }

    out.push(site_record(site));

    tracing::debug!(records = out.len(), skipped, "content index built");

    ContentIndex {
        site: site.clone(),
        records: out,
    }
}

/// Normalize one raw record into an index record.
pub fn normalize(raw: RawRecord) -> Result<IndexRecord> {
    let id = raw.id.ok_or_else(|| anyhow!("record has no id"))?;
    if id.is_site() {
        bail!("record id {} is reserved for the site record", id);
    }
    let url = raw
        .canonical_url
        .ok_or_else(|| anyhow!("record {} has no canonical url", id))?;

    let mut parts = vec![strip_tags(&raw.raw_body)];
    if let Some(excerpt) = raw.excerpt.as_deref() {
        parts.push(strip_tags(excerpt));
    }

    let meta_text = raw
        .metadata
        .iter()
        .filter(|(key, _)| !key.starts_with(INTERNAL_META_PREFIX))
        .flat_map(|(_, values)| values.iter())
        .map(|v| strip_tags(v))
        .filter(|v| !v.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    parts.push(meta_text);

    let body = parts
        .into_iter()
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    Ok(IndexRecord {
        id,
        title: raw.title.unwrap_or_default(),
        body,
        url,
    })
}

/// The synthetic record describing the site itself.
pub fn site_record(site: &SiteInfo) -> IndexRecord {
    IndexRecord {
        id: RecordId::SITE,
        title: SITE_RECORD_TITLE.to_string(),
        body: format!("This is {}. {}", site.name, site.description)
            .trim_end()
            .to_string(),
        url: site.home_url.clone(),
    }
}

/// Process-wide handle to the current content index.
///
/// Readers take a [`snapshot`](SharedIndex::snapshot) and keep using it for
/// the whole query even if a rebuild publishes a newer index meanwhile.
pub struct SharedIndex {
    current: ArcSwap<ContentIndex>,
}

impl SharedIndex {
    pub fn new(index: ContentIndex) -> Self {
        Self {
            current: ArcSwap::from_pointee(index),
        }
    }

    /// An index holding only the synthetic record for `site`.
    pub fn empty(site: &SiteInfo) -> Self {
        Self::new(build(std::iter::empty(), site))
    }

    pub fn snapshot(&self) -> Arc<ContentIndex> {
        self.current.load_full()
    }

    /// Replace the current index, returning the one it superseded.
    pub fn publish(&self, index: ContentIndex) -> Arc<ContentIndex> {
        self.current.swap(Arc::new(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn site() -> SiteInfo {
        SiteInfo {
            name: "Acme".to_string(),
            description: "We sell anvils.".to_string(),
            home_url: "https://acme.test/".to_string(),
        }
    }

    fn raw(id: u64, title: &str, body: &str, url: &str) -> RawRecord {
        RawRecord {
            id: Some(RecordId::Int(id)),
            title: Some(title.to_string()),
            raw_body: body.to_string(),
            canonical_url: Some(url.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_repository_has_site_record() {
        let index = build(std::iter::empty(), &site());
        assert_eq!(index.len(), 1);
        let rec = &index.records()[0];
        assert!(rec.id.is_site());
        assert_eq!(rec.title, "Site Information");
        assert_eq!(rec.body, "This is Acme. We sell anvils.");
        assert_eq!(rec.url, "https://acme.test/");
    }

    #[test]
    fn test_order_preserved_site_last() {
        let records = vec![
            Ok(raw(7, "B", "second", "/b")),
            Ok(raw(3, "A", "first", "/a")),
        ];
        let index = build(records, &site());
        let titles: Vec<&str> = index.records().iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["B", "A", "Site Information"]);
    }

    #[test]
    fn test_strips_markup_and_appends_excerpt() {
        let mut r = raw(1, "Post", "<p>Hello <b>there</b></p>", "/p");
        r.excerpt = Some("<em>Short</em> summary".to_string());
        let rec = normalize(r).unwrap();
        assert_eq!(rec.body, "Hello there Short summary");
    }

    #[test]
    fn test_internal_metadata_excluded() {
        let mut meta = BTreeMap::new();
        meta.insert("_edit_lock".to_string(), vec!["12345:1".to_string()]);
        meta.insert("color".to_string(), vec!["red".to_string(), "blue".to_string()]);
        meta.insert("size".to_string(), vec!["<b>large</b>".to_string()]);
        let mut r = raw(1, "Widget", "Body", "/w");
        r.metadata = meta;
        let rec = normalize(r).unwrap();
        assert_eq!(rec.body, "Body red blue large");
        assert!(!rec.body.contains("12345"));
    }

    #[test]
    fn test_malformed_records_skipped() {
        let mut no_url = raw(2, "No URL", "x", "/");
        no_url.canonical_url = None;
        let records = vec![
            Ok(raw(1, "Good", "ok", "/good")),
            Err(anyhow!("unreadable row")),
            Ok(no_url),
            Ok(raw(4, "Also good", "ok", "/also")),
        ];
        let index = build(records, &site());
        assert_eq!(index.len(), 3);
        assert_eq!(index.records()[0].title, "Good");
        assert_eq!(index.records()[1].title, "Also good");
    }

    #[test]
    fn test_missing_title_becomes_empty() {
        let mut r = raw(1, "", "body", "/x");
        r.title = None;
        assert_eq!(normalize(r).unwrap().title, "");
    }

    #[test]
    fn test_rebuild_idempotent() {
        let input = || {
            vec![
                Ok(raw(1, "Pricing Plans", "Our plans start at $10/mo", "/pricing")),
                Ok(raw(2, "About", "<p>Founded in 1999</p>", "/about")),
            ]
        };
        let a = build(input(), &site());
        let b = build(input(), &site());
        assert_eq!(a, b);
        assert_eq!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn test_fingerprint_changes_with_content() {
        let a = build(vec![Ok(raw(1, "T", "one", "/t"))], &site());
        let b = build(vec![Ok(raw(1, "T", "two", "/t"))], &site());
        assert_ne!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn test_shared_index_publish_swaps_whole_index() {
        let shared = SharedIndex::empty(&site());
        let before = shared.snapshot();
        assert_eq!(before.len(), 1);

        let next = build(vec![Ok(raw(1, "New", "fresh", "/new"))], &site());
        let previous = shared.publish(next);

        assert_eq!(previous.len(), 1);
        assert_eq!(before.len(), 1, "held snapshot is unaffected");
        assert_eq!(shared.snapshot().len(), 2);
    }
    #[test]
    fn test_reserved_and_duplicate_ids_skipped() {
        let records = vec![
            Ok(raw(0, "Zero", "claims the site id", "/zero")),
            Ok(raw(5, "A", "first", "/a")),
            Ok(raw(5, "B", "second", "/b")),
        ];
        let index = build(records, &site());

        let titles: Vec<&str> = index.records().iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "Site Information"]);
        assert_eq!(index.records().iter().filter(|r| r.id.is_site()).count(), 1);
        assert!(index.records().last().unwrap().id.is_site());
    }

    #[test]
    fn test_string_zero_is_not_reserved() {
        let mut r = raw(1, "Text id", "body", "/t");
        r.id = Some(RecordId::Text("0".to_string()));
        assert!(normalize(r).is_ok());
    }

    #[test]
    fn test_title_kept_verbatim() {
        let rec = normalize(raw(1, "Sizes < 10 > large", "body", "/s")).unwrap();
        assert_eq!(rec.title, "Sizes < 10 > large");
    }
}
