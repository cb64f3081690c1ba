//! Core data models shared by the index, the retriever, and the app crate.
//!
//! Raw records come out of a content repository; index records are what
//! the retriever scores; retrieval results are handed to the answer
//! generator and then dropped.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Title of the synthetic record appended to every index.
pub const SITE_RECORD_TITLE: &str = "Site Information";

/// Stable identifier of a content record.
///
/// Content stores hand out either numeric or string ids. `Int(0)` is
/// reserved for the synthetic site-information record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Int(u64),
    Text(String),
}

impl RecordId {
    /// The id of the synthetic site-information record.
    pub const SITE: RecordId = RecordId::Int(0);

    pub fn is_site(&self) -> bool {
        matches!(self, RecordId::Int(0))
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Int(n) => write!(f, "{}", n),
            RecordId::Text(s) => f.write_str(s),
        }
    }
}

/// Site-level information exposed by a content repository.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteInfo {
    pub name: String,
    pub description: String,
    /// Site root, used as the citation URL of the synthetic record.
    pub home_url: String,
}

/// A content record as produced by a repository adapter, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    pub id: Option<RecordId>,
    pub title: Option<String>,
    /// Body text, possibly HTML.
    pub raw_body: String,
    pub excerpt: Option<String>,
    /// Metadata values keyed by field name. Keys starting with `_` are
    /// internal and never indexed.
    pub metadata: BTreeMap<String, Vec<String>>,
    pub canonical_url: Option<String>,
}

/// One retrievable unit in the content index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexRecord {
    pub id: RecordId,
    pub title: String,
    /// Plain text: stripped body, excerpt, and public metadata values.
    pub body: String,
    pub url: String,
}

/// A citation returned alongside a generated answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub title: String,
    pub url: String,
}

impl From<&IndexRecord> for Source {
    fn from(record: &IndexRecord) -> Self {
        Self {
            title: record.title.clone(),
            url: record.url.clone(),
        }
    }
}

/// A record paired with its relevance score for one query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoredMatch<'a> {
    pub record: &'a IndexRecord,
    pub score: u32,
}

/// Grounding context selected for one query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RetrievalResult {
    pub context_text: String,
    pub sources: Vec<Source>,
}
