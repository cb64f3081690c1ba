//! Query retrieval over a [`ContentIndex`].
//!
//! The [`Retriever`] trait is the seam for swapping the scoring model.
//! [`SubstringRetriever`] is the default and only implementation.
//!
//! # Scoring
//!
//! 1. Lower-case the query and split it on whitespace.
//! 2. Drop terms shorter than [`MIN_TERM_CHARS`] characters.
//! 3. For each record: +2 per term found anywhere in the title, +1 per
//!    term found anywhere in the body. Presence only, repeats in a field
//!    do not count twice.
//! 4. Keep every record scoring above zero, in index order. Results are
//!    not re-sorted by score.
//! 5. With no matches, fall back to a context built from the site name and
//!    description, with no sources.
//!
//! No cap is applied to the size of the assembled context.

use crate::index::ContentIndex;
use crate::models::{IndexRecord, RetrievalResult, ScoredMatch, SiteInfo, Source};

/// Terms shorter than this (in characters) are ignored.
pub const MIN_TERM_CHARS: usize = 3;

/// Score added when a term occurs in a record's title.
pub const TITLE_WEIGHT: u32 = 2;

/// Score added when a term occurs in a record's body.
pub const BODY_WEIGHT: u32 = 1;

/// Separator placed between passages in the assembled context.
pub const PASSAGE_SEPARATOR: &str = "\n\n";

/// Selects grounding context for a query.
pub trait Retriever: Send + Sync {
    fn search(&self, query: &str, index: &ContentIndex) -> RetrievalResult;
}

/// Case-insensitive substring presence scoring with fixed weights.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubstringRetriever;

impl Retriever for SubstringRetriever {
    fn search(&self, query: &str, index: &ContentIndex) -> RetrievalResult {
        let matches = score(query, index);

        if matches.is_empty() {
            return RetrievalResult {
                context_text: fallback_context(index.site()),
                sources: Vec::new(),
            };
        }

        let context_text = matches
            .iter()
            .map(|m| m.record.body.as_str())
            .collect::<Vec<_>>()
            .join(PASSAGE_SEPARATOR);
        let sources = matches.iter().map(|m| Source::from(m.record)).collect();

        RetrievalResult {
            context_text,
            sources,
        }
    }
}

/// Split a query into lower-cased search terms, dropping short ones.
pub fn tokenize(query: &str) -> Vec<String> {
    query
        .to_lowercase()
        .split_whitespace()
        .filter(|t| t.chars().count() >= MIN_TERM_CHARS)
        .map(str::to_string)
        .collect()
}

/// Score one record against already-tokenized terms.
pub fn score_record(terms: &[String], record: &IndexRecord) -> u32 {
    let title = record.title.to_lowercase();
    let body = record.body.to_lowercase();

    terms
        .iter()
        .map(|term| {
            let mut s = 0;
            if title.contains(term.as_str()) {
                s += TITLE_WEIGHT;
            }
            if body.contains(term.as_str()) {
                s += BODY_WEIGHT;
            }
            s
        })
        .sum()
}

/// Every record with a positive score, in index order.
pub fn score<'a>(query: &str, index: &'a ContentIndex) -> Vec<ScoredMatch<'a>> {
    let terms = tokenize(query);
    if terms.is_empty() {
        return Vec::new();
    }

    index
        .records()
        .iter()
        .filter_map(|record| {
            let score = score_record(&terms, record);
            (score > 0).then_some(ScoredMatch { record, score })
        })
        .collect()
}

/// Context used when nothing in the index matches.
pub fn fallback_context(site: &SiteInfo) -> String {
    format!("This website belongs to {}. {}", site.name, site.description)
        .trim_end()
        .to_string()
}
