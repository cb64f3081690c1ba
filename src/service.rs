//! The query service: validation, retrieval, and answer generation.
//!
//! [`QueryService`] owns the shared content index and the collaborators
//! each request needs. `answer` runs one question end-to-end:
//!
//! 1. Fetch the API key; empty → [`ServiceError::Configuration`].
//! 2. Reject empty/whitespace queries → [`ServiceError::Validation`].
//! 3. Snapshot the index and retrieve grounding context.
//! 4. Call the answer generator.
//! 5. Return the answer with the retriever's sources.
//!
//! The index is only replaced by [`QueryService::rebuild`], which builds a
//! complete new index before publishing it. In-flight queries keep the
//! snapshot they started with.

use anyhow::{Context, Result};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

use sitebot_core::index::{self, ContentIndex, SharedIndex};
use sitebot_core::models::{RetrievalResult, SiteInfo, Source};
use sitebot_core::retriever::{Retriever, SubstringRetriever};

use crate::config::Config;
use crate::credentials::{self, CredentialProvider};
use crate::error::ServiceError;
use crate::generator::{AnswerGenerator, AnthropicGenerator};
use crate::repository::ContentRepository;

/// A generated answer with its citations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Answer {
    pub answer: String,
    pub sources: Vec<Source>,
}

pub struct QueryService {
    index: SharedIndex,
    retriever: Arc<dyn Retriever>,
    generator: Arc<dyn AnswerGenerator>,
    credentials: Arc<dyn CredentialProvider>,
}

impl QueryService {
    /// Create a service whose index holds only the synthetic site record
    /// until the first [`rebuild`](Self::rebuild).
    pub fn new(
        site: &SiteInfo,
        retriever: Arc<dyn Retriever>,
        generator: Arc<dyn AnswerGenerator>,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Self {
        Self {
            index: SharedIndex::empty(site),
            retriever,
            generator,
            credentials,
        }
    }

    /// Wire up the production collaborators from configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let generator =
            AnthropicGenerator::new(&config.llm).context("Failed to create answer generator")?;
        Ok(Self::new(
            &config.site.to_site_info(),
            Arc::new(SubstringRetriever),
            Arc::new(generator),
            Arc::from(credentials::create_provider(&config.credentials)),
        ))
    }

    /// Scan `repository`, build a fresh index and publish it.
    ///
    /// Returns the number of records in the new index. If the scan itself
    /// fails the current index stays in place.
    pub async fn rebuild(&self, repository: &dyn ContentRepository) -> Result<usize> {
        let started = Instant::now();
        let raw = repository
            .scan()
            .await
            .with_context(|| format!("Failed to scan {} repository", repository.name()))?;
        let scanned = raw.len();

        let fresh = index::build(raw, &repository.site_info());
        let count = fresh.len();
        let fingerprint = fresh.fingerprint();
        let previous = self.index.publish(fresh);

        tracing::info!(
            repository = repository.name(),
            scanned,
            indexed = count,
            previous = previous.len(),
            fingerprint = %&fingerprint[..12],
            elapsed_ms = started.elapsed().as_millis() as u64,
            "content index rebuilt"
        );

        Ok(count)
    }

    /// The index as of now.
    pub fn index(&self) -> Arc<ContentIndex> {
        self.index.snapshot()
    }

    /// Validate `query` and select its grounding context without calling
    /// the language model.
    pub fn retrieve(&self, query: &str) -> Result<RetrievalResult, ServiceError> {
        let query = validate_query(query)?;
        let snapshot = self.index.snapshot();
        Ok(self.retriever.search(query, &snapshot))
    }

    /// Answer one question.
    pub async fn answer(&self, query: &str) -> Result<Answer, ServiceError> {
        let api_key = self.credentials.get_api_key();
        if api_key.trim().is_empty() {
            let err = ServiceError::Configuration("no API key configured".to_string());
            tracing::warn!(error = %err, "rejecting query");
            return Err(err);
        }

        let retrieval = self.retrieve(query)?;
        let query = query.trim();

        tracing::debug!(
            sources = retrieval.sources.len(),
            context_bytes = retrieval.context_text.len(),
            "retrieved context"
        );

        let answer = self
            .generator
            .generate(&api_key, query, &retrieval.context_text)
            .await
            .inspect_err(|e| tracing::error!(error = %e, code = e.code(), "answer generation failed"))?;

        Ok(Answer {
            answer,
            sources: retrieval.sources,
        })
    }
}

fn validate_query(query: &str) -> Result<&str, ServiceError> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::Validation("Query cannot be empty".to_string()));
    }
    Ok(trimmed)
}
