//! # sitebot core
//!
//! Runtime-free logic for sitebot: the content data model, markup
//! stripping, the in-memory content index with atomic publication, and
//! the substring retriever.
//!
//! This crate contains no tokio, HTTP, or filesystem I/O. Repository
//! adapters, the answer generator client, and the query service live in
//! the `sitebot` app crate.
//!
//! ```text
//! RawRecord ──build()──▶ ContentIndex ──publish()──▶ SharedIndex
//!                                                        │ snapshot()
//!                                                        ▼
//!                                   query ──▶ Retriever::search ──▶ RetrievalResult
//! ```

pub mod index;
pub mod markup;
pub mod models;
pub mod retriever;
