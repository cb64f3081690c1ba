//! # Sitebot
//!
//! A content-aware chatbot for a single website. Answers visitor questions
//! from the site's own published content, with citations.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌─────────────┐
//! │ Repository   │──▶│ ContentIndex │──▶│  Retriever  │
//! │ JSON / FS    │   │  (ArcSwap)   │   │  substring  │
//! └──────────────┘   └──────────────┘   └──────┬──────┘
//!                                              │ context
//!                         ┌────────────┐   ┌───▼─────────┐
//!                         │ HTTP / CLI │◀──│ QueryService│──▶ Anthropic API
//!                         └────────────┘   └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! sitebot index                          # list indexed records
//! sitebot search "pricing" --explain     # preview retrieval
//! sitebot ask "What do your plans cost?"
//! sitebot serve                          # POST /v1/query
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`logging`] | `tracing` subscriber setup |
//! | [`error`] | Query failure taxonomy and HTTP mapping |
//! | [`repository`] | Content sources (JSON export, filesystem) |
//! | [`credentials`] | API key providers |
//! | [`generator`] | Anthropic Messages API client |
//! | [`service`] | Query orchestration and index rebuild |
//! | [`server`] | HTTP API |
//!
//! Index, markup stripping, and scoring live in [`sitebot_core`].

pub mod ask;
pub mod config;
pub mod credentials;
pub mod error;
pub mod generator;
pub mod index_cmd;
pub mod logging;
pub mod repository;
pub mod search;
pub mod server;
pub mod service;
pub mod status;
