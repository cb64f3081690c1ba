//! Diagnostic logging setup.
//!
//! All modules log through `tracing`. The binary installs a `fmt`
//! subscriber on stderr filtered by `RUST_LOG`, so stdout stays reserved
//! for command output. Upstream API exchanges are logged on the
//! [`UPSTREAM_TARGET`] target and can be enabled on their own with
//! `RUST_LOG=sitebot::upstream=debug`.

use tracing_subscriber::EnvFilter;

/// Log target for language-model request/response records.
pub const UPSTREAM_TARGET: &str = "sitebot::upstream";

const DEFAULT_FILTER: &str = "sitebot=info,sitebot_core=info,tower_http=info";

/// Install the global subscriber. Safe to call more than once.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init();
}
