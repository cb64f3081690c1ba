//! `sitebot index`: list what a rebuild would put in the index.

use anyhow::Result;

use crate::config::Config;
use crate::repository::load_index;

/// Longest title shown before truncation.
const TITLE_WIDTH: usize = 40;

pub async fn run_index(config: &Config) -> Result<()> {
    let index = load_index(config).await?;

    println!(
        "{:<24} {:<TITLE_WIDTH$} {:>8}  URL",
        "ID", "TITLE", "CHARS"
    );
    for record in index.records() {
        println!(
            "{:<24} {:<TITLE_WIDTH$} {:>8}  {}",
            record.id.to_string(),
            truncate(&record.title, TITLE_WIDTH),
            record.body.chars().count(),
            record.url
        );
    }
    println!();
    println!("{} records, fingerprint {}", index.len(), index.fingerprint());

    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 5), "abcd…");
        assert_eq!(truncate("ééééé", 5), "ééééé");
    }
}
