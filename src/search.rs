//! Retrieval preview: `sitebot search`.
//!
//! Runs the retriever against a freshly built index and prints what would
//! be sent to the language model, without calling it. `--explain` adds the
//! score of every retained record.

use anyhow::{bail, Result};

use sitebot_core::retriever::{self, Retriever, SubstringRetriever};

use crate::config::Config;
use crate::repository::load_index;

pub async fn run_search(config: &Config, query: &str, explain: bool) -> Result<()> {
    if query.trim().is_empty() {
        bail!("Query cannot be empty");
    }

    let index = load_index(config).await?;
    let result = SubstringRetriever.search(query, &index);

    if explain {
        let terms = retriever::tokenize(query);
        println!("terms: {:?}", terms);
        println!();

        let matches = retriever::score(query, &index);
        if matches.is_empty() {
            println!("No records matched; using site fallback.");
        }
        for (i, m) in matches.iter().enumerate() {
            println!("{}. [{}] {}", i + 1, m.score, m.record.title);
            println!("    id: {}", m.record.id);
            println!("    url: {}", m.record.url);
        }
        println!();
    }

    if result.sources.is_empty() {
        println!("No results.");
    } else {
        println!("--- Sources ({}) ---", result.sources.len());
        for source in &result.sources {
            println!("{} <{}>", source.title, source.url);
        }
    }
    println!();

    println!("--- Context ---");
    println!("{}", result.context_text);

    Ok(())
}
