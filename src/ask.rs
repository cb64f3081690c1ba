//! `sitebot ask`: answer one question from the command line.

use anyhow::Result;

use crate::config::Config;
use crate::repository::create_repository;
use crate::service::QueryService;

pub async fn run_ask(config: &Config, query: &str) -> Result<()> {
    let service = QueryService::from_config(config)?;
    let repository = create_repository(config)?;
    service.rebuild(repository.as_ref()).await?;

    let answer = service.answer(query).await?;

    println!("{}", answer.answer);
    if !answer.sources.is_empty() {
        println!();
        println!("Sources:");
        for source in &answer.sources {
            println!("  - {} <{}>", source.title, source.url);
        }
    }

    Ok(())
}
