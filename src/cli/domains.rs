//! Domains command

use clap::Args;

use crate::engine::RagEngine;

#[derive(Args, Debug, Clone)]
pub struct DomainsArgs {
    /// Print statuses as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(engine: &RagEngine, args: DomainsArgs) -> anyhow::Result<()> {
    let mut statuses = Vec::new();
    for domain in engine.domains().await? {
        statuses.push(engine.status(domain.as_str()).await?);
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&statuses)?);
        return Ok(());
    }

    for status in statuses {
        match (status.published_version, status.chunks) {
            (Some(version), Some(chunks)) => println!(
                "{}\tv{}\t{} chunks\t{}",
                status.domain,
                version,
                chunks,
                status.reindex.name()
            ),
            _ => println!("{}\tnot indexed\t{}", status.domain, status.reindex.name()),
        }
    }

    Ok(())
}
