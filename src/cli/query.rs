//! Search and ask commands

use clap::Args;

use crate::engine::RagEngine;

#[derive(Args, Debug, Clone)]
pub struct SearchArgs {
    pub domain: String,

    pub query: String,

    /// Number of chunks to return (defaults to `retrieval.default_top_k`)
    #[arg(long, short = 'k')]
    pub top_k: Option<usize>,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct AskArgs {
    pub domain: String,

    pub query: String,

    /// Number of chunks used as context (defaults to `retrieval.default_top_k`)
    #[arg(long, short = 'k')]
    pub top_k: Option<usize>,
}

pub async fn search(engine: &RagEngine, args: SearchArgs) -> anyhow::Result<()> {
    let result = engine.search(&args.query, &args.domain, args.top_k).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    for (rank, hit) in result.hits.iter().enumerate() {
        println!(
            "{}. [{:.4}] {}#{}: {}",
            rank + 1,
            hit.distance,
            hit.document,
            hit.ordinal,
            hit.text
        );
    }

    Ok(())
}

pub async fn ask(engine: &RagEngine, args: AskArgs) -> anyhow::Result<()> {
    let answer = engine
        .rag_answer(&args.query, &args.domain, args.top_k)
        .await?;

    println!("{}", answer);
    Ok(())
}
