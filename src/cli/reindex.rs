//! Reindex command

use clap::Args;

use crate::domain::ReindexReport;
use crate::engine::RagEngine;

#[derive(Args, Debug, Clone)]
pub struct ReindexArgs {
    /// Domain to rebuild
    #[arg(required_unless_present = "all", conflicts_with = "all")]
    pub domain: Option<String>,

    /// Rebuild every domain found in document storage
    #[arg(long)]
    pub all: bool,
}

pub async fn run(engine: &RagEngine, args: ReindexArgs) -> anyhow::Result<()> {
    let Some(domain) = args.domain else {
        let outcomes = engine.reindex_all().await?;
        let failed = outcomes.iter().filter(|(_, outcome)| outcome.is_err()).count();

        for (domain, outcome) in outcomes {
            match outcome {
                Ok(report) => print_report(&report),
                Err(e) => println!("{}: failed: {}", domain, e),
            }
        }

        if failed > 0 {
            anyhow::bail!("{} domain(s) failed to reindex", failed);
        }
        return Ok(());
    };

    let report = engine.reindex(&domain).await?;
    print_report(&report);
    Ok(())
}

fn print_report(report: &ReindexReport) {
    println!(
        "{}: published v{} ({} chunks from {} documents, {} skipped, {} ms)",
        report.domain,
        report.version,
        report.chunks,
        report.documents_read,
        report.documents_skipped,
        report.elapsed_ms
    );
}
