//! CLI module for the RAG engine
//!
//! Subcommands:
//! - `ingest`: store raw documents under a domain
//! - `reindex`: rebuild one domain, or every domain with `--all`
//! - `search`: nearest chunks for a query
//! - `ask`: retrieval-augmented answer for a query
//! - `domains`: known domains and their index status

pub mod domains;
pub mod ingest;
pub mod query;
pub mod reindex;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::engine::RagEngine;

/// pmp-rag - multi-domain retrieval-augmented generation
#[derive(Parser, Debug)]
#[command(name = "pmp-rag")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Store documents (files or directories of files) under a domain
    Ingest(ingest::IngestArgs),

    /// Rebuild and publish a domain's index
    Reindex(reindex::ReindexArgs),

    /// Show the chunks nearest to a query
    Search(query::SearchArgs),

    /// Answer a question from a domain's documents
    Ask(query::AskArgs),

    /// List domains and their index status
    Domains(domains::DomainsArgs),
}

/// Run a parsed command against an engine built from `config`
pub async fn run(cli: Cli, config: &AppConfig) -> anyhow::Result<()> {
    let engine = RagEngine::from_config(config)?;

    match cli.command {
        Command::Ingest(args) => ingest::run(&engine, args).await,
        Command::Reindex(args) => reindex::run(&engine, args).await,
        Command::Search(args) => query::search(&engine, args).await,
        Command::Ask(args) => query::ask(&engine, args).await,
        Command::Domains(args) => domains::run(&engine, args).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search() {
        let cli = Cli::try_parse_from([
            "pmp-rag",
            "search",
            "law",
            "How do I file a claim?",
            "--top-k",
            "3",
        ])
        .unwrap();

        match cli.command {
            Command::Search(args) => {
                assert_eq!(args.domain, "law");
                assert_eq!(args.query, "How do I file a claim?");
                assert_eq!(args.top_k, Some(3));
                assert!(!args.json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_reindex_all() {
        let cli = Cli::try_parse_from(["pmp-rag", "reindex", "--all"]).unwrap();

        match cli.command {
            Command::Reindex(args) => {
                assert!(args.all);
                assert!(args.domain.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_reindex_requires_domain_or_all() {
        assert!(Cli::try_parse_from(["pmp-rag", "reindex"]).is_err());
        assert!(Cli::try_parse_from(["pmp-rag", "reindex", "law", "--all"]).is_err());
    }

    #[test]
    fn test_parse_ingest_paths() {
        let cli = Cli::try_parse_from(["pmp-rag", "ingest", "law", "a.txt", "docs/"]).unwrap();

        match cli.command {
            Command::Ingest(args) => {
                assert_eq!(args.domain, "law");
                assert_eq!(args.paths.len(), 2);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
