//! Ingest command - copies files into document storage

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use tracing::warn;

use crate::domain::ingestion::DocumentFormat;
use crate::engine::RagEngine;

#[derive(Args, Debug, Clone)]
pub struct IngestArgs {
    /// Target domain (e.g. `law`)
    pub domain: String,

    /// Files, or directories whose supported files are ingested (not recursive)
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
}

pub async fn run(engine: &RagEngine, args: IngestArgs) -> anyhow::Result<()> {
    let mut files = Vec::new();
    for path in &args.paths {
        collect_files(path, &mut files).await?;
    }

    for file in files {
        let Some(name) = file.file_name().and_then(|n| n.to_str()) else {
            warn!(path = %file.display(), "Skipping file with a non UTF-8 name");
            continue;
        };

        let content = tokio::fs::read(&file)
            .await
            .with_context(|| format!("Failed to read {}", file.display()))?;
        let location = engine.ingest(&args.domain, name, content).await?;

        println!("{} -> {}", file.display(), location);
    }

    Ok(())
}

async fn collect_files(path: &Path, files: &mut Vec<PathBuf>) -> anyhow::Result<()> {
    let metadata = tokio::fs::metadata(path)
        .await
        .with_context(|| format!("Cannot access {}", path.display()))?;

    if metadata.is_file() {
        files.push(path.to_path_buf());
        return Ok(());
    }

    let mut entries = tokio::fs::read_dir(path)
        .await
        .with_context(|| format!("Cannot list {}", path.display()))?;
    let mut found = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_file() {
            continue;
        }

        let path = entry.path();
        let supported = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(DocumentFormat::from_filename)
            .is_some();
        if supported {
            found.push(path);
        } else {
            warn!(path = %path.display(), "Skipping file with an unsupported format");
        }
    }

    found.sort();
    files.extend(found);
    Ok(())
}
