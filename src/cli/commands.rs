//! CLI command definitions and handlers

use anyhow::Context;
use clap::Subcommand;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::core::config::AppConfig;
use crate::core::models::Metrics;
use crate::processors::export::ExportJob;
use crate::processors::format::{ExportFormat, ImportFormat};
use crate::processors::import::import_document;

/// Commands for Simplify Translator
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start HTTP API server
    Server {
        /// Bind address (overrides configuration)
        #[arg(long)]
        host: Option<String>,

        /// Listen port (overrides configuration)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Extract plain text from PDF, DOCX, EPUB or TXT documents
    Import {
        /// Input file or directory
        #[arg(short, long)]
        file: PathBuf,

        /// Directory receiving one .txt per document (stdout for a single file if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Render text and readability metrics to a document
    Export {
        /// File holding the text to export
        #[arg(short, long)]
        text: PathBuf,

        /// JSON object of metrics for the original text
        #[arg(long)]
        metrics_original: Option<PathBuf>,

        /// JSON object of metrics for the simplified text
        #[arg(long)]
        metrics_simplified: Option<PathBuf>,

        /// Output format: pdf, docx or txt
        #[arg(long, default_value = "pdf")]
        format: String,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,
    },
}

/// Handle server command
pub async fn handle_server(
    mut config: AppConfig,
    host: Option<String>,
    port: Option<u16>,
) -> anyhow::Result<()> {
    use crate::server::api::run_server;

    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    let (host, port) = (config.server.host.clone(), config.server.port);
    println!("🚀 Server starting on http://{}:{}", host, port);
    println!("📄 OpenAPI document: http://{}:{}/api-docs/openapi.json", host, port);

    run_server(config).await?;

    Ok(())
}

/// Importable documents under `path`, sorted; a file is returned as is.
/// Nothing below `skip` (the output directory) is collected.
pub fn collect_documents(path: &Path, skip: Option<&Path>) -> Vec<PathBuf> {
    if !path.is_dir() {
        return vec![path.to_path_buf()];
    }

    let skip = skip.and_then(|dir| dir.canonicalize().ok());
    let mut files: Vec<PathBuf> = WalkDir::new(path)
        .into_iter()
        .filter_entry(|entry| match &skip {
            Some(skip) if entry.file_type().is_dir() => entry
                .path()
                .canonicalize()
                .map(|dir| &dir != skip)
                .unwrap_or(true),
            _ => true,
        })
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|p| {
            p.file_name()
                .and_then(|name| name.to_str())
                .map(|name| ImportFormat::from_filename(name).is_ok())
                .unwrap_or(false)
        })
        .collect();
    files.sort();
    files
}

/// Text file written for `input` inside `output_dir`
pub fn text_output_path(input: &Path, output_dir: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    output_dir.join(format!("{}.txt", stem))
}

fn import_file(path: &Path) -> anyhow::Result<String> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("Invalid file name: {}", path.display()))?;
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(import_document(name, &bytes)?)
}

/// Handle import command
pub async fn handle_import(file: PathBuf, output: Option<PathBuf>) -> anyhow::Result<()> {
    let start_time = Instant::now();

    info!("Starting document import");
    info!("Input: {}", file.display());

    if !file.is_dir() && output.is_none() {
        let text = tokio::task::spawn_blocking(move || import_file(&file)).await??;
        println!("{}", text);
        return Ok(());
    }

    let output = output.unwrap_or_else(|| file.join("imported"));
    std::fs::create_dir_all(&output)
        .with_context(|| format!("Failed to create {}", output.display()))?;
    info!("Output: {}", output.display());

    let files = collect_documents(&file, Some(output.as_path()));
    if files.is_empty() {
        anyhow::bail!("No importable documents found");
    }

    // Create progress bar
    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")?
            .progress_chars("=>-"),
    );

    let mut processed = 0;
    let mut failed = 0;

    for file_path in files {
        pb.set_message(format!("Importing: {}", file_path.display()));

        let source = file_path.clone();
        let result = tokio::task::spawn_blocking(move || import_file(&source)).await?;
        match result {
            Ok(text) => {
                let target = text_output_path(&file_path, &output);
                std::fs::write(&target, text)
                    .with_context(|| format!("Failed to write {}", target.display()))?;
                processed += 1;
            }
            Err(e) => {
                failed += 1;
                warn!("Failed to import {}: {:#}", file_path.display(), e);
                pb.println(format!("Error importing {}: {:#}", file_path.display(), e));
            }
        }
        pb.inc(1);
    }

    pb.finish_with_message("Completed");

    let duration = start_time.elapsed();
    info!(
        "Completed: {} imported, {} failed in {:?}",
        processed, failed, duration
    );

    println!("\n✅ Import completed!");
    println!("   Imported: {}", processed);
    println!("   Failed: {}", failed);
    println!("   Time: {:?}", duration);

    Ok(())
}

/// Read a JSON object of metric values; a missing path yields no metrics
pub fn read_metrics(path: Option<&Path>) -> anyhow::Result<Metrics> {
    let Some(path) = path else {
        return Ok(Metrics::new());
    };
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let metrics = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a JSON object of numbers", path.display()))?;
    Ok(metrics)
}

/// Handle export command
pub async fn handle_export(
    text: PathBuf,
    metrics_original: Option<PathBuf>,
    metrics_simplified: Option<PathBuf>,
    format: String,
    output: PathBuf,
) -> anyhow::Result<()> {
    let format: ExportFormat = format.parse()?;
    let body = std::fs::read_to_string(&text)
        .with_context(|| format!("Failed to read {}", text.display()))?;

    let job = ExportJob::new(body, format).with_metrics(
        read_metrics(metrics_original.as_deref())?,
        read_metrics(metrics_simplified.as_deref())?,
    );

    info!("Exporting {} to {}", text.display(), output.display());
    let bytes = tokio::task::spawn_blocking(move || job.render()).await??;
    std::fs::write(&output, &bytes)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!("✅ Exported {} ({} bytes) to {}", format, bytes.len(), output.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_collect_documents_filters_extensions() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        for name in ["b.txt", "a.PDF", "nested/c.epub", "skip.exe", "notes.md"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }

        let files = collect_documents(dir.path(), None);
        let names: Vec<String> = files
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();

        assert_eq!(names, vec!["a.PDF", "b.txt", "nested/c.epub"]);
    }

    #[tokio::test]
    async fn test_import_skips_default_output_directory() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("one.txt"), "Primeiro").unwrap();

        handle_import(dir.path().to_path_buf(), None).await.unwrap();
        handle_import(dir.path().to_path_buf(), None).await.unwrap();

        let imported = dir.path().join("imported");
        let outputs: Vec<_> = std::fs::read_dir(&imported).unwrap().collect();
        assert_eq!(outputs.len(), 1);
        assert_eq!(std::fs::read_to_string(imported.join("one.txt")).unwrap(), "Primeiro");
        assert_eq!(
            collect_documents(dir.path(), Some(imported.as_path())),
            vec![dir.path().join("one.txt")]
        );
    }

    #[test]
    fn test_text_output_path() {
        let path = text_output_path(Path::new("/in/livro.epub"), Path::new("/out"));
        assert_eq!(path, PathBuf::from("/out/livro.txt"));
    }

    #[test]
    fn test_read_metrics() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("metrics.json");
        std::fs::write(&path, r#"{"smog_index": 9.25}"#).unwrap();

        let metrics = read_metrics(Some(&path)).unwrap();
        assert_eq!(metrics.get("smog_index"), Some(&9.25));
        assert!(read_metrics(None).unwrap().is_empty());

        std::fs::write(&path, r#"{"smog_index": "high"}"#).unwrap();
        assert!(read_metrics(Some(&path)).is_err());
    }

    #[tokio::test]
    async fn test_import_directory_writes_text_files() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("docs");
        std::fs::create_dir(&input).unwrap();
        std::fs::write(input.join("one.txt"), "  Primeiro  ").unwrap();
        std::fs::write(input.join("broken.pdf"), "not a pdf").unwrap();
        let output = dir.path().join("out");

        handle_import(input, Some(output.clone())).await.unwrap();

        assert_eq!(std::fs::read_to_string(output.join("one.txt")).unwrap(), "Primeiro");
        assert!(!output.join("broken.txt").exists());
    }

    #[tokio::test]
    async fn test_export_writes_document() {
        let dir = TempDir::new().unwrap();
        let text = dir.path().join("text.txt");
        std::fs::write(&text, "Olá mundo").unwrap();
        let output = dir.path().join("out.txt");

        handle_export(text, None, None, "txt".to_string(), output.clone())
            .await
            .unwrap();

        assert!(std::fs::read_to_string(&output).unwrap().contains("Olá mundo"));
    }

    #[tokio::test]
    async fn test_export_rejects_unknown_format() {
        let dir = TempDir::new().unwrap();
        let result = handle_export(
            dir.path().join("missing.txt"),
            None,
            None,
            "xml".to_string(),
            dir.path().join("out.xml"),
        )
        .await;

        assert!(result.is_err());
    }
}
