//! Export of text and readability metrics to PDF, DOCX and TXT

use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::core::errors::{Result, ServiceError};
use crate::core::models::Metrics;
use crate::processors::format::ExportFormat;
use crate::processors::{docx, pdf};

pub const TITLE: &str = "Texto Simplificado e Traduzido:";
pub const ORIGINAL_METRICS_TITLE: &str = "Métricas do Texto Original:";
pub const SIMPLIFIED_METRICS_TITLE: &str = "Métricas do Texto Simplificado:";

/// Display labels for known metric keys
const METRIC_LABELS: &[(&str, &str)] = &[
    ("flesch_reading_ease", "Índice de Flesch Reading Ease"),
    ("flesch_kincaid_grade", "Grau de Flesch-Kincaid"),
    ("smog_index", "Índice SMOG"),
    ("coleman_liau_index", "Índice de Coleman-Liau"),
    ("automated_readability_index", "Índice ARI"),
    ("dale_chall_readability_score", "Pontuação de Dale-Chall"),
];

/// Label for a metric key, falling back to the key itself
pub fn metric_label(key: &str) -> &str {
    METRIC_LABELS
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, label)| *label)
        .unwrap_or(key)
}

/// `label: value` with the value at two decimals
pub fn format_metric(key: &str, value: f64) -> String {
    format!("{}: {:.2}", metric_label(key), value)
}

/// A titled block of formatted metric lines
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSection {
    pub title: &'static str,
    pub lines: Vec<String>,
}

/// One export: text, both metric mappings, and the target format
#[derive(Debug, Clone)]
pub struct ExportJob {
    pub text: String,
    pub metrics_original: Metrics,
    pub metrics_simplified: Metrics,
    pub format: ExportFormat,
}

impl ExportJob {
    pub fn new(text: impl Into<String>, format: ExportFormat) -> Self {
        Self {
            text: text.into(),
            metrics_original: Metrics::new(),
            metrics_simplified: Metrics::new(),
            format,
        }
    }

    pub fn with_metrics(mut self, original: Metrics, simplified: Metrics) -> Self {
        self.metrics_original = original;
        self.metrics_simplified = simplified;
        self
    }

    /// Non-empty metric mappings, original before simplified
    pub fn metric_sections(&self) -> Vec<MetricSection> {
        [
            (ORIGINAL_METRICS_TITLE, &self.metrics_original),
            (SIMPLIFIED_METRICS_TITLE, &self.metrics_simplified),
        ]
        .into_iter()
        .filter(|(_, metrics)| !metrics.is_empty())
        .map(|(title, metrics)| MetricSection {
            title,
            lines: metrics
                .iter()
                .map(|(key, value)| format_metric(key, *value))
                .collect(),
        })
        .collect()
    }

    /// Render the document into memory
    pub fn render(&self) -> Result<Vec<u8>> {
        debug!("Rendering {} export ({} chars)", self.format, self.text.len());
        match self.format {
            ExportFormat::Txt => Ok(render_txt(self).into_bytes()),
            ExportFormat::Docx => docx::render(self),
            ExportFormat::Pdf => pdf::render(self),
        }
    }
}

/// Plain text rendering
pub fn render_txt(job: &ExportJob) -> String {
    let mut out = String::new();
    out.push_str(TITLE);
    out.push('\n');
    out.push_str(&job.text);
    out.push_str("\n\n");

    for (i, section) in job.metric_sections().iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(section.title);
        out.push('\n');
        for line in &section.lines {
            out.push_str(line);
            out.push('\n');
        }
    }

    out
}

/// Render `job` and write it to a new uniquely named file in `dir`
pub fn export_document(job: &ExportJob, dir: &Path) -> Result<PathBuf> {
    let bytes = job.render()?;

    let mut file = tempfile::Builder::new()
        .prefix("export-")
        .suffix(&format!(".{}", job.format.extension()))
        .tempfile_in(dir)
        .map_err(|e| ServiceError::export(job.format, e))?;
    file.write_all(&bytes)
        .map_err(|e| ServiceError::export(job.format, e))?;

    let (_, path) = file
        .keep()
        .map_err(|e| ServiceError::export(job.format, e.error))?;

    info!("Exported {} bytes to {}", bytes.len(), path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processors::import::import_document;

    fn metrics(entries: &[(&str, f64)]) -> Metrics {
        entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_metric_label_fallback() {
        assert_eq!(metric_label("smog_index"), "Índice SMOG");
        assert_eq!(metric_label("lix"), "lix");
    }

    #[test]
    fn test_format_metric_two_decimals() {
        assert_eq!(format_metric("flesch_reading_ease", 55.5), "Índice de Flesch Reading Ease: 55.50");
        assert_eq!(format_metric("x", 3.0), "x: 3.00");
        assert_eq!(format_metric("x", 2.345678), "x: 2.35");
        assert_eq!(format_metric("x", -1.0), "x: -1.00");
    }

    #[test]
    fn test_render_txt_layout() {
        let job = ExportJob::new("Olá mundo", ExportFormat::Txt).with_metrics(
            metrics(&[("flesch_reading_ease", 55.5)]),
            metrics(&[("flesch_reading_ease", 70.25), ("smog_index", 8.0)]),
        );

        let expected = "Texto Simplificado e Traduzido:\n\
                        Olá mundo\n\
                        \n\
                        Métricas do Texto Original:\n\
                        Índice de Flesch Reading Ease: 55.50\n\
                        \n\
                        Métricas do Texto Simplificado:\n\
                        Índice de Flesch Reading Ease: 70.25\n\
                        Índice SMOG: 8.00\n";
        assert_eq!(render_txt(&job), expected);
    }

    #[test]
    fn test_metrics_keep_input_order() {
        let original: Metrics = serde_json::from_str(
            r#"{"smog_index": 8.0, "flesch_reading_ease": 55.5, "automated_readability_index": 3.0}"#,
        )
        .unwrap();
        let job = ExportJob::new("t", ExportFormat::Txt).with_metrics(original, Metrics::new());

        let sections = job.metric_sections();
        assert_eq!(
            sections[0].lines,
            vec![
                "Índice SMOG: 8.00",
                "Índice de Flesch Reading Ease: 55.50",
                "Índice ARI: 3.00",
            ]
        );

        let out = render_txt(&job);
        let smog = out.find("Índice SMOG").unwrap();
        let flesch = out.find("Índice de Flesch").unwrap();
        assert!(smog < flesch);
    }

    #[test]
    fn test_render_txt_without_metrics() {
        let job = ExportJob::new("só texto", ExportFormat::Txt);
        assert_eq!(render_txt(&job), "Texto Simplificado e Traduzido:\nsó texto\n\n");
    }

    #[test]
    fn test_original_metrics_alone_are_rendered() {
        let job = ExportJob::new("t", ExportFormat::Txt)
            .with_metrics(metrics(&[("flesch_reading_ease", 55.5)]), Metrics::new());

        let out = render_txt(&job);
        assert!(out.lines().any(|l| l == "Índice de Flesch Reading Ease: 55.50"));
        assert!(!out.contains(SIMPLIFIED_METRICS_TITLE));
    }

    #[test]
    fn test_export_paths_are_unique() {
        let dir = tempfile::tempdir().unwrap();
        let job = ExportJob::new("texto", ExportFormat::Txt);

        let first = export_document(&job, dir.path()).unwrap();
        let second = export_document(&job, dir.path()).unwrap();

        assert_ne!(first, second);
        assert_eq!(first.extension().unwrap(), "txt");
        assert!(first.starts_with(dir.path()));
    }

    #[test]
    fn test_txt_round_trip_preserves_text() {
        let dir = tempfile::tempdir().unwrap();
        let text = "Primeira linha\nSegunda linha com acentuação: ção, é, ü";
        let job = ExportJob::new(text, ExportFormat::Txt)
            .with_metrics(metrics(&[("smog_index", 9.1)]), metrics(&[("smog_index", 7.3)]));

        let path = export_document(&job, dir.path()).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        let imported = import_document("output.txt", &bytes).unwrap();

        assert!(imported.contains(text));
    }

    #[test]
    fn test_every_format_renders() {
        for format in ExportFormat::ALL {
            let job = ExportJob::new("Linha um\nLinha dois", format).with_metrics(
                metrics(&[("coleman_liau_index", 12.0)]),
                metrics(&[("coleman_liau_index", 9.5)]),
            );
            let bytes = job.render().unwrap();
            assert!(!bytes.is_empty(), "{format} produced no output");
        }
    }
}
