//! Directory-level batch: walk, extract each PDF in turn, write one JSON file.
//!
//! Documents are processed strictly one after another. Each document's
//! failure is already folded into its [`ExtractionResult`], so the loop always
//! runs to the end and the output file always holds one record per PDF found,
//! in discovery order. The only errors that surface from here are the ones
//! that make a run impossible: an unusable input directory or an unwritable
//! output path.

use crate::config::ExtractionConfig;
use crate::error::GazetteError;
use crate::extract::Extractor;
use crate::output::{BatchOutput, BatchReport, BatchStats, ExtractionResult};
use crate::pipeline::discover;
use crate::progress::ProgressCallback;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::info;

/// Sequential directory walker around one [`Extractor`].
#[derive(Clone)]
pub struct BatchRunner {
    extractor: Extractor,
    progress: Option<ProgressCallback>,
}

impl std::fmt::Debug for BatchRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchRunner")
            .field("extractor", &self.extractor)
            .field("progress", &self.progress.as_ref().map(|_| "<dyn BatchProgressCallback>"))
            .finish()
    }
}

impl BatchRunner {
    pub fn new(extractor: Extractor) -> Self {
        Self {
            extractor,
            progress: None,
        }
    }

    /// Report per-document events to `cb`.
    pub fn with_progress(mut self, cb: ProgressCallback) -> Self {
        self.progress = Some(cb);
        self
    }

    /// Build the production runner (pdfium + configured model) for `config`.
    pub fn from_config(config: &ExtractionConfig) -> Result<Self, GazetteError> {
        let runner = Self::new(Extractor::from_config(config)?);
        Ok(match config.progress_callback {
            Some(ref cb) => runner.with_progress(cb.clone()),
            None => runner,
        })
    }

    pub fn extractor(&self) -> &Extractor {
        &self.extractor
    }

    /// Extract every `*.pdf` directly inside `dir`, in discovery order.
    ///
    /// A directory without PDFs yields an empty vector.
    ///
    /// # Errors
    /// Only when `dir` itself cannot be scanned.
    pub async fn process_directory(&self, dir: &Path) -> Result<Vec<ExtractionResult>, GazetteError> {
        let pdfs = discover::discover_pdfs(dir)?;

        if pdfs.is_empty() {
            info!("No PDF files found in {}", dir.display());
            if let Some(ref cb) = self.progress {
                cb.on_no_documents(dir);
            }
            return Ok(Vec::new());
        }

        let total = pdfs.len();
        info!("Found {} PDF files to process", total);
        if let Some(ref cb) = self.progress {
            cb.on_batch_start(total);
        }

        let mut results = Vec::with_capacity(total);
        for (i, pdf_path) in pdfs.iter().enumerate() {
            let index = i + 1;
            let filename = discover::file_name_of(pdf_path);

            info!("Processing {}...", filename);
            if let Some(ref cb) = self.progress {
                cb.on_document_start(index, total, &filename);
            }

            let result = self.extractor.extract_document(pdf_path).await;

            info!("Completed processing {}", filename);
            if let Some(ref cb) = self.progress {
                cb.on_document_complete(index, total, &result);
            }
            results.push(result);
        }

        let stats = BatchStats::from_results(&results);
        info!(
            "Batch complete: {}/{} documents extracted, {} failed",
            stats.succeeded, stats.total, stats.failed
        );
        if let Some(ref cb) = self.progress {
            cb.on_batch_complete(&stats);
        }

        Ok(results)
    }
}

/// Run one full batch for `config` and write the output file.
///
/// # Errors
/// Returns `Err(GazetteError)` only for fatal errors:
/// - no API key / invalid model configuration
/// - input directory missing or not a directory
/// - output file cannot be written
pub async fn run(config: &ExtractionConfig) -> Result<BatchReport, GazetteError> {
    let runner = BatchRunner::from_config(config)?;
    let results = runner.process_directory(&config.input_directory).await?;

    let output_path = config.resolved_output_path();
    write_output(&output_path, &results).await?;
    info!("Results saved to {}", output_path.display());

    Ok(BatchReport {
        stats: BatchStats::from_results(&results),
        results,
        output_path: Some(output_path),
    })
}

/// Synchronous wrapper around [`run`].
///
/// Creates a temporary tokio runtime internally.
pub fn run_sync(config: &ExtractionConfig) -> Result<BatchReport, GazetteError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| GazetteError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(run(config))
}

/// Serialise results as the output document.
///
/// Two-space indentation, UTF-8 with non-ASCII characters left unescaped,
/// trailing newline.
pub fn render_output(results: &[ExtractionResult]) -> Result<String, GazetteError> {
    let mut json = serde_json::to_string_pretty(&BatchOutput { results })?;
    json.push('\n');
    Ok(json)
}

/// Write the output document to `path`.
///
/// Uses atomic write (temp file + rename) so an interrupted run never leaves
/// a truncated results file behind.
pub async fn write_output(path: &Path, results: &[ExtractionResult]) -> Result<(), GazetteError> {
    let json = render_output(results)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| GazetteError::OutputWriteFailed {
                path: path.to_path_buf(),
                source: e,
            })?;
    }

    let tmp_path = temp_path_for(path);
    tokio::fs::write(&tmp_path, json.as_bytes())
        .await
        .map_err(|e| GazetteError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(|e| GazetteError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DocumentError;
    use serde_json::json;

    #[test]
    fn output_is_pretty_and_keeps_non_ascii() {
        let results = vec![ExtractionResult::success(
            "a.pdf",
            1,
            json!({"original": {"Company Name": "Société Anonyme Brasserie Überlé"}}),
        )];
        let text = render_output(&results).unwrap();
        assert!(text.starts_with("{\n  \"results\": [\n"), "got: {text}");
        assert!(text.contains("Société Anonyme Brasserie Überlé"));
        assert!(!text.contains("\\u00e9"));
        assert!(text.ends_with("}\n"));
    }

    #[test]
    fn empty_results_render_as_empty_array() {
        let value: serde_json::Value = serde_json::from_str(&render_output(&[]).unwrap()).unwrap();
        assert_eq!(value, json!({"results": []}));
    }

    #[test]
    fn temp_path_appends_suffix() {
        assert_eq!(
            temp_path_for(Path::new("/out/results.json")),
            PathBuf::from("/out/results.json.tmp")
        );
    }

    #[tokio::test]
    async fn write_output_creates_parents_and_leaves_no_temp_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested/dir/out.json");
        let results = vec![ExtractionResult::failed("x.pdf", 0, DocumentError::EmptyResponse)];

        write_output(&path, &results).await.unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, render_output(&results).unwrap());
        assert!(!temp_path_for(&path).exists());
    }

    #[tokio::test]
    async fn write_output_into_missing_root_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("file");
        std::fs::write(&blocker, b"x").unwrap();
        let err = write_output(&blocker.join("out.json"), &[]).await.unwrap_err();
        assert!(matches!(err, GazetteError::OutputWriteFailed { .. }));
    }
}
