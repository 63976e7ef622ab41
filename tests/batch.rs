//! Batch integration tests.
//!
//! These run the full directory walk against a temporary input directory with
//! a stub page renderer and a scripted model, so they need neither pdfium nor
//! network access.

use async_trait::async_trait;
use gazette_extract::{
    render_output, run, BatchProgressCallback, BatchRunner, BatchStats, ContentBlock,
    DocumentError, ExtractionConfig, ExtractionResult, Extractor, GazetteError, ModelError,
    ModelReply, PageImage, PageRenderer, RenderError, VisionModel,
};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

// ── Test doubles ─────────────────────────────────────────────────────────────

/// Renders `<stem>_<n>p.pdf` as `n` pages; anything else as one page.
/// Files whose name contains `corrupt` fail to render.
struct NamedPagesRenderer;

impl PageRenderer for NamedPagesRenderer {
    fn render(&self, pdf_path: &Path) -> Result<Vec<PageImage>, RenderError> {
        let stem = pdf_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        if stem.contains("corrupt") {
            return Err(RenderError::CorruptPdf {
                path: pdf_path.to_path_buf(),
                detail: "no xref table".into(),
            });
        }
        let pages = stem
            .rsplit('_')
            .next()
            .and_then(|tail| tail.strip_suffix('p'))
            .and_then(|n| n.parse::<usize>().ok())
            .unwrap_or(1);
        Ok((0..pages)
            .map(|i| PageImage::jpeg(format!("{stem}-page-{i}")))
            .collect())
    }
}

/// Answers from a script keyed on the first image's data prefix, recording
/// every request it receives.
struct ScriptedModel {
    requests: Mutex<Vec<Vec<ContentBlock>>>,
}

impl ScriptedModel {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            requests: Mutex::new(Vec::new()),
        })
    }

    fn image_counts(&self) -> Vec<usize> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|blocks| blocks.iter().filter(|b| b.is_image()).count())
            .collect()
    }
}

fn first_image_data(content: &[ContentBlock]) -> String {
    let value = serde_json::to_value(content).unwrap();
    value[0]["source"]["data"].as_str().unwrap_or("").to_string()
}

#[async_trait]
impl VisionModel for ScriptedModel {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, content: &[ContentBlock]) -> Result<ModelReply, ModelError> {
        self.requests.lock().unwrap().push(content.to_vec());
        let key = first_image_data(content);
        if key.starts_with("garbled") {
            Ok(ModelReply::text("Sorry, the scan is unreadable."))
        } else if key.starts_with("offline") {
            Err(ModelError::Api {
                status: 529,
                message: "Overloaded".into(),
            })
        } else {
            let company = key.split("-page-").next().unwrap_or("").to_uppercase();
            Ok(ModelReply::text(
                json!({
                    "original": {
                        "Company Name": format!("{company} SA"),
                        "Registration Number": "0123.456.789",
                        "Purpose": "Nomination d'administrateur"
                    },
                    "english": {
                        "Company Name": format!("{company} SA"),
                        "Registration Number": "0123.456.789",
                        "Purpose": "Appointment of director"
                    }
                })
                .to_string(),
            ))
        }
    }
}

#[derive(Default)]
struct RecordingCallback {
    events: Mutex<Vec<String>>,
}

impl BatchProgressCallback for RecordingCallback {
    fn on_no_documents(&self, _directory: &Path) {
        self.events.lock().unwrap().push("none".into());
    }

    fn on_batch_start(&self, total: usize) {
        self.events.lock().unwrap().push(format!("start {total}"));
    }

    fn on_document_start(&self, index: usize, total: usize, filename: &str) {
        self.events
            .lock()
            .unwrap()
            .push(format!("doc {index}/{total} {filename}"));
    }

    fn on_document_complete(&self, index: usize, _total: usize, result: &ExtractionResult) {
        let status = if result.is_success() { "ok" } else { "err" };
        self.events
            .lock()
            .unwrap()
            .push(format!("done {index} {status}"));
    }

    fn on_batch_complete(&self, stats: &BatchStats) {
        self.events
            .lock()
            .unwrap()
            .push(format!("end {}/{}", stats.succeeded, stats.total));
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

fn runner(model: Arc<ScriptedModel>) -> BatchRunner {
    BatchRunner::new(Extractor::new(
        Arc::new(NamedPagesRenderer),
        model,
        &ExtractionConfig::default(),
    ))
}

fn input_dir(files: &[&str]) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    for name in files {
        std::fs::write(dir.path().join(name), b"%PDF-1.4\n").unwrap();
    }
    dir
}

fn to_json(results: &[ExtractionResult]) -> Value {
    serde_json::from_str(&render_output(results).unwrap()).unwrap()
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn empty_directory_yields_empty_results() {
    let dir = input_dir(&["notes.txt"]);
    let model = ScriptedModel::new();
    let cb = Arc::new(RecordingCallback::default());

    let results = runner(model.clone())
        .with_progress(cb.clone())
        .process_directory(dir.path())
        .await
        .unwrap();

    assert!(results.is_empty());
    assert_eq!(to_json(&results), json!({"results": []}));
    assert!(model.requests.lock().unwrap().is_empty());
    assert_eq!(*cb.events.lock().unwrap(), vec!["none".to_string()]);
}

#[tokio::test]
async fn mixed_batch_keeps_order_and_isolates_failures() {
    let dir = input_dir(&["acme_1p.pdf", "brabo_3p.pdf", "garbled_1p.pdf"]);
    let model = ScriptedModel::new();

    let results = runner(model.clone())
        .process_directory(dir.path())
        .await
        .unwrap();

    let names: Vec<&str> = results.iter().map(|r| r.filename.as_str()).collect();
    assert_eq!(names, ["acme_1p.pdf", "brabo_3p.pdf", "garbled_1p.pdf"]);

    // Every page of a document travels in the same single request.
    assert_eq!(model.image_counts(), vec![1, 3, 1]);
    assert_eq!(results[1].page_count, 3);

    let value = to_json(&results);
    assert_eq!(
        value["results"][0]["extracted_data"]["original"]["Company Name"],
        "ACME_1P SA"
    );
    assert_eq!(
        value["results"][1]["extracted_data"]["english"]["Purpose"],
        "Appointment of director"
    );
    assert_eq!(
        value["results"][2],
        json!({
            "filename": "garbled_1p.pdf",
            "status": "error",
            "error": "Failed to parse JSON response",
            "raw_response": "Sorry, the scan is unreadable."
        })
    );
}

#[tokio::test]
async fn every_request_ends_with_the_instruction() {
    let dir = input_dir(&["a_2p.pdf"]);
    let model = ScriptedModel::new();
    runner(model.clone())
        .process_directory(dir.path())
        .await
        .unwrap();

    let requests = model.requests.lock().unwrap();
    let last = requests[0].last().unwrap();
    assert!(!last.is_image());
    let text = serde_json::to_value(last).unwrap()["text"]
        .as_str()
        .unwrap()
        .to_string();
    assert!(text.contains("Belgian Official Gazette"), "got: {text}");
}

#[tokio::test]
async fn model_and_render_failures_have_no_raw_response() {
    let dir = input_dir(&["corrupt.pdf", "offline_2p.pdf"]);
    let results = runner(ScriptedModel::new())
        .process_directory(dir.path())
        .await
        .unwrap();

    assert_eq!(results.len(), 2);
    assert!(matches!(
        results[0].error(),
        Some(DocumentError::Render(RenderError::CorruptPdf { .. }))
    ));
    assert_eq!(
        results[1].error(),
        Some(&DocumentError::Model(ModelError::Api {
            status: 529,
            message: "Overloaded".into()
        }))
    );

    for entry in to_json(&results)["results"].as_array().unwrap() {
        assert_eq!(entry["status"], "error");
        assert!(entry["error"].as_str().is_some_and(|e| !e.is_empty()));
        assert!(entry.get("raw_response").is_none(), "entry: {entry}");
        assert!(entry.get("extracted_data").is_none());
    }
}

#[tokio::test]
async fn reruns_produce_identical_output() {
    let dir = input_dir(&["zeta_2p.pdf", "alpha_1p.pdf", "garbled_1p.pdf"]);

    let first = runner(ScriptedModel::new())
        .process_directory(dir.path())
        .await
        .unwrap();
    let second = runner(ScriptedModel::new())
        .process_directory(dir.path())
        .await
        .unwrap();

    assert_eq!(
        render_output(&first).unwrap(),
        render_output(&second).unwrap()
    );
    assert_eq!(first[0].filename, "alpha_1p.pdf");
}

#[tokio::test]
async fn missing_directory_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope");
    let err = runner(ScriptedModel::new())
        .process_directory(&missing)
        .await
        .unwrap_err();
    assert!(matches!(err, GazetteError::InputDirectoryNotFound { .. }));
}

#[tokio::test]
async fn progress_events_follow_the_walk() {
    let dir = input_dir(&["a_1p.pdf", "garbled_1p.pdf"]);
    let cb = Arc::new(RecordingCallback::default());

    runner(ScriptedModel::new())
        .with_progress(cb.clone())
        .process_directory(dir.path())
        .await
        .unwrap();

    assert_eq!(
        *cb.events.lock().unwrap(),
        vec![
            "start 2",
            "doc 1/2 a_1p.pdf",
            "done 1 ok",
            "doc 2/2 garbled_1p.pdf",
            "done 2 err",
            "end 1/2",
        ]
    );
}

#[tokio::test]
async fn run_writes_default_output_file() {
    let dir = input_dir(&["offline_1p.pdf"]);
    let config = ExtractionConfig::builder()
        .input_directory(dir.path())
        .provider(ScriptedModel::new())
        .build()
        .unwrap();

    // `run` uses the pdfium renderer; without the library (or with our fake
    // PDF bytes) the document becomes an error record, never a fatal error.
    let report = tokio_test::assert_ok!(run(&config).await);

    let expected: PathBuf = dir.path().join("extracted_gazette_info.json");
    assert_eq!(report.output_path.as_deref(), Some(expected.as_path()));
    assert_eq!(report.stats.total, 1);

    let written = std::fs::read_to_string(&expected).unwrap();
    assert_eq!(written, render_output(&report.results).unwrap());
    let value: Value = serde_json::from_str(&written).unwrap();
    assert_eq!(value["results"][0]["filename"], "offline_1p.pdf");
}

#[tokio::test]
async fn run_honours_output_path() {
    let dir = input_dir(&[]);
    let out = dir.path().join("reports/gazette.json");
    let config = ExtractionConfig::builder()
        .input_directory(dir.path())
        .output_path(&out)
        .provider(ScriptedModel::new())
        .build()
        .unwrap();

    let report = run(&config).await.unwrap();
    assert!(report.results.is_empty());
    assert_eq!(
        std::fs::read_to_string(&out).unwrap(),
        "{\n  \"results\": []\n}\n"
    );
}
