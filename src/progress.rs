//! Progress-callback trait for per-document batch events.
//!
//! Inject an [`Arc<dyn BatchProgressCallback>`] via
//! [`crate::config::ExtractionConfigBuilder::progress_callback`] to receive
//! events as the walker moves through the input directory. The CLI uses this
//! to drive its progress bar; library callers can forward events anywhere.
//!
//! # Example
//!
//! ```rust
//! use gazette_extract::{BatchProgressCallback, ExtractionConfig, ExtractionResult};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     done: AtomicUsize,
//! }
//!
//! impl BatchProgressCallback for CountingCallback {
//!     fn on_document_complete(&self, index: usize, total: usize, result: &ExtractionResult) {
//!         self.done.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{}/{} {}", index, total, result.filename);
//!     }
//! }
//!
//! let config = ExtractionConfig::builder()
//!     .api_key("sk-ant-...")
//!     .progress_callback(Arc::new(CountingCallback { done: AtomicUsize::new(0) }))
//!     .build()
//!     .unwrap();
//! ```

use crate::output::{BatchStats, ExtractionResult};
use std::path::Path;
use std::sync::Arc;

/// Called by the directory walker as it processes each document.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Documents are processed one at a time, so events
/// never overlap, but the trait is `Send + Sync` so a callback can be shared
/// with other tasks.
pub trait BatchProgressCallback: Send + Sync {
    /// Called once when the input directory holds no PDFs.
    fn on_no_documents(&self, directory: &Path) {
        let _ = directory;
    }

    /// Called once before the first document.
    ///
    /// # Arguments
    /// * `total` : number of PDFs that will be processed
    fn on_batch_start(&self, total: usize) {
        let _ = total;
    }

    /// Called just before a document is rendered.
    ///
    /// # Arguments
    /// * `index`    : 1-indexed position in the batch
    /// * `total`    : number of PDFs in the batch
    /// * `filename` : base name of the PDF
    fn on_document_start(&self, index: usize, total: usize, filename: &str) {
        let _ = (index, total, filename);
    }

    /// Called after a document produced its result, success or failure.
    fn on_document_complete(&self, index: usize, total: usize, result: &ExtractionResult) {
        let _ = (index, total, result);
    }

    /// Called once after every document has been attempted.
    fn on_batch_complete(&self, stats: &BatchStats) {
        let _ = stats;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl BatchProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ExtractionConfig`].
pub type ProgressCallback = Arc<dyn BatchProgressCallback>;
