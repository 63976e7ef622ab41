//! PDF rasterisation: every page of a document → [`PageImage`] via pdfium.
//!
//! ## Why spawn_blocking?
//!
//! The `pdfium-render` crate wraps the pdfium C++ library, which uses
//! thread-local state internally and is not safe to call from async contexts.
//! [`render_document`] moves the work onto tokio's blocking pool so the
//! runtime's worker threads never stall on CPU-heavy rendering.
//!
//! ## Why a trait?
//!
//! [`PageRenderer`] is the seam between the extractor and pdfium. The
//! production [`PdfiumRenderer`] needs a pdfium shared library at runtime;
//! tests substitute a renderer that fabricates pages so the rest of the
//! pipeline can be exercised anywhere.

use crate::config::ExtractionConfig;
use crate::error::RenderError;
use crate::pipeline::encode::{encode_page, PageImage};
use pdfium_render::prelude::*;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Environment variable naming an existing pdfium library (file or directory).
pub const PDFIUM_LIB_ENV: &str = "PDFIUM_LIB_PATH";

/// Turns a PDF on disk into ordered page images.
///
/// Implementations are called from a blocking thread and must be
/// `Send + Sync`; one instance serves a whole batch.
pub trait PageRenderer: Send + Sync {
    /// Render every page of `pdf_path`, in document order.
    fn render(&self, pdf_path: &Path) -> Result<Vec<PageImage>, RenderError>;
}

/// Run `renderer` for `pdf_path` on tokio's blocking pool.
pub async fn render_document(
    renderer: Arc<dyn PageRenderer>,
    pdf_path: PathBuf,
) -> Result<Vec<PageImage>, RenderError> {
    tokio::task::spawn_blocking(move || renderer.render(&pdf_path))
        .await
        .map_err(|e| RenderError::TaskFailed(e.to_string()))?
}

/// [`PageRenderer`] backed by pdfium.
#[derive(Debug, Clone)]
pub struct PdfiumRenderer {
    scale: f32,
    jpeg_quality: u8,
    library: Option<PathBuf>,
}

impl PdfiumRenderer {
    pub fn new(scale: f32, jpeg_quality: u8) -> Self {
        Self {
            scale,
            jpeg_quality,
            library: None,
        }
    }

    /// Bind to this pdfium library instead of `PDFIUM_LIB_PATH` / the system copy.
    pub fn with_library(mut self, path: impl Into<PathBuf>) -> Self {
        self.library = Some(path.into());
        self
    }

    pub fn from_config(config: &ExtractionConfig) -> Self {
        let renderer = Self::new(config.render_scale, config.jpeg_quality);
        match config.pdfium_lib_path {
            Some(ref path) => renderer.with_library(path.clone()),
            None => renderer,
        }
    }
}

impl Default for PdfiumRenderer {
    fn default() -> Self {
        Self::new(2.0, 95)
    }
}

impl PageRenderer for PdfiumRenderer {
    fn render(&self, pdf_path: &Path) -> Result<Vec<PageImage>, RenderError> {
        check_pdf_file(pdf_path)?;

        let pdfium = bind_pdfium(self.library.as_deref())?;
        let document = open_document(&pdfium, pdf_path)?;

        let pages = document.pages();
        let total_pages = pages.len() as usize;
        if total_pages == 0 {
            return Err(RenderError::NoPages {
                path: pdf_path.to_path_buf(),
            });
        }
        info!("PDF loaded: {} pages", total_pages);

        let render_config = PdfRenderConfig::new().scale_page_by_factor(self.scale);

        let mut images = Vec::with_capacity(total_pages);
        for (idx, page) in pages.iter().enumerate() {
            let bitmap = page.render_with_config(&render_config).map_err(|e| {
                RenderError::RasterisationFailed {
                    page: idx + 1,
                    detail: format!("{:?}", e),
                }
            })?;

            let image = bitmap.as_image();
            debug!(
                "Rendered page {} → {}x{} px",
                idx + 1,
                image.width(),
                image.height()
            );

            let encoded =
                encode_page(&image, self.jpeg_quality).map_err(|e| RenderError::EncodeFailed {
                    page: idx + 1,
                    detail: e.to_string(),
                })?;
            images.push(encoded);
        }

        Ok(images)
    }
}

/// Count the pages of a PDF without rendering them.
pub fn page_count(pdf_path: &Path, library: Option<&Path>) -> Result<usize, RenderError> {
    check_pdf_file(pdf_path)?;
    let pdfium = bind_pdfium(library)?;
    let document = open_document(&pdfium, pdf_path)?;
    Ok(document.pages().len() as usize)
}

/// Validate existence, readability and the `%PDF` header before pdfium sees the file.
fn check_pdf_file(path: &Path) -> Result<(), RenderError> {
    if !path.exists() {
        return Err(RenderError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    match std::fs::File::open(path) {
        Ok(mut f) => {
            let mut magic = [0u8; 4];
            if f.read_exact(&mut magic).is_ok() && &magic != b"%PDF" {
                return Err(RenderError::NotAPdf {
                    path: path.to_path_buf(),
                    magic,
                });
            }
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            Err(RenderError::PermissionDenied {
                path: path.to_path_buf(),
            })
        }
        Err(_) => Err(RenderError::FileNotFound {
            path: path.to_path_buf(),
        }),
    }
}

/// Bind to pdfium: explicit path, then `PDFIUM_LIB_PATH`, then the system library.
fn bind_pdfium(library: Option<&Path>) -> Result<Pdfium, RenderError> {
    let explicit = library
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os(PDFIUM_LIB_ENV).map(PathBuf::from))
        .filter(|p| !p.as_os_str().is_empty());

    let bindings = match explicit {
        Some(path) => {
            let path = if path.is_dir() {
                Pdfium::pdfium_platform_library_name_at_path(&path)
            } else {
                path
            };
            debug!("Binding pdfium from {}", path.display());
            Pdfium::bind_to_library(&path)
        }
        None => Pdfium::bind_to_system_library(),
    }
    .map_err(|e| RenderError::PdfiumBindingFailed(format!("{:?}", e)))?;

    Ok(Pdfium::new(bindings))
}

fn open_document<'a>(pdfium: &'a Pdfium, pdf_path: &Path) -> Result<PdfDocument<'a>, RenderError> {
    pdfium.load_pdf_from_file(pdf_path, None).map_err(|e| {
        let err_str = format!("{:?}", e);
        if err_str.contains("Password") || err_str.contains("password") {
            RenderError::Encrypted {
                path: pdf_path.to_path_buf(),
            }
        } else {
            RenderError::CorruptPdf {
                path: pdf_path.to_path_buf(),
                detail: err_str,
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_is_reported_before_binding() {
        let err = PdfiumRenderer::default()
            .render(Path::new("/definitely/not/here.pdf"))
            .unwrap_err();
        assert!(matches!(err, RenderError::FileNotFound { .. }), "got: {err:?}");
    }

    #[test]
    fn non_pdf_is_rejected_by_magic_bytes() {
        let mut file = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
        file.write_all(b"PK\x03\x04 definitely a zip").unwrap();

        let err = PdfiumRenderer::default().render(file.path()).unwrap_err();
        match err {
            RenderError::NotAPdf { magic, .. } => assert_eq!(&magic, b"PK\x03\x04"),
            other => panic!("expected NotAPdf, got {other:?}"),
        }
    }

    #[test]
    fn page_count_checks_the_file_first() {
        let err = page_count(Path::new("/definitely/not/here.pdf"), None).unwrap_err();
        assert!(matches!(err, RenderError::FileNotFound { .. }));
    }

    #[test]
    fn from_config_carries_scale_quality_and_library() {
        let mut config = ExtractionConfig::default();
        config.render_scale = 1.5;
        config.jpeg_quality = 80;
        config.pdfium_lib_path = Some(PathBuf::from("/opt/pdfium"));
        let r = PdfiumRenderer::from_config(&config);
        assert_eq!(r.scale, 1.5);
        assert_eq!(r.jpeg_quality, 80);
        assert_eq!(r.library.as_deref(), Some(Path::new("/opt/pdfium")));
    }

    struct Fixed(usize);

    impl PageRenderer for Fixed {
        fn render(&self, _pdf_path: &Path) -> Result<Vec<PageImage>, RenderError> {
            Ok((0..self.0).map(|i| PageImage::jpeg(format!("page{i}"))).collect())
        }
    }

    #[tokio::test]
    async fn render_document_runs_on_blocking_pool() {
        let pages = render_document(Arc::new(Fixed(3)), PathBuf::from("x.pdf"))
            .await
            .unwrap();
        let data: Vec<_> = pages.iter().map(|p| p.data.as_str()).collect();
        assert_eq!(data, ["page0", "page1", "page2"]);
    }
}
