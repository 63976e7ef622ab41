//! Pipeline stages for gazette extraction.
//!
//! Each submodule implements exactly one transformation step, so each can be
//! tested on its own and the rendering backend can be swapped without
//! touching the model call.
//!
//! ## Data Flow
//!
//! ```text
//! discover ──▶ render ──▶ encode ──▶ llm ──▶ parse
//! (*.pdf)      (pdfium)   (JPEG/b64) (VLM)   (JSON)
//! ```
//!
//! 1. [`discover`] : list `*.pdf` files in the input directory
//! 2. [`render`]   : rasterise every page at 2×; runs in `spawn_blocking`
//!    because pdfium is not async-safe
//! 3. [`encode`]   : JPEG-encode and base64-wrap each page for the request body
//! 4. [`llm`]      : compose the single request and await the model; the only
//!    stage with network I/O
//! 5. [`parse`]    : turn the reply's first text block into a JSON value

pub mod discover;
pub mod encode;
pub mod llm;
pub mod parse;
pub mod render;
