//! # resume-forge – print-correct PDF export of a live resume preview
//!
//! This crate turns the on-screen resume preview of an editor page into a
//! self-contained HTML document and has an external headless-browser
//! service render it to PDF. The pipeline stages are:
//!
//! 1. **Parse** – page snapshot → DOM tree ([`dom`])
//! 2. **Sanitize** – strip editor-only affordances ([`sanitize`])
//! 3. **Normalize** – undo viewport scaling, pin two-column widths to the
//!    physical page ([`layout`], using [`style`] for geometry)
//! 4. **Assemble** – live page styles + profile stylesheet + print
//!    overrides around the tree ([`document`], [`profile`], [`snapshot`])
//! 5. **Export** – submit to the rendering service and save the PDF
//!    ([`service`], [`export`])
//!
//! A C-compatible FFI surface for the document-building stages is exposed
//! via the [`ffi`] module.

pub mod config;
pub mod document;
pub mod dom;
pub mod error;
pub mod export;
pub mod ffi;
pub mod layout;
pub mod pipeline;
pub mod profile;
pub mod sanitize;
pub mod service;
pub mod snapshot;
pub mod style;
pub mod templates;

// Re-exports for convenience
pub use config::ExportConfig;
pub use error::{ExportError, Result};
pub use export::{export_to_pdf, ExportClient, ExportOutcome};
pub use pipeline::{prepare_document, prepare_page, PreparedDocument};
