//! # veta-report: PDF + QR Export for Veta
//!
//! Turns an ordered [`Report`](veta_core::Report) into a printable PDF with an
//! embedded QR code summarizing the same rows.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Report (scope + ordered rows)                                         │
//! │       │                                                                 │
//! │       ├──► summary::qr_payload  → text (truncated at row boundary)     │
//! │       │         │                                                       │
//! │       │         ▼                                                       │
//! │       │    qr::QrMatrix::encode → dark/light modules                   │
//! │       │                                                                 │
//! │       ├──► pdf::plan_pages      → rows per page, level separators      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  pdf::PdfRenderer::render       → Vec<u8> ("%PDF-1.3 ...")             │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The renderer never reorders, filters or drops rows.

pub mod error;
pub mod pdf;
pub mod qr;
pub mod summary;

pub use error::{RenderError, RenderResult};
pub use pdf::{PageLayout, PdfRenderer};

/// MIME type of rendered reports.
pub const PDF_CONTENT_TYPE: &str = "application/pdf";
