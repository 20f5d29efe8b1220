//! # veta-core: Pure Domain Logic for Veta
//!
//! This crate holds the rules of the withdrawal log as pure functions with
//! zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Veta Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Web client (forms, downloads)                │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ HTTP /api                              │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    apps/api (axum handlers)                     │   │
//! │  └──────────────┬──────────────────────────────────┬───────────────┘   │
//! │                 │                                  │                    │
//! │  ┌──────────────▼──────────────────────────────┐   │                    │
//! │  │          ★ veta-core (THIS CRATE) ★         │   │                    │
//! │  │                                             │   │                    │
//! │  │   ┌─────────┐ ┌─────────┐ ┌──────────────┐  │   │                    │
//! │  │   │  types  │ │  code   │ │    report    │  │   │                    │
//! │  │   │Material │ │ COB-0001│ │ ReportScope  │  │   │                    │
//! │  │   │Withdraw.│ │  tags   │ │ Column, Rows │  │   │                    │
//! │  │   └─────────┘ └─────────┘ └──────────────┘  │   │                    │
//! │  │                                             │   │                    │
//! │  │   NO I/O • NO DATABASE • NO CLOCK           │   │                    │
//! │  └──────────────┬──────────────────────────────┘   │                    │
//! │                 │                                  │                    │
//! │  ┌──────────────▼──────────────┐   ┌───────────────▼──────────────┐    │
//! │  │   veta-db (SQLite, codes,   │   │  veta-report (PDF + QR)      │    │
//! │  │   report aggregation)       │   │                              │    │
//! │  └─────────────────────────────┘   └──────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Material, Product, Withdrawal, report rows)
//! - [`code`] - Withdrawal code tags and `TAG-NNNN` formatting
//! - [`report`] - Report scopes, time windows and printable columns
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Example Usage
//!
//! ```rust
//! use veta_core::code::WithdrawalCode;
//! use veta_core::report::ReportScope;
//!
//! assert_eq!(WithdrawalCode::new("Cobre", 3).to_string(), "COB-0003");
//!
//! let scope = ReportScope::monthly_total("2024-02").unwrap();
//! assert_eq!(scope.file_name(), "reporte_mensual_total_2024-02.pdf");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod code;
pub mod error;
pub mod report;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use code::WithdrawalCode;
pub use error::{CoreError, ValidationError};
pub use report::{Column, Report, ReportRows, ReportScope, TableRow, YearMonth};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Characters of the material name used in a withdrawal code.
pub const CODE_TAG_LEN: usize = 3;

/// Filler for material names shorter than [`CODE_TAG_LEN`] usable characters.
pub const CODE_TAG_PAD: char = 'X';

/// Minimum digits of the sequence part; larger sequences widen the code.
pub const CODE_SEQUENCE_WIDTH: usize = 4;

/// Unit assigned to products created without one.
pub const DEFAULT_UNIT: &str = "unidad";

/// Maximum length of names (materials, products, people).
pub const MAX_NAME_LEN: usize = 200;

/// Maximum length of a level label or unit.
pub const MAX_LEVEL_LEN: usize = 50;
