//! # veta-db: Database Layer for Veta
//!
//! This crate provides database access for Veta.
//! It uses SQLite for storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Veta Data Flow                                   │
//! │                                                                         │
//! │  HTTP handler (POST /api/exit, GET /api/reportes/...)                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     veta-db (THIS CRATE)                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories  │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │                │    │  (embedded)  │  │   │
//! │  │   │               │    │ MaterialRepo   │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ ProductRepo    │    │ 001_initial  │  │   │
//! │  │   │               │    │ WithdrawalRepo │    │ 002_codes    │  │   │
//! │  │   │               │    │ ReportRepo     │    │              │  │   │
//! │  │   └───────────────┘    └────────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database (WAL)                       │   │
//! │  │   materiales, productos, salidas, secuencias_codigo             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use veta_db::{Database, DbConfig};
//! use veta_core::ReportScope;
//!
//! let db = Database::new(DbConfig::new("./veta.db")).await?;
//!
//! let scope = ReportScope::monthly_total("2024-02")?;
//! let rows = db.reports().query(&scope).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::material::MaterialRepository;
pub use repository::product::ProductRepository;
pub use repository::report::ReportRepository;
pub use repository::withdrawal::{local_now, WithdrawalRepository};
