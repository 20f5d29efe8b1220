//! # Repository Module
//!
//! Database repository implementations for Veta.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  axum handler                                                          │
//! │       │                                                                 │
//! │       │  state.db.withdrawals().create(&input)                         │
//! │       ▼                                                                 │
//! │  WithdrawalRepository                                                  │
//! │  ├── create(&self, input)        ← inserts + assigns code, one tx      │
//! │  ├── update(&self, id, input)                                          │
//! │  ├── soft_delete(&self, id)                                            │
//! │  └── assign_code(&self, id, material_id)                               │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`MaterialRepository`](material::MaterialRepository) - Material CRUD
//! - [`ProductRepository`](product::ProductRepository) - Product CRUD
//! - [`WithdrawalRepository`](withdrawal::WithdrawalRepository) - Withdrawals and codes
//! - [`ReportRepository`](report::ReportRepository) - Report aggregation

pub mod material;
pub mod product;
pub mod report;
pub mod withdrawal;
