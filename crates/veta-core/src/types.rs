//! # Domain Types
//!
//! Core domain types used throughout Veta.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────────┐   │
//! │  │    Material     │   │     Product     │   │     Withdrawal      │   │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────────  │   │
//! │  │  id             │◄──│  material_id    │   │  id                 │   │
//! │  │  name (unique)  │   │  name, unit     │◄──│  product_id         │   │
//! │  │  active         │   │  active         │   │  code "COB-0001"    │   │
//! │  └─────────────────┘   └─────────────────┘   │  level, quantity    │   │
//! │                                              │  withdrawn_at       │   │
//! │                                              └─────────────────────┘   │
//! │                                                                         │
//! │  Read models (joined):  WithdrawalDetail, TotalRow                      │
//! │  Write models (input):  MaterialInput, ProductInput, WithdrawalInput    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! A withdrawal has:
//! - `id`: integer row id - immutable, used for relations and ordering
//! - `code`: material-scoped business id (`TAG-NNNN`) printed on reports

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::DEFAULT_UNIT;

// =============================================================================
// Material
// =============================================================================

/// A raw-material category tracked for inventory purposes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Material {
    pub id: i64,

    /// Display name, unique across materials. Source of the code tag.
    pub name: String,

    /// Whether material is active (soft delete).
    pub active: bool,
}

// =============================================================================
// Product
// =============================================================================

/// A unit-bearing item belonging to exactly one material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    pub id: i64,
    pub material_id: i64,
    pub name: String,

    /// Unit the withdrawal quantities are expressed in ("kg", "m", ...).
    pub unit: String,

    pub active: bool,
}

// =============================================================================
// Withdrawal
// =============================================================================

/// A raw withdrawal row ("salida").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Withdrawal {
    pub id: i64,

    /// `TAG-NNNN`. `None` only for rows whose code assignment never completed.
    pub code: Option<String>,

    pub material_id: i64,
    pub product_id: i64,

    /// Mine level ("nivel") where the withdrawal happened.
    pub level: String,

    pub responsible_name: String,

    /// Amount in the product's unit. Never negative.
    pub quantity: f64,

    pub rumpero: Option<String>,
    pub worker: Option<String>,

    /// Local wall-clock time of the withdrawal.
    #[ts(as = "String")]
    pub withdrawn_at: NaiveDateTime,

    pub active: bool,
}

/// A withdrawal joined to its material and product for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct WithdrawalDetail {
    pub id: i64,
    pub code: Option<String>,
    pub material_id: i64,
    pub product_id: i64,
    /// Material name.
    pub material: String,
    /// Product name.
    pub product: String,
    pub unit: String,
    pub level: String,
    pub responsible_name: String,
    pub quantity: f64,
    pub rumpero: Option<String>,
    pub worker: Option<String>,
    #[ts(as = "String")]
    pub withdrawn_at: NaiveDateTime,
}

/// One grouped-and-summed report row.
///
/// For level-scoped totals `level` is the (constant) requested level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct TotalRow {
    pub level: String,
    pub material: String,
    pub product: String,
    pub unit: String,
    /// Sum of quantities, rounded to 2 decimals when aggregated.
    pub total_quantity: f64,
}

// =============================================================================
// Inputs
// =============================================================================
// Request bodies accept the Spanish field names the web client sends
// (`nombre`, `producto_id`, `nivel`, ...) as aliases.

/// Body of `POST /materials` and `PUT /materials/:id`.
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export)]
pub struct MaterialInput {
    #[serde(alias = "nombre")]
    pub name: String,

    /// `None` keeps the current state on update; create always starts active.
    #[serde(default, alias = "activo")]
    pub active: Option<bool>,
}

/// Body of `POST /products` and `PUT /products/:id`.
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export)]
pub struct ProductInput {
    pub material_id: i64,

    #[serde(alias = "nombre")]
    pub name: String,

    #[serde(default = "default_unit", alias = "unidad")]
    pub unit: String,

    #[serde(default, alias = "activo")]
    pub active: Option<bool>,
}

fn default_unit() -> String {
    DEFAULT_UNIT.to_string()
}

/// Body of `POST /exit` and `PUT /exit/:id`.
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export)]
pub struct WithdrawalInput {
    pub material_id: i64,

    #[serde(alias = "producto_id")]
    pub product_id: i64,

    #[serde(alias = "nivel")]
    pub level: String,

    #[serde(alias = "responsable_nombre")]
    pub responsible_name: String,

    #[serde(alias = "cantidad")]
    pub quantity: f64,

    #[serde(default)]
    pub rumpero: Option<String>,

    #[serde(default, alias = "trabajador")]
    pub worker: Option<String>,

    /// Defaults to "now" in local time when absent.
    #[serde(default, alias = "fecha_salida")]
    #[ts(as = "Option<String>")]
    pub withdrawn_at: Option<NaiveDateTime>,

    #[serde(default, alias = "activo")]
    pub active: Option<bool>,
}

// =============================================================================
// Unit Tests
// =============================================================================
