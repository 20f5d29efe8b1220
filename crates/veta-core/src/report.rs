//! # Report Scopes
//!
//! Pure description of what a report covers and how it is laid out.
//!
//! ## Scope → Query → Rows
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Report Pipeline                                  │
//! │                                                                         │
//! │  GET /reportes/mensual-total/2024-02/1200                              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ReportScope::monthly_level_total("2024-02", "1200")   ← THIS MODULE   │
//! │       │   validates token + level, fixes window [Feb 1, Mar 1)          │
//! │       ▼                                                                 │
//! │  veta-db ReportRepository::query(&scope) → ReportRows                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Report::new(scope, rows)  → None when the window is empty (404)        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  veta-report PdfRenderer::render(&report) → PDF bytes                   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Row order is decided by the query and is significant: the renderer groups
//! consecutive rows with the same level, so nothing downstream may reorder.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::ValidationError;
use crate::types::{TotalRow, WithdrawalDetail};
use crate::validation::{validate_level, ValidationResult};

// =============================================================================
// Time Windows
// =============================================================================

/// Half-open interval `[start, end)` of local timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TimeWindow {
    /// The whole calendar day `date`.
    pub fn day(date: NaiveDate) -> Self {
        let next = date.succ_opt().unwrap_or(NaiveDate::MAX);
        TimeWindow {
            start: midnight(date),
            end: midnight(next),
        }
    }

    pub fn contains(&self, ts: NaiveDateTime) -> bool {
        self.start <= ts && ts < self.end
    }
}

fn midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::default())
}

// =============================================================================
// Year-Month Token
// =============================================================================

/// A calendar month parsed from a `YYYY-MM` token.
///
/// ## Example
/// ```rust
/// use veta_core::report::YearMonth;
///
/// assert!("2024-02".parse::<YearMonth>().is_ok());
/// assert!("2024-13".parse::<YearMonth>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    first: NaiveDate,
    next_first: NaiveDate,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> ValidationResult<Self> {
        let (next_year, next_month) = if month == 12 {
            (year + 1, 1)
        } else {
            (year, month + 1)
        };

        let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid_year_month)?;
        let next_first =
            NaiveDate::from_ymd_opt(next_year, next_month, 1).ok_or_else(invalid_year_month)?;

        Ok(YearMonth { first, next_first })
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first
    }

    pub fn window(&self) -> TimeWindow {
        TimeWindow {
            start: midnight(self.first),
            end: midnight(self.next_first),
        }
    }
}

fn invalid_year_month() -> ValidationError {
    ValidationError::InvalidFormat {
        field: "yearMonth".to_string(),
        reason: "expected a calendar month as YYYY-MM".to_string(),
    }
}

impl FromStr for YearMonth {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (year, month) = s.split_once('-').ok_or_else(invalid_year_month)?;

        let well_formed = year.len() == 4
            && month.len() == 2
            && year.chars().all(|c| c.is_ascii_digit())
            && month.chars().all(|c| c.is_ascii_digit());
        if !well_formed {
            return Err(invalid_year_month());
        }

        let year: i32 = year.parse().map_err(|_| invalid_year_month())?;
        let month: u32 = month.parse().map_err(|_| invalid_year_month())?;
        if year == 0 {
            return Err(invalid_year_month());
        }

        YearMonth::new(year, month)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.first.format("%Y-%m"))
    }
}

// =============================================================================
// Report Scope
// =============================================================================

/// Which withdrawals a report covers and whether they are summed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportScope {
    /// Every withdrawal of one local calendar day.
    Daily { date: NaiveDate },
    /// Every withdrawal of one month.
    Monthly { month: YearMonth },
    /// One month, summed per (level, material, product, unit).
    MonthlyTotal { month: YearMonth },
    /// One month, one level.
    MonthlyLevel { month: YearMonth, level: String },
    /// One month, one level, summed per (material, product, unit).
    MonthlyLevelTotal { month: YearMonth, level: String },
}

impl ReportScope {
    /// Daily scope. Callers pass today's local date.
    pub fn daily(date: NaiveDate) -> Self {
        ReportScope::Daily { date }
    }

    pub fn monthly(year_month: &str) -> ValidationResult<Self> {
        Ok(ReportScope::Monthly {
            month: year_month.parse()?,
        })
    }

    pub fn monthly_total(year_month: &str) -> ValidationResult<Self> {
        Ok(ReportScope::MonthlyTotal {
            month: year_month.parse()?,
        })
    }

    pub fn monthly_level(year_month: &str, level: &str) -> ValidationResult<Self> {
        Ok(ReportScope::MonthlyLevel {
            month: year_month.parse()?,
            level: validate_level(level)?,
        })
    }

    pub fn monthly_level_total(year_month: &str, level: &str) -> ValidationResult<Self> {
        Ok(ReportScope::MonthlyLevelTotal {
            month: year_month.parse()?,
            level: validate_level(level)?,
        })
    }

    /// Timestamps covered by this scope.
    pub fn window(&self) -> TimeWindow {
        match self {
            ReportScope::Daily { date } => TimeWindow::day(*date),
            ReportScope::Monthly { month }
            | ReportScope::MonthlyTotal { month }
            | ReportScope::MonthlyLevel { month, .. }
            | ReportScope::MonthlyLevelTotal { month, .. } => month.window(),
        }
    }

    /// The level filter, if any.
    pub fn level(&self) -> Option<&str> {
        match self {
            ReportScope::MonthlyLevel { level, .. } | ReportScope::MonthlyLevelTotal { level, .. } => {
                Some(level)
            }
            _ => None,
        }
    }

    /// Whether rows are grouped and summed.
    pub fn is_total(&self) -> bool {
        matches!(
            self,
            ReportScope::MonthlyTotal { .. } | ReportScope::MonthlyLevelTotal { .. }
        )
    }

    /// Human label of the window ("2024-02-05", "2024-02", "2024-02 / Nivel 1200").
    pub fn label(&self) -> String {
        match self {
            ReportScope::Daily { date } => date.format("%Y-%m-%d").to_string(),
            ReportScope::Monthly { month } | ReportScope::MonthlyTotal { month } => {
                month.to_string()
            }
            ReportScope::MonthlyLevel { month, level }
            | ReportScope::MonthlyLevelTotal { month, level } => {
                format!("{} / Nivel {}", month, level)
            }
        }
    }

    /// Printed title of the report.
    pub fn title(&self) -> String {
        let kind = match self {
            ReportScope::Daily { .. } => "Reporte de Salidas",
            ReportScope::Monthly { .. } | ReportScope::MonthlyLevel { .. } => {
                "Reporte Mensual de Salidas"
            }
            ReportScope::MonthlyTotal { .. } | ReportScope::MonthlyLevelTotal { .. } => {
                "Reporte Mensual Total de Salidas"
            }
        };
        format!("{} - {}", kind, self.label())
    }

    /// Attachment file name (ASCII, no spaces).
    pub fn file_name(&self) -> String {
        let stem = match self {
            ReportScope::Daily { date } => format!("reporte_{}", date.format("%Y-%m-%d")),
            ReportScope::Monthly { month } => format!("reporte_mensual_{}", month),
            ReportScope::MonthlyTotal { month } => format!("reporte_mensual_total_{}", month),
            ReportScope::MonthlyLevel { month, level } => {
                format!("reporte_mensual_{}_nivel_{}", month, file_safe(level))
            }
            ReportScope::MonthlyLevelTotal { month, level } => {
                format!("reporte_mensual_total_{}_nivel_{}", month, file_safe(level))
            }
        };
        format!("{}.pdf", stem)
    }

    /// Printed columns, left to right.
    pub fn columns(&self) -> &'static [Column] {
        match self {
            ReportScope::Daily { .. } | ReportScope::Monthly { .. } => &[
                Column::Code,
                Column::Material,
                Column::Product,
                Column::Level,
                Column::Quantity,
                Column::Responsible,
                Column::WithdrawnAt,
            ],
            ReportScope::MonthlyLevel { .. } => &[
                Column::Code,
                Column::Material,
                Column::Product,
                Column::Quantity,
                Column::Responsible,
                Column::WithdrawnAt,
            ],
            ReportScope::MonthlyTotal { .. } => &[
                Column::Level,
                Column::Material,
                Column::Product,
                Column::Unit,
                Column::Total,
            ],
            ReportScope::MonthlyLevelTotal { .. } => &[
                Column::Material,
                Column::Product,
                Column::Unit,
                Column::Total,
            ],
        }
    }
}

fn file_safe(value: &str) -> String {
    value
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

// =============================================================================
// Columns and Rows
// =============================================================================

/// A printed column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Code,
    Material,
    Product,
    Level,
    Quantity,
    Unit,
    Responsible,
    WithdrawnAt,
    Total,
}

impl Column {
    /// Header text.
    pub fn label(&self) -> &'static str {
        match self {
            Column::Code => "Código",
            Column::Material => "Material",
            Column::Product => "Producto",
            Column::Level => "Nivel",
            Column::Quantity => "Cantidad",
            Column::Unit => "Unidad",
            Column::Responsible => "Responsable",
            Column::WithdrawnAt => "Fecha",
            Column::Total => "Total",
        }
    }

    /// Whether the value is an amount expressed in the product's unit.
    pub fn is_unit_bearing(&self) -> bool {
        matches!(self, Column::Quantity | Column::Total)
    }
}

/// Anything that can be printed as a report table row.
pub trait TableRow {
    /// Printed text of one cell.
    fn cell(&self, column: Column) -> String;

    /// Level of the row, used to detect consecutive-level groups.
    fn level(&self) -> &str;

    /// One line of the QR summary.
    fn summary_line(&self) -> String;
}

impl TableRow for WithdrawalDetail {
    fn cell(&self, column: Column) -> String {
        match column {
            Column::Code => self.code.clone().unwrap_or_else(|| "-".to_string()),
            Column::Material => self.material.clone(),
            Column::Product => self.product.clone(),
            Column::Level => self.level.clone(),
            Column::Quantity => format!("{:.2} {}", self.quantity, self.unit),
            Column::Unit => self.unit.clone(),
            Column::Responsible => self.responsible_name.clone(),
            Column::WithdrawnAt => self.withdrawn_at.format("%d/%m/%Y %H:%M").to_string(),
            Column::Total => format!("{:.2}", self.quantity),
        }
    }

    fn level(&self) -> &str {
        &self.level
    }

    fn summary_line(&self) -> String {
        format!(
            "Código: {}, Material: {}, Producto: {}, Nivel: {}, Cantidad: {:.2} {}, Responsable: {}",
            self.code.as_deref().unwrap_or("-"),
            self.material,
            self.product,
            self.level,
            self.quantity,
            self.unit,
            self.responsible_name
        )
    }
}

impl TableRow for TotalRow {
    fn cell(&self, column: Column) -> String {
        match column {
            Column::Level => self.level.clone(),
            Column::Material => self.material.clone(),
            Column::Product => self.product.clone(),
            Column::Unit => self.unit.clone(),
            Column::Total | Column::Quantity => format!("{:.2}", self.total_quantity),
            Column::Code | Column::Responsible | Column::WithdrawnAt => String::new(),
        }
    }

    fn level(&self) -> &str {
        &self.level
    }

    fn summary_line(&self) -> String {
        format!(
            "Nivel: {}, Material: {}, Producto: {}, Total: {:.2} {}",
            self.level, self.material, self.product, self.total_quantity, self.unit
        )
    }
}

/// Rows returned by the aggregator, in print order.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportRows {
    Detail(Vec<WithdrawalDetail>),
    Totals(Vec<TotalRow>),
}

impl ReportRows {
    pub fn len(&self) -> usize {
        match self {
            ReportRows::Detail(rows) => rows.len(),
            ReportRows::Totals(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Rows as printable table rows, order preserved.
    pub fn table_rows(&self) -> Vec<&dyn TableRow> {
        match self {
            ReportRows::Detail(rows) => rows.iter().map(|r| r as &dyn TableRow).collect(),
            ReportRows::Totals(rows) => rows.iter().map(|r| r as &dyn TableRow).collect(),
        }
    }
}

// =============================================================================
// Report
// =============================================================================

/// A non-empty, ordered report ready for export.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    scope: ReportScope,
    rows: ReportRows,
}

impl Report {
    /// Wraps aggregated rows. Returns `None` for an empty window, which the
    /// API reports as "no data" rather than as a failure.
    pub fn new(scope: ReportScope, rows: ReportRows) -> Option<Self> {
        if rows.is_empty() {
            return None;
        }
        Some(Report { scope, rows })
    }

    pub fn scope(&self) -> &ReportScope {
        &self.scope
    }

    pub fn rows(&self) -> &ReportRows {
        &self.rows
    }

    pub fn title(&self) -> String {
        self.scope.title()
    }

    pub fn file_name(&self) -> String {
        self.scope.file_name()
    }

    pub fn columns(&self) -> &'static [Column] {
        self.scope.columns()
    }

    /// Textual summary of every row, one per line, under a header line.
    pub fn summary(&self) -> String {
        let mut summary = format!("Reporte del {}\n", self.scope.label());
        for row in self.rows.table_rows() {
            summary.push_str(&row.summary_line());
            summary.push('\n');
        }
        summary
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
