//! # Report Repository
//!
//! Aggregation queries behind every PDF report.
//!
//! ## Scope → SQL
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Scope               Rows     Filter (besides window)   ORDER BY        │
//! │  ─────────────────   ──────   ───────────────────────   ──────────────  │
//! │  Daily               detail   -                         nivel, m ↑, t ↓ │
//! │  Monthly             detail   -                         nivel, m ↓, t ↓ │
//! │  MonthlyTotal        totals   -                         nivel, m ↑, p ↑ │
//! │  MonthlyLevel        detail   nivel = ?                 m ↓, t ↓        │
//! │  MonthlyLevelTotal   totals   nivel = ?                 m ↑, p ↑        │
//! │                                                                         │
//! │  m = material name, p = product name, t = fecha_salida (id ↓ tiebreak) │
//! │  Totals group on names and unit, never ids: two products sharing a    │
//! │  name and unit under one material print as a single row.              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every query joins material and product and keeps only rows where the
//! withdrawal, the material and the product are all active. Windows are
//! half-open `[start, end)` comparisons on `fecha_salida`, so the stored
//! text timestamps are compared without date functions.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use veta_core::report::{ReportRows, ReportScope};
use veta_core::{TotalRow, WithdrawalDetail};

const DETAIL_COLUMNS: &str = r#"
    SELECT
        s.id,
        s.codigo AS code,
        s.material_id,
        s.producto_id AS product_id,
        m.nombre AS material,
        p.nombre AS product,
        p.unidad AS unit,
        s.nivel AS level,
        s.responsable_nombre AS responsible_name,
        s.cantidad AS quantity,
        s.rumpero,
        s.trabajador AS worker,
        s.fecha_salida AS withdrawn_at
"#;

const JOIN_ACTIVE: &str = r#"
    FROM salidas s
    JOIN materiales m ON m.id = s.material_id
    JOIN productos p ON p.id = s.producto_id
    WHERE s.activo = 1 AND m.activo = 1 AND p.activo = 1
      AND s.fecha_salida >= ?1 AND s.fecha_salida < ?2
"#;

/// Repository for report aggregation.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    pool: SqlitePool,
}

impl ReportRepository {
    /// Creates a new ReportRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReportRepository { pool }
    }

    /// Runs the aggregation for `scope`.
    ///
    /// Row order is the print order. An empty result is returned as-is; the
    /// caller decides that an empty window means "no data".
    pub async fn query(&self, scope: &ReportScope) -> DbResult<ReportRows> {
        let window = scope.window();
        let sql = build_sql(scope);

        let rows = if scope.is_total() {
            let mut query = sqlx::query_as::<_, TotalRow>(&sql)
                .bind(window.start)
                .bind(window.end);
            if let Some(level) = scope.level() {
                query = query.bind(level);
            }
            ReportRows::Totals(query.fetch_all(&self.pool).await?)
        } else {
            let mut query = sqlx::query_as::<_, WithdrawalDetail>(&sql)
                .bind(window.start)
                .bind(window.end);
            if let Some(level) = scope.level() {
                query = query.bind(level);
            }
            ReportRows::Detail(query.fetch_all(&self.pool).await?)
        };

        debug!(scope = %scope.label(), rows = rows.len(), "Report rows aggregated");
        Ok(rows)
    }
}

/// SQL text for a scope. Parameters: `?1` window start, `?2` window end,
/// `?3` level (level scopes only).
fn build_sql(scope: &ReportScope) -> String {
    match scope {
        ReportScope::Daily { .. } => format!(
            "{DETAIL_COLUMNS} {JOIN_ACTIVE} \
             ORDER BY s.nivel ASC, m.nombre ASC, s.fecha_salida DESC, s.id DESC"
        ),
        ReportScope::Monthly { .. } => format!(
            "{DETAIL_COLUMNS} {JOIN_ACTIVE} \
             ORDER BY s.nivel ASC, m.nombre DESC, s.fecha_salida DESC, s.id DESC"
        ),
        ReportScope::MonthlyLevel { .. } => format!(
            "{DETAIL_COLUMNS} {JOIN_ACTIVE} AND s.nivel = ?3 \
             ORDER BY m.nombre DESC, s.fecha_salida DESC, s.id DESC"
        ),
        ReportScope::MonthlyTotal { .. } => format!(
            "SELECT s.nivel AS level, m.nombre AS material, p.nombre AS product, \
                    p.unidad AS unit, ROUND(SUM(s.cantidad), 2) AS total_quantity \
             {JOIN_ACTIVE} \
             GROUP BY s.nivel, m.nombre, p.nombre, p.unidad \
             ORDER BY s.nivel ASC, m.nombre ASC, p.nombre ASC, p.unidad ASC"
        ),
        ReportScope::MonthlyLevelTotal { .. } => format!(
            "SELECT MIN(s.nivel) AS level, m.nombre AS material, p.nombre AS product, \
                    p.unidad AS unit, ROUND(SUM(s.cantidad), 2) AS total_quantity \
             {JOIN_ACTIVE} AND s.nivel = ?3 \
             GROUP BY m.nombre, p.nombre, p.unidad \
             ORDER BY m.nombre ASC, p.nombre ASC, p.unidad ASC"
        ),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
