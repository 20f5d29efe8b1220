//! # Withdrawal Repository
//!
//! Database operations for withdrawals ("salidas"), including code
//! assignment.
//!
//! ## Create Flow (one transaction)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Withdrawal Creation                                  │
//! │                                                                         │
//! │  BEGIN IMMEDIATE                                                        │
//! │    │                                                                    │
//! │    ├── material exists?            no → InvalidMaterial (rollback)      │
//! │    ├── product belongs to it?      no → ForeignKeyViolation (rollback)  │
//! │    │                                                                    │
//! │    ├── INSERT INTO salidas (..., codigo = NULL)  → id 57                │
//! │    │                                                                    │
//! │    ├── assign_code_in(tx, 57, material_id)                              │
//! │    │     ├── tag  = material_tag("Cobre")            = "COB"            │
//! │    │     ├── seq  = secuencias_codigo['COB'] += 1    = 12               │
//! │    │     └── UPDATE salidas SET codigo = 'COB-0012' WHERE id = 57       │
//! │    │                                                                    │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Sequence Allocation
//! The counter row for a tag is bumped with a single
//! `INSERT … ON CONFLICT DO UPDATE … RETURNING`, inside the write
//! transaction, so two concurrent creations can never read the same value.
//!
//! The first use of a tag seeds the counter from existing data: the number of
//! older withdrawals of the same material plus one, or one past the highest
//! sequence already present in codes with that tag, whichever is larger.
//! Databases filled before the counter existed therefore continue their
//! numbering instead of restarting at 0001.

use chrono::{Local, NaiveDate, NaiveDateTime, Timelike};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::pool::begin_write;
use veta_core::code::{material_tag, WithdrawalCode};
use veta_core::report::TimeWindow;
use veta_core::validation::validate_withdrawal;
use veta_core::{WithdrawalDetail, WithdrawalInput};

const SELECT_DETAIL: &str = r#"
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
    FROM salidas s
    JOIN materiales m ON m.id = s.material_id
    JOIN productos p ON p.id = s.producto_id
"#;

/// Visible rows: the withdrawal, its material and its product all active.
const ACTIVE: &str = "s.activo = 1 AND m.activo = 1 AND p.activo = 1";

/// Repository for withdrawal database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.withdrawals();
///
/// let created = repo.create(&input).await?;
/// assert_eq!(created.code.as_deref(), Some("COB-0001"));
/// ```
#[derive(Debug, Clone)]
pub struct WithdrawalRepository {
    pool: SqlitePool,
}

impl WithdrawalRepository {
    /// Creates a new WithdrawalRepository.
    pub fn new(pool: SqlitePool) -> Self {
        WithdrawalRepository { pool }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Lists every visible withdrawal, newest first. Rows of inactive
    /// materials or products are hidden, as in reports.
    pub async fn list_active(&self) -> DbResult<Vec<WithdrawalDetail>> {
        let sql = format!("{SELECT_DETAIL} WHERE {ACTIVE} ORDER BY s.fecha_salida DESC, s.id DESC");

        let rows = sqlx::query_as::<_, WithdrawalDetail>(&sql)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = rows.len(), "Listed active withdrawals");
        Ok(rows)
    }

    /// Lists the visible withdrawals of one local calendar day, newest first.
    pub async fn list_day(&self, date: NaiveDate) -> DbResult<Vec<WithdrawalDetail>> {
        let window = TimeWindow::day(date);
        let sql = format!(
            "{SELECT_DETAIL} WHERE {ACTIVE} AND s.fecha_salida >= ?1 AND s.fecha_salida < ?2 \
             ORDER BY s.fecha_salida DESC, s.id DESC"
        );

        let rows = sqlx::query_as::<_, WithdrawalDetail>(&sql)
            .bind(window.start)
            .bind(window.end)
            .fetch_all(&self.pool)
            .await?;

        debug!(%date, count = rows.len(), "Listed withdrawals of the day");
        Ok(rows)
    }

    /// Gets a visible withdrawal joined to its material and product.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<WithdrawalDetail>> {
        let sql = format!("{SELECT_DETAIL} WHERE s.id = ?1 AND {ACTIVE}");

        let row = sqlx::query_as::<_, WithdrawalDetail>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    async fn fetch_detail(&self, id: i64) -> DbResult<WithdrawalDetail> {
        let sql = format!("{SELECT_DETAIL} WHERE s.id = ?1");

        sqlx::query_as::<_, WithdrawalDetail>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Withdrawal", id.to_string()))
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Records a withdrawal and assigns its code in the same transaction.
    ///
    /// ## Returns
    /// * `Ok(WithdrawalDetail)` - Stored row with its code
    /// * `Err(DbError::Validation)` - Blank level/responsible, negative quantity
    /// * `Err(DbError::InvalidMaterial)` - `material_id` does not resolve
    /// * `Err(DbError::ForeignKeyViolation)` - Product missing or from another material
    pub async fn create(&self, input: &WithdrawalInput) -> DbResult<WithdrawalDetail> {
        let input = validate_withdrawal(input)?;
        let withdrawn_at = input.withdrawn_at.unwrap_or_else(local_now);

        let mut tx = begin_write(&self.pool).await?;

        ensure_material(&mut *tx, input.material_id).await?;
        ensure_product_of_material(&mut *tx, input.product_id, input.material_id).await?;

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO salidas (
                material_id, producto_id, nivel, responsable_nombre,
                cantidad, rumpero, trabajador, fecha_salida, activo
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, COALESCE(?9, 1))
            RETURNING id
            "#,
        )
        .bind(input.material_id)
        .bind(input.product_id)
        .bind(&input.level)
        .bind(&input.responsible_name)
        .bind(input.quantity)
        .bind(&input.rumpero)
        .bind(&input.worker)
        .bind(truncate_to_seconds(withdrawn_at))
        .bind(input.active)
        .fetch_one(&mut *tx)
        .await?;

        let code = assign_code_in(&mut *tx, id, input.material_id).await?;

        tx.commit().await?;

        info!(id, code = %code, level = %input.level, "Withdrawal recorded");
        self.fetch_detail(id).await
    }

    /// Updates every field of a withdrawal.
    ///
    /// The code is kept unless the withdrawal moves to another material or has
    /// no code yet, in which case a new one is assigned in the same
    /// transaction. `withdrawn_at` and `active` keep their stored values when
    /// omitted.
    ///
    /// A soft-deleted withdrawal is `NotFound` unless the body sets
    /// `active: true`, which reactivates it.
    pub async fn update(&self, id: i64, input: &WithdrawalInput) -> DbResult<WithdrawalDetail> {
        let input = validate_withdrawal(input)?;

        let mut tx = begin_write(&self.pool).await?;

        let reactivate = input.active == Some(true);
        let current: Option<(i64, Option<String>)> = sqlx::query_as(
            "SELECT material_id, codigo FROM salidas WHERE id = ?1 AND (activo = 1 OR ?2)",
        )
        .bind(id)
        .bind(reactivate)
        .fetch_optional(&mut *tx)
        .await?;
        let (current_material, current_code) =
            current.ok_or_else(|| DbError::not_found("Withdrawal", id.to_string()))?;

        ensure_material(&mut *tx, input.material_id).await?;
        ensure_product_of_material(&mut *tx, input.product_id, input.material_id).await?;

        sqlx::query(
            r#"
            UPDATE salidas SET
                material_id = ?2,
                producto_id = ?3,
                nivel = ?4,
                responsable_nombre = ?5,
                cantidad = ?6,
                rumpero = ?7,
                trabajador = ?8,
                fecha_salida = COALESCE(?9, fecha_salida),
                activo = COALESCE(?10, activo)
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(input.material_id)
        .bind(input.product_id)
        .bind(&input.level)
        .bind(&input.responsible_name)
        .bind(input.quantity)
        .bind(&input.rumpero)
        .bind(&input.worker)
        .bind(input.withdrawn_at.map(truncate_to_seconds))
        .bind(input.active)
        .execute(&mut *tx)
        .await?;

        if current_material != input.material_id || current_code.is_none() {
            let code = assign_code_in(&mut *tx, id, input.material_id).await?;
            debug!(id, code = %code, "Withdrawal re-coded");
        }

        tx.commit().await?;

        self.fetch_detail(id).await
    }

    /// Soft-deletes a withdrawal.
    pub async fn soft_delete(&self, id: i64) -> DbResult<()> {
        debug!(id, "Soft-deleting withdrawal");

        let result = sqlx::query("UPDATE salidas SET activo = 0 WHERE id = ?1 AND activo = 1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Withdrawal", id.to_string()));
        }

        Ok(())
    }

    /// Assigns a fresh code to an existing withdrawal in its own transaction.
    ///
    /// Used to repair rows left without a code; any previous code is
    /// overwritten.
    pub async fn assign_code(&self, withdrawal_id: i64, material_id: i64) -> DbResult<String> {
        let mut tx = begin_write(&self.pool).await?;
        let code = assign_code_in(&mut *tx, withdrawal_id, material_id).await?;
        tx.commit().await?;

        info!(withdrawal_id, code = %code, "Withdrawal code assigned");
        Ok(code)
    }

    /// Ids of active withdrawals that still have no code.
    pub async fn missing_codes(&self) -> DbResult<Vec<(i64, i64)>> {
        let rows: Vec<(i64, i64)> = sqlx::query_as(
            "SELECT id, material_id FROM salidas WHERE codigo IS NULL AND activo = 1 ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

// =============================================================================
// Code Assignment
// =============================================================================

/// Derives and stores the code of `withdrawal_id` on an open connection.
///
/// Callers own the transaction; nothing is committed here.
pub(crate) async fn assign_code_in(
    conn: &mut SqliteConnection,
    withdrawal_id: i64,
    material_id: i64,
) -> DbResult<String> {
    let name: Option<String> = sqlx::query_scalar("SELECT nombre FROM materiales WHERE id = ?1")
        .bind(material_id)
        .fetch_optional(&mut *conn)
        .await?;
    let name = name.ok_or(DbError::InvalidMaterial { material_id })?;

    let tag = material_tag(&name);
    let prefix = format!("{tag}-");
    let prefix_len = prefix.chars().count() as i64;

    let seed: i64 = sqlx::query_scalar(
        r#"
        SELECT MAX(
            (SELECT COUNT(*) FROM salidas WHERE material_id = ?1 AND id < ?2),
            COALESCE(
                (SELECT MAX(CAST(SUBSTR(codigo, ?3 + 1) AS INTEGER))
                 FROM salidas
                 WHERE SUBSTR(codigo, 1, ?3) = ?4),
                0
            )
        ) + 1
        "#,
    )
    .bind(material_id)
    .bind(withdrawal_id)
    .bind(prefix_len)
    .bind(&prefix)
    .fetch_one(&mut *conn)
    .await?;

    let sequence: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO secuencias_codigo (etiqueta, ultimo)
        VALUES (?1, ?2)
        ON CONFLICT(etiqueta) DO UPDATE SET ultimo = MAX(ultimo + 1, excluded.ultimo)
        RETURNING ultimo
        "#,
    )
    .bind(&tag)
    .bind(seed)
    .fetch_one(&mut *conn)
    .await?;

    let sequence = u32::try_from(sequence)
        .map_err(|_| DbError::Internal(format!("sequence {sequence} out of range for {tag}")))?;
    let code = WithdrawalCode::from_tag(tag, sequence).to_string();

    let result = sqlx::query("UPDATE salidas SET codigo = ?1 WHERE id = ?2")
        .bind(&code)
        .bind(withdrawal_id)
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("Withdrawal", withdrawal_id.to_string()));
    }

    debug!(withdrawal_id, material_id, code = %code, "Assigned withdrawal code");
    Ok(code)
}

async fn ensure_material(conn: &mut SqliteConnection, material_id: i64) -> DbResult<()> {
    let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM materiales WHERE id = ?1")
        .bind(material_id)
        .fetch_optional(&mut *conn)
        .await?;

    match exists {
        Some(_) => Ok(()),
        None => Err(DbError::InvalidMaterial { material_id }),
    }
}

async fn ensure_product_of_material(
    conn: &mut SqliteConnection,
    product_id: i64,
    material_id: i64,
) -> DbResult<()> {
    let owner: Option<i64> = sqlx::query_scalar("SELECT material_id FROM productos WHERE id = ?1")
        .bind(product_id)
        .fetch_optional(&mut *conn)
        .await?;

    match owner {
        Some(owner) if owner == material_id => Ok(()),
        Some(owner) => Err(DbError::ForeignKeyViolation {
            message: format!(
                "product {product_id} belongs to material {owner}, not {material_id}"
            ),
        }),
        None => Err(DbError::ForeignKeyViolation {
            message: format!("product {product_id} does not exist"),
        }),
    }
}

/// Current local wall-clock time, whole seconds.
pub fn local_now() -> NaiveDateTime {
    truncate_to_seconds(Local::now().naive_local())
}

fn truncate_to_seconds(ts: NaiveDateTime) -> NaiveDateTime {
    ts.with_nanosecond(0).unwrap_or(ts)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use veta_core::{MaterialInput, ProductInput};

    struct Fixture {
        db: Database,
        cobre: i64,
        cable: i64,
        zinc: i64,
        lamina: i64,
    }

    async fn fixture() -> Fixture {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let material = |name: &str| MaterialInput {
            name: name.to_string(),
            active: None,
        };
        let product = |material_id: i64, name: &str| ProductInput {
            material_id,
            name: name.to_string(),
            unit: "kg".to_string(),
            active: None,
        };

        let cobre = db.materials().create(&material("Cobre")).await.unwrap().id;
        let zinc = db.materials().create(&material("Zinc")).await.unwrap().id;
        let cable = db.products().create(&product(cobre, "Cable")).await.unwrap().id;
        let lamina = db.products().create(&product(zinc, "Lámina")).await.unwrap().id;

        Fixture {
            db,
            cobre,
            cable,
            zinc,
            lamina,
        }
    }

    fn input(material_id: i64, product_id: i64) -> WithdrawalInput {
        WithdrawalInput {
            material_id,
            product_id,
            level: "1200".to_string(),
            responsible_name: "Rosa Quispe".to_string(),
            quantity: 2.5,
            rumpero: None,
            worker: Some("Juan".to_string()),
            withdrawn_at: NaiveDate::from_ymd_opt(2024, 2, 5)
                .unwrap()
                .and_hms_opt(9, 30, 0),
            active: None,
        }
    }

    #[tokio::test]
    async fn test_sequential_codes_per_material() {
        let f = fixture().await;
        let repo = f.db.withdrawals();

        let mut codes = Vec::new();
        for _ in 0..3 {
            let w = repo.create(&input(f.cobre, f.cable)).await.unwrap();
            codes.push(w.code.unwrap());
        }
        let zinc = repo.create(&input(f.zinc, f.lamina)).await.unwrap();

        assert_eq!(codes, vec!["COB-0001", "COB-0002", "COB-0003"]);
        assert_eq!(zinc.code.as_deref(), Some("ZIN-0001"));
    }

    #[tokio::test]
    async fn test_materials_sharing_a_tag_never_collide() {
        let f = fixture().await;
        let cobalto = f
            .db
            .materials()
            .create(&MaterialInput {
                name: "Cobalto".to_string(),
                active: None,
            })
            .await
            .unwrap()
            .id;
        let polvo = f
            .db
            .products()
            .create(&ProductInput {
                material_id: cobalto,
                name: "Polvo".to_string(),
                unit: "kg".to_string(),
                active: None,
            })
            .await
            .unwrap()
            .id;

        let repo = f.db.withdrawals();
        let a = repo.create(&input(f.cobre, f.cable)).await.unwrap();
        let b = repo.create(&input(cobalto, polvo)).await.unwrap();

        assert_eq!(a.code.as_deref(), Some("COB-0001"));
        assert_eq!(b.code.as_deref(), Some("COB-0002"));
    }

    #[tokio::test]
    async fn test_create_joins_names_and_defaults() {
        let f = fixture().await;
        let mut body = input(f.cobre, f.cable);
        body.withdrawn_at = None;

        let w = f.db.withdrawals().create(&body).await.unwrap();
        assert_eq!(w.material, "Cobre");
        assert_eq!(w.product, "Cable");
        assert_eq!(w.unit, "kg");
        assert_eq!(w.withdrawn_at.nanosecond(), 0);
        assert_eq!(w.withdrawn_at.date(), Local::now().date_naive());
    }

    #[tokio::test]
    async fn test_unknown_material_is_invalid_material() {
        let f = fixture().await;
        let err = f.db.withdrawals().create(&input(404, f.cable)).await.unwrap_err();
        assert!(matches!(err, DbError::InvalidMaterial { material_id: 404 }));
    }

    #[tokio::test]
    async fn test_product_of_other_material_is_rejected() {
        let f = fixture().await;
        let err = f.db.withdrawals().create(&input(f.cobre, f.lamina)).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));

        // Rolled back: nothing stored, counter untouched
        assert!(f.db.withdrawals().list_active().await.unwrap().is_empty());
        let w = f.db.withdrawals().create(&input(f.cobre, f.cable)).await.unwrap();
        assert_eq!(w.code.as_deref(), Some("COB-0001"));
    }

    #[tokio::test]
    async fn test_negative_quantity_is_rejected() {
        let f = fixture().await;
        let mut body = input(f.cobre, f.cable);
        body.quantity = -1.0;

        let err = f.db.withdrawals().create(&body).await.unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));
    }

    #[tokio::test]
    async fn test_update_keeps_code_unless_material_changes() {
        let f = fixture().await;
        let repo = f.db.withdrawals();
        let w = repo.create(&input(f.cobre, f.cable)).await.unwrap();

        let mut body = input(f.cobre, f.cable);
        body.quantity = 7.0;
        let same = repo.update(w.id, &body).await.unwrap();
        assert_eq!(same.code, w.code);
        assert_eq!(same.quantity, 7.0);

        let moved = repo.update(w.id, &input(f.zinc, f.lamina)).await.unwrap();
        assert_eq!(moved.code.as_deref(), Some("ZIN-0001"));
        assert_eq!(moved.material, "Zinc");
    }

    #[tokio::test]
    async fn test_seed_continues_legacy_numbering() {
        let f = fixture().await;

        // Rows written before the counter table existed
        for code in ["COB-0001", "COB-0002", "COB-0007"] {
            sqlx::query(
                "INSERT INTO salidas (codigo, material_id, producto_id, nivel, responsable_nombre, \
                 cantidad, fecha_salida) VALUES (?1, ?2, ?3, '900', 'Ana', 1.0, '2024-01-10 08:00:00')",
            )
            .bind(code)
            .bind(f.cobre)
            .bind(f.cable)
            .execute(f.db.pool())
            .await
            .unwrap();
        }

        let w = f.db.withdrawals().create(&input(f.cobre, f.cable)).await.unwrap();
        assert_eq!(w.code.as_deref(), Some("COB-0008"));
    }

    #[tokio::test]
    async fn test_repair_missing_code() {
        let f = fixture().await;
        sqlx::query(
            "INSERT INTO salidas (material_id, producto_id, nivel, responsable_nombre, cantidad, \
             fecha_salida) VALUES (?1, ?2, '900', 'Ana', 1.0, '2024-01-10 08:00:00')",
        )
        .bind(f.cobre)
        .bind(f.cable)
        .execute(f.db.pool())
        .await
        .unwrap();

        let repo = f.db.withdrawals();
        let missing = repo.missing_codes().await.unwrap();
        assert_eq!(missing.len(), 1);

        let (id, material_id) = missing[0];
        let code = repo.assign_code(id, material_id).await.unwrap();
        assert_eq!(code, "COB-0001");
        assert!(repo.missing_codes().await.unwrap().is_empty());

        assert!(matches!(
            repo.assign_code(id, 999).await,
            Err(DbError::InvalidMaterial { material_id: 999 })
        ));
    }

    #[tokio::test]
    async fn test_soft_delete_and_day_listing() {
        let f = fixture().await;
        let repo = f.db.withdrawals();
        let w = repo.create(&input(f.cobre, f.cable)).await.unwrap();

        let day = NaiveDate::from_ymd_opt(2024, 2, 5).unwrap();
        assert_eq!(repo.list_day(day).await.unwrap().len(), 1);
        assert!(repo.list_day(day.succ_opt().unwrap()).await.unwrap().is_empty());

        repo.soft_delete(w.id).await.unwrap();
        assert!(repo.get_by_id(w.id).await.unwrap().is_none());
        assert!(repo.list_day(day).await.unwrap().is_empty());
        assert!(matches!(
            repo.soft_delete(w.id).await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_update_of_deleted_withdrawal_requires_reactivation() {
        let f = fixture().await;
        let repo = f.db.withdrawals();
        let w = repo.create(&input(f.cobre, f.cable)).await.unwrap();
        repo.soft_delete(w.id).await.unwrap();

        let err = repo.update(w.id, &input(f.cobre, f.cable)).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
        assert!(repo.get_by_id(w.id).await.unwrap().is_none());

        let mut body = input(f.cobre, f.cable);
        body.active = Some(true);
        let restored = repo.update(w.id, &body).await.unwrap();
        assert_eq!(restored.code, w.code);
        assert!(repo.get_by_id(w.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_listings_hide_rows_of_inactive_materials() {
        let f = fixture().await;
        let repo = f.db.withdrawals();
        let copper = repo.create(&input(f.cobre, f.cable)).await.unwrap();
        repo.create(&input(f.zinc, f.lamina)).await.unwrap();

        f.db.materials().soft_delete(f.zinc).await.unwrap();

        let listed = repo.list_active().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, copper.id);

        let day = NaiveDate::from_ymd_opt(2024, 2, 5).unwrap();
        assert_eq!(repo.list_day(day).await.unwrap().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_creates_get_distinct_codes() {
        let path = std::env::temp_dir().join(format!("veta-concurrent-{}.db", std::process::id()));
        std::fs::remove_file(&path).ok();
        let db = Database::new(DbConfig::new(&path).max_connections(5))
            .await
            .unwrap();

        let cobre = db
            .materials()
            .create(&MaterialInput {
                name: "Cobre".to_string(),
                active: None,
            })
            .await
            .unwrap()
            .id;
        let cable = db
            .products()
            .create(&ProductInput {
                material_id: cobre,
                name: "Cable".to_string(),
                unit: "kg".to_string(),
                active: None,
            })
            .await
            .unwrap()
            .id;

        let handles: Vec<_> = (0..40)
            .map(|_| {
                let repo = db.withdrawals();
                let body = input(cobre, cable);
                tokio::spawn(async move { repo.create(&body).await })
            })
            .collect();

        let mut codes = Vec::new();
        for handle in handles {
            codes.push(handle.await.unwrap().unwrap().code.unwrap());
        }
        codes.sort();

        let expected: Vec<String> = (1..=40).map(|n| format!("COB-{n:04}")).collect();
        assert_eq!(codes, expected);

        db.close().await;
        for suffix in ["", "-wal", "-shm"] {
            std::fs::remove_file(format!("{}{suffix}", path.display())).ok();
        }
    }
}
