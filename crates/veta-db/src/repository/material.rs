//! # Material Repository
//!
//! Database operations for materials.
//!
//! ## Key Operations
//! - List (active only, or everything)
//! - Create / rename with unique names
//! - Soft delete (`activo = 0`)
//!
//! A material's name is the source of every withdrawal code tag, so renames
//! only affect codes assigned afterwards.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use veta_core::validation::validate_material;
use veta_core::{Material, MaterialInput, ValidationError};

const SELECT_MATERIAL: &str = "SELECT id, nombre AS name, activo AS active FROM materiales";

/// Repository for material database operations.
#[derive(Debug, Clone)]
pub struct MaterialRepository {
    pool: SqlitePool,
}

impl MaterialRepository {
    /// Creates a new MaterialRepository.
    pub fn new(pool: SqlitePool) -> Self {
        MaterialRepository { pool }
    }

    /// Lists materials ordered by name.
    ///
    /// ## Arguments
    /// * `include_inactive` - Also return soft-deleted materials
    pub async fn list(&self, include_inactive: bool) -> DbResult<Vec<Material>> {
        let sql = if include_inactive {
            format!("{SELECT_MATERIAL} ORDER BY nombre")
        } else {
            format!("{SELECT_MATERIAL} WHERE activo = 1 ORDER BY nombre")
        };

        let materials = sqlx::query_as::<_, Material>(&sql)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = materials.len(), include_inactive, "Listed materials");
        Ok(materials)
    }

    /// Gets a material by id, active or not.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Material>> {
        let material = sqlx::query_as::<_, Material>(&format!("{SELECT_MATERIAL} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(material)
    }

    /// Creates a material. New materials always start active.
    ///
    /// ## Returns
    /// * `Ok(Material)` - Inserted material
    /// * `Err(DbError::Validation)` - Empty name or name already taken
    pub async fn create(&self, input: &MaterialInput) -> DbResult<Material> {
        let input = validate_material(input)?;

        debug!(name = %input.name, "Inserting material");

        let material = sqlx::query_as::<_, Material>(
            r#"
            INSERT INTO materiales (nombre, activo)
            VALUES (?1, 1)
            RETURNING id, nombre AS name, activo AS active
            "#,
        )
        .bind(&input.name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| duplicate_name(e, &input.name))?;

        Ok(material)
    }

    /// Renames a material and optionally changes its active flag.
    pub async fn update(&self, id: i64, input: &MaterialInput) -> DbResult<Material> {
        let input = validate_material(input)?;

        debug!(id, name = %input.name, "Updating material");

        let material = sqlx::query_as::<_, Material>(
            r#"
            UPDATE materiales SET
                nombre = ?2,
                activo = COALESCE(?3, activo)
            WHERE id = ?1
            RETURNING id, nombre AS name, activo AS active
            "#,
        )
        .bind(id)
        .bind(&input.name)
        .bind(input.active)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| duplicate_name(e, &input.name))?;

        material.ok_or_else(|| DbError::not_found("Material", id.to_string()))
    }

    /// Soft-deletes a material.
    ///
    /// Its products and withdrawals stay in storage but drop out of every
    /// listing and report.
    pub async fn soft_delete(&self, id: i64) -> DbResult<()> {
        debug!(id, "Soft-deleting material");

        let result = sqlx::query("UPDATE materiales SET activo = 0 WHERE id = ?1 AND activo = 1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Material", id.to_string()));
        }

        Ok(())
    }
}

/// Reports a UNIQUE violation on `materiales.nombre` as a validation failure.
fn duplicate_name(err: sqlx::Error, name: &str) -> DbError {
    match DbError::from(err) {
        DbError::UniqueViolation { .. } => DbError::Validation(ValidationError::Duplicate {
            field: "name".to_string(),
            value: name.to_string(),
        }),
        other => other,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
