//! # Product Repository
//!
//! Database operations for products.
//!
//! ## Visibility
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Which products are listed?                           │
//! │                                                                         │
//! │   productos.activo   materiales.activo   GET /products   ?all=true      │
//! │   ────────────────   ─────────────────   ─────────────   ─────────      │
//! │         1                    1                 ✓             ✓          │
//! │         1                    0                 ✗             ✓          │
//! │         0                    *                 ✗             ✓          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use veta_core::validation::validate_product;
use veta_core::{Product, ProductInput};

const SELECT_PRODUCT: &str = r#"
    SELECT p.id, p.material_id, p.nombre AS name, p.unidad AS unit, p.activo AS active
    FROM productos p
    JOIN materiales m ON m.id = p.material_id
"#;

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists products ordered by material, then product name.
    ///
    /// ## Arguments
    /// * `include_inactive` - Also return soft-deleted products and products
    ///   of soft-deleted materials
    pub async fn list(&self, include_inactive: bool) -> DbResult<Vec<Product>> {
        let filter = if include_inactive {
            ""
        } else {
            "WHERE p.activo = 1 AND m.activo = 1"
        };
        let sql = format!("{SELECT_PRODUCT} {filter} ORDER BY m.nombre, p.nombre, p.id");

        let products = sqlx::query_as::<_, Product>(&sql)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = products.len(), include_inactive, "Listed products");
        Ok(products)
    }

    /// Gets a product by id, active or not.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!("{SELECT_PRODUCT} WHERE p.id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Creates a product under an existing material.
    ///
    /// ## Returns
    /// * `Ok(Product)` - Inserted product (active)
    /// * `Err(DbError::ForeignKeyViolation)` - `material_id` does not exist
    pub async fn create(&self, input: &ProductInput) -> DbResult<Product> {
        let input = validate_product(input)?;

        debug!(material_id = input.material_id, name = %input.name, "Inserting product");

        let product = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO productos (material_id, nombre, unidad, activo)
            VALUES (?1, ?2, ?3, 1)
            RETURNING id, material_id, nombre AS name, unidad AS unit, activo AS active
            "#,
        )
        .bind(input.material_id)
        .bind(&input.name)
        .bind(&input.unit)
        .fetch_one(&self.pool)
        .await?;

        Ok(product)
    }

    /// Updates every field of a product. `active` is kept when omitted.
    pub async fn update(&self, id: i64, input: &ProductInput) -> DbResult<Product> {
        let input = validate_product(input)?;

        debug!(id, "Updating product");

        let product = sqlx::query_as::<_, Product>(
            r#"
            UPDATE productos SET
                material_id = ?2,
                nombre = ?3,
                unidad = ?4,
                activo = COALESCE(?5, activo)
            WHERE id = ?1
            RETURNING id, material_id, nombre AS name, unidad AS unit, activo AS active
            "#,
        )
        .bind(id)
        .bind(input.material_id)
        .bind(&input.name)
        .bind(&input.unit)
        .bind(input.active)
        .fetch_optional(&self.pool)
        .await?;

        product.ok_or_else(|| DbError::not_found("Product", id.to_string()))
    }

    /// Soft-deletes a product.
    pub async fn soft_delete(&self, id: i64) -> DbResult<()> {
        debug!(id, "Soft-deleting product");

        let result = sqlx::query("UPDATE productos SET activo = 0 WHERE id = ?1 AND activo = 1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id.to_string()));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
