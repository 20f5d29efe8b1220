//! # Validation Module
//!
//! Input validation for materials, products and withdrawals.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP extractor (axum Json)                                   │
//! │  └── Type validation (deserialization)                                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Required text fields, trimmed                                     │
//! │  ├── Length limits                                                     │
//! │  └── Quantities never negative                                         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── UNIQUE materiales.nombre, salidas.codigo                          │
//! │  └── Foreign keys salidas → productos → materiales                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Validators return the cleaned value so callers store exactly what was
//! checked.
//!
//! ## Usage
//! ```rust
//! use veta_core::validation::{validate_level, validate_quantity};
//!
//! assert_eq!(validate_level(" 1200 ").unwrap(), "1200");
//! assert!(validate_quantity(-1.0).is_err());
//! ```

use crate::error::ValidationError;
use crate::types::{MaterialInput, ProductInput, WithdrawalInput};
use crate::{DEFAULT_UNIT, MAX_LEVEL_LEN, MAX_NAME_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

fn required_text(field: &str, value: &str, max: usize) -> ValidationResult<String> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(value.to_string())
}

fn optional_text(field: &str, value: Option<&str>, max: usize) -> ValidationResult<Option<String>> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => required_text(field, v, max).map(Some),
    }
}

/// Validates a material name.
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most MAX_NAME_LEN characters
///
/// ## Example
/// ```rust
/// use veta_core::validation::validate_material_name;
///
/// assert_eq!(validate_material_name("  Cobre ").unwrap(), "Cobre");
/// assert!(validate_material_name("").is_err());
/// ```
pub fn validate_material_name(name: &str) -> ValidationResult<String> {
    required_text("name", name, MAX_NAME_LEN)
}

/// Validates a mine level used as a filter or stored on a withdrawal.
pub fn validate_level(level: &str) -> ValidationResult<String> {
    required_text("level", level, MAX_LEVEL_LEN)
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a withdrawn quantity.
///
/// ## Rules
/// - Must be a finite number
/// - Must not be negative (zero is accepted)
pub fn validate_quantity(quantity: f64) -> ValidationResult<f64> {
    if !quantity.is_finite() {
        return Err(ValidationError::InvalidFormat {
            field: "quantity".to_string(),
            reason: "must be a finite number".to_string(),
        });
    }

    if quantity < 0.0 {
        return Err(ValidationError::Negative {
            field: "quantity".to_string(),
        });
    }

    Ok(quantity)
}

// =============================================================================
// Input Validators
// =============================================================================

/// Validates and trims a material body.
pub fn validate_material(input: &MaterialInput) -> ValidationResult<MaterialInput> {
    Ok(MaterialInput {
        name: validate_material_name(&input.name)?,
        active: input.active,
    })
}

/// Validates and trims a product body. A blank unit falls back to the default.
pub fn validate_product(input: &ProductInput) -> ValidationResult<ProductInput> {
    let unit = optional_text("unit", Some(&input.unit), MAX_LEVEL_LEN)?
        .unwrap_or_else(|| DEFAULT_UNIT.to_string());

    Ok(ProductInput {
        material_id: input.material_id,
        name: required_text("name", &input.name, MAX_NAME_LEN)?,
        unit,
        active: input.active,
    })
}

/// Validates and trims a withdrawal body.
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  POST /exit                                                             │
/// │                                                                         │
/// │  { material_id, producto_id, nivel, responsable_nombre, cantidad }     │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  validate_withdrawal(&input) ← THIS FUNCTION                           │
/// │       │                                                                 │
/// │       ├── nivel blank?              → 400 "level is required"          │
/// │       ├── responsable blank?        → 400 "responsible_name is ..."    │
/// │       ├── cantidad < 0?             → 400 "quantity must not be ..."   │
/// │       │                                                                 │
/// │       └── OK → WithdrawalRepository::create (assigns the code)         │
/// │                                                                         │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_withdrawal(input: &WithdrawalInput) -> ValidationResult<WithdrawalInput> {
    Ok(WithdrawalInput {
        material_id: input.material_id,
        product_id: input.product_id,
        level: validate_level(&input.level)?,
        responsible_name: required_text("responsible_name", &input.responsible_name, MAX_NAME_LEN)?,
        quantity: validate_quantity(input.quantity)?,
        rumpero: optional_text("rumpero", input.rumpero.as_deref(), MAX_NAME_LEN)?,
        worker: optional_text("worker", input.worker.as_deref(), MAX_NAME_LEN)?,
        withdrawn_at: input.withdrawn_at,
        active: input.active,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn withdrawal() -> WithdrawalInput {
        WithdrawalInput {
            material_id: 1,
            product_id: 1,
            level: " 1200 ".to_string(),
            responsible_name: "Rosa Quispe".to_string(),
            quantity: 2.5,
            rumpero: Some("  ".to_string()),
            worker: Some(" Juan ".to_string()),
            withdrawn_at: None,
            active: None,
        }
    }

    #[test]
    fn test_validate_material_name() {
        assert_eq!(validate_material_name("Cobre").unwrap(), "Cobre");
        assert!(validate_material_name("").is_err());
        assert!(validate_material_name("   ").is_err());
        assert!(validate_material_name(&"A".repeat(MAX_NAME_LEN + 1)).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(0.0).is_ok());
        assert!(validate_quantity(12.75).is_ok());

        assert!(matches!(
            validate_quantity(-0.5),
            Err(ValidationError::Negative { .. })
        ));
        assert!(validate_quantity(f64::NAN).is_err());
        assert!(validate_quantity(f64::INFINITY).is_err());
    }

    #[test]
    fn test_validate_withdrawal_trims() {
        let clean = validate_withdrawal(&withdrawal()).unwrap();
        assert_eq!(clean.level, "1200");
        assert_eq!(clean.worker.as_deref(), Some("Juan"));
        assert!(clean.rumpero.is_none());
    }

    #[test]
    fn test_validate_withdrawal_requires_level() {
        let mut input = withdrawal();
        input.level = "".to_string();
        assert!(matches!(
            validate_withdrawal(&input),
            Err(ValidationError::Required { field }) if field == "level"
        ));
    }

    #[test]
    fn test_validate_product_blank_unit_defaults() {
        let input = ProductInput {
            material_id: 1,
            name: " Cable ".to_string(),
            unit: "  ".to_string(),
            active: None,
        };
        let clean = validate_product(&input).unwrap();
        assert_eq!(clean.name, "Cable");
        assert_eq!(clean.unit, DEFAULT_UNIT);
    }
}
