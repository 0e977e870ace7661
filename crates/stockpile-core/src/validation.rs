//! # Validation Module
//!
//! Rules a snapshot must satisfy before it is persisted.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: UI forms                                                     │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: SyncEngine::edit_snapshot / `stockpile check`                │
//! │  └── THIS MODULE: item and pin rules, duplicate ids                    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Remote tables                                                │
//! │  └── NOT NULL + (id, owner_id) primary keys                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use stockpile_core::validation::validate_quantity;
//!
//! assert!(validate_quantity(1).is_ok());
//! assert!(validate_quantity(0).is_err());
//! ```

use std::collections::HashSet;

use crate::error::ValidationError;
use crate::types::{Item, LocalSnapshot, MapPin};
use crate::MAX_ITEM_NAME_LEN;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Field Validators
// =============================================================================

/// Validates a record id: non-empty after trimming.
pub fn validate_id(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates an item name.
///
/// ## Rules
/// - Must not be empty
/// - At most 200 characters
pub fn validate_item_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "item.name".to_string(),
        });
    }

    if name.chars().count() > MAX_ITEM_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "item.name".to_string(),
            max: MAX_ITEM_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates an item quantity (at least 1).
pub fn validate_quantity(quantity: u32) -> ValidationResult<()> {
    if quantity == 0 {
        return Err(ValidationError::MustBePositive {
            field: "item.quantity".to_string(),
        });
    }
    Ok(())
}

/// Validates a map coordinate.
pub fn validate_coordinate(field: &str, value: f64) -> ValidationResult<()> {
    if !value.is_finite() {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must be a finite number".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Record Validators
// =============================================================================

/// Validates one item.
pub fn validate_item(item: &Item) -> ValidationResult<()> {
    validate_id("item.id", &item.id)?;
    validate_item_name(&item.name)?;
    validate_quantity(item.quantity)
}

/// Validates one pin.
pub fn validate_pin(pin: &MapPin) -> ValidationResult<()> {
    validate_id("pin.id", &pin.id)?;
    validate_coordinate("pin.x", pin.x)?;
    validate_coordinate("pin.y", pin.y)
}

/// Validates a whole snapshot, including id uniqueness per collection.
pub fn validate_snapshot(snapshot: &LocalSnapshot) -> ValidationResult<()> {
    let mut seen = HashSet::new();
    for item in &snapshot.items {
        validate_item(item)?;
        if !seen.insert(item.id.as_str()) {
            return Err(ValidationError::Duplicate {
                field: "item.id".to_string(),
                value: item.id.clone(),
            });
        }
    }

    let mut seen = HashSet::new();
    for pin in &snapshot.pins {
        validate_pin(pin)?;
        if !seen.insert(pin.id.as_str()) {
            return Err(ValidationError::Duplicate {
                field: "pin.id".to_string(),
                value: pin.id.clone(),
            });
        }
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
