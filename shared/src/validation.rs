//! Validation utilities for the Livestock Farm Management backend

use rust_decimal::Decimal;

/// Longest name accepted for barns, breeds, foods, medicines and circles
pub const MAX_NAME_LENGTH: usize = 100;

/// Precision and scale of stock ledger quantities (`NUMERIC(14, 3)`)
pub const STOCK_PRECISION: u32 = 14;
pub const STOCK_SCALE: u32 = 3;

/// Precision and scale of weights (`NUMERIC(12, 3)`)
pub const WEIGHT_PRECISION: u32 = 12;
pub const WEIGHT_SCALE: u32 = 3;

// ============================================================================
// General Validations
// ============================================================================

/// Validate a display name: non-blank and at most `MAX_NAME_LENGTH` characters
pub fn validate_name(name: &str) -> Result<(), &'static str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err("Name must not be empty");
    }
    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err("Name must be at most 100 characters");
    }
    Ok(())
}

/// Validate an amount that must be strictly positive
pub fn validate_positive_amount(amount: Decimal) -> Result<(), &'static str> {
    if amount <= Decimal::ZERO {
        return Err("Amount must be greater than 0");
    }
    Ok(())
}

/// Smallest value that no longer fits in `NUMERIC(precision, scale)`
pub fn numeric_limit(precision: u32, scale: u32) -> Decimal {
    Decimal::from(10u64.pow(precision.saturating_sub(scale)))
}

/// Validate a decimal fits a `NUMERIC(precision, scale)` column without rounding
pub fn validate_decimal_fits(amount: Decimal, precision: u32, scale: u32) -> Result<(), &'static str> {
    if amount.normalize().scale() > scale {
        return Err("Too many decimal places");
    }
    if amount.abs() >= numeric_limit(precision, scale) {
        return Err("Value is too large");
    }
    Ok(())
}

/// Validate a quantity added to a stock ledger
pub fn validate_stock_quantity(quantity: Decimal) -> Result<(), &'static str> {
    validate_positive_amount(quantity)?;
    validate_decimal_fits(quantity, STOCK_PRECISION, STOCK_SCALE)
}

/// Validate the weight of one unit of food or medicine
pub fn validate_weight_per_unit(weight: Decimal) -> Result<(), &'static str> {
    validate_positive_amount(weight)?;
    validate_decimal_fits(weight, WEIGHT_PRECISION, WEIGHT_SCALE)
}

// ============================================================================
// Livestock Validations
// ============================================================================

/// Validate head counts reported for a day
pub fn validate_unit_counts(dead_unit: i32, good_unit: i32, bad_unit: i32) -> Result<(), &'static str> {
    if dead_unit < 0 || good_unit < 0 || bad_unit < 0 {
        return Err("Unit counts cannot be negative");
    }
    Ok(())
}

/// Validate the dead count of a circle never exceeds its head count
pub fn validate_circle_units(total_unit: i32, dead_unit: i32) -> Result<(), &'static str> {
    if total_unit < 0 || dead_unit < 0 {
        return Err("Unit counts cannot be negative");
    }
    if dead_unit > total_unit {
        return Err("Dead units cannot exceed total units");
    }
    Ok(())
}

/// Validate an average weight in kilograms
pub fn validate_average_weight(weight: Decimal) -> Result<(), &'static str> {
    if weight < Decimal::ZERO {
        return Err("Average weight cannot be negative");
    }
    validate_decimal_fits(weight, WEIGHT_PRECISION, WEIGHT_SCALE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert!(validate_name("Barn A").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("   ").is_err());
        assert!(validate_name(&"x".repeat(MAX_NAME_LENGTH)).is_ok());
        assert!(validate_name(&"x".repeat(MAX_NAME_LENGTH + 1)).is_err());
    }

    #[test]
    fn test_validate_name_counts_characters_not_bytes() {
        assert!(validate_name(&"ồ".repeat(MAX_NAME_LENGTH)).is_ok());
    }

    #[test]
    fn test_validate_positive_amount() {
        assert!(validate_positive_amount(Decimal::new(5, 1)).is_ok());
        assert!(validate_positive_amount(Decimal::ZERO).is_err());
        assert!(validate_positive_amount(Decimal::from(-3)).is_err());
    }

    #[test]
    fn test_validate_unit_counts() {
        assert!(validate_unit_counts(0, 100, 2).is_ok());
        assert!(validate_unit_counts(-1, 100, 2).is_err());
        assert!(validate_unit_counts(0, 0, -5).is_err());
    }

    #[test]
    fn test_validate_circle_units() {
        assert!(validate_circle_units(500, 0).is_ok());
        assert!(validate_circle_units(500, 500).is_ok());
        assert!(validate_circle_units(500, 501).is_err());
        assert!(validate_circle_units(-1, 0).is_err());
    }

    #[test]
    fn test_validate_average_weight() {
        assert!(validate_average_weight(Decimal::ZERO).is_ok());
        assert!(validate_average_weight(Decimal::new(-1, 2)).is_err());
        assert!(validate_average_weight(Decimal::new(12_5001, 4)).is_err());
    }

    #[test]
    fn test_validate_stock_quantity_bounds() {
        assert!(validate_stock_quantity(Decimal::new(1205, 1)).is_ok());
        // 99_999_999_999.999 is the largest NUMERIC(14, 3)
        assert!(validate_stock_quantity(Decimal::new(99_999_999_999_999, 3)).is_ok());
        assert_eq!(
            validate_stock_quantity(Decimal::from(100_000_000_000u64)),
            Err("Value is too large")
        );
        assert_eq!(
            validate_stock_quantity(Decimal::from(1_000_000_000_000u64)),
            Err("Value is too large")
        );
        assert!(validate_stock_quantity(Decimal::ZERO).is_err());
    }

    #[test]
    fn test_validate_stock_quantity_rejects_extra_scale() {
        assert_eq!(
            validate_stock_quantity(Decimal::new(10_0001, 4)),
            Err("Too many decimal places")
        );
        // Trailing zeros are not real precision
        assert!(validate_stock_quantity(Decimal::new(10_5000, 4)).is_ok());
    }

    #[test]
    fn test_validate_weight_per_unit() {
        assert!(validate_weight_per_unit(Decimal::new(25, 0)).is_ok());
        assert!(validate_weight_per_unit(Decimal::ZERO).is_err());
        assert!(validate_weight_per_unit(Decimal::from(1_000_000_000u64)).is_err());
    }

    #[test]
    fn test_numeric_limit() {
        assert_eq!(numeric_limit(14, 3), Decimal::from(100_000_000_000u64));
        assert_eq!(numeric_limit(12, 3), Decimal::from(1_000_000_000u64));
    }
}
