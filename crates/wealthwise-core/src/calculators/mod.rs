//! Planning calculators
//!
//! Pure functions over plain inputs. They never read user state directly;
//! callers derive inputs from a profile where that makes sense.
//!
//! - `compound` - future value of a lump sum plus monthly contributions
//! - `fire` - financial-independence targets and time-to-target projection
//! - `budget` - 50/30/20 split of monthly income

pub mod budget;
pub mod compound;
pub mod fire;

pub use budget::BudgetSplit;
pub use compound::{CompoundInputs, CompoundResult};
pub use fire::{FireInputs, FireProjection, FireScenario, YearProjection};

use crate::error::{Error, Result};

/// Validate a calculator input that must be a finite, non-negative number
pub(crate) fn non_negative(field: &str, value: f64) -> Result<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(Error::InvalidInput(format!(
            "{} must be a non-negative number, got {}",
            field, value
        )))
    }
}

/// Validate a calculator input that only needs to be finite (rates may be negative)
pub(crate) fn finite(field: &str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(Error::InvalidInput(format!("{} must be a finite number", field)))
    }
}

/// Validate a whole-number input against an inclusive range
pub(crate) fn within(field: &str, value: u32, min: u32, max: u32) -> Result<u32> {
    if (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(Error::InvalidInput(format!(
            "{} must be between {} and {}, got {}",
            field, min, max, value
        )))
    }
}

/// Reject a computed figure that overflowed or became undefined
pub(crate) fn finite_result(field: &str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(Error::InvalidInput(format!(
            "these inputs give no finite {}",
            field
        )))
    }
}
