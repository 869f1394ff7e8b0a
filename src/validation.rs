//! Input validation: parse and range-check the three raw process parameters.
//!
//! Checks run in a fixed order — sludge ratio, carbon content, temperature —
//! and only the first failure is reported per invocation. Range checks do
//! not run until all three fields parse.

use crate::types::{ParameterField, ParameterSet, RawParameters};

/// A classified validation failure. The `Display` form is the exact
/// message shown to the engineer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// One or more fields did not parse as a decimal number.
    #[error("enter a valid number")]
    Parse,
    /// A field parsed but fell outside its inclusive bounds.
    #[error("{}", .0.range_message())]
    Range(ParameterField),
}

/// Parse a single raw field as a decimal number.
///
/// Leading/trailing whitespace is tolerated (text inputs routinely carry
/// it); anything else non-numeric is a parse failure. NaN and infinities
/// are rejected — they parse as `f64` but are not decimal numbers an
/// engineer can have meant.
fn parse_field(raw: &str) -> Result<f64, ValidationError> {
    let value: f64 = raw.trim().parse().map_err(|_| ValidationError::Parse)?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ValidationError::Parse)
    }
}

fn check_range(value: f64, field: ParameterField) -> Result<(), ValidationError> {
    let (min, max) = field.bounds();
    if value >= min && value <= max {
        Ok(())
    } else {
        Err(ValidationError::Range(field))
    }
}

/// Validate the three raw inputs into an immutable [`ParameterSet`].
///
/// Parse pass first (ratio, carbon, temperature), then range checks in the
/// same order; short-circuits on the first failure. No side effects on
/// failure.
pub fn validate(raw: &RawParameters) -> Result<ParameterSet, ValidationError> {
    let sludge_ratio = parse_field(&raw.sludge_ratio)?;
    let carbon_content = parse_field(&raw.carbon_content)?;
    let temperature = parse_field(&raw.temperature)?;

    check_range(sludge_ratio, ParameterField::SludgeRatio)?;
    check_range(carbon_content, ParameterField::CarbonContent)?;
    check_range(temperature, ParameterField::Temperature)?;

    Ok(ParameterSet::new(
        sludge_ratio,
        carbon_content,
        temperature,
        [
            raw.sludge_ratio.clone(),
            raw.carbon_content.clone(),
            raw.temperature.clone(),
        ],
    ))
}
