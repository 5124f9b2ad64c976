//! Definedness assertion for values that must be present before wiring continues

use crate::error::ConfigurationError;

/// Narrow an optional value, failing with an error that names `field`
///
/// Absence is a programming or configuration error: callers propagate the
/// error with `?` and the definition pass stops.
pub fn assert_defined<T>(field: &str, value: Option<T>) -> Result<T, ConfigurationError> {
    value.ok_or_else(|| ConfigurationError::Undefined {
        field: field.to_string(),
    })
}
