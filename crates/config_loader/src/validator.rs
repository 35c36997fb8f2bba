//! Configuration validation
//!
//! Rules:
//! - level names (filter and granular) are known long names
//! - granular paths are non-empty
//! - `file` filters name a `filename`
//! - `socket` filters name a `protocol` and an `endpoint`

use contracts::{ContractError, DestinationType, FilterConfig, Level, LoggingBlueprint};

/// Validate a LoggingBlueprint.
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(blueprint: &LoggingBlueprint) -> Result<(), ContractError> {
    for (idx, filter) in blueprint.filters.iter().enumerate() {
        validate_levels(idx, filter)?;
        validate_granulars(idx, filter)?;
        validate_properties(idx, filter)?;
    }
    Ok(())
}

/// Validate filter and granular level names
fn validate_levels(idx: usize, filter: &FilterConfig) -> Result<(), ContractError> {
    if Level::try_from_name(&filter.level).is_none() {
        return Err(ContractError::config_validation(
            format!("filters[{idx}].level"),
            format!("unknown level '{}'", filter.level),
        ));
    }

    for (g, granular) in filter.granulars.iter().enumerate() {
        if Level::try_from_name(&granular.level).is_none() {
            return Err(ContractError::config_validation(
                format!("filters[{idx}].granulars[{g}].level"),
                format!("unknown level '{}'", granular.level),
            ));
        }
    }
    Ok(())
}

/// Validate granular paths
fn validate_granulars(idx: usize, filter: &FilterConfig) -> Result<(), ContractError> {
    for (g, granular) in filter.granulars.iter().enumerate() {
        if granular.path.trim().is_empty() {
            return Err(ContractError::config_validation(
                format!("filters[{idx}].granulars[{g}].path"),
                "granular path cannot be empty",
            ));
        }
    }
    Ok(())
}

/// Validate destination-specific properties
fn validate_properties(idx: usize, filter: &FilterConfig) -> Result<(), ContractError> {
    let required: &[&str] = match filter.destination_type {
        DestinationType::Console => &[],
        DestinationType::File => &["filename"],
        DestinationType::Socket => &["protocol", "endpoint"],
    };

    for key in required {
        let present = filter
            .properties
            .get(*key)
            .is_some_and(|value| !value.trim().is_empty());
        if !present {
            return Err(ContractError::config_validation(
                format!("filters[{idx}].properties.{key}"),
                format!("{} filter requires '{key}'", filter.destination_type.as_str()),
            ));
        }
    }
    Ok(())
}
