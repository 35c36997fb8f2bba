//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::{DestinationType, Level, LoggingBlueprint};
use serde::Serialize;
use std::collections::HashSet;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    filter_count: usize,
    enabled_count: usize,
    console_count: usize,
    file_count: usize,
    socket_count: usize,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{json}");
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    if let Err(e) = crate::error::ensure_config_exists(&args.config) {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        };
    }

    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(blueprint) => {
            let warnings = collect_warnings(&blueprint);
            let count = |kind: DestinationType| {
                blueprint
                    .enabled_filters()
                    .filter(|f| f.destination_type == kind)
                    .count()
            };

            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: (!warnings.is_empty()).then_some(warnings),
                summary: Some(ConfigSummary {
                    version: format!("{:?}", blueprint.version),
                    filter_count: blueprint.filters.len(),
                    enabled_count: blueprint.enabled_filters().count(),
                    console_count: count(DestinationType::Console),
                    file_count: count(DestinationType::File),
                    socket_count: count(DestinationType::Socket),
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(blueprint: &LoggingBlueprint) -> Vec<String> {
    let mut warnings = Vec::new();

    if blueprint.enabled_filters().next().is_none() {
        warnings.push("No enabled filters - every record will be discarded".to_string());
    }

    let mut seen = HashSet::new();
    for (i, filter) in blueprint.filters.iter().enumerate() {
        if !filter.tag.is_empty() && !seen.insert(filter.tag.as_str()) {
            warnings.push(format!("filters[{i}]: duplicate tag '{}'", filter.tag));
        }
        if filter.enabled && Level::from_name(&filter.level) == Level::None {
            warnings.push(format!(
                "filters[{i}] '{}': level NONE delivers every record",
                filter.label()
            ));
        }
        if !filter.enabled {
            warnings.push(format!("filters[{i}] '{}' is disabled", filter.label()));
        }
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!(
                "  Filters: {} ({} enabled)",
                summary.filter_count, summary.enabled_count
            );
            println!(
                "  Destinations: {} console, {} file, {} socket",
                summary.console_count, summary.file_count, summary.socket_count
            );
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {warning}");
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {error}");
        }
    }
}
