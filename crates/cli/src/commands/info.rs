//! `info` command implementation.

use anyhow::{Context, Result};
use contracts::{FilterConfig, Level, LoggingBlueprint};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::info;

use crate::cli::InfoArgs;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    filters: Vec<FilterInfo>,
}

#[derive(Serialize)]
struct FilterInfo {
    /// Registry index the filter gets when loaded; `None` if disabled
    index: Option<usize>,
    label: String,
    destination_type: String,
    level: String,
    format: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    granulars: Vec<GranularInfo>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    properties: BTreeMap<String, String>,
}

#[derive(Serialize)]
struct GranularInfo {
    path: String,
    level: String,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    crate::error::ensure_config_exists(&args.config)?;

    let blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    let info = build_config_info(&blueprint, args.details);
    if args.json {
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{json}");
    } else {
        print_config_info(&info);
    }

    Ok(())
}

fn build_config_info(blueprint: &LoggingBlueprint, details: bool) -> ConfigInfo {
    let mut next_index = 0;
    let filters = blueprint
        .filters
        .iter()
        .map(|filter| {
            let index = filter.enabled.then(|| {
                next_index += 1;
                next_index - 1
            });
            filter_info(filter, index, details)
        })
        .collect();

    ConfigInfo {
        version: format!("{:?}", blueprint.version),
        filters,
    }
}

fn filter_info(filter: &FilterConfig, index: Option<usize>, details: bool) -> FilterInfo {
    let format = match filter.format_kind() {
        contracts::FormatKind::Json => "json".to_string(),
        contracts::FormatKind::Pattern if filter.pattern().is_empty() => "pattern (%M)".to_string(),
        contracts::FormatKind::Pattern => format!("pattern ({})", filter.pattern()),
    };

    let (granulars, properties) = if details {
        (
            filter
                .granulars
                .iter()
                .map(|g| GranularInfo {
                    path: g.path.clone(),
                    level: g.level.clone(),
                })
                .collect(),
            filter
                .properties
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    } else {
        (Vec::new(), BTreeMap::new())
    };

    FilterInfo {
        index,
        label: filter.label().to_string(),
        destination_type: filter.destination_type.as_str().to_string(),
        level: Level::from_name(&filter.level).name().to_string(),
        format,
        granulars,
        properties,
    }
}

fn print_config_info(info: &ConfigInfo) {
    println!("Sawmill configuration ({})", info.version);
    println!("\nFilters ({})", info.filters.len());

    for (i, filter) in info.filters.iter().enumerate() {
        let is_last = i == info.filters.len() - 1;
        let prefix = if is_last { "└─" } else { "├─" };
        let child_prefix = if is_last { "   " } else { "│  " };

        let index = filter
            .index
            .map(|idx| format!("#{idx}"))
            .unwrap_or_else(|| "disabled".to_string());
        println!(
            "   {prefix} [{index}] {} ({}, >= {}, {})",
            filter.label, filter.destination_type, filter.level, filter.format
        );

        for granular in &filter.granulars {
            println!("   {child_prefix}  ├─ {} >= {}", granular.path, granular.level);
        }
        for (key, value) in &filter.properties {
            println!("   {child_prefix}  ├─ {key} = {value}");
        }
    }

    println!();
}
