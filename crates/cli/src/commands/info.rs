//! `info` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    relay: RelayInfo,
    source: SourceInfo,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    sinks: Vec<SinkInfo>,
}

#[derive(Serialize)]
struct RelayInfo {
    quiet_window_ms: u64,
    origin_template: String,
}

#[derive(Serialize)]
struct SourceInfo {
    max_asset_bytes: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    assets_root: Option<String>,
}

#[derive(Serialize)]
struct SinkInfo {
    name: String,
    kind: String,
    max_payload_bytes: u64,
    silent: bool,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    let blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    if args.json {
        let info = build_config_info(&blueprint, args);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&blueprint, args);
    }

    Ok(())
}

fn build_config_info(blueprint: &contracts::RelayBlueprint, args: &InfoArgs) -> ConfigInfo {
    let sinks = if args.sinks {
        blueprint
            .sinks
            .iter()
            .map(|s| SinkInfo {
                name: s.name.clone(),
                kind: format!("{:?}", s.kind),
                max_payload_bytes: s.max_payload_bytes,
                silent: s.silent,
            })
            .collect()
    } else {
        Vec::new()
    };

    ConfigInfo {
        version: format!("{:?}", blueprint.version),
        relay: RelayInfo {
            quiet_window_ms: blueprint.relay.quiet_window_ms,
            origin_template: blueprint.relay.origin_template.clone(),
        },
        source: SourceInfo {
            max_asset_bytes: blueprint.source.max_asset_bytes,
            assets_root: blueprint
                .source
                .assets_root
                .as_ref()
                .map(|p| p.display().to_string()),
        },
        sinks,
    }
}

fn print_config_info(blueprint: &contracts::RelayBlueprint, args: &InfoArgs) {
    println!("=== Media Relay Configuration ===\n");

    println!("Relay");
    println!("   Version: {:?}", blueprint.version);
    println!("   Quiet window: {} ms", blueprint.relay.quiet_window_ms);
    println!(
        "   Origin template: {:?}",
        blueprint.relay.origin_template
    );

    println!("\nSource");
    println!("   Max asset size: {} bytes", blueprint.source.max_asset_bytes);
    match &blueprint.source.assets_root {
        Some(root) => println!("   Assets root: {}", root.display()),
        None => println!("   Assets root: (working directory)"),
    }

    println!("\nSinks ({})", blueprint.sinks.len());
    for sink in &blueprint.sinks {
        if args.sinks {
            println!(
                "   - {} ({:?}, max {} bytes, silent: {})",
                sink.name, sink.kind, sink.max_payload_bytes, sink.silent
            );
        } else {
            println!("   - {} ({:?})", sink.name, sink.kind);
        }
    }

    println!();
}
