//! `info` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    line_id: String,
    capture: CaptureInfo,
    results: ResultsInfo,
    governance: GovernanceInfo,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    sinks: Vec<SinkInfo>,
    broadcast: BroadcastInfo,
}

#[derive(Serialize)]
struct CaptureInfo {
    source: String,
    fps_cap: f64,
    buffer_capacity: usize,
    backoff_floor_ms: u64,
    backoff_ceiling_ms: u64,
    transform_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    preview_url: Option<String>,
}

#[derive(Serialize)]
struct ResultsInfo {
    conf_threshold: f32,
}

#[derive(Serialize)]
struct GovernanceInfo {
    base_dir: String,
    retention_days: u32,
}

#[derive(Serialize)]
struct SinkInfo {
    name: String,
    enabled: bool,
    target: String,
}

#[derive(Serialize)]
struct BroadcastInfo {
    heartbeat_secs: u64,
    queue_capacity: usize,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    let config = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    if args.json {
        let info = build_config_info(&config, args);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&config, args);
    }

    Ok(())
}

fn build_config_info(config: &contracts::RunConfig, args: &InfoArgs) -> ConfigInfo {
    let sinks = if args.sinks {
        sink_infos(config)
    } else {
        Vec::new()
    };

    ConfigInfo {
        line_id: config.line_id.clone(),
        capture: CaptureInfo {
            source: config.capture.source.clone(),
            fps_cap: config.capture.fps_cap,
            buffer_capacity: config.capture.buffer_capacity,
            backoff_floor_ms: config.capture.backoff_floor_ms,
            backoff_ceiling_ms: config.capture.backoff_ceiling_ms,
            transform_url: config.capture.transform_url.clone(),
            preview_url: config.capture.preview_url.clone(),
        },
        results: ResultsInfo {
            conf_threshold: config.results.conf_threshold,
        },
        governance: GovernanceInfo {
            base_dir: config.governance.base_dir.display().to_string(),
            retention_days: config.governance.retention_days,
        },
        sinks,
        broadcast: BroadcastInfo {
            heartbeat_secs: config.broadcast.heartbeat_secs,
            queue_capacity: config.broadcast.queue_capacity,
        },
    }
}

fn sink_infos(config: &contracts::RunConfig) -> Vec<SinkInfo> {
    vec![
        SinkInfo {
            name: "message_bus".to_string(),
            enabled: config.sinks.message_bus.enabled,
            target: format!(
                "{}:{}",
                config.sinks.message_bus.host, config.sinks.message_bus.port
            ),
        },
        SinkInfo {
            name: "tag_write".to_string(),
            enabled: config.sinks.tag_write.enabled,
            target: config
                .sinks
                .tag_write
                .endpoint
                .clone()
                .unwrap_or_else(|| "-".to_string()),
        },
        SinkInfo {
            name: "webhook".to_string(),
            enabled: config.sinks.webhook.enabled,
            target: config
                .sinks
                .webhook
                .url
                .clone()
                .unwrap_or_else(|| "-".to_string()),
        },
    ]
}

fn print_config_info(config: &contracts::RunConfig, args: &InfoArgs) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                EdgeSight Configuration                       ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("Line: {}", config.line_id);

    println!("\nCapture");
    println!("   ├─ Source: {}", config.capture.source);
    println!("   ├─ FPS cap: {}", config.capture.fps_cap);
    println!("   ├─ Buffer capacity: {}", config.capture.buffer_capacity);
    println!(
        "   ├─ Backoff: {}ms .. {}ms",
        config.capture.backoff_floor_ms, config.capture.backoff_ceiling_ms
    );
    println!("   └─ Transform URL: {}", config.capture.transform_url);

    println!("\nResults");
    println!("   └─ Alert threshold: {}", config.results.conf_threshold);

    println!("\nGovernance");
    println!("   ├─ Base dir: {}", config.governance.base_dir.display());
    println!("   └─ Retention: {} days", config.governance.retention_days);

    if args.sinks {
        println!("\nSinks");
        let sinks = sink_infos(config);
        for (i, sink) in sinks.iter().enumerate() {
            let prefix = if i == sinks.len() - 1 {
                "└─"
            } else {
                "├─"
            };
            let status = if sink.enabled { "enabled" } else { "disabled" };
            println!("   {} {} ({}, {})", prefix, sink.name, status, sink.target);
        }
    }

    println!("\nBroadcast");
    println!("   ├─ Heartbeat: {}s", config.broadcast.heartbeat_secs);
    println!("   └─ Queue capacity: {}", config.broadcast.queue_capacity);

    println!();
}
