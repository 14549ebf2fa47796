//! `run` command implementation.

use anyhow::{Context, Result};
use std::time::Duration;
use tracing::{info, warn};

use crate::cli::RunArgs;
use crate::pipeline::{Pipeline, PipelineConfig};

/// Execute the `run` command
pub async fn run_pipeline(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    // Validate config path
    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    // Load and parse configuration
    let run_config = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    info!(
        line_id = %run_config.line_id,
        source = %run_config.capture.source,
        threshold = run_config.results.conf_threshold,
        retention_days = run_config.governance.retention_days,
        "Configuration loaded"
    );

    // Dry run - just validate and exit
    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&run_config);
        return Ok(());
    }

    // Build pipeline configuration
    let pipeline_config = PipelineConfig {
        run: run_config,
        demo: args.demo,
        max_results: if args.max_results == 0 {
            None
        } else {
            Some(args.max_results)
        },
        timeout: if args.timeout == 0 {
            None
        } else {
            Some(Duration::from_secs(args.timeout))
        },
        metrics_port: if args.metrics_port == 0 {
            None
        } else {
            Some(args.metrics_port)
        },
    };

    // Create and run pipeline
    let pipeline = Pipeline::new(pipeline_config);

    // Setup graceful shutdown handler
    let shutdown_signal = setup_shutdown_signal();

    info!("Starting pipeline...");

    // Run pipeline with shutdown signal
    tokio::select! {
        result = pipeline.run() => {
            match result {
                Ok(stats) => {
                    info!(
                        results = stats.results_processed,
                        alerts = stats.alerts_fired,
                        duration_secs = stats.duration.as_secs_f64(),
                        "Pipeline completed successfully"
                    );

                    // Print detailed statistics
                    stats.print_summary();
                }
                Err(e) => {
                    return Err(e).context("Pipeline execution failed");
                }
            }
        }
        _ = shutdown_signal => {
            warn!("Received shutdown signal, stopping pipeline...");
        }
    }

    info!("EdgeSight finished");
    Ok(())
}

/// Setup Ctrl+C and SIGTERM signal handlers
async fn setup_shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Print configuration summary for dry-run mode
fn print_config_summary(config: &contracts::RunConfig) {
    println!("\n=== Configuration Summary ===\n");
    println!("Line: {}", config.line_id);
    println!("\nCapture:");
    println!("  Source: {}", config.capture.source);
    println!("  FPS cap: {}", config.capture.fps_cap);
    println!("  Buffer capacity: {}", config.capture.buffer_capacity);
    println!("  Transform URL: {}", config.capture.transform_url);
    println!("\nResults:");
    println!("  Alert threshold: {}", config.results.conf_threshold);
    println!("\nGovernance:");
    println!("  Base dir: {}", config.governance.base_dir.display());
    println!("  Retention: {} days", config.governance.retention_days);
    println!("\nSinks:");
    println!(
        "  message_bus: {} ({}:{})",
        enabled_str(config.sinks.message_bus.enabled),
        config.sinks.message_bus.host,
        config.sinks.message_bus.port
    );
    println!(
        "  tag_write:   {} ({})",
        enabled_str(config.sinks.tag_write.enabled),
        config.sinks.tag_write.endpoint.as_deref().unwrap_or("-")
    );
    println!(
        "  webhook:     {} ({})",
        enabled_str(config.sinks.webhook.enabled),
        config.sinks.webhook.url.as_deref().unwrap_or("-")
    );
    println!();
}

fn enabled_str(enabled: bool) -> &'static str {
    if enabled {
        "enabled"
    } else {
        "disabled"
    }
}
