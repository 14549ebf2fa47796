//! `validate` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
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
    line_id: String,
    source: String,
    buffer_capacity: usize,
    conf_threshold: f32,
    retention_days: u32,
    enabled_sinks: Vec<String>,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
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

    // Check file exists
    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    // Try to load and validate
    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(config) => {
            let warnings = collect_warnings(&config);

            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    line_id: config.line_id.clone(),
                    source: config.capture.source.clone(),
                    buffer_capacity: config.capture.buffer_capacity,
                    conf_threshold: config.results.conf_threshold,
                    retention_days: config.governance.retention_days,
                    enabled_sinks: enabled_sinks(&config),
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

fn enabled_sinks(config: &contracts::RunConfig) -> Vec<String> {
    let mut sinks = Vec::new();
    if config.sinks.message_bus.enabled {
        sinks.push("message_bus".to_string());
    }
    if config.sinks.tag_write.enabled {
        sinks.push("tag_write".to_string());
    }
    if config.sinks.webhook.enabled {
        sinks.push("webhook".to_string());
    }
    sinks
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(config: &contracts::RunConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if enabled_sinks(config).is_empty() {
        warnings.push("No sinks enabled - fired alerts will only reach the audit log".to_string());
    }

    if config.capture.preview_url.is_none() {
        warnings.push("No preview_url configured - operator preview disabled".to_string());
    }

    if config.capture.buffer_capacity < 10 {
        warnings.push(format!(
            "Buffer capacity {} is small - frames will drop quickly during transform outages",
            config.capture.buffer_capacity
        ));
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::ValidateArgs;

    fn write_config(dir: &tempfile::TempDir, content: &str) -> std::path::PathBuf {
        let path = dir.path().join("config.toml");
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_validate_accepts_minimal_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            &dir,
            "[capture]\ntransform_url = \"http://localhost:9002/frame\"\n",
        );

        let args = ValidateArgs {
            config: path,
            json: true,
        };
        assert!(run_validate(&args).is_ok());
    }

    #[test]
    fn test_validate_rejects_out_of_range_threshold() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            &dir,
            "[capture]\ntransform_url = \"http://localhost:9002/frame\"\n\n[results]\nconf_threshold = 2.0\n",
        );

        let args = ValidateArgs {
            config: path,
            json: false,
        };
        assert!(run_validate(&args).is_err());
    }

    #[test]
    fn test_validate_missing_file() {
        let args = ValidateArgs {
            config: std::path::PathBuf::from("/nonexistent/config.toml"),
            json: false,
        };
        assert!(run_validate(&args).is_err());
    }
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Line: {}", summary.line_id);
            println!("  Source: {}", summary.source);
            println!("  Buffer capacity: {}", summary.buffer_capacity);
            println!("  Alert threshold: {}", summary.conf_threshold);
            println!("  Retention: {} days", summary.retention_days);
            println!("  Enabled sinks: {:?}", summary.enabled_sinks);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
