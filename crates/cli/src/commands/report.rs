//! `report` command implementation.
//!
//! Verifies and aggregates a date range of the governance log, the way a
//! compliance reviewer would consume it.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

use crate::cli::ReportArgs;

/// Report payload for JSON output
#[derive(Serialize)]
struct Report {
    period: String,
    total: u64,
    invalid_signature_count: u64,
    total_detections: u64,
    p95_latency_ms: f64,
}

/// Execute the `report` command
pub fn run_report(args: &ReportArgs) -> Result<()> {
    let date_from = parse_date(&args.date_from, "--from")?;
    let date_to = parse_date(&args.date_to, "--to")?;
    if date_from > date_to {
        anyhow::bail!("--from ({date_from}) is after --to ({date_to})");
    }

    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }
    let config = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    info!(
        base_dir = %config.governance.base_dir.display(),
        %date_from,
        %date_to,
        "Generating governance report"
    );

    let log = governance::GovernanceLog::open(&config.governance.base_dir)
        .context("Failed to open governance log")?;
    let summary = log
        .summarize(date_from, date_to)
        .context("Failed to summarize governance log")?;

    let report = Report {
        period: format!("{date_from}..{date_to}"),
        total: summary.total,
        invalid_signature_count: summary.invalid_signature_count,
        total_detections: summary.total_detections,
        p95_latency_ms: summary.p95_latency_ms,
    };

    if args.json {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
        println!("{}", json);
    } else {
        println!("\n=== Governance Report ({}) ===\n", report.period);
        println!("  Entries:            {}", report.total);
        println!("  Invalid signatures: {}", report.invalid_signature_count);
        println!("  Total detections:   {}", report.total_detections);
        println!("  p95 latency:        {} ms", report.p95_latency_ms);
        println!();
    }

    if report.invalid_signature_count > 0 {
        anyhow::bail!(
            "{} entries failed signature verification",
            report.invalid_signature_count
        );
    }

    Ok(())
}

fn parse_date(raw: &str, flag: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .with_context(|| format!("{flag} must be YYYY-MM-DD, got '{raw}'"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::ReportArgs;

    #[test]
    fn test_parse_date_rejects_garbage() {
        assert!(parse_date("2026-08-07", "--from").is_ok());
        assert!(parse_date("yesterday", "--from").is_err());
        assert!(parse_date("2026-13-01", "--to").is_err());
    }

    #[test]
    fn test_report_on_empty_log() {
        let dir = tempfile::tempdir().unwrap();
        let governance_dir = dir.path().join("governance");
        let config_path = dir.path().join("config.toml");
        std::fs::write(
            &config_path,
            format!(
                "[capture]\ntransform_url = \"http://localhost:9002/frame\"\n\n\
                 [governance]\nbase_dir = \"{}\"\n",
                governance_dir.display()
            ),
        )
        .unwrap();

        let args = ReportArgs {
            config: config_path,
            date_from: "2026-08-01".to_string(),
            date_to: "2026-08-07".to_string(),
            json: true,
        };
        assert!(run_report(&args).is_ok());
    }

    #[test]
    fn test_report_rejects_inverted_range() {
        let args = ReportArgs {
            config: std::path::PathBuf::from("config.toml"),
            date_from: "2026-08-07".to_string(),
            date_to: "2026-08-01".to_string(),
            json: false,
        };
        assert!(run_report(&args).is_err());
    }
}
