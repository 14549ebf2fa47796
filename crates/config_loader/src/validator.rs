//! Configuration validation
//!
//! Validation rules:
//! - field ranges via the derived `Validate` impl (threshold, capacities)
//! - backoff_floor_ms <= backoff_ceiling_ms
//! - an enabled webhook sink must carry a URL
//! - an enabled tag-write sink must carry an endpoint

use contracts::{PipelineError, RunConfig};
use validator::Validate;

/// Validate a RunConfig
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(config: &RunConfig) -> Result<(), PipelineError> {
    validate_derived(config)?;
    validate_backoff(config)?;
    validate_sinks(config)?;
    Ok(())
}

/// Run the field-level rules declared on the config structs
fn validate_derived(config: &RunConfig) -> Result<(), PipelineError> {
    config.validate().map_err(|errors| {
        let field = errors
            .field_errors()
            .keys()
            .next()
            .map(|k| k.to_string())
            .unwrap_or_else(|| "config".to_string());
        PipelineError::config_validation(field, errors.to_string())
    })
}

/// Backoff floor must not exceed the ceiling
fn validate_backoff(config: &RunConfig) -> Result<(), PipelineError> {
    let capture = &config.capture;
    if capture.backoff_floor_ms > capture.backoff_ceiling_ms {
        return Err(PipelineError::config_validation(
            "capture.backoff_floor_ms / capture.backoff_ceiling_ms",
            format!(
                "backoff_floor_ms ({}) must be <= backoff_ceiling_ms ({})",
                capture.backoff_floor_ms, capture.backoff_ceiling_ms
            ),
        ));
    }
    Ok(())
}

/// Enabled sinks must have their endpoints configured
fn validate_sinks(config: &RunConfig) -> Result<(), PipelineError> {
    let sinks = &config.sinks;

    if sinks.webhook.enabled && sinks.webhook.url.as_deref().unwrap_or("").is_empty() {
        return Err(PipelineError::config_validation(
            "sinks.webhook.url",
            "webhook sink is enabled but no url is configured",
        ));
    }

    if sinks.tag_write.enabled && sinks.tag_write.endpoint.as_deref().unwrap_or("").is_empty() {
        return Err(PipelineError::config_validation(
            "sinks.tag_write.endpoint",
            "tag-write sink is enabled but no endpoint is configured",
        ));
    }

    if sinks.message_bus.enabled && sinks.message_bus.host.is_empty() {
        return Err(PipelineError::config_validation(
            "sinks.message_bus.host",
            "message-bus sink is enabled but no broker host is configured",
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_config() -> RunConfig {
        parse_minimal(
            r#"
[capture]
transform_url = "http://localhost:9002/frame"
"#,
        )
    }

    fn parse_minimal(content: &str) -> RunConfig {
        crate::parser::parse_toml(content).unwrap()
    }

    #[test]
    fn test_valid_config() {
        let config = minimal_config();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_threshold_out_of_range() {
        let mut config = minimal_config();
        config.results.conf_threshold = 1.5;
        let result = validate(&config);
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("conf_threshold"), "got: {err}");
    }

    #[test]
    fn test_backoff_floor_above_ceiling() {
        let mut config = minimal_config();
        config.capture.backoff_floor_ms = 5000;
        config.capture.backoff_ceiling_ms = 2000;
        let result = validate(&config);
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("backoff_floor_ms"), "got: {err}");
    }

    #[test]
    fn test_zero_buffer_capacity() {
        let mut config = minimal_config();
        config.capture.buffer_capacity = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_enabled_webhook_without_url() {
        let mut config = minimal_config();
        config.sinks.webhook.enabled = true;
        config.sinks.webhook.url = None;
        let result = validate(&config);
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("webhook"), "got: {err}");
    }

    #[test]
    fn test_enabled_tag_write_without_endpoint() {
        let mut config = minimal_config();
        config.sinks.tag_write.enabled = true;
        let result = validate(&config);
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("tag_write"), "got: {err}");
    }
}
