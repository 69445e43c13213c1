use crate::config::types::{CatalogConfig, Config, OutputConfig, PipelineConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_catalog_config(&config.catalog)?;
    validate_pipeline_config(&config.pipeline)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates catalog configuration
fn validate_catalog_config(config: &CatalogConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url '{}' must use http or https",
            config.base_url
        )));
    }

    if config.tag.trim().is_empty() {
        return Err(ConfigError::Validation("tag cannot be empty".to_string()));
    }

    // The tag becomes a path segment of the listing URL
    if config.tag.contains(['/', '?', '#']) {
        return Err(ConfigError::Validation(format!(
            "tag cannot contain '/', '?' or '#', got '{}'",
            config.tag
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates pipeline configuration
fn validate_pipeline_config(config: &PipelineConfig) -> Result<(), ConfigError> {
    if config.concurrency < 1 || config.concurrency > 64 {
        return Err(ConfigError::Validation(format!(
            "concurrency must be between 1 and 64, got {}",
            config.concurrency
        )));
    }

    if config.buffer_capacity < 1 || config.buffer_capacity > 1000 {
        return Err(ConfigError::Validation(format!(
            "buffer-capacity must be between 1 and 1000, got {}",
            config.buffer_capacity
        )));
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "request-timeout-secs must be >= 1, got {}",
            config.request_timeout_secs
        )));
    }

    if config.retries > 10 {
        return Err(ConfigError::Validation(format!(
            "retries must be <= 10, got {}",
            config.retries
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if let Some(path) = &config.path {
        if path.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "output path cannot be empty".to_string(),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_base_url() {
        let mut config = Config::default();
        config.catalog.base_url = "not a url".to_string();
        assert!(matches!(
            validate(&config),
            Err(ConfigError::InvalidUrl(_))
        ));

        config.catalog.base_url = "ftp://example.com".to_string();
        assert!(matches!(
            validate(&config),
            Err(ConfigError::InvalidUrl(_))
        ));

        config.catalog.base_url = "http://127.0.0.1:8080".to_string();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_validate_tag() {
        let mut config = Config::default();
        config.catalog.tag = "  ".to_string();
        assert!(validate(&config).is_err());

        config.catalog.tag = "a/b".to_string();
        assert!(validate(&config).is_err());

        config.catalog.tag = "小说".to_string();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_validate_pipeline_bounds() {
        let mut config = Config::default();
        config.pipeline.concurrency = 0;
        assert!(validate(&config).is_err());
        config.pipeline.concurrency = 65;
        assert!(validate(&config).is_err());
        config.pipeline.concurrency = 64;
        assert!(validate(&config).is_ok());

        config.pipeline.buffer_capacity = 0;
        assert!(validate(&config).is_err());
        config.pipeline.buffer_capacity = 1;
        assert!(validate(&config).is_ok());

        config.pipeline.retries = 11;
        assert!(validate(&config).is_err());
        config.pipeline.retries = 10;
        assert!(validate(&config).is_ok());

        config.pipeline.request_timeout_secs = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_validate_output_path() {
        let mut config = Config::default();
        config.output.path = Some(PathBuf::new());
        assert!(validate(&config).is_err());
    }
}
