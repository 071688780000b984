//! Configuration validation rules.

use super::schema::Config;

/// Validate configuration and return aggregated validation errors.
pub fn validate_config(config: &Config) -> crate::Result<()> {
    let mut errors = Vec::new();

    let base_url = config.api.base_url.trim();
    if base_url.is_empty() {
        errors.push("api.base_url must not be empty".to_string());
    } else if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        errors.push("api.base_url must start with http:// or https://".to_string());
    }

    if config.session.dir.trim().is_empty() {
        errors.push("session.dir must not be empty".to_string());
    }

    const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
    if !LEVELS.contains(&config.logging.level.to_lowercase().as_str()) {
        errors.push(format!(
            "logging.level must be one of {:?}, got '{}'",
            LEVELS, config.logging.level
        ));
    }

    const FORMATS: [&str; 2] = ["text", "json"];
    if !FORMATS.contains(&config.logging.format.to_lowercase().as_str()) {
        errors.push(format!(
            "logging.format must be one of {:?}, got '{}'",
            FORMATS, config.logging.format
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(crate::Error::Validation(errors.join("; ")))
    }
}
