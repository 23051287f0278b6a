//! Configuration validation.

use crate::error::ConfigError;
use crate::schema::Config;

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// Fail with every error, or hand back the warnings.
    pub fn into_result(self) -> Result<Vec<ValidationWarning>, ConfigError> {
        if self.errors.is_empty() {
            Ok(self.warnings)
        } else {
            Err(ConfigError::Invalid(
                self.errors.iter().map(ToString::to_string).collect(),
            ))
        }
    }
}

#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

const KNOWN_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];
const KNOWN_PERMISSIONS: &[&str] = &["storage", "downloads", "tabs", "activeTab", "scripting"];

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    pub fn validate(config: &Config) -> ValidationResult {
        let mut result = ValidationResult::default();

        Self::validate_messaging(config, &mut result);
        Self::validate_storage(config, &mut result);
        Self::validate_logging(config, &mut result);
        Self::validate_extension(config, &mut result);

        result
    }

    fn validate_messaging(config: &Config, result: &mut ValidationResult) {
        let messaging = &config.messaging;
        if messaging.default_timeout_ms == 0 {
            result.add_error(ValidationError::new(
                "messaging.default_timeout_ms",
                "Timeout must be greater than 0",
            ));
        } else if messaging.default_timeout_ms > 60_000 {
            result.add_warning(ValidationWarning::new(
                "messaging.default_timeout_ms",
                "Timeout above 60s keeps callers waiting on unreachable contexts",
            ));
        }

        if messaging.default_retries > 10 {
            result.add_warning(ValidationWarning::new(
                "messaging.default_retries",
                "More than 10 retries multiplies the worst-case wait",
            ));
        }

        if messaging.page_channel_tag.trim().is_empty() {
            result.add_error(ValidationError::new(
                "messaging.page_channel_tag",
                "Page channel tag cannot be empty",
            ));
        }
    }

    fn validate_storage(config: &Config, result: &mut ValidationResult) {
        if config.storage.sync_quota_bytes == 0 {
            result.add_error(ValidationError::new(
                "storage.sync_quota_bytes",
                "Quota must be greater than 0",
            ));
        }
        if config.storage.local_quota_bytes == 0 {
            result.add_error(ValidationError::new(
                "storage.local_quota_bytes",
                "Quota must be greater than 0",
            ));
        }
        if config.storage.sync_quota_bytes > config.storage.local_quota_bytes {
            result.add_warning(ValidationWarning::new(
                "storage.sync_quota_bytes",
                "Sync quota is larger than the local quota",
            ));
        }
    }

    fn validate_logging(config: &Config, result: &mut ValidationResult) {
        let level = config.logging.level.to_lowercase();
        if !KNOWN_LEVELS.contains(&level.as_str()) {
            result.add_error(ValidationError::new(
                "logging.level",
                format!("Unknown log level '{}'", config.logging.level),
            ));
        }
        if config.logging.dir.trim().is_empty() {
            result.add_error(ValidationError::new("logging.dir", "Log directory cannot be empty"));
        }
    }

    fn validate_extension(config: &Config, result: &mut ValidationResult) {
        if config.extension.version.trim().is_empty() {
            result.add_error(ValidationError::new(
                "extension.version",
                "Version cannot be empty",
            ));
        }
        for permission in &config.extension.permissions {
            if !KNOWN_PERMISSIONS.contains(&permission.as_str()) {
                result.add_warning(ValidationWarning::new(
                    "extension.permissions",
                    format!("Unknown permission '{}'", permission),
                ));
            }
        }
        if !config.extension.permissions.iter().any(|p| p == "storage") {
            result.add_warning(ValidationWarning::new(
                "extension.permissions",
                "Without 'storage' every settings request fails with PERMISSION_DENIED",
            ));
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
