//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::{Config, ProcessingConfig};

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.processing.parallel_workers == 0 {
            return Err(ConfigError::ValidationError(
                "processing.parallel_workers must be > 0".into(),
            ));
        }
        if self.processing.max_items == 0 {
            return Err(ConfigError::ValidationError(
                "processing.max_items must be > 0".into(),
            ));
        }
        if self.processing.supported_formats.is_empty() {
            return Err(ConfigError::ValidationError(
                "processing.supported_formats must not be empty".into(),
            ));
        }
        if self.limits.max_file_size_mb == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_file_size_mb must be > 0".into(),
            ));
        }
        if self.limits.max_image_dimension == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_image_dimension must be > 0".into(),
            ));
        }
        if self.cache.enabled && self.cache.capacity == 0 {
            return Err(ConfigError::ValidationError(
                "cache.capacity must be > 0 when the cache is enabled".into(),
            ));
        }
        if self.cache.enabled && self.cache.ttl_secs == 0 {
            return Err(ConfigError::ValidationError(
                "cache.ttl_secs must be > 0 when the cache is enabled".into(),
            ));
        }
        self.job
            .validate_settings()
            .map_err(|e| match e {
                ConfigError::ValidationError(msg) => {
                    ConfigError::ValidationError(format!("job.{msg}"))
                }
                other => other,
            })
    }
}

impl ProcessingConfig {
    /// Range checks that do not depend on a supplied logo image.
    pub fn validate_settings(&self) -> Result<(), ConfigError> {
        if self.quality > 100 {
            return Err(ConfigError::ValidationError(
                "quality must be between 0 and 100".into(),
            ));
        }
        if !(0.0..=0.5).contains(&self.padding_ratio) {
            return Err(ConfigError::ValidationError(
                "padding_ratio must be between 0.0 and 0.5".into(),
            ));
        }
        if let Some(canvas) = self.fixed_canvas {
            if canvas.width == 0 || canvas.height == 0 {
                return Err(ConfigError::ValidationError(format!(
                    "fixed_canvas must be non-empty, got {canvas}"
                )));
            }
        }
        if !(self.logo.size_ratio > 0.0 && self.logo.size_ratio <= 1.0) {
            return Err(ConfigError::ValidationError(
                "logo.size_ratio must be in (0.0, 1.0]".into(),
            ));
        }
        Ok(())
    }

    /// Full check run before a batch is dispatched.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_settings()?;
        if self.logo.enabled && self.logo_image.is_none() {
            return Err(ConfigError::MissingLogo);
        }
        Ok(())
    }
}
