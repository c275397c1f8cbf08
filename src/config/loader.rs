//! Configuration Loader
//!
//! Environment-aware configuration loading. Files are the single source
//! of truth; `GAMESDK_*` environment variables override individual keys
//! for deployment-time tuning.

use super::AppConfig;
use crate::error::{CoreError, CoreResult};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Loaded application configuration plus the environment it was resolved
/// for.
#[derive(Debug)]
pub struct ConfigManager {
    config: AppConfig,
    environment: String,
}

impl ConfigManager {
    /// Load configuration from a file with environment auto-detection.
    ///
    /// The file format is inferred from the extension (TOML, YAML or
    /// JSON); `GAMESDK_*` environment variables override file values,
    /// with `__` separating nested keys.
    pub fn load(path: impl AsRef<Path>) -> CoreResult<Arc<Self>> {
        Self::load_with_env(path, &Self::detect_environment())
    }

    /// Load configuration with an explicit environment name.
    ///
    /// Useful for testing without mutating process environment variables.
    pub fn load_with_env(path: impl AsRef<Path>, environment: &str) -> CoreResult<Arc<Self>> {
        let path = path.as_ref();
        debug!(
            environment,
            path = %path.display(),
            "loading application configuration"
        );

        let settings = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(config::Environment::with_prefix("GAMESDK").separator("__"))
            .build()
            .map_err(|e| CoreError::Configuration(e.to_string()))?;

        let config: AppConfig = settings
            .try_deserialize()
            .map_err(|e| CoreError::Configuration(e.to_string()))?;

        debug!(
            app = %config.name,
            plugins = config.plugins.len(),
            services = config.services.len(),
            "application configuration loaded"
        );

        Ok(Arc::new(Self {
            config,
            environment: environment.to_string(),
        }))
    }

    /// Get the loaded configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Environment the configuration was resolved for
    pub fn environment(&self) -> &str {
        &self.environment
    }

    /// Get current environment from environment variables
    fn detect_environment() -> String {
        std::env::var("GAMESDK_ENV")
            .or_else(|_| std::env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_toml_configuration() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        write!(
            file,
            r#"
name = "demo"

[[plugins]]
name = "analytics"
app_key = "k-123"

[[plugins]]
name = "legacy"
disabled = true

[[services.auth]]
id = "1.0.0"
url = "https://auth.example.com"
max = true
"#
        )
        .unwrap();

        let manager = ConfigManager::load_with_env(file.path(), "test").unwrap();
        let config = manager.config();
        assert_eq!(config.name, "demo");
        assert_eq!(config.plugins.len(), 2);
        assert_eq!(config.enabled_plugins().count(), 1);
        assert!(config.services["auth"][0].max);
        assert_eq!(manager.environment(), "test");
    }

    #[test]
    fn missing_file_is_a_configuration_error() {
        let result = ConfigManager::load_with_env("/nonexistent/app.toml", "test");
        assert!(matches!(result, Err(CoreError::Configuration(_))));
    }
}
