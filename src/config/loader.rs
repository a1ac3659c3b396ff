//! Configuration Loader
//!
//! Environment-aware configuration loading. Layers defaults, the base file,
//! the environment file and environment variables with the `config` crate,
//! then validates the merged result.

use super::error::{ConfigResult, ConfigurationError};
use super::LoaderConfig;
use crate::constants::{CONFIG_FILE_STEM, ENV_PREFIX};
use config::{Config, Environment, File};
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Loaded, validated configuration plus where it came from
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config: LoaderConfig,
    environment: String,
    config_directory: PathBuf,
}

impl ConfigManager {
    /// Load configuration with environment auto-detection
    pub fn load() -> ConfigResult<Arc<ConfigManager>> {
        Self::load_from_directory(None)
    }

    /// Load configuration from a specific directory
    pub fn load_from_directory(config_dir: Option<PathBuf>) -> ConfigResult<Arc<ConfigManager>> {
        let environment = Self::detect_environment();
        Self::load_from_directory_with_env(config_dir, &environment)
    }

    /// Load configuration from a specific directory with explicit environment
    pub fn load_from_directory_with_env(
        config_dir: Option<PathBuf>,
        environment: &str,
    ) -> ConfigResult<Arc<ConfigManager>> {
        Self::load_with_environment_source(config_dir, environment, Self::environment_source())
    }

    /// Load with a caller-built variable source in place of the process
    /// environment
    ///
    /// Lets tests exercise overrides without touching global state.
    pub fn load_with_environment_source(
        config_dir: Option<PathBuf>,
        environment: &str,
        variables: Environment,
    ) -> ConfigResult<Arc<ConfigManager>> {
        let config_directory = config_dir.unwrap_or_else(Self::default_config_directory);

        debug!(
            "Loading configuration for environment '{}' from directory: {}",
            environment,
            config_directory.display()
        );

        let config = Self::load_and_merge_config(&config_directory, environment, variables)?;
        config.validate()?;

        info!(
            environment = %environment,
            subquery_alias = %config.subquery_alias,
            max_page_size = ?config.max_page_size,
            tie_break_column = ?config.tie_break_column,
            "Configuration loaded successfully"
        );

        Ok(Arc::new(ConfigManager {
            config,
            environment: environment.to_string(),
            config_directory,
        }))
    }

    /// Get the loaded configuration
    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn config_directory(&self) -> &Path {
        &self.config_directory
    }

    /// Detect current environment from environment variables:
    /// `FANCY_LOADER_ENV || APP_ENV || RUST_ENV || "development"`
    pub fn detect_environment() -> String {
        env::var("FANCY_LOADER_ENV")
            .or_else(|_| env::var("APP_ENV"))
            .or_else(|_| env::var("RUST_ENV"))
            .unwrap_or_else(|_| "development".to_string())
            .to_lowercase()
    }

    /// `FANCY_LOADER__SUBQUERY_ALIAS`, `FANCY_LOADER__LOGGING__JSON`, ...
    pub fn environment_source() -> Environment {
        Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .try_parsing(true)
    }

    /// `$FANCY_LOADER_CONFIG_DIR`, falling back to `./config`
    fn default_config_directory() -> PathBuf {
        env::var("FANCY_LOADER_CONFIG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config"))
    }

    fn load_and_merge_config(
        config_directory: &Path,
        environment: &str,
        variables: Environment,
    ) -> ConfigResult<LoaderConfig> {
        let load_error = |e| ConfigurationError::load(config_directory.display().to_string(), e);

        let defaults = Config::try_from(&LoaderConfig::default()).map_err(load_error)?;
        let base_file = config_directory.join(CONFIG_FILE_STEM);
        let env_file = config_directory.join(format!("{CONFIG_FILE_STEM}-{environment}"));

        Config::builder()
            .add_source(defaults)
            .add_source(File::with_name(&base_file.to_string_lossy()).required(false))
            .add_source(File::with_name(&env_file.to_string_lossy()).required(false))
            .add_source(variables)
            .build()
            .and_then(|merged| merged.try_deserialize::<LoaderConfig>())
            .map_err(load_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn no_variables() -> Environment {
        ConfigManager::environment_source().source(Some(Default::default()))
    }

    #[test]
    fn test_missing_files_fall_back_to_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let manager = ConfigManager::load_with_environment_source(
            Some(temp_dir.path().to_path_buf()),
            "test",
            no_variables(),
        )
        .unwrap();

        assert_eq!(manager.config(), &LoaderConfig::default());
        assert_eq!(manager.environment(), "test");
        assert_eq!(manager.config_directory(), temp_dir.path());
    }

    #[test]
    fn test_environment_file_overrides_base_file() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join("fancy-loader.toml"),
            "max_page_size = 100\nrank_suffix = \"_position\"\n",
        )
        .unwrap();
        fs::write(
            temp_dir.path().join("fancy-loader-production.toml"),
            "max_page_size = 25\n",
        )
        .unwrap();

        let dir = Some(temp_dir.path().to_path_buf());
        let production =
            ConfigManager::load_with_environment_source(dir.clone(), "production", no_variables())
                .unwrap();
        assert_eq!(production.config().max_page_size, Some(25));
        assert_eq!(production.config().rank_suffix, "_position");

        let development =
            ConfigManager::load_with_environment_source(dir, "development", no_variables())
                .unwrap();
        assert_eq!(development.config().max_page_size, Some(100));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join("fancy-loader.toml"),
            "subquery_alias = \"not an alias\"\n",
        )
        .unwrap();

        let result = ConfigManager::load_with_environment_source(
            Some(temp_dir.path().to_path_buf()),
            "test",
            no_variables(),
        );
        assert!(matches!(
            result,
            Err(ConfigurationError::InvalidValue { ref field, .. }) if field == "subquery_alias"
        ));
    }

    #[test]
    fn test_unparseable_file_is_a_load_error() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("fancy-loader.toml"), "max_page_size = [").unwrap();

        let result = ConfigManager::load_with_environment_source(
            Some(temp_dir.path().to_path_buf()),
            "test",
            no_variables(),
        );
        assert!(matches!(result, Err(ConfigurationError::Load { .. })));
    }
}
