//! Configuration file loader for gateway-publisher
//!
//! This module provides configuration loading, validation, and merging capabilities.

use super::config::*;
use crate::core::error::GatewayError;
use regex::Regex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Configuration file name
pub const CONFIG_FILENAME: &str = ".gw-publish.yaml";

/// Environment variable pattern (${VAR_NAME})
const ENV_VAR_PATTERN: &str = r"\$\{([A-Z_][A-Z0-9_]*)\}";

/// Configuration load options
#[derive(Debug, Clone, Default)]
pub struct ConfigLoadOptions {
    /// Project path to look for a config file in
    pub project_path: PathBuf,

    /// Explicit config file; replaces the project config and must exist
    pub config_path: Option<PathBuf>,

    /// CLI arguments (highest priority)
    pub cli_args: Option<GatewayConfig>,

    /// Environment variables
    pub env: HashMap<String, String>,
}

/// Configuration validation result
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigValidationResult {
    /// Is configuration valid?
    pub valid: bool,

    /// Validation errors
    pub errors: Vec<ConfigValidationError>,

    /// Validation warnings
    pub warnings: Vec<ConfigValidationWarning>,
}

/// Configuration validation error
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigValidationError {
    /// Field name (e.g., "batchSize")
    pub field: String,

    /// Error message
    pub message: String,

    /// Expected type/value
    pub expected: Option<String>,

    /// Actual type/value
    pub actual: Option<String>,
}

/// Configuration validation warning
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigValidationWarning {
    /// Field name
    pub field: String,

    /// Warning message
    pub message: String,

    /// Suggestion
    pub suggestion: Option<String>,
}

/// Configuration file loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from multiple sources with priority
    ///
    /// Priority (high to low):
    /// 1. CLI arguments
    /// 2. Environment variables (GW_*)
    /// 3. Explicit config file, or project config (./.gw-publish.yaml)
    /// 4. Global config (~/.gw-publish.yaml)
    /// 5. Default values
    pub async fn load(options: ConfigLoadOptions) -> Result<GatewayConfig, GatewayError> {
        let mut configs: Vec<GatewayConfig> = Vec::new();

        // 5. Default values (lowest priority)
        configs.push(GatewayConfig::default());

        // 4. Global config
        if let Some(global_config) = Self::load_global_config(&options.env).await? {
            configs.push(global_config);
        }

        // 3. Explicit or project config
        match &options.config_path {
            Some(path) => match Self::load_config_file(path).await? {
                Some(config) => configs.push(config),
                None => {
                    return Err(GatewayError::Config(format!(
                        "config file not found: {}",
                        path.display()
                    )));
                }
            },
            None => {
                if let Some(project_config) =
                    Self::load_project_config(&options.project_path).await?
                {
                    configs.push(project_config);
                }
            }
        }

        // 2. Environment variables
        if let Some(env_config) = Self::load_env_config(&options.env)? {
            configs.push(env_config);
        }

        // 1. CLI arguments (highest priority)
        if let Some(cli_config) = options.cli_args {
            configs.push(cli_config);
        }

        let merged_config = Self::merge_configs(configs);

        Ok(Self::expand_env_vars(merged_config, &options.env))
    }

    /// Load global configuration from ~/.gw-publish.yaml
    ///
    /// `HOME` is looked up in the supplied environment, not the process one.
    async fn load_global_config(
        env: &HashMap<String, String>,
    ) -> Result<Option<GatewayConfig>, GatewayError> {
        let Some(home_dir) = env.get("HOME").filter(|home| !home.is_empty()) else {
            return Ok(None);
        };
        let global_config_path = PathBuf::from(home_dir).join(CONFIG_FILENAME);

        Self::load_config_file(&global_config_path).await
    }

    /// Load project configuration from ./.gw-publish.yaml
    async fn load_project_config(
        project_path: &Path,
    ) -> Result<Option<GatewayConfig>, GatewayError> {
        let project_config_path = project_path.join(CONFIG_FILENAME);

        Self::load_config_file(&project_config_path).await
    }

    /// Load configuration from YAML file
    async fn load_config_file(file_path: &Path) -> Result<Option<GatewayConfig>, GatewayError> {
        if !file_path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(file_path).await.map_err(|e| {
            GatewayError::Config(format!(
                "failed to read {}: {}",
                file_path.display(),
                e
            ))
        })?;

        let config: GatewayConfig = serde_yaml::from_str(&content).map_err(|e| {
            GatewayError::Config(format!(
                "failed to parse {}: {}",
                file_path.display(),
                e
            ))
        })?;

        tracing::debug!(path = %file_path.display(), "Loaded config file");

        Ok(Some(config))
    }

    /// Load configuration from GW_* environment variables
    fn load_env_config(
        env: &HashMap<String, String>,
    ) -> Result<Option<GatewayConfig>, GatewayError> {
        let mut config = GatewayConfig::empty();
        let mut has_changes = false;

        if let Some(url) = env.get("GW_URL") {
            config.url = Some(url.clone());
            has_changes = true;
        }

        if let Some(gw_env) = env.get("GW_ENV") {
            config.env = Some(gw_env.clone());
            has_changes = true;
        }

        if let Some(batch_size) = env.get("GW_BATCH_SIZE") {
            config.batch_size = Some(Self::parse_env("GW_BATCH_SIZE", batch_size)?);
            has_changes = true;
        }

        if let Some(poll_interval) = env.get("GW_POLL_INTERVAL") {
            config.poll_interval = Some(Self::parse_env("GW_POLL_INTERVAL", poll_interval)?);
            has_changes = true;
        }

        if let Some(timeout) = env.get("GW_TIMEOUT") {
            config.timeout = Some(Self::parse_env("GW_TIMEOUT", timeout)?);
            has_changes = true;
        }

        if let Some(dry_run) = env.get("GW_DRY_RUN") {
            config.dry_run = Some(matches!(dry_run.as_str(), "1" | "true" | "yes"));
            has_changes = true;
        }

        if let Some(token_env) = env.get("GW_TOKEN_ENV") {
            config.token_env = Some(token_env.clone());
            has_changes = true;
        }

        Ok(if has_changes { Some(config) } else { None })
    }

    fn parse_env<T: std::str::FromStr>(name: &str, value: &str) -> Result<T, GatewayError> {
        value.trim().parse().map_err(|_| {
            GatewayError::Config(format!("{} must be a non-negative integer, got {:?}", name, value))
        })
    }

    /// Merge multiple configurations with priority
    fn merge_configs(configs: Vec<GatewayConfig>) -> GatewayConfig {
        let mut result = GatewayConfig::default();

        for config in configs {
            Self::merge_into(&mut result, config);
        }

        result
    }

    /// Merge source config into target
    fn merge_into(target: &mut GatewayConfig, source: GatewayConfig) {
        if source.url.is_some() {
            target.url = source.url;
        }
        if source.env.is_some() {
            target.env = source.env;
        }
        if source.batch_size.is_some() {
            target.batch_size = source.batch_size;
        }
        if source.poll_interval.is_some() {
            target.poll_interval = source.poll_interval;
        }
        if source.timeout.is_some() {
            target.timeout = source.timeout;
        }
        if source.dry_run.is_some() {
            target.dry_run = source.dry_run;
        }
        if source.token_env.is_some() {
            target.token_env = source.token_env;
        }
    }

    /// Expand ${VAR} references in string fields
    fn expand_env_vars(mut config: GatewayConfig, env: &HashMap<String, String>) -> GatewayConfig {
        config.url = config.url.map(|url| Self::expand_string(&url, env));
        config.env = config.env.map(|gw_env| Self::expand_string(&gw_env, env));
        config
    }

    /// Expand environment variables in a single string
    ///
    /// Unknown variables are left in place.
    fn expand_string(input: &str, env: &HashMap<String, String>) -> String {
        let Ok(env_var_regex) = Regex::new(ENV_VAR_PATTERN) else {
            return input.to_string();
        };

        env_var_regex
            .replace_all(input, |cap: &regex::Captures| match env.get(&cap[1]) {
                Some(value) => value.clone(),
                None => {
                    tracing::warn!(variable = &cap[1], "Environment variable not found");
                    cap[0].to_string()
                }
            })
            .into_owned()
    }

    /// Validate configuration
    pub fn validate(config: &GatewayConfig) -> ConfigValidationResult {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        // 1. Gateway URL (required unless dry-run)
        if config.url().is_empty() {
            if !config.dry_run() {
                errors.push(ConfigValidationError {
                    field: "url".to_string(),
                    message: "Gateway URL is required".to_string(),
                    expected: Some("URL (e.g., \"https://gw.example.com\")".to_string()),
                    actual: Some("empty".to_string()),
                });
            }
        } else if !config.url().starts_with("https://") {
            if config.url().starts_with("http://") {
                warnings.push(ConfigValidationWarning {
                    field: "url".to_string(),
                    message: "Gateway URL is not using HTTPS".to_string(),
                    suggestion: Some("Use an https:// URL outside of local testing".to_string()),
                });
            } else {
                errors.push(ConfigValidationError {
                    field: "url".to_string(),
                    message: "Gateway URL must be absolute".to_string(),
                    expected: Some("http:// or https:// URL".to_string()),
                    actual: Some(config.url().to_string()),
                });
            }
        }

        // 2. Environment (required)
        if config.env().is_empty() {
            errors.push(ConfigValidationError {
                field: "env".to_string(),
                message: "Gateway environment is required".to_string(),
                expected: Some("string (e.g., \"live\")".to_string()),
                actual: Some("empty".to_string()),
            });
        } else if config.env().contains('/') {
            errors.push(ConfigValidationError {
                field: "env".to_string(),
                message: "Gateway environment must not contain '/'".to_string(),
                expected: Some("single path segment".to_string()),
                actual: Some(config.env().to_string()),
            });
        }

        // 3. Batch size
        if config.batch_size() == 0 {
            errors.push(ConfigValidationError {
                field: "batchSize".to_string(),
                message: "Batch size must be greater than zero".to_string(),
                expected: Some("positive integer".to_string()),
                actual: Some("0".to_string()),
            });
        }

        // 4. Timeouts
        if config.timeout().is_zero() {
            errors.push(ConfigValidationError {
                field: "timeout".to_string(),
                message: "HTTP timeout must be greater than zero".to_string(),
                expected: Some("positive integer (seconds)".to_string()),
                actual: Some("0".to_string()),
            });
        }

        if config.poll_interval().is_zero() {
            warnings.push(ConfigValidationWarning {
                field: "pollInterval".to_string(),
                message: "Task polling will not pause between requests".to_string(),
                suggestion: Some("Set pollInterval to at least 1000".to_string()),
            });
        }

        ConfigValidationResult {
            valid: errors.is_empty(),
            errors,
            warnings,
        }
    }

    /// Format validation result as human-readable string
    pub fn format_validation_result(result: &ConfigValidationResult) -> String {
        let mut lines = Vec::new();

        if result.valid {
            lines.push("✅ Configuration validation succeeded".to_string());
        } else {
            lines.push("❌ Configuration has errors".to_string());
        }

        if !result.errors.is_empty() {
            lines.push("\n🔴 Errors:".to_string());
            for error in &result.errors {
                lines.push(format!("  - [{}] {}", error.field, error.message));
                if let (Some(expected), Some(actual)) = (&error.expected, &error.actual) {
                    lines.push(format!("    Expected: {}", expected));
                    lines.push(format!("    Actual: {}", actual));
                }
            }
        }

        if !result.warnings.is_empty() {
            lines.push("\n🟡 Warnings:".to_string());
            for warning in &result.warnings {
                lines.push(format!("  - [{}] {}", warning.field, warning.message));
                if let Some(suggestion) = &warning.suggestion {
                    lines.push(format!("    Suggestion: {}", suggestion));
                }
            }
        }

        lines.join("\n")
    }
}
