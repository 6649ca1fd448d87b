//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/rsalloc/rsalloc.toml`
//! 3. Local config: `<dir>/.rsalloc.toml` (usually the working directory)
//! 4. Environment variables: `RSALLOC_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;

/// Unified configuration for rsalloc.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Allocation document used when no `--file` is given
    pub default_file: PathBuf,
    /// Decimal places for values and variance in table output
    pub precision: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_file: PathBuf::from("allocation.toml"),
            precision: 2,
        }
    }
}

/// Get the XDG config directory for rsalloc.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "rsalloc").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("rsalloc.toml"))
}

/// Get the path to the local config file in a directory.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(".rsalloc.toml")
}

impl Settings {
    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_dir` - Optional directory to check for a `.rsalloc.toml`
    ///
    /// # Precedence (lowest to highest)
    /// 1. Compiled defaults
    /// 2. Global config: `$XDG_CONFIG_HOME/rsalloc/rsalloc.toml`
    /// 3. Local config: `<local_dir>/.rsalloc.toml`
    /// 4. Environment variables: `RSALLOC_*` prefix
    pub fn load(local_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let defaults = Settings::default();

        let mut builder = Config::builder()
            .set_default(
                "default_file",
                defaults.default_file.to_string_lossy().to_string(),
            )
            .map_err(config_err)?
            .set_default("precision", defaults.precision as i64)
            .map_err(config_err)?;

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                builder = builder.add_source(File::from(global_path).required(false));
            }
        }

        if let Some(dir) = local_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                builder = builder.add_source(File::from(local_path).required(true));
            }
        }

        builder = builder.add_source(Environment::with_prefix("RSALLOC"));

        let config = builder.build().map_err(config_err)?;
        let mut settings: Self = config.try_deserialize().map_err(config_err)?;

        // Expand ~ and $VAR in the document path
        settings.expand_paths();

        Ok(settings)
    }

    /// Expand shell variables and tilde in path-like fields.
    ///
    /// Handles `~`, `$VAR`, and `${VAR}` syntax.
    fn expand_paths(&mut self) {
        let raw = self.default_file.to_string_lossy();
        let expanded = shellexpand::full(raw.as_ref())
            .map(|s| s.into_owned())
            .unwrap_or_else(|_| raw.to_string());
        self.default_file = PathBuf::from(expanded);
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_no_config_when_loading_then_uses_defaults() {
        let settings = Settings::load(None).expect("load defaults");
        assert_eq!(settings.precision, 2);
        assert!(settings
            .default_file
            .to_string_lossy()
            .contains("allocation.toml"));
    }

    #[test]
    fn given_tilde_in_default_file_when_expand_paths_then_expands_to_home() {
        let mut settings = Settings {
            default_file: PathBuf::from("~/budgets/allocation.toml"),
            precision: 2,
        };

        settings.expand_paths();

        let home = std::env::var("HOME").expect("HOME should be set");
        let path = settings.default_file.to_string_lossy();
        assert!(
            path.starts_with(&home),
            "default_file should start with home dir: {}",
            path
        );
        assert!(!path.contains('~'), "default_file should not contain tilde");
    }

    #[test]
    fn given_env_var_in_path_when_expand_paths_then_expands_variable() {
        let mut settings = Settings {
            default_file: PathBuf::from("$HOME/allocation.toml"),
            precision: 2,
        };

        settings.expand_paths();

        let home = std::env::var("HOME").expect("HOME should be set");
        assert!(
            settings.default_file.to_string_lossy().starts_with(&home),
            "default_file should expand $HOME"
        );
    }
}
