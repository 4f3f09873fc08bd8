//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/deptree/deptree.toml`
//! 3. Local config: `<dir>/.deptree.toml` (working directory unless given)
//! 4. Environment variables: `DEPTREE_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;

/// Raw settings for intermediate parsing (Option detects "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub data_file: Option<PathBuf>,
    pub company_id: Option<String>,
    pub include_inactive: Option<bool>,
    pub sort_children: Option<bool>,
}

/// Unified configuration for deptree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Department snapshot file (default: ~/.deptree/departments.json)
    pub data_file: PathBuf,
    /// Company whose departments are loaded; all records when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_id: Option<String>,
    /// Show inactive departments by default
    pub include_inactive: bool,
    /// Sort children by name instead of keeping store order
    pub sort_children: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
            company_id: None,
            include_inactive: false,
            sort_children: false,
        }
    }
}

/// Get the default snapshot location (~/.deptree/departments.json).
fn default_data_file() -> PathBuf {
    directories::BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(".deptree"))
        .unwrap_or_else(|| PathBuf::from("~/.deptree"))
        .join("departments.json")
}

/// Get the XDG config directory for deptree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "deptree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("deptree.toml"))
}

/// Get the path to the local config file in a directory.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(".deptree.toml")
}

/// Expand environment variables and `~` in a path string.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Expand shell variables and tilde in path-like fields.
    fn expand_paths(&mut self) {
        let expanded = expand_env_vars(self.data_file.to_string_lossy().as_ref());
        self.data_file = PathBuf::from(expanded);
    }

    /// Overlay wins where it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            data_file: overlay
                .data_file
                .clone()
                .unwrap_or_else(|| self.data_file.clone()),
            company_id: overlay
                .company_id
                .clone()
                .or_else(|| self.company_id.clone()),
            include_inactive: overlay.include_inactive.unwrap_or(self.include_inactive),
            sort_children: overlay.sort_children.unwrap_or(self.sort_children),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_dir` - Directory searched for `.deptree.toml` (cwd when None)
    pub fn load(local_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 3. Local config
        let local_dir = match local_dir {
            Some(dir) => Some(dir.to_path_buf()),
            None => std::env::current_dir().ok(),
        };
        if let Some(dir) = local_dir {
            let local_path = local_config_path(&dir);
            if local_path.exists() {
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 4. Environment variables (explicit override)
        current = Self::apply_env_overrides(current)?;

        current.expand_paths();

        Ok(current)
    }

    /// Apply DEPTREE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let builder = Config::builder().add_source(
            Environment::with_prefix("DEPTREE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().map_err(config_err)?;

        if let Ok(val) = config.get_string("data_file") {
            settings.data_file = PathBuf::from(val);
        }
        if let Ok(val) = config.get_string("company_id") {
            settings.company_id = Some(val);
        }
        if let Ok(val) = config.get_bool("include_inactive") {
            settings.include_inactive = val;
        }
        if let Ok(val) = config.get_bool("sort_children") {
            settings.sort_children = val;
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# deptree configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/deptree/deptree.toml
#   Local:  ./.deptree.toml
#   Env:    DEPTREE_* environment variables

# Department snapshot file (JSON array of department records)
# data_file = "~/.deptree/departments.json"

# Only load departments of this company
# company_id = "acme"

# Show inactive departments in tree, list and stats
# include_inactive = false

# Sort children by name (default keeps store order)
# sort_children = false
"#
        .to_string()
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
    fn given_default_settings_then_snapshot_under_home() {
        let settings = Settings::default();
        assert!(settings
            .data_file
            .to_string_lossy()
            .ends_with("departments.json"));
        assert!(!settings.include_inactive);
        assert!(!settings.sort_children);
    }

    #[test]
    fn given_tilde_in_data_file_when_expand_paths_then_expands_to_home() {
        let mut settings = Settings {
            data_file: PathBuf::from("~/org/departments.json"),
            ..Settings::default()
        };

        settings.expand_paths();

        let home = std::env::var("HOME").expect("HOME should be set");
        let path = settings.data_file.to_string_lossy();
        assert!(path.starts_with(&home), "should start with home: {}", path);
        assert!(!path.contains('~'));
    }

    #[test]
    fn given_partial_overlay_when_merging_then_unset_fields_kept() {
        let base = Settings {
            data_file: PathBuf::from("/tmp/a.json"),
            company_id: Some("acme".into()),
            include_inactive: true,
            sort_children: false,
        };
        let overlay = RawSettings {
            sort_children: Some(true),
            ..RawSettings::default()
        };

        let merged = base.merge_with(&overlay);

        assert_eq!(merged.data_file, PathBuf::from("/tmp/a.json"));
        assert_eq!(merged.company_id.as_deref(), Some("acme"));
        assert!(merged.include_inactive);
        assert!(merged.sort_children);
    }

    #[test]
    fn given_settings_when_rendering_toml_then_contains_fields() {
        let toml = Settings::default().to_toml().expect("serialize");
        assert!(toml.contains("data_file"));
        assert!(toml.contains("include_inactive"));
    }

    #[test]
    fn given_template_then_parses_as_empty_raw_settings() {
        let raw: RawSettings = toml::from_str(&Settings::template()).expect("template parses");
        assert!(raw.data_file.is_none());
    }
}
