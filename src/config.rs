//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/famtree/famtree.toml`
//! 3. Local config: file given with `--config`
//! 4. Environment variables: `FAMTREE_*` prefix (`FAMTREE_SEED__NAME` for nested keys)

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{parse_date, ConnectorStyle, Level, RelationshipModel};

/// Default seed birth date.
const DEFAULT_SEED_BIRTH_DATE: (i32, u32, u32) = (1990, 1, 1);

/// Default seed row in the free-generation model.
const DEFAULT_SEED_GENERATION: Level = 4;

/// The member every tree starts with.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SeedConfig {
    pub name: String,
    pub birth_date: NaiveDate,
    /// Row of the seed in the free-generation model; ignored by the relation models.
    pub generation: Level,
}

impl Default for SeedConfig {
    fn default() -> Self {
        let (y, m, d) = DEFAULT_SEED_BIRTH_DATE;
        Self {
            name: "You".into(),
            birth_date: NaiveDate::from_ymd_opt(y, m, d).unwrap_or(NaiveDate::MIN),
            generation: DEFAULT_SEED_GENERATION,
        }
    }
}

/// Raw seed config for intermediate parsing (`None` → not specified, inherit).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSeedConfig {
    pub name: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub generation: Option<Level>,
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub model: Option<RelationshipModel>,
    pub connector_style: Option<ConnectorStyle>,
    pub seed: RawSeedConfig,
}

/// Unified configuration for famtree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Settings {
    /// Relationship model new trees are created with
    pub model: RelationshipModel,
    /// Connector rendering policy
    pub connector_style: ConnectorStyle,
    /// Seed member
    pub seed: SeedConfig,
}

/// Get the XDG config directory for famtree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "famtree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("famtree.toml"))
}

/// Expand `~`, `$VAR` and `${VAR}` in a user-supplied path.
pub fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    shellexpand::full(raw.as_ref())
        .map(|s| PathBuf::from(s.into_owned()))
        .unwrap_or_else(|_| path.to_path_buf())
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> ApplicationResult<RawSettings> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

impl Settings {
    /// Overlay wins where it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            model: overlay.model.unwrap_or(self.model),
            connector_style: overlay.connector_style.unwrap_or(self.connector_style),
            seed: SeedConfig {
                name: overlay
                    .seed
                    .name
                    .clone()
                    .unwrap_or_else(|| self.seed.name.clone()),
                birth_date: overlay.seed.birth_date.unwrap_or(self.seed.birth_date),
                generation: overlay.seed.generation.unwrap_or(self.seed.generation),
            },
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local` - Optional explicit config file (must exist when given)
    pub fn load(local: Option<&Path>) -> ApplicationResult<Self> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                current = current.merge_with(&load_raw_settings(&global_path)?);
            }
        }

        if let Some(local) = local {
            let local = expand_path(local);
            current = current.merge_with(&load_raw_settings(&local)?);
        }

        current = Self::apply_env_overrides(current)?;
        current.validate()?;
        Ok(current)
    }

    /// Defaults plus one file, nothing else.
    pub fn load_from_file(path: &Path) -> ApplicationResult<Self> {
        let settings = Self::default().merge_with(&load_raw_settings(path)?);
        settings.validate()?;
        Ok(settings)
    }

    /// Apply FAMTREE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> ApplicationResult<Self> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("FAMTREE")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("model") {
            settings.model = val.parse().map_err(|e| ApplicationError::Config {
                message: format!("FAMTREE_MODEL: {}", e),
            })?;
        }
        if let Ok(val) = config.get_string("connector_style") {
            settings.connector_style = val.parse().map_err(|e| ApplicationError::Config {
                message: format!("FAMTREE_CONNECTOR_STYLE: {}", e),
            })?;
        }
        if let Ok(val) = config.get_string("seed.name") {
            settings.seed.name = val;
        }
        if let Ok(val) = config.get_string("seed.birth_date") {
            settings.seed.birth_date =
                parse_date("birth date", val.trim()).map_err(|e| ApplicationError::Config {
                    message: format!("FAMTREE_SEED__BIRTH_DATE: {}", e),
                })?;
        }
        if let Ok(val) = config.get_string("seed.generation") {
            settings.seed.generation =
                val.trim().parse().map_err(|_| ApplicationError::Config {
                    message: format!("FAMTREE_SEED__GENERATION: not a generation: {}", val),
                })?;
        }

        Ok(settings)
    }

    /// Reject settings no tree can be created from.
    pub fn validate(&self) -> ApplicationResult<()> {
        if self.seed.name.trim().is_empty() {
            return Err(ApplicationError::Config {
                message: "seed.name must not be empty".into(),
            });
        }
        let count = RelationshipModel::FreeGeneration.policy().level_count;
        if self.seed.generation >= count {
            return Err(ApplicationError::Config {
                message: format!(
                    "seed.generation {} is out of range (0..{})",
                    self.seed.generation, count
                ),
            });
        }
        Ok(())
    }

    /// Render as TOML for `config show`.
    pub fn to_toml(&self) -> ApplicationResult<String> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize settings: {}", e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_partial_overlay_when_merging_then_unspecified_fields_are_kept() {
        let overlay: RawSettings = toml::from_str(
            r#"
model = "free-generation"
[seed]
generation = 2
"#,
        )
        .unwrap();

        let merged = Settings::default().merge_with(&overlay);

        assert_eq!(merged.model, RelationshipModel::FreeGeneration);
        assert_eq!(merged.connector_style, ConnectorStyle::Elbow);
        assert_eq!(merged.seed.name, "You");
        assert_eq!(merged.seed.generation, 2);
    }

    #[test]
    fn given_out_of_range_seed_generation_when_validating_then_rejects() {
        let mut settings = Settings::default();
        settings.seed.generation = 8;
        assert!(matches!(
            settings.validate(),
            Err(ApplicationError::Config { .. })
        ));
    }
}
