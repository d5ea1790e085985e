//! Layered configuration for movr.
//!
//! Sources are merged in increasing order of precedence:
//!
//! 1. built-in defaults,
//! 2. `movr.toml`, `movr.yaml` or `movr.json` in the platform configuration
//!    directory,
//! 3. an explicitly supplied configuration file,
//! 4. `MOVR_*` environment variables (e.g. `MOVR_VALIDATION_THRESHOLD=0.25`).
//!
//! Command-line flags are applied on top by the binary.

pub mod error;

use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use movr_extract::models::ImageType;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::instrument;

use crate::error::{ErrorKind, Result};

const ENV_PREFIX: &str = "MOVR_";
const FILE_STEM: &str = "movr";
const DATABASE_FILE: &str = "movr.sqlite";
const FIELDS: [&str; 5] = ["destination", "batch_type", "validation_threshold", "database", "audit_report"];

/// Fraction of a batch that may have validation issues before a commit is
/// refused.
pub const DEFAULT_VALIDATION_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Base destination directory. Falls back to the most recently used one.
    pub destination: Option<PathBuf>,
    /// Image type given to newly imported files.
    pub batch_type: ImageType,
    /// Maximum fraction (exclusive) of records with issues; must be in `(0, 1]`.
    pub validation_threshold: f64,
    /// SQLite database holding the session, audit log and recent paths.
    pub database: PathBuf,
    /// Write the flat audit report here after each commit.
    pub audit_report: Option<PathBuf>,
}
impl Default for Config {
    fn default() -> Self {
        Self {
            destination: None,
            batch_type: ImageType::default(),
            validation_threshold: DEFAULT_VALIDATION_THRESHOLD,
            database: project_dirs()
                .map(|dirs| dirs.data_dir().join(DATABASE_FILE))
                .unwrap_or_else(|| PathBuf::from(DATABASE_FILE)),
            audit_report: None,
        }
    }
}
impl Config {
    /// Load configuration from every layer, optionally including an explicit
    /// file supplied by the user.
    #[instrument(level = "debug")]
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let config_dir = project_dirs().map(|dirs| dirs.config_dir().to_path_buf());
        // `only` keeps unrelated variables such as `MOVR_LOG` out of the
        // unknown-field check.
        let env = Env::prefixed(ENV_PREFIX).only(&FIELDS);
        Self::from_figment(Self::figment(config_dir.as_deref(), explicit).merge(env))
    }

    /// The file layers only: defaults, then the configuration directory, then
    /// the explicit file. An explicit file that does not exist is an error;
    /// missing files in the configuration directory are not.
    pub fn figment(config_dir: Option<&Path>, explicit: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(dir) = config_dir {
            figment = figment
                .merge(Toml::file(dir.join(format!("{FILE_STEM}.toml"))))
                .merge(Yaml::file(dir.join(format!("{FILE_STEM}.yaml"))))
                .merge(Json::file(dir.join(format!("{FILE_STEM}.json"))));
        }
        if let Some(path) = explicit {
            figment = match path.extension().and_then(|ext| ext.to_str()) {
                Some("yaml" | "yml") => figment.merge(Yaml::file_exact(path)),
                Some("json") => figment.merge(Json::file_exact(path)),
                _ => figment.merge(Toml::file_exact(path)),
            };
        }
        figment
    }

    /// Extract and validate a configuration from any figment.
    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: Config = figment.extract().or_raise(|| ErrorKind::Load)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.validation_threshold > 0.0 && self.validation_threshold <= 1.0) {
            exn::bail!(ErrorKind::Invalid(format!(
                "validation_threshold must be greater than 0 and at most 1, got {}",
                self.validation_threshold
            )));
        }
        if self.database.as_os_str().is_empty() {
            exn::bail!(ErrorKind::Invalid("database path must not be empty".to_string()));
        }
        Ok(())
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", FILE_STEM)
}
