//! # Studio Configuration
//!
//! Identifies the content project the studio works on. Values come from an
//! optional YAML file and are overridden by environment variables:
//!
//! | Key          | Variable            | Required |
//! |--------------|---------------------|----------|
//! | `projectId`  | `STUDIO_PROJECT_ID` | yes      |
//! | `dataset`    | `STUDIO_DATASET`    | yes      |
//! | `studioHost` | `STUDIO_HOST`       | yes      |
//! | `title`      | `STUDIO_TITLE`      | no       |
//!
//! A missing required key aborts startup.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Errors raised while loading the studio configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("cannot read config file '{path}': {source}")]
    Io {
        /// The file that failed.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid YAML of the expected shape.
    #[error("cannot parse config file '{path}': {reason}")]
    Parse {
        /// The offending file.
        path: PathBuf,
        /// What the parser reported.
        reason: String,
    },

    /// A required key is set neither in the file nor in the environment.
    #[error("`{key}` is required (set it in the config file or via {env})")]
    Missing {
        /// The config file key.
        key: &'static str,
        /// The overriding environment variable.
        env: &'static str,
    },
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct ConfigFile {
    project_id: Option<String>,
    dataset: Option<String>,
    studio_host: Option<String>,
    title: Option<String>,
}

/// The studio's project coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudioConfig {
    /// Content project identifier.
    pub project_id: String,
    /// Dataset within the project, e.g. `production`.
    pub dataset: String,
    /// Host name the studio is deployed under.
    pub studio_host: String,
    /// Display title; the studio host is shown when unset.
    pub title: Option<String>,
}

impl StudioConfig {
    /// Load from `file` (if any) and the process environment.
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with(file, |var| std::env::var(var).ok())
    }

    /// Load from `file` (if any), with environment values from `lookup`.
    pub fn load_with(
        file: Option<&Path>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let from_file = match file {
            Some(path) => read_file(path)?,
            None => ConfigFile::default(),
        };

        let pick = |file_value: Option<String>, env: &str| {
            lookup(env)
                .filter(|v| !v.trim().is_empty())
                .or(file_value)
                .filter(|v| !v.trim().is_empty())
        };
        let require = |value: Option<String>, key: &'static str, env: &'static str| {
            value.ok_or(ConfigError::Missing { key, env })
        };

        Ok(Self {
            project_id: require(
                pick(from_file.project_id, "STUDIO_PROJECT_ID"),
                "projectId",
                "STUDIO_PROJECT_ID",
            )?,
            dataset: require(
                pick(from_file.dataset, "STUDIO_DATASET"),
                "dataset",
                "STUDIO_DATASET",
            )?,
            studio_host: require(
                pick(from_file.studio_host, "STUDIO_HOST"),
                "studioHost",
                "STUDIO_HOST",
            )?,
            title: pick(from_file.title, "STUDIO_TITLE"),
        })
    }

    /// The title shown to users.
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.studio_host)
    }
}

fn read_file(path: &Path) -> Result<ConfigFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}
