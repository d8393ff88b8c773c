// Copyright (c) OpenGradient Contributors
// SPDX-License-Identifier: Apache-2.0

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::trace;

pub const OG_DIR: &str = ".opengradient";
pub const OG_CLIENT_CONFIG: &str = "client.yaml";
/// Overrides the client config location.
pub const OG_CONFIG_ENV: &str = "OG_CONFIG";
pub const OG_PRIVATE_KEY_ENV: &str = "OG_PRIVATE_KEY";

/// `$OG_CONFIG`, or `~/.opengradient/client.yaml`.
pub fn default_client_config_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var(OG_CONFIG_ENV) {
        return Ok(PathBuf::from(path));
    }
    let home = std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .context("Cannot determine home directory; set OG_CONFIG")?;
    Ok(PathBuf::from(home).join(OG_DIR).join(OG_CLIENT_CONFIG))
}

pub trait Config
where
    Self: DeserializeOwned + Serialize,
{
    fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        trace!("Reading config from {}", path.display());
        let reader = fs::File::open(path)
            .with_context(|| format!("Unable to load config from {}", path.display()))?;
        serde_yaml::from_reader(reader)
            .with_context(|| format!("Malformed config at {}", path.display()))
    }

    /// Writes YAML to `path`, creating missing parent directories.
    fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        trace!("Writing config to {}", path.display());
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Unable to create {}", parent.display()))?;
        }
        let yaml = serde_yaml::to_string(&self)?;
        fs::write(path, yaml).with_context(|| format!("Unable to save config to {}", path.display()))
    }
}

/// A config bound to the file it is written back to. Edit it through
/// `DerefMut`, then `save`.
pub struct PersistedConfig<C> {
    config: C,
    path: PathBuf,
}

impl<C: Config> PersistedConfig<C> {
    /// Loads `path`, or starts from `fallback()` while no file exists there.
    pub fn load_or(path: impl Into<PathBuf>, fallback: impl FnOnce() -> C) -> Result<Self> {
        let path = path.into();
        let config = if path.exists() {
            C::load(&path)?
        } else {
            trace!("No config at {}, starting from defaults", path.display());
            fallback()
        };
        Ok(Self { config, path })
    }

    pub fn save(&self) -> Result<()> {
        self.config.save(&self.path)
    }
}

impl<C> std::ops::Deref for PersistedConfig<C> {
    type Target = C;

    fn deref(&self) -> &Self::Target {
        &self.config
    }
}

impl<C> std::ops::DerefMut for PersistedConfig<C> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        name: String,
        retries: u32,
    }

    impl Config for Sample {}

    #[test]
    fn persisted_config_starts_from_fallback_and_saves_edits() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("sample.yaml");
        let fallback = || Sample {
            name: "local".into(),
            retries: 3,
        };

        let mut persisted = PersistedConfig::load_or(&path, fallback).unwrap();
        assert!(!path.exists());
        persisted.retries = 5;
        persisted.save().unwrap();

        let reloaded = PersistedConfig::load_or(&path, fallback).unwrap();
        assert_eq!(reloaded.retries, 5);
        assert_eq!(
            Sample::load(&path).unwrap(),
            Sample {
                name: "local".into(),
                retries: 5
            }
        );
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = Sample::load("/definitely/not/here.yaml").unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.yaml"));
    }
}
