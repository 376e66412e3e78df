//! Lightweight configuration loader and path helpers.
//!
//! Uses Figment to merge `config.toml` + `config.<env>.toml` + `APP_*` env vars.
//! Storage settings live under the `testing` group and are only looked up when
//! a store touches its backing file.
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Group key holding the testing engine's settings.
pub const TESTING_KEY: &str = "testing";
/// Path of the JSON storage file.
pub const STORAGE_KEY: &str = "testing.storage";
const MAX_DISTANCE_KEY: &str = "testing.max_distance";
const STOP_ON_EXACT_KEY: &str = "testing.stop_on_exact";

/// Records further than this many edits from the query on every field are
/// not hits.
pub const DEFAULT_MAX_DISTANCE: usize = 10;

/// Acceptance policy of the match engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchOptions {
    pub max_distance: usize,
    /// Stop comparing a record's fields once one matches exactly.
    pub stop_on_exact: bool,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self { max_distance: DEFAULT_MAX_DISTANCE, stop_on_exact: true }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    figment: Figment,
}

impl Default for Config {
    fn default() -> Self {
        Self { figment: Figment::new() }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::new().merge(Toml::file("config.toml"));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        Ok(Self { figment })
    }

    pub fn from_figment(figment: Figment) -> Self {
        Self { figment }
    }

    /// Layer another provider over this configuration.
    #[must_use]
    pub fn merge<P: figment::Provider>(self, provider: P) -> Self {
        Self { figment: self.figment.merge(provider) }
    }

    /// Point `testing.storage` at `path`, overriding any loaded value.
    #[must_use]
    pub fn with_storage(self, path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_string_lossy().into_owned();
        self.merge(Serialized::default(STORAGE_KEY, path))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.figment.find_value(key).is_ok()
    }

    pub fn get<T>(&self, key: &str) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        if !self.contains(key) {
            return Err(Error::ConfigurationMissing(key.to_string()));
        }
        self.figment
            .extract_inner(key)
            .map_err(|e| Error::InvalidConfig(format!("failed to get '{key}': {e}")))
    }

    /// Resolve `testing.storage`, expanding `~` and environment variables.
    pub fn storage_path(&self) -> Result<PathBuf> {
        if !self.contains(TESTING_KEY) {
            return Err(Error::ConfigurationMissing(TESTING_KEY.to_string()));
        }
        let raw: String = self.get(STORAGE_KEY)?;
        Ok(expand_path(raw))
    }

    /// Match policy overrides under `testing`, falling back to the defaults.
    pub fn match_options(&self) -> Result<MatchOptions> {
        let mut options = MatchOptions::default();
        if self.contains(MAX_DISTANCE_KEY) {
            options.max_distance = self.get(MAX_DISTANCE_KEY)?;
        }
        if self.contains(STOP_ON_EXACT_KEY) {
            options.stop_on_exact = self.get(STOP_ON_EXACT_KEY)?;
        }
        Ok(options)
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}
