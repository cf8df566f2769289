//! Loading plugin options from project files.

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format as _, Serialized, Toml},
};
use serde_json::Value;

use crate::error::ConfigError;
use crate::options::OxcLoaderOptions;

/// Project file holding the `[oxc]` table
pub const CONFIG_FILE_NAME: &str = "fob.toml";

/// Table inside [`CONFIG_FILE_NAME`] that holds plugin options
pub const CONFIG_SECTION: &str = "oxc";

/// Prefix for environment overrides, e.g. `FOB_OXC_SOURCEMAP=false`
pub const ENV_PREFIX: &str = "FOB_OXC_";

/// Multi-word option names. figment lowercases environment keys, so
/// `FOB_OXC_USEPROJECTCONFIG` arrives as `useprojectconfig`.
const CAMEL_CASE_KEYS: &[&str] = &[
    "autoDetectMarkup",
    "useProjectConfig",
    "projectConfigPath",
    "sourceType",
];

fn option_key(env_key: &str) -> String {
    CAMEL_CASE_KEYS
        .iter()
        .find(|key| key.eq_ignore_ascii_case(env_key))
        .map_or_else(|| env_key.to_string(), |key| key.to_string())
}

impl OxcLoaderOptions {
    /// Load options for the project at `root`.
    ///
    /// Priority: environment (`FOB_OXC_*`) > `[oxc]` table of `fob.toml` >
    /// defaults. A missing `fob.toml` is not an error.
    ///
    /// ```toml
    /// [oxc]
    /// target = "es2020"
    /// refresh = true
    /// jsx = { runtime = "classic", pragma = "h" }
    /// ```
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let mut figment =
            Figment::new().merge(Serialized::default(CONFIG_SECTION, Self::default()));

        let path = root.join(CONFIG_FILE_NAME);
        if path.is_file() {
            figment = figment.merge(Toml::file(path));
        }

        figment = figment.merge(
            Env::prefixed(ENV_PREFIX)
                .map(|key| format!("{}.{}", CONFIG_SECTION, option_key(key.as_str())).into()),
        );

        if !figment.contains(CONFIG_SECTION) {
            return Ok(Self::default());
        }
        Ok(figment.extract_inner(CONFIG_SECTION)?)
    }

    /// Build options from a JSON value, as handed over by hosts that configure
    /// plugins programmatically.
    pub fn from_value(value: Value) -> Result<Self, ConfigError> {
        Ok(serde_json::from_value(value)?)
    }
}
