//! Build-level context shared by every module the plugin transforms.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Build mode of the surrounding bundler run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    #[default]
    Development,
    Production,
    /// Neither development nor production (no mode-dependent defaults apply)
    None,
}

impl BuildMode {
    pub fn is_development(self) -> bool {
        self == BuildMode::Development
    }

    fn as_str(self) -> &'static str {
        match self {
            BuildMode::Development => "development",
            BuildMode::Production => "production",
            BuildMode::None => "none",
        }
    }
}

impl FromStr for BuildMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(BuildMode::Development),
            "production" | "prod" => Ok(BuildMode::Production),
            "none" => Ok(BuildMode::None),
            other => Err(format!("Invalid build mode: {}", other)),
        }
    }
}

impl fmt::Display for BuildMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-build information the host supplies once, at plugin construction.
///
/// Rolldown's transform hook carries no notion of build mode, so the mode and
/// project root travel with the plugin instead of with each hook call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildContext {
    /// Working directory of the build (project root)
    pub cwd: PathBuf,
    /// Build mode driving markup defaults
    pub mode: BuildMode,
}

impl BuildContext {
    pub fn new(cwd: impl AsRef<Path>, mode: BuildMode) -> Self {
        Self {
            cwd: cwd.as_ref().to_path_buf(),
            mode,
        }
    }

    pub fn development(cwd: impl AsRef<Path>) -> Self {
        Self::new(cwd, BuildMode::Development)
    }

    pub fn production(cwd: impl AsRef<Path>) -> Self {
        Self::new(cwd, BuildMode::Production)
    }
}

impl Default for BuildContext {
    fn default() -> Self {
        Self::development(".")
    }
}
