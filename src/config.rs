// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Configuration layout.
//!
//! Specify the layout of the optional `alcove-make.toml` file that can sit at
//! the top-level of a workspace. Every field has a default that matches the
//! stock Alcove project, so an absent file, an empty file, and a partial file
//! are all valid.
//!
//! # General Layout
//!
//! ```toml
//! [layout]
//! generators = "cmake"
//! config = "config"
//! scripts = "scripts"
//! build = "build"
//!
//! [conan]
//! recipe = "conanfile.py"
//! debug_profile = "debug"
//! release_profile = "release"
//!
//! [cmake]
//! generator = "Unix Makefiles"
//! msvc_generator = "Visual Studio 17 2022"
//! toolchain_file = "cmake/conan_toolchain.cmake"
//!
//! [[organize]]
//! pattern = "*.sh"
//! destination = "scripts"
//! ```
//!
//! Path-like fields go through shell expansion, so `$HOME/profiles` or
//! `~/toolchains/conan.cmake` work as expected.

use serde::{Deserialize, Serialize};
use std::{
    fmt::{Display, Error as FmtError, Formatter, Result as FmtResult},
    fs::read_to_string,
    path::{Path, PathBuf},
    str::FromStr,
};
use tracing::debug;

/// Name of configuration file looked up at the top-level of a workspace.
pub const CONFIG_FILE_NAME: &str = "alcove-make.toml";

/// Harness configuration.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Directory names inside the workspace.
    pub layout: Layout,

    /// Settings for the dependency manager.
    pub conan: ConanSettings,

    /// Settings for the build-file generator.
    pub cmake: CMakeSettings,

    /// Classification rules for generated files.
    #[serde(rename = "organize")]
    pub organize_rules: Vec<OrganizeRule>,
}

impl HarnessConfig {
    /// Load configuration from target file.
    ///
    /// # Errors
    ///
    /// - Return [`ConfigError::Read`] if file cannot be read.
    /// - Return [`ConfigError::Deserialize`] if file contents are invalid.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("load configuration from {:?}", path.display());
        let data = read_to_string(path).map_err(|source| ConfigError::Read {
            source,
            path: path.to_path_buf(),
        })?;

        data.parse()
    }

    /// Load configuration from workspace root, or fall back to defaults.
    ///
    /// Only looks for [`CONFIG_FILE_NAME`] at the top-level of the workspace.
    ///
    /// # Errors
    ///
    /// - Return [`ConfigError`] if configuration file exists but cannot be
    ///   loaded.
    pub fn load_or_default(workspace_root: impl AsRef<Path>) -> Result<Self> {
        let path = workspace_root.as_ref().join(CONFIG_FILE_NAME);
        if path.is_file() {
            Self::load(path)
        } else {
            debug!("no {CONFIG_FILE_NAME} found, using defaults");
            Ok(Self::default())
        }
    }
}

impl FromStr for HarnessConfig {
    type Err = ConfigError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        let mut config: HarnessConfig = toml::de::from_str(data)?;

        // INVARIANT: Perform shell expansion on every path-like field.
        let layout = &mut config.layout;
        layout.generators = expand_path(&layout.generators)?;
        layout.config = expand_path(&layout.config)?;
        layout.scripts = expand_path(&layout.scripts)?;
        layout.build = expand_path(&layout.build)?;
        config.conan.recipe = expand_path(&config.conan.recipe)?;
        config.cmake.toolchain_file = expand_path(&config.cmake.toolchain_file)?;

        Ok(config)
    }
}

impl Display for HarnessConfig {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(
            toml::ser::to_string_pretty(self)
                .map_err(ConfigError::Serialize)?
                .as_str(),
        )
    }
}

fn expand_path(path: &Path) -> Result<PathBuf> {
    let lossy = path.to_string_lossy();
    let expanded = shellexpand::full(lossy.as_ref())?;
    Ok(PathBuf::from(expanded.into_owned()))
}

/// Directory layout of a workspace.
///
/// All paths are relative to the workspace root unless given as absolute.
#[derive(Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Layout {
    /// Generator-output directory, i.e., Conan's `generators_folder`.
    pub generators: PathBuf,

    /// Where structured configuration files end up.
    pub config: PathBuf,

    /// Where shell and batch scripts end up.
    pub scripts: PathBuf,

    /// Build output directory of CMake.
    pub build: PathBuf,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            generators: "cmake".into(),
            config: "config".into(),
            scripts: "scripts".into(),
            build: "build".into(),
        }
    }
}

/// Dependency manager settings.
#[derive(Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ConanSettings {
    /// Recipe handed to `conan install`.
    pub recipe: PathBuf,

    /// Profile used by the `conan-debug` target.
    pub debug_profile: String,

    /// Profile used by the `conan-release` target.
    pub release_profile: String,
}

impl Default for ConanSettings {
    fn default() -> Self {
        Self {
            recipe: "conanfile.py".into(),
            debug_profile: "debug".into(),
            release_profile: "release".into(),
        }
    }
}

/// Build-file generator settings.
#[derive(Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CMakeSettings {
    /// Generator for GCC and Clang configurations.
    pub generator: String,

    /// Generator for MSVC configurations.
    pub msvc_generator: String,

    /// Toolchain file emitted by Conan.
    pub toolchain_file: PathBuf,
}

impl Default for CMakeSettings {
    fn default() -> Self {
        Self {
            generator: "Unix Makefiles".into(),
            msvc_generator: "Visual Studio 17 2022".into(),
            toolchain_file: "cmake/conan_toolchain.cmake".into(),
        }
    }
}

/// Rule routing generated files that match a glob pattern to a destination.
#[derive(Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
pub struct OrganizeRule {
    /// Glob pattern matched against the file name only.
    pub pattern: String,

    /// Where matching files go.
    pub destination: Destination,
}

impl OrganizeRule {
    /// Construct new organize rule.
    pub fn new(pattern: impl Into<String>, destination: Destination) -> Self {
        Self {
            pattern: pattern.into(),
            destination,
        }
    }
}

/// Destination directory of a generated file.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Destination {
    /// Stay in the generator-output directory.
    #[default]
    Generators,

    /// Move to the scripts directory.
    Scripts,

    /// Move to the config directory.
    Config,
}

impl Display for Destination {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Generators => fmt.write_str("generators"),
            Self::Scripts => fmt.write_str("scripts"),
            Self::Config => fmt.write_str("config"),
        }
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Configuration file cannot be read.
    #[error("failed to read configuration file at {:?}", path.display())]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Failed to deserialize configuration.
    #[error(transparent)]
    Deserialize(#[from] toml::de::Error),

    /// Failed to serialize configuration.
    #[error(transparent)]
    Serialize(#[from] toml::ser::Error),

    /// Failed to perform shell expansion on configuration.
    #[error(transparent)]
    ShellExpansion(#[from] shellexpand::LookupError<std::env::VarError>),

    /// Organize rule holds an invalid glob pattern.
    #[error("invalid organize pattern {pattern:?}")]
    Pattern {
        #[source]
        source: glob::PatternError,
        pattern: String,
    },
}

impl From<ConfigError> for FmtError {
    fn from(_: ConfigError) -> Self {
        FmtError
    }
}

/// Friendly result alias :3
type Result<T, E = ConfigError> = std::result::Result<T, E>;
