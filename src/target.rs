// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Build targets.
//!
//! The harness exposes a flat listing of targets, each one a fixed recipe of
//! Conan, CMake, and CTest invocations. Targets are grouped the same way the
//! usage text groups them.

use clap::ValueEnum;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Single build target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum Target {
    /// Delete and recreate the build directory.
    Clean,

    /// Install dependencies with the debug profile.
    ConanDebug,
    /// Install dependencies with the release profile.
    ConanRelease,

    /// Configure for Visual Studio.
    ConfigMsvc,
    /// Configure debug build with tests enabled.
    ConfigTest,
    /// Configure debug build.
    ConfigDebug,
    /// Configure release build.
    ConfigRelease,

    /// Render target dependency graph as SVG.
    Graph,

    /// Build release configuration of an already configured MSVC tree.
    MsvcRelease,
    /// Build debug configuration of an already configured MSVC tree.
    MsvcDebug,
    /// Build an already configured tree.
    QuickBuild,

    /// Clean, configure for Visual Studio, then build release.
    CleanMsvcRelease,
    /// Clean, configure for Visual Studio, then build debug.
    CleanMsvcDebug,
    /// Clean, configure release, then build.
    BuildRelease,
    /// Clean, configure debug, then build.
    BuildDebug,
    /// Clean, configure debug, then build with verbose output.
    BuildVerbose,
    /// Clean, configure debug with tests enabled, then build.
    BuildTest,

    /// Run tests of release MSVC build.
    CtestMsvcRelease,
    /// Run tests of debug MSVC build.
    CtestMsvcDebug,
    /// Run tests.
    Ctest,
}

impl Target {
    /// Name of target as typed on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Clean => "clean",
            Self::ConanDebug => "conan-debug",
            Self::ConanRelease => "conan-release",
            Self::ConfigMsvc => "config-msvc",
            Self::ConfigTest => "config-test",
            Self::ConfigDebug => "config-debug",
            Self::ConfigRelease => "config-release",
            Self::Graph => "graph",
            Self::MsvcRelease => "msvc-release",
            Self::MsvcDebug => "msvc-debug",
            Self::QuickBuild => "quick-build",
            Self::CleanMsvcRelease => "clean-msvc-release",
            Self::CleanMsvcDebug => "clean-msvc-debug",
            Self::BuildRelease => "build-release",
            Self::BuildDebug => "build-debug",
            Self::BuildVerbose => "build-verbose",
            Self::BuildTest => "build-test",
            Self::CtestMsvcRelease => "ctest-msvc-release",
            Self::CtestMsvcDebug => "ctest-msvc-debug",
            Self::Ctest => "ctest",
        }
    }
}

impl Display for Target {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(self.name())
    }
}

/// CMake build type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildType {
    Debug,
    Release,
}

impl BuildType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "Debug",
            Self::Release => "Release",
        }
    }
}

/// CMake configuration flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// Visual Studio generator, build type picked at build time.
    Msvc,

    /// Single-config generator with optional test suite.
    SingleConfig { build_type: BuildType, testing: bool },
}

impl Preset {
    pub const TEST: Self = Self::SingleConfig {
        build_type: BuildType::Debug,
        testing: true,
    };
    pub const DEBUG: Self = Self::SingleConfig {
        build_type: BuildType::Debug,
        testing: false,
    };
    pub const RELEASE: Self = Self::SingleConfig {
        build_type: BuildType::Release,
        testing: false,
    };
}
