// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Workspace layout resolution.
//!
//! A __workspace__ is the top-level directory of the Alcove project. Beside
//! sources and headers it holds four directories the harness cares about:
//!
//! - The __generator-output__ directory (`cmake/`), which Conan's generator
//!   step fills with CMake build descriptors, environment scripts, and
//!   presets on every install.
//! - The __config__ directory (`config/`), home of structured configuration
//!   files relocated out of the generator-output directory.
//! - The __scripts__ directory (`scripts/`), home of shell and batch scripts
//!   relocated out of the generator-output directory.
//! - The __build__ directory (`build/`), the CMake binary tree.
//!
//! The first three are expected to be created as part of workspace setup.
//! The build directory is created and destroyed by the harness itself.

use crate::config::Layout;

use std::{
    fs::remove_dir_all,
    path::{Path, PathBuf},
};
use tracing::{info, instrument};

/// File whose presence marks a build directory as configured by CMake.
pub const CMAKE_CACHE_FILE: &str = "CMakeCache.txt";

/// Resolved directories of a workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    root: PathBuf,
    generators: PathBuf,
    config: PathBuf,
    scripts: PathBuf,
    build: PathBuf,
}

impl Workspace {
    /// Construct new workspace with default directory layout.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_layout(root, &Layout::default())
    }

    /// Construct new workspace with target directory layout.
    ///
    /// Relative layout entries are joined onto the root, absolute entries are
    /// taken as is. Does not check if any of the directories exist.
    pub fn with_layout(root: impl Into<PathBuf>, layout: &Layout) -> Self {
        let root = root.into();
        Self {
            generators: root.join(&layout.generators),
            config: root.join(&layout.config),
            scripts: root.join(&layout.scripts),
            build: root.join(&layout.build),
            root,
        }
    }

    /// Construct new workspace rooted at the current working directory.
    ///
    /// # Errors
    ///
    /// - Return [`WorkspaceError::CurrentDir`] if the current working
    ///   directory cannot be determined.
    pub fn current(layout: &Layout) -> Result<Self> {
        let root = std::env::current_dir().map_err(WorkspaceError::CurrentDir)?;
        Ok(Self::with_layout(root, layout))
    }

    pub fn root(&self) -> &Path {
        self.root.as_path()
    }

    pub fn generators_dir(&self) -> &Path {
        self.generators.as_path()
    }

    pub fn config_dir(&self) -> &Path {
        self.config.as_path()
    }

    pub fn scripts_dir(&self) -> &Path {
        self.scripts.as_path()
    }

    pub fn build_dir(&self) -> &Path {
        self.build.as_path()
    }

    /// Check that CMake has configured the build directory.
    ///
    /// # Errors
    ///
    /// - Return [`WorkspaceError::NotConfigured`] if the build directory does
    ///   not contain a CMake cache.
    pub fn ensure_configured(&self) -> Result<()> {
        if self.build.join(CMAKE_CACHE_FILE).is_file() {
            info!("{CMAKE_CACHE_FILE} found in {:?}", self.build.display());
            return Ok(());
        }

        Err(WorkspaceError::NotConfigured {
            build_dir: self.build.clone(),
        })
    }

    /// Remove build directory along with all of its contents, then recreate
    /// it empty.
    ///
    /// # Errors
    ///
    /// - Return [`WorkspaceError::RemoveBuildDir`] if removal fails.
    /// - Return [`WorkspaceError::CreateBuildDir`] if creation fails.
    #[instrument(skip(self), level = "debug")]
    pub fn reset_build_dir(&self) -> Result<()> {
        if self.build.exists() {
            info!("remove {:?}", self.build.display());
            remove_dir_all(&self.build).map_err(|source| WorkspaceError::RemoveBuildDir {
                source,
                build_dir: self.build.clone(),
            })?;
        }

        mkdirp::mkdirp(&self.build)
            .map(|_| ())
            .map_err(|source| WorkspaceError::CreateBuildDir {
                source,
                build_dir: self.build.clone(),
            })
    }
}

/// Workspace error types.
#[derive(Debug, thiserror::Error)]
pub enum WorkspaceError {
    /// Current working directory is unavailable.
    #[error("cannot determine current working directory")]
    CurrentDir(#[source] std::io::Error),

    /// Build directory has not been configured by CMake.
    #[error(
        "CMakeCache.txt not found in {:?}, run one of the config-* targets first",
        build_dir.display()
    )]
    NotConfigured { build_dir: PathBuf },

    /// Build directory cannot be removed.
    #[error("failed to remove build directory {:?}", build_dir.display())]
    RemoveBuildDir {
        #[source]
        source: std::io::Error,
        build_dir: PathBuf,
    },

    /// Build directory cannot be created.
    #[error("failed to create build directory {:?}", build_dir.display())]
    CreateBuildDir {
        #[source]
        source: std::io::Error,
        build_dir: PathBuf,
    },
}

/// Friendly result alias :3
pub type Result<T, E = WorkspaceError> = std::result::Result<T, E>;
