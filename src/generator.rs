// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Generator-output housekeeping.
//!
//! Conan writes everything its generators produce into one folder, the
//! __generator-output__ directory. CMake only needs the build descriptors in
//! there, so after every install the remaining files are sorted into the
//! scripts and config directories. Before every install, all three
//! directories are emptied so files dropped by a newer dependency set cannot
//! linger around from an older one.
//!
//! Both operations only look at the direct entries of each directory. Nested
//! directories are reported and left alone.
//!
//! # See Also
//!
//! - [`Classifier`]
//! - [`Workspace`]

pub mod classify;

pub use classify::Classifier;

use crate::{config::Destination, workspace::Workspace};

use std::{
    fs::{read_dir, remove_file, rename},
    io::ErrorKind,
    path::{Path, PathBuf},
};
use tracing::{debug, info, instrument, warn};

/// Files removed by [`clean_generator_dirs`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CleanReport {
    pub removed: Vec<PathBuf>,
}

/// Single file moved by [`organize_generator_dir`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relocation {
    pub from: PathBuf,
    pub to: PathBuf,
    pub destination: Destination,
}

/// Files moved by [`organize_generator_dir`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OrganizeReport {
    pub moved: Vec<Relocation>,
}

/// Remove every file in the generator-output, config, and scripts
/// directories.
///
/// A missing directory counts as already clean. Running this twice in a row
/// removes nothing the second time.
///
/// # Errors
///
/// - Return [`GeneratorError::ReadDir`] if a directory cannot be listed.
/// - Return [`GeneratorError::RemoveFile`] if a file cannot be removed.
#[instrument(skip(workspace), level = "debug")]
pub fn clean_generator_dirs(workspace: &Workspace) -> Result<CleanReport> {
    let mut report = CleanReport::default();
    for dir in [
        workspace.generators_dir(),
        workspace.config_dir(),
        workspace.scripts_dir(),
    ] {
        if !dir.is_dir() {
            warn!("{:?} does not exist, nothing to clean", dir.display());
            continue;
        }

        for path in list_entries(dir)? {
            if path.is_dir() {
                warn!("skip directory {:?}", path.display());
                continue;
            }

            info!("remove {:?}", path.display());
            remove_file(&path).map_err(|source| GeneratorError::RemoveFile {
                source,
                path: path.clone(),
            })?;
            report.removed.push(path);
        }
    }

    Ok(report)
}

/// Sort files of the generator-output directory into the scripts and config
/// directories.
///
/// Each file is routed by name through the classifier. Files destined for
/// the generator-output directory stay where they are. Moving a file replaces
/// any file of the same name at its destination.
///
/// # Errors
///
/// - Return [`GeneratorError::MissingDirectory`] if the generator-output
///   directory, or a destination directory that is needed, does not exist.
/// - Return [`GeneratorError::ReadDir`] if the generator-output directory
///   cannot be listed.
/// - Return [`GeneratorError::MoveFile`] if a file cannot be moved.
#[instrument(skip(workspace, classifier), level = "debug")]
pub fn organize_generator_dir(
    workspace: &Workspace,
    classifier: &Classifier,
) -> Result<OrganizeReport> {
    let source_dir = workspace.generators_dir();
    require_dir(source_dir)?;

    let mut report = OrganizeReport::default();
    for path in list_entries(source_dir)? {
        if path.is_dir() {
            warn!("skip directory {:?}", path.display());
            continue;
        }

        // INVARIANT: Entries returned by read_dir always carry a file name.
        let Some(name) = path.file_name() else {
            continue;
        };

        let destination = classifier.classify(name);
        let target_dir = match destination {
            Destination::Generators => {
                debug!("keep {:?}", path.display());
                continue;
            }
            Destination::Scripts => workspace.scripts_dir(),
            Destination::Config => workspace.config_dir(),
        };
        require_dir(target_dir)?;

        let target = target_dir.join(name);

        info!(
            "move {:?} from {:?} to {:?}",
            name,
            source_dir.display(),
            target_dir.display()
        );
        rename(&path, &target).map_err(|source| GeneratorError::MoveFile {
            source,
            from: path.clone(),
            to: target.clone(),
        })?;

        report.moved.push(Relocation {
            from: path,
            to: target,
            destination,
        });
    }

    Ok(report)
}

fn require_dir(dir: &Path) -> Result<()> {
    if dir.is_dir() {
        Ok(())
    } else {
        Err(GeneratorError::MissingDirectory {
            path: dir.to_path_buf(),
        })
    }
}

// Sorted, so logs and reports come out in a stable order.
fn list_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    let read_error = |source| GeneratorError::ReadDir {
        source,
        path: dir.to_path_buf(),
    };

    let mut entries = Vec::new();
    for entry in read_dir(dir).map_err(read_error)? {
        match entry {
            Ok(entry) => entries.push(entry.path()),
            // INVARIANT: Entry vanished between listing and inspection, e.g.,
            // removed by another process. Nothing left to act on.
            Err(error) if error.kind() == ErrorKind::NotFound => continue,
            Err(error) => return Err(read_error(error)),
        }
    }
    entries.sort();

    Ok(entries)
}

/// Workspace layout error types for generator-output housekeeping.
#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    /// Required directory does not exist.
    #[error("directory {:?} not found, is the workspace set up?", path.display())]
    MissingDirectory { path: PathBuf },

    /// Directory cannot be listed.
    #[error("failed to read directory {:?}", path.display())]
    ReadDir {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Generated file cannot be removed.
    #[error("failed to remove {:?}", path.display())]
    RemoveFile {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Generated file cannot be moved.
    #[error("failed to move {:?} to {:?}", from.display(), to.display())]
    MoveFile {
        #[source]
        source: std::io::Error,
        from: PathBuf,
        to: PathBuf,
    },
}

/// Friendly result alias :3
pub type Result<T, E = GeneratorError> = std::result::Result<T, E>;
