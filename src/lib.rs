// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Build harness for the Alcove project.
//!
//! Alcove is a C++ project whose dependencies (glm, SDL, imgui, Catch2, fmt)
//! come from Conan, whose build files come from CMake, and whose tests run
//! through CTest. This crate puts all three behind one flat set of
//! [`Target`]s, and keeps the files Conan's generator step produces sorted
//! into the directories the rest of the build expects.
//!
//! # See Also
//!
//! - [`generator`] for generator-output housekeeping.
//! - [`Harness`] for the steps behind each target.

pub mod config;
pub mod exec;
pub mod generator;
pub mod harness;
pub mod target;
pub mod workspace;

pub use config::{Destination, HarnessConfig, Layout};
pub use exec::{DryRunExecutor, Executor, Invocation, SystemExecutor};
pub use generator::{clean_generator_dirs, organize_generator_dir, Classifier};
pub use harness::{Harness, HarnessError};
pub use target::Target;
pub use workspace::Workspace;
