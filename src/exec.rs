// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! External command invocation.
//!
//! Every target of the harness boils down to running Conan, CMake, CTest, or
//! Graphviz with a fixed set of arguments. An [`Invocation`] describes one
//! such run, and an [`Executor`] carries it out.
//!
//! # Working Directory
//!
//! Some tools must run from inside the build directory. Instead of changing
//! the working directory of the harness and restoring it afterwards, the
//! target directory is handed to the child process directly. The working
//! directory of the harness itself never changes, no matter how the child
//! exits.

use std::{
    ffi::{OsStr, OsString},
    fmt::{Display, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
    process::{Command, ExitStatus},
};
use tracing::{debug, info, instrument};

/// Single run of an external tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    program: OsString,
    args: Vec<OsString>,
    current_dir: Option<PathBuf>,
}

impl Invocation {
    /// Construct new invocation of target program without arguments.
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
        }
    }

    /// Append single argument.
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append listing of arguments.
    pub fn args(mut self, args: impl IntoIterator<Item = impl Into<OsString>>) -> Self {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Run program from inside target directory.
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    pub fn program(&self) -> &OsStr {
        self.program.as_os_str()
    }

    pub fn get_args(&self) -> impl Iterator<Item = &OsStr> {
        self.args.iter().map(OsString::as_os_str)
    }

    pub fn get_current_dir(&self) -> Option<&Path> {
        self.current_dir.as_deref()
    }

    fn to_command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        if let Some(dir) = &self.current_dir {
            command.current_dir(dir);
        }
        command
    }
}

impl Display for Invocation {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(&quote(&self.program))?;
        for arg in &self.args {
            fmt.write_str(" ")?;
            fmt.write_str(&quote(arg))?;
        }
        Ok(())
    }
}

// Quote arguments holding whitespace, e.g., "-GUnix Makefiles", so logged
// command lines can be pasted back into a shell.
fn quote(value: &OsStr) -> String {
    let value = value.to_string_lossy();
    if value.chars().any(char::is_whitespace) {
        format!("\"{value}\"")
    } else {
        value.into_owned()
    }
}

/// Layer of indirection for running external tools.
pub trait Executor {
    /// Run invocation to completion.
    ///
    /// # Errors
    ///
    /// - Return [`ExecError`] if the program cannot be started, or exits
    ///   unsuccessfully.
    fn execute(&mut self, invocation: &Invocation) -> Result<()>;

    /// Whether invocations are only reported, never run.
    ///
    /// Callers use this to hold back their own side effects, e.g., file
    /// removal, alongside the skipped commands.
    fn dry_run(&self) -> bool {
        false
    }
}

/// Run external tools as child processes of the harness.
///
/// Children inherit standard input, output, and error, so tool output shows
/// up on the terminal as it happens. Blocks until the child exits. No timeout
/// is applied.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemExecutor;

impl Executor for SystemExecutor {
    #[instrument(skip(self, invocation), level = "debug")]
    fn execute(&mut self, invocation: &Invocation) -> Result<()> {
        match invocation.get_current_dir() {
            Some(dir) => info!("run {invocation} (in {:?})", dir.display()),
            None => info!("run {invocation}"),
        }

        let status = invocation
            .to_command()
            .status()
            .map_err(|source| ExecError::Spawn {
                source,
                command: invocation.to_string(),
            })?;
        debug!("{invocation} exited with {status}");

        if !status.success() {
            return Err(ExecError::Failed {
                command: invocation.to_string(),
                status,
            });
        }

        Ok(())
    }
}

/// Log invocations without running anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct DryRunExecutor;

impl Executor for DryRunExecutor {
    fn execute(&mut self, invocation: &Invocation) -> Result<()> {
        match invocation.get_current_dir() {
            Some(dir) => info!("would run {invocation} (in {:?})", dir.display()),
            None => info!("would run {invocation}"),
        }

        Ok(())
    }

    fn dry_run(&self) -> bool {
        true
    }
}

/// External command error types.
#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    /// Program could not be started at all.
    #[error("failed to run command {command:?}")]
    Spawn {
        #[source]
        source: std::io::Error,
        command: String,
    },

    /// Program ran, but exited unsuccessfully.
    #[error("command {command:?} failed with {status}")]
    Failed { command: String, status: ExitStatus },
}

/// Friendly result alias :3
pub type Result<T, E = ExecError> = std::result::Result<T, E>;
