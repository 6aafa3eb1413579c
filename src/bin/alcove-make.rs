// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use alcove_make::{
    DryRunExecutor, Executor, Harness, HarnessConfig, SystemExecutor, Target, Workspace,
};

use anyhow::{Context, Result};
use clap::Parser;
use std::{path::PathBuf, process::exit};
use tracing::{debug, error};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// System-agnostic build helpers for Alcove.
#[derive(Debug, Clone, Parser)]
#[command(about, override_usage = "alcove-make [options] <target>", version)]
struct Cli {
    /// Target to run.
    #[arg(value_enum, value_name = "target")]
    pub target: Target,

    /// Workspace root, defaults to the current directory.
    #[arg(short, long, value_name = "path")]
    pub workspace: Option<PathBuf>,

    /// Configuration file, defaults to alcove-make.toml at the workspace root.
    #[arg(short, long, value_name = "file")]
    pub config: Option<PathBuf>,

    /// Print commands and file changes instead of performing them.
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Log debug output.
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    fn run(self) -> Result<()> {
        let root = match &self.workspace {
            Some(path) => path
                .canonicalize()
                .with_context(|| format!("cannot resolve workspace {:?}", path.display()))?,
            None => std::env::current_dir().context("cannot determine current directory")?,
        };

        let config = match &self.config {
            Some(path) => HarnessConfig::load(path)?,
            None => HarnessConfig::load_or_default(&root)?,
        };
        debug!("effective configuration:\n{config}");
        let workspace = Workspace::with_layout(root, &config.layout);

        if self.dry_run {
            run_target(Harness::new(workspace, config, DryRunExecutor)?, self.target)
        } else {
            run_target(Harness::new(workspace, config, SystemExecutor)?, self.target)
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let layer = fmt::layer()
        .compact()
        .with_target(false)
        .with_timer(false)
        .without_time();
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap();
    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .init();

    if let Err(error) = cli.run() {
        error!("{error:?}");
        exit(1);
    }

    exit(0)
}

fn run_target(mut harness: Harness<impl Executor>, target: Target) -> Result<()> {
    harness
        .run(target)
        .with_context(|| format!("target {target} failed"))
}
