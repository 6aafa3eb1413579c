// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Target pipelines.
//!
//! A [`Harness`] turns a [`Target`] into an ordered sequence of steps. Steps
//! run strictly one after another, and the first failing step ends the
//! pipeline. Nothing after it runs.

use crate::{
    config::{ConfigError, HarnessConfig},
    exec::{ExecError, Executor, Invocation, SystemExecutor},
    generator::{clean_generator_dirs, organize_generator_dir, Classifier, GeneratorError},
    target::{BuildType, Preset, Target},
    workspace::{Workspace, WorkspaceError},
};

use std::{ffi::OsString, path::PathBuf};
use tracing::{info, instrument};

/// Dependency graph written by CMake into the build directory.
pub const GRAPH_DOT_FILE: &str = "graph.dot";

/// Rendered dependency graph written into the build directory.
pub const GRAPH_SVG_FILE: &str = "dependency_graph.svg";

/// Runs targets against a workspace.
#[derive(Debug)]
pub struct Harness<E = SystemExecutor>
where
    E: Executor,
{
    workspace: Workspace,
    config: HarnessConfig,
    classifier: Classifier,
    executor: E,
}

impl<E> Harness<E>
where
    E: Executor,
{
    /// Construct new harness.
    ///
    /// # Errors
    ///
    /// - Return [`HarnessError::Config`] if the organize rules of the
    ///   configuration are invalid.
    pub fn new(workspace: Workspace, config: HarnessConfig, executor: E) -> Result<Self> {
        let classifier = Classifier::from_rules(&config.organize_rules)?;
        Ok(Self {
            workspace,
            config,
            classifier,
            executor,
        })
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Run target to completion.
    ///
    /// # Errors
    ///
    /// - Return [`HarnessError`] from the first step that fails.
    #[instrument(skip(self), level = "debug")]
    pub fn run(&mut self, target: Target) -> Result<()> {
        info!("target {target}");
        match target {
            Target::Clean => self.clean(),
            Target::ConanDebug => self.conan_install(BuildType::Debug),
            Target::ConanRelease => self.conan_install(BuildType::Release),
            Target::ConfigMsvc => self.configure(Preset::Msvc),
            Target::ConfigTest => self.configure(Preset::TEST),
            Target::ConfigDebug => self.configure(Preset::DEBUG),
            Target::ConfigRelease => self.configure(Preset::RELEASE),
            Target::Graph => self.graph(),
            Target::MsvcRelease => self.quick_build(Some(BuildType::Release)),
            Target::MsvcDebug => self.quick_build(Some(BuildType::Debug)),
            Target::QuickBuild => self.quick_build(None),
            Target::CleanMsvcRelease => {
                self.clean_build(Preset::Msvc, BuildArgs::msvc(BuildType::Release))
            }
            Target::CleanMsvcDebug => {
                self.clean_build(Preset::Msvc, BuildArgs::msvc(BuildType::Debug))
            }
            Target::BuildRelease => self.clean_build(Preset::RELEASE, BuildArgs::default()),
            Target::BuildDebug => self.clean_build(Preset::DEBUG, BuildArgs::default()),
            Target::BuildVerbose => self.clean_build(Preset::DEBUG, BuildArgs::verbose()),
            Target::BuildTest => self.clean_build(Preset::TEST, BuildArgs::default()),
            Target::CtestMsvcRelease => self.ctest(Some(BuildType::Release)),
            Target::CtestMsvcDebug => self.ctest(Some(BuildType::Debug)),
            Target::Ctest => self.ctest(None),
        }
    }

    /// Delete and recreate the build directory.
    pub fn clean(&mut self) -> Result<()> {
        if self.executor.dry_run() {
            info!(
                "would remove and recreate {:?}",
                self.workspace.build_dir().display()
            );
            return Ok(());
        }

        Ok(self.workspace.reset_build_dir()?)
    }

    /// Install dependencies through Conan.
    ///
    /// Empties the generator-output, config, and scripts directories first,
    /// and sorts the freshly generated files afterwards.
    #[instrument(skip(self), level = "debug")]
    pub fn conan_install(&mut self, build_type: BuildType) -> Result<()> {
        let profile = match build_type {
            BuildType::Debug => &self.config.conan.debug_profile,
            BuildType::Release => &self.config.conan.release_profile,
        };
        let invocation = Invocation::new("conan")
            .arg("install")
            .arg(&self.config.conan.recipe)
            .arg("--build=missing")
            .arg(format!("--profile={profile}"))
            .current_dir(self.workspace.root());

        // INVARIANT: Dry runs leave generated files alone, just like the
        // commands they skip.
        if self.executor.dry_run() {
            info!("would clean generator-output, config, and scripts directories");
            self.executor.execute(&invocation)?;
            info!(
                "would organize {:?}",
                self.workspace.generators_dir().display()
            );
            return Ok(());
        }

        clean_generator_dirs(&self.workspace)?;
        self.executor.execute(&invocation)?;
        organize_generator_dir(&self.workspace, &self.classifier)?;

        Ok(())
    }

    /// Generate the build tree through CMake.
    #[instrument(skip(self), level = "debug")]
    pub fn configure(&mut self, preset: Preset) -> Result<()> {
        let build_dir = self.relative_build_dir();
        let mut toolchain = OsString::from("-DCMAKE_TOOLCHAIN_FILE=");
        toolchain.push(&self.config.cmake.toolchain_file);

        let invocation = Invocation::new("cmake")
            .args(["-S", "."])
            .arg("-B")
            .arg(build_dir);
        let invocation = match preset {
            Preset::Msvc => invocation
                .arg("-G")
                .arg(&self.config.cmake.msvc_generator)
                .arg("-DCMAKE_EXPORT_COMPILE_COMMANDS=1")
                .arg(toolchain),
            Preset::SingleConfig {
                build_type,
                testing,
            } => invocation
                .arg("-DCMAKE_EXPORT_COMPILE_COMMANDS=1")
                .arg("-G")
                .arg(&self.config.cmake.generator)
                .arg(toolchain)
                .arg(format!("-DCMAKE_BUILD_TYPE={}", build_type.as_str()))
                .arg(format!(
                    "-DBUILD_TESTING={}",
                    if testing { "ON" } else { "OFF" }
                )),
        };

        Ok(self.executor.execute(&invocation.current_dir(self.workspace.root()))?)
    }

    /// Render dependency graph of CMake targets.
    ///
    /// Configures a debug tree first, then lets CMake dump the graph and
    /// Graphviz render it, both from inside the build directory. CMake gets
    /// the workspace root as its source directory, so the build directory may
    /// sit at any depth.
    #[instrument(skip(self), level = "debug")]
    pub fn graph(&mut self) -> Result<()> {
        self.configure(Preset::DEBUG)?;

        let build_dir = self.workspace.build_dir().to_path_buf();
        if !self.executor.dry_run() && !build_dir.is_dir() {
            return Err(HarnessError::MissingBuildDir { build_dir });
        }

        self.executor.execute(
            &Invocation::new("cmake")
                .arg(self.workspace.root())
                .arg(format!("--graphviz={GRAPH_DOT_FILE}"))
                .current_dir(&build_dir),
        )?;
        self.executor.execute(
            &Invocation::new("dot")
                .args(["-Tsvg", GRAPH_DOT_FILE, "-o", GRAPH_SVG_FILE])
                .current_dir(&build_dir),
        )?;
        info!("graph written to {:?}", build_dir.join(GRAPH_SVG_FILE).display());

        Ok(())
    }

    /// Build an already configured tree.
    ///
    /// Passing a build type selects the configuration of a multi-config
    /// generator such as Visual Studio.
    #[instrument(skip(self), level = "debug")]
    pub fn quick_build(&mut self, build_type: Option<BuildType>) -> Result<()> {
        self.workspace.ensure_configured()?;
        let args = match build_type {
            Some(build_type) => BuildArgs::msvc(build_type),
            None => BuildArgs::default(),
        };
        self.build(args)
    }

    /// Clean, configure, then build.
    #[instrument(skip(self), level = "debug")]
    pub fn clean_build(&mut self, preset: Preset, args: BuildArgs) -> Result<()> {
        self.clean()?;
        self.configure(preset)?;
        self.build(args)
    }

    /// Run test suite from inside the build directory.
    #[instrument(skip(self), level = "debug")]
    pub fn ctest(&mut self, build_type: Option<BuildType>) -> Result<()> {
        let mut invocation = Invocation::new("ctest");
        if let Some(build_type) = build_type {
            invocation = invocation.args(["-C", build_type.as_str()]);
        }
        let invocation = invocation.arg("-VV").current_dir(self.workspace.build_dir());

        Ok(self.executor.execute(&invocation)?)
    }

    fn build(&mut self, args: BuildArgs) -> Result<()> {
        let mut invocation = Invocation::new("cmake")
            .arg("--build")
            .arg(self.relative_build_dir());
        if let Some(build_type) = args.config {
            invocation = invocation.args(["--config", build_type.as_str()]);
        }
        if args.verbose {
            invocation = invocation.arg("--verbose");
        }

        Ok(self
            .executor
            .execute(&invocation.current_dir(self.workspace.root()))?)
    }

    // CMake runs from the workspace root, so hand it the layout entry as
    // configured rather than the joined absolute path.
    fn relative_build_dir(&self) -> PathBuf {
        self.workspace
            .build_dir()
            .strip_prefix(self.workspace.root())
            .map(PathBuf::from)
            .unwrap_or_else(|_| self.workspace.build_dir().to_path_buf())
    }
}

/// Extra arguments of `cmake --build`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BuildArgs {
    pub config: Option<BuildType>,
    pub verbose: bool,
}

impl BuildArgs {
    pub fn msvc(build_type: BuildType) -> Self {
        Self {
            config: Some(build_type),
            verbose: false,
        }
    }

    pub fn verbose() -> Self {
        Self {
            config: None,
            verbose: true,
        }
    }
}

/// Pipeline error types.
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    /// External tool failed.
    #[error(transparent)]
    Exec(#[from] ExecError),

    /// Generator-output housekeeping failed.
    #[error(transparent)]
    Generator(#[from] GeneratorError),

    /// Workspace is not in the expected state.
    #[error(transparent)]
    Workspace(#[from] WorkspaceError),

    /// Configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Build directory vanished after configuration.
    #[error("build directory {:?} does not exist", build_dir.display())]
    MissingBuildDir { build_dir: PathBuf },
}

/// Friendly result alias :3
pub type Result<T, E = HarnessError> = std::result::Result<T, E>;
