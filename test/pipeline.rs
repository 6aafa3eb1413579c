// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use crate::{RecordingExecutor, WorkspaceFixture};

use alcove_make::{
    config::OrganizeRule, workspace::WorkspaceError, Destination, DryRunExecutor, Harness,
    HarnessConfig, HarnessError, Layout, Target, Workspace,
};
use anyhow::Result;
use sealed_test::prelude::*;
use simple_test_case::test_case;
use std::{
    ffi::OsStr,
    fs::{create_dir_all, read_dir, write},
    path::Path,
};

const CONFIGURE_DEBUG: &str = "cmake -S . -B build -DCMAKE_EXPORT_COMPILE_COMMANDS=1 \
    -G \"Unix Makefiles\" -DCMAKE_TOOLCHAIN_FILE=cmake/conan_toolchain.cmake \
    -DCMAKE_BUILD_TYPE=Debug -DBUILD_TESTING=OFF";
const CONFIGURE_RELEASE: &str = "cmake -S . -B build -DCMAKE_EXPORT_COMPILE_COMMANDS=1 \
    -G \"Unix Makefiles\" -DCMAKE_TOOLCHAIN_FILE=cmake/conan_toolchain.cmake \
    -DCMAKE_BUILD_TYPE=Release -DBUILD_TESTING=OFF";
const CONFIGURE_TEST: &str = "cmake -S . -B build -DCMAKE_EXPORT_COMPILE_COMMANDS=1 \
    -G \"Unix Makefiles\" -DCMAKE_TOOLCHAIN_FILE=cmake/conan_toolchain.cmake \
    -DCMAKE_BUILD_TYPE=Debug -DBUILD_TESTING=ON";
const CONFIGURE_MSVC: &str = "cmake -S . -B build -G \"Visual Studio 17 2022\" \
    -DCMAKE_EXPORT_COMPILE_COMMANDS=1 -DCMAKE_TOOLCHAIN_FILE=cmake/conan_toolchain.cmake";

fn file_names(dir: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in read_dir(dir)? {
        names.push(entry?.file_name().to_string_lossy().into_owned());
    }
    names.sort();
    Ok(names)
}

#[test_case(Target::ConfigDebug, CONFIGURE_DEBUG; "config debug")]
#[test_case(Target::ConfigRelease, CONFIGURE_RELEASE; "config release")]
#[test_case(Target::ConfigTest, CONFIGURE_TEST; "config test")]
#[test_case(Target::ConfigMsvc, CONFIGURE_MSVC; "config msvc")]
#[test]
fn configure_targets(target: Target, expect: &str) -> Result<()> {
    let workspace = Workspace::new("/work/alcove");
    let mut harness = Harness::new(
        workspace.clone(),
        HarnessConfig::default(),
        RecordingExecutor::default(),
    )?;

    harness.run(target)?;

    let calls = &harness.executor().calls;
    assert_eq!(harness.executor().command_lines(), vec![expect.to_string()]);
    assert_eq!(calls[0].get_current_dir(), Some(workspace.root()));

    Ok(())
}

#[sealed_test]
fn clean_build_targets() -> Result<()> {
    let cases = [
        (Target::BuildRelease, CONFIGURE_RELEASE, "cmake --build build"),
        (Target::BuildDebug, CONFIGURE_DEBUG, "cmake --build build"),
        (Target::BuildVerbose, CONFIGURE_DEBUG, "cmake --build build --verbose"),
        (Target::BuildTest, CONFIGURE_TEST, "cmake --build build"),
        (Target::CleanMsvcRelease, CONFIGURE_MSVC, "cmake --build build --config Release"),
        (Target::CleanMsvcDebug, CONFIGURE_MSVC, "cmake --build build --config Debug"),
    ];

    for (target, configure, build) in cases {
        let fixture = WorkspaceFixture::new()?.configured()?;
        write(fixture.workspace.build_dir().join("stale.o"), "")?;
        let mut harness = Harness::new(
            fixture.workspace.clone(),
            HarnessConfig::default(),
            RecordingExecutor::default(),
        )?;

        harness.run(target)?;

        // Build directory was recreated before configuring.
        assert!(file_names(fixture.workspace.build_dir())?.is_empty());

        assert_eq!(
            harness.executor().command_lines(),
            vec![configure.to_string(), build.to_string()],
            "{target}"
        );
    }

    Ok(())
}

#[sealed_test]
fn quick_build_targets() -> Result<()> {
    let fixture = WorkspaceFixture::new()?.configured()?;
    let cases = [
        (Target::QuickBuild, "cmake --build build"),
        (Target::MsvcRelease, "cmake --build build --config Release"),
        (Target::MsvcDebug, "cmake --build build --config Debug"),
    ];

    for (target, expect) in cases {
        let mut harness = Harness::new(
            fixture.workspace.clone(),
            HarnessConfig::default(),
            RecordingExecutor::default(),
        )?;

        harness.run(target)?;

        assert_eq!(harness.executor().command_lines(), vec![expect.to_string()]);
        // Quick builds never wipe the build tree.
        assert!(fixture.workspace.build_dir().join("CMakeCache.txt").is_file());
    }

    Ok(())
}

#[sealed_test]
fn quick_build_requires_configuration() -> Result<()> {
    let fixture = WorkspaceFixture::new()?;
    let mut harness = Harness::new(
        fixture.workspace.clone(),
        HarnessConfig::default(),
        RecordingExecutor::default(),
    )?;

    let result = harness.run(Target::QuickBuild);
    assert!(matches!(
        result,
        Err(HarnessError::Workspace(WorkspaceError::NotConfigured { .. }))
    ));
    assert!(harness.executor().calls.is_empty());

    Ok(())
}

#[test_case(Target::Ctest, "ctest -VV"; "ctest")]
#[test_case(Target::CtestMsvcRelease, "ctest -C Release -VV"; "msvc release")]
#[test_case(Target::CtestMsvcDebug, "ctest -C Debug -VV"; "msvc debug")]
#[test]
fn ctest_targets_run_in_build_dir(target: Target, expect: &str) -> Result<()> {
    let workspace = Workspace::new("/work/alcove");
    let mut harness = Harness::new(
        workspace.clone(),
        HarnessConfig::default(),
        RecordingExecutor::default(),
    )?;

    harness.run(target)?;

    let calls = &harness.executor().calls;
    assert_eq!(harness.executor().command_lines(), vec![expect.to_string()]);
    assert_eq!(calls[0].get_current_dir(), Some(workspace.build_dir()));

    Ok(())
}

#[sealed_test]
fn graph_configures_then_renders() -> Result<()> {
    let fixture = WorkspaceFixture::new()?.configured()?;
    let mut harness = Harness::new(
        fixture.workspace.clone(),
        HarnessConfig::default(),
        RecordingExecutor::default(),
    )?;

    harness.run(Target::Graph)?;

    let calls = &harness.executor().calls;
    let lines = harness.executor().command_lines();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], CONFIGURE_DEBUG);
    assert_eq!(
        calls[1].get_args().collect::<Vec<_>>(),
        vec![
            fixture.workspace.root().as_os_str(),
            OsStr::new("--graphviz=graph.dot")
        ]
    );
    assert_eq!(lines[2], "dot -Tsvg graph.dot -o dependency_graph.svg");
    assert_eq!(calls[1].get_current_dir(), Some(fixture.workspace.build_dir()));
    assert_eq!(calls[2].get_current_dir(), Some(fixture.workspace.build_dir()));

    Ok(())
}

#[sealed_test]
fn graph_with_nested_build_dir() -> Result<()> {
    let layout = Layout {
        build: "out/cmake-build".into(),
        ..Layout::default()
    };
    let workspace = Workspace::with_layout(std::env::current_dir()?, &layout);
    create_dir_all(workspace.build_dir())?;
    let mut harness = Harness::new(
        workspace.clone(),
        HarnessConfig {
            layout,
            ..HarnessConfig::default()
        },
        RecordingExecutor::default(),
    )?;

    harness.run(Target::Graph)?;

    // Source directory must not be derived from the build directory's parent.
    let calls = &harness.executor().calls;
    assert_eq!(calls.len(), 3);
    assert_eq!(
        calls[1].get_args().next(),
        Some(workspace.root().as_os_str())
    );
    assert_eq!(
        calls[1].get_current_dir(),
        Some(workspace.root().join("out/cmake-build").as_path())
    );

    Ok(())
}

#[sealed_test]
fn graph_requires_build_dir() -> Result<()> {
    let fixture = WorkspaceFixture::new()?;
    let mut harness = Harness::new(
        fixture.workspace.clone(),
        HarnessConfig::default(),
        RecordingExecutor::default(),
    )?;

    let result = harness.run(Target::Graph);
    assert!(matches!(result, Err(HarnessError::MissingBuildDir { .. })));
    assert_eq!(harness.executor().calls.len(), 1);

    Ok(())
}

#[sealed_test]
fn failing_step_halts_pipeline() -> Result<()> {
    let fixture = WorkspaceFixture::new()?;
    let mut harness = Harness::new(
        fixture.workspace.clone(),
        HarnessConfig::default(),
        RecordingExecutor::failing_on("cmake"),
    )?;

    let result = harness.run(Target::BuildDebug);
    assert!(matches!(result, Err(HarnessError::Exec(_))));

    // Configure failed, so the build step never ran.
    let lines = harness.executor().command_lines();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with("cmake -S ."));

    Ok(())
}

#[sealed_test]
fn conan_install_cleans_then_organizes() -> Result<()> {
    let fixture = WorkspaceFixture::new()?;
    let workspace = &fixture.workspace;
    write(workspace.scripts_dir().join("old.sh"), "")?;
    write(workspace.config_dir().join("old.json"), "")?;
    write(workspace.generators_dir().join("old-config.cmake"), "")?;

    let executor = RecordingExecutor::with_conan_output(
        workspace.generators_dir(),
        ["new.sh", "new.bat", "new.json", "generators.cmake"],
    );
    let mut harness = Harness::new(workspace.clone(), HarnessConfig::default(), executor)?;

    harness.run(Target::ConanDebug)?;

    assert_eq!(
        harness.executor().command_lines(),
        vec!["conan install conanfile.py --build=missing --profile=debug".to_string()]
    );
    assert_eq!(file_names(workspace.scripts_dir())?, vec!["new.bat", "new.sh"]);
    assert_eq!(file_names(workspace.config_dir())?, vec!["new.json"]);
    assert_eq!(
        file_names(workspace.generators_dir())?,
        vec!["generators.cmake"]
    );

    Ok(())
}

#[sealed_test]
fn conan_failure_skips_organize() -> Result<()> {
    let fixture = WorkspaceFixture::new()?;
    let workspace = &fixture.workspace;
    write(workspace.scripts_dir().join("old.sh"), "")?;

    let mut harness = Harness::new(
        workspace.clone(),
        HarnessConfig::default(),
        RecordingExecutor::failing_on("conan"),
    )?;

    // Stand-in for output of an interrupted install.
    write(workspace.generators_dir().join("partial.sh"), "")?;
    let result = harness.run(Target::ConanRelease);
    assert!(matches!(result, Err(HarnessError::Exec(_))));

    // Clean ran before the install, organize never ran after it.
    assert!(file_names(workspace.scripts_dir())?.is_empty());
    assert!(file_names(workspace.generators_dir())?.is_empty());
    assert_eq!(
        harness.executor().command_lines(),
        vec!["conan install conanfile.py --build=missing --profile=release".to_string()]
    );

    Ok(())
}

#[sealed_test]
fn configured_rules_reach_organizer() -> Result<()> {
    let fixture = WorkspaceFixture::new()?;
    let workspace = &fixture.workspace;
    let config = HarnessConfig {
        organize_rules: vec![
            OrganizeRule::new("*.ps1", Destination::Scripts),
            OrganizeRule::new("conandeps.json", Destination::Generators),
        ],
        ..HarnessConfig::default()
    };
    let executor = RecordingExecutor::with_conan_output(
        workspace.generators_dir(),
        ["conanbuild.ps1", "conandeps.json", "CMakePresets.json"],
    );
    let mut harness = Harness::new(workspace.clone(), config, executor)?;

    harness.run(Target::ConanDebug)?;

    assert_eq!(file_names(workspace.scripts_dir())?, vec!["conanbuild.ps1"]);
    assert_eq!(file_names(workspace.config_dir())?, vec!["CMakePresets.json"]);
    assert_eq!(file_names(workspace.generators_dir())?, vec!["conandeps.json"]);

    Ok(())
}

#[sealed_test]
fn invalid_rule_rejected_up_front() -> Result<()> {
    let fixture = WorkspaceFixture::new()?;
    let config = HarnessConfig {
        organize_rules: vec![OrganizeRule::new("[", Destination::Config)],
        ..HarnessConfig::default()
    };

    let result = Harness::new(fixture.workspace.clone(), config, RecordingExecutor::default());
    assert!(matches!(result, Err(HarnessError::Config(_))));

    Ok(())
}

#[sealed_test]
fn dry_run_leaves_workspace_untouched() -> Result<()> {
    let fixture = WorkspaceFixture::new()?.configured()?;
    let workspace = &fixture.workspace;
    write(workspace.generators_dir().join("conan_toolchain.cmake"), "")?;
    write(workspace.generators_dir().join("conanbuild.sh"), "")?;
    write(workspace.config_dir().join("CMakePresets.json"), "")?;
    write(workspace.scripts_dir().join("conanrun.sh"), "")?;
    write(workspace.build_dir().join("main.o"), "")?;
    let mut harness = Harness::new(workspace.clone(), HarnessConfig::default(), DryRunExecutor)?;

    for target in [
        Target::ConanDebug,
        Target::Clean,
        Target::BuildTest,
        Target::CleanMsvcDebug,
        Target::Graph,
    ] {
        harness.run(target)?;
    }

    assert_eq!(
        file_names(workspace.generators_dir())?,
        vec!["conan_toolchain.cmake", "conanbuild.sh"]
    );
    assert_eq!(file_names(workspace.config_dir())?, vec!["CMakePresets.json"]);
    assert_eq!(file_names(workspace.scripts_dir())?, vec!["conanrun.sh"]);
    assert_eq!(
        file_names(workspace.build_dir())?,
        vec!["CMakeCache.txt", "main.o"]
    );

    Ok(())
}

#[sealed_test]
fn dry_run_graph_without_build_dir() -> Result<()> {
    let fixture = WorkspaceFixture::new()?;
    let mut harness = Harness::new(
        fixture.workspace.clone(),
        HarnessConfig::default(),
        DryRunExecutor,
    )?;

    harness.run(Target::Graph)?;
    assert!(!fixture.workspace.build_dir().exists());

    Ok(())
}

#[sealed_test]
fn working_directory_unchanged_after_pipelines() -> Result<()> {
    let before = std::env::current_dir()?;
    let fixture = WorkspaceFixture::new()?.configured()?;
    let mut harness = Harness::new(
        fixture.workspace.clone(),
        HarnessConfig::default(),
        RecordingExecutor::failing_on("dot"),
    )?;

    harness.run(Target::Ctest)?;
    assert_eq!(std::env::current_dir()?, before);

    assert!(harness.run(Target::Graph).is_err());
    assert_eq!(std::env::current_dir()?, before);

    Ok(())
}
