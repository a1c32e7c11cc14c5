//! Integration tests for the studio CLI.
//!
//! Runs each subcommand against a temporary studio root. The API key is
//! removed from the environment so no test reaches the network.

use anyhow::Result;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

/// Build a command for the studio binary rooted at `dir`
fn studio(dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_studio"));
    cmd.arg("--dir")
        .arg(dir)
        .env_remove("ANTHROPIC_API_KEY")
        .env_remove("RUST_LOG");
    cmd
}

/// Helper to create an initialized studio
fn create_test_studio() -> Result<TempDir> {
    let temp_dir = tempfile::tempdir()?;
    let output = studio(temp_dir.path()).arg("init").output()?;
    assert!(output.status.success(), "Init command failed: {:?}", output);
    Ok(temp_dir)
}

fn stdout(output: &Output) -> Result<String> {
    Ok(String::from_utf8(output.stdout.clone())?)
}

fn stderr(output: &Output) -> Result<String> {
    Ok(String::from_utf8(output.stderr.clone())?)
}

#[test]
fn test_cli_version() -> Result<()> {
    let output = Command::new(env!("CARGO_BIN_EXE_studio"))
        .arg("--version")
        .output()?;

    assert!(output.status.success());
    assert!(stdout(&output)?.contains("studio"));

    Ok(())
}

#[test]
fn test_cli_help() -> Result<()> {
    let output = Command::new(env!("CARGO_BIN_EXE_studio"))
        .arg("--help")
        .output()?;

    assert!(output.status.success());
    let stdout = stdout(&output)?;
    assert!(stdout.contains("Story Studio"));
    for command in ["init", "new", "research", "write", "review", "revise", "storyboard", "export", "tui"] {
        assert!(stdout.contains(command), "help is missing {command}");
    }

    Ok(())
}

#[test]
fn test_init_command_success() -> Result<()> {
    let temp_dir = create_test_studio()?;

    assert!(temp_dir.path().join(".studio").exists());
    assert!(temp_dir.path().join(".studio/config.toml").exists());
    assert!(temp_dir.path().join(".studio/studio.db").exists());

    // A second init keeps the existing config
    let output = studio(temp_dir.path()).arg("init").output()?;
    assert!(output.status.success());
    assert!(stdout(&output)?.contains("Kept existing configuration"));

    Ok(())
}

#[test]
fn test_commands_require_init() -> Result<()> {
    let temp_dir = tempfile::tempdir()?;

    let output = studio(temp_dir.path()).arg("list").output()?;

    assert!(!output.status.success());
    assert!(stderr(&output)?.contains("studio init"));

    Ok(())
}

#[test]
fn test_new_list_and_show() -> Result<()> {
    let temp_dir = create_test_studio()?;

    let output = studio(temp_dir.path())
        .args([
            "new",
            "A sci-fi thriller about a robot who wants to be a chef on Mars.",
        ])
        .output()?;
    assert!(output.status.success(), "New command failed: {:?}", output);
    let created = stdout(&output)?;
    assert!(created.contains("Created project 1"));
    assert!(created.contains("1. Research Dept"));

    studio(temp_dir.path())
        .args(["new", "A heist on the moon"])
        .output()?;

    let output = studio(temp_dir.path()).arg("list").output()?;
    assert!(output.status.success());
    let listing = stdout(&output)?;
    let lines: Vec<&str> = listing.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("2. A heist on the moon"));
    assert!(lines[1].starts_with("1. A sci-fi thriller about a robo..."));

    let output = studio(temp_dir.path()).args(["show", "1"]).output()?;
    assert!(output.status.success());
    let shown = stdout(&output)?;
    assert!(shown.contains("== Idea =="));
    assert!(shown.contains("chef on Mars."));

    Ok(())
}

#[test]
fn test_new_rejects_blank_idea() -> Result<()> {
    let temp_dir = create_test_studio()?;

    let output = studio(temp_dir.path()).args(["new", "   "]).output()?;

    assert!(!output.status.success());
    assert!(stderr(&output)?.contains("Warning:"));

    Ok(())
}

#[test]
fn test_research_without_api_key_fails_gracefully() -> Result<()> {
    let temp_dir = create_test_studio()?;
    studio(temp_dir.path())
        .args(["new", "A robot chef on Mars"])
        .output()?;

    let output = studio(temp_dir.path()).args(["research", "1"]).output()?;

    assert!(!output.status.success());
    let stderr = stderr(&output)?;
    assert!(stderr.contains("ANTHROPIC_API_KEY"));

    // The project is still in research
    let output = studio(temp_dir.path()).args(["show", "1"]).output()?;
    assert!(stdout(&output)?.contains("Stage: 1. Research Dept"));

    Ok(())
}

#[test]
fn test_out_of_order_action_is_a_warning() -> Result<()> {
    let temp_dir = create_test_studio()?;
    studio(temp_dir.path())
        .args(["new", "A robot chef on Mars"])
        .output()?;

    let output = studio(temp_dir.path()).args(["review", "1"]).output()?;

    assert!(!output.status.success());
    let stderr = stderr(&output)?;
    assert!(stderr.contains("Warning: cannot run a review while the project is in 1. Research Dept"));

    Ok(())
}

#[test]
fn test_export_without_script_is_a_warning() -> Result<()> {
    let temp_dir = create_test_studio()?;
    studio(temp_dir.path())
        .args(["new", "A robot chef on Mars"])
        .output()?;

    let output = studio(temp_dir.path()).args(["export", "1"]).output()?;

    assert!(!output.status.success());
    assert!(stderr(&output)?.contains("Warning: missing prerequisite: script"));
    assert!(!temp_dir.path().join("screenplay_final.txt").exists());

    Ok(())
}

#[test]
fn test_show_unknown_project() -> Result<()> {
    let temp_dir = create_test_studio()?;

    let output = studio(temp_dir.path()).args(["show", "42"]).output()?;

    assert!(!output.status.success());
    assert!(stderr(&output)?.contains("project not found: 42"));

    Ok(())
}

#[test]
fn test_prompts_lists_bundled_templates() -> Result<()> {
    let temp_dir = create_test_studio()?;

    let output = studio(temp_dir.path()).arg("prompts").output()?;

    assert!(output.status.success());
    let names = stdout(&output)?;
    for name in ["researcher", "writer", "editor", "storyboard", "editor_system"] {
        assert!(names.lines().any(|line| line == name), "missing {name}");
    }

    Ok(())
}
