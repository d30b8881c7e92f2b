//! Integration tests for the comcol binary.
// The cargo_bin function is marked deprecated in favor of cargo_bin! macro,
// but both work correctly. Suppressing until assert_cmd stabilizes the new API.
#![allow(deprecated)]

use assert_cmd::cargo::cargo_bin;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// A comcol invocation isolated from the host's tools and home directory.
fn comcol(root: &TempDir) -> Command {
    let empty = root.path().join("empty-path");
    fs::create_dir_all(&empty).unwrap();
    let mut cmd = Command::new(cargo_bin("comcol"));
    cmd.arg("--root")
        .arg(root.path())
        .env("PATH", &empty)
        .env("HOME", root.path())
        .env_remove("LMOD_CMD")
        .env_remove("LMOD_DIR")
        .env_remove("SPACK_ROOT")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn cli_shows_help() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin("comcol"));
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("refresh"))
        .stdout(predicate::str::contains("showcache"));
    Ok(())
}

#[test]
fn cli_shows_version() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin("comcol"));
    cmd.arg("--version");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    Ok(())
}

#[test]
fn cli_generates_completions() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin("comcol"));
    cmd.args(["completions", "bash"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("comcol"));
    Ok(())
}

#[test]
fn cli_rejects_unknown_subcommand() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin("comcol"));
    cmd.arg("frobnicate");
    cmd.assert().failure();
    Ok(())
}

#[test]
fn refresh_on_empty_root_asks_for_edits() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    comcol(&temp)
        .assert()
        .code(2)
        .stdout(predicate::str::contains("Wrote default settings"))
        .stderr(predicate::str::contains("Edit"))
        .stderr(predicate::str::contains("cc.yaml"));

    let settings = fs::read_to_string(temp.path().join("cc.yaml"))?;
    assert!(settings.contains("julia"));
    assert!(settings.contains("error:"));
    assert!(temp.path().join("cache.json").exists());
    Ok(())
}

#[test]
fn showcache_prints_json() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    comcol(&temp)
        .arg("showcache")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"version\": 1"));
    Ok(())
}

#[test]
fn clean_sure_removes_generated_files() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    fs::write(temp.path().join("cc.yaml"), "whitelist: {}\n")?;
    fs::create_dir_all(temp.path().join("modulefiles/julia"))?;
    fs::create_dir_all(temp.path().join("modulefiles/cc"))?;

    comcol(&temp).args(["clean", "--sure"]).assert().success();

    assert!(!temp.path().join("cc.yaml").exists());
    assert!(!temp.path().join("modulefiles/julia").exists());
    assert!(temp.path().join("modulefiles/cc").exists());
    Ok(())
}

#[test]
fn clean_without_sure_keeps_files_when_not_confirmed() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    fs::write(temp.path().join("cc.yaml"), "whitelist: {}\n")?;

    comcol(&temp)
        .arg("clean")
        .env("COMCOL_PROMPT_CLEAN", "no")
        .assert()
        .success();

    assert!(temp.path().join("cc.yaml").exists());
    Ok(())
}

#[test]
fn profile_writes_script_without_bashrc() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    fs::write(
        temp.path().join("cc.yaml"),
        "profile:\n  mods:\n    lmod:\n      - export MODULEPATH=/srv/cc/modulefiles\n",
    )?;

    comcol(&temp)
        .args(["profile", "--no-bashrc"])
        .assert()
        .success();

    let script = fs::read_to_string(temp.path().join("profile_cc.sh"))?;
    assert!(script.contains("export MODULEPATH=/srv/cc/modulefiles"));
    assert!(!temp.path().join(".bashrc").exists());
    Ok(())
}
