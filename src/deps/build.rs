//! Install plans and the scoped directory they run in.

use anyhow::{bail, Context};
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::shell::{CommandOptions, ShellRunner};

/// One external command in an install plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildStep {
    /// Short description for logs and errors.
    pub name: String,
    pub command: String,
    /// Subdirectory of the work directory to run in.
    pub subdir: Option<String>,
}

impl BuildStep {
    pub fn new(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            subdir: None,
        }
    }

    /// Run inside `subdir` of the work directory.
    pub fn in_subdir(mut self, subdir: impl Into<String>) -> Self {
        self.subdir = Some(subdir.into());
        self
    }
}

/// Ordered install steps sharing one environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildPlan {
    pub steps: Vec<BuildStep>,
    pub env: HashMap<String, String>,
}

impl BuildPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(mut self, step: BuildStep) -> Self {
        self.steps.push(step);
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Run every step in a fresh scoped work directory, stopping at the first failure.
    ///
    /// The work directory is removed when this returns, on success and on error.
    pub fn run(&self, shell: &dyn ShellRunner, log: &mut BuildLog) -> anyhow::Result<()> {
        let workdir = ScopedWorkdir::create()?;
        tracing::debug!("building in {}", workdir.path().display());

        for step in &self.steps {
            let cwd = match &step.subdir {
                Some(sub) => workdir.path().join(sub),
                None => workdir.path().to_path_buf(),
            };
            let options = CommandOptions {
                cwd: Some(cwd),
                env: self.env.clone(),
                ..CommandOptions::captured()
            };

            tracing::info!("{}", step.name);
            log.section(&step.name, &step.command)?;
            let result = shell
                .run(&step.command, &options)
                .with_context(|| format!("could not start step `{}`", step.name))?;
            log.output(&result.stdout, &result.stderr)?;

            if !result.success {
                bail!(
                    "step `{}` failed with exit code {:?}: {}",
                    step.name,
                    result.exit_code,
                    step.command
                );
            }
        }
        Ok(())
    }
}

/// Temporary build directory removed on drop.
#[derive(Debug)]
pub struct ScopedWorkdir {
    dir: TempDir,
}

impl ScopedWorkdir {
    pub fn create() -> anyhow::Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("comcol-build-")
            .tempdir()
            .context("could not create a temporary build directory")?;
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

/// Append-only diagnostic log for one dependency's build.
#[derive(Debug)]
pub struct BuildLog {
    path: PathBuf,
    file: File,
}

impl BuildLog {
    /// Open `<dir>/<name>-build.log` for appending.
    pub fn open(dir: &Path, name: &str) -> anyhow::Result<Self> {
        fs::create_dir_all(dir)
            .with_context(|| format!("could not create log directory {}", dir.display()))?;
        let path = dir.join(format!("{}-build.log", name));
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("could not open {}", path.display()))?;
        Ok(Self { path, file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write a header for a step.
    pub fn section(&mut self, name: &str, command: &str) -> anyhow::Result<()> {
        writeln!(
            self.file,
            "==> [{}] {}\n$ {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            name,
            command
        )?;
        Ok(())
    }

    /// Write captured step output.
    pub fn output(&mut self, stdout: &str, stderr: &str) -> anyhow::Result<()> {
        if !stdout.is_empty() {
            writeln!(self.file, "{}", stdout.trim_end())?;
        }
        if !stderr.is_empty() {
            writeln!(self.file, "{}", stderr.trim_end())?;
        }
        Ok(())
    }

    /// Write a free-form line.
    pub fn note(&mut self, text: &str) -> anyhow::Result<()> {
        writeln!(self.file, "{}", text)?;
        Ok(())
    }
}
