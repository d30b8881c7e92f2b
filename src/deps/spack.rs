//! Spack, the optional package manager.

use anyhow::Context;
use std::path::{Path, PathBuf};

use super::build::{BuildPlan, BuildStep};
use super::context::SessionContext;
use super::health::HealthCheck;
use super::manager::Dependency;
use super::probe::{probe_location, system_env, EnvHint, EnvLookup};
use super::DependencyKind;
use crate::shell::ShellRunner;

const REPOSITORY: &str = "https://github.com/spack/spack.git";
const COMMAND: &str = "bin/spack";

pub struct Spack {
    env: EnvLookup,
    defaults: Vec<PathBuf>,
}

impl Spack {
    pub fn new() -> Self {
        Self::from_lookup(system_env())
    }

    /// Use `env` instead of the process environment.
    pub fn with_env<F>(env: F) -> Self
    where
        F: Fn(&str) -> Option<String> + 'static,
    {
        Self::from_lookup(Box::new(env))
    }

    pub fn with_defaults(mut self, defaults: Vec<PathBuf>) -> Self {
        self.defaults = defaults;
        self
    }

    fn from_lookup(env: EnvLookup) -> Self {
        let defaults = dirs::home_dir()
            .map(|home| vec![home.join("spack")])
            .unwrap_or_default();
        Self { env, defaults }
    }
}

impl Default for Spack {
    fn default() -> Self {
        Self::new()
    }
}

impl Dependency for Spack {
    fn kind(&self) -> DependencyKind {
        DependencyKind::PackageManager
    }

    fn probe(&self) -> Option<PathBuf> {
        let hints = [EnvHint {
            var: "SPACK_ROOT",
            levels_up: 0,
        }];
        probe_location(&hints, &self.defaults, COMMAND, &*self.env)
    }

    fn health_check(&self, location: &Path) -> HealthCheck {
        HealthCheck::zero(format!("{} --version", location.join(COMMAND).display()))
    }

    fn validate_build_path(&self, target: &Path) -> Result<(), String> {
        match target.file_name() {
            Some(name) if name == "spack" => Ok(()),
            _ => Err(format!("{} must end in `spack`", target.display())),
        }
    }

    fn install_plan(&self, target: &Path, _shell: &dyn ShellRunner) -> anyhow::Result<BuildPlan> {
        let parent = target
            .parent()
            .with_context(|| format!("{} has no parent directory", target.display()))?;
        Ok(BuildPlan::new()
            .step(BuildStep::new(
                "clone spack",
                format!("git clone --depth 1 {} spack", REPOSITORY),
            ))
            .step(BuildStep::new(
                "place spack",
                format!(
                    "mkdir -p {} && mv spack {}",
                    parent.display(),
                    target.display()
                ),
            )))
    }

    fn profile_lines(&self, location: &Path, _ctx: &SessionContext, _built: bool) -> Vec<String> {
        vec![format!(
            "source {}/share/spack/setup-env.sh",
            location.display()
        )]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DependencyBlock, Settings, SPACK_SENTINEL};
    use crate::deps::{DependencyManager, DependencyStatus};
    use crate::shell::MockShell;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn probes_spack_root() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("spack");
        fs::create_dir_all(root.join("bin")).unwrap();
        fs::write(root.join(COMMAND), "").unwrap();
        let value = root.display().to_string();

        let spack =
            Spack::with_env(move |k| (k == "SPACK_ROOT").then(|| value.clone())).with_defaults(vec![]);
        assert_eq!(spack.probe(), Some(root));
    }

    #[test]
    fn detected_spack_stages_setup_env() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("spack");
        fs::create_dir_all(root.join("bin")).unwrap();
        fs::write(root.join(COMMAND), "").unwrap();

        let mut settings = Settings::default();
        settings.spack = Some(DependencyBlock {
            root: Some(SPACK_SENTINEL.into()),
            ..Default::default()
        });
        let mut ctx = SessionContext::new(settings, temp.path());
        let spack = Spack::with_env(|_| None).with_defaults(vec![root.clone()]);
        let shell = MockShell::new();

        let state = DependencyManager::new(&spack, &shell).run(&mut ctx);

        assert_eq!(state.status, DependencyStatus::Ready);
        assert_eq!(state.location, Some(root.clone()));
        assert_eq!(
            ctx.settings.profile.unwrap().mods["spack"],
            vec![format!("source {}/share/spack/setup-env.sh", root.display())]
        );
    }

    #[test]
    fn install_plan_clones_then_moves() {
        let spack = Spack::with_env(|_| None);
        let plan = spack
            .install_plan(Path::new("/work/spack"), &MockShell::new())
            .unwrap();
        assert_eq!(plan.steps.len(), 2);
        assert!(plan.steps[0].command.starts_with("git clone --depth 1"));
        assert_eq!(plan.steps[1].command, "mkdir -p /work && mv spack /work/spack");
    }

    #[test]
    fn build_path_must_end_in_spack() {
        let spack = Spack::with_env(|_| None);
        assert!(spack.validate_build_path(Path::new("./tools")).is_err());
        assert!(spack.validate_build_path(Path::new("/opt/spack")).is_ok());
    }
}
