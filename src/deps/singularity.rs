//! Singularity, the container runtime.

use std::path::{Path, PathBuf};

use super::build::{BuildPlan, BuildStep};
use super::context::SessionContext;
use super::health::HealthCheck;
use super::manager::Dependency;
use super::probe::{prefix_of_binary, probe_binary_prefix, system_env, EnvLookup};
use super::DependencyKind;
use crate::shell::{split_path_var, ShellRunner};

const BINARY: &str = "singularity";
const SINGULARITY_VERSION: &str = "3.8.7";
const GO_VERSION: &str = "1.21.13";

/// Container runtime tracked by its install prefix (the directory above `bin`).
pub struct Singularity {
    env: EnvLookup,
    fallback: Vec<PathBuf>,
}

impl Singularity {
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

    /// Replace the directories searched after `PATH`.
    pub fn with_fallback(mut self, dirs: Vec<PathBuf>) -> Self {
        self.fallback = dirs;
        self
    }

    fn from_lookup(env: EnvLookup) -> Self {
        Self {
            env,
            fallback: vec![PathBuf::from("/usr/local/bin"), PathBuf::from("/usr/bin")],
        }
    }

    /// Binary inside an install prefix.
    pub fn binary(prefix: &Path) -> PathBuf {
        prefix.join("bin").join(BINARY)
    }
}

impl Default for Singularity {
    fn default() -> Self {
        Self::new()
    }
}

/// Prefix a command with the Go toolchain unpacked next to the source tree.
fn with_go(command: &str) -> String {
    format!(
        "export PATH=\"$(dirname \"$PWD\")/go/bin:$PATH\" GOPATH=\"$(dirname \"$PWD\")/gopath\" && {}",
        command
    )
}

impl Dependency for Singularity {
    fn kind(&self) -> DependencyKind {
        DependencyKind::ContainerRuntime
    }

    fn probe(&self) -> Option<PathBuf> {
        let mut search = (self.env)("PATH")
            .map(|p| split_path_var(&p))
            .unwrap_or_default();
        search.extend(self.fallback.iter().cloned());
        probe_binary_prefix(BINARY, &search)
    }

    fn normalize_location(&self, path: &Path) -> PathBuf {
        prefix_of_binary(path, BINARY)
    }

    fn health_check(&self, location: &Path) -> HealthCheck {
        HealthCheck::zero(format!("{} --version", Self::binary(location).display()))
    }

    fn install_plan(&self, target: &Path, _shell: &dyn ShellRunner) -> anyhow::Result<BuildPlan> {
        let go_url = format!("https://go.dev/dl/go{GO_VERSION}.linux-amd64.tar.gz");
        let source_url = format!(
            "https://github.com/hpcng/singularity/releases/download/v{v}/singularity-{v}.tar.gz",
            v = SINGULARITY_VERSION
        );

        Ok(BuildPlan::new()
            .step(BuildStep::new(
                "download go",
                format!("curl -fsSL -o go.tar.gz {go_url}"),
            ))
            .step(BuildStep::new("extract go", "tar -xzf go.tar.gz"))
            .step(BuildStep::new(
                "download singularity",
                format!("curl -fsSL -o singularity.tar.gz {source_url}"),
            ))
            .step(BuildStep::new(
                "extract singularity",
                "mkdir -p src && tar -xzf singularity.tar.gz -C src --strip-components=1",
            ))
            .step(
                BuildStep::new(
                    "configure singularity",
                    with_go(&format!("./mconfig --prefix={}", target.display())),
                )
                .in_subdir("src"),
            )
            .step(BuildStep::new("compile singularity", with_go("make -C builddir")).in_subdir("src"))
            .step(
                BuildStep::new("install singularity", with_go("make -C builddir install"))
                    .in_subdir("src"),
            ))
    }

    fn profile_lines(&self, location: &Path, _ctx: &SessionContext, built: bool) -> Vec<String> {
        if built {
            vec![format!("export PATH={}/bin:$PATH", location.display())]
        } else {
            Vec::new()
        }
    }
}
