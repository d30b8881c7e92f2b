//! Lmod, the environment module system.
//!
//! Lmod is tracked by the directory it was configured into. Its `configure`
//! places the real install under `<root>/lmod`, so the root must itself be
//! named `lmod` and the installer is pointed at the root's parent.

use anyhow::Context;
use std::path::{Path, PathBuf};

use super::build::{BuildPlan, BuildStep};
use super::context::SessionContext;
use super::health::HealthCheck;
use super::manager::Dependency;
use super::probe::{probe_location, system_env, EnvHint, EnvLookup};
use super::DependencyKind;
use crate::config::DEFAULT_MODULEFILES;
use crate::shell::ShellRunner;

const LMOD_VERSION: &str = "8.7.32";
const LUA_URL: &str = "https://downloads.sourceforge.net/project/lmod/lua-5.1.4.9.tar.bz2";
const LUA_MODULES: &[&str] = &["posix", "lfs"];
const COMMAND: &str = "lmod/libexec/lmod";

const ENV_HINTS: &[EnvHint] = &[
    EnvHint {
        var: "LMOD_CMD",
        levels_up: 3,
    },
    EnvHint {
        var: "LMOD_DIR",
        levels_up: 2,
    },
];

pub struct Lmod {
    env: EnvLookup,
    defaults: Vec<PathBuf>,
}

impl Lmod {
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

    /// Replace the well-known install roots.
    pub fn with_defaults(mut self, defaults: Vec<PathBuf>) -> Self {
        self.defaults = defaults;
        self
    }

    fn from_lookup(env: EnvLookup) -> Self {
        Self {
            env,
            defaults: vec![
                PathBuf::from("/usr/share/lmod"),
                PathBuf::from("/opt/apps/lmod"),
                PathBuf::from("/usr/local/lmod"),
            ],
        }
    }

    /// Where generated modulefiles live, from the settings.
    pub fn modulefiles_dir(ctx: &SessionContext) -> PathBuf {
        let raw = ctx
            .settings
            .lmod
            .as_ref()
            .and_then(|b| b.modulefiles.as_deref())
            .unwrap_or(DEFAULT_MODULEFILES);
        ctx.resolve(raw)
    }

    /// Script checking that `lua` can load the modules Lmod needs.
    fn lua_check() -> String {
        let requires: Vec<String> = LUA_MODULES
            .iter()
            .map(|m| format!("require('{}')", m))
            .collect();
        format!("lua -e \"{}\"", requires.join("; "))
    }
}

impl Default for Lmod {
    fn default() -> Self {
        Self::new()
    }
}

impl Dependency for Lmod {
    fn kind(&self) -> DependencyKind {
        DependencyKind::ModuleSystem
    }

    fn probe(&self) -> Option<PathBuf> {
        probe_location(ENV_HINTS, &self.defaults, COMMAND, &*self.env)
    }

    fn health_check(&self, location: &Path) -> HealthCheck {
        HealthCheck::zero(format!("{} --version", location.join(COMMAND).display()))
    }

    fn validate_build_path(&self, target: &Path) -> Result<(), String> {
        match target.file_name() {
            Some(name) if name == "lmod" => Ok(()),
            _ => Err(format!(
                "{} must end in `lmod` because Lmod installs itself into a directory of that name",
                target.display()
            )),
        }
    }

    fn install_plan(&self, target: &Path, shell: &dyn ShellRunner) -> anyhow::Result<BuildPlan> {
        let parent = target
            .parent()
            .with_context(|| format!("{} has no parent directory", target.display()))?;
        let mut plan = BuildPlan::new();

        if !shell.check(&Self::lua_check()) {
            tracing::info!(
                "installing Lua because one of {} is missing",
                LUA_MODULES.join(", ")
            );
            let lua_prefix = parent.join("lua");
            plan = plan
                .step(BuildStep::new(
                    "download lua",
                    format!("curl -fsSL -o lua.tar.bz2 {}", LUA_URL),
                ))
                .step(BuildStep::new(
                    "extract lua",
                    "mkdir -p lua-src && tar -xjf lua.tar.bz2 -C lua-src --strip-components=1",
                ))
                .step(
                    BuildStep::new(
                        "configure lua",
                        format!("./configure --with-static=yes --prefix={}", lua_prefix.display()),
                    )
                    .in_subdir("lua-src"),
                )
                .step(BuildStep::new("compile lua", "make").in_subdir("lua-src"))
                .step(BuildStep::new("install lua", "make install").in_subdir("lua-src"));

            let path = (self.env)("PATH").unwrap_or_default();
            plan = plan.env("PATH", format!("{}/bin:{}", lua_prefix.display(), path));
        }

        let url = format!("https://github.com/TACC/Lmod/archive/refs/tags/{LMOD_VERSION}.tar.gz");
        Ok(plan
            .step(BuildStep::new(
                "download lmod",
                format!("curl -fsSL -o lmod.tar.gz {}", url),
            ))
            .step(BuildStep::new(
                "extract lmod",
                "mkdir -p lmod-src && tar -xzf lmod.tar.gz -C lmod-src --strip-components=1",
            ))
            .step(
                BuildStep::new(
                    "configure lmod",
                    format!("./configure --prefix={}", parent.display()),
                )
                .in_subdir("lmod-src"),
            )
            .step(BuildStep::new("install lmod", "make install").in_subdir("lmod-src")))
    }

    fn profile_lines(&self, location: &Path, ctx: &SessionContext, _built: bool) -> Vec<String> {
        vec![
            format!("export MODULEPATH={}", Self::modulefiles_dir(ctx).display()),
            format!("source {}/lmod/init/bash", location.display()),
        ]
    }
}
