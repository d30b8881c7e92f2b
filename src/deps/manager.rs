//! The detect/build/report state machine shared by all dependencies.

use anyhow::bail;
use std::path::{Path, PathBuf};

use super::build::{BuildLog, BuildPlan};
use super::context::SessionContext;
use super::errors::ErrorRecord;
use super::health::HealthCheck;
use super::{
    BuildRequest, DependencyKind, DependencyState, DependencyStatus, DetectRequest,
    ErrorAckRequest, RequestedMode, ResolutionRequest,
};
use crate::config::DependencyBlock;
use crate::shell::ShellRunner;

/// What a manager needs to know about one concrete dependency.
pub trait Dependency {
    fn kind(&self) -> DependencyKind;

    /// Look for an existing install without any user hint.
    fn probe(&self) -> Option<PathBuf>;

    /// Turn a user-supplied path into the location the dependency is tracked by.
    fn normalize_location(&self, path: &Path) -> PathBuf {
        path.to_path_buf()
    }

    /// Command proving the dependency works at `location`.
    fn health_check(&self, location: &Path) -> HealthCheck;

    /// Check a build target before anything is installed.
    fn validate_build_path(&self, _target: &Path) -> Result<(), String> {
        Ok(())
    }

    /// Steps installing the dependency at `target`.
    fn install_plan(&self, target: &Path, shell: &dyn ShellRunner) -> anyhow::Result<BuildPlan>;

    /// Shell-init lines that make the dependency available in new shells.
    fn profile_lines(&self, location: &Path, ctx: &SessionContext, built: bool) -> Vec<String>;
}

/// Drives one [`Dependency`] to `Ready`, `NeedsEdit` or `Failed`.
pub struct DependencyManager<'a> {
    dependency: &'a dyn Dependency,
    shell: &'a dyn ShellRunner,
}

impl<'a> DependencyManager<'a> {
    pub fn new(dependency: &'a dyn Dependency, shell: &'a dyn ShellRunner) -> Self {
        Self { dependency, shell }
    }

    pub fn kind(&self) -> DependencyKind {
        self.dependency.kind()
    }

    /// Classify the settings block for this dependency and resolve it.
    pub fn run(&self, ctx: &mut SessionContext) -> DependencyState {
        let kind = self.kind();
        match ResolutionRequest::from_block(kind, ctx.settings.block(kind)) {
            Ok(request) => self.resolve(request, ctx),
            Err(message) => {
                let mut state = DependencyState::new(kind);
                self.needs_edit(&mut state, ctx, ErrorRecord::needs_edit(message));
                state
            }
        }
    }

    /// Dispatch a request to its entry point.
    pub fn resolve(&self, request: ResolutionRequest, ctx: &mut SessionContext) -> DependencyState {
        tracing::debug!("resolving {} via {:?}", self.kind(), request.mode());
        match request {
            ResolutionRequest::Detect(DetectRequest { path_hint }) => {
                self.detect(path_hint.as_deref(), ctx)
            }
            ResolutionRequest::Build(BuildRequest { target }) => self.build(&target, ctx),
            ResolutionRequest::ErrorAck(ErrorAckRequest { message }) => {
                self.error_null(&message, ctx)
            }
        }
    }

    /// Locate an existing install. `None` means auto-detect.
    pub fn detect(&self, path_hint: Option<&str>, ctx: &mut SessionContext) -> DependencyState {
        let kind = self.kind();
        let label = kind.label();
        let mut state = DependencyState::new(kind);
        state.requested_mode = Some(RequestedMode::Detect);

        let Some(raw) = path_hint else {
            tracing::info!("detecting {}", label);
            let found = self
                .dependency
                .probe()
                .filter(|location| self.dependency.health_check(location).passes(self.shell));

            if let Some(location) = found {
                tracing::info!("found {} at {}", label, location.display());
                self.ready(&mut state, ctx, location, false);
                return state;
            }

            let suggestion = kind.default_build_path();
            ctx.set_block(
                kind,
                DependencyBlock {
                    build: Some(suggestion.clone()),
                    error: Some(format!(
                        "Cannot find {label}. Delete this line to build it at `{suggestion}` \
                         (or change `build`), or replace `build` with `{}: /path/to/{}`.",
                        kind.location_key(),
                        kind.key()
                    )),
                    ..Default::default()
                },
            );
            self.needs_edit(
                &mut state,
                ctx,
                ErrorRecord::needs_edit(format!(
                    "{label} needs a build path from the user (suggested `build: {suggestion}`)"
                )),
            );
            return state;
        };

        let location = self.dependency.normalize_location(&ctx.resolve(raw));
        if !location.exists() {
            self.reject_path(
                &mut state,
                ctx,
                raw,
                format!("cannot find user-specified {label} path {}", location.display()),
            );
            return state;
        }

        if !self.dependency.health_check(&location).passes(self.shell) {
            self.reject_path(
                &mut state,
                ctx,
                raw,
                format!(
                    "cannot confirm {label} at {} despite user-specified path",
                    location.display()
                ),
            );
            return state;
        }

        tracing::info!("confirmed {} at {}", label, location.display());
        self.ready(&mut state, ctx, location, false);
        state
    }

    /// Install at `target`, or adopt an earlier install already there.
    pub fn build(&self, target_raw: &str, ctx: &mut SessionContext) -> DependencyState {
        let kind = self.kind();
        let label = kind.label();
        let mut state = DependencyState::new(kind);
        state.requested_mode = Some(RequestedMode::Build);

        let target = ctx.resolve(target_raw);
        if let Err(message) = self.dependency.validate_build_path(&target) {
            ctx.set_block(
                kind,
                DependencyBlock {
                    build: Some(target_raw.to_string()),
                    error: Some(format!("Invalid build path: {message}. Fix `build` and delete this line.")),
                    ..Default::default()
                },
            );
            self.needs_edit(
                &mut state,
                ctx,
                ErrorRecord::needs_edit(format!("invalid {label} build path {target_raw}: {message}")),
            );
            return state;
        }

        if target.exists() && self.dependency.health_check(&target).passes(self.shell) {
            tracing::info!("{} already installed at {}", label, target.display());
            self.ready(&mut state, ctx, target, true);
            return state;
        }

        let log_path = ctx.logs_dir().join(format!("{}-build.log", kind.key()));
        match self.install(&target, ctx) {
            Ok(()) => {
                tracing::info!("built {} at {}", label, target.display());
                self.ready(&mut state, ctx, target, true);
            }
            Err(err) => {
                tracing::warn!("{} build failed: {:#}", label, err);
                ctx.set_block(
                    kind,
                    DependencyBlock {
                        build: Some(target_raw.to_string()),
                        error: Some(format!(
                            "Building {label} failed, see diagnostic log {}. Delete this line to retry.",
                            log_path.display()
                        )),
                        ..Default::default()
                    },
                );
                let record = ErrorRecord::from_failure(&err);
                ctx.errors.register(kind.key(), record.clone());
                state.status = DependencyStatus::Failed;
                state.error = Some(record);
            }
        }
        state
    }

    /// The settings still carry an error the user has not acted on.
    pub fn error_null(&self, message: &str, ctx: &mut SessionContext) -> DependencyState {
        let kind = self.kind();
        let mut state = DependencyState::new(kind);
        state.requested_mode = Some(RequestedMode::ErrorAck);
        tracing::debug!("{} still carries an error: {}", kind, message);
        self.needs_edit(
            &mut state,
            ctx,
            ErrorRecord::needs_edit(format!(
                "{} needs a user edit: {}",
                kind.label(),
                message
            )),
        );
        state
    }

    fn install(&self, target: &Path, ctx: &SessionContext) -> anyhow::Result<()> {
        let mut log = BuildLog::open(&ctx.logs_dir(), self.kind().key())?;
        log.note(&format!("building {} at {}", self.kind().label(), target.display()))?;

        let plan = self.dependency.install_plan(target, self.shell)?;
        plan.run(self.shell, &mut log)?;

        let check = self.dependency.health_check(target);
        if !check.passes(self.shell) {
            log.note(&format!("health check failed: {}", check.command))?;
            bail!(
                "{} installed at {} but `{}` did not exit {}",
                self.kind().label(),
                target.display(),
                check.command,
                check.expected
            );
        }
        Ok(())
    }

    fn ready(
        &self,
        state: &mut DependencyState,
        ctx: &mut SessionContext,
        location: PathBuf,
        built: bool,
    ) {
        let kind = self.kind();
        ctx.set_location(kind, &location);
        ctx.errors.clear(kind.key());
        let lines = self.dependency.profile_lines(&location, ctx, built);
        ctx.stage_profile(kind, lines);

        state.location = Some(location);
        state.status = DependencyStatus::Ready;
        state.error = None;
    }

    fn reject_path(
        &self,
        state: &mut DependencyState,
        ctx: &mut SessionContext,
        raw: &str,
        message: String,
    ) {
        let kind = self.kind();
        let mut block = DependencyBlock {
            error: Some(format!(
                "{message}. Fix `{}` or replace it with `build: {}`, then delete this line.",
                kind.location_key(),
                kind.default_build_path()
            )),
            ..Default::default()
        };
        match kind.location_key() {
            "path" => block.path = Some(raw.to_string()),
            _ => block.root = Some(raw.to_string()),
        }
        ctx.set_block(kind, block);
        self.needs_edit(state, ctx, ErrorRecord::needs_edit(message));
    }

    fn needs_edit(&self, state: &mut DependencyState, ctx: &mut SessionContext, record: ErrorRecord) {
        ctx.errors.register(self.kind().key(), record.clone());
        state.status = DependencyStatus::NeedsEdit;
        state.error = Some(record);
    }
}
