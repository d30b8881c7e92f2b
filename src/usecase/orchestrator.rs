//! One refresh pass: resolve dependencies, then generate modulefiles.

use anyhow::anyhow;
use std::collections::BTreeSet;
use std::path::PathBuf;

use super::case::CaseRecord;
use crate::config::SettingsFile;
use crate::deps::{
    Dependency, DependencyKind, DependencyManager, DependencyState, ErrorRecord, Lmod,
    SessionContext, Singularity, Spack,
};
use crate::error::{ComcolError, Result};
use crate::modules::{EmitReport, ModuleEmitter, ModuleRequest};
use crate::shell::ShellRunner;
use crate::version::{resolve, select, ResolverPolicy, Selection, TagSource};

/// Where a pass stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Dependencies need user edits; nothing was generated.
    Blocked,
    /// Dependencies are ready and modules were processed.
    Advanced,
}

/// Options for one pass.
#[derive(Debug, Clone, Copy)]
pub struct RefreshOptions {
    /// Resolve everything but write no modulefiles.
    pub dry_run: bool,
    pub selection: Selection,
}

impl Default for RefreshOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            selection: Selection::All,
        }
    }
}

/// What happened to one whitelist entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleOutcome {
    pub name: String,
    pub constraint: String,
    pub versions: Vec<String>,
    /// `None` in dry runs and when resolution failed.
    pub report: Option<EmitReport>,
}

/// Result of a pass. Errors live in the context's registry.
#[derive(Debug, Clone)]
pub struct Outcome {
    pub phase: Phase,
    pub states: Vec<DependencyState>,
    pub case: Option<CaseRecord>,
    pub modules: Vec<ModuleOutcome>,
}

impl Outcome {
    /// Turn a pass that left errors behind into the "edit settings" error.
    pub fn into_result(self, ctx: &SessionContext, settings_path: PathBuf) -> Result<Self> {
        if ctx.errors.is_empty() {
            Ok(self)
        } else {
            Err(ComcolError::UserEditRequired {
                path: settings_path,
            })
        }
    }
}

/// Sequences dependency managers and module generation.
pub struct Orchestrator<'a> {
    shell: &'a dyn ShellRunner,
    tags: &'a dyn TagSource,
    dependencies: Vec<Box<dyn Dependency>>,
}

impl<'a> Orchestrator<'a> {
    /// Orchestrator for the host's Singularity, Lmod and Spack.
    pub fn new(shell: &'a dyn ShellRunner, tags: &'a dyn TagSource) -> Self {
        Self::with_dependencies(
            shell,
            tags,
            vec![
                Box::new(Singularity::new()),
                Box::new(Lmod::new()),
                Box::new(Spack::new()),
            ],
        )
    }

    pub fn with_dependencies(
        shell: &'a dyn ShellRunner,
        tags: &'a dyn TagSource,
        dependencies: Vec<Box<dyn Dependency>>,
    ) -> Self {
        Self {
            shell,
            tags,
            dependencies,
        }
    }

    /// Run a full pass and save the settings document.
    ///
    /// Dependency failures are registered in `ctx.errors` and halt before
    /// module generation. Failures saving settings or writing modulefiles
    /// propagate.
    pub fn refresh(
        &self,
        ctx: &mut SessionContext,
        settings: &SettingsFile,
        options: RefreshOptions,
    ) -> Result<Outcome> {
        let states = self.gather(ctx)?;

        if !ctx.errors.is_empty() {
            tracing::info!("{} dependency error(s), halting", ctx.errors.len());
            settings.save(&ctx.settings)?;
            return Ok(Outcome {
                phase: Phase::Blocked,
                states,
                case: None,
                modules: Vec::new(),
            });
        }

        let case = self.case_record(ctx, &states)?;
        let modules = self.generate(ctx, &case, options)?;
        settings.save(&ctx.settings)?;

        Ok(Outcome {
            phase: Phase::Advanced,
            states,
            case: Some(case),
            modules,
        })
    }

    /// Resolve every configured dependency in order.
    fn gather(&self, ctx: &mut SessionContext) -> Result<Vec<DependencyState>> {
        let mut seen = BTreeSet::new();
        let mut states = Vec::new();

        for dependency in &self.dependencies {
            let kind = dependency.kind();
            if !seen.insert(kind) {
                return Err(anyhow!("two dependency managers claim {}", kind).into());
            }
            if kind == DependencyKind::PackageManager && ctx.settings.spack.is_none() {
                tracing::debug!("spack not configured, skipping");
                continue;
            }
            let state = DependencyManager::new(dependency.as_ref(), self.shell).run(ctx);
            tracing::debug!("{} resolved to {:?}", kind, state.status);
            states.push(state);
        }
        Ok(states)
    }

    fn case_record(&self, ctx: &SessionContext, states: &[DependencyState]) -> Result<CaseRecord> {
        let location = |kind: DependencyKind| {
            states
                .iter()
                .find(|s| s.identity == kind)
                .and_then(|s| s.location.clone())
        };
        let required = |kind: DependencyKind| {
            location(kind).ok_or_else(|| {
                ComcolError::from(anyhow!("{} is not ready but no error was registered", kind))
            })
        };

        Ok(CaseRecord {
            singularity: required(DependencyKind::ContainerRuntime)?,
            lmod: required(DependencyKind::ModuleSystem)?,
            modulefiles: Lmod::modulefiles_dir(ctx),
            spack: location(DependencyKind::PackageManager),
        })
    }

    /// Resolve versions for every whitelist entry and write modulefiles.
    fn generate(
        &self,
        ctx: &mut SessionContext,
        case: &CaseRecord,
        options: RefreshOptions,
    ) -> Result<Vec<ModuleOutcome>> {
        let images = ctx
            .settings
            .images
            .clone()
            .unwrap_or_else(|| "~/.cc_images".to_string());
        let emitter = ModuleEmitter::new(&case.modulefiles, &images);
        if !options.dry_run {
            emitter.prepare(&case.singularity)?;
        }

        let policy = ResolverPolicy {
            prefer_no_suffix: ctx.settings.prefer_no_suffix(),
        };
        let mut outcomes = Vec::new();

        for request in ModuleRequest::all_from(&ctx.settings) {
            let key = format!("whitelist:{}", request.name);
            let constraint = request.constraint();

            let tags = match self.tags.list_tags(&request) {
                Ok(tags) => tags,
                Err(e) => {
                    Self::whitelist_error(ctx, &request.name, key, e.to_string());
                    continue;
                }
            };

            let versions = select(resolve(&constraint, &tags, policy), options.selection);
            if versions.is_empty() {
                let err = ComcolError::UnsatisfiedVersion {
                    name: request.name.clone(),
                    constraint: constraint.to_string(),
                    repo: request.source_prefix().trim_end_matches(':').to_string(),
                };
                Self::whitelist_error(ctx, &request.name, key, err.to_string());
                continue;
            }
            if let Some(entry) = ctx.settings.whitelist.get_mut(&request.name) {
                entry.clear_error();
            }

            let report = if options.dry_run {
                None
            } else {
                Some(emitter.emit(&request, &versions)?)
            };
            tracing::info!("{}: {}", request.name, versions.join(", "));
            outcomes.push(ModuleOutcome {
                name: request.name.clone(),
                constraint: constraint.to_string(),
                versions,
                report,
            });
        }
        Ok(outcomes)
    }

    /// Register the error and note it on the settings entry.
    fn whitelist_error(ctx: &mut SessionContext, name: &str, key: String, message: String) {
        if let Some(entry) = ctx.settings.whitelist.get_mut(name) {
            entry.mark_error(&message);
        }
        ctx.errors.register(key, ErrorRecord::needs_edit(message));
    }
}
