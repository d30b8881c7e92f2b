//! Privilege checks for the container runtime.
//!
//! Unprivileged users can only run Singularity when its `starter-suid`
//! helper is setuid root and its configuration files are root-owned.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ComcolError, Result};
use crate::shell::{CommandOptions, ShellRunner};

const STARTER: &str = "libexec/singularity/bin/starter-suid";
const ETC_FILES: &[&str] = &["singularity.conf", "capability.json", "ecl.toml"];
const SETUID_MODE: u32 = 0o4755;

/// One inspected file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub path: PathBuf,
    /// `None` when the file is fine.
    pub problem: Option<String>,
}

/// Result of inspecting a runtime install.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapabilityReport {
    pub findings: Vec<Finding>,
    /// Commands that would fix ownership and mode, in order.
    pub fixes: Vec<String>,
}

impl CapabilityReport {
    /// Inspect the runtime installed at `prefix`.
    pub fn inspect(prefix: &Path) -> Self {
        let mut report = Self::default();

        let starter = prefix.join(STARTER);
        match stat(&starter) {
            None => report.missing(&starter),
            Some((uid, mode)) => {
                let mut problems = Vec::new();
                if uid != 0 {
                    problems.push(format!("owned by uid {}", uid));
                    report.fixes.push(format!("chown root:root {}", starter.display()));
                }
                // chown clears the setuid bit, so chmod follows any chown
                if uid != 0 || mode != SETUID_MODE {
                    if mode != SETUID_MODE {
                        problems.push(format!("mode {:o}", mode));
                    }
                    report.fixes.push(format!("chmod 4755 {}", starter.display()));
                }
                report.record(&starter, problems);
            }
        }

        let etc = etc_dir(prefix);
        for name in ETC_FILES {
            let path = etc.join(name);
            match stat(&path) {
                None => report.missing(&path),
                Some((uid, _)) if uid != 0 => {
                    report.fixes.push(format!("chown root:root {}", path.display()));
                    report.record(&path, vec![format!("owned by uid {}", uid)]);
                }
                Some(_) => report.record(&path, Vec::new()),
            }
        }

        report
    }

    /// Everything exists and nothing needs fixing.
    pub fn is_capable(&self) -> bool {
        self.findings.iter().all(|f| f.problem.is_none())
    }

    /// Whether a file the runtime needs is absent.
    pub fn has_missing(&self) -> bool {
        self.findings
            .iter()
            .any(|f| f.problem.as_deref() == Some("missing"))
    }

    /// Run the fixes in order, stopping at the first failure.
    pub fn apply(&self, shell: &dyn ShellRunner) -> Result<()> {
        for command in &self.fixes {
            tracing::info!("running {}", command);
            let result = shell.run(command, &CommandOptions::captured())?;
            if !result.success {
                return Err(ComcolError::CommandFailed {
                    command: command.clone(),
                    code: result.exit_code,
                });
            }
        }
        Ok(())
    }

    fn missing(&mut self, path: &Path) {
        self.findings.push(Finding {
            path: path.to_path_buf(),
            problem: Some("missing".to_string()),
        });
    }

    fn record(&mut self, path: &Path, problems: Vec<String>) {
        self.findings.push(Finding {
            path: path.to_path_buf(),
            problem: if problems.is_empty() {
                None
            } else {
                Some(problems.join(", "))
            },
        });
    }
}

/// Configuration directory for a runtime prefix.
pub fn etc_dir(prefix: &Path) -> PathBuf {
    if prefix == Path::new("/usr") {
        PathBuf::from("/etc/singularity")
    } else {
        prefix.join("etc/singularity")
    }
}

#[cfg(unix)]
fn stat(path: &Path) -> Option<(u32, u32)> {
    use std::os::unix::fs::MetadataExt;
    let meta = fs::metadata(path).ok()?;
    Some((meta.uid(), meta.mode() & 0o7777))
}

#[cfg(not(unix))]
fn stat(path: &Path) -> Option<(u32, u32)> {
    fs::metadata(path).ok().map(|_| (0, SETUID_MODE))
}
