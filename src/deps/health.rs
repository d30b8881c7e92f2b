//! Health checks confirming a dependency works at a location.

use crate::shell::{CommandOptions, ShellRunner};

/// A command and the exit code it must return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthCheck {
    pub command: String,
    pub expected: i32,
}

impl HealthCheck {
    /// Expect exit code 0 from `command`.
    pub fn zero(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            expected: 0,
        }
    }

    /// Run the check. A command that cannot be spawned fails the check.
    pub fn passes(&self, shell: &dyn ShellRunner) -> bool {
        match shell.run(&self.command, &CommandOptions::captured()) {
            Ok(result) => {
                let passed = result.exit_code == Some(self.expected);
                tracing::debug!(
                    "health check `{}` exited {:?} (expected {})",
                    self.command,
                    result.exit_code,
                    self.expected
                );
                passed
            }
            Err(e) => {
                tracing::debug!("health check `{}` could not run: {}", self.command, e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::MockShell;

    #[test]
    fn compares_exit_code_with_expected() {
        let shell = MockShell::new().respond("lmod --version", 0, "Lmod 8.7");
        assert!(HealthCheck::zero("/opt/lmod/libexec/lmod --version").passes(&shell));

        let odd = HealthCheck {
            command: "singularity".into(),
            expected: 1,
        };
        let shell = MockShell::with_default(1);
        assert!(odd.passes(&shell));
        assert!(!HealthCheck::zero("singularity").passes(&shell));
    }
}
