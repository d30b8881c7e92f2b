//! Scripted shell for testing.
//!
//! `MockShell` implements [`ShellRunner`] without touching the host. Each
//! command is recorded and answered by the first rule whose pattern is a
//! substring of the command; unmatched commands use the default exit code.
//!
//! # Example
//!
//! ```
//! use comcol::shell::{MockShell, ShellRunner};
//!
//! let shell = MockShell::new().respond("--version", 0, "3.5.3").fail_on("make");
//!
//! assert!(shell.check("/opt/bin/singularity --version"));
//! assert!(!shell.check("make install"));
//! assert_eq!(shell.commands().len(), 2);
//! ```

use std::cell::RefCell;
use std::time::Duration;

use crate::error::Result;

use super::command::{CommandOptions, CommandResult, ShellRunner};

#[derive(Debug, Clone)]
struct Rule {
    pattern: String,
    exit_code: i32,
    stdout: String,
}

/// Shell that answers from rules and records what it was asked to run.
#[derive(Debug, Default)]
pub struct MockShell {
    rules: Vec<Rule>,
    default_code: i32,
    commands: RefCell<Vec<String>>,
    cwds: RefCell<Vec<Option<std::path::PathBuf>>>,
}

impl MockShell {
    /// A shell where every unmatched command succeeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// A shell where every unmatched command exits with `code`.
    pub fn with_default(code: i32) -> Self {
        Self {
            default_code: code,
            ..Default::default()
        }
    }

    /// Answer commands containing `pattern` with an exit code and stdout.
    pub fn respond(mut self, pattern: &str, exit_code: i32, stdout: &str) -> Self {
        self.rules.push(Rule {
            pattern: pattern.to_string(),
            exit_code,
            stdout: stdout.to_string(),
        });
        self
    }

    /// Fail commands containing `pattern` with exit code 1.
    pub fn fail_on(self, pattern: &str) -> Self {
        self.respond(pattern, 1, "")
    }

    /// Succeed on commands containing `pattern`.
    pub fn succeed_on(self, pattern: &str) -> Self {
        self.respond(pattern, 0, "")
    }

    /// Every command run so far, in order.
    pub fn commands(&self) -> Vec<String> {
        self.commands.borrow().clone()
    }

    /// Working directories passed with each command, in order.
    pub fn cwds(&self) -> Vec<Option<std::path::PathBuf>> {
        self.cwds.borrow().clone()
    }

    /// Whether any recorded command contains `pattern`.
    pub fn ran(&self, pattern: &str) -> bool {
        self.commands.borrow().iter().any(|c| c.contains(pattern))
    }
}

impl ShellRunner for MockShell {
    fn run(&self, command: &str, options: &CommandOptions) -> Result<CommandResult> {
        self.commands.borrow_mut().push(command.to_string());
        self.cwds.borrow_mut().push(options.cwd.clone());

        let (code, stdout) = self
            .rules
            .iter()
            .find(|r| command.contains(&r.pattern))
            .map(|r| (r.exit_code, r.stdout.clone()))
            .unwrap_or((self.default_code, String::new()));

        Ok(if code == 0 {
            CommandResult::success(stdout, String::new(), Duration::ZERO)
        } else {
            CommandResult::failure(Some(code), stdout, String::new(), Duration::ZERO)
        })
    }
}
