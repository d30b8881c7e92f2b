//! User interface abstraction.
//!
//! Everything the commands print goes through [`UserInterface`], so the same
//! command code drives a terminal, a CI log or a test capture.

pub mod mock;
pub mod non_interactive;
pub mod output;
pub mod prompts;
pub mod spinner;
pub mod terminal;
pub mod theme;

pub use mock::MockUI;
pub use non_interactive::NonInteractiveUI;
pub use output::OutputMode;
pub use prompts::confirm_on;
pub use spinner::ProgressSpinner;
pub use terminal::TerminalUI;
pub use theme::{should_use_colors, ComcolTheme};

use crate::error::Result;

/// Abstract interface for user interaction.
pub trait UserInterface {
    fn output_mode(&self) -> OutputMode;

    /// Display a plain message.
    fn message(&mut self, msg: &str);

    fn success(&mut self, msg: &str);

    fn warning(&mut self, msg: &str);

    /// Errors are shown in every output mode.
    fn error(&mut self, msg: &str);

    /// Show a titled block of multi-line text, such as a captured trace.
    fn error_block(&mut self, title: &str, body: &str);

    /// Ask a yes/no question.
    fn confirm(&mut self, prompt: &Confirmation) -> Result<bool>;

    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle>;

    fn show_header(&mut self, title: &str);

    fn is_interactive(&self) -> bool;
}

/// Handle for controlling a running spinner.
pub trait SpinnerHandle {
    fn set_message(&mut self, msg: &str);

    fn finish_success(&mut self, msg: &str);

    fn finish_error(&mut self, msg: &str);
}

/// A yes/no question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
    /// Key used for environment overrides and mock responses.
    pub key: String,
    pub question: String,
    pub default: bool,
}

impl Confirmation {
    pub fn new(key: &str, question: &str) -> Self {
        Self {
            key: key.to_string(),
            question: question.to_string(),
            default: false,
        }
    }

    pub fn default_yes(mut self) -> Self {
        self.default = true;
        self
    }
}

/// Interpret a textual answer. Unknown text yields `None`.
pub fn parse_answer(answer: &str) -> Option<bool> {
    match answer.trim().to_lowercase().as_str() {
        "y" | "yes" | "true" | "1" => Some(true),
        "n" | "no" | "false" | "0" => Some(false),
        _ => None,
    }
}

/// Pick the UI for the current invocation.
pub fn create_ui(interactive: bool, mode: OutputMode) -> Box<dyn UserInterface> {
    if interactive && console::Term::stdout().is_term() {
        Box::new(TerminalUI::new(mode))
    } else {
        Box::new(NonInteractiveUI::new(mode))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confirmation_defaults_to_no() {
        let prompt = Confirmation::new("clean", "Delete these files?");
        assert!(!prompt.default);
        assert!(prompt.default_yes().default);
    }

    #[test]
    fn parse_answer_variants() {
        assert_eq!(parse_answer("Y"), Some(true));
        assert_eq!(parse_answer(" yes "), Some(true));
        assert_eq!(parse_answer("false"), Some(false));
        assert_eq!(parse_answer("maybe"), None);
    }
}
