//! Plain UI for CI and piped output.

use std::collections::HashMap;

use crate::error::{ComcolError, Result};

use super::spinner::LineSpinner;
use super::theme::ComcolTheme;
use super::{parse_answer, Confirmation, OutputMode, SpinnerHandle, UserInterface};

const PROMPT_PREFIX: &str = "COMCOL_PROMPT_";

/// Answers prompts from `COMCOL_PROMPT_<KEY>` variables, then from the
/// prompt's default.
pub struct NonInteractiveUI {
    mode: OutputMode,
    overrides: HashMap<String, String>,
    theme: ComcolTheme,
}

impl NonInteractiveUI {
    pub fn new(mode: OutputMode) -> Self {
        let overrides = std::env::vars()
            .filter(|(k, _)| k.starts_with(PROMPT_PREFIX))
            .collect();
        Self::with_overrides(mode, overrides)
    }

    /// Create with explicit overrides (for testing).
    pub fn with_overrides(mode: OutputMode, overrides: HashMap<String, String>) -> Self {
        Self {
            mode,
            overrides,
            theme: ComcolTheme::plain(),
        }
    }
}

impl UserInterface for NonInteractiveUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        if self.mode.shows_status() {
            println!("{}", msg);
        }
    }

    fn success(&mut self, msg: &str) {
        if self.mode.shows_status() {
            println!("{}", self.theme.format_success(msg));
        }
    }

    fn warning(&mut self, msg: &str) {
        if self.mode.shows_status() {
            eprintln!("{}", self.theme.format_warning(msg));
        }
    }

    fn error(&mut self, msg: &str) {
        eprintln!("{}", self.theme.format_error(msg));
    }

    fn error_block(&mut self, title: &str, body: &str) {
        eprintln!("{}", self.theme.format_block(title, body));
    }

    fn confirm(&mut self, prompt: &Confirmation) -> Result<bool> {
        let env_key = format!("{}{}", PROMPT_PREFIX, prompt.key.to_uppercase());
        match self.overrides.get(&env_key) {
            Some(value) => parse_answer(value).ok_or_else(|| ComcolError::InvalidSettings {
                message: format!("{} must be yes or no, got '{}'", env_key, value),
            }),
            None => Ok(prompt.default),
        }
    }

    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle> {
        if self.mode.shows_status() {
            println!("  {}", message);
        }
        Box::new(LineSpinner::new(self.mode.shows_spinners()))
    }

    fn show_header(&mut self, title: &str) {
        if self.mode.shows_status() {
            println!("\n{}\n", self.theme.format_header(title));
        }
    }

    fn is_interactive(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ui(pairs: &[(&str, &str)]) -> NonInteractiveUI {
        let overrides = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        NonInteractiveUI::with_overrides(OutputMode::Silent, overrides)
    }

    #[test]
    fn confirm_uses_default_without_override() {
        let mut ui = ui(&[]);
        assert!(!ui.confirm(&Confirmation::new("clean", "Delete?")).unwrap());
        assert!(ui
            .confirm(&Confirmation::new("clean", "Delete?").default_yes())
            .unwrap());
    }

    #[test]
    fn confirm_reads_env_override() {
        let mut ui = ui(&[("COMCOL_PROMPT_BASHRC", "yes")]);
        assert!(ui.confirm(&Confirmation::new("bashrc", "Edit?")).unwrap());
    }

    #[test]
    fn unparseable_override_is_an_error() {
        let mut ui = ui(&[("COMCOL_PROMPT_CLEAN", "perhaps")]);
        assert!(ui.confirm(&Confirmation::new("clean", "Delete?")).is_err());
    }

    #[test]
    fn is_never_interactive() {
        assert!(!ui(&[]).is_interactive());
    }
}
