//! Mock UI for testing.
//!
//! `MockUI` captures every interaction for later assertion and answers
//! confirmations from configured responses.
//!
//! # Example
//!
//! ```
//! use comcol::ui::{Confirmation, MockUI, UserInterface};
//!
//! let mut ui = MockUI::new();
//! ui.set_confirm_response("clean", true);
//!
//! ui.message("Removing modulefiles");
//! assert!(ui.confirm(&Confirmation::new("clean", "Delete?")).unwrap());
//! assert_eq!(ui.messages(), ["Removing modulefiles"]);
//! assert_eq!(ui.prompts_shown(), ["clean"]);
//! ```

use std::collections::HashMap;

use crate::error::Result;

use super::{Confirmation, OutputMode, SpinnerHandle, UserInterface};

#[derive(Debug, Default)]
pub struct MockUI {
    mode: OutputMode,
    interactive: bool,
    messages: Vec<String>,
    successes: Vec<String>,
    warnings: Vec<String>,
    errors: Vec<String>,
    error_blocks: Vec<(String, String)>,
    headers: Vec<String>,
    spinners: Vec<String>,
    confirm_responses: HashMap<String, bool>,
    prompts_shown: Vec<String>,
}

impl MockUI {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mode: OutputMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    /// Answer confirmations with `key`. Unset keys get the prompt default.
    pub fn set_confirm_response(&mut self, key: &str, answer: bool) {
        self.confirm_responses.insert(key.to_string(), answer);
    }

    pub fn set_interactive(&mut self, interactive: bool) {
        self.interactive = interactive;
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn successes(&self) -> &[String] {
        &self.successes
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Captured `(title, body)` pairs.
    pub fn error_blocks(&self) -> &[(String, String)] {
        &self.error_blocks
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn spinners(&self) -> &[String] {
        &self.spinners
    }

    /// Keys of confirmations asked, in order.
    pub fn prompts_shown(&self) -> &[String] {
        &self.prompts_shown
    }

    /// Whether any captured output contains `needle`.
    pub fn has_output(&self, needle: &str) -> bool {
        self.messages
            .iter()
            .chain(&self.successes)
            .chain(&self.warnings)
            .chain(&self.errors)
            .any(|line| line.contains(needle))
            || self
                .error_blocks
                .iter()
                .any(|(title, body)| title.contains(needle) || body.contains(needle))
    }
}

impl UserInterface for MockUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        self.messages.push(msg.to_string());
    }

    fn success(&mut self, msg: &str) {
        self.successes.push(msg.to_string());
    }

    fn warning(&mut self, msg: &str) {
        self.warnings.push(msg.to_string());
    }

    fn error(&mut self, msg: &str) {
        self.errors.push(msg.to_string());
    }

    fn error_block(&mut self, title: &str, body: &str) {
        self.error_blocks.push((title.to_string(), body.to_string()));
    }

    fn confirm(&mut self, prompt: &Confirmation) -> Result<bool> {
        self.prompts_shown.push(prompt.key.clone());
        Ok(self
            .confirm_responses
            .get(&prompt.key)
            .copied()
            .unwrap_or(prompt.default))
    }

    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle> {
        self.spinners.push(message.to_string());
        Box::new(MockSpinner)
    }

    fn show_header(&mut self, title: &str) {
        self.headers.push(title.to_string());
    }

    fn is_interactive(&self) -> bool {
        self.interactive
    }
}

struct MockSpinner;

impl SpinnerHandle for MockSpinner {
    fn set_message(&mut self, _msg: &str) {}
    fn finish_success(&mut self, _msg: &str) {}
    fn finish_error(&mut self, _msg: &str) {}
}
