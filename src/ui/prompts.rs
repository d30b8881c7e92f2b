//! Interactive prompts.

use console::Term;
use dialoguer::Confirm;

use crate::error::{ComcolError, Result};

use super::Confirmation;

fn map_dialoguer_err(e: dialoguer::Error) -> ComcolError {
    ComcolError::Io(e.into())
}

/// Ask `prompt` on `term` and wait for an answer.
pub fn confirm_on(prompt: &Confirmation, term: &Term) -> Result<bool> {
    Confirm::new()
        .with_prompt(&prompt.question)
        .default(prompt.default)
        .interact_on(term)
        .map_err(map_dialoguer_err)
}
