//! The `comcol completions` command.

use crate::cli::args::{Cli, CompletionsArgs};
use crate::ui::UserInterface;
use clap::CommandFactory;

use super::dispatcher::{Command, CommandResult};

pub struct CompletionsCommand {
    args: CompletionsArgs,
}

impl CompletionsCommand {
    pub fn new(args: CompletionsArgs) -> Self {
        Self { args }
    }
}

impl Command for CompletionsCommand {
    fn execute(&self, _ui: &mut dyn UserInterface) -> crate::error::Result<CommandResult> {
        let mut cmd = Cli::command();
        clap_complete::generate(self.args.shell, &mut cmd, "comcol", &mut std::io::stdout());
        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap_complete::Shell;

    fn render(shell: Shell) -> String {
        let mut cmd = Cli::command();
        let mut buf = Vec::new();
        clap_complete::generate(shell, &mut cmd, "comcol", &mut buf);
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn bash_completions_name_subcommands() {
        let output = render(Shell::Bash);
        assert!(output.contains("comcol"));
        assert!(output.contains("showcache"));
    }

    #[test]
    fn zsh_completions() {
        assert!(render(Shell::Zsh).contains("comcol"));
    }
}
