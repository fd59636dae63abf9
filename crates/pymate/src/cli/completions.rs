use super::app::App;
use anyhow::{Result, bail};
use clap::{Args, CommandFactory};
use clap_complete::{Shell, generate};
use pymate_platform::shell;

#[derive(Args, Clone, Debug)]
pub struct CompletionsArg {
    /// Target shell; detected from the running shell by default
    #[arg(value_enum)]
    pub shell: Option<Shell>,
}

impl CompletionsArg {
    pub fn run(self) -> Result<()> {
        let shell = match self.shell {
            Some(shell) => shell,
            None => match shell::detect() {
                Some(shell::Shell::Bash) => Shell::Bash,
                Some(shell::Shell::Zsh) => Shell::Zsh,
                Some(shell::Shell::Fish) => Shell::Fish,
                Some(shell::Shell::Elvish) => Shell::Elvish,
                Some(shell::Shell::Powershell | shell::Shell::Pwsh) => Shell::PowerShell,
                Some(other) => bail!("no completions for {other}; pass a shell explicitly"),
                None => bail!("cannot detect the shell; pass one explicitly"),
            },
        };

        generate(shell, &mut App::command(), "pymate", &mut std::io::stdout());
        Ok(())
    }
}
