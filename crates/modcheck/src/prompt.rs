use color_eyre::eyre::Report;
use eyre::Context;

/// Something that can answer yes/no questions before the manifest is touched.
pub trait Prompter {
    /// Asks `question`, returning the answer.
    fn confirm(&mut self, question: &str) -> Result<bool, Report>;
}

/// Asks the person at the terminal.
#[derive(Debug, Clone, Copy, Default)]
pub struct Interactive;

impl Prompter for Interactive {
    fn confirm(&mut self, question: &str) -> Result<bool, Report> {
        inquire::Confirm::new(question)
            .with_help_message("y/n")
            .prompt()
            .wrap_err("Failed to prompt for confirmation")
    }
}

/// Says yes to everything, for `--yes`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeYes;

impl Prompter for AssumeYes {
    fn confirm(&mut self, question: &str) -> Result<bool, Report> {
        tracing::debug!(question, "Confirmed automatically");
        Ok(true)
    }
}

/// Picks the prompter for a subcommand's `--yes` flag.
pub fn for_flag(yes: bool) -> Box<dyn Prompter> {
    match yes {
        true => Box::new(AssumeYes),
        false => Box::new(Interactive),
    }
}
