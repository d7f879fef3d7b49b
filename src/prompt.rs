use anyhow::{Context, Result};
use std::io::{BufRead, Write};

/// Line-based terminal prompts over any reader/writer pair.
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl Prompter<std::io::StdinLock<'static>, std::io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(std::io::stdin().lock(), std::io::stdout())
    }
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Print a line of text
    pub fn say(&mut self, text: &str) -> Result<()> {
        writeln!(self.output, "{}", text).context("Failed to write prompt")
    }

    /// Prompt with a message and return the trimmed input.
    ///
    /// An empty line is an empty answer; a closed input is an error.
    pub fn ask(&mut self, message: &str) -> Result<String> {
        write!(self.output, "{}", message).context("Failed to write prompt")?;
        self.output.flush().context("Failed to flush stdout")?;
        let mut input = String::new();
        let read = self
            .input
            .read_line(&mut input)
            .context("Failed to read input")?;
        if read == 0 {
            anyhow::bail!("Unexpected end of input");
        }
        Ok(input.trim().to_string())
    }

    /// Prompt with a default value. Returns the default if input is empty.
    pub fn ask_with_default(&mut self, message: &str, default: &str) -> Result<String> {
        let input = self.ask(&format!("{} [{}]: ", message, default))?;
        if input.is_empty() {
            Ok(default.to_string())
        } else {
            Ok(input)
        }
    }

    /// Yes/no question. Returns the default on empty input.
    pub fn ask_yes_no(&mut self, message: &str, default_yes: bool) -> Result<bool> {
        let hint = if default_yes { "Y/n" } else { "y/N" };
        let input = self.ask(&format!("{} [{}]: ", message, hint))?.to_lowercase();
        if input.is_empty() {
            Ok(default_yes)
        } else {
            Ok(input == "y" || input == "yes")
        }
    }
}
