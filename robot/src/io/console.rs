//! User-facing terminal output and line input.
//!
//! The [`Console`] trait decouples the interactive stages from the real
//! terminal. Tests use a scripted console that replays input lines and
//! captures everything emitted.

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use crossterm::style::{ResetColor, Stylize};

/// How a message should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Plain,
    Verbose,
    Success,
    Warning,
    Error,
    Debug,
}

pub trait Console {
    /// Show one message to the user.
    fn emit(&mut self, tone: Tone, message: &str);

    /// Show `prompt` and read one line. `None` means input is closed.
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>>;
}

/// Console backed by stdout/stdin.
pub struct StdConsole {
    color: bool,
    verbose: bool,
}

impl StdConsole {
    pub fn new(app_mode: bool, verbose: bool) -> Self {
        Self {
            color: !app_mode,
            verbose,
        }
    }

    fn render(&self, tone: Tone, message: &str) -> String {
        if !self.color {
            return match tone {
                Tone::Warning => format!("[WARNING] {message}"),
                Tone::Error => format!("[ERROR] {message}"),
                _ => message.to_string(),
            };
        }
        match tone {
            Tone::Plain => message.to_string(),
            Tone::Verbose => message.magenta().to_string(),
            Tone::Success => message.green().to_string(),
            Tone::Warning => format!("[WARNING] {message}").yellow().to_string(),
            Tone::Error => format!("[ERROR] {message}").red().to_string(),
            Tone::Debug => message.dark_grey().to_string(),
        }
    }
}

impl Console for StdConsole {
    fn emit(&mut self, tone: Tone, message: &str) {
        if tone == Tone::Verbose && !self.verbose {
            return;
        }
        let line = self.render(tone, message);
        if matches!(tone, Tone::Error | Tone::Debug) {
            eprintln!("{line}");
        } else {
            println!("{line}");
        }
    }

    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        let mut stdout = io::stdout();
        let prompt = if self.color {
            prompt.bold().to_string()
        } else {
            prompt.to_string()
        };
        write!(stdout, "{prompt}").context("write prompt")?;
        stdout.flush().context("flush prompt")?;

        let mut line = String::new();
        let read = io::stdin()
            .lock()
            .read_line(&mut line)
            .context("read from stdin")?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }
}

/// Reset any color state left on the terminal.
pub fn restore_terminal() {
    let mut stdout = io::stdout();
    let _ = crossterm::execute!(stdout, ResetColor);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_mode_renders_without_escape_codes() {
        let console = StdConsole::new(true, false);
        assert_eq!(console.render(Tone::Success, "done"), "done");
        assert_eq!(
            console.render(Tone::Warning, "careful"),
            "[WARNING] careful"
        );
        assert!(!console.render(Tone::Error, "bad").contains('\u{1b}'));
    }

    #[test]
    fn color_mode_wraps_in_escape_codes() {
        let console = StdConsole::new(false, false);
        assert!(console.render(Tone::Error, "bad").contains('\u{1b}'));
        assert_eq!(console.render(Tone::Plain, "plain"), "plain");
    }
}
