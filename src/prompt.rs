//! Masked interactive password input
//!
//! [`PasswordInput`] is a small Init/Update/View model: it is fed one key
//! event at a time and says when the user has confirmed or cancelled.
//! [`TerminalPrompt`] drives that model from a raw-mode event loop and draws
//! it on stderr, keeping stdout free for data.

use crate::diagnostics::Diagnostics;
use crossterm::cursor::MoveToColumn;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::queue;
use crossterm::style::Print;
use crossterm::terminal::{self, Clear, ClearType};
use std::io::{self, IsTerminal, Write};
use zeroize::Zeroizing;

const PLACEHOLDER: &str = "Password";
const ECHO_CHARACTER: char = '•';

/// Source of an interactively entered password
pub trait SecretPrompt {
    /// Block until the user confirms or cancels
    ///
    /// Cancelling yields an empty string, meaning no password was supplied.
    fn prompt_for_password(&mut self) -> io::Result<Zeroizing<String>>;
}

impl<P: SecretPrompt + ?Sized> SecretPrompt for &mut P {
    fn prompt_for_password(&mut self) -> io::Result<Zeroizing<String>> {
        (**self).prompt_for_password()
    }
}

#[derive(Debug, PartialEq, Eq)]
/// How a prompt session ended
pub enum PromptOutcome {
    /// Enter was pressed
    Confirmed(Zeroizing<String>),
    /// Escape or Ctrl-C was pressed
    Cancelled,
}

/// State of a masked single-line input
pub struct PasswordInput {
    title: String,
    value: Zeroizing<String>,
}

impl PasswordInput {
    /// Create an empty input labelled with `title`
    pub fn new(title: impl Into<String>) -> PasswordInput {
        PasswordInput {
            title: title.into(),
            value: Zeroizing::new(String::new()),
        }
    }

    /// First frame to draw
    pub fn init(&self) -> String {
        self.view()
    }

    /// Apply one key press
    ///
    /// Returns `Some` once the session is over.
    pub fn update(&mut self, key: KeyEvent) -> Option<PromptOutcome> {
        match key.code {
            KeyCode::Enter => {
                let value = std::mem::take(&mut *self.value);
                Some(PromptOutcome::Confirmed(Zeroizing::new(value)))
            }
            KeyCode::Esc => Some(self.cancel()),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(self.cancel())
            }
            KeyCode::Backspace => {
                self.value.pop();
                None
            }
            KeyCode::Char(c)
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                self.value.push(c);
                None
            }
            _ => None,
        }
    }

    /// The line to draw: the placeholder, or one echo character per typed character
    pub fn view(&self) -> String {
        let body = if self.value.is_empty() {
            PLACEHOLDER.to_string()
        } else {
            ECHO_CHARACTER
                .to_string()
                .repeat(self.value.chars().count())
        };
        format!("{}: {}", self.title, body)
    }

    fn cancel(&mut self) -> PromptOutcome {
        self.value.clear();
        PromptOutcome::Cancelled
    }
}

struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> io::Result<RawModeGuard> {
        terminal::enable_raw_mode()?;
        Ok(RawModeGuard)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn draw<W: Write>(out: &mut W, line: &str) -> io::Result<()> {
    queue!(out, MoveToColumn(0), Clear(ClearType::CurrentLine), Print(line))?;
    out.flush()
}

/// Password prompt on the controlling terminal
pub struct TerminalPrompt<'a> {
    title: String,
    diagnostics: &'a dyn Diagnostics,
}

impl<'a> TerminalPrompt<'a> {
    /// Create a prompt showing `title`
    pub fn new(title: impl Into<String>, diagnostics: &'a dyn Diagnostics) -> TerminalPrompt<'a> {
        TerminalPrompt {
            title: title.into(),
            diagnostics,
        }
    }

    fn run(&self) -> io::Result<PromptOutcome> {
        let mut stderr = io::stderr();
        let mut input = PasswordInput::new(self.title.as_str());
        let _raw_mode = RawModeGuard::enable()?;
        draw(&mut stderr, &input.init())?;
        let outcome = loop {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Release {
                    continue;
                }
                if let Some(outcome) = input.update(key) {
                    break outcome;
                }
                draw(&mut stderr, &input.view())?;
            }
        };
        queue!(stderr, Print("\r\n"))?;
        stderr.flush()?;
        Ok(outcome)
    }
}

impl SecretPrompt for TerminalPrompt<'_> {
    fn prompt_for_password(&mut self) -> io::Result<Zeroizing<String>> {
        if !io::stderr().is_terminal() {
            self.diagnostics.warn(format_args!(
                "no terminal to prompt for a password on, set KEEPASSDB_PASSWORD instead"
            ));
            return Ok(Zeroizing::new(String::new()));
        }
        match self.run()? {
            PromptOutcome::Confirmed(value) => Ok(value),
            PromptOutcome::Cancelled => {
                self.diagnostics.debug(format_args!("password prompt cancelled"));
                Ok(Zeroizing::new(String::new()))
            }
        }
    }
}
