//! Line-oriented prompts over any reader/writer pair.

use core::fmt::Display;
use core::str::FromStr;
use std::io::{BufRead, Write};

use thiserror::Error;

use malvader_accounts::customer::validate_field;
use malvader_core::{DomainError, Money};

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// End of input reached while waiting for an answer.
    #[error("input closed")]
    InputClosed,
}

pub type PromptResult<T> = Result<T, PromptError>;

/// Asks questions on `output` and reads answers from `input`.
///
/// Answers are trimmed of the line terminator and surrounding whitespace.
/// Unparsable answers are reported and asked again.
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    pub fn say(&mut self, message: impl Display) -> PromptResult<()> {
        writeln!(self.output, "{message}")?;
        Ok(())
    }

    pub fn flush(&mut self) -> PromptResult<()> {
        self.output.flush()?;
        Ok(())
    }

    /// Raw trimmed answer; may be empty. Bytes that are not UTF-8 become U+FFFD.
    pub fn line(&mut self, label: &str) -> PromptResult<String> {
        write!(self.output, "{label}")?;
        self.output.flush()?;

        let mut buf = Vec::new();
        if self.input.read_until(b'\n', &mut buf)? == 0 {
            return Err(PromptError::InputClosed);
        }
        Ok(String::from_utf8_lossy(&buf).trim().to_string())
    }

    pub fn integer<T: FromStr>(&mut self, label: &str) -> PromptResult<T> {
        loop {
            let answer = self.line(label)?;
            match answer.parse() {
                Ok(value) => return Ok(value),
                Err(_) => self.say("Please enter a valid whole number.")?,
            }
        }
    }

    /// Amount with up to two decimals; zero and negatives are accepted here.
    pub fn amount(&mut self, label: &str) -> PromptResult<Money> {
        loop {
            let answer = self.line(label)?;
            match answer.parse::<Money>() {
                Ok(value) => return Ok(value),
                Err(_) => self.say("Please enter an amount such as 100 or 100.50.")?,
            }
        }
    }

    /// Non-blank text of at most `max_chars` characters.
    pub fn text(&mut self, label: &str, field: &str, max_chars: usize) -> PromptResult<String> {
        loop {
            let answer = self.line(label)?;
            match validate_field(field, &answer, max_chars) {
                Ok(()) => return Ok(answer),
                Err(DomainError::Validation(msg)) => self.say(capitalize(&msg))?,
                Err(other) => self.say(other)?,
            }
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
