//! # Console
//!
//! Line-oriented user I/O for the session. `StdConsole` talks to a terminal,
//! `ScriptedConsole` replays canned answers for tests.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

/// What the session needs from the user's terminal.
pub trait Console {
    /// Shows a message.
    fn display(&mut self, text: &str) -> io::Result<()>;

    /// Shows `question` and reads one answer, without the line ending.
    /// `None` means end of input.
    fn retrieve(&mut self, question: &str) -> io::Result<Option<String>>;
}

// =============================================================================
// StdConsole
// =============================================================================

/// Console over any reader/writer pair, stdin/stdout by default.
pub struct StdConsole<R, W> {
    input: R,
    output: W,
}

impl StdConsole<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        StdConsole::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> StdConsole<R, W> {
    pub fn new(input: R, output: W) -> Self {
        StdConsole { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }
}

impl<R: BufRead, W: Write> Console for StdConsole<R, W> {
    fn display(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.output, "{text}")?;
        self.output.flush()
    }

    fn retrieve(&mut self, question: &str) -> io::Result<Option<String>> {
        self.display(question)?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }
}

// =============================================================================
// ScriptedConsole
// =============================================================================

/// Console that answers from a fixed script and records everything shown.
#[derive(Debug, Default)]
pub struct ScriptedConsole {
    answers: VecDeque<String>,
    transcript: Vec<String>,
}

impl ScriptedConsole {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ScriptedConsole {
            answers: answers.into_iter().map(Into::into).collect(),
            transcript: Vec::new(),
        }
    }

    /// Queues more answers after the current ones.
    pub fn push_answers<I, S>(&mut self, answers: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.answers.extend(answers.into_iter().map(Into::into));
    }

    /// Every displayed message and question, in order.
    pub fn transcript(&self) -> &[String] {
        &self.transcript
    }

    /// True if any displayed line equals `text`.
    pub fn shown(&self, text: &str) -> bool {
        self.transcript.iter().any(|line| line == text)
    }

    /// Number of unused answers.
    pub fn remaining(&self) -> usize {
        self.answers.len()
    }
}

impl Console for ScriptedConsole {
    fn display(&mut self, text: &str) -> io::Result<()> {
        self.transcript.push(text.to_string());
        Ok(())
    }

    fn retrieve(&mut self, question: &str) -> io::Result<Option<String>> {
        self.transcript.push(question.to_string());
        Ok(self.answers.pop_front())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_std_console_reads_lines() {
        let input = io::Cursor::new("1\r\n4000000000000010\n");
        let mut console = StdConsole::new(input, Vec::new());

        assert_eq!(console.retrieve("Menu").unwrap().as_deref(), Some("1"));
        assert_eq!(
            console.retrieve("Enter your card number:").unwrap().as_deref(),
            Some("4000000000000010")
        );
        assert_eq!(console.retrieve("Menu").unwrap(), None);

        let output = String::from_utf8(console.into_output()).unwrap();
        assert_eq!(output, "Menu\nEnter your card number:\nMenu\n");
    }

    #[test]
    fn test_last_line_without_newline() {
        let mut console = StdConsole::new(io::Cursor::new("0"), Vec::new());
        assert_eq!(console.retrieve("Menu").unwrap().as_deref(), Some("0"));
    }

    #[test]
    fn test_scripted_console() {
        let mut console = ScriptedConsole::new(["2"]);
        console.display("Hello").unwrap();
        assert_eq!(console.retrieve("Menu").unwrap().as_deref(), Some("2"));
        assert_eq!(console.retrieve("Menu").unwrap(), None);

        assert!(console.shown("Hello"));
        assert_eq!(console.transcript(), ["Hello", "Menu", "Menu"]);
        assert_eq!(console.remaining(), 0);
    }
}
