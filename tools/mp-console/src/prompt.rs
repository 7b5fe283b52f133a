//! Operator input.
//!
//! `StdinPrompt` reads lines from a terminal; `ScriptedPrompt` replays
//! canned answers and records everything shown, for tests and for piping a
//! fixed session into the console.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

use crate::domain::{ActionError, ValidationError};

/// Line-oriented operator input and output.
pub trait Prompt {
    /// Show one line.
    fn say(&mut self, line: &str);

    /// Ask a question. `None` once input has ended.
    fn ask(&mut self, question: &str) -> Option<String>;

    /// Show numbered options and return the index picked.
    ///
    /// # Errors
    ///
    /// `NothingToChoose` for an empty list, `InputClosed` at end of input,
    /// and `Validation` if the answer matches no option.
    fn choose(&mut self, question: &str, options: &[String]) -> Result<usize, ActionError> {
        if options.is_empty() {
            return Err(ActionError::NothingToChoose(question.to_string()));
        }
        for (i, option) in options.iter().enumerate() {
            self.say(&format!("{:>3}) {option}", i + 1));
        }
        let answer = self.ask(question).ok_or(ActionError::InputClosed)?;
        select(&answer, options)
            .ok_or_else(|| ValidationError::Choice(answer.trim().to_string()).into())
    }
}

/// Match an answer against options, by 1-based number or exact text.
#[must_use]
pub fn select(answer: &str, options: &[String]) -> Option<usize> {
    let text = answer.trim();
    if let Ok(number) = text.parse::<usize>() {
        if (1..=options.len()).contains(&number) {
            return Some(number - 1);
        }
    }
    options.iter().position(|option| option == text)
}

/// Prompt over a reader and a writer.
pub struct StdinPrompt<R, W> {
    input: R,
    output: W,
}

impl StdinPrompt<io::StdinLock<'static>, io::Stdout> {
    /// Prompt on the process terminal.
    #[must_use]
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> StdinPrompt<R, W> {
    /// Prompt over arbitrary streams.
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> Prompt for StdinPrompt<R, W> {
    fn say(&mut self, line: &str) {
        // Output is best effort; a closed terminal shows up as end of input.
        let _ = writeln!(self.output, "{line}");
    }

    fn ask(&mut self, question: &str) -> Option<String> {
        let _ = write!(self.output, "{question} ");
        let _ = self.output.flush();
        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim().to_string()),
        }
    }
}

/// Prompt that replays fixed answers.
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    answers: VecDeque<String>,
    /// Every line shown and question asked, in order.
    pub transcript: Vec<String>,
}

impl ScriptedPrompt {
    /// Replay `answers` in order.
    pub fn new<S: AsRef<str>>(answers: &[S]) -> Self {
        Self {
            answers: answers.iter().map(|a| a.as_ref().to_string()).collect(),
            transcript: Vec::new(),
        }
    }

    /// True if `needle` appears in any transcript line.
    #[must_use]
    pub fn saw(&self, needle: &str) -> bool {
        self.transcript.iter().any(|line| line.contains(needle))
    }
}

impl Prompt for ScriptedPrompt {
    fn say(&mut self, line: &str) {
        self.transcript.push(line.to_string());
    }

    fn ask(&mut self, question: &str) -> Option<String> {
        self.transcript.push(question.to_string());
        self.answers.pop_front()
    }
}
