use std::io::{self, BufRead, Write};

use crate::errors::RefactorResult;

/// The only answer that lets a commit run proceed.
pub const AFFIRMATIVE: &str = "y";

/// A single yes/no decision covering the whole batch
pub trait ConfirmationGate {
    fn confirm(&mut self, prompt: &str) -> RefactorResult<bool>;
}

/// Case-sensitive comparison against [`AFFIRMATIVE`], ignoring only the line terminator.
pub fn is_affirmative(answer: &str) -> bool {
    answer.trim_end_matches(['\n', '\r']) == AFFIRMATIVE
}

/// Prompts on `output` and reads one line from `input`.
#[derive(Debug)]
pub struct LineGate<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> LineGate<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl LineGate<io::StdinLock<'static>, io::Stderr> {
    /// Reads the answer from stdin and prompts on stderr, keeping stdout for the report.
    pub fn stdin() -> Self {
        Self::new(io::stdin().lock(), io::stderr())
    }
}

impl<R: BufRead, W: Write> ConfirmationGate for LineGate<R, W> {
    fn confirm(&mut self, prompt: &str) -> RefactorResult<bool> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;

        let mut answer = String::new();
        // End of input reads as an empty answer.
        self.input.read_line(&mut answer)?;
        Ok(is_affirmative(&answer))
    }
}
