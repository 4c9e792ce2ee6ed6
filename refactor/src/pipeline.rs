use std::io::Write;
use std::path::PathBuf;
use tracing::{debug, info};

use crate::config::{RefactorConfig, SearchSpec};
use crate::confirm::ConfirmationGate;
use crate::errors::RefactorResult;
use crate::pool::WorkerPool;
use crate::replace::{rewrite_all, Rewriter};
use crate::report::Reporter;
use crate::results::{AggregateResult, RewriteOutcome};
use crate::search::{scan_candidates, LiteralMatcher, Scanner};

/// States a run passes through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Scanning,
    Aggregating,
    Previewing,
    AwaitingConfirmation,
    Rewriting,
    Done,
    Cancelled,
}

/// How a run ended
#[derive(Debug)]
pub enum RunOutcome {
    /// Old and new text are identical; nothing was opened
    NoOp,
    /// No candidate contained the search text
    NothingToRefactor(AggregateResult),
    /// Preview-only run
    Previewed(AggregateResult),
    /// Commit run declined at the confirmation gate
    Cancelled(AggregateResult),
    Completed {
        aggregate: AggregateResult,
        rewrites: Vec<RewriteOutcome>,
    },
}

impl RunOutcome {
    pub fn final_state(&self) -> RunState {
        match self {
            RunOutcome::Cancelled(_) => RunState::Cancelled,
            _ => RunState::Done,
        }
    }

    /// Identical texts and empty results are reported to the caller as failures.
    pub fn is_success(&self) -> bool {
        !matches!(self, RunOutcome::NoOp | RunOutcome::NothingToRefactor(_))
    }
}

/// Drives one scan, preview, confirm, rewrite cycle over a fixed worker pool
#[derive(Debug)]
pub struct Refactor {
    pool: WorkerPool,
    state: RunState,
}

impl Refactor {
    pub fn new(config: &RefactorConfig) -> RefactorResult<Self> {
        Ok(Self {
            pool: WorkerPool::new(config.concurrency, config.progress)?,
            state: RunState::Idle,
        })
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    fn transition(&mut self, next: RunState) {
        debug!("Run state {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    /// Scan phase only: fan out over the candidates and wait for the aggregate.
    pub fn scan(
        &mut self,
        spec: &SearchSpec,
        candidates: &[PathBuf],
    ) -> RefactorResult<AggregateResult> {
        let scanner = Scanner::new(LiteralMatcher::new(&spec.old_text)?);
        self.transition(RunState::Scanning);
        let aggregate = scan_candidates(&self.pool, &scanner, candidates);
        self.transition(RunState::Aggregating);
        Ok(aggregate)
    }

    /// Rewrite phase only, for every file in the aggregate's modify set.
    pub fn rewrite(
        &mut self,
        spec: &SearchSpec,
        aggregate: &AggregateResult,
    ) -> RefactorResult<Vec<RewriteOutcome>> {
        let rewriter = Rewriter::new(LiteralMatcher::new(&spec.old_text)?, &spec.new_text);
        self.transition(RunState::Rewriting);
        Ok(rewrite_all(&self.pool, &rewriter, aggregate))
    }

    /// Runs the whole cycle, writing the report to `out`.
    ///
    /// Only run-level problems (an empty search text, a failing report stream, a
    /// broken confirmation input) are returned as errors. Per-file failures are part
    /// of the outcome.
    pub fn run<W, G>(
        &mut self,
        spec: &SearchSpec,
        candidates: &[PathBuf],
        reporter: &Reporter,
        gate: &mut G,
        out: &mut W,
    ) -> RefactorResult<RunOutcome>
    where
        W: Write,
        G: ConfirmationGate + ?Sized,
    {
        if spec.is_noop() {
            reporter.noop(out)?;
            self.transition(RunState::Done);
            return Ok(RunOutcome::NoOp);
        }

        let aggregate = self.scan(spec, candidates)?;
        reporter.scan_failures(out, &aggregate.failures)?;

        if aggregate.is_empty() {
            reporter.nothing_to_refactor(out)?;
            self.transition(RunState::Done);
            return Ok(RunOutcome::NothingToRefactor(aggregate));
        }

        self.transition(RunState::Previewing);
        reporter.preview(out, &aggregate)?;

        if !spec.commit {
            self.transition(RunState::Done);
            return Ok(RunOutcome::Previewed(aggregate));
        }

        self.transition(RunState::AwaitingConfirmation);
        out.flush()?;
        if !gate.confirm(&reporter.confirmation_prompt(&aggregate))? {
            info!("Run cancelled at confirmation");
            reporter.cancelled(out)?;
            self.transition(RunState::Cancelled);
            return Ok(RunOutcome::Cancelled(aggregate));
        }

        let rewrites = self.rewrite(spec, &aggregate)?;
        reporter.committed(out, &aggregate, &rewrites)?;
        self.transition(RunState::Done);

        Ok(RunOutcome::Completed {
            aggregate,
            rewrites,
        })
    }
}
