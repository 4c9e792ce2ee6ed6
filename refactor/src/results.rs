//! Result types flowing through the pipeline.
//!
//! Scan tasks produce a [`ScanOutcome`] per candidate. A single consumer folds them
//! into an [`Aggregator`], which it owns exclusively, and freezes it into an
//! [`AggregateResult`] once every scan task has finished. Rewrite tasks produce a
//! [`RewriteOutcome`] per file in the modify set.

use serde::Serialize;
use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::errors::{RefactorError, RefactorResult};

/// One line containing the search text
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    /// 1-based line number
    pub line_number: usize,
    /// Non-overlapping occurrences on this line, always > 0
    pub occurrences: usize,
    /// The line as read, without its terminator
    pub line_text: String,
}

/// Findings for a single file, in ascending line order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileScanOutcome {
    pub path: PathBuf,
    pub findings: Vec<Finding>,
}

impl FileScanOutcome {
    /// Total occurrences across all findings; the rewrite ceiling for this file.
    pub fn occurrences(&self) -> usize {
        self.findings.iter().map(|f| f.occurrences).sum()
    }
}

/// What happened to one candidate during the scan phase
#[derive(Debug)]
pub enum ScanOutcome {
    Scanned(FileScanOutcome),
    /// Symbolic links are never opened.
    Symlink(PathBuf),
    Failed { path: PathBuf, error: RefactorError },
}

/// A candidate that could not be scanned
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanFailure {
    pub path: PathBuf,
    pub reason: String,
}

/// Accumulates scan outcomes as they arrive, in any order
#[derive(Debug, Default)]
pub struct Aggregator {
    outcomes: Vec<FileScanOutcome>,
    seen: HashSet<PathBuf>,
    modify_set: Vec<PathBuf>,
    failures: Vec<ScanFailure>,
    files_scanned: usize,
    symlinks_skipped: usize,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn absorb(&mut self, outcome: ScanOutcome) {
        match outcome {
            ScanOutcome::Scanned(file) => {
                self.files_scanned += 1;
                if file.findings.is_empty() {
                    return;
                }
                if self.seen.insert(file.path.clone()) {
                    self.modify_set.push(file.path.clone());
                }
                self.outcomes.push(file);
            }
            ScanOutcome::Symlink(_) => self.symlinks_skipped += 1,
            ScanOutcome::Failed { path, error } => self.failures.push(ScanFailure {
                path,
                reason: error.to_string(),
            }),
        }
    }

    /// Freezes the accumulator. Ordering is by path so reports are deterministic
    /// regardless of completion order.
    pub fn finish(mut self) -> AggregateResult {
        self.outcomes.sort_by(|a, b| a.path.cmp(&b.path));
        self.modify_set.sort();
        self.failures.sort_by(|a, b| a.path.cmp(&b.path));

        AggregateResult {
            outcomes: self.outcomes,
            modify_set: self.modify_set,
            failures: self.failures,
            files_scanned: self.files_scanned,
            symlinks_skipped: self.symlinks_skipped,
        }
    }
}

/// The frozen result of the scan phase
#[derive(Debug, Clone, Default, Serialize)]
pub struct AggregateResult {
    /// Files with at least one finding; a path listed twice on input appears twice
    pub outcomes: Vec<FileScanOutcome>,
    /// Distinct paths among `outcomes`
    pub modify_set: Vec<PathBuf>,
    pub failures: Vec<ScanFailure>,
    pub files_scanned: usize,
    pub symlinks_skipped: usize,
}

impl AggregateResult {
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn total_findings(&self) -> usize {
        self.outcomes.iter().map(|o| o.findings.len()).sum()
    }

    pub fn total_occurrences(&self) -> usize {
        self.outcomes.iter().map(FileScanOutcome::occurrences).sum()
    }

    /// First outcome recorded for `path`
    pub fn outcome_for(&self, path: &Path) -> Option<&FileScanOutcome> {
        self.outcomes.iter().find(|o| o.path == path)
    }

    /// Pairs every path in the modify set with its scan-time occurrence count
    pub fn rewrite_targets(&self) -> Vec<(PathBuf, usize)> {
        self.modify_set
            .iter()
            .filter_map(|path| {
                self.outcome_for(path)
                    .map(|outcome| (path.clone(), outcome.occurrences()))
            })
            .collect()
    }

    /// Dumps the aggregate as pretty-printed JSON followed by a newline.
    pub fn write_json<W: Write>(&self, out: &mut W) -> RefactorResult<()> {
        serde_json::to_writer_pretty(&mut *out, self)?;
        writeln!(out)?;
        Ok(())
    }
}

/// What happened to one file during the rewrite phase
#[derive(Debug)]
pub struct RewriteOutcome {
    pub path: PathBuf,
    /// Replacements written to disk
    pub replaced: usize,
    pub error: Option<RefactorError>,
}

impl RewriteOutcome {
    pub fn success(&self) -> bool {
        self.error.is_none()
    }
}
