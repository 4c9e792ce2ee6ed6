use colored::Colorize;
use std::io::{self, Write};
use std::path::Path;

use crate::config::SearchSpec;
use crate::errors::RefactorError;
use crate::results::{AggregateResult, Finding, RewriteOutcome, ScanFailure};

/// Renders previews, post-commit diffs and status lines.
///
/// With color disabled the markers stay visible as plain text: `[old]` in the preview
/// and `[-old-]{+new+}` in the diff, so nothing in the report depends on the terminal.
#[derive(Debug, Clone)]
pub struct Reporter {
    old_text: String,
    new_text: String,
    color: bool,
}

impl Reporter {
    pub fn new(spec: &SearchSpec, color: bool) -> Self {
        Self {
            old_text: spec.old_text.clone(),
            new_text: spec.new_text.clone(),
            color,
        }
    }

    /// One row per finding, `path:line` padded to the widest label.
    pub fn preview<W: Write>(&self, out: &mut W, aggregate: &AggregateResult) -> io::Result<()> {
        let width = label_width(aggregate);
        for outcome in &aggregate.outcomes {
            for finding in &outcome.findings {
                let row = self.mark_matches(finding);
                self.write_row(out, &outcome.path, finding.line_number, width, &row)?;
            }
        }
        writeln!(
            out,
            "\nFound {} occurrences on {} lines in {} files ({} scanned, {} symlinks skipped)",
            aggregate.total_occurrences(),
            aggregate.total_findings(),
            aggregate.modify_set.len(),
            aggregate.files_scanned,
            aggregate.symlinks_skipped
        )
    }

    /// Re-renders each rewritten file's lines as a diff, then its status line.
    pub fn committed<W: Write>(
        &self,
        out: &mut W,
        aggregate: &AggregateResult,
        rewrites: &[RewriteOutcome],
    ) -> io::Result<()> {
        let width = label_width(aggregate);
        for rewrite in rewrites {
            if let Some(outcome) = aggregate.outcome_for(&rewrite.path) {
                // Only the occurrences actually written are drawn, leftmost first.
                let mut remaining = rewrite.replaced;
                for finding in &outcome.findings {
                    if remaining == 0 {
                        break;
                    }
                    let written = finding.occurrences.min(remaining);
                    remaining -= written;
                    let row = self.mark_replacements(finding, written);
                    self.write_row(out, &outcome.path, finding.line_number, width, &row)?;
                }
                if rewrite.success() && rewrite.replaced != outcome.occurrences() {
                    let notice = format!(
                        "{}: changed since scan, {} of {} occurrences replaced",
                        rewrite.path.display(),
                        rewrite.replaced,
                        outcome.occurrences()
                    );
                    writeln!(out, "{}", self.paint_err(&notice))?;
                }
            }
            self.rewrite_status(out, rewrite)?;
        }

        let failed = rewrites.iter().filter(|r| !r.success()).count();
        let replaced: usize = rewrites.iter().map(|r| r.replaced).sum();
        writeln!(
            out,
            "\nReplaced {} occurrences in {} files ({} failed)",
            replaced,
            rewrites.len() - failed,
            failed
        )
    }

    pub fn rewrite_status<W: Write>(&self, out: &mut W, rewrite: &RewriteOutcome) -> io::Result<()> {
        let path = rewrite.path.display().to_string();
        match &rewrite.error {
            None => {
                let status = format!("{}: replaced {} occurrences", path, rewrite.replaced);
                writeln!(out, "{}", self.paint_ok(&status))
            }
            Some(error) => {
                let status = format!("{}: failed: {}", path, error);
                writeln!(out, "{}", self.paint_err(&status))
            }
        }
    }

    pub fn scan_failures<W: Write>(&self, out: &mut W, failures: &[ScanFailure]) -> io::Result<()> {
        for failure in failures {
            let line = format!("skipped {}: {}", failure.path.display(), failure.reason);
            writeln!(out, "{}", self.paint_err(&line))?;
        }
        Ok(())
    }

    pub fn listing_errors<W: Write>(&self, out: &mut W, errors: &[RefactorError]) -> io::Result<()> {
        for error in errors {
            writeln!(out, "{}", self.paint_err(&format!("skipped: {}", error)))?;
        }
        Ok(())
    }

    pub fn confirmation_prompt(&self, aggregate: &AggregateResult) -> String {
        format!(
            "Replace {} occurrences of '{}' with '{}' in {} files? [y/N] ",
            aggregate.total_occurrences(),
            self.old_text,
            self.new_text,
            aggregate.modify_set.len()
        )
    }

    pub fn nothing_to_refactor<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "nothing to refactor")
    }

    pub fn cancelled<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "{}", self.paint_err("cancelled, no files were changed"))
    }

    pub fn noop<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "noop (old == new)")
    }

    fn write_row<W: Write>(
        &self,
        out: &mut W,
        path: &Path,
        line_number: usize,
        width: usize,
        row: &str,
    ) -> io::Result<()> {
        let path = path.display().to_string();
        let line = line_number.to_string();
        let pad = width.saturating_sub(path.chars().count() + 1 + line.len());
        let label = if self.color {
            format!("{}:{}", path.magenta(), line.green())
        } else {
            format!("{}:{}", path, line)
        };
        writeln!(out, "{}{}  {}", label, " ".repeat(pad), row)
    }

    /// Marks the occurrences counted for this line, left to right.
    fn mark_matches(&self, finding: &Finding) -> String {
        let marked = if self.color {
            self.old_text.bold().red().to_string()
        } else {
            format!("[{}]", self.old_text)
        };
        finding
            .line_text
            .replacen(&self.old_text, &marked, finding.occurrences)
    }

    /// Marks the first `written` occurrences of the line as replaced.
    fn mark_replacements(&self, finding: &Finding, written: usize) -> String {
        let marked = if self.color {
            format!(
                "{}{}",
                self.old_text.strikethrough(),
                self.new_text.bold().blue()
            )
        } else {
            format!("[-{}-]{{+{}+}}", self.old_text, self.new_text)
        };
        finding.line_text.replacen(&self.old_text, &marked, written)
    }

    fn paint_ok(&self, text: &str) -> String {
        if self.color {
            text.green().to_string()
        } else {
            text.to_string()
        }
    }

    fn paint_err(&self, text: &str) -> String {
        if self.color {
            text.red().to_string()
        } else {
            text.to_string()
        }
    }
}

/// Width of the longest `path:line` label across every finding
pub fn label_width(aggregate: &AggregateResult) -> usize {
    aggregate
        .outcomes
        .iter()
        .flat_map(|outcome| {
            let path_len = outcome.path.display().to_string().chars().count();
            outcome
                .findings
                .iter()
                .map(move |f| path_len + 1 + f.line_number.to_string().len())
        })
        .max()
        .unwrap_or(0)
}
