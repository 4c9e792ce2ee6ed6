use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, trace, warn};

use crate::errors::{RefactorError, RefactorResult};
use crate::pool::WorkerPool;
use crate::results::{AggregateResult, RewriteOutcome};
use crate::search::matcher::LiteralMatcher;

/// Rewrites files in place, bounded by the occurrence counts from the scan.
#[derive(Debug, Clone)]
pub struct Rewriter {
    matcher: LiteralMatcher,
    replacement: Vec<u8>,
}

impl Rewriter {
    pub fn new(matcher: LiteralMatcher, replacement: &str) -> Self {
        Self {
            matcher,
            replacement: replacement.as_bytes().to_vec(),
        }
    }

    /// Replaces at most `expected` occurrences in `path`.
    ///
    /// `expected` is the ceiling counted at scan time; the content is never run
    /// through an unbounded pass. Errors are captured in the outcome.
    pub fn rewrite(&self, path: &Path, expected: usize) -> RewriteOutcome {
        match self.try_rewrite(path, expected) {
            Ok(replaced) => RewriteOutcome {
                path: path.to_path_buf(),
                replaced,
                error: None,
            },
            Err(error) => {
                warn!("Failed to rewrite {}: {}", path.display(), error);
                RewriteOutcome {
                    path: path.to_path_buf(),
                    replaced: 0,
                    error: Some(error),
                }
            }
        }
    }

    fn try_rewrite(&self, path: &Path, expected: usize) -> RefactorResult<usize> {
        trace!("Rewriting {} ({} occurrences)", path.display(), expected);

        let metadata = fs::symlink_metadata(path).map_err(|e| RefactorError::io_at(path, e))?;
        if metadata.file_type().is_symlink() {
            return Err(RefactorError::SymlinkTarget(path.to_path_buf()));
        }

        let content = fs::read(path).map_err(|e| RefactorError::io_at(path, e))?;

        let present = self.matcher.count(&content);
        if present != expected {
            warn!(
                "{} changed since it was scanned: expected {} occurrences, found {}",
                path.display(),
                expected,
                present
            );
        }

        let (rewritten, replaced) = self.matcher.replacen(&content, &self.replacement, expected);
        if replaced == 0 {
            return Ok(0);
        }

        // Same inode, same path: no temp file, no rename.
        fs::write(path, rewritten).map_err(|e| RefactorError::io_at(path, e))?;
        fs::set_permissions(path, metadata.permissions())
            .map_err(|e| RefactorError::io_at(path, e))?;

        Ok(replaced)
    }
}

/// Rewrites every file in the modify set on the pool.
///
/// Each path occurs once in the modify set, so no two tasks ever write the same file.
/// Outcomes are returned in path order once all rewrites have finished.
pub fn rewrite_all(
    pool: &WorkerPool,
    rewriter: &Rewriter,
    aggregate: &AggregateResult,
) -> Vec<RewriteOutcome> {
    let targets: Vec<(PathBuf, usize)> = aggregate.rewrite_targets();
    info!("Rewriting {} files", targets.len());
    let started = Instant::now();

    let mut outcomes = pool.fan_in(
        "rewriting",
        &targets,
        |(path, expected)| rewriter.rewrite(path, *expected),
        |rx| rx.iter().collect::<Vec<_>>(),
    );
    outcomes.sort_by(|a, b| a.path.cmp(&b.path));

    let failed = outcomes.iter().filter(|o| !o.success()).count();
    info!(
        "Rewrite complete in {}. {} files rewritten, {} failed",
        humantime::format_duration(started.elapsed()),
        outcomes.len() - failed,
        failed
    );

    outcomes
}
