use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

use super::processor::Scanner;
use crate::pool::WorkerPool;
use crate::results::{AggregateResult, Aggregator};

/// Scans every candidate on the pool and folds the outcomes into one aggregate.
///
/// The aggregator lives on the consumer side of the fan-in, so it is mutated by one
/// thread only. Nothing is returned until every scan task has completed.
pub fn scan_candidates(
    pool: &WorkerPool,
    scanner: &Scanner,
    candidates: &[PathBuf],
) -> AggregateResult {
    info!("Scanning {} candidate files", candidates.len());
    let started = Instant::now();

    let result = pool.fan_in(
        "scanning",
        candidates,
        |path| scanner.scan(path),
        |outcomes| {
            let mut aggregator = Aggregator::new();
            for outcome in outcomes {
                aggregator.absorb(outcome);
            }
            aggregator.finish()
        },
    );

    info!(
        "Scan complete in {}. Found {} occurrences on {} lines in {} files ({} scanned, {} symlinks skipped, {} failed)",
        humantime::format_duration(started.elapsed()),
        result.total_occurrences(),
        result.total_findings(),
        result.modify_set.len(),
        result.files_scanned,
        result.symlinks_skipped,
        result.failures.len()
    );

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::matcher::LiteralMatcher;
    use std::fs;
    use std::num::NonZeroUsize;
    use tempfile::tempdir;

    #[test]
    fn test_scan_many_files() {
        let dir = tempdir().unwrap();
        let mut candidates = Vec::new();
        for i in 0..120 {
            let path = dir.path().join(format!("file_{:03}.txt", i));
            let content = if i % 3 == 0 {
                format!("TODO {}\nplain\nTODO TODO\n", i)
            } else {
                "nothing to see\n".to_string()
            };
            fs::write(&path, content).unwrap();
            candidates.push(path);
        }

        let pool = WorkerPool::new(NonZeroUsize::new(8).unwrap(), false).unwrap();
        let scanner = Scanner::new(LiteralMatcher::new("TODO").unwrap());
        let result = scan_candidates(&pool, &scanner, &candidates);

        assert_eq!(result.files_scanned, 120);
        assert_eq!(result.modify_set.len(), 40);
        assert_eq!(result.total_findings(), 80);
        assert_eq!(result.total_occurrences(), 120);
        assert!(result
            .outcomes
            .windows(2)
            .all(|pair| pair[0].path <= pair[1].path));
    }

    #[test]
    fn test_failed_file_absent_from_aggregate() {
        let dir = tempdir().unwrap();
        let good = dir.path().join("good.txt");
        fs::write(&good, "foo").unwrap();
        let missing = dir.path().join("missing.txt");

        let pool = WorkerPool::new(NonZeroUsize::new(2).unwrap(), false).unwrap();
        let scanner = Scanner::new(LiteralMatcher::new("foo").unwrap());
        let result = scan_candidates(&pool, &scanner, &[missing.clone(), good.clone()]);

        assert_eq!(result.modify_set, vec![good]);
        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].path, missing);
    }
}
