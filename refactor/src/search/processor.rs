use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{trace, warn};

use super::matcher::LiteralMatcher;
use crate::errors::{RefactorError, RefactorResult};
use crate::results::{FileScanOutcome, Finding, ScanOutcome};

const BUFFER_CAPACITY: usize = 65536;

/// Scans one candidate file for the search text
#[derive(Debug, Clone)]
pub struct Scanner {
    matcher: LiteralMatcher,
}

impl Scanner {
    pub fn new(matcher: LiteralMatcher) -> Self {
        Self { matcher }
    }

    pub fn matcher(&self) -> &LiteralMatcher {
        &self.matcher
    }

    /// Scans `path`, never following symbolic links.
    ///
    /// Failures are returned as [`ScanOutcome::Failed`] rather than propagated so the
    /// rest of the batch keeps going.
    pub fn scan(&self, path: &Path) -> ScanOutcome {
        trace!("Scanning file: {}", path.display());

        let metadata = match fs::symlink_metadata(path) {
            Ok(metadata) => metadata,
            Err(e) => return Self::failed(path, RefactorError::io_at(path, e)),
        };

        if metadata.file_type().is_symlink() {
            trace!("Skipping symbolic link: {}", path.display());
            return ScanOutcome::Symlink(path.to_path_buf());
        }

        match self.scan_lines(path) {
            Ok(findings) => ScanOutcome::Scanned(FileScanOutcome {
                path: path.to_path_buf(),
                findings,
            }),
            Err(e) => Self::failed(path, e),
        }
    }

    fn failed(path: &Path, error: RefactorError) -> ScanOutcome {
        warn!("Skipping {}: {}", path.display(), error);
        ScanOutcome::Failed {
            path: path.to_path_buf(),
            error,
        }
    }

    /// Streams the file line by line. The handle is dropped on every return path.
    fn scan_lines(&self, path: &Path) -> RefactorResult<Vec<Finding>> {
        let file = File::open(path).map_err(|e| RefactorError::io_at(path, e))?;
        let mut reader = BufReader::with_capacity(BUFFER_CAPACITY, file);
        let mut buffer = Vec::with_capacity(256);
        let mut findings = Vec::new();
        let mut line_number = 0;

        loop {
            buffer.clear();
            let read = reader
                .read_until(b'\n', &mut buffer)
                .map_err(|e| RefactorError::io_at(path, e))?;
            if read == 0 {
                break;
            }
            line_number += 1;

            let line = strip_terminator(&buffer);
            let occurrences = self.matcher.count(line);
            if occurrences > 0 {
                findings.push(Finding {
                    line_number,
                    occurrences,
                    line_text: String::from_utf8_lossy(line).into_owned(),
                });
            }
        }

        Ok(findings)
    }
}

/// Drops a trailing `\n` and then a trailing `\r`.
fn strip_terminator(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn scanner(text: &str) -> Scanner {
        Scanner::new(LiteralMatcher::new(text).unwrap())
    }

    fn findings_of(outcome: ScanOutcome) -> Vec<Finding> {
        match outcome {
            ScanOutcome::Scanned(file) => file.findings,
            other => panic!("expected a scanned file, got {:?}", other),
        }
    }

    #[test]
    fn test_counts_partitioned_per_line() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        fs::write(&path, "foo bar foo\nnothing here\n\nfoofoo\nlast foo").unwrap();

        let findings = findings_of(scanner("foo").scan(&path));
        assert_eq!(
            findings,
            vec![
                Finding {
                    line_number: 1,
                    occurrences: 2,
                    line_text: "foo bar foo".to_string()
                },
                Finding {
                    line_number: 4,
                    occurrences: 2,
                    line_text: "foofoo".to_string()
                },
                Finding {
                    line_number: 5,
                    occurrences: 1,
                    line_text: "last foo".to_string()
                },
            ]
        );
        let total: usize = findings.iter().map(|f| f.occurrences).sum();
        assert_eq!(total, 5);
    }

    #[test]
    fn test_crlf_terminators_not_part_of_text() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dos.txt");
        fs::write(&path, "alpha foo\r\nbeta\r\nfoo\r\n").unwrap();

        let findings = findings_of(scanner("foo").scan(&path));
        assert_eq!(findings.len(), 2);
        assert_eq!(findings[0].line_text, "alpha foo");
        assert_eq!(findings[1].line_number, 3);
        assert_eq!(findings[1].line_text, "foo");
    }

    #[test]
    fn test_search_text_never_spans_lines() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("split.txt");
        fs::write(&path, "fo\no\n").unwrap();

        let findings = findings_of(scanner("fo\no").scan(&path));
        assert!(findings.is_empty());
    }

    #[test]
    fn test_non_utf8_content_is_scanned() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("latin1.bin");
        fs::write(&path, b"caf\xe9 foo\n\xff\xfe\n").unwrap();

        let findings = findings_of(scanner("foo").scan(&path));
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].occurrences, 1);
        assert!(findings[0].line_text.ends_with(" foo"));
    }

    #[test]
    fn test_missing_file_fails() {
        let outcome = scanner("foo").scan(Path::new("definitely/not/here.txt"));
        match outcome {
            ScanOutcome::Failed { path, error } => {
                assert_eq!(path, PathBuf::from("definitely/not/here.txt"));
                assert!(matches!(error, RefactorError::FileNotFound(_)));
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[test]
    fn test_directory_fails_without_findings() {
        let dir = tempdir().unwrap();
        let outcome = scanner("foo").scan(dir.path());
        assert!(matches!(outcome, ScanOutcome::Failed { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_skipped() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("target.txt");
        let link = dir.path().join("link.txt");
        fs::write(&target, "foo foo foo").unwrap();
        std::os::unix::fs::symlink(&target, &link).unwrap();

        let outcome = scanner("foo").scan(&link);
        assert!(matches!(outcome, ScanOutcome::Symlink(ref p) if *p == link));
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_skipped() {
        let dir = tempdir().unwrap();
        let link = dir.path().join("dangling");
        std::os::unix::fs::symlink(dir.path().join("gone"), &link).unwrap();

        let outcome = scanner("foo").scan(&link);
        assert!(matches!(outcome, ScanOutcome::Symlink(_)));
    }
}
