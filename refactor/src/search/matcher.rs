use crate::errors::{RefactorError, RefactorResult};

/// Plain byte-substring matcher for the text being replaced.
///
/// Matches are non-overlapping and found left to right, so counting and replacing
/// always agree on which occurrences exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiteralMatcher {
    needle: Vec<u8>,
}

impl LiteralMatcher {
    /// Creates a matcher for `text`. An empty needle matches everywhere and is rejected.
    ///
    /// Lines are matched without their terminator, so a needle containing `\n` or ending
    /// in `\r` could only ever match across a line ending. Both are rejected, which keeps
    /// every whole-file match inside a line the scan counted.
    pub fn new(text: &str) -> RefactorResult<Self> {
        if text.is_empty() {
            return Err(RefactorError::invalid_pattern("search text cannot be empty"));
        }
        if text.contains('\n') || text.ends_with('\r') {
            return Err(RefactorError::invalid_pattern(
                "search text cannot contain or end with a line terminator",
            ));
        }
        Ok(Self {
            needle: text.as_bytes().to_vec(),
        })
    }

    pub fn needle(&self) -> &[u8] {
        &self.needle
    }

    /// Start offsets of every non-overlapping occurrence in `haystack`
    pub fn find_iter<'h>(&'h self, haystack: &'h [u8]) -> impl Iterator<Item = usize> + 'h {
        let len = self.needle.len();
        let mut pos = 0;
        std::iter::from_fn(move || {
            if haystack.len().saturating_sub(pos) < len {
                return None;
            }
            let found = pos
                + haystack[pos..]
                    .windows(len)
                    .position(|window| window == self.needle.as_slice())?;
            pos = found + len;
            Some(found)
        })
    }

    pub fn count(&self, haystack: &[u8]) -> usize {
        self.find_iter(haystack).count()
    }

    /// Replaces at most `limit` occurrences, returning the new content and how many
    /// replacements were actually made.
    pub fn replacen(&self, haystack: &[u8], replacement: &[u8], limit: usize) -> (Vec<u8>, usize) {
        let mut out = Vec::with_capacity(haystack.len());
        let mut last = 0;
        let mut replaced = 0;

        for start in self.find_iter(haystack).take(limit) {
            out.extend_from_slice(&haystack[last..start]);
            out.extend_from_slice(replacement);
            last = start + self.needle.len();
            replaced += 1;
        }
        out.extend_from_slice(&haystack[last..]);

        (out, replaced)
    }
}
