use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::errors::RefactorError;

/// Where candidate files come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileLister {
    /// Paths named by the caller, used verbatim
    Explicit(Vec<PathBuf>),
    /// Recursive walk from `root`
    Walk { root: PathBuf, respect_ignore: bool },
}

/// Candidates plus whatever went wrong while producing them
#[derive(Debug, Default)]
pub struct Listing {
    pub candidates: Vec<PathBuf>,
    pub errors: Vec<RefactorError>,
}

impl FileLister {
    /// Explicit files win; with none given, walk the current directory.
    pub fn from_args(files: Vec<PathBuf>, respect_ignore: bool) -> Self {
        if files.is_empty() {
            Self::Walk {
                root: PathBuf::from("."),
                respect_ignore,
            }
        } else {
            Self::Explicit(files)
        }
    }

    pub fn list(&self) -> Listing {
        match self {
            Self::Explicit(files) => Listing {
                candidates: files.clone(),
                errors: Vec::new(),
            },
            Self::Walk {
                root,
                respect_ignore,
            } => walk(root, *respect_ignore),
        }
    }
}

/// Lists every non-directory entry under `root`.
///
/// Links are not followed, so each directory is entered at most once; linked files
/// are still listed and left for the scanner to skip. An unreadable branch is logged
/// and skipped.
fn walk(root: &Path, respect_ignore: bool) -> Listing {
    let mut listing = Listing::default();

    let mut builder = WalkBuilder::new(root);
    builder
        .standard_filters(respect_ignore)
        .follow_links(false);

    for entry in builder.build() {
        match entry {
            Ok(entry) => {
                let listed = entry
                    .file_type()
                    .is_some_and(|ft| ft.is_file() || ft.is_symlink());
                if listed {
                    listing.candidates.push(relative_to(root, entry.into_path()));
                }
            }
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                listing.errors.push(RefactorError::Walk(e));
            }
        }
    }

    debug!(
        "Walk of {} produced {} candidates",
        root.display(),
        listing.candidates.len()
    );
    listing
}

/// `./src/lib.rs` reads better as `src/lib.rs` when walking from `.`.
fn relative_to(root: &Path, path: PathBuf) -> PathBuf {
    if root != Path::new(".") {
        return path;
    }
    match path.strip_prefix(root) {
        Ok(stripped) if !stripped.as_os_str().is_empty() => stripped.to_path_buf(),
        _ => path,
    }
}
