//! The scan phase: literal matching, per-file scanning and the scan fan-in.
pub mod engine;
pub mod matcher;
pub mod processor;

pub use engine::scan_candidates;
pub use matcher::LiteralMatcher;
pub use processor::Scanner;
