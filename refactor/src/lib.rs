pub mod config;
pub mod confirm;
pub mod errors;
pub mod lister;
pub mod pipeline;
pub mod pool;
pub mod replace;
pub mod report;
pub mod results;
pub mod search;

pub use config::{RefactorConfig, SearchSpec};
pub use errors::{RefactorError, RefactorResult};
pub use pipeline::{Refactor, RunOutcome, RunState};
pub use results::{AggregateResult, FileScanOutcome, Finding, RewriteOutcome};
