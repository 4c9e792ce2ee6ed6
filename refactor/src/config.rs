use config::{Config as ConfigBuilder, ConfigError, File};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

/// Number of file operations allowed in flight at once, for both phases.
pub const DEFAULT_CONCURRENCY: usize = 50;

/// Runtime settings for a refactor run.
///
/// # Configuration Locations
///
/// Files are layered in order of increasing precedence:
/// 1. Global `$HOME/.config/refactor/config.yaml`
/// 2. Local `.refactor.yaml` in the current directory
/// 3. Custom config file specified via `--config`
///
/// # Configuration Format
///
/// ```yaml
/// # Concurrent file operations (scan and rewrite)
/// concurrency: 50
///
/// # Log level (trace, debug, info, warn, error)
/// log_level: "warn"
///
/// # Highlight matches with terminal colors
/// color: true
///
/// # Show progress bars on stderr
/// progress: false
///
/// # Honor .gitignore and skip hidden files while walking
/// respect_ignore: false
/// ```
///
/// Command-line flags take precedence over every file, see [`RefactorConfig::merge_with_cli`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefactorConfig {
    /// Size of the worker pool shared by the scan and rewrite phases
    #[serde(default = "default_concurrency")]
    pub concurrency: NonZeroUsize,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Whether the report may use terminal colors
    #[serde(default = "default_color")]
    pub color: bool,

    /// Whether to draw progress bars while scanning and rewriting
    #[serde(default)]
    pub progress: bool,

    /// Skip hidden and git-ignored paths during the recursive walk
    #[serde(default)]
    pub respect_ignore: bool,
}

fn default_concurrency() -> NonZeroUsize {
    NonZeroUsize::new(DEFAULT_CONCURRENCY).unwrap_or(NonZeroUsize::MIN)
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_color() -> bool {
    true
}

impl Default for RefactorConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            log_level: default_log_level(),
            color: default_color(),
            progress: false,
            respect_ignore: false,
        }
    }
}

/// Values given on the command line; `None` leaves the file value in place.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub concurrency: Option<NonZeroUsize>,
    pub log_level: Option<String>,
    pub no_color: bool,
    pub progress: bool,
    pub respect_ignore: bool,
}

impl RefactorConfig {
    /// Loads configuration from the default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Loads configuration, layering `config_path` over the default locations
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder();

        let config_files = [
            dirs::config_dir().map(|p| p.join("refactor/config.yaml")),
            Some(PathBuf::from(".refactor.yaml")),
        ];

        for path in config_files.iter().flatten() {
            if path.exists() {
                builder = builder.add_source(File::from(path.as_path()));
            }
        }

        // An explicit file must exist.
        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path).required(true));
        }

        builder.build()?.try_deserialize()
    }

    /// Applies command-line values over the loaded configuration
    pub fn merge_with_cli(mut self, cli: ConfigOverrides) -> Self {
        if let Some(concurrency) = cli.concurrency {
            self.concurrency = concurrency;
        }
        if let Some(level) = cli.log_level {
            self.log_level = level;
        }
        if cli.no_color {
            self.color = false;
        }
        self.progress |= cli.progress;
        self.respect_ignore |= cli.respect_ignore;
        self
    }
}

/// What to replace, with what, and whether to write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchSpec {
    pub old_text: String,
    pub new_text: String,
    pub commit: bool,
}

impl SearchSpec {
    pub fn new(old_text: impl Into<String>, new_text: impl Into<String>, commit: bool) -> Self {
        Self {
            old_text: old_text.into(),
            new_text: new_text.into(),
            commit,
        }
    }

    /// Replacing text with itself changes nothing.
    pub fn is_noop(&self) -> bool {
        self.old_text == self.new_text
    }
}
