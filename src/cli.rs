use clap::Parser;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::diagnostics::Diagnostics;
use crate::error::{CorpusError, Result};

const COMPONENT: &str = "cli";

/// Default location of the TEI-epidoc RelaxNG grammar, relative to the working directory
pub const DEFAULT_SCHEMA_PATH: &str = "tei-epidoc.rng";

/// Diagnostic severity levels, ordered from most to least verbose
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum LogLevel {
    Debug,
    Info,
    #[default]
    Warning,
    Error,
}

impl LogLevel {
    /// Parse a level name the way operators type it: surrounding and embedded
    /// whitespace is ignored and case does not matter.
    pub fn parse_name(name: &str) -> Option<Self> {
        let normalized: String = name
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_uppercase();

        match normalized.as_str() {
            "DEBUG" => Some(LogLevel::Debug),
            "INFO" => Some(LogLevel::Info),
            "WARNING" | "WARN" => Some(LogLevel::Warning),
            "ERROR" => Some(LogLevel::Error),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
        }
    }

    pub fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warning => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved run configuration derived from the CLI
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Absolute root of the corpus tree
    pub root: PathBuf,
    pub schema_path: PathBuf,
    pub log_level: LogLevel,
    /// Level name given on the command line that could not be understood
    pub rejected_log_level: Option<String>,
}

impl Config {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let (log_level, rejected_log_level) = cli.resolve_log_level();

        Ok(Self {
            root: resolve_root(&cli.whence)?,
            schema_path: cli.schema.clone(),
            log_level,
            rejected_log_level,
        })
    }

    /// Whether the command line moved the level away from the default
    pub fn level_overridden(&self) -> bool {
        self.log_level != LogLevel::default()
    }

    /// Startup diagnostics: program banner, how the level was chosen, and the
    /// raw command line.
    pub fn announce(&self, argv: &[String], diagnostics: &mut Diagnostics) {
        diagnostics.info(
            COMPONENT,
            format!(
                "{}: {}",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_DESCRIPTION")
            ),
        );

        if let Some(rejected) = &self.rejected_log_level {
            diagnostics.warning(
                COMPONENT,
                format!(
                    "command line option to set log_level failed because '{}' is not a valid level name; using {}",
                    rejected,
                    LogLevel::default()
                ),
            );
        }

        if self.level_overridden() {
            diagnostics.warning(
                COMPONENT,
                format!(
                    "logging level changed to {} via command line option",
                    self.log_level
                ),
            );
        } else {
            diagnostics.info(
                COMPONENT,
                format!("using default logging level: {}", self.log_level),
            );
        }

        diagnostics.debug(COMPONENT, format!("command line: '{}'", argv.join(" ")));
    }
}

/// Resolve the corpus root to an absolute, symlink-free path.
///
/// A root that cannot be canonicalized (typically because it does not exist)
/// is only made absolute; the walk reports the problem later.
fn resolve_root(whence: &Path) -> Result<PathBuf> {
    if whence.as_os_str().is_empty() {
        return Err(CorpusError::Config(
            "root directory must not be empty".to_string(),
        ));
    }

    match std::fs::canonicalize(whence) {
        Ok(root) => Ok(root),
        Err(_) => Ok(std::path::absolute(whence)?),
    }
}

/// Report word and tag statistics for a corpus of TEI-epidoc editions
#[derive(Parser, Debug, Clone)]
#[command(name = "epidoc-stats")]
#[command(about = "filter seminar xml: validate TEI-epidoc files and report edition statistics")]
#[command(version)]
pub struct Cli {
    /// Where to start looking
    #[arg(help = "where to start looking")]
    pub whence: PathBuf,

    #[arg(
        short = 'l',
        long = "loglevel",
        default_value = "WARNING",
        help = "desired logging level (case-insensitive string: DEBUG, INFO, WARNING, or ERROR)"
    )]
    pub loglevel: String,

    #[arg(
        short = 'v',
        long = "verbose",
        help = "verbose output (logging level == INFO)"
    )]
    pub verbose: bool,

    #[arg(
        short = 'w',
        long = "veryverbose",
        help = "very verbose output (logging level == DEBUG)"
    )]
    pub veryverbose: bool,

    #[arg(
        long = "schema",
        default_value = DEFAULT_SCHEMA_PATH,
        help = "RelaxNG schema the documents are validated against"
    )]
    pub schema: PathBuf,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Pick the effective level: `--veryverbose` beats `--verbose`, which
    /// beats `--loglevel`. An unknown level name falls back to the default
    /// and is handed back so it can be reported.
    pub fn resolve_log_level(&self) -> (LogLevel, Option<String>) {
        let (mut level, rejected) = match LogLevel::parse_name(&self.loglevel) {
            Some(level) => (level, None),
            None => (LogLevel::default(), Some(self.loglevel.clone())),
        };

        if self.veryverbose {
            level = LogLevel::Debug;
        } else if self.verbose {
            level = LogLevel::Info;
        }

        (level, rejected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    #[test]
    fn test_basic_cli_parsing() {
        let cli = Cli::try_parse_from(["epidoc-stats", "/tmp"]).unwrap();
        assert_eq!(cli.whence, PathBuf::from("/tmp"));
        assert_eq!(cli.loglevel, "WARNING");
        assert_eq!(cli.schema, PathBuf::from(DEFAULT_SCHEMA_PATH));
        assert!(!cli.verbose);
        assert!(!cli.veryverbose);
    }

    #[test]
    fn test_missing_root_is_a_usage_error() {
        assert!(Cli::try_parse_from(["epidoc-stats"]).is_err());
    }

    #[test]
    fn test_parse_level_names() {
        assert_eq!(LogLevel::parse_name("debug"), Some(LogLevel::Debug));
        assert_eq!(LogLevel::parse_name("  Info "), Some(LogLevel::Info));
        assert_eq!(LogLevel::parse_name("WARN ING"), Some(LogLevel::Warning));
        assert_eq!(LogLevel::parse_name("warn"), Some(LogLevel::Warning));
        assert_eq!(LogLevel::parse_name("ERROR"), Some(LogLevel::Error));
        assert_eq!(LogLevel::parse_name("loud"), None);
    }

    #[test]
    fn test_level_ordering() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warning);
        assert!(LogLevel::Warning < LogLevel::Error);
        assert_eq!(LogLevel::default(), LogLevel::Warning);
    }

    #[test]
    fn test_invalid_level_falls_back_to_default() {
        let cli = Cli::try_parse_from(["epidoc-stats", "-l", "chatty", "/tmp"]).unwrap();
        let (level, rejected) = cli.resolve_log_level();
        assert_eq!(level, LogLevel::Warning);
        assert_eq!(rejected.as_deref(), Some("chatty"));
    }

    #[test]
    fn test_verbose_flags_override_loglevel() {
        let cli = Cli::try_parse_from(["epidoc-stats", "-l", "error", "-v", "/tmp"]).unwrap();
        assert_eq!(cli.resolve_log_level().0, LogLevel::Info);

        let cli = Cli::try_parse_from(["epidoc-stats", "-v", "-w", "/tmp"]).unwrap();
        assert_eq!(cli.resolve_log_level().0, LogLevel::Debug);
    }

    #[test]
    fn test_config_canonicalizes_root() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("corpus");
        std::fs::create_dir(&nested).unwrap();
        let dotted = nested.join("..").join("corpus");

        let cli = Cli::try_parse_from([
            "epidoc-stats".to_string(),
            "--loglevel".to_string(),
            "info".to_string(),
            dotted.to_string_lossy().to_string(),
        ])
        .unwrap();
        let config = Config::from_cli(&cli).unwrap();

        assert_eq!(config.root, std::fs::canonicalize(&nested).unwrap());
        assert_eq!(config.log_level, LogLevel::Info);
        assert!(config.level_overridden());
        assert!(config.rejected_log_level.is_none());
    }

    #[test]
    fn test_announce_rejected_level() {
        let cli = Cli::try_parse_from(["epidoc-stats", "--loglevel", "shouty", "/tmp"]).unwrap();
        let config = Config::from_cli(&cli).unwrap();
        let mut diagnostics = Diagnostics::recording(config.log_level);

        config.announce(&["epidoc-stats".to_string()], &mut diagnostics);

        let messages: Vec<&str> = diagnostics
            .emitted()
            .iter()
            .map(|d| d.message.as_str())
            .collect();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("'shouty' is not a valid level name"));
        assert!(messages[0].ends_with("using WARNING"));
    }

    #[test]
    fn test_announce_debug_level() {
        let cli = Cli::try_parse_from(["epidoc-stats", "-w", "/tmp"]).unwrap();
        let config = Config::from_cli(&cli).unwrap();
        let mut diagnostics = Diagnostics::recording(config.log_level);
        let argv = vec!["epidoc-stats".to_string(), "-w".to_string(), "/tmp".to_string()];

        config.announce(&argv, &mut diagnostics);

        let emitted = diagnostics.emitted();
        assert_eq!(emitted.len(), 3);
        assert_eq!(emitted[0].level, LogLevel::Info);
        assert_eq!(
            emitted[1].message,
            "logging level changed to DEBUG via command line option"
        );
        assert_eq!(emitted[2].message, "command line: 'epidoc-stats -w /tmp'");
    }

    #[test]
    fn test_config_keeps_missing_root_absolute() {
        let cli = Cli::try_parse_from(["epidoc-stats", "does/not/exist"]).unwrap();
        let config = Config::from_cli(&cli).unwrap();
        assert!(config.root.is_absolute());
        assert!(config.root.ends_with("does/not/exist"));
        assert!(!config.level_overridden());
    }
}
