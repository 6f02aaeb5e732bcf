//! Stderr logging for flagstack binaries.
//!
//! The library itself only emits records through the [`log`] facade. A binary
//! picks a [`LogLevel`] and installs a [`Logger`] to see them.

use std::env;
use std::fmt;

/// Environment variable consulted by [`init_logger`].
pub const LOG_MODE_ENV: &str = "FLAGSTACK_LOG_MODE";

/// Output verbosity, ordered from least to most verbose.
///
/// # Examples
///
/// ```
/// use flagstack::LogLevel;
///
/// assert!(LogLevel::Quiet < LogLevel::Normal);
/// assert!(LogLevel::Normal < LogLevel::Verbose);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    /// Nothing but command output.
    Quiet,
    /// Errors and warnings.
    Normal,
    /// Everything, including debug records from flag resolution.
    Verbose,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Quiet => write!(f, "quiet"),
            Self::Normal => write!(f, "normal"),
            Self::Verbose => write!(f, "verbose"),
        }
    }
}

impl LogLevel {
    /// Parses "quiet", "normal" or "verbose", ignoring case.
    ///
    /// # Errors
    ///
    /// Returns an error message for any other string.
    ///
    /// # Examples
    ///
    /// ```
    /// use flagstack::LogLevel;
    ///
    /// assert_eq!(LogLevel::parse("VERBOSE").unwrap(), LogLevel::Verbose);
    /// assert!(LogLevel::parse("loud").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "quiet" => Ok(Self::Quiet),
            "normal" => Ok(Self::Normal),
            "verbose" => Ok(Self::Verbose),
            _ => Err(format!("invalid log level: {s}")),
        }
    }

    /// The most verbose [`log`] level shown at this setting.
    #[must_use]
    pub const fn filter(self) -> log::LevelFilter {
        match self {
            Self::Quiet => log::LevelFilter::Off,
            Self::Normal => log::LevelFilter::Warn,
            Self::Verbose => log::LevelFilter::Debug,
        }
    }
}

/// Writes log records to stderr as `LEVEL: message`.
#[derive(Debug)]
pub struct Logger {
    level: LogLevel,
}

impl Logger {
    /// Creates a logger at `level`.
    #[must_use]
    pub const fn new(level: LogLevel) -> Self {
        Self { level }
    }

    /// The configured level.
    #[must_use]
    pub const fn level(&self) -> LogLevel {
        self.level
    }

    /// Installs this logger as the process-wide [`log`] backend.
    ///
    /// # Errors
    ///
    /// Fails if a backend is already installed.
    pub fn install(self) -> Result<(), log::SetLoggerError> {
        let filter = self.level.filter();
        log::set_boxed_logger(Box::new(self))?;
        log::set_max_level(filter);
        Ok(())
    }

    fn shows(&self, level: log::Level) -> bool {
        level <= self.level.filter()
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new(LogLevel::Normal)
    }
}

impl log::Log for Logger {
    fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
        self.shows(metadata.level())
    }

    fn log(&self, record: &log::Record<'_>) {
        if self.enabled(record.metadata()) {
            eprintln!("{}: {}", record.level().as_str().to_uppercase(), record.args());
        }
    }

    fn flush(&self) {}
}

/// Picks a logger from CLI flags, then [`LOG_MODE_ENV`], then the default.
///
/// `verbose` wins over `quiet` when both are set. An unparseable environment
/// value is ignored.
#[must_use]
pub fn init_logger(verbose: bool, quiet: bool) -> Logger {
    if verbose {
        return Logger::new(LogLevel::Verbose);
    }
    if quiet {
        return Logger::new(LogLevel::Quiet);
    }

    if let Ok(value) = env::var(LOG_MODE_ENV) {
        if let Ok(level) = LogLevel::parse(&value) {
            return Logger::new(level);
        }
    }

    Logger::new(LogLevel::Normal)
}
