//! Shared configuration for CrossFire client scripts.
//!
//! Every script binary resolves the same [`Config`] through `ortho_config`,
//! layering built-in defaults, an optional configuration file, environment
//! variables prefixed with `CFSCRIPT_`, and command-line flags (highest
//! precedence). The resolved values drive command pacing and the telemetry
//! subscriber installed on the diagnostic stream.

mod defaults;
mod logging;

use std::ffi::OsString;
use std::sync::Arc;

use ortho_config::{OrthoConfig, OrthoError};
use serde::{Deserialize, Serialize};

pub use self::defaults::{
    DEFAULT_LOG_FILTER, DEFAULT_TARGET_PENDING_COMMANDS, default_log_filter,
    default_log_filter_string, default_log_format, default_quiet_errors,
    default_target_pending_commands,
};
pub use self::logging::{LogFormat, LogFormatParseError};

/// Resolved configuration shared by the script runtime and its binaries.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "CFSCRIPT")]
pub struct Config {
    /// Number of commands allowed to be in flight before new ones queue up.
    #[ortho_config(default = default_target_pending_commands())]
    pub target_pending_commands: usize,
    /// `tracing` filter expression applied to the diagnostic stream.
    #[ortho_config(default = default_log_filter_string())]
    pub log_filter: String,
    /// Output format for the diagnostic stream.
    #[ortho_config(default = default_log_format())]
    pub log_format: LogFormat,
    /// Keeps protocol errors out of the game window; they are still logged.
    ///
    /// An opt-out switch, so an absent `--quiet-errors` flag leaves in-game
    /// reporting on.
    #[ortho_config(default = default_quiet_errors())]
    pub quiet_errors: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target_pending_commands: default_target_pending_commands(),
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
            quiet_errors: default_quiet_errors(),
        }
    }
}

impl Config {
    /// Loads configuration from the process arguments, environment and
    /// configuration file.
    ///
    /// # Errors
    ///
    /// Returns the loader's error if any layer fails to parse.
    pub fn load() -> Result<Self, Arc<OrthoError>> {
        <Self as OrthoConfig>::load()
    }

    /// Loads configuration using `args` in place of the process arguments.
    ///
    /// The first item is the program name, as with [`std::env::args_os`].
    ///
    /// # Errors
    ///
    /// Returns the loader's error if any layer fails to parse.
    pub fn load_from_iter<I, T>(args: I) -> Result<Self, Arc<OrthoError>>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        <Self as OrthoConfig>::load_from_iter(args)
    }

    /// Number of commands the pacing engine keeps in flight.
    #[must_use]
    pub const fn target_pending_commands(&self) -> usize {
        self.target_pending_commands
    }

    /// Filter expression for the diagnostic subscriber.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_str()
    }

    /// Format of the diagnostic stream.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Whether protocol errors are echoed to the player.
    #[must_use]
    pub const fn echo_errors_in_game(&self) -> bool {
        !self.quiet_errors
    }

    /// Returns a copy with a different pending-command target.
    #[must_use]
    pub const fn with_target_pending_commands(mut self, target: usize) -> Self {
        self.target_pending_commands = target;
        self
    }
}
