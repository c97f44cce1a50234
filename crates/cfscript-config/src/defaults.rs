use crate::logging::LogFormat;

/// Pending-command target used when nothing overrides it.
pub const DEFAULT_TARGET_PENDING_COMMANDS: usize = 6;

/// Default log filter expression used by the binaries.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Default pending-command target.
#[must_use]
pub const fn default_target_pending_commands() -> usize {
    DEFAULT_TARGET_PENDING_COMMANDS
}

/// Default log filter expression used by the binaries.
#[must_use]
pub const fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default diagnostic format for the binaries.
#[must_use]
pub const fn default_log_format() -> LogFormat {
    LogFormat::Compact
}

/// Protocol errors are drawn in-game unless silenced.
#[must_use]
pub const fn default_quiet_errors() -> bool {
    false
}
