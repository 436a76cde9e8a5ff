//! Option resolution and the immutable configuration snapshot.
//!
//! Options arrive as a flat string-keyed map (the loader that produces it is
//! external). Every resolution emits a debug line recording the key, the
//! resolved value, and whether a default was used; a value that fails to
//! parse degrades to its default and never aborts startup.

use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

/// Flat string-keyed option source.
pub type Options = HashMap<String, String>;

/// Default maximum line length when dumping SQL.
pub const DEFAULT_DUMP_SQL_MAX_LINE_LENGTH: u64 = 90;

const ENV_PREFIX: &str = "SQLSPY_";

/// Collect `SQLSPY_*` environment variables into an option map.
///
/// `SQLSPY_AUTO_LOAD_POPULAR_DRIVERS` becomes `sqlspy.auto.load.popular.drivers`.
pub fn from_env() -> Options {
    std::env::vars()
        .filter_map(|(key, value)| {
            let suffix = key.strip_prefix(ENV_PREFIX)?;
            Some((
                format!("sqlspy.{}", suffix.to_ascii_lowercase().replace('_', ".")),
                value,
            ))
        })
        .collect()
}

/// Get a string option. Empty values count as undefined.
fn string_option(options: &Options, key: &str) -> Option<String> {
    match options.get(key).map(|raw| raw.trim()) {
        None | Some("") => {
            debug!(key, "option not defined");
            None
        }
        Some(value) => {
            debug!(key, value, "option resolved");
            Some(value.to_string())
        }
    }
}

/// Get a boolean option. `true`, `yes` and `on` (case-insensitive) are true;
/// anything else present and non-empty is false.
fn bool_option(options: &Options, key: &str, default: bool) -> bool {
    let Some(raw) = options.get(key) else {
        debug!(key, value = default, "option not defined, using default");
        return default;
    };
    let trimmed = raw.trim().to_ascii_lowercase();
    let value = if trimmed.is_empty() {
        default
    } else {
        matches!(trimmed.as_str(), "true" | "yes" | "on")
    };
    debug!(key, value, "option resolved");
    value
}

/// Get an integer option with no default: absent or unparsable means the
/// feature it controls is disabled.
fn uint_option(options: &Options, key: &str) -> Option<u64> {
    match options.get(key) {
        None => {
            debug!(key, "option not defined");
            None
        }
        Some(raw) => match raw.trim().parse::<u64>() {
            Ok(value) => {
                debug!(key, value, "option resolved");
                Some(value)
            }
            Err(_) => {
                debug!(key, raw = raw.as_str(), "option is not a valid number");
                None
            }
        },
    }
}

/// Get an integer option, falling back to a default on absence or parse
/// failure.
fn uint_option_or(options: &Options, key: &str, default: u64) -> u64 {
    match options.get(key) {
        None => {
            debug!(key, value = default, "option not defined, using default");
            default
        }
        Some(raw) => match raw.trim().parse::<u64>() {
            Ok(value) => {
                debug!(key, value, "option resolved");
                value
            }
            Err(_) => {
                debug!(
                    key,
                    raw = raw.as_str(),
                    value = default,
                    "option is not a valid number, using default"
                );
                default
            }
        },
    }
}

/// Statement kinds recognized by the dump filter toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SqlKind {
    Select,
    Insert,
    Update,
    Delete,
    Create,
    Other,
}

/// Immutable configuration snapshot, computed once at startup.
#[derive(Debug, Clone, Serialize)]
pub struct SpyConfig {
    /// Package prefix used to locate the application frame generating SQL.
    pub debug_stack_prefix: Option<String>,
    /// Trace from the calling application's point of view (true when a
    /// stack prefix is set).
    pub trace_from_application: bool,

    /// Warn when SQL takes at least this many milliseconds. `None` disables
    /// the threshold.
    pub sql_timing_warn_ms: Option<u64>,
    /// Log an error when SQL takes at least this many milliseconds. `None`
    /// disables the threshold.
    pub sql_timing_error_ms: Option<u64>,

    /// Dump booleans as `true`/`false` instead of the more portable `1`/`0`.
    pub dump_boolean_as_true_false: bool,
    /// Break dumped SQL into lines no longer than this.
    pub dump_sql_max_line_length: u64,
    /// Dump the full stack trace in debug output.
    pub dump_full_debug_stack_trace: bool,
    /// Warn when plain statements are used instead of prepared statements.
    pub statement_usage_warn: bool,

    pub dump_sql_select: bool,
    pub dump_sql_insert: bool,
    pub dump_sql_update: bool,
    pub dump_sql_delete: bool,
    pub dump_sql_create: bool,
    pub dump_sql_other: bool,
    /// True only when at least one of the per-kind dump toggles is off; lets
    /// the formatter skip the filtering check entirely otherwise.
    pub dump_sql_filtering_on: bool,

    /// Append a semicolon to each dumped statement.
    pub dump_sql_add_semicolon: bool,
    /// Probe the well-known popular driver list at startup.
    pub auto_load_popular_drivers: bool,
    /// Trim dumped SQL.
    pub trim_sql: bool,
    /// Trim dumped SQL line by line; overrides `trim_sql` when set.
    pub trim_sql_lines: bool,
    /// Collapse runs of blank lines in dumped SQL.
    pub trim_extra_blank_lines_in_sql: bool,
    /// Swallow errors from generated-key retrieval after updates.
    pub suppress_generated_keys_exception: bool,

    /// Additional driver identities to probe, from the comma-separated
    /// `sqlspy.drivers` option.
    pub extra_drivers: Vec<String>,
}

impl SpyConfig {
    /// Resolve the snapshot from a raw option source. Never fails: every
    /// malformed value degrades to its documented default.
    pub fn resolve(options: &Options) -> Self {
        let debug_stack_prefix = string_option(options, "sqlspy.debug.stack.prefix");
        let trace_from_application = debug_stack_prefix.is_some();

        let sql_timing_warn_ms = uint_option(options, "sqlspy.sqltiming.warn.threshold");
        let sql_timing_error_ms = uint_option(options, "sqlspy.sqltiming.error.threshold");

        let dump_boolean_as_true_false =
            bool_option(options, "sqlspy.dump.booleanastruefalse", false);
        let dump_sql_max_line_length = uint_option_or(
            options,
            "sqlspy.dump.sql.maxlinelength",
            DEFAULT_DUMP_SQL_MAX_LINE_LENGTH,
        );
        let dump_full_debug_stack_trace =
            bool_option(options, "sqlspy.dump.fulldebugstacktrace", false);
        let statement_usage_warn = bool_option(options, "sqlspy.statement.warn", false);

        let dump_sql_select = bool_option(options, "sqlspy.dump.sql.select", true);
        let dump_sql_insert = bool_option(options, "sqlspy.dump.sql.insert", true);
        let dump_sql_update = bool_option(options, "sqlspy.dump.sql.update", true);
        let dump_sql_delete = bool_option(options, "sqlspy.dump.sql.delete", true);
        let dump_sql_create = bool_option(options, "sqlspy.dump.sql.create", true);
        let dump_sql_other = bool_option(options, "sqlspy.dump.sql.other", true);
        let dump_sql_filtering_on = !(dump_sql_select
            && dump_sql_insert
            && dump_sql_update
            && dump_sql_delete
            && dump_sql_create
            && dump_sql_other);

        let dump_sql_add_semicolon = bool_option(options, "sqlspy.dump.sql.addsemicolon", false);
        let auto_load_popular_drivers =
            bool_option(options, "sqlspy.auto.load.popular.drivers", true);

        let trim_sql = bool_option(options, "sqlspy.trim.sql", true);
        let trim_sql_lines = bool_option(options, "sqlspy.trim.sql.lines", false);
        if trim_sql_lines && trim_sql {
            debug!("sqlspy.trim.sql setting ignored because sqlspy.trim.sql.lines is enabled");
        }
        let trim_extra_blank_lines_in_sql =
            bool_option(options, "sqlspy.trim.sql.extrablanklines", true);
        let suppress_generated_keys_exception =
            bool_option(options, "sqlspy.suppress.generated.keys.exception", false);

        let extra_drivers: Vec<String> = string_option(options, "sqlspy.drivers")
            .map(|csv| {
                csv.split(',')
                    .map(str::trim)
                    .filter(|identity| !identity.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();
        for identity in &extra_drivers {
            debug!(driver = identity.as_str(), "will look for configured driver");
        }

        Self {
            debug_stack_prefix,
            trace_from_application,
            sql_timing_warn_ms,
            sql_timing_error_ms,
            dump_boolean_as_true_false,
            dump_sql_max_line_length,
            dump_full_debug_stack_trace,
            statement_usage_warn,
            dump_sql_select,
            dump_sql_insert,
            dump_sql_update,
            dump_sql_delete,
            dump_sql_create,
            dump_sql_other,
            dump_sql_filtering_on,
            dump_sql_add_semicolon,
            auto_load_popular_drivers,
            trim_sql,
            trim_sql_lines,
            trim_extra_blank_lines_in_sql,
            suppress_generated_keys_exception,
            extra_drivers,
        }
    }

    /// True when SQL of the given kind should be dumped.
    ///
    /// Short-circuits when no filtering is configured; this runs on the
    /// formatter's hot path.
    pub fn dump_enabled(&self, kind: SqlKind) -> bool {
        if !self.dump_sql_filtering_on {
            return true;
        }
        match kind {
            SqlKind::Select => self.dump_sql_select,
            SqlKind::Insert => self.dump_sql_insert,
            SqlKind::Update => self.dump_sql_update,
            SqlKind::Delete => self.dump_sql_delete,
            SqlKind::Create => self.dump_sql_create,
            SqlKind::Other => self.dump_sql_other,
        }
    }
}
