//! Vendor dialect strategies.
//!
//! A dialect renders bind values as SQL literals the way the target vendor
//! expects them. Only temporal literals differ between vendors; everything
//! else shares the default rendering.

pub mod registry;

use chrono::{NaiveDate, NaiveDateTime};

use crate::driver::types::Value;

pub use registry::DialectRegistry;

/// A vendor-specific set of formatting rules selected by driver identity.
pub trait Dialect: Send + Sync {
    fn name(&self) -> &'static str;

    /// Vendor rendition of a timestamp literal.
    fn format_timestamp(&self, ts: &NaiveDateTime) -> String {
        format!("'{}'", ts.format("%Y-%m-%d %H:%M:%S%.3f"))
    }

    /// Vendor rendition of a date literal.
    fn format_date(&self, date: &NaiveDate) -> String {
        format!("'{}'", date.format("%Y-%m-%d"))
    }

    /// Render a bind value as a SQL literal.
    ///
    /// Booleans render as `1`/`0`; many databases have no boolean type, so
    /// this is the portable form.
    fn format_parameter(&self, value: &Value) -> String {
        match value {
            Value::Null => "NULL".to_string(),
            Value::Bool(b) => if *b { "1" } else { "0" }.to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Text(s) => quote(s),
            Value::Bytes(bytes) => format!("0x{}", hex(bytes)),
            Value::Timestamp(ts) => self.format_timestamp(ts),
            Value::Date(date) => self.format_date(date),
            Value::Json(json) => quote(&json.to_string()),
        }
    }
}

fn quote(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Fallback strategy for vendors without dedicated formatting rules.
pub struct DefaultDialect;

impl Dialect for DefaultDialect {
    fn name(&self) -> &'static str {
        "generic"
    }
}

/// Oracle renders temporal literals through conversion functions.
pub struct OracleDialect;

impl Dialect for OracleDialect {
    fn name(&self) -> &'static str {
        "oracle"
    }

    fn format_timestamp(&self, ts: &NaiveDateTime) -> String {
        format!(
            "to_timestamp('{}', 'mm/dd/yyyy hh24:mi:ss.ff3')",
            ts.format("%m/%d/%Y %H:%M:%S%.3f")
        )
    }

    fn format_date(&self, date: &NaiveDate) -> String {
        format!(
            "to_date('{}', 'mm/dd/yyyy hh24:mi:ss')",
            date.format("%m/%d/%Y 00:00:00")
        )
    }
}

/// MySQL and MariaDB take plain quoted datetime literals.
pub struct MySqlDialect;

impl Dialect for MySqlDialect {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn format_timestamp(&self, ts: &NaiveDateTime) -> String {
        format!("'{}'", ts.format("%Y-%m-%d %H:%M:%S"))
    }
}

/// SQL Server's family of drivers shares month-first temporal literals.
pub struct SqlServerDialect;

impl Dialect for SqlServerDialect {
    fn name(&self) -> &'static str {
        "sqlserver"
    }

    fn format_timestamp(&self, ts: &NaiveDateTime) -> String {
        format!("'{}'", ts.format("%m-%d-%Y %H:%M:%S%.3f"))
    }

    fn format_date(&self, date: &NaiveDate) -> String {
        format!("'{}'", date.format("%m-%d-%Y"))
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn ts() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 7)
            .unwrap()
            .and_hms_milli_opt(14, 33, 21, 200)
            .unwrap()
    }

    #[test]
    fn default_dialect_quotes_and_escapes_text() {
        let rendered = DefaultDialect.format_parameter(&Value::Text("o'clock".into()));
        assert_eq!(rendered, "'o''clock'");
    }

    #[test]
    fn default_dialect_renders_portable_booleans() {
        assert_eq!(DefaultDialect.format_parameter(&Value::Bool(true)), "1");
        assert_eq!(DefaultDialect.format_parameter(&Value::Bool(false)), "0");
    }

    #[test]
    fn default_dialect_renders_null_and_bytes() {
        assert_eq!(DefaultDialect.format_parameter(&Value::Null), "NULL");
        assert_eq!(
            DefaultDialect.format_parameter(&Value::Bytes(vec![0xca, 0xfe])),
            "0xcafe"
        );
    }

    #[test]
    fn default_dialect_timestamp_is_iso_like() {
        assert_eq!(
            DefaultDialect.format_parameter(&Value::Timestamp(ts())),
            "'2024-03-07 14:33:21.200'"
        );
    }

    #[test]
    fn oracle_wraps_temporals_in_conversion_functions() {
        assert_eq!(
            OracleDialect.format_parameter(&Value::Timestamp(ts())),
            "to_timestamp('03/07/2024 14:33:21.200', 'mm/dd/yyyy hh24:mi:ss.ff3')"
        );
        assert_eq!(
            OracleDialect.format_parameter(&Value::Date(ts().date())),
            "to_date('03/07/2024 00:00:00', 'mm/dd/yyyy hh24:mi:ss')"
        );
    }

    #[test]
    fn mysql_drops_fractional_seconds() {
        assert_eq!(
            MySqlDialect.format_parameter(&Value::Timestamp(ts())),
            "'2024-03-07 14:33:21'"
        );
    }

    #[test]
    fn sqlserver_uses_month_first_literals() {
        assert_eq!(
            SqlServerDialect.format_parameter(&Value::Timestamp(ts())),
            "'03-07-2024 14:33:21.200'"
        );
        assert_eq!(
            SqlServerDialect.format_parameter(&Value::Date(ts().date())),
            "'03-07-2024'"
        );
    }
}
