//! Dialect dispatch: driver identity to formatting strategy.
//!
//! The table is fixed and built once. Lookup is total: any identity without
//! a mapping, including an empty one, resolves to the process-wide default
//! strategy, so resolution can never fail.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use tracing::debug;

use crate::dialect::{DefaultDialect, Dialect, MySqlDialect, OracleDialect, SqlServerDialect};
use crate::driver::traits::SqlConnection;

pub struct DialectRegistry {
    by_identity: HashMap<&'static str, Arc<dyn Dialect>>,
    default_dialect: Arc<dyn Dialect>,
}

impl DialectRegistry {
    /// The process-wide registry instance.
    pub fn global() -> &'static DialectRegistry {
        static REGISTRY: OnceLock<DialectRegistry> = OnceLock::new();
        REGISTRY.get_or_init(DialectRegistry::new)
    }

    fn new() -> Self {
        let oracle: Arc<dyn Dialect> = Arc::new(OracleDialect);
        let sql_server: Arc<dyn Dialect> = Arc::new(SqlServerDialect);
        let my_sql: Arc<dyn Dialect> = Arc::new(MySqlDialect);

        // identities of one family share a single strategy instance
        let mut by_identity: HashMap<&'static str, Arc<dyn Dialect>> = HashMap::new();
        by_identity.insert("oracle", Arc::clone(&oracle));
        by_identity.insert("mssql", Arc::clone(&sql_server));
        by_identity.insert("sqlserver", Arc::clone(&sql_server));
        by_identity.insert("mysql", Arc::clone(&my_sql));
        by_identity.insert("mariadb", Arc::clone(&my_sql));

        Self {
            by_identity,
            default_dialect: Arc::new(DefaultDialect),
        }
    }

    /// Resolve the strategy for a driver identity.
    pub fn for_driver_id(&self, identity: &str) -> Arc<dyn Dialect> {
        self.by_identity
            .get(identity)
            .cloned()
            .unwrap_or_else(|| Arc::clone(&self.default_dialect))
    }

    /// Resolve the strategy for an already-open connection, keyed by the
    /// driver name its metadata reports. A metadata failure falls back to
    /// the default strategy; both resolution paths consult the same table.
    pub fn for_connection(&self, connection: &dyn SqlConnection) -> Arc<dyn Dialect> {
        match connection.metadata() {
            Ok(metadata) => {
                debug!(driver = metadata.driver_name.as_str(), "resolving dialect from metadata");
                self.for_driver_id(&metadata.driver_name)
            }
            Err(_) => Arc::clone(&self.default_dialect),
        }
    }

    /// The fallback strategy returned for unmapped identities.
    pub fn default_dialect(&self) -> Arc<dyn Dialect> {
        Arc::clone(&self.default_dialect)
    }
}
