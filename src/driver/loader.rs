//! Candidate probing for underlying drivers.
//!
//! At startup the facade probes a candidate set of driver identities: the
//! well-known popular list (unless disabled) merged with any identities
//! named in configuration. A candidate that cannot be instantiated is the
//! expected common case in most deployments and is dropped with a debug
//! note; it never aborts initialization.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::SpyConfig;
use crate::driver::error::SpyResult;
use crate::driver::manager::DriverManager;
use crate::driver::traits::SqlDriver;

/// Well-known driver identities probed when auto-loading is enabled.
///
/// The facade can spy on any driver type; these are just the ones it looks
/// for without being told.
pub const POPULAR_DRIVERS: &[&str] = &[
    "clickhouse",
    "duckdb",
    "mariadb",
    "mssql",
    "mysql",
    "oracle",
    "postgres",
    "sqlite",
];

type DriverFactory = Box<dyn Fn() -> SpyResult<Arc<dyn SqlDriver>> + Send + Sync>;

/// Maps driver identities to the factories that can instantiate them.
///
/// Embedders register a factory for each driver they link in; identities
/// without a factory simply fail to load.
pub struct DriverLoader {
    factories: HashMap<String, DriverFactory>,
}

impl DriverLoader {
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register a factory for a driver identity.
    pub fn register<F>(&mut self, identity: impl Into<String>, factory: F)
    where
        F: Fn() -> SpyResult<Arc<dyn SqlDriver>> + Send + Sync + 'static,
    {
        self.factories.insert(identity.into(), Box::new(factory));
    }

    /// Probe every candidate identity and register the drivers that load.
    ///
    /// Returns the number of drivers registered. An empty result is not
    /// fatal; a driver registered with the manager by other means after
    /// startup is still visible to discovery.
    pub fn load_into(&self, manager: &DriverManager, config: &SpyConfig) -> usize {
        let mut candidates: BTreeSet<&str> = BTreeSet::new();
        if config.auto_load_popular_drivers {
            candidates.extend(POPULAR_DRIVERS);
        }
        candidates.extend(config.extra_drivers.iter().map(String::as_str));

        let mut loaded = 0;
        for identity in candidates {
            let Some(driver) = self.instantiate(identity) else {
                continue;
            };
            match manager.register(driver) {
                Ok(()) => {
                    debug!(driver = identity, "found driver");
                    loaded += 1;
                }
                Err(error) => debug!(driver = identity, %error, "driver registration failed"),
            }
        }

        if loaded == 0 {
            warn!("no underlying database drivers could be loaded");
        }
        loaded
    }

    fn instantiate(&self, identity: &str) -> Option<Arc<dyn SqlDriver>> {
        let Some(factory) = self.factories.get(identity) else {
            debug!(driver = identity, "driver not available");
            return None;
        };
        match factory() {
            Ok(driver) => Some(driver),
            Err(error) => {
                debug!(driver = identity, %error, "driver failed to load");
                None
            }
        }
    }
}

impl Default for DriverLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::config::Options;
    use crate::driver::error::SpyError;
    use crate::driver::types::{ConnectOptions, DriverPropertyInfo};
    use crate::driver::SqlConnection;

    struct StubDriver(&'static str);

    #[async_trait]
    impl SqlDriver for StubDriver {
        fn id(&self) -> &'static str {
            self.0
        }

        fn name(&self) -> &'static str {
            "stub driver"
        }

        async fn accepts_url(&self, _url: &str) -> SpyResult<bool> {
            Ok(false)
        }

        async fn connect(
            &self,
            _url: &str,
            _options: &ConnectOptions,
        ) -> SpyResult<Option<Box<dyn SqlConnection>>> {
            Ok(None)
        }

        async fn property_info(
            &self,
            _url: &str,
            _options: &ConnectOptions,
        ) -> SpyResult<Vec<DriverPropertyInfo>> {
            Ok(Vec::new())
        }

        fn major_version(&self) -> i32 {
            1
        }

        fn minor_version(&self) -> i32 {
            0
        }

        fn compliant(&self) -> bool {
            false
        }
    }

    fn config(pairs: &[(&str, &str)]) -> SpyConfig {
        let options: Options = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        SpyConfig::resolve(&options)
    }

    #[test]
    fn unavailable_candidates_are_dropped_silently() {
        let loader = DriverLoader::new();
        let manager = DriverManager::new();
        let config = config(&[]);

        // popular list is probed but no factories exist
        let loaded = loader.load_into(&manager, &config);
        assert_eq!(loaded, 0);
        assert!(manager.is_empty());
    }

    #[test]
    fn failing_factory_is_dropped_silently() {
        let mut loader = DriverLoader::new();
        loader.register("postgres", || Err(SpyError::driver("libpq missing")));
        loader.register("sqlite", || Ok(Arc::new(StubDriver("sqlite")) as Arc<dyn SqlDriver>));
        let manager = DriverManager::new();

        let loaded = loader.load_into(&manager, &config(&[]));
        assert_eq!(loaded, 1);
        assert_eq!(manager.drivers()[0].id(), "sqlite");
    }

    #[test]
    fn configured_identities_are_merged_and_trimmed() {
        let mut loader = DriverLoader::new();
        loader.register("firebird", || Ok(Arc::new(StubDriver("firebird")) as Arc<dyn SqlDriver>));
        let manager = DriverManager::new();
        let config = config(&[
            ("sqlspy.auto.load.popular.drivers", "false"),
            ("sqlspy.drivers", " firebird , , firebird "),
        ]);

        let loaded = loader.load_into(&manager, &config);
        assert_eq!(loaded, 1);
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn auto_load_disabled_skips_popular_list() {
        let mut loader = DriverLoader::new();
        loader.register("postgres", || Ok(Arc::new(StubDriver("postgres")) as Arc<dyn SqlDriver>));
        let manager = DriverManager::new();
        let config = config(&[("sqlspy.auto.load.popular.drivers", "false")]);

        let loaded = loader.load_into(&manager, &config);
        assert_eq!(loaded, 0);
    }
}
