//! Driver manager: the global registration point for drivers.
//!
//! Discovery enumerates every driver registered here on each call, not just
//! the ones the loader probed at startup, so drivers registered directly by
//! the application (or by another facade) are visible too.

use std::sync::{Arc, OnceLock, RwLock};

use tracing::debug;

use crate::driver::error::{SpyError, SpyResult};
use crate::driver::traits::SqlDriver;

/// Holds all registered drivers. Registration happens at startup; reads
/// happen on every discovery call.
pub struct DriverManager {
    drivers: RwLock<Vec<Arc<dyn SqlDriver>>>,
}

impl DriverManager {
    pub fn new() -> Self {
        Self {
            drivers: RwLock::new(Vec::new()),
        }
    }

    /// The process-wide manager used by [`crate::install`].
    pub fn global() -> Arc<DriverManager> {
        static GLOBAL: OnceLock<Arc<DriverManager>> = OnceLock::new();
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(DriverManager::new())))
    }

    /// Register a driver.
    ///
    /// Fails only when the manager itself is unusable (poisoned lock), which
    /// indicates a broken host environment.
    pub fn register(&self, driver: Arc<dyn SqlDriver>) -> SpyResult<()> {
        let mut drivers = self
            .drivers
            .write()
            .map_err(|_| SpyError::registration("driver manager lock poisoned"))?;
        debug!(driver = driver.id(), "driver registered");
        drivers.push(driver);
        Ok(())
    }

    /// Snapshot of all currently registered drivers, in registration order.
    pub fn drivers(&self) -> Vec<Arc<dyn SqlDriver>> {
        self.drivers
            .read()
            .map(|drivers| drivers.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.drivers.read().map(|drivers| drivers.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for DriverManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::driver::types::{ConnectOptions, DriverPropertyInfo};
    use crate::driver::SqlConnection;

    struct NullDriver(&'static str);

    #[async_trait]
    impl SqlDriver for NullDriver {
        fn id(&self) -> &'static str {
            self.0
        }

        fn name(&self) -> &'static str {
            "null driver"
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

    #[test]
    fn registered_drivers_are_enumerated_in_order() {
        let manager = DriverManager::new();
        assert!(manager.is_empty());

        manager
            .register(Arc::new(NullDriver("first")))
            .expect("should register");
        manager
            .register(Arc::new(NullDriver("second")))
            .expect("should register");

        let ids: Vec<&str> = manager.drivers().iter().map(|d| d.id()).collect();
        assert_eq!(ids, vec!["first", "second"]);
        assert_eq!(manager.len(), 2);
    }

    #[test]
    fn global_manager_is_shared() {
        let a = DriverManager::global();
        let b = DriverManager::global();
        assert!(Arc::ptr_eq(&a, &b));
    }
}
