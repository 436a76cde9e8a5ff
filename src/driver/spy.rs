//! The spy facade driver.
//!
//! [`SpyDriver`] is a driver that delegates to one or more real underlying
//! drivers. It spies on any driver registered with the manager: prefixing a
//! connection URL with [`URL_MARKER`] routes it through the facade, which
//! finds the real driver for the unprefixed URL, opens the connection
//! through it, and wraps the result for SQL logging when the gate says
//! logging is on.
//!
//! `major_version`, `minor_version` and `compliant` delegate to the last
//! underlying driver requested through any call that carried a URL. These
//! queries are argument-less by contract, so they cannot disambiguate when
//! the facade spies on more than one database type at once; the answer may
//! then reflect whichever driver some other caller resolved last, and
//! before any driver has been resolved they return fixed defaults. This is
//! a known, accepted limitation of the calling contract, not something the
//! facade tries to correct.

use std::sync::{Arc, RwLock};
use std::time::Instant;

use async_trait::async_trait;
use tracing::debug;

use crate::config::SpyConfig;
use crate::dialect::registry::DialectRegistry;
use crate::driver::connection::ConnectionSpy;
use crate::driver::error::{SpyError, SpyResult};
use crate::driver::manager::DriverManager;
use crate::driver::traits::{LoggingGate, SqlConnection, SqlDriver};
use crate::driver::types::{ConnectOptions, DriverPropertyInfo};

/// Marker prefix routing a connection string through the spy facade.
/// Everything after it is the real driver's own URL, unmodified.
pub const URL_MARKER: &str = "sqlspy:";

/// The most recent underlying driver resolved by a URL-carrying call.
#[derive(Clone)]
pub struct LastRequested {
    pub driver: Arc<dyn SqlDriver>,
    pub at: Instant,
}

pub struct SpyDriver {
    manager: Arc<DriverManager>,
    config: Arc<SpyConfig>,
    dialects: &'static DialectRegistry,
    gate: Arc<dyn LoggingGate>,
    /// Single-slot cache feeding the argument-less queries. Last-write-wins
    /// across concurrent callers; never cleared. Poisoning is ignored so the
    /// slot can never abort a caller.
    last_requested: RwLock<Option<LastRequested>>,
}

impl SpyDriver {
    pub fn new(
        manager: Arc<DriverManager>,
        config: Arc<SpyConfig>,
        gate: Arc<dyn LoggingGate>,
    ) -> Self {
        Self {
            manager,
            config,
            dialects: DialectRegistry::global(),
            gate,
            last_requested: RwLock::new(None),
        }
    }

    /// The configuration snapshot resolved at install time. Consumed by the
    /// observability layer for its formatting and timing decisions.
    pub fn config(&self) -> &Arc<SpyConfig> {
        &self.config
    }

    /// The last underlying driver resolved by any URL-carrying call, with
    /// the time it was recorded. Best-effort: see the module docs.
    pub fn last_requested(&self) -> Option<LastRequested> {
        self.last_requested.read().ok().and_then(|slot| slot.clone())
    }

    fn record_last(&self, driver: &Arc<dyn SqlDriver>) {
        if let Ok(mut slot) = self.last_requested.write() {
            *slot = Some(LastRequested {
                driver: Arc::clone(driver),
                at: Instant::now(),
            });
        }
    }

    /// Find the first registered driver that accepts the URL stripped of
    /// the marker.
    ///
    /// Scans every driver currently registered with the manager, not just
    /// the ones the loader probed. A URL without the marker, or one no
    /// driver accepts, yields `None`; neither is an error.
    async fn underlying_driver(&self, url: &str) -> SpyResult<Option<Arc<dyn SqlDriver>>> {
        let Some(real_url) = url.strip_prefix(URL_MARKER) else {
            return Ok(None);
        };
        for driver in self.manager.drivers() {
            if driver.accepts_url(real_url).await? {
                return Ok(Some(driver));
            }
        }
        Ok(None)
    }
}

#[async_trait]
impl SqlDriver for SpyDriver {
    fn id(&self) -> &'static str {
        "sqlspy"
    }

    fn name(&self) -> &'static str {
        "sql spy facade"
    }

    /// True when the URL carries the marker and some underlying driver
    /// accepts the stripped remainder.
    ///
    /// A match is recorded as the last requested driver. The side effect on
    /// a read operation is intentional: the argument-less queries need some
    /// driver to answer from, and this call is often the only one that ever
    /// sees a URL.
    async fn accepts_url(&self, url: &str) -> SpyResult<bool> {
        match self.underlying_driver(url).await? {
            Some(driver) => {
                self.record_last(&driver);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn connect(
        &self,
        url: &str,
        options: &ConnectOptions,
    ) -> SpyResult<Option<Box<dyn SqlConnection>>> {
        let Some(driver) = self.underlying_driver(url).await? else {
            return Ok(None);
        };
        // underlying_driver only resolves when the marker is present
        let real_url = &url[URL_MARKER.len()..];
        self.record_last(&driver);

        let connection = driver.connect(real_url, options).await?;
        let Some(connection) = connection else {
            // the driver accepted this URL and then produced nothing for it
            return Err(SpyError::invalid_url(real_url));
        };

        if !self.gate.sql_logging_enabled() {
            return Ok(Some(connection));
        }

        let dialect = self.dialects.for_driver_id(driver.id());
        debug!(
            driver = driver.id(),
            dialect = dialect.name(),
            "wrapping connection for sql logging"
        );
        Ok(Some(ConnectionSpy::wrap(connection, dialect)))
    }

    /// Property metadata for the underlying driver owning the URL. Safe to
    /// call speculatively: no underlying match yields an empty sequence,
    /// never an error.
    async fn property_info(
        &self,
        url: &str,
        options: &ConnectOptions,
    ) -> SpyResult<Vec<DriverPropertyInfo>> {
        let Some(driver) = self.underlying_driver(url).await? else {
            return Ok(Vec::new());
        };
        let real_url = &url[URL_MARKER.len()..];
        self.record_last(&driver);
        driver.property_info(real_url, options).await
    }

    /// Major version of the last requested underlying driver, or 1 when
    /// none has been resolved yet.
    fn major_version(&self) -> i32 {
        self.last_requested()
            .map(|last| last.driver.major_version())
            .unwrap_or(1)
    }

    /// Minor version of the last requested underlying driver, or 0 when
    /// none has been resolved yet.
    fn minor_version(&self) -> i32 {
        self.last_requested()
            .map(|last| last.driver.minor_version())
            .unwrap_or(0)
    }

    /// Compliance of the last requested underlying driver. Without one the
    /// facade reports false: it cannot do any work on its own.
    fn compliant(&self) -> bool {
        self.last_requested()
            .map(|last| last.driver.compliant())
            .unwrap_or(false)
    }

    fn log_target(&self) -> SpyResult<&'static str> {
        match self.last_requested() {
            Some(last) => last.driver.log_target(),
            None => Err(SpyError::not_supported("log_target")),
        }
    }
}
