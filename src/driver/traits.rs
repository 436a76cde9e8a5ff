//! Contracts consumed and produced by the spy facade.
//!
//! [`SqlDriver`] is the interface every real underlying driver exposes; the
//! facade itself implements it too, so it can sit in the driver manager next
//! to the drivers it spies on. [`SqlConnection`] is the connection contract
//! shared by raw connections and their observability wrappers.

use std::any::Any;

use async_trait::async_trait;

use crate::driver::error::{SpyError, SpyResult};
use crate::driver::types::{ConnectOptions, ConnectionMetadata, DriverPropertyInfo};

/// Contract every underlying database driver must implement.
#[async_trait]
pub trait SqlDriver: Send + Sync {
    /// Unique identity for this driver (e.g. "postgres", "mysql").
    ///
    /// This is the key used for dialect resolution and candidate loading.
    fn id(&self) -> &'static str;

    /// Human-readable name for this driver.
    fn name(&self) -> &'static str;

    /// Whether this driver understands the given connection URL.
    async fn accepts_url(&self, url: &str) -> SpyResult<bool>;

    /// Open a connection to the given URL.
    ///
    /// `Ok(None)` means the URL is not for this driver; callers probing a
    /// chain of drivers treat it as "try the next one", not as an error.
    async fn connect(
        &self,
        url: &str,
        options: &ConnectOptions,
    ) -> SpyResult<Option<Box<dyn SqlConnection>>>;

    /// Describe the connect options this driver understands for a URL.
    async fn property_info(
        &self,
        url: &str,
        options: &ConnectOptions,
    ) -> SpyResult<Vec<DriverPropertyInfo>>;

    /// Major version of the driver.
    fn major_version(&self) -> i32;

    /// Minor version of the driver.
    fn minor_version(&self) -> i32;

    /// Whether the driver claims full compliance with the connection
    /// contract it implements.
    fn compliant(&self) -> bool;

    /// Tracing target under which this driver emits its own diagnostics.
    fn log_target(&self) -> SpyResult<&'static str> {
        Err(SpyError::not_supported("log_target"))
    }
}

/// Contract of an open database connection.
#[async_trait]
pub trait SqlConnection: Send + Sync {
    /// Metadata reported by the connection, including the identity of the
    /// driver that produced it.
    fn metadata(&self) -> SpyResult<ConnectionMetadata>;

    /// Close the connection and release its resources.
    async fn close(&self) -> SpyResult<()>;

    /// Downcast support for callers that need the concrete connection type.
    fn as_any(&self) -> &dyn Any;
}

/// Runtime predicate deciding whether a freshly opened connection should be
/// wrapped for SQL logging.
///
/// Owned by the logging backend and read, never written, by the facade. Its
/// answer may change between calls (runtime filter changes), so the facade
/// re-evaluates it on every connect instead of caching it.
pub trait LoggingGate: Send + Sync {
    fn sql_logging_enabled(&self) -> bool;
}
