// sqlspy - transparent spy facade over database client drivers
// Core library

pub mod config;
pub mod dialect;
pub mod driver;
pub mod observability;

use std::sync::Arc;

use tracing::debug;

use observability::TracingGate;

pub use config::{Options, SpyConfig, SqlKind};
pub use dialect::{Dialect, DialectRegistry};
pub use driver::{
    ConnectionSpy, DriverLoader, DriverManager, LastRequested, LoggingGate, SpyDriver, SpyError,
    SpyResult, SqlConnection, SqlDriver, URL_MARKER,
};

/// Resolve configuration, probe the well-known underlying drivers, and
/// register the spy facade with the global driver manager.
pub fn install(options: &Options) -> SpyResult<Arc<SpyDriver>> {
    install_with(DriverLoader::new(), options)
}

/// Same as [`install`], with a caller-supplied loader carrying factories
/// for the drivers linked into this build.
///
/// Configuration is resolved exactly once here; loading failures only drop
/// the affected candidate. Failing to register the facade itself is fatal.
pub fn install_with(loader: DriverLoader, options: &Options) -> SpyResult<Arc<SpyDriver>> {
    let config = Arc::new(SpyConfig::resolve(options));
    let manager = DriverManager::global();
    loader.load_into(&manager, &config);

    let spy = Arc::new(SpyDriver::new(
        Arc::clone(&manager),
        config,
        Arc::new(TracingGate),
    ));
    manager.register(Arc::clone(&spy) as Arc<dyn SqlDriver>)?;
    debug!("sqlspy initialized");
    Ok(spy)
}
