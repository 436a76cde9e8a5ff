// Driver module
// Delegation and dispatch core: contracts, manager, loader, spy facade

pub mod connection;
pub mod error;
pub mod loader;
pub mod manager;
pub mod spy;
pub mod traits;
pub mod types;

pub use connection::ConnectionSpy;
pub use error::{SpyError, SpyResult};
pub use loader::{DriverLoader, POPULAR_DRIVERS};
pub use manager::DriverManager;
pub use spy::{LastRequested, SpyDriver, URL_MARKER};
pub use traits::{LoggingGate, SqlConnection, SqlDriver};
pub use types::*;
