//! Observability wrapper around a real connection.
//!
//! The wrapper implements the same connection contract as the raw
//! connection it holds, so callers cannot tell them apart; it carries the
//! dialect strategy resolved for the originating driver so downstream
//! formatting can render vendor-correct SQL.

use std::any::Any;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use crate::dialect::Dialect;
use crate::driver::error::SpyResult;
use crate::driver::traits::SqlConnection;
use crate::driver::types::ConnectionMetadata;
use crate::observability::SQL_TARGET;

pub struct ConnectionSpy {
    id: Uuid,
    inner: Box<dyn SqlConnection>,
    dialect: Arc<dyn Dialect>,
}

impl ConnectionSpy {
    /// Wrap a real connection, attaching the dialect strategy resolved for
    /// its driver.
    pub fn wrap(inner: Box<dyn SqlConnection>, dialect: Arc<dyn Dialect>) -> Box<dyn SqlConnection> {
        let spy = Self {
            id: Uuid::new_v4(),
            inner,
            dialect,
        };
        debug!(
            target: SQL_TARGET,
            connection = %spy.id,
            dialect = spy.dialect.name(),
            "connection opened"
        );
        Box::new(spy)
    }

    /// Identifier correlating this connection's log output.
    pub fn connection_id(&self) -> Uuid {
        self.id
    }

    /// The dialect strategy attached at wrap time.
    pub fn dialect(&self) -> &Arc<dyn Dialect> {
        &self.dialect
    }
}

#[async_trait]
impl SqlConnection for ConnectionSpy {
    fn metadata(&self) -> SpyResult<ConnectionMetadata> {
        self.inner.metadata()
    }

    async fn close(&self) -> SpyResult<()> {
        debug!(target: SQL_TARGET, connection = %self.id, "connection closed");
        self.inner.close().await
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::registry::DialectRegistry;
    use crate::driver::error::SpyError;

    struct FakeConnection {
        closed: std::sync::atomic::AtomicBool,
    }

    #[async_trait]
    impl SqlConnection for FakeConnection {
        fn metadata(&self) -> SpyResult<ConnectionMetadata> {
            Ok(ConnectionMetadata::new("fake"))
        }

        async fn close(&self) -> SpyResult<()> {
            if self.closed.swap(true, std::sync::atomic::Ordering::SeqCst) {
                return Err(SpyError::driver("already closed"));
            }
            Ok(())
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[tokio::test]
    async fn wrapper_delegates_metadata_and_close() {
        let inner = Box::new(FakeConnection {
            closed: std::sync::atomic::AtomicBool::new(false),
        });
        let registry = DialectRegistry::global();
        let wrapped = ConnectionSpy::wrap(inner, registry.default_dialect());

        let metadata = wrapped.metadata().expect("should delegate");
        assert_eq!(metadata.driver_name, "fake");
        wrapped.close().await.expect("should delegate close");
    }

    #[test]
    fn wrapper_exposes_the_attached_dialect() {
        let inner = Box::new(FakeConnection {
            closed: std::sync::atomic::AtomicBool::new(false),
        });
        let registry = DialectRegistry::global();
        let wrapped = ConnectionSpy::wrap(inner, registry.for_driver_id("oracle"));

        let spy = wrapped
            .as_any()
            .downcast_ref::<ConnectionSpy>()
            .expect("should downcast to ConnectionSpy");
        assert_eq!(spy.dialect().name(), "oracle");
    }
}
