//! Transactional unit.
//!
//! Repository methods that must share a transaction take a caller-owned
//! unit of work (`&mut U`) instead of opening their own. [`with_transaction`]
//! owns the begin/commit/rollback lifecycle around a closure that receives
//! that unit of work.

use std::future::Future;

use futures::future::BoxFuture;
use sqlx::{PgConnection, PgPool, Postgres, Transaction};

use crate::error::DbError;

/// A group of writes that either all commit or all roll back.
pub trait UnitOfWork: Send + Sized {
    fn commit(self) -> impl Future<Output = Result<(), DbError>> + Send;

    fn rollback(self) -> impl Future<Output = Result<(), DbError>> + Send;
}

/// A PostgreSQL transaction checked out of the pool.
pub struct PgUnitOfWork {
    inner: Transaction<'static, Postgres>,
}

impl PgUnitOfWork {
    pub async fn begin(pool: &PgPool) -> Result<Self, DbError> {
        Ok(Self {
            inner: pool.begin().await?,
        })
    }

    /// Connection to run statements on inside this transaction.
    pub fn connection(&mut self) -> &mut PgConnection {
        &mut self.inner
    }
}

impl UnitOfWork for PgUnitOfWork {
    async fn commit(self) -> Result<(), DbError> {
        self.inner.commit().await?;
        Ok(())
    }

    async fn rollback(self) -> Result<(), DbError> {
        self.inner.rollback().await?;
        Ok(())
    }
}

/// Run `work` inside `uow`, committing on success and rolling back on error.
///
/// The error returned by `work` is propagated unchanged. A failing rollback
/// is logged and swallowed so it never masks that error. A failing commit is
/// returned as-is; the consumed transaction is rolled back by the driver when
/// it is dropped. Exactly one commit or rollback is issued per call.
pub async fn with_transaction<U, T, E, F>(mut uow: U, work: F) -> Result<T, E>
where
    U: UnitOfWork,
    E: From<DbError>,
    F: for<'u> FnOnce(&'u mut U) -> BoxFuture<'u, Result<T, E>>,
{
    match work(&mut uow).await {
        Ok(value) => {
            uow.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = uow.rollback().await {
                tracing::error!(error = %rollback_err, "Transaction rollback failed");
            }
            Err(err)
        }
    }
}
