//! # Unit of Work
//!
//! The single atomic primitive every stock, sale and point mutation runs in.
//!
//! ```text
//! with_atomic_unit(&db, |unit| Box::pin(async move { ... }))
//!      │
//!      ├── 1. wait for the write gate (one unit at a time per Database)
//!      ├── 2. BEGIN
//!      ├── 3. run the closure against unit.conn()
//!      │
//!      ├── Ok(value)  ──► COMMIT   ──► Ok(value)
//!      └── Err(error) ──► ROLLBACK ──► Err(error)
//!
//!  Dropping the future before step 4 (caller cancellation) drops the unit,
//!  which rolls the transaction back and releases the gate.
//! ```
//!
//! ## Rules for closures
//! - Use only `unit.conn()`. Going back to the pool inside a unit can wait
//!   on a connection the unit itself is holding.
//! - Capture owned data (`move`), the future may not borrow the caller.
//! - No network or other external I/O while the gate is held.

use sqlx::{Sqlite, SqliteConnection, Transaction};
use std::future::Future;
use std::pin::Pin;
use tokio::sync::OwnedMutexGuard;
use tracing::{debug, warn};

use crate::error::{DbError, DbResult};
use crate::pool::Database;

/// Future returned by a unit-of-work closure.
pub type UnitFuture<'u, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'u>>;

/// An open transaction holding the database write gate.
///
/// Field order matters: the transaction is dropped (rolled back) before the
/// gate is released.
pub struct UnitOfWork {
    tx: Transaction<'static, Sqlite>,
    _gate: OwnedMutexGuard<()>,
}

impl std::fmt::Debug for UnitOfWork {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnitOfWork").finish_non_exhaustive()
    }
}

impl UnitOfWork {
    pub(crate) fn new(tx: Transaction<'static, Sqlite>, gate: OwnedMutexGuard<()>) -> Self {
        UnitOfWork { tx, _gate: gate }
    }

    /// The unit's connection. Every query inside the unit goes through it.
    pub fn conn(&mut self) -> &mut SqliteConnection {
        &mut self.tx
    }

    /// Commits all work done in the unit.
    pub async fn commit(self) -> DbResult<()> {
        self.tx
            .commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))
    }

    /// Discards all work done in the unit.
    pub async fn rollback(self) -> DbResult<()> {
        self.tx
            .rollback()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))
    }
}

/// Runs `work` as one atomic unit: commit on `Ok`, roll back on `Err`.
///
/// ## Example
/// ```rust,ignore
/// let entry = with_atomic_unit(&db, move |unit| {
///     Box::pin(async move {
///         let product = product::find_by_id(unit.conn(), &product_id).await?;
///         // ...
///         Ok::<_, LedgerError>(entry)
///     })
/// })
/// .await?;
/// ```
pub async fn with_atomic_unit<T, E, F>(db: &Database, work: F) -> Result<T, E>
where
    F: for<'u> FnOnce(&'u mut UnitOfWork) -> UnitFuture<'u, T, E> + Send,
    T: Send,
    E: From<DbError> + Send,
{
    let mut unit = db.begin_unit().await?;
    debug!("Unit of work started");

    let outcome = work(&mut unit).await;

    match outcome {
        Ok(value) => {
            unit.commit().await?;
            debug!("Unit of work committed");
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = unit.rollback().await {
                warn!(error = %rollback_err, "Rollback failed; connection will discard the transaction");
            }
            debug!("Unit of work rolled back");
            Err(err)
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::DbConfig;

    async fn count_products(db: &Database) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(db.pool())
            .await
            .unwrap()
    }

    async fn insert_product(conn: &mut SqliteConnection, id: &str) -> DbResult<()> {
        sqlx::query(
            "INSERT INTO products (id, name, price_cents, created_at, updated_at) \
             VALUES (?1, 'Test', 100, '2026-01-01T00:00:00+00:00', '2026-01-01T00:00:00+00:00')",
        )
        .bind(id)
        .execute(conn)
        .await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_commit_on_ok() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let result: Result<(), DbError> = with_atomic_unit(&db, |unit| {
            Box::pin(async move { insert_product(unit.conn(), "p-1").await })
        })
        .await;

        assert!(result.is_ok());
        assert_eq!(count_products(&db).await, 1);
    }

    #[tokio::test]
    async fn test_rollback_on_err() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let result: Result<(), DbError> = with_atomic_unit(&db, |unit| {
            Box::pin(async move {
                insert_product(unit.conn(), "p-1").await?;
                Err(DbError::Internal("abort".into()))
            })
        })
        .await;

        assert!(result.is_err());
        assert_eq!(count_products(&db).await, 0);
    }

    #[tokio::test]
    async fn test_dropped_unit_rolls_back() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        {
            let mut unit = db.begin_unit().await.unwrap();
            insert_product(unit.conn(), "p-1").await.unwrap();
        }

        assert_eq!(count_products(&db).await, 0);

        // Gate was released: a new unit can start.
        let unit = db.begin_unit().await.unwrap();
        unit.commit().await.unwrap();
    }
}
