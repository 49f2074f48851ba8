//! Transactional persistence layer.
//!
//! [`Store`] owns the shared connection pool. Single-statement primitives live
//! on [`Queries`], which can be bound either to the pool or to an open
//! transaction; the multi-step domain transactions are methods on [`Store`]
//! that run their primitives through [`Store::exec_tx`].

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionTrait};

mod error;
pub mod pricing;
mod queries;
mod tx_admin_user;
mod tx_cart;
mod tx_order;
mod tx_role;
mod tx_user;

pub use error::{ErrorKind, StoreError, StoreResult, classify, classify_sql_state};
pub use queries::{
    CreateCouponRow, CreateProductRow, CreateSessionRow, CreateUserRow, CreateVerifyEmailRow,
    ProductLine, Queries,
};
pub use tx_admin_user::{
    AdminUserTxResult, CreateAdminUserTxParams, PasswordChange, UpdateAdminUserTxParams,
};
pub use tx_cart::{CartTxResult, CartUpdateType, UpdateCartTxParams};
pub use tx_order::{CreateOrderTxParams, OrderTxResult, PENDING_STATUS_ID, UpdateOrderTxParams};
pub use tx_role::{CreateRoleTxParams, RoleTxResult, UpdateRoleTxParams};
pub use tx_user::{CreateUserTxResult, VerifyEmailTxParams, VerifyEmailTxResult};

pub const DEFAULT_TX_TIMEOUT: Duration = Duration::from_secs(10);

/// Boxed future returned by the closure handed to [`Store::exec_tx`].
pub type TxFuture<'c, T> = Pin<Box<dyn Future<Output = StoreResult<T>> + Send + 'c>>;

#[derive(Clone)]
pub struct Store {
    conn: Arc<DatabaseConnection>,
    tx_timeout: Duration,
}

impl Store {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self {
            conn: Arc::new(conn),
            tx_timeout: DEFAULT_TX_TIMEOUT,
        }
    }

    pub fn with_tx_timeout(mut self, tx_timeout: Duration) -> Self {
        self.tx_timeout = tx_timeout;
        self
    }

    /// Primitives bound to the pool, outside any transaction.
    pub fn queries(&self) -> Queries<'_, DatabaseConnection> {
        Queries::new(&self.conn)
    }

    /// Runs `f` inside a database transaction.
    ///
    /// Commits when `f` succeeds and rolls back when it fails, returning the
    /// original error (wrapped together with the rollback error if rolling
    /// back fails too). Nothing is retried. The handle given to `f` exposes
    /// only primitives, so a transaction cannot open another one.
    ///
    /// If the deadline passes first, the pending future is dropped, which
    /// drops the open transaction and rolls it back.
    pub async fn exec_tx<F, T>(&self, f: F) -> StoreResult<T>
    where
        F: for<'c> FnOnce(&'c Queries<'c, DatabaseTransaction>) -> TxFuture<'c, T> + Send,
        T: Send,
    {
        match tokio::time::timeout(self.tx_timeout, self.run_tx(f)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(
                    timeout_ms = %self.tx_timeout.as_millis(),
                    "transaction deadline exceeded, rolling back"
                );
                Err(StoreError::Timeout(self.tx_timeout))
            }
        }
    }

    async fn run_tx<F, T>(&self, f: F) -> StoreResult<T>
    where
        F: for<'c> FnOnce(&'c Queries<'c, DatabaseTransaction>) -> TxFuture<'c, T> + Send,
        T: Send,
    {
        let txn = self.conn.begin().await?;

        let result = {
            let queries = Queries::new(&txn);
            f(&queries).await
        };

        match result {
            Ok(value) => {
                txn.commit().await?;
                Ok(value)
            }
            Err(err) => match txn.rollback().await {
                Ok(()) => Err(err),
                Err(rollback) => {
                    tracing::error!(error = %rollback, cause = %err, "transaction rollback failed");
                    Err(StoreError::Rollback {
                        source: Box::new(err),
                        rollback,
                    })
                }
            },
        }
    }
}

/// Drops repeated ids while keeping the first occurrence of each.
fn unique_ids(ids: &[i64]) -> Vec<i64> {
    let mut seen = Vec::with_capacity(ids.len());
    for id in ids {
        if !seen.contains(id) {
            seen.push(*id);
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::unique_ids;

    #[test]
    fn unique_ids_keep_caller_order() {
        assert_eq!(unique_ids(&[3, 1, 3, 2, 1]), vec![3, 1, 2]);
        assert!(unique_ids(&[]).is_empty());
    }
}
