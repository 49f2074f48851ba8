use std::future::Future;

use super::{CreateUserRow, Store, StoreError, StoreResult};
use crate::entity::{carts, users, verify_emails};
use crate::worker::TaskError;

#[derive(Debug, Clone)]
pub struct CreateUserTxResult {
    pub user: users::Model,
    pub cart: carts::Model,
}

#[derive(Debug, Clone)]
pub struct VerifyEmailTxParams {
    pub email_id: i64,
    pub secret_code: String,
}

#[derive(Debug, Clone)]
pub struct VerifyEmailTxResult {
    pub user: users::Model,
    pub verify_email: verify_emails::Model,
}

impl Store {
    /// Registers a customer together with an empty cart.
    ///
    /// `after_create` runs inside the transaction once both rows are written.
    /// An error from it rolls back the user and the cart alike, so it should
    /// only schedule work that becomes visible later (a delayed queue task).
    pub async fn create_user_tx<H, Fut>(
        &self,
        row: CreateUserRow,
        after_create: H,
    ) -> StoreResult<CreateUserTxResult>
    where
        H: FnOnce(users::Model) -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
    {
        self.exec_tx(move |q| {
            Box::pin(async move {
                let user = q.create_user(row).await?;
                let cart = q.create_cart(user.account.clone()).await?;

                after_create(user.clone())
                    .await
                    .map_err(|err| StoreError::Hook(Box::new(err)))?;

                Ok(CreateUserTxResult { user, cart })
            })
        })
        .await
    }

    /// Consumes a verification code and flags the owner's email as verified.
    /// A code can be consumed once; every later attempt is `NotFound`.
    pub async fn verify_email_tx(&self, params: VerifyEmailTxParams) -> StoreResult<VerifyEmailTxResult> {
        self.exec_tx(move |q| {
            Box::pin(async move {
                let verify_email = q
                    .consume_verify_email(params.email_id, &params.secret_code)
                    .await?
                    .ok_or(StoreError::NotFound)?;
                let user = q.mark_user_email_verified(verify_email.user_id).await?;
                Ok(VerifyEmailTxResult { user, verify_email })
            })
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    use super::*;
    use crate::store::ErrorKind;

    fn row() -> CreateUserRow {
        CreateUserRow {
            account: "carol0001".into(),
            email: "carol@example.com".into(),
            full_name: "Carol".into(),
            gender_id: 0,
            phone: "0912345678".into(),
            address: "2 Side St".into(),
            shipping_address: "2 Side St".into(),
            post_code: "100".into(),
            hashed_password: "h".into(),
            avatar_url: String::new(),
        }
    }

    fn user_model() -> users::Model {
        let now = Utc::now().fixed_offset();
        let row = row();
        users::Model {
            id: 1,
            account: row.account,
            email: row.email,
            full_name: row.full_name,
            gender_id: row.gender_id,
            phone: row.phone,
            address: row.address,
            shipping_address: row.shipping_address,
            post_code: row.post_code,
            hashed_password: row.hashed_password,
            avatar_url: row.avatar_url,
            status: 1,
            is_email_verified: false,
            password_changed_at: now,
            created_at: now,
        }
    }

    fn cart_model() -> carts::Model {
        carts::Model {
            id: 1,
            owner: "carol0001".into(),
            total_price: 0,
            final_price: 0,
            created_at: Utc::now().fixed_offset(),
        }
    }

    #[tokio::test]
    async fn hook_failure_aborts_registration() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user_model()]])
            .append_query_results([vec![cart_model()]])
            .into_connection();
        let store = Store::new(db);

        let err = store
            .create_user_tx(row(), |_| async { Err(TaskError::UnknownKind("boom".into())) })
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::Hook(_)));
        assert_eq!(err.kind(), ErrorKind::Other);
    }

    #[tokio::test]
    async fn hook_sees_the_new_user() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user_model()]])
            .append_query_results([vec![cart_model()]])
            .into_connection();
        let store = Store::new(db);

        let result = store
            .create_user_tx(row(), |user| async move {
                assert_eq!(user.account, "carol0001");
                Ok(())
            })
            .await
            .unwrap();

        assert_eq!(result.cart.owner, result.user.account);
        assert_eq!(result.cart.final_price, 0);
    }

    #[tokio::test]
    async fn unmatched_code_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<verify_emails::Model>::new()])
            .into_connection();
        let store = Store::new(db);

        let err = store
            .verify_email_tx(VerifyEmailTxParams {
                email_id: 1,
                secret_code: "x".repeat(32),
            })
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
