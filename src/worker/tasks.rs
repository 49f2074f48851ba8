use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{EmailSender, TaskError};
use crate::store::{CreateVerifyEmailRow, Store};

pub const TASK_SEND_VERIFY_EMAIL: &str = "task:send_verify_email";

pub const VERIFY_EMAIL_TTL_MINUTES: i64 = 15;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadSendVerifyEmail {
    pub account: String,
}

/// Everything a task handler may touch.
#[derive(Clone)]
pub struct TaskContext {
    pub store: Store,
    pub mailer: Arc<dyn EmailSender>,
    pub frontend_url: String,
}

/// 32 lowercase hex characters.
pub fn new_secret_code() -> String {
    Uuid::new_v4().simple().to_string()
}

pub fn verify_link(frontend_url: &str, email_id: i64, secret_code: &str) -> String {
    format!(
        "{}/user/verifyEmail?emailId={email_id}&secretCode={secret_code}",
        frontend_url.trim_end_matches('/')
    )
}

/// Issues a fresh verification code for the account and mails the link.
///
/// The user is read by account at processing time, so the task only needs
/// the registering transaction to have committed by then.
pub async fn send_verify_email(
    ctx: &TaskContext,
    payload: PayloadSendVerifyEmail,
) -> Result<(), TaskError> {
    let q = ctx.store.queries();
    let user = q.get_user_by_account(&payload.account).await?;

    let verify_email = q
        .create_verify_email(CreateVerifyEmailRow {
            user_id: user.id,
            email: user.email.clone(),
            secret_code: new_secret_code(),
            expires_at: Utc::now() + Duration::minutes(VERIFY_EMAIL_TTL_MINUTES),
        })
        .await?;

    let link = verify_link(&ctx.frontend_url, verify_email.id, &verify_email.secret_code);
    let body = format!(
        "Hello {},<br/>Thank you for registering with us!<br/>\
         Please <a href=\"{link}\">click here</a> to verify your email address.<br/>\
         The link expires in {VERIFY_EMAIL_TTL_MINUTES} minutes.",
        user.full_name
    );
    ctx.mailer
        .send_email(&user.email, "Welcome to the mall", &body)
        .await?;

    tracing::info!(account = %user.account, email_id = verify_email.id, "verification email sent");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use sea_orm::{DatabaseBackend, MockDatabase};

    use super::*;
    use crate::entity::{users, verify_emails};
    use crate::worker::MailError;

    #[derive(Default)]
    struct RecordingSender {
        sent: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl EmailSender for RecordingSender {
        async fn send_email(&self, to: &str, _subject: &str, body: &str) -> Result<(), MailError> {
            self.sent
                .lock()
                .unwrap()
                .push((to.to_string(), body.to_string()));
            Ok(())
        }
    }

    #[test]
    fn secret_code_has_minimum_length() {
        let code = new_secret_code();
        assert_eq!(code.len(), 32);
        assert_ne!(code, new_secret_code());
    }

    #[test]
    fn link_points_at_frontend_verify_page() {
        assert_eq!(
            verify_link("http://localhost:8080/", 4, "abc"),
            "http://localhost:8080/user/verifyEmail?emailId=4&secretCode=abc"
        );
    }

    #[tokio::test]
    async fn verification_mail_carries_the_stored_code() {
        let now = Utc::now().fixed_offset();
        let user = users::Model {
            id: 9,
            account: "dave00001".into(),
            email: "dave@example.com".into(),
            full_name: "Dave".into(),
            gender_id: 1,
            phone: String::new(),
            address: String::new(),
            shipping_address: String::new(),
            post_code: String::new(),
            hashed_password: "h".into(),
            avatar_url: String::new(),
            status: 1,
            is_email_verified: false,
            password_changed_at: now,
            created_at: now,
        };
        let stored = verify_emails::Model {
            id: 3,
            user_id: 9,
            email: "dave@example.com".into(),
            secret_code: "s".repeat(32),
            is_used: false,
            expires_at: now + Duration::minutes(VERIFY_EMAIL_TTL_MINUTES),
            created_at: now,
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user]])
            .append_query_results([vec![stored]])
            .into_connection();

        let sender = Arc::new(RecordingSender::default());
        let ctx = TaskContext {
            store: Store::new(db),
            mailer: sender.clone(),
            frontend_url: "http://mall.test".into(),
        };

        send_verify_email(
            &ctx,
            PayloadSendVerifyEmail {
                account: "dave00001".into(),
            },
        )
        .await
        .unwrap();

        let sent = sender.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "dave@example.com");
        assert!(sent[0].1.contains(&format!("emailId=3&secretCode={}", "s".repeat(32))));
    }
}
