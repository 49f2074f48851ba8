//! Deferred work scheduled after a transaction commits.
//!
//! Producers enqueue through a [`TaskDistributor`]; the [`TaskProcessor`]
//! pulls due tasks from Redis and runs the matching handler.

use thiserror::Error;

use crate::store::StoreError;

mod distributor;
mod mailer;
mod processor;
mod tasks;

pub use distributor::{Queue, RedisTaskDistributor, TaskDistributor, TaskEnvelope, TaskOptions};
pub use mailer::{EmailSender, LogEmailSender, MailError, SmtpEmailSender};
pub use processor::{TASK_LEASE, TaskProcessor, retry_delay};
pub use tasks::{
    PayloadSendVerifyEmail, TASK_SEND_VERIFY_EMAIL, TaskContext, VERIFY_EMAIL_TTL_MINUTES,
    new_secret_code, send_verify_email, verify_link,
};

#[derive(Debug, Error)]
pub enum TaskError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("invalid task payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("unknown task kind: {0}")]
    UnknownKind(String),

    #[error("task handler timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Mail(#[from] MailError),
}
