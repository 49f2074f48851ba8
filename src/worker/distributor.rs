use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::TaskError;
use super::tasks::{PayloadSendVerifyEmail, TASK_SEND_VERIFY_EMAIL};

pub const DEAD_QUEUE_KEY: &str = "mall:queue:dead";

/// Claimed tasks, scored by the unix-millis deadline of their lease.
pub const INFLIGHT_QUEUE_KEY: &str = "mall:queue:inflight";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Queue {
    Critical,
    Default,
}

impl Queue {
    /// Polling order: critical work drains first.
    pub const ALL: [Queue; 2] = [Queue::Critical, Queue::Default];

    pub fn key(self) -> &'static str {
        match self {
            Queue::Critical => "mall:queue:critical",
            Queue::Default => "mall:queue:default",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskOptions {
    pub queue: Queue,
    /// Delay before the first attempt.
    pub process_in: Duration,
    pub max_retry: u32,
}

impl Default for TaskOptions {
    fn default() -> Self {
        Self {
            queue: Queue::Default,
            process_in: Duration::from_secs(10),
            max_retry: 10,
        }
    }
}

impl TaskOptions {
    pub fn critical() -> Self {
        Self {
            queue: Queue::Critical,
            ..Self::default()
        }
    }
}

/// What is stored in the queue: a typed payload plus its retry bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskEnvelope {
    pub id: Uuid,
    pub kind: String,
    pub payload: serde_json::Value,
    pub queue: Queue,
    pub retried: u32,
    pub max_retry: u32,
}

impl TaskEnvelope {
    pub fn new<P: Serialize>(kind: &str, payload: &P, opts: &TaskOptions) -> Result<Self, TaskError> {
        Ok(Self {
            id: Uuid::new_v4(),
            kind: kind.to_string(),
            payload: serde_json::to_value(payload)?,
            queue: opts.queue,
            retried: 0,
            max_retry: opts.max_retry,
        })
    }
}

/// Writes `envelope` into the sorted set `key`, due at `due_ms` (unix millis).
async fn schedule(
    conn: &mut ConnectionManager,
    key: &str,
    envelope: &TaskEnvelope,
    due_ms: i64,
) -> Result<(), TaskError> {
    let member = serde_json::to_string(envelope)?;
    let _: () = conn.zadd(key, member, due_ms).await?;
    Ok(())
}

#[async_trait]
pub trait TaskDistributor: Send + Sync {
    async fn distribute_task_send_verify_email(
        &self,
        payload: &PayloadSendVerifyEmail,
        opts: TaskOptions,
    ) -> Result<(), TaskError>;
}

#[derive(Clone)]
pub struct RedisTaskDistributor {
    conn: ConnectionManager,
}

impl RedisTaskDistributor {
    pub async fn connect(address: &str) -> Result<Self, TaskError> {
        let client = redis::Client::open(address)?;
        let conn = ConnectionManager::new(client).await?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> ConnectionManager {
        self.conn.clone()
    }

    async fn enqueue<P: Serialize + Sync>(
        &self,
        kind: &str,
        payload: &P,
        opts: TaskOptions,
    ) -> Result<(), TaskError> {
        let envelope = TaskEnvelope::new(kind, payload, &opts)?;
        let delay_ms = i64::try_from(opts.process_in.as_millis()).unwrap_or(i64::MAX);
        let due_ms = Utc::now().timestamp_millis().saturating_add(delay_ms);

        let mut conn = self.conn.clone();
        schedule(&mut conn, opts.queue.key(), &envelope, due_ms).await?;

        tracing::info!(
            task_id = %envelope.id,
            kind,
            queue = opts.queue.key(),
            max_retry = opts.max_retry,
            "enqueued task"
        );
        Ok(())
    }
}

#[async_trait]
impl TaskDistributor for RedisTaskDistributor {
    async fn distribute_task_send_verify_email(
        &self,
        payload: &PayloadSendVerifyEmail,
        opts: TaskOptions,
    ) -> Result<(), TaskError> {
        self.enqueue(TASK_SEND_VERIFY_EMAIL, payload, opts).await
    }
}
