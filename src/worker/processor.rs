use std::time::Duration;

use chrono::Utc;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Script};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use super::distributor::{DEAD_QUEUE_KEY, INFLIGHT_QUEUE_KEY};
use super::tasks::{TASK_SEND_VERIFY_EMAIL, TaskContext, send_verify_email};
use super::{Queue, TaskEnvelope, TaskError};

const POLL_INTERVAL: Duration = Duration::from_secs(1);
const BATCH_SIZE: isize = 20;
const BASE_RETRY_DELAY: Duration = Duration::from_secs(5);
const MAX_RETRY_DELAY: Duration = Duration::from_secs(15 * 60);

/// How long a claimed task stays invisible to other pollers.
pub const TASK_LEASE: Duration = Duration::from_secs(5 * 60);
/// Handlers are cut off well before their lease runs out.
const HANDLER_TIMEOUT: Duration = Duration::from_secs(2 * 60);

/// Moves ARGV[1] from KEYS[1] to KEYS[2] with score ARGV[2], only if it was
/// still in KEYS[1]. Returns 1 when this caller performed the move.
const MOVE_MEMBER_LUA: &str = r"
if redis.call('ZREM', KEYS[1], ARGV[1]) == 1 then
    redis.call('ZADD', KEYS[2], ARGV[2], ARGV[1])
    return 1
end
return 0
";

/// Backoff before attempt `retried + 1`: 5s doubled per retry, capped at 15 minutes.
pub fn retry_delay(retried: u32) -> Duration {
    let exponent = retried.saturating_sub(1).min(16);
    BASE_RETRY_DELAY
        .saturating_mul(1u32 << exponent)
        .min(MAX_RETRY_DELAY)
}

fn millis(duration: Duration) -> i64 {
    i64::try_from(duration.as_millis()).unwrap_or(i64::MAX)
}

/// What to do with a claimed task once its handler has returned.
#[derive(Debug)]
enum Settlement {
    /// Done: drop the lease.
    Ack,
    /// Put back on its queue, due at `due_ms`.
    Retry { envelope: TaskEnvelope, due_ms: i64 },
    /// Out of retries: park in the dead set.
    Bury { envelope: TaskEnvelope },
}

fn settle(mut envelope: TaskEnvelope, outcome: &Result<(), TaskError>, now_ms: i64) -> Settlement {
    if outcome.is_ok() {
        return Settlement::Ack;
    }
    if envelope.retried >= envelope.max_retry {
        return Settlement::Bury { envelope };
    }
    envelope.retried += 1;
    let due_ms = now_ms.saturating_add(millis(retry_delay(envelope.retried)));
    Settlement::Retry { envelope, due_ms }
}

/// Queue an expired lease goes back to. The retry count is left alone since
/// the handler never reported a result.
fn reclaim_target(member: &str) -> &'static str {
    match serde_json::from_str::<TaskEnvelope>(member) {
        Ok(envelope) => envelope.queue.key(),
        Err(_) => DEAD_QUEUE_KEY,
    }
}

/// Polls the Redis queues and runs due tasks with at-least-once delivery.
///
/// A task is claimed by moving it atomically into the in-flight set with a
/// lease deadline. It leaves that set only together with its outcome: the
/// ack, the rescheduled copy, or the dead-set copy. If the process dies
/// mid-task the lease expires and the next poll puts the task back.
pub struct TaskProcessor {
    conn: ConnectionManager,
    ctx: TaskContext,
    move_script: Script,
}

impl TaskProcessor {
    pub fn new(conn: ConnectionManager, ctx: TaskContext) -> Self {
        Self {
            conn,
            ctx,
            move_script: Script::new(MOVE_MEMBER_LUA),
        }
    }

    /// Polls until `shutdown` flips. Meant to be spawned beside the server.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        info!("task processor starting");

        let mut interval = tokio::time::interval(POLL_INTERVAL);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if let Err(err) = self.drain_due().await {
                        error!(error = %err, "failed to poll task queue");
                    }
                }
                _ = shutdown.changed() => {
                    info!("task processor shutting down");
                    break;
                }
            }
        }

        info!("task processor stopped");
    }

    async fn drain_due(&mut self) -> Result<(), TaskError> {
        self.reclaim_expired().await?;

        for queue in Queue::ALL {
            loop {
                let now_ms = Utc::now().timestamp_millis();
                let due: Vec<String> = self
                    .conn
                    .zrangebyscore_limit(queue.key(), "-inf", now_ms, 0, BATCH_SIZE)
                    .await?;
                if due.is_empty() {
                    break;
                }
                for member in due {
                    self.claim_and_run(queue, member).await?;
                }
            }
        }
        Ok(())
    }

    async fn move_member(&mut self, from: &str, to: &str, member: &str, score: i64) -> Result<bool, TaskError> {
        let moved: i32 = self
            .move_script
            .key(from)
            .key(to)
            .arg(member)
            .arg(score)
            .invoke_async(&mut self.conn)
            .await?;
        Ok(moved == 1)
    }

    async fn reclaim_expired(&mut self) -> Result<(), TaskError> {
        let now_ms = Utc::now().timestamp_millis();
        let expired: Vec<String> = self
            .conn
            .zrangebyscore_limit(INFLIGHT_QUEUE_KEY, "-inf", now_ms, 0, BATCH_SIZE)
            .await?;
        for member in expired {
            let target = reclaim_target(&member);
            if self.move_member(INFLIGHT_QUEUE_KEY, target, &member, now_ms).await? {
                warn!(queue = target, "task lease expired, requeued");
            }
        }
        Ok(())
    }

    async fn claim_and_run(&mut self, queue: Queue, member: String) -> Result<(), TaskError> {
        let now_ms = Utc::now().timestamp_millis();

        let envelope: TaskEnvelope = match serde_json::from_str(&member) {
            Ok(envelope) => envelope,
            Err(err) => {
                error!(error = %err, queue = queue.key(), "burying malformed task");
                self.move_member(queue.key(), DEAD_QUEUE_KEY, &member, now_ms).await?;
                return Ok(());
            }
        };

        let lease_deadline = now_ms.saturating_add(millis(TASK_LEASE));
        if !self
            .move_member(queue.key(), INFLIGHT_QUEUE_KEY, &member, lease_deadline)
            .await?
        {
            debug!(queue = queue.key(), "task already claimed");
            return Ok(());
        }

        let outcome = match tokio::time::timeout(HANDLER_TIMEOUT, self.process(&envelope)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(TaskError::Timeout(HANDLER_TIMEOUT)),
        };
        if let Err(err) = &outcome {
            warn!(task_id = %envelope.id, kind = %envelope.kind, error = %err, "task failed");
        }

        let task_id = envelope.id;
        let settlement = settle(envelope, &outcome, Utc::now().timestamp_millis());
        self.apply(&member, settlement).await?;
        debug!(%task_id, "task settled");
        Ok(())
    }

    async fn process(&self, envelope: &TaskEnvelope) -> Result<(), TaskError> {
        match envelope.kind.as_str() {
            TASK_SEND_VERIFY_EMAIL => {
                let payload = serde_json::from_value(envelope.payload.clone())?;
                send_verify_email(&self.ctx, payload).await
            }
            other => Err(TaskError::UnknownKind(other.to_string())),
        }
    }

    /// Writes the outcome and drops the lease in one transaction. On failure
    /// the lease stays and the task is reclaimed once it expires.
    async fn apply(&mut self, member: &str, settlement: Settlement) -> Result<(), TaskError> {
        let (target, next_member, score) = match settlement {
            Settlement::Ack => {
                let _: () = self.conn.zrem(INFLIGHT_QUEUE_KEY, member).await?;
                return Ok(());
            }
            Settlement::Retry { envelope, due_ms } => {
                warn!(
                    task_id = %envelope.id,
                    retried = envelope.retried,
                    due_ms,
                    "task rescheduled"
                );
                (envelope.queue.key(), serde_json::to_string(&envelope)?, due_ms)
            }
            Settlement::Bury { envelope } => {
                error!(
                    task_id = %envelope.id,
                    kind = %envelope.kind,
                    retried = envelope.retried,
                    "task exhausted its retries"
                );
                (
                    DEAD_QUEUE_KEY,
                    serde_json::to_string(&envelope)?,
                    Utc::now().timestamp_millis(),
                )
            }
        };

        let _: () = redis::pipe()
            .atomic()
            .zadd(target, next_member, score)
            .ignore()
            .zrem(INFLIGHT_QUEUE_KEY, member)
            .ignore()
            .query_async(&mut self.conn)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::worker::{PayloadSendVerifyEmail, TaskOptions};

    fn envelope(retried: u32, max_retry: u32) -> TaskEnvelope {
        let opts = TaskOptions {
            max_retry,
            ..TaskOptions::critical()
        };
        let payload = PayloadSendVerifyEmail {
            account: "dave0001".into(),
        };
        let mut envelope = TaskEnvelope::new(TASK_SEND_VERIFY_EMAIL, &payload, &opts).unwrap();
        envelope.retried = retried;
        envelope
    }

    #[test]
    fn retry_delay_doubles_then_caps() {
        assert_eq!(retry_delay(1), Duration::from_secs(5));
        assert_eq!(retry_delay(2), Duration::from_secs(10));
        assert_eq!(retry_delay(4), Duration::from_secs(40));
        assert_eq!(retry_delay(9), Duration::from_secs(15 * 60));
        assert_eq!(retry_delay(u32::MAX), Duration::from_secs(15 * 60));
    }

    #[test]
    fn successful_task_is_acked() {
        let settlement = settle(envelope(0, 3), &Ok(()), 1_000);
        assert!(matches!(settlement, Settlement::Ack));
    }

    #[test]
    fn failed_task_goes_back_on_its_queue_with_backoff() {
        let failed = Err(TaskError::UnknownKind("x".into()));
        match settle(envelope(0, 3), &failed, 1_000) {
            Settlement::Retry { envelope, due_ms } => {
                assert_eq!(envelope.retried, 1);
                assert_eq!(envelope.queue, Queue::Critical);
                assert_eq!(due_ms, 1_000 + 5_000);
            }
            other => panic!("expected a retry, got {other:?}"),
        }
    }

    #[test]
    fn exhausted_task_is_buried_unchanged() {
        let failed = Err(TaskError::UnknownKind("x".into()));
        match settle(envelope(3, 3), &failed, 1_000) {
            Settlement::Bury { envelope } => assert_eq!(envelope.retried, 3),
            other => panic!("expected burial, got {other:?}"),
        }
    }

    #[test]
    fn expired_lease_returns_to_the_task_queue() {
        let member = serde_json::to_string(&envelope(2, 3)).unwrap();
        assert_eq!(reclaim_target(&member), Queue::Critical.key());
        assert_eq!(reclaim_target("not json"), DEAD_QUEUE_KEY);
    }

    #[test]
    fn handler_deadline_fits_inside_the_lease() {
        assert!(HANDLER_TIMEOUT < TASK_LEASE);
    }
}
