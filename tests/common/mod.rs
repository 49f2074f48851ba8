#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use mall_api::{
    db::{DbPool, create_orm_conn, create_pool, run_migrations},
    store::{CreateCouponRow, CreateProductRow, CreateUserRow, Store},
    worker::{PayloadSendVerifyEmail, TaskDistributor, TaskError, TaskOptions},
};
use uuid::Uuid;

pub struct TestDb {
    pub pool: DbPool,
    pub store: Store,
}

/// Connects to `TEST_DATABASE_URL` (or `DATABASE_URL`) and applies migrations.
/// Returns `None` when neither is set so the caller can skip.
pub async fn setup() -> anyhow::Result<Option<TestDb>> {
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!("Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration tests.");
            return Ok(None);
        }
    };

    let pool = create_pool(&database_url).await?;
    run_migrations(&pool).await?;
    let store = Store::new(create_orm_conn(&pool));
    Ok(Some(TestDb { pool, store }))
}

/// Lowercase alphanumeric name that will not collide between runs.
pub fn unique(prefix: &str) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{prefix}{}", &suffix[..12])
}

pub async fn count(pool: &DbPool, sql: &str, id: i64) -> anyhow::Result<i64> {
    let n: i64 = sqlx::query_scalar(sql).bind(id).fetch_one(pool).await?;
    Ok(n)
}

pub fn user_row(account: &str) -> CreateUserRow {
    CreateUserRow {
        account: account.to_string(),
        email: format!("{account}@example.com"),
        full_name: "Test Shopper".to_string(),
        gender_id: 0,
        phone: "0900000000".to_string(),
        address: "1 Main St".to_string(),
        shipping_address: "1 Main St".to_string(),
        post_code: "100".to_string(),
        hashed_password: "h".to_string(),
        avatar_url: String::new(),
    }
}

pub fn product_row(title: &str, origin_price: i64, price: i64) -> CreateProductRow {
    CreateProductRow {
        title: title.to_string(),
        category: "test".to_string(),
        description: String::new(),
        content: String::new(),
        origin_price,
        price,
        unit: "pcs".to_string(),
        status: 1,
        image_url: String::new(),
        images_url: Vec::new(),
        created_by: "tests".to_string(),
    }
}

pub fn coupon_row(percent: i32) -> CreateCouponRow {
    let now = Utc::now();
    CreateCouponRow {
        title: "test coupon".to_string(),
        code: unique("code"),
        percent,
        created_by: "tests".to_string(),
        start_at: now - Duration::hours(1),
        expires_at: now + Duration::days(1),
    }
}

/// Records enqueued payloads instead of talking to Redis.
#[derive(Default)]
pub struct RecordingDistributor {
    pub sent: Mutex<Vec<PayloadSendVerifyEmail>>,
    pub fail: bool,
}

impl RecordingDistributor {
    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        })
    }
}

#[async_trait]
impl TaskDistributor for RecordingDistributor {
    async fn distribute_task_send_verify_email(
        &self,
        payload: &PayloadSendVerifyEmail,
        _opts: TaskOptions,
    ) -> Result<(), TaskError> {
        if self.fail {
            return Err(TaskError::UnknownKind("queue unavailable".to_string()));
        }
        self.sent.lock().unwrap().push(payload.clone());
        Ok(())
    }
}
