mod common;

use std::sync::Arc;

use axum::extract::State;
use mall_api::{
    config::AppConfig, routes::health::health_check, state::AppState, token::TokenMaker,
};

#[tokio::test]
async fn health_check_reports_database() -> anyhow::Result<()> {
    let Some(db) = common::setup().await? else {
        return Ok(());
    };

    let config = AppConfig {
        database_url: String::new(),
        host: "127.0.0.1".to_string(),
        port: 0,
        token_symmetric_key: "x".repeat(32),
        access_token_duration: std::time::Duration::from_secs(900),
        refresh_token_duration: std::time::Duration::from_secs(86400),
        redis_address: String::new(),
        smtp: None,
        frontend_url: "http://localhost:8080".to_string(),
        test_admin_account: None,
        test_admin_password: None,
        db_tx_timeout: std::time::Duration::from_secs(10),
    };
    let state = AppState {
        pool: db.pool,
        store: db.store,
        distributor: Arc::new(common::RecordingDistributor::default()),
        token_maker: Arc::new(TokenMaker::new(&config.token_symmetric_key)),
        config: Arc::new(config),
    };

    let response = health_check(State(state)).await?;
    assert_eq!(response.0.status, "ok");
    assert_eq!(response.0.database, "ok");
    Ok(())
}
