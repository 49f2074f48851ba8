use axum::{
    Json, Router,
    http::{HeaderName, Request, Response, StatusCode, Uri},
    routing::get,
};
use tokio::sync::watch;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use std::{net::SocketAddr, sync::Arc, time::Duration};

use mall_api::{
    bootstrap::ensure_test_admin,
    config::AppConfig,
    db::{create_orm_conn, create_pool, run_migrations},
    response::ErrorBody,
    routes::{create_api_router, doc::scalar_docs, health},
    shutdown::shutdown_signal,
    state::AppState,
    store::Store,
    token::TokenMaker,
    worker::{EmailSender, LogEmailSender, RedisTaskDistributor, SmtpEmailSender, TaskContext, TaskProcessor},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,mall_api=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Arc::new(AppConfig::from_env()?);
    let pool = create_pool(&config.database_url).await?;
    run_migrations(&pool).await?;

    let store = Store::new(create_orm_conn(&pool)).with_tx_timeout(config.db_tx_timeout);
    let distributor = RedisTaskDistributor::connect(&config.redis_address).await?;

    let mailer: Arc<dyn EmailSender> = match &config.smtp {
        Some(smtp) => Arc::new(SmtpEmailSender::new(smtp)?),
        None => Arc::new(LogEmailSender),
    };

    let state = AppState {
        pool: pool.clone(),
        store: store.clone(),
        distributor: Arc::new(distributor.clone()),
        token_maker: Arc::new(TokenMaker::new(&config.token_symmetric_key)),
        config: config.clone(),
    };

    ensure_test_admin(&state).await?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let processor = TaskProcessor::new(
        distributor.connection(),
        TaskContext {
            store,
            mailer,
            frontend_url: config.frontend_url.clone(),
        },
    );
    let processor_handle = tokio::spawn(processor.run(shutdown_rx));

    let api_router = create_api_router(&state);
    let concurrency_limit_layer = ConcurrencyLimitLayer::new(100);

    let request_id_header = HeaderName::from_static("x-request-id");
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<_>| {
            let request_id = request
                .headers()
                .get("x-request-id")
                .and_then(|value| value.to_str().ok())
                .unwrap_or("-");
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = %request_id
            )
        })
        .on_request(|request: &Request<_>, _span: &tracing::Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "request started"
            );
        })
        .on_response(|response: &Response<_>, latency: Duration, _span: &tracing::Span| {
            tracing::info!(
                status = %response.status(),
                ms = %latency.as_millis(),
                "request finished"
            );
        });

    let app = Router::new()
        .route("/health", get(health::health_check))
        .merge(api_router)
        .merge(scalar_docs())
        .fallback(not_found)
        .layer(trace_layer)
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(RequestBodyLimitLayer::new(1024 * 1024))
        .layer(concurrency_limit_layer)
        .with_state(state);

    let addr = SocketAddr::from((config.host.parse::<std::net::IpAddr>()?, config.port));
    tracing::info!("listening on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let _ = shutdown_tx.send(true);
    if let Err(err) = processor_handle.await {
        tracing::error!(error = %err, "task processor panicked");
    }

    Ok(())
}

async fn not_found(uri: Uri) -> (StatusCode, Json<ErrorBody>) {
    let body = ErrorBody {
        error: format!("no route for {}", uri.path()),
    };
    (StatusCode::NOT_FOUND, Json(body))
}
