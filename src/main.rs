use {
    axum::{
        Router,
        extract::DefaultBodyLimit,
        routing::{get, post},
    },
    purchase_sync::infra::postgres::directory_repo::{PgProductCatalog, PgUserDirectory},
    sqlx::postgres::PgPoolOptions,
    std::{env, sync::Arc, time::Duration},
    tokio::signal,
    tower_http::timeout::TimeoutLayer,
};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    dotenvy::dotenv().ok();
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let stripe_webhook_secret =
        env::var("STRIPE_WEBHOOK_SECRET").expect("STRIPE_WEBHOOK_SECRET must be set");
    let lookup_timeout = env::var("LOOKUP_TIMEOUT_MS")
        .ok()
        .and_then(|v| v.parse().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_secs(3));
    let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

    let pool = PgPoolOptions::new()
        .max_connections(20)
        .acquire_timeout(Duration::from_secs(3))
        .connect(&database_url)
        .await
        .expect("failed to connect to database");

    let state = purchase_sync::AppState {
        directory: Arc::new(PgUserDirectory::new(pool.clone())),
        catalog: Arc::new(PgProductCatalog::new(pool.clone())),
        pool,
        stripe_webhook_secret: stripe_webhook_secret.into(),
        lookup_timeout,
    };

    let app = Router::new()
        .route("/", get(|| async { "ok" }))
        .route(
            "/webhooks/stripe",
            post(purchase_sync::adapters::stripe_webhook::stripe_webhook_handler),
        )
        .route(
            "/webhooks/gumroad",
            get(purchase_sync::adapters::gumroad_webhook::gumroad_status_handler)
                .post(purchase_sync::adapters::gumroad_webhook::gumroad_ping_handler),
        )
        .layer(DefaultBodyLimit::max(64 * 1024)) // 64 KB — provider events are typically <20 KB
        // Senders retry when no timely ack arrives; a bounded response window
        // avoids duplicate-delivery storms from our side.
        .layer(TimeoutLayer::new(Duration::from_secs(15)))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await.unwrap();
    tracing::info!("listening on {bind_addr}");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to listen for ctrl+c");
    };

    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to listen for SIGTERM")
            .recv()
            .await;
    };

    tokio::select! {
        _ = ctrl_c => tracing::info!("received ctrl+c, shutting down"),
        _ = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}
