use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Router;
use sqlx::PgPool;
use std::sync::Arc;
use storefront_core::llm::azure::AzureOpenAiClient;
use storefront_core::llm::{ChatCompleter, CompletionOptions};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod analytics;
mod carts;
mod chat;
mod orders;
mod products;

#[derive(Clone)]
pub struct AppState {
    pub pool: Option<PgPool>,
    pub completer: Option<Arc<dyn ChatCompleter>>,
    pub completion_options: CompletionOptions,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = storefront_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let pool: Option<PgPool> = match settings.require_database_url() {
        Ok(db_url) => match sqlx::postgres::PgPoolOptions::new()
            .max_connections(5)
            .connect(db_url)
            .await
        {
            Ok(pool) => match storefront_core::storage::migrate(&pool).await {
                Ok(()) => {
                    if let Err(e) = storefront_core::demo::ensure_demo_catalog(&pool).await {
                        sentry_anyhow::capture_anyhow(&e);
                        tracing::error!(error = %e, "catalog seed failed");
                    }
                    Some(pool)
                }
                Err(e) => {
                    sentry_anyhow::capture_anyhow(&e);
                    tracing::error!(error = %e, "db migrations failed; starting API in degraded mode");
                    None
                }
            },
            Err(e) => {
                let err = anyhow::Error::new(e);
                sentry_anyhow::capture_anyhow(&err);
                tracing::error!(error = %err, "db connect failed; starting API in degraded mode");
                None
            }
        },
        Err(e) => {
            sentry_anyhow::capture_anyhow(&e);
            tracing::error!(error = %e, "DATABASE_URL missing; starting API in degraded mode");
            None
        }
    };

    // Constructed once up front and injected; missing configuration leaves the
    // analytics and chat paths serving placeholder results instead of failing
    // individual requests with config errors.
    let completer: Option<Arc<dyn ChatCompleter>> =
        match AzureOpenAiClient::from_settings(&settings) {
            Ok(client) => Some(Arc::new(client)),
            Err(e) => {
                tracing::error!(error = %e, "completion client unavailable; insights and chat degraded");
                None
            }
        };

    let state = AppState {
        pool,
        completer,
        completion_options: CompletionOptions::from_env(),
    };

    let app = Router::new()
        .route("/healthz", get(healthz))
        .route("/products", get(products::list_products))
        .route(
            "/carts/:customer_id",
            get(carts::get_cart).delete(carts::clear_cart),
        )
        .route("/carts/:customer_id/items", post(carts::add_item))
        .route(
            "/carts/:customer_id/items/:line_id",
            axum::routing::put(carts::update_quantity).delete(carts::remove_item),
        )
        .route("/carts/:customer_id/checkout", post(carts::checkout))
        .route("/orders/:customer_id", get(orders::list_for_customer))
        .route("/analytics/sales", get(analytics::sales_data))
        .route("/analytics/insights", get(analytics::insights))
        .route("/analytics/chart-data", get(analytics::chart_data))
        .route("/chat", post(chat::chat))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(%addr, "api listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn healthz() -> &'static str {
    "ok"
}

pub(crate) fn internal_error(e: anyhow::Error) -> StatusCode {
    sentry_anyhow::capture_anyhow(&e);
    tracing::error!(error = %e, "request failed");
    StatusCode::INTERNAL_SERVER_ERROR
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn init_sentry(settings: &storefront_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
