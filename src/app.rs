use std::sync::Arc;

use axum::{
    http::HeaderValue,
    middleware::from_fn_with_state,
    routing::get,
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::EnvFilter;

use crate::auth::JwtSettings;
use crate::config::AppConfig;
use crate::database::{DatabaseManager, TodoStore};
use crate::handlers::{protected::todo_items, public};
use crate::middleware::jwt_auth_middleware;
use crate::services::TodoService;

/// Everything a request handler needs; built once per process (or per test).
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TodoStore>,
    pub todos: TodoService,
    pub jwt: Arc<JwtSettings>,
    pub default_page_size: u32,
    pub cors_origins: Vec<String>,
}

impl AppState {
    pub fn new(store: Arc<dyn TodoStore>, jwt: JwtSettings) -> Self {
        Self {
            todos: TodoService::new(store.clone()),
            store,
            jwt: Arc::new(jwt),
            default_page_size: crate::services::pagination::DEFAULT_PAGE_SIZE,
            cors_origins: Vec::new(),
        }
    }

    pub fn from_config(store: Arc<dyn TodoStore>, config: &AppConfig) -> Self {
        let mut state = Self::new(store, JwtSettings::from(&config.security));
        state.default_page_size = config.api.default_page_size;
        state.cors_origins = config.security.cors_origins.clone();
        state
    }
}

pub fn app(state: AppState) -> Router {
    let protected = Router::new()
        .route("/todoitems", get(todo_items::list).post(todo_items::create))
        .route(
            "/todoitems/:id",
            get(todo_items::get)
                .put(todo_items::update)
                .delete(todo_items::delete),
        )
        .route_layer(from_fn_with_state(state.clone(), jwt_auth_middleware));

    let cors = cors_layer(&state.cors_origins);

    Router::new()
        // Public
        .route("/", get(public::root))
        .route("/health", get(public::health))
        // Protected
        .merge(protected)
        // Global middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Install the global tracing subscriber (`RUST_LOG`, default info).
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("todo_api=info,tower_http=info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Open the configured store and serve until Ctrl-C.
pub async fn serve(config: &AppConfig, seed_users: &[String]) -> anyhow::Result<()> {
    let jwt = JwtSettings::from(&config.security);
    if !jwt.is_configured() {
        anyhow::bail!("JWT_SECRET is not configured");
    }

    if !config.is_development() && config.security.cors_origins.is_empty() {
        tracing::warn!("SECURITY_CORS_ORIGINS is not set; CORS allows any origin");
    }

    let store = DatabaseManager::open_store(config, seed_users).await?;
    let state = AppState::from_config(store, config);

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind {}: {}", bind_addr, e))?;

    tracing::info!("todo-api listening on http://{}", bind_addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("todo-api stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
