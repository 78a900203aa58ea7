use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    classify::{ServerErrorsAsFailures, SharedClassifier},
    cors::{AllowOrigin, Any, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::config::{AppConfig, SecurityConfig};
use crate::error::ApiError;
use crate::handlers::{protected, public};
use crate::middleware::jwt_auth_middleware;
use crate::state::AppState;

/// Build the full application router
pub fn app(state: AppState, config: &AppConfig) -> Router {
    let auth = middleware::from_fn_with_state(state.clone(), jwt_auth_middleware);

    // Account creation is public; listing accounts is not
    let users_collection = get(protected::users::list)
        .route_layer(auth.clone())
        .post(public::create_user);

    Router::new()
        // Public
        .route("/health", get(public::health))
        .route("/login", post(public::login))
        .route("/users", users_collection)
        // Protected
        .merge(protected_routes().route_layer(auth))
        .fallback(not_found)
        .with_state(state)
        // Global middleware
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes))
        .layer(cors_layer(&config.security))
        .layer(trace_layer(config.api.enable_request_logging))
}

fn protected_routes() -> Router<AppState> {
    use protected::{projects, tasks, users};

    Router::new()
        .route(
            "/users/:id",
            get(users::get).put(users::update).delete(users::delete),
        )
        .route("/users/:id/projects", get(projects::list_for_user))
        .route("/users/:id/tasks", get(tasks::list_by_assignee))
        .route("/projects", get(projects::list).post(projects::create))
        .route(
            "/projects/:id",
            get(projects::get).put(projects::update).delete(projects::delete),
        )
        .route("/projects/:id/tasks", get(tasks::list_by_project))
        .route("/tasks", get(tasks::list).post(tasks::create))
        .route(
            "/tasks/:id",
            get(tasks::get).put(tasks::update).delete(tasks::delete),
        )
        .route("/tasks/status/:status", get(tasks::list_by_status))
        .route("/dashboard", get(protected::dashboard))
}

async fn not_found() -> ApiError {
    ApiError::not_found("Route not found")
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if !security.enable_cors {
        return CorsLayer::new();
    }

    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    if security.cors_origins.iter().any(|o| o == "*") {
        return base.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    base.allow_origin(AllowOrigin::list(origins))
}

fn trace_layer(verbose: bool) -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>> {
    let level = if verbose { Level::INFO } else { Level::DEBUG };
    TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(level))
        .on_response(DefaultOnResponse::new().level(level))
}

/// Bind and serve until the process is stopped
pub async fn serve(state: AppState, config: &AppConfig) -> anyhow::Result<()> {
    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind {}: {}", bind_addr, e))?;

    tracing::info!("Taskboard API listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app(state, config)).await?;
    Ok(())
}
