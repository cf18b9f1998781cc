use axum::{
    middleware,
    routing::{get, patch, post, put},
    Router,
};
use domain::services::{LockerService, LockerServiceConfig, LockerStores};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{
    metrics_handler, metrics_middleware, require_user_auth, security_headers_middleware, trace_id,
};
use crate::routes::{auth, health, lockers};
use crate::services::{AuthError, AuthService};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub locker_service: Arc<LockerService>,
    pub auth_service: Arc<AuthService>,
}

impl AppState {
    /// Wires the services over the given stores.
    pub fn new(config: Config, pool: PgPool, stores: LockerStores) -> Result<Self, AuthError> {
        let auth_service = AuthService::new(&config)?;
        let locker_service = LockerService::new(
            LockerServiceConfig {
                device_secret: config.iot.device_secret.clone(),
            },
            stores,
        );

        Ok(Self {
            pool,
            config: Arc::new(config),
            locker_service: Arc::new(locker_service),
            auth_service: Arc::new(auth_service),
        })
    }
}

/// Builds the application backed by PostgreSQL.
pub fn create_app(config: Config, pool: PgPool) -> Result<Router, AuthError> {
    let stores = persistence::postgres_stores(pool.clone());
    create_app_with_stores(config, pool, stores)
}

/// Builds the application over arbitrary stores. `pool` only serves the
/// health probes.
pub fn create_app_with_stores(
    config: Config,
    pool: PgPool,
    stores: LockerStores,
) -> Result<Router, AuthError> {
    let state = AppState::new(config, pool, stores)?;
    Ok(router(state))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        layer.allow_origin(AllowOrigin::list(origins))
    }
}

fn router(state: AppState) -> Router {
    let config = state.config.clone();

    // Administrative locker routes (require a session token)
    let protected_routes = Router::new()
        .route("/locker", get(lockers::list_lockers))
        .route("/locker/:id/active", get(lockers::is_active))
        .route("/locker/:id/history", get(lockers::history))
        .route("/locker/:id/register", put(lockers::register_locker))
        .route(
            "/locker/:id",
            patch(lockers::edit_locker).delete(lockers::delete_locker),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_user_auth,
        ));

    // Device routes (device secret or none)
    let device_routes = Router::new()
        .route("/locker", post(lockers::create_locker))
        .route("/locker/serial/:serial/status", get(lockers::get_status))
        .route("/locker/serial/:serial/lock", post(lockers::lock))
        .route("/locker/serial/:serial/unlock", post(lockers::unlock));

    // LINE login handoff
    let auth_routes = Router::new()
        .route("/auth/lineLoginPage", get(auth::line_login_page))
        .route("/auth/admin/lineLoginPage", get(auth::admin_line_login_page))
        .route("/auth/line/callback", get(auth::line_callback))
        .route("/auth/line/admin/callback", get(auth::admin_line_callback))
        .route("/auth/token/line", post(auth::line_token))
        .route("/auth/admin/token/line", post(auth::admin_line_token))
        .route("/auth/myToken/line", post(auth::my_token));

    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    Router::new()
        .merge(public_routes)
        .merge(auth_routes)
        .merge(device_routes)
        .merge(protected_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors_layer(&config.security.cors_origins))
        .with_state(state)
}
