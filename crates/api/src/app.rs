use axum::{
    middleware,
    routing::{delete, get, patch, post},
    Router,
};
use shared::jwt::{JwtConfig, JwtError};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{
    metrics_handler, metrics_middleware, rate_limit_middleware, request_logging,
    require_user_auth, security_headers_middleware, RateLimiterState,
};
use crate::routes::{admin_groups, admin_pois, admin_users, auth, groups, health, me, rides};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub jwt: Arc<JwtConfig>,
    pub rate_limiter: Option<Arc<RateLimiterState>>,
}

/// Builds the router. Fails when the configured JWT keys cannot be parsed.
pub fn create_app(config: Config, pool: PgPool) -> Result<Router, JwtError> {
    let jwt = Arc::new(config.jwt.build()?);
    let config = Arc::new(config);

    let rate_limiter = RateLimiterState::new(config.security.rate_limit_per_minute).map(Arc::new);

    let state = AppState {
        pool,
        config: config.clone(),
        jwt,
        rate_limiter,
    };

    // Build CORS layer based on configuration
    let cors = if config.security.cors_origins.is_empty() {
        // Default: allow any origin (for development)
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        use tower_http::cors::AllowOrigin;
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    // Signed-in users. Middleware order: auth runs first, then rate limiting
    // (which needs the user id).
    let user_routes = Router::new()
        .route("/api/v1/me", get(me::get_profile).patch(me::update_profile))
        .route(
            "/api/v1/me/children",
            get(me::list_children).post(me::add_child),
        )
        .route("/api/v1/me/children/:child_id", delete(me::delete_child))
        .route("/api/v1/groups", get(groups::list_my_groups))
        .route(
            "/api/v1/groups/:group_id/members",
            get(groups::list_group_members),
        )
        .route("/api/v1/pois", get(groups::list_pois))
        .route(
            "/api/v1/groups/:group_id/rides",
            get(rides::get_feed).post(rides::create_ride),
        )
        .route("/api/v1/rides/:ride_id", get(rides::get_ride))
        .route("/api/v1/rides/:ride_id/accept", post(rides::accept_ride))
        .route("/api/v1/rides/:ride_id/unaccept", post(rides::unaccept_ride))
        .route("/api/v1/rides/:ride_id/complete", post(rides::complete_ride))
        .route("/api/v1/rides/:ride_id/cancel", post(rides::cancel_ride))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_user_auth,
        ));

    // Admin routes; the AdminUser extractor checks the admin flag.
    let admin_routes = Router::new()
        .route("/api/v1/admin/users", get(admin_users::list_users))
        .route(
            "/api/v1/admin/users/:user_id/approve",
            post(admin_users::approve_user),
        )
        .route(
            "/api/v1/admin/groups",
            get(admin_groups::list_groups).post(admin_groups::create_group),
        )
        .route(
            "/api/v1/admin/groups/:group_id",
            patch(admin_groups::update_group),
        )
        .route(
            "/api/v1/admin/groups/:group_id/members",
            get(admin_groups::list_members).post(admin_groups::add_member),
        )
        .route(
            "/api/v1/admin/groups/:group_id/members/:user_id",
            delete(admin_groups::remove_member),
        )
        .route(
            "/api/v1/admin/pois",
            get(admin_pois::list_pois).post(admin_pois::create_poi),
        )
        .route("/api/v1/admin/pois/:poi_id", patch(admin_pois::update_poi))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_user_auth,
        ));

    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler))
        .route("/api/v1/auth/signup", post(auth::signup))
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/v1/auth/refresh", post(auth::refresh))
        .route("/api/v1/auth/logout", post(auth::logout));

    let router = Router::new()
        .merge(public_routes)
        .merge(user_routes)
        .merge(admin_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            security_headers_middleware,
        ))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(request_logging))
        .layer(cors)
        .with_state(state);

    Ok(router)
}
