use std::sync::Arc;
use std::time::Duration;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use http::{header, HeaderValue, Method};
use tower_cookies::CookieManagerLayer;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::{handlers, middleware_layer, state::AppState};

/// Builds the authentication router.
///
/// The per-IP limiter on login and registration is only installed when
/// `config.rate_limit` is set; it needs `ConnectInfo<SocketAddr>`, which
/// `main` provides.
pub fn router(state: AppState) -> Router {
    let limiter = state.config.rate_limit.and_then(|limit| {
        GovernorConfigBuilder::default()
            .per_second(limit.replenish_seconds)
            .burst_size(limit.burst)
            .finish()
            .map(Arc::new)
    });

    let (login, register) = match &limiter {
        Some(conf) => (
            post(handlers::auth::login).layer(GovernorLayer::new(conf.clone())),
            post(handlers::auth::register).layer(GovernorLayer::new(conf.clone())),
        ),
        None => (
            post(handlers::auth::login),
            post(handlers::auth::register),
        ),
    };

    let cors = CorsLayer::new()
        .allow_origin(
            state
                .config
                .allowed_origins
                .iter()
                .filter_map(|origin| origin.parse::<HeaderValue>().ok())
                .collect::<Vec<_>>(),
        )
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::COOKIE])
        .allow_credentials(true)
        .expose_headers([header::HeaderName::from_static("uuid")])
        .max_age(Duration::from_secs(86400));

    Router::new()
        .route(
            "/auth/",
            get(handlers::auth::login_page)
                .route_layer(from_fn_with_state(
                    state.clone(),
                    middleware_layer::auth::resolve_identity,
                ))
                .merge(login),
        )
        .route(
            "/auth/register",
            get(handlers::auth::register_page).merge(register),
        )
        .route("/auth/logout", get(handlers::auth::logout))
        .route(
            "/auth/me",
            get(handlers::auth::me).route_layer(from_fn_with_state(
                state.clone(),
                middleware_layer::auth::require_auth,
            )),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default())
                .on_request(DefaultOnRequest::default().level(Level::DEBUG))
                .on_response(DefaultOnResponse::default().level(Level::DEBUG))
                .on_failure(DefaultOnFailure::default().level(Level::ERROR)),
        )
        .layer(CookieManagerLayer::new())
        .layer(cors)
        .with_state(state)
}
