//! Absensi Backend
//!
//! Member registry and daily attendance register over SQLite, served as a
//! REST API plus per-user dashboard page state.

mod api;
mod auth;
mod config;
mod dashboard;
mod db;
mod errors;
mod forms;
mod models;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use auth::{IdentityResolver, TokenResolver};
use config::Config;
use dashboard::PageSessions;
use db::{Repository, Store};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub sessions: Arc<PageSessions>,
    pub identity: Arc<dyn IdentityResolver>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Absensi Backend");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Bind address: {}", config.bind_addr);

    if config.api_tokens.is_empty() {
        tracing::warn!(
            "No access tokens configured (ABSENSI_API_TOKENS). Every request runs as the anonymous user!"
        );
    } else {
        tracing::info!("{} access token(s) configured", config.api_tokens.len());
    }

    let pool = db::init_database(&config.db_path).await?;

    let state = AppState {
        store: Arc::new(Repository::new(pool)),
        sessions: Arc::new(PageSessions::new()),
        identity: Arc::new(TokenResolver::new(config.api_tokens.clone())),
    };

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_identity = state.identity.clone();
    let page_identity = state.identity.clone();

    let api_routes = Router::new()
        // Members
        .route("/members", get(api::list_members).post(api::create_member))
        .route(
            "/members/{id}",
            get(api::get_member)
                .put(api::update_member)
                .delete(api::delete_member),
        )
        // Attendance
        .route(
            "/attendance",
            get(api::list_attendance).post(api::create_attendance),
        )
        .route("/attendance/stats", get(api::attendance_stats))
        .route(
            "/attendance/{id}",
            get(api::get_attendance)
                .put(api::update_attendance)
                .delete(api::delete_attendance),
        )
        .layer(middleware::from_fn(move |req, next| {
            auth::api_auth_layer(api_identity.clone(), req, next)
        }));

    let dashboard_routes = Router::new()
        .route("/dashboard", get(dashboard::members_page))
        .route("/dashboard/members/new", post(dashboard::open_member_add))
        .route("/dashboard/members/{id}/edit", post(dashboard::open_member_edit))
        .route(
            "/dashboard/members/dialog/close",
            post(dashboard::close_member_dialog),
        )
        .route(
            "/dashboard/members/dialog/submit",
            post(dashboard::submit_member_dialog),
        )
        .route(
            "/dashboard/members/{id}/delete",
            post(dashboard::request_member_delete),
        )
        .route(
            "/dashboard/members/delete/confirm",
            post(dashboard::confirm_member_delete),
        )
        .route(
            "/dashboard/members/delete/cancel",
            post(dashboard::cancel_member_delete),
        )
        .route("/dashboard/absensi", get(dashboard::attendance_page))
        .route(
            "/dashboard/absensi/date",
            post(dashboard::change_attendance_date),
        )
        .route("/dashboard/absensi/new", post(dashboard::open_attendance_add))
        .route(
            "/dashboard/absensi/{id}/edit",
            post(dashboard::open_attendance_edit),
        )
        .route(
            "/dashboard/absensi/dialog/close",
            post(dashboard::close_attendance_dialog),
        )
        .route(
            "/dashboard/absensi/dialog/submit",
            post(dashboard::submit_attendance_dialog),
        )
        .route(
            "/dashboard/absensi/{id}/delete",
            post(dashboard::request_attendance_delete),
        )
        .route(
            "/dashboard/absensi/delete/confirm",
            post(dashboard::confirm_attendance_delete),
        )
        .route(
            "/dashboard/absensi/delete/cancel",
            post(dashboard::cancel_attendance_delete),
        )
        .route("/dashboard/logout", post(dashboard::logout))
        .layer(middleware::from_fn(move |req, next| {
            auth::page_gate_layer(page_identity.clone(), req, next)
        }));

    // No auth required
    let public_routes = Router::new()
        .route("/health", get(health_check))
        .route(auth::LOGIN_PATH, get(dashboard::login_page));

    Router::new()
        .nest("/api", api_routes)
        .merge(dashboard_routes)
        .merge(public_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests;
