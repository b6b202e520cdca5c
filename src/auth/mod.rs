//! Session gate.
//!
//! Resolves the caller's identity from an access token before any page or API
//! handler runs. Token comparison is constant-time to mitigate timing attacks.

use std::sync::Arc;

use axum::{
    extract::Request,
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use subtle::ConstantTimeEq;

use crate::config::UserToken;
use crate::errors::AppError;

/// Header name for the access token.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Where unauthenticated page requests are sent.
pub const LOGIN_PATH: &str = "/login";

/// Identity used when no tokens are configured.
pub const ANONYMOUS_USER: &str = "anonymous";

/// The authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identity {
    pub user_id: String,
}

/// Resolves the current user of a request.
///
/// Authentication itself lives outside this service; implementations only map
/// request credentials to an identity.
pub trait IdentityResolver: Send + Sync {
    fn current_user(&self, headers: &HeaderMap) -> Option<Identity>;
}

/// Resolver backed by the configured `user:token` pairs.
pub struct TokenResolver {
    tokens: Vec<UserToken>,
}

impl TokenResolver {
    pub fn new(tokens: Vec<UserToken>) -> Self {
        Self { tokens }
    }
}

impl IdentityResolver for TokenResolver {
    fn current_user(&self, headers: &HeaderMap) -> Option<Identity> {
        // If no tokens are configured, everyone is the anonymous user (dev mode)
        if self.tokens.is_empty() {
            return Some(Identity {
                user_id: ANONYMOUS_USER.to_string(),
            });
        }

        let provided = provided_token(headers)?;

        // Check every entry so the time taken does not depend on the match position
        let mut matched = None;
        for entry in &self.tokens {
            if constant_time_compare(provided, &entry.token) && matched.is_none() {
                matched = Some(entry.user.clone());
            }
        }

        matched.map(|user_id| Identity { user_id })
    }
}

/// Extract the token from `x-api-key`, falling back to a bearer token.
fn provided_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .or_else(|| {
            headers
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.strip_prefix("Bearer "))
        })
}

/// Gate for the REST surface: unauthenticated requests get a 401 envelope.
pub async fn api_auth_layer(
    resolver: Arc<dyn IdentityResolver>,
    mut request: Request,
    next: Next,
) -> Response {
    match resolver.current_user(request.headers()) {
        Some(identity) => {
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        None => AppError::Unauthorized("Missing or invalid access token".to_string())
            .into_response(),
    }
}

/// Gate for dashboard pages: unauthenticated requests are redirected to the login page.
pub async fn page_gate_layer(
    resolver: Arc<dyn IdentityResolver>,
    mut request: Request,
    next: Next,
) -> Response {
    match resolver.current_user(request.headers()) {
        Some(identity) => {
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        None => {
            tracing::debug!("Redirecting unauthenticated request for {}", request.uri());
            Redirect::to(LOGIN_PATH).into_response()
        }
    }
}

/// Perform constant-time string comparison.
fn constant_time_compare(a: &str, b: &str) -> bool {
    let a_bytes = a.as_bytes();
    let b_bytes = b.as_bytes();

    a_bytes.ct_eq(b_bytes).into()
}
