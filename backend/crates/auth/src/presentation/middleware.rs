//! Auth Middleware
//!
//! Restores the caller's session from the cookie and hands the resulting
//! [`AuthContext`] to downstream handlers through request extensions.

use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use platform::cookie::extract_cookie;
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::{AuthContext, RestoreSessionUseCase};
use crate::domain::repository::AuthBackend;

/// Middleware state
pub struct AuthMiddlewareState<B>
where
    B: AuthBackend + Send + Sync + 'static,
{
    pub backend: Arc<B>,
    pub config: Arc<AuthConfig>,
}

impl<B> Clone for AuthMiddlewareState<B>
where
    B: AuthBackend + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            backend: self.backend.clone(),
            config: self.config.clone(),
        }
    }
}

fn auth_required() -> Response {
    (StatusCode::UNAUTHORIZED, [("X-Auth-Required", "true")]).into_response()
}

/// Middleware that requires a restorable session
pub async fn require_auth_context<B>(
    State(state): State<AuthMiddlewareState<B>>,
    mut req: Request<Body>,
    next: Next,
) -> Response
where
    B: AuthBackend + Send + Sync + 'static,
{
    let Some(token) = extract_cookie(req.headers(), &state.config.cookie.name) else {
        return auth_required();
    };

    let mut ctx = AuthContext::new();
    let use_case = RestoreSessionUseCase::new(state.backend.clone(), state.config.restore_retry);
    if let Err(e) = use_case.execute(&token, &mut ctx).await {
        if e.is_transient() {
            return e.into_response();
        }
        return auth_required();
    }

    req.extensions_mut().insert(ctx);
    next.run(req).await
}
