//! Auth Router

use axum::{
    Router,
    routing::{get, post},
};
use platform::client::IpResolver;

use crate::application::config::AuthConfig;
use crate::domain::repository::{AccountRepository, AuthBackend, SessionRepository};
use crate::infra::pocketbase::PbAuthRepository;
use crate::presentation::handlers::{self, AuthAppState};

/// Create the Auth router backed by the hosted backend
pub fn auth_router(repo: PbAuthRepository, config: AuthConfig, ip_resolver: IpResolver) -> Router {
    auth_router_generic(AuthAppState::new(repo, config, ip_resolver))
}

/// Create a generic Auth router for any repository implementation
pub fn auth_router_generic<R>(state: AuthAppState<R>) -> Router
where
    R: AuthBackend + AccountRepository + SessionRepository + Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/validate", post(handlers::validate::<R>))
        .route("/signin", post(handlers::sign_in::<R>))
        .route("/otp/request", post(handlers::otp_request::<R>))
        .route("/otp/verify", post(handlers::otp_verify::<R>))
        .route("/signout", post(handlers::sign_out::<R>))
        .route("/status", get(handlers::session_status::<R>))
        .route("/sessions", get(handlers::list_sessions::<R>))
        .route("/login-redirect", get(handlers::login_redirect_target::<R>))
        .with_state(state)
}
