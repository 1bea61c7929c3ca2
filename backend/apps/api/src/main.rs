//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.

mod config;

use auth::PbAuthRepository;
use auth::middleware::AuthMiddlewareState;
use axum::{
    Router, http,
    http::{Method, header},
};
use learning::PbLearningRepository;
use platform::client::IpResolver;
use platform::pocketbase::PbClient;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::ApiConfig;

// Re-export unified error types for use in handlers
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "api=info,auth=info,learning=info,platform=info,tower_http=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ApiConfig::from_env()?;

    // Backend client; the service client carries the admin token when configured
    let client = PbClient::new(config.backend_url.clone(), config.backend_timeout)?;
    let service_client = match &config.service_token {
        Some(token) => client.authorized(token.clone()),
        None => {
            tracing::warn!("BACKEND_SERVICE_TOKEN not set, learning reads run unauthenticated");
            client.clone()
        }
    };
    tracing::info!(backend_url = %config.backend_url, "Backend client ready");

    let ip_resolver = match &config.ip_lookup_url {
        Some(url) => IpResolver::public(url.clone(), config.ip_lookup_timeout)?,
        None => IpResolver::disabled(),
    };

    let auth_repo = PbAuthRepository::new(client);
    let learning_repo = PbLearningRepository::new(service_client.clone());
    let session = AuthMiddlewareState {
        backend: Arc::new(auth_repo.clone()),
        config: Arc::new(config.auth.clone()),
    };

    // CORS configuration
    let allowed_origins: Vec<http::HeaderValue> = config
        .frontend_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]))
        .allow_credentials(true);

    // Build router
    let app = Router::new()
        .nest(
            "/api/auth",
            auth::auth_router(auth_repo.clone(), config.auth.clone(), ip_resolver),
        )
        .nest(
            "/api/learning",
            learning::learning_router(
                learning_repo,
                PbAuthRepository::new(service_client),
                session,
            ),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    tracing::info!("Listening on {}", config.listen_addr);

    let listener = TcpListener::bind(config.listen_addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
