//! HTTP Handlers

use axum::Json;
use axum::extract::{ConnectInfo, FromRequestParts, Query, State};
use axum::http::{HeaderMap, StatusCode, header, request::Parts};
use axum::response::{IntoResponse, Response};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use platform::client::{ClientFingerprint, IpResolver, extract_client_ip, extract_fingerprint};
use platform::cookie::extract_cookie;

use crate::application::config::AuthConfig;
use crate::application::navigation::login_redirect;
use crate::application::{
    AuthContext, OtpCoordinator, RestoreSessionUseCase, SessionRecorder, SignInInput,
    SignInOutput, SignInUseCase, SignOutUseCase, VerifyOtpInput, VerifyOtpUseCase,
};
use crate::domain::repository::{AccountRepository, AuthBackend, SessionRepository};
use crate::domain::services::{ValidationReport, validate_credentials};
use crate::domain::value_object::{email::Email, user_password::UserPassword};
use crate::error::AuthResult;
use crate::presentation::dto::{
    CredentialsRequest, LoginRedirectQuery, LoginRedirectResponse, OtpChallengeResponse,
    OtpRequestRequest, OtpVerifyRequest, SessionResponse, SessionStatusResponse, SignInResponse,
    UserResponse,
};

/// Shared state for auth handlers
#[derive(Clone)]
pub struct AuthAppState<R>
where
    R: AuthBackend + AccountRepository + SessionRepository + Clone + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub config: Arc<AuthConfig>,
    pub otp: Arc<OtpCoordinator<R>>,
    pub ip_resolver: Arc<IpResolver>,
}

impl<R> AuthAppState<R>
where
    R: AuthBackend + AccountRepository + SessionRepository + Clone + Send + Sync + 'static,
{
    pub fn new(repo: R, config: AuthConfig, ip_resolver: IpResolver) -> Self {
        let repo = Arc::new(repo);
        let config = Arc::new(config);
        Self {
            otp: Arc::new(OtpCoordinator::new(repo.clone(), config.clone())),
            repo,
            config,
            ip_resolver: Arc::new(ip_resolver),
        }
    }

    fn restore_use_case(&self) -> RestoreSessionUseCase<R> {
        RestoreSessionUseCase::new(self.repo.clone(), self.config.restore_retry)
    }

    /// Context restored from the session cookie; empty when there is none
    /// or the backend rejects it.
    async fn context_from_cookie(&self, headers: &HeaderMap) -> AuthContext {
        let mut ctx = AuthContext::new();
        if let Some(token) = extract_cookie(headers, &self.config.cookie.name) {
            let _ = self.restore_use_case().execute(&token, &mut ctx).await;
        }
        ctx
    }

    fn session_cookie(&self, token: &str) -> [(header::HeaderName, header::HeaderValue); 1] {
        [(header::SET_COOKIE, self.config.cookie.set_cookie_header(token))]
    }
}

// ============================================================================
// Client Fingerprint Extractor
// ============================================================================

/// Device and network origin of the caller
pub struct ClientInfo(pub ClientFingerprint);

impl<S> FromRequestParts<S> for ClientInfo
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let direct_ip = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|info| info.0.ip());
        let client_ip = extract_client_ip(&parts.headers, direct_ip);
        Ok(ClientInfo(extract_fingerprint(&parts.headers, client_ip)))
    }
}

// ============================================================================
// Validate
// ============================================================================

/// POST /api/auth/validate
pub async fn validate<R>(
    State(state): State<AuthAppState<R>>,
    Json(req): Json<CredentialsRequest>,
) -> Json<ValidationReport>
where
    R: AuthBackend + AccountRepository + SessionRepository + Clone + Send + Sync + 'static,
{
    let password = UserPassword::new(req.password);
    Json(validate_credentials(
        &req.email,
        &password,
        &state.config.email_policy,
    ))
}

// ============================================================================
// Sign In
// ============================================================================

/// POST /api/auth/signin
pub async fn sign_in<R>(
    State(state): State<AuthAppState<R>>,
    ClientInfo(fingerprint): ClientInfo,
    Json(req): Json<CredentialsRequest>,
) -> AuthResult<Response>
where
    R: AuthBackend + AccountRepository + SessionRepository + Clone + Send + Sync + 'static,
{
    let use_case = SignInUseCase::new(
        state.repo.clone(),
        state.repo.clone(),
        state.repo.clone(),
        state.otp.clone(),
        state.config.clone(),
        state.ip_resolver.clone(),
    );

    let input = SignInInput {
        email: req.email,
        password: UserPassword::new(req.password),
    };

    let mut ctx = AuthContext::new();
    match use_case.execute(input, fingerprint, &mut ctx).await? {
        SignInOutput::Authenticated { identity, token } => Ok((
            StatusCode::OK,
            state.session_cookie(&token),
            Json(SignInResponse::Authenticated {
                user: UserResponse::from(&identity),
            }),
        )
            .into_response()),
        SignInOutput::OtpRequired(challenge) => {
            // No cookie until the second factor succeeds
            let pending = OtpChallengeResponse::from(&challenge);
            Ok((
                StatusCode::OK,
                Json(SignInResponse::OtpRequired {
                    otp_id: pending.otp_id,
                    email: pending.email,
                    purpose: pending.purpose,
                }),
            )
                .into_response())
        }
    }
}

// ============================================================================
// OTP
// ============================================================================

/// POST /api/auth/otp/request
pub async fn otp_request<R>(
    State(state): State<AuthAppState<R>>,
    Json(req): Json<OtpRequestRequest>,
) -> AuthResult<Json<OtpChallengeResponse>>
where
    R: AuthBackend + AccountRepository + SessionRepository + Clone + Send + Sync + 'static,
{
    let email = Email::parse(&req.email)?;
    let challenge = state.otp.request_otp(&email, req.purpose, None).await?;
    Ok(Json(OtpChallengeResponse::from(&challenge)))
}

/// POST /api/auth/otp/verify
pub async fn otp_verify<R>(
    State(state): State<AuthAppState<R>>,
    ClientInfo(fingerprint): ClientInfo,
    Json(req): Json<OtpVerifyRequest>,
) -> AuthResult<Response>
where
    R: AuthBackend + AccountRepository + SessionRepository + Clone + Send + Sync + 'static,
{
    let input = VerifyOtpInput {
        otp_id: req.otp_id,
        code: req.code,
        email: Email::parse(&req.email)?,
        purpose: req.purpose,
        mfa_id: req.mfa_id,
    };

    let use_case = VerifyOtpUseCase::new(
        state.otp.clone(),
        state.repo.clone(),
        state.repo.clone(),
        &state.config,
        state.ip_resolver.clone(),
    );

    let mut ctx = AuthContext::new();
    let (identity, token) = use_case.execute(&input, &fingerprint, &mut ctx).await?;

    Ok((
        StatusCode::OK,
        state.session_cookie(&token),
        Json(SignInResponse::Authenticated {
            user: UserResponse::from(&identity),
        }),
    )
        .into_response())
}

// ============================================================================
// Sign Out
// ============================================================================

/// POST /api/auth/signout
pub async fn sign_out<R>(State(state): State<AuthAppState<R>>, headers: HeaderMap) -> Response
where
    R: AuthBackend + AccountRepository + SessionRepository + Clone + Send + Sync + 'static,
{
    let mut ctx = state.context_from_cookie(&headers).await;

    if ctx.is_authenticated() {
        let use_case =
            SignOutUseCase::new(state.repo.clone(), &state.config, state.ip_resolver.clone());
        use_case.execute(&mut ctx).await;
    }

    (
        StatusCode::NO_CONTENT,
        [(header::SET_COOKIE, state.config.cookie.delete_cookie_header())],
    )
        .into_response()
}

// ============================================================================
// Session Status
// ============================================================================

/// GET /api/auth/status
pub async fn session_status<R>(
    State(state): State<AuthAppState<R>>,
    headers: HeaderMap,
) -> Json<SessionStatusResponse>
where
    R: AuthBackend + AccountRepository + SessionRepository + Clone + Send + Sync + 'static,
{
    let ctx = state.context_from_cookie(&headers).await;

    Json(SessionStatusResponse {
        authenticated: ctx.is_authenticated(),
        user: ctx.identity().map(UserResponse::from),
    })
}

/// GET /api/auth/sessions
pub async fn list_sessions<R>(
    State(state): State<AuthAppState<R>>,
    headers: HeaderMap,
) -> AuthResult<Json<Vec<SessionResponse>>>
where
    R: AuthBackend + AccountRepository + SessionRepository + Clone + Send + Sync + 'static,
{
    let ctx = state.context_from_cookie(&headers).await;
    let identity = ctx.require_identity()?;

    let recorder = SessionRecorder::new(state.repo.clone(), &state.config, state.ip_resolver.clone());
    let sessions = recorder.list_sessions(&identity.id, ctx.token()).await?;

    Ok(Json(sessions.into_iter().map(SessionResponse::from).collect()))
}

// ============================================================================
// Navigation
// ============================================================================

/// GET /api/auth/login-redirect?path=/login
pub async fn login_redirect_target<R>(
    State(state): State<AuthAppState<R>>,
    headers: HeaderMap,
    Query(query): Query<LoginRedirectQuery>,
) -> Json<LoginRedirectResponse>
where
    R: AuthBackend + AccountRepository + SessionRepository + Clone + Send + Sync + 'static,
{
    let has_token = extract_cookie(&headers, &state.config.cookie.name).is_some();
    Json(LoginRedirectResponse {
        redirect: login_redirect(&query.path, has_token),
    })
}
