//! Flow tests for the auth crate against an in-memory backend

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use kernel::id::AccountId;
use platform::client::{ClientFingerprint, IpResolver};
use platform::pocketbase::BackendError;
use platform::retry::RetryPolicy;

use crate::application::{
    AuthConfig, AuthContext, CompleteLoginUseCase, OtpCoordinator, RestoreSessionUseCase,
    SessionRecorder, SignInInput, SignInOutput, SignInUseCase, SignOutUseCase, VerifyOtpInput,
    VerifyOtpUseCase,
};
use crate::domain::entity::{
    identity::{Identity, ProfileUpdate},
    otp_challenge::{OtpPurpose, SecondFactorState},
    session_record::SessionRecord,
};
use crate::domain::repository::{
    AccountRepository, AuthBackend, AuthGrant, PasswordAuthOutcome, SessionRepository,
};
use crate::domain::value_object::{
    email::Email, learning_streak::LearningStreak, user_password::UserPassword,
};
use crate::error::{AuthError, AuthResult};

const CHROME_WINDOWS: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const FIREFOX_LINUX: &str = "Mozilla/5.0 (X11; Linux x86_64; rv:121.0) Gecko/20100101 Firefox/121.0";
const PASSWORD: &str = "Str0ng!pass";
const OTP_CODE: &str = "482913";

// ============================================================================
// In-memory backend
// ============================================================================

struct Account {
    password: String,
    mfa: bool,
    identity: Identity,
}

#[derive(Default)]
struct Store {
    accounts: HashMap<String, Account>,
    otps: HashMap<String, String>,
    tokens: HashMap<String, String>,
    sessions: Vec<SessionRecord>,
    seq: u32,
    password_calls: u32,
    refresh_calls: u32,
    transient_refresh_failures: u32,
    fail_session_writes: bool,
    fail_streak_writes: bool,
    last_mfa_id: Option<String>,
}

impl Store {
    fn next(&mut self, prefix: &str) -> String {
        self.seq += 1;
        format!("{prefix}_{}", self.seq)
    }

    fn issue_token(&mut self, email: &str) -> AuthResult<AuthGrant> {
        let token = self.next("token");
        self.tokens.insert(token.clone(), email.to_string());
        let identity = self.accounts[email].identity.clone();
        Ok(AuthGrant { token, identity })
    }

    fn account_mut(&mut self, id: &AccountId) -> AuthResult<&mut Account> {
        self.accounts
            .values_mut()
            .find(|a| &a.identity.id == id)
            .ok_or(AuthError::AccountNotFound)
    }
}

#[derive(Clone, Default)]
struct MemoryBackend {
    store: Arc<Mutex<Store>>,
}

impl MemoryBackend {
    fn with_account(email: &str, mfa: bool) -> (Self, AccountId) {
        let backend = Self::default();
        let id = backend.add_account(email, mfa);
        (backend, id)
    }

    fn add_account(&self, email: &str, mfa: bool) -> AccountId {
        let id = AccountId::new();
        self.store().accounts.insert(
            email.to_string(),
            Account {
                password: PASSWORD.to_string(),
                mfa,
                identity: Identity::new(id.clone(), email, "Jane Doe"),
            },
        );
        id
    }

    fn store(&self) -> std::sync::MutexGuard<'_, Store> {
        self.store.lock().unwrap()
    }

    fn sessions(&self) -> Vec<SessionRecord> {
        self.store().sessions.clone()
    }

    fn identity(&self, email: &str) -> Identity {
        self.store().accounts[email].identity.clone()
    }
}

fn rejected() -> AuthError {
    BackendError::status(400, "Failed to authenticate.").into()
}

impl AuthBackend for MemoryBackend {
    async fn auth_with_password(
        &self,
        email: &Email,
        password: &str,
    ) -> AuthResult<PasswordAuthOutcome> {
        let mut store = self.store();
        store.password_calls += 1;
        let (ok, mfa) = match store.accounts.get(email.as_str()) {
            Some(account) => (account.password == password, account.mfa),
            None => (false, false),
        };
        if !ok {
            return Err(rejected());
        }
        if mfa {
            let mfa_id = store.next("mfa");
            return Ok(PasswordAuthOutcome::MfaRequired { mfa_id });
        }
        store.issue_token(email.as_str()).map(PasswordAuthOutcome::Authenticated)
    }

    async fn request_otp(&self, email: &Email) -> AuthResult<String> {
        let mut store = self.store();
        let otp_id = store.next("otp");
        store.otps.insert(otp_id.clone(), email.to_string());
        Ok(otp_id)
    }

    async fn auth_with_otp(
        &self,
        otp_id: &str,
        code: &str,
        mfa_id: Option<&str>,
    ) -> AuthResult<AuthGrant> {
        let mut store = self.store();
        store.last_mfa_id = mfa_id.map(str::to_string);
        let Some(email) = store.otps.remove(otp_id) else {
            return Err(BackendError::status(400, "Invalid or expired OTP").into());
        };
        if code != OTP_CODE {
            return Err(BackendError::status(400, "Invalid or expired OTP").into());
        }
        store.issue_token(&email)
    }

    async fn refresh(&self, token: &str) -> AuthResult<AuthGrant> {
        let mut store = self.store();
        store.refresh_calls += 1;
        if store.transient_refresh_failures > 0 {
            store.transient_refresh_failures -= 1;
            return Err(BackendError::status(503, "Service unavailable").into());
        }
        let Some(email) = store.tokens.get(token).cloned() else {
            return Err(BackendError::status(401, "The request requires valid record authorization token.").into());
        };
        store.issue_token(&email)
    }
}

impl AccountRepository for MemoryBackend {
    async fn find_by_id(&self, account_id: &AccountId) -> AuthResult<Option<Identity>> {
        Ok(self
            .store()
            .accounts
            .values()
            .find(|a| &a.identity.id == account_id)
            .map(|a| a.identity.clone()))
    }

    async fn update_streak(
        &self,
        account_id: &AccountId,
        streak: &LearningStreak,
    ) -> AuthResult<Identity> {
        let mut store = self.store();
        if store.fail_streak_writes {
            return Err(BackendError::status(500, "Something went wrong").into());
        }
        let account = store.account_mut(account_id)?;
        account.identity.apply_streak(streak);
        Ok(account.identity.clone())
    }

    async fn update_profile(
        &self,
        account_id: &AccountId,
        update: &ProfileUpdate,
    ) -> AuthResult<Identity> {
        let mut store = self.store();
        let account = store.account_mut(account_id)?;
        update.apply_to(&mut account.identity);
        Ok(account.identity.clone())
    }
}

impl SessionRepository for MemoryBackend {
    async fn find_by_device(
        &self,
        account_id: &AccountId,
        device: &str,
    ) -> AuthResult<Option<SessionRecord>> {
        Ok(self
            .store()
            .sessions
            .iter()
            .find(|s| &s.account_id == account_id && s.device == device)
            .cloned())
    }

    async fn find_by_token(
        &self,
        account_id: &AccountId,
        token_digest: &str,
    ) -> AuthResult<Option<SessionRecord>> {
        Ok(self
            .store()
            .sessions
            .iter()
            .find(|s| &s.account_id == account_id && s.token_digest == token_digest)
            .cloned())
    }

    async fn create(&self, record: &SessionRecord) -> AuthResult<()> {
        let mut store = self.store();
        if store.fail_session_writes {
            return Err(BackendError::status(503, "Service unavailable").into());
        }
        store.sessions.push(record.clone());
        Ok(())
    }

    async fn update(&self, record: &SessionRecord) -> AuthResult<()> {
        let mut store = self.store();
        if store.fail_session_writes {
            return Err(BackendError::status(503, "Service unavailable").into());
        }
        let existing = store
            .sessions
            .iter_mut()
            .find(|s| s.id == record.id)
            .ok_or_else(|| AuthError::Backend(BackendError::status(404, "Not found")))?;
        *existing = record.clone();
        Ok(())
    }

    async fn list_for_account(&self, account_id: &AccountId) -> AuthResult<Vec<SessionRecord>> {
        let mut sessions: Vec<_> = self
            .store()
            .sessions
            .iter()
            .filter(|s| &s.account_id == account_id)
            .cloned()
            .collect();
        sessions.sort_by(|a, b| b.last_active.cmp(&a.last_active));
        Ok(sessions)
    }
}

// ============================================================================
// Helpers
// ============================================================================

struct Harness {
    backend: Arc<MemoryBackend>,
    config: Arc<AuthConfig>,
    otp: Arc<OtpCoordinator<MemoryBackend>>,
    ip_resolver: Arc<IpResolver>,
}

impl Harness {
    fn new(backend: MemoryBackend) -> Self {
        Self::with_config(backend, AuthConfig::default())
    }

    fn with_config(backend: MemoryBackend, config: AuthConfig) -> Self {
        let backend = Arc::new(backend);
        let config = Arc::new(config);
        Self {
            otp: Arc::new(OtpCoordinator::new(backend.clone(), config.clone())),
            backend,
            config,
            ip_resolver: Arc::new(IpResolver::disabled()),
        }
    }

    fn sign_in(&self) -> SignInUseCase<MemoryBackend, MemoryBackend, MemoryBackend> {
        SignInUseCase::new(
            self.backend.clone(),
            self.backend.clone(),
            self.backend.clone(),
            self.otp.clone(),
            self.config.clone(),
            self.ip_resolver.clone(),
        )
    }

    fn verify(&self) -> VerifyOtpUseCase<MemoryBackend, MemoryBackend, MemoryBackend> {
        VerifyOtpUseCase::new(
            self.otp.clone(),
            self.backend.clone(),
            self.backend.clone(),
            &self.config,
            self.ip_resolver.clone(),
        )
    }

    fn complete(&self) -> CompleteLoginUseCase<MemoryBackend, MemoryBackend> {
        CompleteLoginUseCase::new(
            self.backend.clone(),
            self.backend.clone(),
            &self.config,
            self.ip_resolver.clone(),
        )
    }

    fn sign_out(&self) -> SignOutUseCase<MemoryBackend> {
        SignOutUseCase::new(self.backend.clone(), &self.config, self.ip_resolver.clone())
    }

    fn recorder(&self) -> SessionRecorder<MemoryBackend> {
        SessionRecorder::new(self.backend.clone(), &self.config, self.ip_resolver.clone())
    }

    async fn signed_in(&self, email: &str, ua: &str) -> AuthContext {
        let mut ctx = AuthContext::new();
        let output = self
            .sign_in()
            .execute(input(email, PASSWORD), fingerprint(ua), &mut ctx)
            .await
            .unwrap();
        assert!(matches!(output, SignInOutput::Authenticated { .. }));
        ctx
    }
}

fn input(email: &str, password: &str) -> SignInInput {
    SignInInput {
        email: email.to_string(),
        password: UserPassword::new(password),
    }
}

fn fingerprint(ua: &str) -> ClientFingerprint {
    ClientFingerprint::new(
        Some(ua.to_string()),
        Some(IpAddr::V4(Ipv4Addr::new(203, 0, 113, 7))),
    )
}

fn day(d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, d, h, 0, 0).unwrap()
}

fn fast_retry(max_attempts: u32) -> RetryPolicy {
    RetryPolicy::new(max_attempts, Duration::from_millis(1), Duration::from_millis(2))
}

// ============================================================================
// Sign in
// ============================================================================

#[cfg(test)]
mod sign_in_tests {
    use super::*;

    #[tokio::test]
    async fn test_sign_in_publishes_identity_and_records_session() {
        let (backend, id) = MemoryBackend::with_account("jane@gmail.com", false);
        let h = Harness::new(backend);

        let ctx = h.signed_in("jane@gmail.com", CHROME_WINDOWS).await;

        let identity = ctx.require_identity().unwrap();
        assert_eq!(identity.id, id);
        assert_eq!(identity.learning_streak, 1);
        assert!(identity.last_login.is_some());
        assert!(ctx.token().unwrap().starts_with("token_"));

        let sessions = h.backend.sessions();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].device, "Chrome on Windows");
        assert!(sessions[0].active);
        assert_eq!(
            h.config.origin_cipher().decrypt(&sessions[0].encrypted_origin).unwrap(),
            "203.0.113.7"
        );
    }

    #[tokio::test]
    async fn test_unsupported_provider_never_reaches_backend() {
        let (backend, _) = MemoryBackend::with_account("jane@company.io", false);
        let h = Harness::new(backend);
        let mut ctx = AuthContext::new();

        let err = h
            .sign_in()
            .execute(input("jane@company.io", PASSWORD), fingerprint(CHROME_WINDOWS), &mut ctx)
            .await
            .unwrap_err();

        match err {
            AuthError::Validation(report) => {
                assert!(report.email_errors[0].starts_with("Please use an email from a supported provider"));
                assert!(report.password_errors.is_empty());
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(h.backend.store().password_calls, 0);
        assert!(!ctx.is_authenticated());
    }

    #[tokio::test]
    async fn test_weak_password_is_rejected() {
        let (backend, _) = MemoryBackend::with_account("jane@gmail.com", false);
        let h = Harness::new(backend);
        let mut ctx = AuthContext::new();

        for weak in ["Sh0rt!", "nouppercase1!", "NoDigitsHere!", "NoSymbols123"] {
            let err = h
                .sign_in()
                .execute(input("jane@gmail.com", weak), fingerprint(CHROME_WINDOWS), &mut ctx)
                .await
                .unwrap_err();
            assert!(matches!(err, AuthError::Validation(ref r) if r.password_errors.len() == 1));
        }
        assert_eq!(h.backend.store().password_calls, 0);
    }

    #[tokio::test]
    async fn test_wrong_password_surfaces_backend_message() {
        let (backend, _) = MemoryBackend::with_account("jane@gmail.com", false);
        let h = Harness::new(backend);
        let mut ctx = AuthContext::new();

        let err = h
            .sign_in()
            .execute(input("jane@gmail.com", "Wr0ng!pass"), fingerprint(CHROME_WINDOWS), &mut ctx)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Failed to authenticate.");
        assert!(!ctx.is_authenticated());
        assert!(h.backend.sessions().is_empty());
    }

    #[tokio::test]
    async fn test_login_survives_streak_write_failure() {
        let (backend, _) = MemoryBackend::with_account("jane@gmail.com", false);
        backend.store().fail_streak_writes = true;
        let h = Harness::new(backend);

        let ctx = h.signed_in("jane@gmail.com", CHROME_WINDOWS).await;

        assert_eq!(ctx.require_identity().unwrap().learning_streak, 1);
        assert_eq!(h.backend.identity("jane@gmail.com").learning_streak, 0);
    }
}

// ============================================================================
// Streak
// ============================================================================

#[cfg(test)]
mod streak_tests {
    use super::*;

    async fn login_at(h: &Harness, streak: u32, last: Option<DateTime<Utc>>, now: DateTime<Utc>) -> u32 {
        let mut identity = h.backend.identity("jane@gmail.com");
        identity.learning_streak = streak;
        identity.last_login = last;
        let grant = AuthGrant {
            token: "token_x".into(),
            identity,
        };
        let mut ctx = AuthContext::new();
        h.complete()
            .execute_at(grant, &fingerprint(CHROME_WINDOWS), &mut ctx, now)
            .await
            .unwrap();
        let persisted = h.backend.identity("jane@gmail.com");
        assert_eq!(persisted.last_login, Some(now));
        assert_eq!(ctx.require_identity().unwrap().learning_streak, persisted.learning_streak);
        persisted.learning_streak
    }

    #[tokio::test]
    async fn test_streak_rules() {
        let (backend, _) = MemoryBackend::with_account("jane@gmail.com", false);
        let h = Harness::new(backend);

        assert_eq!(login_at(&h, 5, Some(day(10, 8)), day(10, 20)).await, 5);
        assert_eq!(login_at(&h, 5, Some(day(10, 23)), day(11, 1)).await, 6);
        assert_eq!(login_at(&h, 5, Some(day(10, 8)), day(13, 8)).await, 1);
        assert_eq!(login_at(&h, 0, Some(day(10, 8)), day(11, 8)).await, 1);
        assert_eq!(login_at(&h, 3, None, day(11, 8)).await, 1);
    }
}

// ============================================================================
// Sessions
// ============================================================================

#[cfg(test)]
mod session_tests {
    use super::*;

    #[tokio::test]
    async fn test_logout_then_relogin_reuses_device_record() {
        let (backend, _) = MemoryBackend::with_account("jane@gmail.com", false);
        let h = Harness::new(backend);

        let mut ctx = h.signed_in("jane@gmail.com", CHROME_WINDOWS).await;
        let first = h.backend.sessions()[0].clone();

        assert!(h.sign_out().execute(&mut ctx).await);
        assert!(!ctx.is_authenticated());
        assert!(!h.backend.sessions()[0].active);

        let ctx = h.signed_in("jane@gmail.com", CHROME_WINDOWS).await;
        let sessions = h.backend.sessions();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].id, first.id);
        assert!(sessions[0].active);
        assert_ne!(sessions[0].token_digest, first.token_digest);
        assert!(ctx.is_authenticated());

        h.signed_in("jane@gmail.com", FIREFOX_LINUX).await;
        assert_eq!(h.backend.sessions().len(), 2);
    }

    #[tokio::test]
    async fn test_sign_out_clears_context_when_backend_fails() {
        let (backend, _) = MemoryBackend::with_account("jane@gmail.com", false);
        let h = Harness::new(backend);
        let mut ctx = h.signed_in("jane@gmail.com", CHROME_WINDOWS).await;

        h.backend.store().fail_session_writes = true;
        assert!(!h.sign_out().execute(&mut ctx).await);
        assert!(!ctx.is_authenticated());
        assert!(h.backend.sessions()[0].active);
    }

    #[tokio::test]
    async fn test_unknown_origin_without_ip_or_lookup() {
        let (backend, id) = MemoryBackend::with_account("jane@gmail.com", false);
        let h = Harness::new(backend);

        h.recorder()
            .record_login(&id, "tok", &ClientFingerprint::new(None, None), Utc::now())
            .await
            .unwrap();

        let views = h.recorder().list_sessions(&id, Some("tok")).await.unwrap();
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].origin, "unknown");
        assert_eq!(views[0].device, "Unknown Browser on Unknown OS");
        assert!(views[0].current);
    }

    #[tokio::test]
    async fn test_origin_from_lookup_when_request_has_none() {
        let (backend, id) = MemoryBackend::with_account("jane@gmail.com", false);
        let mut h = Harness::new(backend);
        h.ip_resolver = Arc::new(IpResolver::fixed(IpAddr::V4(Ipv4Addr::new(198, 51, 100, 2))));

        h.recorder()
            .record_login(&id, "tok", &ClientFingerprint::new(Some(FIREFOX_LINUX.into()), None), Utc::now())
            .await
            .unwrap();

        let views = h.recorder().list_sessions(&id, None).await.unwrap();
        assert_eq!(views[0].origin, "198.51.100.2");
        assert!(!views[0].current);
    }
}

// ============================================================================
// Second factor
// ============================================================================

#[cfg(test)]
mod otp_tests {
    use super::*;

    fn verify_input(otp_id: &str, code: &str) -> VerifyOtpInput {
        VerifyOtpInput {
            otp_id: otp_id.to_string(),
            code: code.to_string(),
            email: Email::parse("jane@gmail.com").unwrap(),
            purpose: OtpPurpose::Login,
            mfa_id: None,
        }
    }

    #[tokio::test]
    async fn test_mfa_sign_in_then_verify() {
        let (backend, id) = MemoryBackend::with_account("jane@gmail.com", true);
        let h = Harness::new(backend);
        let email = Email::parse("jane@gmail.com").unwrap();
        let mut ctx = AuthContext::new();

        let output = h
            .sign_in()
            .execute(input("jane@gmail.com", PASSWORD), fingerprint(CHROME_WINDOWS), &mut ctx)
            .await
            .unwrap();
        let SignInOutput::OtpRequired(challenge) = output else {
            panic!("expected OTP challenge");
        };
        assert!(!ctx.is_authenticated());
        assert!(challenge.mfa_id.is_some());
        assert_eq!(h.otp.state(&email, OtpPurpose::Login), SecondFactorState::OtpRequested);

        let (identity, token) = h
            .verify()
            .execute(&verify_input(&challenge.otp_id, OTP_CODE), &fingerprint(CHROME_WINDOWS), &mut ctx)
            .await
            .unwrap();

        assert_eq!(identity.id, id);
        assert_eq!(ctx.token(), Some(token.as_str()));
        assert_eq!(h.backend.store().last_mfa_id, challenge.mfa_id);
        assert_eq!(h.otp.state(&email, OtpPurpose::Login), SecondFactorState::Verified);
        assert!(h.otp.pending(&email, OtpPurpose::Login).is_none());
        assert_eq!(h.backend.sessions().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_challenge_id_leaves_context_untouched() {
        let (backend, _) = MemoryBackend::with_account("jane@gmail.com", false);
        let h = Harness::new(backend);
        let email = Email::parse("jane@gmail.com").unwrap();

        h.otp.request_otp(&email, OtpPurpose::Login, None).await.unwrap();

        let mut ctx = AuthContext::new();
        let err = h
            .verify()
            .execute(&verify_input("otp_missing", OTP_CODE), &fingerprint(CHROME_WINDOWS), &mut ctx)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Invalid or expired OTP");
        assert_eq!(ctx, AuthContext::new());
        assert_eq!(h.otp.state(&email, OtpPurpose::Login), SecondFactorState::Failed);
        assert!(h.otp.pending(&email, OtpPurpose::Login).is_none());
        assert!(h.backend.sessions().is_empty());
    }

    #[tokio::test]
    async fn test_mfa_id_not_reused_for_another_otp() {
        let (backend, _) = MemoryBackend::with_account("jane@gmail.com", false);
        let h = Harness::new(backend);
        let email = Email::parse("jane@gmail.com").unwrap();

        let challenge = h
            .otp
            .request_otp(&email, OtpPurpose::Login, Some("mfa_pending".into()))
            .await
            .unwrap();

        let _ = h.otp.verify_otp(&verify_input("otp_other", OTP_CODE)).await.unwrap_err();
        assert_eq!(h.backend.store().last_mfa_id, None);

        h.otp
            .request_otp(&email, OtpPurpose::Login, Some("mfa_pending".into()))
            .await
            .unwrap();
        let next = h.otp.pending(&email, OtpPurpose::Login).unwrap();
        assert_ne!(next.otp_id, challenge.otp_id);
        h.otp.verify_otp(&verify_input(&next.otp_id, OTP_CODE)).await.unwrap();
        assert_eq!(h.backend.store().last_mfa_id.as_deref(), Some("mfa_pending"));
    }

    #[tokio::test]
    async fn test_existing_context_survives_failed_verification() {
        let (backend, _) = MemoryBackend::with_account("jane@gmail.com", false);
        let h = Harness::new(backend);
        let mut ctx = h.signed_in("jane@gmail.com", CHROME_WINDOWS).await;
        let before = ctx.clone();

        let _ = h
            .verify()
            .execute(&verify_input("otp_missing", OTP_CODE), &fingerprint(CHROME_WINDOWS), &mut ctx)
            .await
            .unwrap_err();

        assert_eq!(ctx, before);
    }

    #[tokio::test]
    async fn test_password_fallback_is_opt_in() {
        let (backend, _) = MemoryBackend::with_account("jane@gmail.com", false);
        let h = Harness::new(backend.clone());
        let email = Email::parse("jane@gmail.com").unwrap();

        let challenge = h.otp.request_otp(&email, OtpPurpose::Login, None).await.unwrap();
        let err = h.otp.verify_otp(&verify_input(&challenge.otp_id, PASSWORD)).await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid or expired OTP");

        let config = AuthConfig {
            otp_password_fallback: true,
            ..AuthConfig::default()
        };
        let h = Harness::with_config(backend, config);
        let challenge = h.otp.request_otp(&email, OtpPurpose::Login, None).await.unwrap();
        let grant = h.otp.verify_otp(&verify_input(&challenge.otp_id, PASSWORD)).await.unwrap();
        assert_eq!(grant.identity.email, "jane@gmail.com");
        assert_eq!(h.otp.state(&email, OtpPurpose::Login), SecondFactorState::Verified);

        // Neither a code nor the password: the OTP error is what surfaces
        let challenge = h.otp.request_otp(&email, OtpPurpose::Login, None).await.unwrap();
        let err = h.otp.verify_otp(&verify_input(&challenge.otp_id, "000000")).await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid or expired OTP");
    }

    #[tokio::test]
    async fn test_purposes_are_tracked_separately_and_expire() {
        let (backend, _) = MemoryBackend::with_account("jane@gmail.com", false);
        let h = Harness::new(backend.clone());
        let email = Email::parse("jane@gmail.com").unwrap();

        let first = h.otp.request_otp(&email, OtpPurpose::Registration, None).await.unwrap();
        let second = h.otp.request_otp(&email, OtpPurpose::Registration, None).await.unwrap();
        assert_ne!(first.otp_id, second.otp_id);
        assert_eq!(h.otp.pending(&email, OtpPurpose::Registration).unwrap().otp_id, second.otp_id);
        assert_eq!(h.otp.state(&email, OtpPurpose::Login), SecondFactorState::Idle);

        let config = AuthConfig {
            otp_challenge_ttl: Duration::ZERO,
            ..AuthConfig::default()
        };
        let h = Harness::with_config(backend, config);
        h.otp.request_otp(&email, OtpPurpose::Login, None).await.unwrap();
        assert_eq!(h.otp.state(&email, OtpPurpose::Login), SecondFactorState::Idle);
    }
}

// ============================================================================
// Session restore
// ============================================================================

#[cfg(test)]
mod restore_tests {
    use super::*;

    #[tokio::test]
    async fn test_restore_retries_transient_failures() {
        let (backend, id) = MemoryBackend::with_account("jane@gmail.com", false);
        let h = Harness::new(backend);
        let token = h.signed_in("jane@gmail.com", CHROME_WINDOWS).await.token().unwrap().to_string();
        h.backend.store().transient_refresh_failures = 2;

        let mut ctx = AuthContext::new();
        let identity = RestoreSessionUseCase::new(h.backend.clone(), fast_retry(3))
            .execute(&token, &mut ctx)
            .await
            .unwrap();

        assert_eq!(identity.id, id);
        assert_eq!(ctx.token(), Some(token.as_str()));
        assert_eq!(h.backend.store().refresh_calls, 3);
    }

    #[tokio::test]
    async fn test_restore_gives_up_and_clears_context() {
        let (backend, _) = MemoryBackend::with_account("jane@gmail.com", false);
        let h = Harness::new(backend);
        let mut ctx = h.signed_in("jane@gmail.com", CHROME_WINDOWS).await;
        let token = ctx.token().unwrap().to_string();
        h.backend.store().transient_refresh_failures = 5;

        let err = RestoreSessionUseCase::new(h.backend.clone(), fast_retry(3))
            .execute(&token, &mut ctx)
            .await
            .unwrap_err();

        assert!(err.is_transient());
        assert!(!ctx.is_authenticated());
        assert_eq!(h.backend.store().refresh_calls, 3);
    }

    #[tokio::test]
    async fn test_invalid_token_is_not_retried() {
        let (backend, _) = MemoryBackend::with_account("jane@gmail.com", false);
        let h = Harness::new(backend);

        let mut ctx = AuthContext::new();
        let err = RestoreSessionUseCase::new(h.backend.clone(), fast_retry(5))
            .execute("stale", &mut ctx)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), crate::ErrorKind::Unauthorized);
        assert_eq!(h.backend.store().refresh_calls, 1);
    }
}

// ============================================================================
// HTTP
// ============================================================================

#[cfg(test)]
mod http_tests {
    use super::*;
    use crate::presentation::{AuthAppState, auth_router_generic};
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use tower::ServiceExt;

    fn app(backend: MemoryBackend) -> axum::Router {
        auth_router_generic(AuthAppState::new(
            backend,
            AuthConfig::development(),
            IpResolver::disabled(),
        ))
    }

    fn json_request(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::USER_AGENT, CHROME_WINDOWS)
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_validate_endpoint() {
        let response = app(MemoryBackend::default())
            .oneshot(json_request(
                "/validate",
                serde_json::json!({ "email": "jane@yopmail.com", "password": "weak" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["valid"], false);
        assert_eq!(body["emailErrors"][0], "Disposable email addresses are not allowed");
        assert_eq!(body["passwordErrors"].as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_sign_in_status_sign_out() {
        let (backend, _) = MemoryBackend::with_account("jane@gmail.com", false);
        let app = app(backend.clone());

        let response = app
            .clone()
            .oneshot(json_request(
                "/signin",
                serde_json::json!({ "email": "jane@gmail.com", "password": PASSWORD }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap().to_string();
        assert!(set_cookie.starts_with("lms_session=token_"));
        assert!(set_cookie.contains("HttpOnly"));
        let body = body_json(response).await;
        assert_eq!(body["status"], "authenticated");
        assert_eq!(body["user"]["learningStreak"], 1);

        let cookie = set_cookie.split(';').next().unwrap().to_string();
        let response = app
            .clone()
            .oneshot(
                Request::get("/status")
                    .header(header::COOKIE, &cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["authenticated"], true);
        assert_eq!(body["user"]["email"], "jane@gmail.com");

        let response = app
            .clone()
            .oneshot(
                Request::post("/signout")
                    .header(header::COOKIE, &cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(
            response.headers()[header::SET_COOKIE]
                .to_str()
                .unwrap()
                .contains("Max-Age=0")
        );
        assert!(!backend.sessions()[0].active);
    }

    #[tokio::test]
    async fn test_invalid_credentials_render_problem_details() {
        let response = app(MemoryBackend::default())
            .oneshot(json_request(
                "/signin",
                serde_json::json!({ "email": "", "password": "" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(response).await;
        assert_eq!(body["detail"], "Email is required");
    }

    #[tokio::test]
    async fn test_sessions_requires_cookie() {
        let response = app(MemoryBackend::default())
            .oneshot(Request::get("/sessions").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_login_redirect_with_cookie() {
        let response = app(MemoryBackend::default())
            .oneshot(
                Request::get("/login-redirect?path=/login")
                    .header(header::COOKIE, "lms_session=abc")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["redirect"], "/dashboard");
    }
}
