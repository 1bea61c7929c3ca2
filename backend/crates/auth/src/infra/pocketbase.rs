//! Hosted Backend Repository Implementations
//!
//! Collections:
//! - `users`: auth collection (identity, profile, streak)
//! - `sessions`: one row per (user, device)

use chrono::{DateTime, Utc};
use kernel::id::{AccountId, SessionId};
use platform::pocketbase::time::{deserialize_optional, format_datetime};
use platform::pocketbase::{AuthResponse, Filter, ListQuery, PasswordAuthResponse, PbClient};
use serde::{Deserialize, Serialize};

use crate::domain::entity::{
    identity::{Identity, ProfileUpdate},
    session_record::SessionRecord,
};
use crate::domain::repository::{
    AccountRepository, AuthBackend, AuthGrant, PasswordAuthOutcome, SessionRepository,
};
use crate::domain::value_object::{email::Email, learning_streak::LearningStreak};
use crate::error::AuthResult;

pub const USERS_COLLECTION: &str = "users";
pub const SESSIONS_COLLECTION: &str = "sessions";

/// Backend-backed auth repository
#[derive(Clone)]
pub struct PbAuthRepository {
    client: PbClient,
}

impl PbAuthRepository {
    pub fn new(client: PbClient) -> Self {
        Self { client }
    }
}

impl From<AuthResponse<Identity>> for AuthGrant {
    fn from(auth: AuthResponse<Identity>) -> Self {
        AuthGrant {
            token: auth.token,
            identity: auth.record,
        }
    }
}

// ============================================================================
// Auth Backend Implementation
// ============================================================================

impl AuthBackend for PbAuthRepository {
    async fn auth_with_password(
        &self,
        email: &Email,
        password: &str,
    ) -> AuthResult<PasswordAuthOutcome> {
        let response = self
            .client
            .auth_with_password::<Identity>(USERS_COLLECTION, email.as_str(), password)
            .await?;

        Ok(match response {
            PasswordAuthResponse::Authenticated(auth) => PasswordAuthOutcome::Authenticated(auth.into()),
            PasswordAuthResponse::MfaRequired { mfa_id } => PasswordAuthOutcome::MfaRequired { mfa_id },
        })
    }

    async fn request_otp(&self, email: &Email) -> AuthResult<String> {
        Ok(self.client.request_otp(USERS_COLLECTION, email.as_str()).await?)
    }

    async fn auth_with_otp(
        &self,
        otp_id: &str,
        code: &str,
        mfa_id: Option<&str>,
    ) -> AuthResult<AuthGrant> {
        let auth = self
            .client
            .auth_with_otp::<Identity>(USERS_COLLECTION, otp_id, code, mfa_id)
            .await?;
        Ok(auth.into())
    }

    async fn refresh(&self, token: &str) -> AuthResult<AuthGrant> {
        let auth = self
            .client
            .auth_refresh::<Identity>(USERS_COLLECTION, token)
            .await?;
        Ok(auth.into())
    }
}

// ============================================================================
// Account Repository Implementation
// ============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StreakFields {
    learning_streak: u32,
    last_login: String,
}

impl AccountRepository for PbAuthRepository {
    async fn find_by_id(&self, account_id: &AccountId) -> AuthResult<Option<Identity>> {
        match self
            .client
            .get_one::<Identity>(USERS_COLLECTION, account_id.as_str(), None)
            .await
        {
            Ok(identity) => Ok(Some(identity)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn update_streak(
        &self,
        account_id: &AccountId,
        streak: &LearningStreak,
    ) -> AuthResult<Identity> {
        let fields = StreakFields {
            learning_streak: streak.count,
            last_login: streak
                .last_login
                .as_ref()
                .map(format_datetime)
                .unwrap_or_default(),
        };
        Ok(self
            .client
            .update(USERS_COLLECTION, account_id.as_str(), &fields)
            .await?)
    }

    async fn update_profile(
        &self,
        account_id: &AccountId,
        update: &ProfileUpdate,
    ) -> AuthResult<Identity> {
        Ok(self
            .client
            .update(USERS_COLLECTION, account_id.as_str(), update)
            .await?)
    }
}

// ============================================================================
// Session Repository Implementation
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionRow {
    id: String,
    user_id: String,
    #[serde(default)]
    device: String,
    #[serde(default)]
    ip_address: String,
    #[serde(default)]
    token_digest: String,
    #[serde(default, deserialize_with = "deserialize_optional")]
    last_active: Option<DateTime<Utc>>,
    #[serde(default)]
    is_active: bool,
    #[serde(default, deserialize_with = "deserialize_optional")]
    created: Option<DateTime<Utc>>,
}

impl From<SessionRow> for SessionRecord {
    fn from(row: SessionRow) -> Self {
        let created = row.created.or(row.last_active).unwrap_or_else(Utc::now);
        SessionRecord {
            id: SessionId::from_backend(row.id),
            account_id: AccountId::from_backend(row.user_id),
            device: row.device,
            encrypted_origin: row.ip_address,
            token_digest: row.token_digest,
            last_active: row.last_active.unwrap_or(created),
            active: row.is_active,
            created,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionFields<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<&'a str>,
    user_id: &'a str,
    device: &'a str,
    ip_address: &'a str,
    token_digest: &'a str,
    last_active: String,
    is_active: bool,
}

impl<'a> SessionFields<'a> {
    fn from_record(record: &'a SessionRecord, with_id: bool) -> Self {
        Self {
            id: with_id.then(|| record.id.as_str()),
            user_id: record.account_id.as_str(),
            device: &record.device,
            ip_address: &record.encrypted_origin,
            token_digest: &record.token_digest,
            last_active: format_datetime(&record.last_active),
            is_active: record.active,
        }
    }
}

impl PbAuthRepository {
    async fn first_session(&self, filter: Filter) -> AuthResult<Option<SessionRecord>> {
        let row: Option<SessionRow> = self
            .client
            .first(
                SESSIONS_COLLECTION,
                &ListQuery::new().filter(filter).sort("-lastActive"),
            )
            .await?;
        Ok(row.map(SessionRecord::from))
    }
}

impl SessionRepository for PbAuthRepository {
    async fn find_by_device(
        &self,
        account_id: &AccountId,
        device: &str,
    ) -> AuthResult<Option<SessionRecord>> {
        self.first_session(Filter::eq("userId", account_id).and(Filter::eq("device", device)))
            .await
    }

    async fn find_by_token(
        &self,
        account_id: &AccountId,
        token_digest: &str,
    ) -> AuthResult<Option<SessionRecord>> {
        self.first_session(
            Filter::eq("userId", account_id).and(Filter::eq("tokenDigest", token_digest)),
        )
        .await
    }

    async fn create(&self, record: &SessionRecord) -> AuthResult<()> {
        let _: serde_json::Value = self
            .client
            .create(SESSIONS_COLLECTION, &SessionFields::from_record(record, true))
            .await?;
        Ok(())
    }

    async fn update(&self, record: &SessionRecord) -> AuthResult<()> {
        let _: serde_json::Value = self
            .client
            .update(
                SESSIONS_COLLECTION,
                record.id.as_str(),
                &SessionFields::from_record(record, false),
            )
            .await?;
        Ok(())
    }

    async fn list_for_account(&self, account_id: &AccountId) -> AuthResult<Vec<SessionRecord>> {
        let rows: Vec<SessionRow> = self
            .client
            .full_list(
                SESSIONS_COLLECTION,
                &ListQuery::new()
                    .filter(Filter::eq("userId", account_id))
                    .sort("-lastActive"),
            )
            .await?;
        Ok(rows.into_iter().map(SessionRecord::from).collect())
    }
}
