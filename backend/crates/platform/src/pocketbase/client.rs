//! REST client for collections and auth endpoints

use std::time::Duration;

use reqwest::{Method, RequestBuilder, Response};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::json;

use super::error::{BackendError, BackendResult, ErrorBody};
use super::query::{FULL_LIST_BATCH, ListPage, ListQuery};

/// Token and auth record returned by a successful auth call
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse<T> {
    pub token: String,
    pub record: T,
}

/// Outcome of a password auth call
#[derive(Debug, Clone)]
pub enum PasswordAuthResponse<T> {
    Authenticated(AuthResponse<T>),
    /// The account has MFA enabled; a second factor must be completed
    /// with this id.
    MfaRequired { mfa_id: String },
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MfaBody {
    mfa_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct OtpRequestBody {
    otp_id: String,
}

/// Client for a PocketBase-compatible backend
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct PbClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl PbClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> BackendResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(BackendError::Transport)?;
        Ok(Self::with_http(http, base_url))
    }

    pub fn with_http(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    /// A client sending `token` in the `Authorization` header
    pub fn authorized(&self, token: impl Into<String>) -> Self {
        Self {
            http: self.http.clone(),
            base_url: self.base_url.clone(),
            token: Some(token.into()),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn records_url(&self, collection: &str) -> String {
        format!("{}/api/collections/{}/records", self.base_url, collection)
    }

    fn collection_url(&self, collection: &str, action: &str) -> String {
        format!("{}/api/collections/{}/{}", self.base_url, collection, action)
    }

    fn request(&self, method: Method, url: String) -> RequestBuilder {
        let builder = self.http.request(method, url);
        match &self.token {
            Some(token) => builder.header(reqwest::header::AUTHORIZATION, token),
            None => builder,
        }
    }

    async fn send(builder: RequestBuilder) -> BackendResult<Response> {
        let response = builder.send().await?;
        if response.status().is_success() {
            return Ok(response);
        }
        Err(Self::status_error(response).await)
    }

    async fn status_error(response: Response) -> BackendError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        match serde_json::from_str::<ErrorBody>(&body) {
            Ok(parsed) if !parsed.message.is_empty() => BackendError::Status {
                status,
                message: parsed.message,
                data: parsed.data,
            },
            _ => BackendError::status(status, format!("Backend responded with status {status}")),
        }
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> BackendResult<T> {
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| BackendError::Decode(e.to_string()))
    }

    // ------------------------------------------------------------------
    // Records
    // ------------------------------------------------------------------

    pub async fn list<T: DeserializeOwned>(
        &self,
        collection: &str,
        query: &ListQuery,
    ) -> BackendResult<ListPage<T>> {
        let builder = self
            .request(Method::GET, self.records_url(collection))
            .query(&query.to_pairs());
        Self::decode(Self::send(builder).await?).await
    }

    /// Every record matching the query, fetched in batches
    pub async fn full_list<T: DeserializeOwned>(
        &self,
        collection: &str,
        query: &ListQuery,
    ) -> BackendResult<Vec<T>> {
        let mut items = Vec::new();
        let mut page = 1;
        loop {
            let batch: ListPage<T> = self
                .list(collection, &query.clone().page(page, FULL_LIST_BATCH))
                .await?;
            let last = batch.is_last();
            items.extend(batch.items);
            if last {
                return Ok(items);
            }
            page += 1;
        }
    }

    /// First record matching the query, if any
    pub async fn first<T: DeserializeOwned>(
        &self,
        collection: &str,
        query: &ListQuery,
    ) -> BackendResult<Option<T>> {
        let page: ListPage<T> = self.list(collection, &query.clone().page(1, 1)).await?;
        Ok(page.items.into_iter().next())
    }

    pub async fn get_one<T: DeserializeOwned>(
        &self,
        collection: &str,
        id: &str,
        expand: Option<&str>,
    ) -> BackendResult<T> {
        let mut builder = self.request(
            Method::GET,
            format!("{}/{}", self.records_url(collection), id),
        );
        if let Some(expand) = expand {
            builder = builder.query(&[("expand", expand)]);
        }
        Self::decode(Self::send(builder).await?).await
    }

    pub async fn create<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        collection: &str,
        body: &B,
    ) -> BackendResult<T> {
        let builder = self
            .request(Method::POST, self.records_url(collection))
            .json(body);
        Self::decode(Self::send(builder).await?).await
    }

    pub async fn update<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        collection: &str,
        id: &str,
        body: &B,
    ) -> BackendResult<T> {
        let builder = self
            .request(
                Method::PATCH,
                format!("{}/{}", self.records_url(collection), id),
            )
            .json(body);
        Self::decode(Self::send(builder).await?).await
    }

    pub async fn delete(&self, collection: &str, id: &str) -> BackendResult<()> {
        let builder = self.request(
            Method::DELETE,
            format!("{}/{}", self.records_url(collection), id),
        );
        Self::send(builder).await?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Auth collection endpoints
    // ------------------------------------------------------------------

    pub async fn auth_with_password<T: DeserializeOwned>(
        &self,
        collection: &str,
        identity: &str,
        password: &str,
    ) -> BackendResult<PasswordAuthResponse<T>> {
        let response = self
            .request(
                Method::POST,
                self.collection_url(collection, "auth-with-password"),
            )
            .json(&json!({ "identity": identity, "password": password }))
            .send()
            .await?;

        if response.status().is_success() {
            return Ok(PasswordAuthResponse::Authenticated(
                Self::decode(response).await?,
            ));
        }

        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        if status == 401 {
            if let Ok(mfa) = serde_json::from_str::<MfaBody>(&body) {
                return Ok(PasswordAuthResponse::MfaRequired { mfa_id: mfa.mfa_id });
            }
        }
        Err(match serde_json::from_str::<ErrorBody>(&body) {
            Ok(parsed) if !parsed.message.is_empty() => BackendError::Status {
                status,
                message: parsed.message,
                data: parsed.data,
            },
            _ => BackendError::status(status, "Failed to authenticate."),
        })
    }

    /// Ask the backend to email a one-time code; returns the OTP id
    pub async fn request_otp(&self, collection: &str, email: &str) -> BackendResult<String> {
        let builder = self
            .request(Method::POST, self.collection_url(collection, "request-otp"))
            .json(&json!({ "email": email }));
        let body: OtpRequestBody = Self::decode(Self::send(builder).await?).await?;
        Ok(body.otp_id)
    }

    pub async fn auth_with_otp<T: DeserializeOwned>(
        &self,
        collection: &str,
        otp_id: &str,
        code: &str,
        mfa_id: Option<&str>,
    ) -> BackendResult<AuthResponse<T>> {
        let mut builder = self
            .request(Method::POST, self.collection_url(collection, "auth-with-otp"))
            .json(&json!({ "otpId": otp_id, "password": code }));
        if let Some(mfa_id) = mfa_id {
            builder = builder.query(&[("mfaId", mfa_id)]);
        }
        Self::decode(Self::send(builder).await?).await
    }

    /// Exchange a still-valid token for a fresh one
    pub async fn auth_refresh<T: DeserializeOwned>(
        &self,
        collection: &str,
        token: &str,
    ) -> BackendResult<AuthResponse<T>> {
        let builder = self
            .authorized(token)
            .request(Method::POST, self.collection_url(collection, "auth-refresh"));
        Self::decode(Self::send(builder).await?).await
    }
}
