//! Server Configuration
//!
//! Read once at startup from the environment (after `.env` is loaded).

use anyhow::{Context, bail};
use auth::AuthConfig;
use platform::crypto::{from_base64, sha256};
use platform::retry::RetryPolicy;
use std::env;
use std::net::SocketAddr;
use std::time::Duration;

const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8090";
const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:31113";
const DEFAULT_FRONTEND_ORIGINS: &str = "http://localhost:40922,http://127.0.0.1:40922";
const BACKEND_TIMEOUT: Duration = Duration::from_secs(10);
const IP_LOOKUP_TIMEOUT: Duration = Duration::from_secs(3);
const RETRY_MAX_DELAY: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub backend_url: String,
    pub backend_timeout: Duration,
    /// Token used for collection reads that are not tied to the caller
    pub service_token: Option<String>,
    pub listen_addr: SocketAddr,
    pub frontend_origins: Vec<String>,
    /// `None` disables the public IP lookup
    pub ip_lookup_url: Option<String>,
    pub ip_lookup_timeout: Duration,
    pub auth: AuthConfig,
}

impl ApiConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let mut auth = if cfg!(debug_assertions) {
            AuthConfig::development()
        } else {
            AuthConfig::default()
        };

        match origin_key()? {
            Some(key) => auth.origin_key = key,
            None if cfg!(debug_assertions) => {
                tracing::warn!("No origin cipher key configured, using a random key");
            }
            None => bail!("ORIGIN_CIPHER_KEY or ORIGIN_CIPHER_PASSPHRASE must be set in production"),
        }

        if let Some(secure) = flag("COOKIE_SECURE")? {
            auth.cookie.secure = secure;
        }
        if let Some(fallback) = flag("OTP_PASSWORD_FALLBACK")? {
            auth.otp_password_fallback = fallback;
        }

        let defaults = auth.restore_retry;
        let max_attempts = number("INIT_RETRY_MAX_ATTEMPTS")?.unwrap_or(defaults.max_attempts);
        let initial_delay = number("INIT_RETRY_INITIAL_DELAY_MS")?
            .map(|ms: u64| Duration::from_millis(ms))
            .unwrap_or(defaults.initial_delay);
        auth.restore_retry = RetryPolicy::new(max_attempts, initial_delay, RETRY_MAX_DELAY);

        let listen_addr = var("LISTEN_ADDR")
            .unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string())
            .parse()
            .context("LISTEN_ADDR must be a socket address such as 0.0.0.0:31113")?;

        let ip_lookup_url = match var("IP_LOOKUP_URL") {
            Some(url) if url.eq_ignore_ascii_case("off") => None,
            Some(url) => Some(url),
            None => Some(platform::client::IpResolver::DEFAULT_LOOKUP_URL.to_string()),
        };

        Ok(Self {
            backend_url: var("BACKEND_URL").unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string()),
            backend_timeout: BACKEND_TIMEOUT,
            service_token: var("BACKEND_SERVICE_TOKEN"),
            listen_addr,
            frontend_origins: split_origins(
                &var("FRONTEND_ORIGINS").unwrap_or_else(|| DEFAULT_FRONTEND_ORIGINS.to_string()),
            ),
            ip_lookup_url,
            ip_lookup_timeout: IP_LOOKUP_TIMEOUT,
            auth,
        })
    }
}

/// Non-empty environment variable
fn var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn flag(name: &str) -> anyhow::Result<Option<bool>> {
    var(name)
        .map(|value| parse_flag(&value).with_context(|| format!("{name} must be true or false")))
        .transpose()
}

fn parse_flag(value: &str) -> anyhow::Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("unrecognised flag value {other:?}"),
    }
}

fn number<T>(name: &str) -> anyhow::Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    var(name)
        .map(|value| {
            value
                .parse::<T>()
                .with_context(|| format!("{name} must be a non-negative integer"))
        })
        .transpose()
}

/// 32-byte key from `ORIGIN_CIPHER_KEY` (base64) or `ORIGIN_CIPHER_PASSPHRASE`
fn origin_key() -> anyhow::Result<Option<[u8; 32]>> {
    if let Some(encoded) = var("ORIGIN_CIPHER_KEY") {
        let bytes = from_base64(&encoded).context("ORIGIN_CIPHER_KEY must be base64")?;
        let key: [u8; 32] = bytes
            .as_slice()
            .try_into()
            .with_context(|| format!("ORIGIN_CIPHER_KEY must decode to 32 bytes, got {}", bytes.len()))?;
        return Ok(Some(key));
    }
    Ok(var("ORIGIN_CIPHER_PASSPHRASE").map(|passphrase| sha256(passphrase.as_bytes())))
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}
