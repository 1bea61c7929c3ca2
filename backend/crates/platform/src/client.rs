//! Client identification utilities
//!
//! Derives a device fingerprint (browser and OS, parsed from the
//! User-Agent) and the client's network origin.

use axum::http::{HeaderMap, header};
use serde::Deserialize;
use std::fmt;
use std::net::IpAddr;
use std::time::Duration;

/// Browser family, parsed heuristically from the User-Agent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Browser {
    Edge,
    Opera,
    Chrome,
    Firefox,
    Safari,
    Unknown,
}

impl Browser {
    /// Edge and Opera carry "Chrome" in their UA, and Chrome carries
    /// "Safari", so the most specific tokens are checked first.
    pub fn from_user_agent(ua: &str) -> Self {
        if ua.contains("Edg/") || ua.contains("Edge/") {
            Browser::Edge
        } else if ua.contains("OPR/") || ua.contains("Opera") {
            Browser::Opera
        } else if ua.contains("Chrome/") || ua.contains("CriOS/") {
            Browser::Chrome
        } else if ua.contains("Firefox/") || ua.contains("FxiOS/") {
            Browser::Firefox
        } else if ua.contains("Safari/") {
            Browser::Safari
        } else {
            Browser::Unknown
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Browser::Edge => "Edge",
            Browser::Opera => "Opera",
            Browser::Chrome => "Chrome",
            Browser::Firefox => "Firefox",
            Browser::Safari => "Safari",
            Browser::Unknown => "Unknown Browser",
        }
    }
}

/// Operating system family, parsed heuristically from the User-Agent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatingSystem {
    Windows,
    MacOs,
    Ios,
    Android,
    Linux,
    Unknown,
}

impl OperatingSystem {
    /// iOS UAs mention "like Mac OS X" and Android UAs mention "Linux",
    /// hence the ordering.
    pub fn from_user_agent(ua: &str) -> Self {
        if ua.contains("Windows") {
            OperatingSystem::Windows
        } else if ua.contains("iPhone") || ua.contains("iPad") || ua.contains("iPod") {
            OperatingSystem::Ios
        } else if ua.contains("Mac OS X") || ua.contains("Macintosh") {
            OperatingSystem::MacOs
        } else if ua.contains("Android") {
            OperatingSystem::Android
        } else if ua.contains("Linux") || ua.contains("X11") {
            OperatingSystem::Linux
        } else {
            OperatingSystem::Unknown
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            OperatingSystem::Windows => "Windows",
            OperatingSystem::MacOs => "macOS",
            OperatingSystem::Ios => "iOS",
            OperatingSystem::Android => "Android",
            OperatingSystem::Linux => "Linux",
            OperatingSystem::Unknown => "Unknown OS",
        }
    }
}

/// Device description derived from a User-Agent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceInfo {
    pub browser: Browser,
    pub os: OperatingSystem,
}

impl DeviceInfo {
    pub fn from_user_agent(ua: &str) -> Self {
        Self {
            browser: Browser::from_user_agent(ua),
            os: OperatingSystem::from_user_agent(ua),
        }
    }

    /// Label stored on session records, e.g. `"Chrome on Windows"`
    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for DeviceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} on {}", self.browser.as_str(), self.os.as_str())
    }
}

/// Client fingerprint: device plus network origin
///
/// Session records are keyed by account and device label.
#[derive(Debug, Clone)]
pub struct ClientFingerprint {
    pub device: DeviceInfo,
    /// Client IP address (from X-Forwarded-For or direct connection)
    pub ip: Option<IpAddr>,
    /// Original User-Agent string
    pub user_agent: Option<String>,
}

impl ClientFingerprint {
    pub fn new(user_agent: Option<String>, ip: Option<IpAddr>) -> Self {
        let device = DeviceInfo::from_user_agent(user_agent.as_deref().unwrap_or_default());
        Self {
            device,
            ip,
            user_agent,
        }
    }

    pub fn device_label(&self) -> String {
        self.device.label()
    }

    pub fn ip_string(&self) -> Option<String> {
        self.ip.map(|ip| ip.to_string())
    }
}

/// Build a fingerprint from request headers.
///
/// A missing User-Agent yields an "Unknown Browser on Unknown OS" device
/// rather than an error; such clients still get one session record.
pub fn extract_fingerprint(headers: &HeaderMap, client_ip: Option<IpAddr>) -> ClientFingerprint {
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    ClientFingerprint::new(user_agent, client_ip)
}

/// Extract client IP address from headers
///
/// Checks X-Forwarded-For header first (for reverse proxy setups),
/// then falls back to direct connection IP.
pub fn extract_client_ip(headers: &HeaderMap, direct_ip: Option<IpAddr>) -> Option<IpAddr> {
    if let Some(xff) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        if let Some(first_ip) = xff.split(',').next() {
            if let Ok(ip) = first_ip.trim().parse::<IpAddr>() {
                return Some(ip);
            }
        }
    }
    direct_ip
}

/// Public IP lookup errors
#[derive(Debug, thiserror::Error)]
pub enum IpLookupError {
    #[error("IP lookup is disabled")]
    Disabled,

    #[error("IP lookup request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("IP lookup returned an unparseable address: {0}")]
    InvalidAddress(String),
}

#[derive(Deserialize)]
struct IpLookupResponse {
    ip: String,
}

#[derive(Debug, Clone)]
enum IpSource {
    Disabled,
    Fixed(IpAddr),
    Public { http: reqwest::Client, url: String },
}

/// Resolves the caller's public IP when the request did not carry one.
#[derive(Debug, Clone)]
pub struct IpResolver {
    source: IpSource,
}

impl IpResolver {
    /// Default public lookup endpoint (`{"ip": "..."}` response)
    pub const DEFAULT_LOOKUP_URL: &'static str = "https://api.ipify.org?format=json";

    pub fn public(url: impl Into<String>, timeout: Duration) -> Result<Self, IpLookupError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            source: IpSource::Public {
                http,
                url: url.into(),
            },
        })
    }

    pub fn fixed(ip: IpAddr) -> Self {
        Self {
            source: IpSource::Fixed(ip),
        }
    }

    pub fn disabled() -> Self {
        Self {
            source: IpSource::Disabled,
        }
    }

    pub async fn lookup(&self) -> Result<IpAddr, IpLookupError> {
        match &self.source {
            IpSource::Disabled => Err(IpLookupError::Disabled),
            IpSource::Fixed(ip) => Ok(*ip),
            IpSource::Public { http, url } => {
                let body: IpLookupResponse = http
                    .get(url)
                    .send()
                    .await?
                    .error_for_status()?
                    .json()
                    .await?;
                body.ip
                    .trim()
                    .parse()
                    .map_err(|_| IpLookupError::InvalidAddress(body.ip))
            }
        }
    }

    /// Known IP if any, otherwise a lookup; `"unknown"` when both fail.
    pub async fn resolve(&self, known: Option<IpAddr>) -> String {
        if let Some(ip) = known {
            return ip.to_string();
        }
        match self.lookup().await {
            Ok(ip) => ip.to_string(),
            Err(IpLookupError::Disabled) => "unknown".to_string(),
            Err(e) => {
                tracing::warn!(error = %e, "Public IP lookup failed");
                "unknown".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    const CHROME_WINDOWS: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
    const EDGE_WINDOWS: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36 Edg/120.0.2210.91";
    const SAFARI_IPHONE: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_2 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.2 Mobile/15E148 Safari/604.1";
    const FIREFOX_LINUX: &str =
        "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:121.0) Gecko/20100101 Firefox/121.0";
    const CHROME_ANDROID: &str = "Mozilla/5.0 (Linux; Android 14; Pixel 8) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.6099.144 Mobile Safari/537.36";
    const SAFARI_MAC: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_2) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.2 Safari/605.1.15";

    #[test]
    fn test_device_labels() {
        assert_eq!(DeviceInfo::from_user_agent(CHROME_WINDOWS).label(), "Chrome on Windows");
        assert_eq!(DeviceInfo::from_user_agent(EDGE_WINDOWS).label(), "Edge on Windows");
        assert_eq!(DeviceInfo::from_user_agent(SAFARI_IPHONE).label(), "Safari on iOS");
        assert_eq!(DeviceInfo::from_user_agent(FIREFOX_LINUX).label(), "Firefox on Linux");
        assert_eq!(DeviceInfo::from_user_agent(CHROME_ANDROID).label(), "Chrome on Android");
        assert_eq!(DeviceInfo::from_user_agent(SAFARI_MAC).label(), "Safari on macOS");
        assert_eq!(
            DeviceInfo::from_user_agent("curl/8.4.0").label(),
            "Unknown Browser on Unknown OS"
        );
    }

    #[test]
    fn test_extract_fingerprint() {
        let mut headers = HeaderMap::new();
        headers.insert(header::USER_AGENT, HeaderValue::from_static(FIREFOX_LINUX));

        let fp = extract_fingerprint(&headers, "192.0.2.4".parse().ok());
        assert_eq!(fp.device_label(), "Firefox on Linux");
        assert_eq!(fp.ip_string(), Some("192.0.2.4".to_string()));
        assert_eq!(fp.user_agent.as_deref(), Some(FIREFOX_LINUX));
    }

    #[test]
    fn test_extract_fingerprint_without_user_agent() {
        let fp = extract_fingerprint(&HeaderMap::new(), None);
        assert_eq!(fp.device.browser, Browser::Unknown);
        assert_eq!(fp.device.os, OperatingSystem::Unknown);
        assert!(fp.user_agent.is_none());
    }

    #[test]
    fn test_extract_client_ip_xff() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("192.168.1.1, 10.0.0.1"),
        );

        let ip = extract_client_ip(&headers, None);
        assert_eq!(ip, Some("192.168.1.1".parse().unwrap()));
    }

    #[test]
    fn test_extract_client_ip_direct() {
        let direct: IpAddr = "127.0.0.1".parse().unwrap();
        assert_eq!(extract_client_ip(&HeaderMap::new(), Some(direct)), Some(direct));
    }

    #[tokio::test]
    async fn test_resolver_prefers_known_ip() {
        let resolver = IpResolver::fixed("203.0.113.7".parse().unwrap());
        assert_eq!(resolver.resolve("198.51.100.2".parse().ok()).await, "198.51.100.2");
        assert_eq!(resolver.resolve(None).await, "203.0.113.7");
        assert_eq!(IpResolver::disabled().resolve(None).await, "unknown");
    }
}
