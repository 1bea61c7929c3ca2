//! Email provider policy
//!
//! Sign-in accepts addresses from a fixed set of mainstream providers and
//! rejects known throwaway-mail domains.

use super::email::Email;

pub const DEFAULT_ALLOWED_PROVIDERS: &[&str] = &[
    "gmail.com",
    "yahoo.com",
    "outlook.com",
    "hotmail.com",
    "icloud.com",
    "protonmail.com",
    "aol.com",
    "live.com",
];

pub const DEFAULT_DISPOSABLE_DOMAINS: &[&str] = &[
    "mailinator.com",
    "10minutemail.com",
    "guerrillamail.com",
    "tempmail.com",
    "temp-mail.org",
    "yopmail.com",
    "trashmail.com",
    "throwawaymail.com",
    "getnada.com",
    "sharklasers.com",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyViolation {
    Disposable,
    UnsupportedProvider,
}

/// Allowed and disposable domain lists
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailPolicy {
    allowed_providers: Vec<String>,
    disposable_domains: Vec<String>,
}

impl Default for EmailPolicy {
    fn default() -> Self {
        Self::new(
            DEFAULT_ALLOWED_PROVIDERS.iter().copied(),
            DEFAULT_DISPOSABLE_DOMAINS.iter().copied(),
        )
    }
}

impl EmailPolicy {
    /// An empty provider list accepts any non-disposable domain.
    pub fn new<A, D>(allowed_providers: A, disposable_domains: D) -> Self
    where
        A: IntoIterator,
        A::Item: AsRef<str>,
        D: IntoIterator,
        D::Item: AsRef<str>,
    {
        let normalize = |d: &str| d.trim().trim_start_matches('@').to_ascii_lowercase();
        Self {
            allowed_providers: allowed_providers
                .into_iter()
                .map(|d| normalize(d.as_ref()))
                .filter(|d| !d.is_empty())
                .collect(),
            disposable_domains: disposable_domains
                .into_iter()
                .map(|d| normalize(d.as_ref()))
                .filter(|d| !d.is_empty())
                .collect(),
        }
    }

    pub fn allowed_providers(&self) -> &[String] {
        &self.allowed_providers
    }

    /// Matches the domain itself and its subdomains
    pub fn is_disposable(&self, email: &Email) -> bool {
        let domain = email.domain();
        self.disposable_domains.iter().any(|d| {
            domain == d
                || domain
                    .strip_suffix(d.as_str())
                    .is_some_and(|rest| rest.ends_with('.'))
        })
    }

    pub fn is_allowed_provider(&self, email: &Email) -> bool {
        self.allowed_providers.is_empty()
            || self.allowed_providers.iter().any(|p| p == email.domain())
    }

    pub fn check(&self, email: &Email) -> Result<(), PolicyViolation> {
        if self.is_disposable(email) {
            return Err(PolicyViolation::Disposable);
        }
        if !self.is_allowed_provider(email) {
            return Err(PolicyViolation::UnsupportedProvider);
        }
        Ok(())
    }

    pub fn message(&self, violation: &PolicyViolation) -> String {
        match violation {
            PolicyViolation::Disposable => "Disposable email addresses are not allowed".to_string(),
            PolicyViolation::UnsupportedProvider => format!(
                "Please use an email from a supported provider ({})",
                self.allowed_providers.join(", ")
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email(s: &str) -> Email {
        Email::parse(s).unwrap()
    }

    #[test]
    fn test_default_policy() {
        let policy = EmailPolicy::default();
        assert_eq!(policy.check(&email("jane@gmail.com")), Ok(()));
        assert_eq!(
            policy.check(&email("jane@mailinator.com")),
            Err(PolicyViolation::Disposable)
        );
        assert_eq!(
            policy.check(&email("jane@company.io")),
            Err(PolicyViolation::UnsupportedProvider)
        );
    }

    #[test]
    fn test_disposable_subdomain() {
        let policy = EmailPolicy::new(Vec::<String>::new(), ["yopmail.com"]);
        assert!(policy.is_disposable(&email("x@mail.yopmail.com")));
        assert!(!policy.is_disposable(&email("x@notyopmail.com")));
        assert_eq!(policy.check(&email("x@anything.dev")), Ok(()));
    }

    #[test]
    fn test_provider_message_lists_providers() {
        let policy = EmailPolicy::new(["gmail.com", "@Yahoo.com"], Vec::<String>::new());
        assert_eq!(
            policy.message(&PolicyViolation::UnsupportedProvider),
            "Please use an email from a supported provider (gmail.com, yahoo.com)"
        );
    }
}
