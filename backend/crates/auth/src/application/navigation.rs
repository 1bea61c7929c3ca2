//! Navigation guard
//!
//! A visitor who already holds a session token skips the login page.

pub const LOGIN_PATH: &str = "/login";
pub const DASHBOARD_PATH: &str = "/dashboard";

/// Where to send a request for `path`, or `None` to let it through
pub fn login_redirect(path: &str, has_token: bool) -> Option<&'static str> {
    let path = path.trim_end_matches('/');
    (path == LOGIN_PATH && has_token).then_some(DASHBOARD_PATH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_redirect() {
        assert_eq!(login_redirect("/login", true), Some("/dashboard"));
        assert_eq!(login_redirect("/login/", true), Some("/dashboard"));
        assert_eq!(login_redirect("/login", false), None);
        assert_eq!(login_redirect("/courses", true), None);
    }
}
