//! Auth Context
//!
//! Identity and token of one application session. Owned by the caller and
//! passed to use cases explicitly; the HTTP layer builds one per request.

use crate::domain::entity::identity::Identity;
use crate::error::{AuthError, AuthResult};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthContext {
    identity: Option<Identity>,
    token: Option<String>,
}

impl AuthContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context already holding a signed-in identity
    pub fn authenticated(identity: Identity, token: impl Into<String>) -> Self {
        let mut ctx = Self::new();
        ctx.publish(identity, token);
        ctx
    }

    pub fn publish(&mut self, identity: Identity, token: impl Into<String>) {
        self.identity = Some(identity);
        self.token = Some(token.into());
    }

    pub fn clear(&mut self) {
        self.identity = None;
        self.token = None;
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some() && self.token.is_some()
    }

    pub fn require_identity(&self) -> AuthResult<&Identity> {
        match (&self.identity, &self.token) {
            (Some(identity), Some(_)) => Ok(identity),
            _ => Err(AuthError::NotAuthenticated),
        }
    }

    /// Replace the identity after a profile change; keeps the token.
    pub fn update_identity(&mut self, identity: Identity) -> AuthResult<()> {
        if !self.is_authenticated() {
            return Err(AuthError::NotAuthenticated);
        }
        self.identity = Some(identity);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kernel::id::AccountId;

    fn identity() -> Identity {
        Identity::new(AccountId::new(), "jane@gmail.com", "Jane Doe")
    }

    #[test]
    fn test_publish_and_clear() {
        let mut ctx = AuthContext::new();
        assert!(!ctx.is_authenticated());
        assert!(matches!(ctx.require_identity(), Err(AuthError::NotAuthenticated)));

        ctx.publish(identity(), "tok");
        assert!(ctx.is_authenticated());
        assert_eq!(ctx.token(), Some("tok"));
        assert_eq!(ctx.require_identity().unwrap().name, "Jane Doe");

        ctx.clear();
        assert!(ctx.identity().is_none());
        assert!(ctx.token().is_none());
    }

    #[test]
    fn test_update_identity_requires_session() {
        let mut ctx = AuthContext::new();
        assert!(ctx.update_identity(identity()).is_err());

        ctx.publish(identity(), "tok");
        let mut renamed = identity();
        renamed.name = "Janet Doe".into();
        ctx.update_identity(renamed).unwrap();
        assert_eq!(ctx.identity().unwrap().name, "Janet Doe");
        assert_eq!(ctx.token(), Some("tok"));
    }
}
