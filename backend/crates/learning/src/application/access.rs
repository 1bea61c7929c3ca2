//! Access checks against the caller's [`AuthContext`]

use auth::AuthContext;
use auth::domain::entity::identity::Identity;

use crate::error::{LearningError, LearningResult};

pub fn require_user(ctx: &AuthContext) -> LearningResult<&Identity> {
    ctx.identity().ok_or(LearningError::NotAuthenticated)
}

pub fn require_admin(ctx: &AuthContext) -> LearningResult<&Identity> {
    let identity = require_user(ctx)?;
    if !identity.role.is_admin() {
        return Err(LearningError::Forbidden);
    }
    Ok(identity)
}
