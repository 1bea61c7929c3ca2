//! Settings Store
//!
//! Profile form for the signed-in user. `email` and `username` are shown
//! but never written from here; the backend changes them through its own
//! verification flows.

use auth::AuthContext;
use auth::application::navigation::LOGIN_PATH;
use auth::domain::entity::identity::{Identity, ProfileUpdate};
use auth::domain::repository::AccountRepository;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::domain::services::{join_name, split_name};
use crate::error::{LearningError, LearningResult};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingsForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub username: String,
    pub bio: String,
    pub job_title: String,
    pub company: String,
    pub website: String,
    pub linkedin: String,
}

impl SettingsForm {
    pub fn from_identity(identity: &Identity) -> Self {
        let (first, last) = split_name(&identity.name);
        Self {
            first_name: first.to_string(),
            last_name: last.to_string(),
            email: identity.email.clone(),
            username: identity.username.clone(),
            bio: identity.bio.clone(),
            job_title: identity.position.clone(),
            company: identity.company.clone(),
            website: identity.website.clone(),
            linkedin: identity.linked_in.clone(),
        }
    }

    pub fn to_profile_update(&self) -> ProfileUpdate {
        ProfileUpdate {
            name: join_name(&self.first_name, &self.last_name),
            bio: self.bio.clone(),
            position: self.job_title.clone(),
            company: self.company.clone(),
            website: self.website.clone(),
            linked_in: self.linkedin.clone(),
        }
    }
}

pub struct SettingsStore<A>
where
    A: AccountRepository,
{
    accounts: Arc<A>,
    loading: bool,
    initial: Option<SettingsForm>,
    pub form: SettingsForm,
}

impl<A> SettingsStore<A>
where
    A: AccountRepository,
{
    pub fn new(accounts: Arc<A>) -> Self {
        Self {
            accounts,
            loading: true,
            initial: None,
            form: SettingsForm::default(),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Fill the form from the signed-in identity and snapshot it
    pub fn init(&mut self, ctx: &AuthContext) {
        self.loading = true;
        if let Some(identity) = ctx.identity() {
            self.form = SettingsForm::from_identity(identity);
        }
        self.initial = Some(self.form.clone());
        self.loading = false;
    }

    pub fn has_changes(&self) -> bool {
        self.initial.as_ref() != Some(&self.form)
    }

    /// Persist the profile and publish the updated identity into `ctx`
    pub async fn save(&mut self, ctx: &mut AuthContext) -> LearningResult<Identity> {
        let Some(current) = ctx.identity().cloned() else {
            return Err(LearningError::SettingsUnauthenticated);
        };

        let update = self.form.to_profile_update();
        let stored = match self.accounts.update_profile(&current.id, &update).await {
            Ok(stored) => stored,
            Err(e) => {
                let err = LearningError::SaveFailed(e);
                err.log();
                return Err(err);
            }
        };

        let mut identity = current;
        identity.name = stored.name;
        identity.email = stored.email;
        identity.username = stored.username;
        identity.bio = stored.bio;
        identity.position = stored.position;
        identity.company = stored.company;
        identity.website = stored.website;
        identity.linked_in = stored.linked_in;

        ctx.update_identity(identity.clone())
            .map_err(|_| LearningError::SettingsUnauthenticated)?;
        self.initial = Some(self.form.clone());

        tracing::info!(account_id = %identity.id, "Profile settings saved");
        Ok(identity)
    }

    /// Clear the context; returns where the client should go next
    pub fn logout(&self, ctx: &mut AuthContext) -> &'static str {
        ctx.clear();
        LOGIN_PATH
    }
}
