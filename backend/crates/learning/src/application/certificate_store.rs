//! Certificate Store

use auth::AuthContext;
use serde::Serialize;
use std::sync::Arc;

use crate::application::access::require_user;
use crate::application::load_state::LoadState;
use crate::domain::entity::certificate::Certificate;
use crate::domain::repository::CertificateRepository;
use crate::error::LearningResult;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateState {
    pub certificates: Vec<Certificate>,
    #[serde(flatten)]
    pub status: LoadState,
}

pub struct CertificateStore<R>
where
    R: CertificateRepository,
{
    repo: Arc<R>,
    state: CertificateState,
}

impl<R> CertificateStore<R>
where
    R: CertificateRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self {
            repo,
            state: CertificateState::default(),
        }
    }

    pub fn state(&self) -> &CertificateState {
        &self.state
    }

    pub fn into_state(self) -> CertificateState {
        self.state
    }

    pub async fn fetch(&mut self, ctx: &AuthContext) -> LearningResult<()> {
        self.state.status.begin();
        let result = self.load(ctx).await;
        self.state.status.finish(result, "fetch_certificates")
    }

    async fn load(&mut self, ctx: &AuthContext) -> LearningResult<()> {
        let user = require_user(ctx)?;
        self.state.certificates = self.repo.list_certificates(&user.id).await?;
        Ok(())
    }
}
