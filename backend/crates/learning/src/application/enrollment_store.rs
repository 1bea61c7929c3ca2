//! Enrollment Store
//!
//! The current user's enrollments, the one being viewed and the completed
//! subset.

use auth::AuthContext;
use kernel::id::CourseId;
use serde::Serialize;
use std::sync::Arc;

use crate::application::access::require_user;
use crate::application::load_state::LoadState;
use crate::domain::entity::enrollment::{Enrollment, EnrollmentStatus, NewEnrollment};
use crate::domain::repository::EnrollmentRepository;
use crate::error::LearningResult;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentState {
    pub enrollments: Vec<Enrollment>,
    pub completed_courses: Vec<Enrollment>,
    pub current_enrollment: Option<Enrollment>,
    #[serde(flatten)]
    pub status: LoadState,
}

pub struct EnrollmentStore<R>
where
    R: EnrollmentRepository,
{
    repo: Arc<R>,
    state: EnrollmentState,
}

impl<R> EnrollmentStore<R>
where
    R: EnrollmentRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self {
            repo,
            state: EnrollmentState::default(),
        }
    }

    pub fn state(&self) -> &EnrollmentState {
        &self.state
    }

    pub fn into_state(self) -> EnrollmentState {
        self.state
    }

    pub fn is_enrolled(&self, course_id: &CourseId) -> bool {
        self.state.enrollments.iter().any(|e| &e.course_id == course_id)
    }

    pub fn enrollments_count(&self) -> usize {
        self.state.enrollments.len()
    }

    pub fn completed_count(&self) -> usize {
        self.state.completed_courses.len()
    }

    pub fn is_loading(&self) -> bool {
        self.state.status.loading
    }

    /// Load the user's enrollments in one course
    pub async fn fetch_by_course(
        &mut self,
        ctx: &AuthContext,
        course_id: &CourseId,
    ) -> LearningResult<()> {
        self.state.status.begin();
        let result = self.load_by_course(ctx, course_id).await;
        self.state.status.finish(result, "fetch_by_course")
    }

    async fn load_by_course(&mut self, ctx: &AuthContext, course_id: &CourseId) -> LearningResult<()> {
        let user = require_user(ctx)?;
        let list = self.repo.list_for_course(&user.id, course_id).await?;

        self.state.current_enrollment = list.first().cloned();
        self.state.completed_courses = list.iter().filter(|e| e.is_completed).cloned().collect();
        self.state.enrollments = list;
        Ok(())
    }

    /// Load every active enrollment of the user with its course
    pub async fn fetch_enrolled_courses(&mut self, ctx: &AuthContext) -> LearningResult<()> {
        self.state.status.begin();
        let result = self.load_enrolled_courses(ctx).await;
        self.state.status.finish(result, "fetch_enrolled_courses")
    }

    async fn load_enrolled_courses(&mut self, ctx: &AuthContext) -> LearningResult<()> {
        let user = require_user(ctx)?;
        self.state.enrollments = self
            .repo
            .list_by_status(&user.id, EnrollmentStatus::Enrolled)
            .await?;
        Ok(())
    }

    /// Enroll the user; the new record becomes the current enrollment
    pub async fn enroll(&mut self, ctx: &AuthContext, course_id: &CourseId) -> LearningResult<Enrollment> {
        self.state.status.begin();
        let result = self.create(ctx, course_id).await;
        self.state.status.finish(result, "enroll")
    }

    async fn create(&mut self, ctx: &AuthContext, course_id: &CourseId) -> LearningResult<Enrollment> {
        let user = require_user(ctx)?;
        let record = self
            .repo
            .create_enrollment(&NewEnrollment::new(user.id.clone(), course_id.clone()))
            .await?;

        tracing::info!(
            account_id = %user.id,
            course_id = %course_id,
            enrollment_id = %record.id,
            "Enrolled in course"
        );

        self.state.current_enrollment = Some(record.clone());
        self.state.enrollments.push(record.clone());
        Ok(record)
    }
}
