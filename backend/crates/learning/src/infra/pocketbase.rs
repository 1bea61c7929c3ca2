//! Hosted Backend Repository Implementations
//!
//! Collections:
//! - `enrollments`: `userId` and `courseId` relations, `status`, `progress`
//! - `courses`: catalogue with optional `instructorId`
//! - `certificates`: one per completed course
//! - `instructors`
//! - `users`: read-only here (owned by the auth crate)

use auth::domain::entity::identity::Identity;
use auth::infra::pocketbase::USERS_COLLECTION;
use kernel::id::{AccountId, CourseId};
use platform::pocketbase::{Filter, ListPage, ListQuery, PbClient};
use serde::de::IgnoredAny;

use crate::domain::entity::{
    certificate::Certificate,
    course::{Course, CourseDraft},
    enrollment::{Enrollment, EnrollmentStatus, NewEnrollment},
    instructor::Instructor,
};
use crate::domain::repository::{
    CertificateRepository, CourseRepository, EnrollmentExpansion, EnrollmentRepository,
    MemberDirectory,
};
use crate::error::LearningResult;

pub const ENROLLMENTS_COLLECTION: &str = "enrollments";
pub const COURSES_COLLECTION: &str = "courses";
pub const CERTIFICATES_COLLECTION: &str = "certificates";
pub const INSTRUCTORS_COLLECTION: &str = "instructors";

const NEWEST_FIRST: &str = "-created";

/// Backend-backed learning repository
#[derive(Clone)]
pub struct PbLearningRepository {
    client: PbClient,
}

impl PbLearningRepository {
    pub fn new(client: PbClient) -> Self {
        Self { client }
    }

    /// Number of matching records without fetching them
    async fn count(&self, collection: &str, filter: Option<Filter>) -> LearningResult<u64> {
        let mut query = ListQuery::new().page(1, 1);
        if let Some(filter) = filter {
            query = query.filter(filter);
        }
        let page: ListPage<IgnoredAny> = self.client.list(collection, &query).await?;
        Ok(page.total_items)
    }
}

fn expand_param(expand: EnrollmentExpansion) -> Option<&'static str> {
    match (expand.user, expand.course) {
        (true, true) => Some("userId,courseId"),
        (true, false) => Some("userId"),
        (false, true) => Some("courseId"),
        (false, false) => None,
    }
}

// ============================================================================
// Enrollment Repository Implementation
// ============================================================================

impl EnrollmentRepository for PbLearningRepository {
    async fn list_for_course(
        &self,
        account_id: &AccountId,
        course_id: &CourseId,
    ) -> LearningResult<Vec<Enrollment>> {
        let filter = Filter::eq("courseId", course_id.as_str())
            .and(Filter::eq("userId", account_id.as_str()));
        Ok(self
            .client
            .full_list(ENROLLMENTS_COLLECTION, &ListQuery::new().filter(filter))
            .await?)
    }

    async fn list_by_status(
        &self,
        account_id: &AccountId,
        status: EnrollmentStatus,
    ) -> LearningResult<Vec<Enrollment>> {
        let filter = Filter::eq("userId", account_id.as_str())
            .and(Filter::eq("status", status.to_string()));
        let query = ListQuery::new().filter(filter).expand("courseId");
        Ok(self.client.full_list(ENROLLMENTS_COLLECTION, &query).await?)
    }

    async fn create_enrollment(&self, enrollment: &NewEnrollment) -> LearningResult<Enrollment> {
        Ok(self.client.create(ENROLLMENTS_COLLECTION, enrollment).await?)
    }

    async fn list_enrollments(
        &self,
        expand: EnrollmentExpansion,
        limit: Option<u32>,
    ) -> LearningResult<Vec<Enrollment>> {
        let mut query = ListQuery::new();
        if let Some(expand) = expand_param(expand) {
            query = query.expand(expand);
        }

        match limit {
            Some(limit) => {
                let query = query.page(1, limit).sort(NEWEST_FIRST);
                let page: ListPage<Enrollment> =
                    self.client.list(ENROLLMENTS_COLLECTION, &query).await?;
                Ok(page.items)
            }
            None => Ok(self.client.full_list(ENROLLMENTS_COLLECTION, &query).await?),
        }
    }

    async fn count_enrollments(&self, status: EnrollmentStatus) -> LearningResult<u64> {
        self.count(
            ENROLLMENTS_COLLECTION,
            Some(Filter::eq("status", status.to_string())),
        )
        .await
    }
}

// ============================================================================
// Certificate Repository Implementation
// ============================================================================

impl CertificateRepository for PbLearningRepository {
    async fn list_certificates(&self, account_id: &AccountId) -> LearningResult<Vec<Certificate>> {
        let query = ListQuery::new()
            .filter(Filter::eq("userId", account_id.as_str()))
            .sort("-issueDate")
            .expand("courseId");
        Ok(self.client.full_list(CERTIFICATES_COLLECTION, &query).await?)
    }
}

// ============================================================================
// Course Repository Implementation
// ============================================================================

impl CourseRepository for PbLearningRepository {
    async fn list_courses(&self) -> LearningResult<Vec<Course>> {
        let query = ListQuery::new().sort(NEWEST_FIRST);
        Ok(self.client.full_list(COURSES_COLLECTION, &query).await?)
    }

    async fn count_courses(&self) -> LearningResult<u64> {
        self.count(COURSES_COLLECTION, None).await
    }

    async fn create_course(&self, draft: &CourseDraft) -> LearningResult<Course> {
        Ok(self.client.create(COURSES_COLLECTION, draft).await?)
    }

    async fn update_course(
        &self,
        course_id: &CourseId,
        draft: &CourseDraft,
    ) -> LearningResult<Course> {
        Ok(self
            .client
            .update(COURSES_COLLECTION, course_id.as_str(), draft)
            .await?)
    }

    async fn delete_course(&self, course_id: &CourseId) -> LearningResult<()> {
        Ok(self
            .client
            .delete(COURSES_COLLECTION, course_id.as_str())
            .await?)
    }

    async fn list_instructors(&self) -> LearningResult<Vec<Instructor>> {
        let query = ListQuery::new().sort("name");
        Ok(self.client.full_list(INSTRUCTORS_COLLECTION, &query).await?)
    }
}

// ============================================================================
// Member Directory Implementation
// ============================================================================

impl MemberDirectory for PbLearningRepository {
    async fn list_members(&self, limit: Option<u32>) -> LearningResult<Vec<Identity>> {
        let query = ListQuery::new().sort(NEWEST_FIRST);
        match limit {
            Some(limit) => {
                let page: ListPage<Identity> = self
                    .client
                    .list(USERS_COLLECTION, &query.page(1, limit))
                    .await?;
                Ok(page.items)
            }
            None => Ok(self.client.full_list(USERS_COLLECTION, &query).await?),
        }
    }

    async fn count_learners(&self) -> LearningResult<u64> {
        self.count(USERS_COLLECTION, Some(Filter::ne("role", "admin")))
            .await
    }
}
