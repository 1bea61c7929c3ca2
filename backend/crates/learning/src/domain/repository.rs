//! Repository Traits
//!
//! Interfaces to the learning collections of the hosted backend.

use auth::domain::entity::identity::Identity;
use kernel::id::{AccountId, CourseId};

use crate::domain::entity::{
    certificate::Certificate,
    course::{Course, CourseDraft},
    enrollment::{Enrollment, EnrollmentStatus, NewEnrollment},
    instructor::Instructor,
};
use crate::error::LearningResult;

/// Which related records to expand on enrollment queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EnrollmentExpansion {
    pub user: bool,
    pub course: bool,
}

impl EnrollmentExpansion {
    pub const NONE: Self = Self { user: false, course: false };
    pub const COURSE: Self = Self { user: false, course: true };
    pub const ALL: Self = Self { user: true, course: true };
}

#[trait_variant::make(EnrollmentRepository: Send)]
pub trait LocalEnrollmentRepository {
    /// Enrollments of one user in one course
    async fn list_for_course(
        &self,
        account_id: &AccountId,
        course_id: &CourseId,
    ) -> LearningResult<Vec<Enrollment>>;

    /// Enrollments of one user with the given status, course expanded
    async fn list_by_status(
        &self,
        account_id: &AccountId,
        status: EnrollmentStatus,
    ) -> LearningResult<Vec<Enrollment>>;

    async fn create_enrollment(&self, enrollment: &NewEnrollment) -> LearningResult<Enrollment>;

    /// Every enrollment, newest first when `limit` is set
    async fn list_enrollments(
        &self,
        expand: EnrollmentExpansion,
        limit: Option<u32>,
    ) -> LearningResult<Vec<Enrollment>>;

    async fn count_enrollments(&self, status: EnrollmentStatus) -> LearningResult<u64>;
}

#[trait_variant::make(CertificateRepository: Send)]
pub trait LocalCertificateRepository {
    /// Certificates of one user, newest issue date first, course expanded
    async fn list_certificates(&self, account_id: &AccountId) -> LearningResult<Vec<Certificate>>;
}

#[trait_variant::make(CourseRepository: Send)]
pub trait LocalCourseRepository {
    /// Newest first
    async fn list_courses(&self) -> LearningResult<Vec<Course>>;

    async fn count_courses(&self) -> LearningResult<u64>;

    async fn create_course(&self, draft: &CourseDraft) -> LearningResult<Course>;

    async fn update_course(&self, course_id: &CourseId, draft: &CourseDraft)
    -> LearningResult<Course>;

    async fn delete_course(&self, course_id: &CourseId) -> LearningResult<()>;

    /// Sorted by name
    async fn list_instructors(&self) -> LearningResult<Vec<Instructor>>;
}

/// Read access to user accounts for the admin dashboard
#[trait_variant::make(MemberDirectory: Send)]
pub trait LocalMemberDirectory {
    /// Newest first, at most `limit` when set
    async fn list_members(&self, limit: Option<u32>) -> LearningResult<Vec<Identity>>;

    /// Accounts that are not administrators
    async fn count_learners(&self) -> LearningResult<u64>;
}
