//! Enrollment Entity
//!
//! One row per (user, course) sign-up.

use auth::domain::entity::identity::Identity;
use chrono::{DateTime, Utc};
use derive_more::Display;
use kernel::id::{AccountId, CourseId, EnrollmentId};
use platform::pocketbase::time::deserialize_optional;
use serde::{Deserialize, Serialize};

use super::course::Course;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnrollmentStatus {
    #[default]
    #[display("enrolled")]
    Enrolled,
    #[display("completed")]
    Completed,
    #[display("dropped")]
    Dropped,
    /// Any status this service does not know about
    #[serde(other)]
    #[display("unknown")]
    Unknown,
}

/// Related records requested with `expand`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnrollmentExpand {
    #[serde(default, rename = "userId", skip_serializing_if = "Option::is_none")]
    pub user: Option<Identity>,
    #[serde(default, rename = "courseId", skip_serializing_if = "Option::is_none")]
    pub course: Option<Course>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    pub id: EnrollmentId,
    pub user_id: AccountId,
    pub course_id: CourseId,
    #[serde(default)]
    pub status: EnrollmentStatus,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default)]
    pub progress: f64,
    #[serde(default, deserialize_with = "deserialize_optional")]
    pub created: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_optional")]
    pub updated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub expand: EnrollmentExpand,
}

impl Enrollment {
    pub fn course(&self) -> Option<&Course> {
        self.expand.course.as_ref()
    }

    pub fn user(&self) -> Option<&Identity> {
        self.expand.user.as_ref()
    }
}

/// Body of a new enrollment
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEnrollment {
    pub user_id: AccountId,
    pub course_id: CourseId,
    pub is_completed: bool,
    pub status: EnrollmentStatus,
    pub progress: f64,
}

impl NewEnrollment {
    pub fn new(user_id: AccountId, course_id: CourseId) -> Self {
        Self {
            user_id,
            course_id,
            is_completed: false,
            status: EnrollmentStatus::Enrolled,
            progress: 0.0,
        }
    }
}
