//! API DTOs

use auth::presentation::dto::UserResponse;
use serde::Serialize;

use crate::application::admin_dashboard::CourseRow;
use crate::application::{EnrollmentState, SettingsForm};
use crate::domain::entity::course::Course;

/// Enrollments of the caller in one course
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseEnrollmentResponse {
    #[serde(flatten)]
    pub state: EnrollmentState,
    pub is_enrolled: bool,
    pub enrollments_count: usize,
    pub completed_courses_count: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsResponse {
    pub form: SettingsForm,
    pub has_changes: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsSavedResponse {
    pub user: UserResponse,
    pub form: SettingsForm,
}

/// A created or updated course plus the refreshed list
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseChangeResponse {
    pub course: Course,
    pub courses: Vec<CourseRow>,
}
