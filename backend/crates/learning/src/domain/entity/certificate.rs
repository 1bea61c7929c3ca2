//! Certificate Entity

use chrono::{DateTime, Utc};
use kernel::id::{AccountId, CertificateId, CourseId};
use platform::pocketbase::time::deserialize_optional;
use serde::{Deserialize, Serialize};

use super::course::Course;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CertificateExpand {
    #[serde(default, rename = "courseId", skip_serializing_if = "Option::is_none")]
    pub course: Option<Course>,
}

/// Completion certificate issued for a course
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Certificate {
    pub id: CertificateId,
    pub user_id: AccountId,
    pub course_id: CourseId,
    #[serde(default, deserialize_with = "deserialize_optional")]
    pub issue_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub credential_id: String,
    #[serde(default)]
    pub expand: CertificateExpand,
}

impl Certificate {
    pub fn course_title(&self) -> Option<&str> {
        self.expand.course.as_ref().map(|c| c.title.as_str())
    }
}
