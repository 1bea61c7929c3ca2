//! Admin Dashboard
//!
//! Headline stats, recent activity feed, user and course management lists.

use auth::domain::entity::identity::Identity;
use auth::domain::value_object::user_role::UserRole;
use chrono::{DateTime, Utc};
use kernel::id::{AccountId, CourseId};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::entity::{
    course::{Course, CourseDraft},
    enrollment::{Enrollment, EnrollmentStatus},
    instructor::Instructor,
};
use crate::domain::repository::{
    CourseRepository, EnrollmentExpansion, EnrollmentRepository, MemberDirectory,
};
use crate::domain::services::{avatar_color, format_date, initials, relative_time, total_revenue};
use crate::error::LearningResult;

const RECENT_ENROLLMENTS: u32 = 10;
const RECENT_SIGNUPS: u32 = 5;
const ACTIVITY_FEED_LEN: usize = 5;
const UNKNOWN_INSTRUCTOR: &str = "Unknown";

pub const QUICK_ACTIONS: [&str; 4] = [
    "Create New Course",
    "Add New User",
    "View Analytics",
    "System Settings",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuickAction {
    pub label: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StatIcon {
    #[serde(rename = "users")]
    Users,
    #[serde(rename = "book-open")]
    BookOpen,
    #[serde(rename = "bar-chart-2")]
    BarChart,
    #[serde(rename = "dollar-sign")]
    DollarSign,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Stat {
    pub title: &'static str,
    pub value: u64,
    pub change: &'static str,
    pub icon: StatIcon,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: String,
    pub initials: String,
    pub user_name: String,
    pub action: &'static str,
    pub subject: Option<String>,
    pub timestamp: String,
    pub avatar_color: &'static str,
    #[serde(skip)]
    pub occurred_at: DateTime<Utc>,
}

impl Activity {
    fn new(
        id: String,
        user_name: &str,
        action: &'static str,
        subject: Option<String>,
        occurred_at: Option<DateTime<Utc>>,
        now: &DateTime<Utc>,
        avatar_color: &'static str,
    ) -> Self {
        let occurred_at = occurred_at.unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
        Self {
            id,
            initials: initials(user_name),
            user_name: user_name.to_string(),
            action,
            subject,
            timestamp: relative_time(&occurred_at, now),
            avatar_color,
            occurred_at,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MemberStatus {
    Active,
    Inactive,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberRow {
    pub id: AccountId,
    pub name: String,
    pub email: String,
    pub username: String,
    pub role: UserRole,
    pub avatar: String,
    pub enrolled_courses: usize,
    pub status: MemberStatus,
    /// `YYYY-MM-DD`
    pub created: String,
}

impl MemberRow {
    fn new(identity: Identity, enrolled_courses: usize) -> Self {
        Self {
            status: if identity.verified {
                MemberStatus::Active
            } else {
                MemberStatus::Inactive
            },
            created: identity.created.as_ref().map(format_date).unwrap_or_default(),
            id: identity.id,
            name: identity.name,
            email: identity.email,
            username: identity.username,
            role: identity.role,
            avatar: identity.avatar,
            enrolled_courses,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseRow {
    #[serde(flatten)]
    pub course: Course,
    pub instructor_name: String,
    pub enrollments_count: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AdminLoading {
    pub stats: bool,
    pub activity: bool,
    pub users: bool,
    pub courses: bool,
    pub instructors: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminState {
    pub stats: Vec<Stat>,
    pub recent_activity: Vec<Activity>,
    pub quick_actions: Vec<QuickAction>,
    pub users: Vec<MemberRow>,
    pub courses: Vec<CourseRow>,
    pub instructors: Vec<Instructor>,
    pub loading: AdminLoading,
    pub error: Option<String>,
}

impl Default for AdminState {
    fn default() -> Self {
        Self {
            stats: Vec::new(),
            recent_activity: Vec::new(),
            quick_actions: QUICK_ACTIONS.map(|label| QuickAction { label }).to_vec(),
            users: Vec::new(),
            courses: Vec::new(),
            instructors: Vec::new(),
            loading: AdminLoading::default(),
            error: None,
        }
    }
}

fn count_by<'a, K: std::hash::Hash + Eq + 'a>(
    keys: impl IntoIterator<Item = &'a K>,
) -> HashMap<&'a K, usize> {
    let mut counts = HashMap::new();
    for key in keys {
        *counts.entry(key).or_insert(0) += 1;
    }
    counts
}

pub struct AdminDashboard<R>
where
    R: EnrollmentRepository + CourseRepository + MemberDirectory,
{
    repo: Arc<R>,
    state: AdminState,
}

impl<R> AdminDashboard<R>
where
    R: EnrollmentRepository + CourseRepository + MemberDirectory,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self {
            repo,
            state: AdminState::default(),
        }
    }

    pub fn state(&self) -> &AdminState {
        &self.state
    }

    pub fn into_state(self) -> AdminState {
        self.state
    }

    fn record<T>(&mut self, result: LearningResult<T>, operation: &str) -> LearningResult<T> {
        if let Err(e) = &result {
            tracing::error!(operation, error = %e, "Admin dashboard operation failed");
            self.state.error = Some(e.to_string());
        }
        result
    }

    // ------------------------------------------------------------------
    // Stats
    // ------------------------------------------------------------------

    pub async fn fetch_stats(&mut self) -> LearningResult<()> {
        self.state.loading.stats = true;
        self.state.error = None;
        let result = self.load_stats().await;
        self.state.loading.stats = false;
        self.record(result, "fetch_stats")
    }

    async fn load_stats(&mut self) -> LearningResult<()> {
        let learners = self.repo.count_learners().await?;
        let courses = self.repo.count_courses().await?;
        let active = self.repo.count_enrollments(EnrollmentStatus::Enrolled).await?;

        let enrollments = self
            .repo
            .list_enrollments(EnrollmentExpansion::COURSE, None)
            .await?;
        let revenue = total_revenue(
            enrollments
                .iter()
                .filter_map(Enrollment::course)
                .map(Course::price_value),
        );

        self.state.stats = vec![
            Stat { title: "Total Users", value: learners, change: "+12.5%", icon: StatIcon::Users },
            Stat { title: "Total Courses", value: courses, change: "+4.2%", icon: StatIcon::BookOpen },
            Stat { title: "Active Enrollments", value: active, change: "+18.7%", icon: StatIcon::BarChart },
            Stat { title: "Revenue", value: revenue, change: "+8.3%", icon: StatIcon::DollarSign },
        ];
        Ok(())
    }

    // ------------------------------------------------------------------
    // Activity feed
    // ------------------------------------------------------------------

    pub async fn fetch_recent_activity(&mut self, now: DateTime<Utc>) -> LearningResult<()> {
        self.state.loading.activity = true;
        self.state.error = None;
        let result = self.load_recent_activity(&now).await;
        self.state.loading.activity = false;
        self.record(result, "fetch_recent_activity")
    }

    async fn load_recent_activity(&mut self, now: &DateTime<Utc>) -> LearningResult<()> {
        let enrollments = self
            .repo
            .list_enrollments(EnrollmentExpansion::ALL, Some(RECENT_ENROLLMENTS))
            .await?;

        let mut activities = Vec::new();
        for (index, enrollment) in enrollments.iter().enumerate() {
            // Enrollments whose user or course is gone are skipped
            let (Some(user), Some(course)) = (enrollment.user(), enrollment.course()) else {
                continue;
            };
            activities.push(Activity::new(
                enrollment.id.to_string(),
                &user.name,
                "enrolled in",
                Some(course.title.clone()),
                enrollment.created,
                now,
                avatar_color(index),
            ));
        }

        let signups = self.repo.list_members(Some(RECENT_SIGNUPS)).await?;
        for (index, user) in signups.iter().enumerate() {
            activities.push(Activity::new(
                user.id.to_string(),
                &user.name,
                "created account",
                None,
                user.created,
                now,
                avatar_color(index + 3),
            ));
        }

        activities.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at));
        activities.truncate(ACTIVITY_FEED_LEN);
        self.state.recent_activity = activities;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------

    pub async fn fetch_users(&mut self) -> LearningResult<()> {
        self.state.loading.users = true;
        self.state.error = None;
        let result = self.load_users().await;
        self.state.loading.users = false;
        self.record(result, "fetch_users")
    }

    async fn load_users(&mut self) -> LearningResult<()> {
        let members = self.repo.list_members(None).await?;
        let enrollments = self
            .repo
            .list_enrollments(EnrollmentExpansion::NONE, None)
            .await?;
        let counts = count_by(enrollments.iter().map(|e| &e.user_id));

        self.state.users = members
            .into_iter()
            .map(|member| {
                let enrolled = counts.get(&member.id).copied().unwrap_or(0);
                MemberRow::new(member, enrolled)
            })
            .collect();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Courses and instructors
    // ------------------------------------------------------------------

    pub async fn fetch_instructors(&mut self) -> LearningResult<()> {
        self.state.loading.instructors = true;
        self.state.error = None;
        let result = self.repo.list_instructors().await;
        self.state.loading.instructors = false;
        let instructors = self.record(result, "fetch_instructors")?;
        self.state.instructors = instructors;
        Ok(())
    }

    pub async fn fetch_courses(&mut self) -> LearningResult<()> {
        self.state.loading.courses = true;
        self.state.error = None;
        let result = self.load_courses().await;
        self.state.loading.courses = false;
        self.record(result, "fetch_courses")
    }

    async fn load_courses(&mut self) -> LearningResult<()> {
        let courses = self.repo.list_courses().await?;

        // Without instructors the names read `Unknown`; the error stays recorded
        let _ = self.fetch_instructors().await;

        let enrollments = self
            .repo
            .list_enrollments(EnrollmentExpansion::NONE, None)
            .await?;
        let counts = count_by(enrollments.iter().map(|e| &e.course_id));

        let instructors = &self.state.instructors;
        let rows = courses
            .into_iter()
            .map(|course| {
                let instructor_name = course
                    .instructor_id
                    .as_ref()
                    .and_then(|id| instructors.iter().find(|i| &i.id == id))
                    .map(|i| i.name.as_str())
                    .filter(|name| !name.is_empty())
                    .unwrap_or(UNKNOWN_INSTRUCTOR)
                    .to_string();
                let enrollments_count = counts.get(&course.id).copied().unwrap_or(0);
                CourseRow {
                    course,
                    instructor_name,
                    enrollments_count,
                }
            })
            .collect();

        self.state.courses = rows;
        Ok(())
    }

    /// Create a course and reload the list
    pub async fn create_course(&mut self, draft: &CourseDraft) -> LearningResult<Course> {
        self.state.loading.courses = true;
        self.state.error = None;
        let result = self.repo.create_course(draft).await;
        let result = self.record(result, "create_course");
        if let Ok(course) = &result {
            tracing::info!(course_id = %course.id, title = %course.title, "Course created");
            let _ = self.fetch_courses().await;
        }
        self.state.loading.courses = false;
        result
    }

    /// Update a course and reload the list
    pub async fn update_course(
        &mut self,
        course_id: &CourseId,
        draft: &CourseDraft,
    ) -> LearningResult<Course> {
        self.state.loading.courses = true;
        self.state.error = None;
        let result = self.repo.update_course(course_id, draft).await;
        let result = self.record(result, "update_course");
        if result.is_ok() {
            tracing::info!(course_id = %course_id, "Course updated");
            let _ = self.fetch_courses().await;
        }
        self.state.loading.courses = false;
        result
    }

    /// Delete a course and drop it from the local list
    pub async fn delete_course(&mut self, course_id: &CourseId) -> LearningResult<()> {
        self.state.loading.courses = true;
        self.state.error = None;
        let result = self.repo.delete_course(course_id).await;
        let result = self.record(result, "delete_course");
        if result.is_ok() {
            tracing::info!(course_id = %course_id, "Course deleted");
            self.state.courses.retain(|row| &row.course.id != course_id);
        }
        self.state.loading.courses = false;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activity_initials_and_timestamp() {
        let now = DateTime::parse_from_rfc3339("2025-06-20T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let activity = Activity::new(
            "e1".into(),
            "jane doe",
            "enrolled in",
            Some("Rust 101".into()),
            Some(now - chrono::Duration::minutes(5)),
            &now,
            avatar_color(1),
        );
        assert_eq!(activity.initials, "JD");
        assert_eq!(activity.timestamp, "5 minutes ago");
        assert_eq!(activity.avatar_color, "#93c5fd");

        let json = serde_json::to_value(&activity).unwrap();
        assert_eq!(json["userName"], "jane doe");
        assert!(json.get("occurredAt").is_none());
    }

    #[test]
    fn test_member_row_status_and_date() {
        let mut identity = Identity::new(AccountId::new(), "a@gmail.com", "A");
        identity.verified = true;
        identity.created = Some(
            DateTime::parse_from_rfc3339("2025-01-31T23:59:00Z")
                .unwrap()
                .with_timezone(&Utc),
        );
        let row = MemberRow::new(identity, 2);
        assert_eq!(row.status, MemberStatus::Active);
        assert_eq!(row.created, "2025-01-31");
        assert_eq!(row.enrolled_courses, 2);
    }
}
