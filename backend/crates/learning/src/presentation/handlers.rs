//! HTTP Handlers
//!
//! Every route sits behind the session middleware, so an [`AuthContext`]
//! extension is always present.

use auth::AuthContext;
use auth::domain::repository::AccountRepository;
use auth::presentation::dto::UserResponse;
use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use chrono::Utc;
use kernel::id::CourseId;
use std::sync::Arc;

use crate::application::admin_dashboard::CourseRow;
use crate::application::{
    AdminDashboard, AdminState, CertificateState, CertificateStore, EnrollmentState,
    EnrollmentStore, SettingsForm, SettingsStore, require_admin,
};
use crate::domain::entity::{course::CourseDraft, enrollment::Enrollment, instructor::Instructor};
use crate::domain::repository::{
    CertificateRepository, CourseRepository, EnrollmentRepository, MemberDirectory,
};
use crate::error::LearningResult;
use crate::presentation::dto::{
    CourseChangeResponse, CourseEnrollmentResponse, SettingsResponse, SettingsSavedResponse,
};

/// Bound shared by every learning repository implementation
pub trait LearningRepository:
    EnrollmentRepository
    + CertificateRepository
    + CourseRepository
    + MemberDirectory
    + Send
    + Sync
    + 'static
{
}

impl<T> LearningRepository for T where
    T: EnrollmentRepository
        + CertificateRepository
        + CourseRepository
        + MemberDirectory
        + Send
        + Sync
        + 'static
{
}

/// Shared state for learning handlers
pub struct LearningAppState<R, A>
where
    R: LearningRepository,
    A: AccountRepository + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub accounts: Arc<A>,
}

impl<R, A> Clone for LearningAppState<R, A>
where
    R: LearningRepository,
    A: AccountRepository + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            accounts: self.accounts.clone(),
        }
    }
}

impl<R, A> LearningAppState<R, A>
where
    R: LearningRepository,
    A: AccountRepository + Send + Sync + 'static,
{
    pub fn new(repo: R, accounts: A) -> Self {
        Self {
            repo: Arc::new(repo),
            accounts: Arc::new(accounts),
        }
    }

    fn admin(&self, ctx: &AuthContext) -> LearningResult<AdminDashboard<R>> {
        require_admin(ctx)?;
        Ok(AdminDashboard::new(self.repo.clone()))
    }
}

fn course_id(raw: String) -> LearningResult<CourseId> {
    Ok(CourseId::parse(raw)?)
}

// ============================================================================
// Enrollments
// ============================================================================

/// GET /api/learning/enrollments
pub async fn enrolled_courses<R, A>(
    State(state): State<LearningAppState<R, A>>,
    Extension(ctx): Extension<AuthContext>,
) -> LearningResult<Json<EnrollmentState>>
where
    R: LearningRepository,
    A: AccountRepository + Send + Sync + 'static,
{
    let mut store = EnrollmentStore::new(state.repo.clone());
    store.fetch_enrolled_courses(&ctx).await?;
    Ok(Json(store.into_state()))
}

/// GET /api/learning/courses/{course_id}/enrollments
pub async fn course_enrollments<R, A>(
    State(state): State<LearningAppState<R, A>>,
    Extension(ctx): Extension<AuthContext>,
    Path(raw_id): Path<String>,
) -> LearningResult<Json<CourseEnrollmentResponse>>
where
    R: LearningRepository,
    A: AccountRepository + Send + Sync + 'static,
{
    let course_id = course_id(raw_id)?;
    let mut store = EnrollmentStore::new(state.repo.clone());
    store.fetch_by_course(&ctx, &course_id).await?;

    Ok(Json(CourseEnrollmentResponse {
        is_enrolled: store.is_enrolled(&course_id),
        enrollments_count: store.enrollments_count(),
        completed_courses_count: store.completed_count(),
        state: store.into_state(),
    }))
}

/// POST /api/learning/courses/{course_id}/enroll
pub async fn enroll<R, A>(
    State(state): State<LearningAppState<R, A>>,
    Extension(ctx): Extension<AuthContext>,
    Path(raw_id): Path<String>,
) -> LearningResult<(StatusCode, Json<Enrollment>)>
where
    R: LearningRepository,
    A: AccountRepository + Send + Sync + 'static,
{
    let course_id = course_id(raw_id)?;
    let mut store = EnrollmentStore::new(state.repo.clone());
    let enrollment = store.enroll(&ctx, &course_id).await?;
    Ok((StatusCode::CREATED, Json(enrollment)))
}

// ============================================================================
// Certificates
// ============================================================================

/// GET /api/learning/certificates
pub async fn certificates<R, A>(
    State(state): State<LearningAppState<R, A>>,
    Extension(ctx): Extension<AuthContext>,
) -> LearningResult<Json<CertificateState>>
where
    R: LearningRepository,
    A: AccountRepository + Send + Sync + 'static,
{
    let mut store = CertificateStore::new(state.repo.clone());
    store.fetch(&ctx).await?;
    Ok(Json(store.into_state()))
}

// ============================================================================
// Settings
// ============================================================================

/// GET /api/learning/settings
pub async fn settings<R, A>(
    State(state): State<LearningAppState<R, A>>,
    Extension(ctx): Extension<AuthContext>,
) -> Json<SettingsResponse>
where
    R: LearningRepository,
    A: AccountRepository + Send + Sync + 'static,
{
    let mut store = SettingsStore::new(state.accounts.clone());
    store.init(&ctx);
    Json(SettingsResponse {
        has_changes: store.has_changes(),
        form: store.form,
    })
}

/// PUT /api/learning/settings
pub async fn save_settings<R, A>(
    State(state): State<LearningAppState<R, A>>,
    Extension(mut ctx): Extension<AuthContext>,
    Json(form): Json<SettingsForm>,
) -> LearningResult<Json<SettingsSavedResponse>>
where
    R: LearningRepository,
    A: AccountRepository + Send + Sync + 'static,
{
    let mut store = SettingsStore::new(state.accounts.clone());
    store.init(&ctx);
    store.form = form;

    let identity = store.save(&mut ctx).await?;
    Ok(Json(SettingsSavedResponse {
        user: UserResponse::from(&identity),
        form: store.form,
    }))
}

// ============================================================================
// Admin
// ============================================================================

/// GET /api/learning/admin/dashboard
pub async fn admin_dashboard<R, A>(
    State(state): State<LearningAppState<R, A>>,
    Extension(ctx): Extension<AuthContext>,
) -> LearningResult<Json<AdminState>>
where
    R: LearningRepository,
    A: AccountRepository + Send + Sync + 'static,
{
    let mut dashboard = state.admin(&ctx)?;
    dashboard.fetch_stats().await?;
    dashboard.fetch_recent_activity(Utc::now()).await?;
    Ok(Json(dashboard.into_state()))
}

/// GET /api/learning/admin/users
pub async fn admin_users<R, A>(
    State(state): State<LearningAppState<R, A>>,
    Extension(ctx): Extension<AuthContext>,
) -> LearningResult<Json<AdminState>>
where
    R: LearningRepository,
    A: AccountRepository + Send + Sync + 'static,
{
    let mut dashboard = state.admin(&ctx)?;
    dashboard.fetch_users().await?;
    Ok(Json(dashboard.into_state()))
}

/// GET /api/learning/admin/courses
pub async fn admin_courses<R, A>(
    State(state): State<LearningAppState<R, A>>,
    Extension(ctx): Extension<AuthContext>,
) -> LearningResult<Json<Vec<CourseRow>>>
where
    R: LearningRepository,
    A: AccountRepository + Send + Sync + 'static,
{
    let mut dashboard = state.admin(&ctx)?;
    dashboard.fetch_courses().await?;
    Ok(Json(dashboard.into_state().courses))
}

/// GET /api/learning/admin/instructors
pub async fn admin_instructors<R, A>(
    State(state): State<LearningAppState<R, A>>,
    Extension(ctx): Extension<AuthContext>,
) -> LearningResult<Json<Vec<Instructor>>>
where
    R: LearningRepository,
    A: AccountRepository + Send + Sync + 'static,
{
    let mut dashboard = state.admin(&ctx)?;
    dashboard.fetch_instructors().await?;
    Ok(Json(dashboard.into_state().instructors))
}

/// POST /api/learning/admin/courses
pub async fn create_course<R, A>(
    State(state): State<LearningAppState<R, A>>,
    Extension(ctx): Extension<AuthContext>,
    Json(draft): Json<CourseDraft>,
) -> LearningResult<(StatusCode, Json<CourseChangeResponse>)>
where
    R: LearningRepository,
    A: AccountRepository + Send + Sync + 'static,
{
    let mut dashboard = state.admin(&ctx)?;
    let course = dashboard.create_course(&draft).await?;
    Ok((
        StatusCode::CREATED,
        Json(CourseChangeResponse {
            course,
            courses: dashboard.into_state().courses,
        }),
    ))
}

/// PATCH /api/learning/admin/courses/{course_id}
pub async fn update_course<R, A>(
    State(state): State<LearningAppState<R, A>>,
    Extension(ctx): Extension<AuthContext>,
    Path(raw_id): Path<String>,
    Json(draft): Json<CourseDraft>,
) -> LearningResult<Json<CourseChangeResponse>>
where
    R: LearningRepository,
    A: AccountRepository + Send + Sync + 'static,
{
    let course_id = course_id(raw_id)?;
    let mut dashboard = state.admin(&ctx)?;
    let course = dashboard.update_course(&course_id, &draft).await?;
    Ok(Json(CourseChangeResponse {
        course,
        courses: dashboard.into_state().courses,
    }))
}

/// DELETE /api/learning/admin/courses/{course_id}
pub async fn delete_course<R, A>(
    State(state): State<LearningAppState<R, A>>,
    Extension(ctx): Extension<AuthContext>,
    Path(raw_id): Path<String>,
) -> LearningResult<StatusCode>
where
    R: LearningRepository,
    A: AccountRepository + Send + Sync + 'static,
{
    let course_id = course_id(raw_id)?;
    let mut dashboard = state.admin(&ctx)?;
    dashboard.delete_course(&course_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
