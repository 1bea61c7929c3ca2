//! Learning Router

use auth::domain::repository::{AccountRepository, AuthBackend};
use auth::middleware::{AuthMiddlewareState, require_auth_context};
use auth::PbAuthRepository;
use axum::{
    Router, middleware,
    routing::{get, patch, post},
};

use crate::infra::pocketbase::PbLearningRepository;
use crate::presentation::handlers::{self, LearningAppState, LearningRepository};

/// Create the learning router backed by the hosted backend
pub fn learning_router(
    repo: PbLearningRepository,
    accounts: PbAuthRepository,
    session: AuthMiddlewareState<PbAuthRepository>,
) -> Router {
    learning_router_generic(LearningAppState::new(repo, accounts), session)
}

/// Create a generic learning router; every route requires a restored session
pub fn learning_router_generic<R, A, B>(
    state: LearningAppState<R, A>,
    session: AuthMiddlewareState<B>,
) -> Router
where
    R: LearningRepository,
    A: AccountRepository + Send + Sync + 'static,
    B: AuthBackend + Send + Sync + 'static,
{
    Router::new()
        .route("/enrollments", get(handlers::enrolled_courses::<R, A>))
        .route(
            "/courses/{course_id}/enrollments",
            get(handlers::course_enrollments::<R, A>),
        )
        .route("/courses/{course_id}/enroll", post(handlers::enroll::<R, A>))
        .route("/certificates", get(handlers::certificates::<R, A>))
        .route(
            "/settings",
            get(handlers::settings::<R, A>).put(handlers::save_settings::<R, A>),
        )
        .route("/admin/dashboard", get(handlers::admin_dashboard::<R, A>))
        .route("/admin/users", get(handlers::admin_users::<R, A>))
        .route("/admin/instructors", get(handlers::admin_instructors::<R, A>))
        .route(
            "/admin/courses",
            get(handlers::admin_courses::<R, A>).post(handlers::create_course::<R, A>),
        )
        .route(
            "/admin/courses/{course_id}",
            patch(handlers::update_course::<R, A>).delete(handlers::delete_course::<R, A>),
        )
        .layer(middleware::from_fn_with_state(
            session,
            require_auth_context::<B>,
        ))
        .with_state(state)
}
