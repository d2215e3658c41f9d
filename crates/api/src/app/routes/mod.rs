use axum::{Router, routing::get};

pub mod assessments;
pub mod audit;
pub mod courses;
pub mod notices;
pub mod onboarding;
pub mod progress;
pub mod rbac;
pub mod structure;
pub mod system;
pub mod users;

/// Router for all authenticated (tenant-scoped) endpoints, mounted at `/api`.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .nest("/rbac", rbac::router())
        .nest("/onboarding", onboarding::router())
        .merge(structure::router())
        .nest("/courses", courses::router())
        .nest("/assessments", assessments::router())
        .route("/submissions", get(assessments::my_submissions))
        .nest("/progress", progress::router())
        .nest("/users", users::router())
        .route("/me/children", get(users::linked_students))
        .nest("/notices", notices::router())
        .nest("/audit-logs", audit::router())
}
