use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use crate::handler::job_handler::{
    add_assignment_handler, auto_assign_handler, clients_needing_updates_handler, create_job_handler,
    delete_job_handler, get_job_handler, job_schedule_handler, list_assignments_handler, list_jobs_handler,
    remove_assignment_handler, reschedule_job_handler, update_job_handler, update_job_stage_handler,
    weekly_calendar_handler,
};
use crate::middlewares::auth_middleware::{require_auth, AuthState};
use crate::service::job_service::JobServiceImpl;

pub fn job_router(service: Arc<JobServiceImpl>, auth_state: Arc<AuthState>) -> Router {
    Router::new()
        .route("/jobs", get(list_jobs_handler).post(create_job_handler))
        .route("/jobs/schedule", get(job_schedule_handler))
        .route("/jobs/weekly-calendar", get(weekly_calendar_handler))
        .route("/jobs/clients-needing-updates", get(clients_needing_updates_handler))
        .route(
            "/jobs/{id}",
            get(get_job_handler).put(update_job_handler).delete(delete_job_handler),
        )
        .route("/jobs/{id}/status", put(update_job_stage_handler))
        .route("/jobs/{id}/reschedule", put(reschedule_job_handler))
        .route("/jobs/{id}/assignments", get(list_assignments_handler).post(add_assignment_handler))
        .route("/jobs/{id}/assignments/{assignment_id}", delete(remove_assignment_handler))
        .route("/jobs/{id}/auto-assign", post(auto_assign_handler))
        .route_layer(middleware::from_fn_with_state(auth_state, require_auth))
        .with_state(service)
}
