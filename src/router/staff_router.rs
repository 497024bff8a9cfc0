use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, put},
    Router,
};

use crate::handler::staff_handler::{
    create_absence_handler, delete_absence_handler, get_staff_handler, list_absences_handler, list_staff_handler,
    staff_availability_handler, staff_schedule_handler, update_absence_handler,
};
use crate::middlewares::auth_middleware::{require_auth, AuthState};
use crate::service::staff_service::StaffServiceImpl;

pub fn staff_router(service: Arc<StaffServiceImpl>, auth_state: Arc<AuthState>) -> Router {
    Router::new()
        .route("/staff", get(list_staff_handler))
        .route("/staff/availability", get(staff_availability_handler))
        .route("/staff/{id}", get(get_staff_handler))
        .route("/staff/{id}/schedule", get(staff_schedule_handler))
        .route("/staff/{id}/absences", get(list_absences_handler).post(create_absence_handler))
        .route(
            "/staff/{id}/absences/{absence_id}",
            put(update_absence_handler).delete(delete_absence_handler),
        )
        .route_layer(middleware::from_fn_with_state(auth_state, require_auth))
        .with_state(service)
}
