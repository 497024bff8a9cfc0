use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use crate::handler::payment_handler::{
    create_payment_handler, get_payment_handler, list_payments_handler, payment_invoicing_handler,
    update_payment_status_handler,
};
use crate::middlewares::auth_middleware::{require_auth, AuthState};
use crate::service::payment_service::PaymentServiceImpl;

pub fn payment_router(service: Arc<PaymentServiceImpl>, auth_state: Arc<AuthState>) -> Router {
    Router::new()
        .route("/payments", get(list_payments_handler).post(create_payment_handler))
        .route("/payments/{id}", get(get_payment_handler))
        .route("/payments/{id}/status", put(update_payment_status_handler))
        .route("/payments/{id}/create-in-invoicing", post(payment_invoicing_handler))
        .route_layer(middleware::from_fn_with_state(auth_state, require_auth))
        .with_state(service)
}
