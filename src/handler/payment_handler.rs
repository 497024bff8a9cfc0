use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use tracing::info;
use validator::Validate;

use crate::dto::payment_dto::{CreatePaymentRequest, PaymentFilter, UpdatePaymentStatusRequest};
use crate::service::payment_service::{PaymentService, PaymentServiceImpl};
use crate::util::error::{parse_id, HandlerError};

pub async fn list_payments_handler(
    State(service): State<Arc<PaymentServiceImpl>>,
    Query(filter): Query<PaymentFilter>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.list_payments(filter).await?))
}

pub async fn get_payment_handler(
    State(service): State<Arc<PaymentServiceImpl>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_id(&id, "payment")?;
    Ok(Json(service.get_payment(id).await?))
}

pub async fn create_payment_handler(
    State(service): State<Arc<PaymentServiceImpl>>,
    Json(payload): Json<CreatePaymentRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    payload.validate()?;
    let payment = service.create_payment(payload).await?;
    info!("[create_payment_handler] Created payment {}", payment.id);
    Ok((StatusCode::CREATED, Json(payment)))
}

pub async fn update_payment_status_handler(
    State(service): State<Arc<PaymentServiceImpl>>,
    Path(id): Path<String>,
    Json(payload): Json<UpdatePaymentStatusRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_id(&id, "payment")?;
    payload.validate()?;
    Ok(Json(service.update_status(id, payload).await?))
}

pub async fn payment_invoicing_handler(
    State(service): State<Arc<PaymentServiceImpl>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_id(&id, "payment")?;
    let response = service.create_in_invoicing(id).await?;
    info!("[payment_invoicing_handler] Payment {} invoiced as {}", id, response.invoicing_ref);
    Ok(Json(response))
}
