use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use tracing::info;
use validator::Validate;

use crate::dto::staff_dto::{AvailabilityQuery, CreateAbsenceRequest, UpdateAbsenceRequest};
use crate::service::staff_service::{StaffService, StaffServiceImpl};
use crate::util::dates::{parse_date, today};
use crate::util::error::{parse_id, HandlerError, ServiceError};

pub async fn list_staff_handler(State(service): State<Arc<StaffServiceImpl>>) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.list_staff().await?))
}

pub async fn get_staff_handler(
    State(service): State<Arc<StaffServiceImpl>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_id(&id, "staff")?;
    Ok(Json(service.get_staff(id).await?))
}

pub async fn staff_schedule_handler(
    State(service): State<Arc<StaffServiceImpl>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_id(&id, "staff")?;
    Ok(Json(service.schedule(id, today()).await?))
}

pub async fn staff_availability_handler(
    State(service): State<Arc<StaffServiceImpl>>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<impl IntoResponse, HandlerError> {
    let (Some(start), Some(end)) = (query.start_date.as_deref(), query.end_date.as_deref()) else {
        return Err(HandlerError::bad_request("start_date and end_date are required"));
    };
    let start = parse_date("start_date", start).map_err(ServiceError::from)?;
    let end = parse_date("end_date", end).map_err(ServiceError::from)?;
    Ok(Json(service.availability(start, end).await?))
}

pub async fn list_absences_handler(
    State(service): State<Arc<StaffServiceImpl>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_id(&id, "staff")?;
    Ok(Json(service.list_absences(id).await?))
}

pub async fn create_absence_handler(
    State(service): State<Arc<StaffServiceImpl>>,
    Path(id): Path<String>,
    Json(payload): Json<CreateAbsenceRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_id(&id, "staff")?;
    payload.validate()?;
    let absence = service.create_absence(id, payload).await?;
    info!("[create_absence_handler] Absence {} recorded for {}", absence.id, id);
    Ok((StatusCode::CREATED, Json(absence)))
}

pub async fn update_absence_handler(
    State(service): State<Arc<StaffServiceImpl>>,
    Path((id, absence_id)): Path<(String, String)>,
    Json(payload): Json<UpdateAbsenceRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_id(&id, "staff")?;
    let absence_id = parse_id(&absence_id, "absence")?;
    payload.validate()?;
    Ok(Json(service.update_absence(id, absence_id, payload).await?))
}

pub async fn delete_absence_handler(
    State(service): State<Arc<StaffServiceImpl>>,
    Path((id, absence_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_id(&id, "staff")?;
    let absence_id = parse_id(&absence_id, "absence")?;
    service.delete_absence(id, absence_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
