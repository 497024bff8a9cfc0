use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use tracing::info;
use validator::Validate;

use crate::dto::job_dto::{
    CreateAssignmentRequest, CreateJobRequest, RescheduleJobRequest, UpdateJobRequest, UpdateJobStageRequest,
};
use crate::service::job_service::{JobService, JobServiceImpl};
use crate::util::dates::today;
use crate::util::error::{parse_id, HandlerError};

pub async fn list_jobs_handler(State(service): State<Arc<JobServiceImpl>>) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.list_jobs().await?))
}

pub async fn get_job_handler(
    State(service): State<Arc<JobServiceImpl>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_id(&id, "job")?;
    Ok(Json(service.get_job(id).await?))
}

pub async fn create_job_handler(
    State(service): State<Arc<JobServiceImpl>>,
    Json(payload): Json<CreateJobRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    payload.validate()?;
    let job = service.create_job(payload).await?;
    info!("[create_job_handler] Created job {}", job.id);
    Ok((StatusCode::CREATED, Json(job)))
}

pub async fn update_job_handler(
    State(service): State<Arc<JobServiceImpl>>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateJobRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_id(&id, "job")?;
    payload.validate()?;
    Ok(Json(service.update_job(id, payload).await?))
}

pub async fn delete_job_handler(
    State(service): State<Arc<JobServiceImpl>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_id(&id, "job")?;
    service.delete_job(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn update_job_stage_handler(
    State(service): State<Arc<JobServiceImpl>>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateJobStageRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_id(&id, "job")?;
    payload.validate()?;
    let job = service.update_stage(id, payload.stage).await?;
    info!("[update_job_stage_handler] Job {} is now {}", id, payload.stage.as_str());
    Ok(Json(job))
}

pub async fn reschedule_job_handler(
    State(service): State<Arc<JobServiceImpl>>,
    Path(id): Path<String>,
    Json(payload): Json<RescheduleJobRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_id(&id, "job")?;
    payload.validate()?;
    Ok(Json(service.reschedule(id, payload).await?))
}

pub async fn job_schedule_handler(
    State(service): State<Arc<JobServiceImpl>>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.schedule().await?))
}

pub async fn weekly_calendar_handler(
    State(service): State<Arc<JobServiceImpl>>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.weekly_calendar(today()).await?))
}

pub async fn clients_needing_updates_handler(
    State(service): State<Arc<JobServiceImpl>>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.clients_needing_updates().await?))
}

pub async fn list_assignments_handler(
    State(service): State<Arc<JobServiceImpl>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_id(&id, "job")?;
    Ok(Json(service.list_assignments(id).await?))
}

pub async fn add_assignment_handler(
    State(service): State<Arc<JobServiceImpl>>,
    Path(id): Path<String>,
    Json(payload): Json<CreateAssignmentRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_id(&id, "job")?;
    payload.validate()?;
    let assignment = service.add_assignment(id, payload).await?;
    Ok((StatusCode::CREATED, Json(assignment)))
}

pub async fn remove_assignment_handler(
    State(service): State<Arc<JobServiceImpl>>,
    Path((id, assignment_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_id(&id, "job")?;
    let assignment_id = parse_id(&assignment_id, "assignment")?;
    service.remove_assignment(id, assignment_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn auto_assign_handler(
    State(service): State<Arc<JobServiceImpl>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_id(&id, "job")?;
    let roster = service.auto_assign(id).await?;
    info!("[auto_assign_handler] Job {} staffed with {} assignments", id, roster.len());
    Ok(Json(roster))
}
