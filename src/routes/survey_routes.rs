// src/routes/survey_routes.rs
use crate::models::{
    ApprovalResponse, ApproveRequest, CreateSurveyRequest, ListQuery, ServiceError, SurveyPatch,
    SurveyStatus, UpdateSurveyRequest,
};
use crate::routes::AppState;
use actix_web::{delete, get, patch, post, web, HttpResponse};
use chrono::Utc;
use log::{error, info};
use serde_json::json;

// List surveys, optionally filtered by status
#[get("/surveys")]
async fn list_surveys(
    state: web::Data<AppState>,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse, ServiceError> {
    let params = query.validate()?;

    info!(
        "📋 Listing surveys: status={:?}, page={}, limit={}",
        params.status, params.page, params.limit
    );

    let page = state.surveys.list(&params.status, params.page, params.limit)?;

    info!("✅ Returning {} of {} surveys", page.data.len(), page.pagination.total);

    Ok(HttpResponse::Ok().json(page))
}

// Create a new draft survey
#[post("/surveys")]
async fn create_survey(
    state: web::Data<AppState>,
    data: web::Json<CreateSurveyRequest>,
) -> Result<HttpResponse, ServiceError> {
    info!("📝 Creating survey: {}", data.title);

    let survey = state.surveys.create(data.into_inner())?;

    info!("✅ Survey created: {}", survey.id);

    Ok(HttpResponse::Created().json(survey))
}

// Get a specific survey by ID
#[get("/surveys/{survey_id}")]
async fn get_survey(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let survey_id = path.into_inner();

    match state.surveys.get(&survey_id)? {
        Some(survey) => Ok(HttpResponse::Ok().json(survey)),
        None => {
            error!("❌ Survey not found: {}", survey_id);
            Err(ServiceError::NotFound)
        }
    }
}

// Merge the provided fields onto a survey
#[patch("/surveys/{survey_id}")]
async fn update_survey(
    state: web::Data<AppState>,
    path: web::Path<String>,
    data: web::Json<UpdateSurveyRequest>,
) -> Result<HttpResponse, ServiceError> {
    let survey_id = path.into_inner();
    let patch = data.into_inner().into_patch()?;

    info!("🔄 Updating survey: {}", survey_id);

    match state.surveys.update(&survey_id, &patch)? {
        Some(survey) => Ok(HttpResponse::Ok().json(survey)),
        None => {
            error!("❌ Survey not found: {}", survey_id);
            Err(ServiceError::NotFound)
        }
    }
}

// Remove a survey permanently
#[delete("/surveys/{survey_id}")]
async fn delete_survey(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let survey_id = path.into_inner();

    info!("🗑️ Deleting survey: {}", survey_id);

    if !state.surveys.delete(&survey_id)? {
        error!("❌ Survey not found: {}", survey_id);
        return Err(ServiceError::NotFound);
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Survey deleted"
    })))
}

// Approve a survey regardless of its current status.
// Anyone may approve and nobody is notified.
#[post("/surveys/{survey_id}/approve")]
async fn approve_survey(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Bytes,
) -> Result<HttpResponse, ServiceError> {
    let survey_id = path.into_inner();
    let request = parse_approve_body(&body)?;
    let approver = request.approver_or_default();

    info!("✔️ Approving survey: {} by {}", survey_id, approver);

    let patch = SurveyPatch::approval(approver, Utc::now());
    let survey = match state.surveys.update(&survey_id, &patch)? {
        Some(survey) => survey,
        None => {
            error!("❌ Survey not found: {}", survey_id);
            return Err(ServiceError::NotFound);
        }
    };

    let (approved_at, approver) = match (survey.approved_at, survey.approver) {
        (Some(approved_at), Some(approver)) => (approved_at, approver),
        _ => {
            error!("❌ Survey {} lost its approval stamp", survey_id);
            return Err(ServiceError::InternalServerError);
        }
    };

    info!("✅ Survey approved: {}", survey_id);

    Ok(HttpResponse::Ok().json(ApprovalResponse {
        id: survey.id,
        status: SurveyStatus::Approved,
        approved_at,
        approver,
        notes: request.notes_or_default(),
    }))
}

// The approve body is optional; an empty body means "use the defaults"
fn parse_approve_body(body: &[u8]) -> Result<ApproveRequest, ServiceError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(ApproveRequest::default());
    }
    serde_json::from_slice(body).map_err(|e| ServiceError::BadRequest(format!("Invalid approve body: {}", e)))
}

// Register all survey routes
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_surveys)
        .service(create_survey)
        .service(get_survey)
        .service(update_survey)
        .service(delete_survey)
        .service(approve_survey);
}
