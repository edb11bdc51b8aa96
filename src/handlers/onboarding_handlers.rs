// src/handlers/onboarding_handlers.rs
use actix_web::{get, post, put, web, HttpResponse, Responder};
use log::{error, info};

use crate::dtos::onboarding::{OnboardingStatusOut, StepsOut, UpdateStepIn};
use crate::dtos::ApiResponse;
use crate::middleware::auth_extractor::AuthenticatedUser;
use crate::models::onboarding::{OnboardingStep, STEP_DEFINITIONS};
use crate::models::user::UserProfileRecord;
use crate::repositories::profile_supabase_repo::RepoError;
use crate::services::onboarding_services::{skip_from, step_update_for, OnboardingError};
use crate::AppState;

fn status_response(message: &str, record: &UserProfileRecord) -> HttpResponse {
    let status = OnboardingStatusOut::from_snapshot(&record.snapshot(), record.updated_at);
    HttpResponse::Ok().json(ApiResponse::success(message, status))
}

fn repo_error_response(e: RepoError) -> HttpResponse {
    match e {
        RepoError::NotFound => HttpResponse::NotFound().json(ApiResponse::error(
            "Profile not found. Please complete your profile first.",
        )),
        RepoError::Conflict => HttpResponse::Conflict().json(ApiResponse::error(
            "Onboarding state changed, please reload and try again.",
        )),
        other => {
            error!("profile repository failed: {}", other);
            HttpResponse::InternalServerError().json(ApiResponse::error("Failed to load onboarding state"))
        }
    }
}

fn onboarding_error_response(e: OnboardingError) -> HttpResponse {
    let body = ApiResponse::error(e.to_string());
    match e {
        OnboardingError::InvalidStep(_) => HttpResponse::BadRequest().json(body),
        OnboardingError::StepNotSkippable(_) | OnboardingError::AlreadyCompleted => {
            HttpResponse::Conflict().json(body)
        }
    }
}

/// GET /api/onboarding/steps
/// Public: the static step table
#[get("/api/onboarding/steps")]
pub async fn get_steps() -> impl Responder {
    let steps = STEP_DEFINITIONS.to_vec();
    HttpResponse::Ok().json(ApiResponse::success(
        "Steps retrieved successfully",
        StepsOut { total: steps.len(), steps },
    ))
}

/// GET /api/onboarding/status
/// Where the current user should go next and how far along they are
#[get("/api/onboarding/status")]
pub async fn get_onboarding_status(
    auth_user: AuthenticatedUser,
    state: web::Data<AppState>,
) -> impl Responder {
    match state.repo.fetch_user_profile(auth_user.user_id).await {
        Ok(record) => status_response("Onboarding status retrieved", &record),
        Err(e) => repo_error_response(e),
    }
}

/// PUT /api/onboarding/step
/// Move the stored pointer to an optional step (2-4) or finish (5)
#[put("/api/onboarding/step")]
pub async fn update_onboarding_step(
    auth_user: AuthenticatedUser,
    state: web::Data<AppState>,
    body: web::Json<UpdateStepIn>,
) -> impl Responder {
    let record = match state.repo.fetch_user_profile(auth_user.user_id).await {
        Ok(record) => record,
        Err(e) => return repo_error_response(e),
    };

    let snapshot = record.snapshot();
    let (step, is_onboarded) = match step_update_for(&snapshot, body.step) {
        Ok(update) => update,
        Err(e) => return onboarding_error_response(e),
    };

    match state
        .repo
        .update_onboarding_step(auth_user.user_id, snapshot.onboarding_step, step, is_onboarded)
        .await
    {
        Ok(record) => {
            info!("user {} moved to onboarding step {:?}", auth_user.user_id, step);
            status_response("Onboarding step updated", &record)
        }
        Err(e) => repo_error_response(e),
    }
}

/// POST /api/onboarding/skip
/// Skip the optional step the user is currently on
#[post("/api/onboarding/skip")]
pub async fn skip_onboarding_step(
    auth_user: AuthenticatedUser,
    state: web::Data<AppState>,
) -> impl Responder {
    let record = match state.repo.fetch_user_profile(auth_user.user_id).await {
        Ok(record) => record,
        Err(e) => return repo_error_response(e),
    };

    let snapshot = record.snapshot();
    let next = match skip_from(&snapshot) {
        Ok(next) => next,
        Err(e) => return onboarding_error_response(e),
    };

    let finished = next == OnboardingStep::Completed;
    match state
        .repo
        .update_onboarding_step(auth_user.user_id, snapshot.onboarding_step, next, finished)
        .await
    {
        Ok(updated) => {
            info!("user {} skipped to onboarding step {:?}", auth_user.user_id, next);
            status_response("Onboarding step skipped", &updated)
        }
        Err(e) => repo_error_response(e),
    }
}

#[get("/health")]
pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(ApiResponse::success("ok", ()))
}
