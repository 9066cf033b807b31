//! Axum route handlers for the stateless recruiting API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::candidate::{CandidateEmail, GeneratedEmail, MatchResult};
use crate::recruiting::email::{
    generate_batch_emails, generate_feedback_email, BatchEmailRequest, EmailRequest,
};
use crate::recruiting::job_description::{generate_job_description, JobPostingRequest};
use crate::recruiting::matching::match_resume;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct JobDescriptionResponse {
    pub job_description: String,
}

#[derive(Debug, Deserialize)]
pub struct MatchRequest {
    pub jd_text: String,
    pub resume_text: String,
}

/// POST /api/v1/job-descriptions (alias: POST /generate-jd)
pub async fn handle_generate_job_description(
    State(state): State<AppState>,
    Json(request): Json<JobPostingRequest>,
) -> Result<Json<JobDescriptionResponse>, AppError> {
    request.validate()?;
    let job_description = generate_job_description(&request, &state.llm).await?;
    Ok(Json(JobDescriptionResponse { job_description }))
}

/// POST /api/v1/matches (alias: POST /match-resume)
pub async fn handle_match_resume(
    State(state): State<AppState>,
    Json(request): Json<MatchRequest>,
) -> Result<Json<MatchResult>, AppError> {
    if request.jd_text.trim().is_empty() {
        return Err(AppError::Validation("jd_text cannot be empty".to_string()));
    }
    if request.resume_text.trim().is_empty() {
        return Err(AppError::Validation(
            "resume_text cannot be empty".to_string(),
        ));
    }

    let result = match_resume(
        &request.jd_text,
        &request.resume_text,
        &state.llm,
        state.keywords.as_ref(),
    )
    .await?;
    Ok(Json(result))
}

/// POST /api/v1/emails (alias: POST /generate-email)
pub async fn handle_generate_email(
    State(state): State<AppState>,
    Json(request): Json<EmailRequest>,
) -> Result<Json<GeneratedEmail>, AppError> {
    let email = generate_feedback_email(&request, &state.llm).await?;
    Ok(Json(email))
}

/// POST /api/v1/emails/batch (alias: POST /generate-batch-emails)
///
/// One LLM call for the whole list; the response keeps the request order.
pub async fn handle_generate_batch_emails(
    State(state): State<AppState>,
    Json(request): Json<BatchEmailRequest>,
) -> Result<Json<Vec<CandidateEmail>>, AppError> {
    let emails = generate_batch_emails(&request.job_title, &request.candidates, &state.llm).await?;
    Ok(Json(emails))
}
