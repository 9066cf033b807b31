//! Axum route handlers for the session workflow.
//!
//! Every handler that calls the LLM first takes a snapshot of the session,
//! releases the store lock, makes the call and only then writes the outcome back.
//! A failed call therefore leaves the session exactly as it was.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::documents::extract_document;
use crate::documents::handlers::{read_files, UploadedFile, FILE_FIELD};
use crate::errors::AppError;
use crate::models::candidate::{CandidateEmail, MatchResult};
use crate::recruiting::email::{generate_batch_emails, generate_feedback_email, EmailRequest};
use crate::recruiting::job_description::{generate_job_description, JobPostingRequest};
use crate::recruiting::matching::match_resume;
use crate::session::{ScoredCandidate, SessionView, FALLBACK_JOB_TITLE};
use crate::state::AppState;

/// Resumes accepted per analysis; extra files are ignored.
pub const MAX_RESUMES_PER_ANALYSIS: usize = 10;
/// Resumes with fewer extracted characters than this are skipped.
pub const MIN_RESUME_CHARS: usize = 50;
/// Job descriptions at or below this length are stored with a warning.
pub const SHORT_JD_CHARS: usize = 50;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct StoreJobDescriptionRequest {
    pub job_description: String,
}

#[derive(Debug, Serialize)]
pub struct JobDescriptionStored {
    pub job_description: String,
    pub job_title: String,
    pub characters: usize,
    pub warnings: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct SkippedFile {
    pub file_name: String,
    pub reason: String,
}

#[derive(Debug, Serialize)]
pub struct AnalysisResponse {
    pub analyzed: usize,
    pub skipped: Vec<SkippedFile>,
    pub warnings: Vec<String>,
    pub session: SessionView,
}

#[derive(Debug, Serialize)]
pub struct BatchEmailsResponse {
    pub job_title: String,
    pub emails: Vec<CandidateEmail>,
}

// ────────────────────────────────────────────────────────────────────────────
// Lifecycle
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<SessionView>) {
    let session = state.sessions.create().await;
    (StatusCode::CREATED, Json(session.view(state.sessions.ttl())))
}

/// GET /api/v1/sessions/:id
///
/// Returns the stored JD and the candidates ranked by score with any drafted email.
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    let session = state.sessions.get(id).await?;
    Ok(Json(session.view(state.sessions.ttl())))
}

/// DELETE /api/v1/sessions/:id
pub async fn handle_delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.sessions.remove(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ────────────────────────────────────────────────────────────────────────────
// Job description
// ────────────────────────────────────────────────────────────────────────────

/// PUT /api/v1/sessions/:id/job-description
pub async fn handle_store_job_description(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<StoreJobDescriptionRequest>,
) -> Result<Json<JobDescriptionStored>, AppError> {
    if request.job_description.trim().is_empty() {
        return Err(AppError::Validation(
            "job_description cannot be empty".to_string(),
        ));
    }
    store_job_description(&state, id, request.job_description.trim().to_string()).await
}

/// POST /api/v1/sessions/:id/job-description/generate
pub async fn handle_generate_job_description(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<JobPostingRequest>,
) -> Result<Json<JobDescriptionStored>, AppError> {
    request.validate()?;
    // Fail fast on an unknown session before paying for a generation.
    state.sessions.get(id).await?;

    let markdown = generate_job_description(&request, &state.llm).await?;
    store_job_description(&state, id, markdown).await
}

/// POST /api/v1/sessions/:id/job-description/upload
///
/// Multipart `file` part holding a PDF or DOCX job description.
pub async fn handle_upload_job_description(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<JobDescriptionStored>, AppError> {
    state.sessions.get(id).await?;

    let file = read_files(&mut multipart, FILE_FIELD)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| AppError::Validation(format!("Missing multipart field '{FILE_FIELD}'")))?;

    let document = extract_document(file.file_name, file.content_type, file.data).await?;
    store_job_description(&state, id, document.text).await
}

async fn store_job_description(
    state: &AppState,
    id: Uuid,
    text: String,
) -> Result<Json<JobDescriptionStored>, AppError> {
    let characters = text.chars().count();
    let mut warnings = Vec::new();
    if characters <= SHORT_JD_CHARS {
        warn!("Session {id}: stored job description is only {characters} characters");
        warnings.push(format!(
            "The job description is very short ({characters} characters); matching quality may suffer."
        ));
    }

    let job_title = state
        .sessions
        .update(id, |session| {
            session.job_description = Some(text.clone());
            session.job_title().unwrap_or_default()
        })
        .await?;
    info!("Session {id}: stored job description for '{job_title}'");

    Ok(Json(JobDescriptionStored {
        job_description: text,
        job_title,
        characters,
        warnings,
    }))
}

// ────────────────────────────────────────────────────────────────────────────
// Resume analysis
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/sessions/:id/resumes
///
/// Multipart upload of up to ten `file` parts. Each resume is extracted and
/// scored in turn; a file that cannot be used is reported under `skipped` and
/// never reaches the result list. The new results replace the previous ones.
pub async fn handle_analyze_resumes(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<AnalysisResponse>, AppError> {
    let jd_text = state.sessions.get(id).await?.job_description.ok_or_else(|| {
        AppError::Validation(
            "Store a job description in this session before analyzing resumes".to_string(),
        )
    })?;

    let mut files = read_files(&mut multipart, FILE_FIELD).await?;
    if files.is_empty() {
        return Err(AppError::Validation(format!(
            "Upload at least one resume as multipart field '{FILE_FIELD}'"
        )));
    }

    let mut warnings = Vec::new();
    if files.len() > MAX_RESUMES_PER_ANALYSIS {
        warn!(
            "Session {id}: {} resumes uploaded, only the first {MAX_RESUMES_PER_ANALYSIS} are processed",
            files.len()
        );
        warnings.push(format!(
            "{} files were uploaded. Only the first {MAX_RESUMES_PER_ANALYSIS} were processed.",
            files.len()
        ));
        files.truncate(MAX_RESUMES_PER_ANALYSIS);
    }

    let mut results = Vec::new();
    let mut skipped = Vec::new();
    for file in files {
        let file_name = file.display_name().to_string();
        match score_resume(&state, &jd_text, file).await {
            Ok(result) => results.push(ScoredCandidate {
                source_file: file_name,
                result,
            }),
            Err(reason) => {
                warn!("Session {id}: skipping '{file_name}': {reason}");
                skipped.push(SkippedFile { file_name, reason });
            }
        }
    }

    let analyzed = results.len();
    info!("Session {id}: analyzed {analyzed} resumes, skipped {}", skipped.len());

    let ttl = state.sessions.ttl();
    let session = state
        .sessions
        .update(id, |session| {
            session.results = results;
            session.view(ttl)
        })
        .await?;

    Ok(Json(AnalysisResponse {
        analyzed,
        skipped,
        warnings,
        session,
    }))
}

/// Extracts and scores one resume. The error is the user-facing skip reason.
async fn score_resume(
    state: &AppState,
    jd_text: &str,
    file: UploadedFile,
) -> Result<MatchResult, String> {
    let document = extract_document(file.file_name, file.content_type, file.data)
        .await
        .map_err(|e| e.to_string())?;

    if document.characters < MIN_RESUME_CHARS {
        return Err("Could not extract sufficient text.".to_string());
    }

    match_resume(jd_text, &document.text, &state.llm, state.keywords.as_ref())
        .await
        .map_err(|e| e.to_string())
}

// ────────────────────────────────────────────────────────────────────────────
// Emails
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/sessions/:id/emails
///
/// Drafts emails for every scored candidate in one LLM call and replaces the
/// session's email map with the output.
pub async fn handle_batch_emails(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BatchEmailsResponse>, AppError> {
    let session = state.sessions.get(id).await?;
    if session.results.is_empty() {
        return Err(AppError::Validation(
            "No candidate results to process".to_string(),
        ));
    }
    let job_title = session
        .job_title()
        .unwrap_or_else(|| FALLBACK_JOB_TITLE.to_string());

    let requests: Vec<EmailRequest> = session
        .results
        .iter()
        .map(|c| EmailRequest::from_match(&c.result, &job_title))
        .collect();
    let emails = generate_batch_emails(&job_title, &requests, &state.llm).await?;

    state
        .sessions
        .update(id, |session| {
            session.emails.clear();
            for email in &emails {
                session.store_email(&email.candidate_name, email.clone().into_email());
            }
        })
        .await?;

    Ok(Json(BatchEmailsResponse { job_title, emails }))
}

/// POST /api/v1/sessions/:id/emails/:candidate_name
///
/// Regenerates one candidate's email, overwriting any stored draft.
pub async fn handle_regenerate_email(
    State(state): State<AppState>,
    Path((id, candidate_name)): Path<(Uuid, String)>,
) -> Result<Json<CandidateEmail>, AppError> {
    let session = state.sessions.get(id).await?;
    let candidate = session.find_candidate(&candidate_name).ok_or_else(|| {
        AppError::NotFound(format!("Candidate '{candidate_name}' not found in session"))
    })?;
    let job_title = session
        .job_title()
        .unwrap_or_else(|| FALLBACK_JOB_TITLE.to_string());

    let request = EmailRequest::from_match(&candidate.result, &job_title);
    let email = generate_feedback_email(&request, &state.llm).await?;

    let name = candidate.result.candidate_name.clone();
    state
        .sessions
        .update(id, |session| session.store_email(&name, email.clone()))
        .await?;
    info!("Session {id}: regenerated email for '{name}'");

    Ok(Json(CandidateEmail {
        candidate_name: name,
        subject: email.subject,
        body: email.body,
    }))
}
