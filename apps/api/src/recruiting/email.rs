//! Candidate feedback emails, one at a time or a whole shortlist in one call.
//!
//! The tone and closing line are picked locally by `EmailTone::from_score`; the
//! model only writes the prose around them. Batch output is matched back to the
//! input by candidate name, never by position.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::llm_client::prompts::{EMAIL_SIGNATURE, JSON_ONLY_INSTRUCTION};
use crate::llm_client::schema::Schema;
use crate::llm_client::LlmClient;
use crate::models::candidate::{CandidateEmail, GeneratedEmail, MatchResult};
use crate::recruiting::matching::MAX_SCORE;
use crate::recruiting::prompts::{
    BATCH_CANDIDATE_BLOCK, BATCH_EMAIL_PROMPT_TEMPLATE, EMAIL_PROMPT_TEMPLATE,
};
use crate::recruiting::render_template;
use crate::recruiting::tone::EmailTone;

const EMAIL_TEMPERATURE: f32 = 0.7;
/// Shown to the model when a candidate has no recorded gaps.
pub const NO_MISSING_SKILLS: &str = "None explicitly listed.";

/// Everything needed to draft one feedback email.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailRequest {
    pub candidate_name: String,
    /// Ignored in a batch, where the batch-level title applies.
    #[serde(default)]
    pub job_title: String,
    pub match_score: u32,
    pub remark: String,
    #[serde(default)]
    pub missing_skills: Vec<String>,
}

impl EmailRequest {
    pub fn from_match(result: &MatchResult, job_title: &str) -> Self {
        Self {
            candidate_name: result.candidate_name.clone(),
            job_title: job_title.to_string(),
            match_score: result.match_score,
            remark: result.summary_remark.clone(),
            missing_skills: result.missing_skills.clone(),
        }
    }

    pub fn validate(&self) -> Result<(), AppError> {
        require_job_title(&self.job_title)?;
        self.validate_candidate()
    }

    /// Checks the per-candidate fields only.
    fn validate_candidate(&self) -> Result<(), AppError> {
        if self.candidate_name.trim().is_empty() {
            return Err(AppError::Validation(
                "candidate_name cannot be empty".to_string(),
            ));
        }
        if self.match_score > MAX_SCORE {
            return Err(AppError::Validation(format!(
                "match_score must be between 0 and {MAX_SCORE}, got {}",
                self.match_score
            )));
        }
        Ok(())
    }

    pub fn tone(&self) -> EmailTone {
        EmailTone::from_score(self.match_score)
    }

    fn missing_skills_text(&self) -> String {
        if self.missing_skills.is_empty() {
            NO_MISSING_SKILLS.to_string()
        } else {
            self.missing_skills.join(", ")
        }
    }
}

/// One job title and the shortlist to write to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchEmailRequest {
    pub job_title: String,
    pub candidates: Vec<EmailRequest>,
}

#[derive(Debug, Deserialize)]
struct BatchEmailOutput {
    emails: Vec<CandidateEmail>,
}

pub fn email_schema() -> Schema {
    Schema::object()
        .required(
            "subject",
            Schema::string("The professional subject line of the email."),
        )
        .required(
            "body",
            Schema::string("The full body of the email, using '\\n' for line breaks."),
        )
}

pub fn batch_email_schema() -> Schema {
    let entry = Schema::object()
        .required(
            "candidate_name",
            Schema::string("The candidate's name exactly as given in the prompt."),
        )
        .required(
            "subject",
            Schema::string("The professional subject line of the email."),
        )
        .required(
            "body",
            Schema::string("The full body of the email, using '\\n' for line breaks."),
        );
    Schema::object().required(
        "emails",
        Schema::array_of(entry, "One email per candidate listed in the prompt."),
    )
}

pub fn build_prompt(request: &EmailRequest) -> String {
    let tone = request.tone();
    let score = request.match_score.to_string();
    let missing = request.missing_skills_text();
    let prompt = render_template(
        EMAIL_PROMPT_TEMPLATE,
        &[
            ("tone", tone.instruction()),
            ("candidate_name", &request.candidate_name),
            ("job_title", &request.job_title),
            ("match_score", &score),
            ("remark", &request.remark),
            ("missing_skills", &missing),
            ("closing_line", tone.closing_line()),
        ],
    );
    format!("{prompt}\n\n{JSON_ONLY_INSTRUCTION}")
}

pub fn build_batch_prompt(job_title: &str, candidates: &[EmailRequest]) -> String {
    let blocks = candidates
        .iter()
        .enumerate()
        .map(|(i, candidate)| {
            let tone = candidate.tone();
            let index = (i + 1).to_string();
            let score = candidate.match_score.to_string();
            let missing = candidate.missing_skills_text();
            render_template(
                BATCH_CANDIDATE_BLOCK,
                &[
                    ("index", &index),
                    ("candidate_name", &candidate.candidate_name),
                    ("match_score", &score),
                    ("remark", &candidate.remark),
                    ("missing_skills", &missing),
                    ("tone", tone.instruction()),
                    ("closing_line", tone.closing_line()),
                ],
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    let prompt = render_template(
        BATCH_EMAIL_PROMPT_TEMPLATE,
        &[("job_title", job_title), ("candidate_blocks", &blocks)],
    );
    format!("{prompt}\n\n{JSON_ONLY_INSTRUCTION}")
}

/// Drafts one feedback email.
pub async fn generate_feedback_email(
    request: &EmailRequest,
    llm: &LlmClient,
) -> Result<GeneratedEmail, AppError> {
    request.validate()?;
    info!(
        "Generating {:?} email for '{}' (score {})",
        request.tone(),
        request.candidate_name,
        request.match_score
    );

    let email: GeneratedEmail = llm
        .call_json(&build_prompt(request), &email_schema(), EMAIL_TEMPERATURE)
        .await
        .map_err(|e| AppError::Llm(format!("Email generation failed: {e}")))?;

    Ok(GeneratedEmail {
        subject: email.subject.trim().to_string(),
        body: finalize_body(&email.body),
    })
}

/// Drafts emails for every candidate in a single LLM call.
///
/// The result follows the order of `candidates`. Fails if the model leaves
/// any candidate out.
pub async fn generate_batch_emails(
    job_title: &str,
    candidates: &[EmailRequest],
    llm: &LlmClient,
) -> Result<Vec<CandidateEmail>, AppError> {
    require_job_title(job_title)?;
    if candidates.is_empty() {
        return Err(AppError::Validation(
            "At least one candidate is required".to_string(),
        ));
    }
    for candidate in candidates {
        candidate.validate_candidate()?;
    }
    info!(
        "Generating batch emails for {} candidates ('{job_title}')",
        candidates.len()
    );

    let output: BatchEmailOutput = llm
        .call_json(
            &build_batch_prompt(job_title, candidates),
            &batch_email_schema(),
            EMAIL_TEMPERATURE,
        )
        .await
        .map_err(|e| AppError::Llm(format!("Batch email generation failed: {e}")))?;

    let mut by_name: HashMap<String, CandidateEmail> = HashMap::new();
    for email in output.emails {
        if by_name.insert(name_key(&email.candidate_name), email).is_some() {
            warn!("Batch output repeated a candidate name; keeping the later email");
        }
    }

    candidates
        .iter()
        .map(|candidate| {
            let email = by_name
                .get(&name_key(&candidate.candidate_name))
                .ok_or_else(|| {
                    AppError::Llm(format!(
                        "Batch email generation failed: no email returned for candidate '{}'",
                        candidate.candidate_name
                    ))
                })?;
            Ok(CandidateEmail {
                candidate_name: candidate.candidate_name.clone(),
                subject: email.subject.trim().to_string(),
                body: finalize_body(&email.body),
            })
        })
        .collect()
}

fn require_job_title(job_title: &str) -> Result<(), AppError> {
    if job_title.trim().is_empty() {
        return Err(AppError::Validation("job_title cannot be empty".to_string()));
    }
    Ok(())
}

/// Lookup key for correlating batch output with its input.
pub fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Turns literal `\n` sequences into newlines and makes sure the signature closes the body.
fn finalize_body(body: &str) -> String {
    let body = body.replace("\\n", "\n");
    let body = body.trim_end();
    if body.ends_with(EMAIL_SIGNATURE) {
        body.to_string()
    } else {
        format!("{body}\n\n{EMAIL_SIGNATURE}")
    }
}
