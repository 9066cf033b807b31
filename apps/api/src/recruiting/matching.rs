//! Resume/JD matching: asks the LLM for a 0-100 score, a remark and the missing skills.
//!
//! The model output is normalised before it leaves this module:
//! the score is clamped, blank identity fields become the "unknown" sentinels,
//! and an empty missing-skills list becomes an explicit full-coverage statement.

use serde::Deserialize;
use tracing::info;

use crate::errors::AppError;
use crate::llm_client::prompts::{JSON_ONLY_INSTRUCTION, UNKNOWN_CANDIDATE, UNKNOWN_EMAIL};
use crate::llm_client::schema::Schema;
use crate::llm_client::LlmClient;
use crate::models::candidate::MatchResult;
use crate::recruiting::keywords::{keyword_context, KeywordExtractor};
use crate::recruiting::prompts::MATCH_PROMPT_TEMPLATE;
use crate::recruiting::render_template;

const MATCH_TEMPERATURE: f32 = 0.2;
pub const MAX_SCORE: u32 = 100;
/// Stated in place of a skills list when the resume covers every requirement.
pub const FULL_COVERAGE_MESSAGE: &str = "All required skills are matched.";

/// Model output as received. Identity fields are optional so that a model that
/// drops them still yields a result with sentinels.
#[derive(Debug, Deserialize)]
struct RawMatchOutput {
    #[serde(default)]
    candidate_name: Option<String>,
    #[serde(default)]
    candidate_email: Option<String>,
    match_score: f64,
    summary_remark: String,
    #[serde(default)]
    missing_skills: Vec<String>,
}

impl RawMatchOutput {
    fn normalize(self) -> MatchResult {
        MatchResult {
            candidate_name: non_blank_or(self.candidate_name, UNKNOWN_CANDIDATE),
            candidate_email: non_blank_or(self.candidate_email, UNKNOWN_EMAIL),
            match_score: clamp_score(self.match_score),
            summary_remark: self.summary_remark.trim().to_string(),
            missing_skills: normalize_skills(self.missing_skills),
        }
    }
}

pub fn match_schema() -> Schema {
    Schema::object()
        .required(
            "candidate_name",
            Schema::string("The full name of the candidate extracted from the resume."),
        )
        .required(
            "candidate_email",
            Schema::string("The primary email address of the candidate extracted from the resume."),
        )
        .required(
            "match_score",
            Schema::integer(
                "The candidate's score as a percentage (0-100) based on semantic matching of the JD requirements to the resume content.",
            ),
        )
        .required(
            "summary_remark",
            Schema::string(
                "A brief remark (1-2 sentences) justifying the score, highlighting a major strength and weakness.",
            ),
        )
        .required(
            "missing_skills",
            Schema::array_of(
                Schema::string("A missing or weak must-have skill."),
                "A list of 3-5 critical must-have skills or experiences from the JD that were missing or weak in the resume.",
            ),
        )
}

pub fn build_prompt(
    jd_text: &str,
    resume_text: &str,
    keywords: Option<&KeywordExtractor>,
) -> String {
    let jd_keywords = keyword_context(keywords, jd_text);
    let resume_keywords = keyword_context(keywords, resume_text);

    let prompt = render_template(
        MATCH_PROMPT_TEMPLATE,
        &[
            ("unknown_name", UNKNOWN_CANDIDATE),
            ("unknown_email", UNKNOWN_EMAIL),
            ("jd_keywords", &jd_keywords),
            ("resume_keywords", &resume_keywords),
            ("jd_text", jd_text),
            ("resume_text", resume_text),
        ],
    );
    format!("{prompt}\n\n{JSON_ONLY_INSTRUCTION}")
}

/// Scores one resume against one job description.
pub async fn match_resume(
    jd_text: &str,
    resume_text: &str,
    llm: &LlmClient,
    keywords: Option<&KeywordExtractor>,
) -> Result<MatchResult, AppError> {
    info!(
        "Matching resume ({} chars) against JD ({} chars)",
        resume_text.len(),
        jd_text.len()
    );

    let raw: RawMatchOutput = llm
        .call_json(
            &build_prompt(jd_text, resume_text, keywords),
            &match_schema(),
            MATCH_TEMPERATURE,
        )
        .await
        .map_err(|e| AppError::Llm(format!("Resume matching failed: {e}")))?;

    let result = raw.normalize();
    info!(
        "Matched candidate '{}' with score {}",
        result.candidate_name, result.match_score
    );
    Ok(result)
}

fn non_blank_or(value: Option<String>, sentinel: &str) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| sentinel.to_string())
}

fn clamp_score(score: f64) -> u32 {
    if score.is_nan() {
        return 0;
    }
    score.round().clamp(0.0, MAX_SCORE as f64) as u32
}

fn normalize_skills(skills: Vec<String>) -> Vec<String> {
    let skills: Vec<String> = skills
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    if skills.is_empty() {
        vec![FULL_COVERAGE_MESSAGE.to_string()]
    } else {
        skills
    }
}
