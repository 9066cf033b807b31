//! Job-description generation. Turns a job posting form into Markdown via the LLM.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::llm_client::prompts::JSON_ONLY_INSTRUCTION;
use crate::llm_client::schema::Schema;
use crate::llm_client::LlmClient;
use crate::recruiting::prompts::{JD_MARKDOWN_EXAMPLE, JD_PROMPT_TEMPLATE};
use crate::recruiting::{render_template, ERROR_MARKER};

const JD_TEMPERATURE: f32 = 0.4;

/// Inputs for one generated job description. All fields are required.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobPostingRequest {
    pub job_title: String,
    pub years_of_experience: u32,
    pub must_have_skills: String,
    pub company_name: String,
    pub employment_type: String,
    pub industry: String,
    pub location: String,
}

impl JobPostingRequest {
    /// Presence check only; the content itself is left to the model.
    pub fn validate(&self) -> Result<(), AppError> {
        let fields = [
            ("job_title", &self.job_title),
            ("must_have_skills", &self.must_have_skills),
            ("company_name", &self.company_name),
            ("employment_type", &self.employment_type),
            ("industry", &self.industry),
            ("location", &self.location),
        ];
        let missing: Vec<&str> = fields
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| *name)
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(format!(
                "Required fields cannot be empty: {}",
                missing.join(", ")
            )))
        }
    }
}

#[derive(Debug, Deserialize)]
struct JobDescriptionOutput {
    job_description: String,
}

pub fn job_description_schema() -> Schema {
    Schema::object().required(
        "job_description",
        Schema::string("The full, comprehensive job description formatted in Markdown."),
    )
}

pub fn build_prompt(request: &JobPostingRequest) -> String {
    let prompt = render_template(
        JD_PROMPT_TEMPLATE,
        &[
            ("escaped_markdown", &escape_for_json_example(JD_MARKDOWN_EXAMPLE)),
            ("company_name", &request.company_name),
            ("job_title", &request.job_title),
            ("employment_type", &request.employment_type),
            ("location", &request.location),
            ("industry", &request.industry),
            ("years_of_experience", &request.years_of_experience.to_string()),
            ("must_have_skills", &request.must_have_skills),
        ],
    );
    format!("{prompt}\n\n{JSON_ONLY_INSTRUCTION}")
}

/// Generates a Markdown job description.
///
/// Failures carry a detail string that starts with `ERROR_MARKER`.
pub async fn generate_job_description(
    request: &JobPostingRequest,
    llm: &LlmClient,
) -> Result<String, AppError> {
    info!(
        "Generating job description for '{}' at '{}'",
        request.job_title, request.company_name
    );

    let output: JobDescriptionOutput = llm
        .call_json(&build_prompt(request), &job_description_schema(), JD_TEMPERATURE)
        .await
        .map_err(|e| AppError::Llm(format!("{ERROR_MARKER} job description generation failed: {e}")))?;

    let markdown = output.job_description.trim();
    if markdown.is_empty() {
        return Err(AppError::Llm(format!(
            "{ERROR_MARKER} the model returned an empty job description"
        )));
    }

    Ok(markdown.to_string())
}

/// Escapes text as a JSON string body, without the surrounding quotes.
fn escape_for_json_example(text: &str) -> String {
    let quoted = serde_json::Value::String(text.to_string()).to_string();
    quoted[1..quoted.len() - 1].to_string()
}
