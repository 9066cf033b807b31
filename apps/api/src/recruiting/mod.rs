// Recruiting workflows: job-description generation, resume matching, feedback emails.
// All LLM calls go through llm_client; this module only builds prompts and shapes replies.

pub mod email;
pub mod handlers;
pub mod job_description;
pub mod keywords;
pub mod matching;
pub mod prompts;
pub mod tone;

/// Leading marker of every job-description failure detail.
pub const ERROR_MARKER: &str = "Error:";

/// Substitutes `{name}` placeholders in one left-to-right pass.
///
/// Substituted values are never rescanned, so document text that happens to
/// contain `{resume_text}` or similar is left alone. Braces that do not form a
/// known placeholder are copied through unchanged.
pub fn render_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(pos) = rest.find('{') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos + 1..];
        let hit = values.iter().find(|(key, _)| {
            tail.starts_with(*key) && tail[key.len()..].starts_with('}')
        });
        match hit {
            Some((key, value)) => {
                out.push_str(value);
                rest = &tail[key.len() + 1..];
            }
            None => {
                out.push('{');
                rest = tail;
            }
        }
    }

    out.push_str(rest);
    out
}
