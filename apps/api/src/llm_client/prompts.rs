// Shared prompt fragments used by more than one AI-logic function.
// Each service keeps its own templates in its own prompts.rs.

/// Appended to every structured prompt.
pub const JSON_ONLY_INSTRUCTION: &str = "Output the result strictly in the required JSON format. \
    Do NOT include any text outside the JSON object.";

/// Fixed signature every feedback email body must end with.
pub const EMAIL_SIGNATURE: &str = "Sincerely,\n\nThe Hiring Team";

/// Sentinel used when the resume carries no recognisable name.
pub const UNKNOWN_CANDIDATE: &str = "Unknown Candidate";

/// Sentinel used when the resume carries no recognisable email address.
pub const UNKNOWN_EMAIL: &str = "no-email-found@example.com";
