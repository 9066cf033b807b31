use serde::{Deserialize, Serialize};

/// Outcome of scoring one resume against one job description.
///
/// Identity fields are never empty: the matching service substitutes the
/// "unknown" sentinels before a value of this type is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub candidate_name: String,
    pub candidate_email: String,
    /// Always within 0..=100.
    pub match_score: u32,
    pub summary_remark: String,
    pub missing_skills: Vec<String>,
}

/// A drafted feedback email.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedEmail {
    pub subject: String,
    pub body: String,
}

/// A drafted feedback email tagged with the candidate it was written for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateEmail {
    pub candidate_name: String,
    pub subject: String,
    pub body: String,
}

impl CandidateEmail {
    pub fn into_email(self) -> GeneratedEmail {
        GeneratedEmail {
            subject: self.subject,
            body: self.body,
        }
    }
}
