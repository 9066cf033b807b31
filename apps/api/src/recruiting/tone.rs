//! Tone selection for feedback emails.
//!
//! Chosen locally from the match score alone, before any LLM call, so the same
//! score always yields the same register and closing line.

use serde::{Deserialize, Serialize};

/// Lowest score that earns the positive register.
pub const POSITIVE_THRESHOLD: u32 = 80;
/// Lowest score that earns the balanced register.
pub const BALANCED_THRESHOLD: u32 = 50;

/// Emotional register of a feedback email.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailTone {
    Positive,
    Balanced,
    ConstructiveDecline,
}

impl EmailTone {
    pub fn from_score(score: u32) -> Self {
        if score >= POSITIVE_THRESHOLD {
            EmailTone::Positive
        } else if score >= BALANCED_THRESHOLD {
            EmailTone::Balanced
        } else {
            EmailTone::ConstructiveDecline
        }
    }

    /// Tone instruction embedded into the prompt.
    pub fn instruction(self) -> &'static str {
        match self {
            EmailTone::Positive => {
                "Highly positive. The email should express strong interest and next steps."
            }
            EmailTone::Balanced => {
                "Professional and balanced. Acknowledge strengths while politely outlining the required gap."
            }
            EmailTone::ConstructiveDecline => {
                "Polite and constructive. Gently decline the application for now, providing clear, actionable feedback."
            }
        }
    }

    /// Closing line the model must use verbatim.
    pub fn closing_line(self) -> &'static str {
        match self {
            EmailTone::Positive => {
                "We are highly impressed and would like to proceed with scheduling an interview. Please reply to this email to confirm your availability."
            }
            EmailTone::Balanced => {
                "We encourage you to use the feedback below for future applications. We may contact you for other roles."
            }
            EmailTone::ConstructiveDecline => {
                "While we move forward with other candidates at this time, we encourage you to gain the noted experience and apply for future roles."
            }
        }
    }
}
