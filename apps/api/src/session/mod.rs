//! Per-user workflow sessions: the stored job description, scored candidates and
//! drafted emails.
//!
//! Sessions live in memory only. Expiry is checked lazily whenever a session is
//! touched; `create` also sweeps every expired entry so abandoned sessions do not
//! accumulate. The store lock is held only for map access, never across an LLM call.

pub mod handlers;

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::candidate::{GeneratedEmail, MatchResult};
use crate::recruiting::email::name_key;

/// Used when the stored JD yields no usable title line.
pub const FALLBACK_JOB_TITLE: &str = "The Applied Role";
const MAX_JOB_TITLE_CHARS: usize = 100;
const JOB_TITLE_LABEL: &str = "job title:";

/// A match result together with the file it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredCandidate {
    pub source_file: String,
    #[serde(flatten)]
    pub result: MatchResult,
}

#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub last_accessed: DateTime<Utc>,
    pub job_description: Option<String>,
    /// In upload order; ranking happens on read.
    pub results: Vec<ScoredCandidate>,
    /// Keyed by `name_key(candidate_name)`.
    pub emails: HashMap<String, GeneratedEmail>,
}

/// One row of the ranked view.
#[derive(Debug, Clone, Serialize)]
pub struct RankedCandidate {
    pub rank: usize,
    #[serde(flatten)]
    pub candidate: ScoredCandidate,
    pub email: Option<GeneratedEmail>,
}

/// What the session endpoints return.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub job_description: Option<String>,
    pub job_title: Option<String>,
    pub candidates: Vec<RankedCandidate>,
}

impl Session {
    fn new(now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: now,
            last_accessed: now,
            job_description: None,
            results: Vec::new(),
            emails: HashMap::new(),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.last_accessed > ttl
    }

    /// Results by score, highest first. Ties keep upload order.
    pub fn ranked(&self) -> Vec<RankedCandidate> {
        let mut sorted = self.results.clone();
        sorted.sort_by(|a, b| b.result.match_score.cmp(&a.result.match_score));
        sorted
            .into_iter()
            .enumerate()
            .map(|(i, candidate)| RankedCandidate {
                rank: i + 1,
                email: self.email_for(&candidate.result.candidate_name).cloned(),
                candidate,
            })
            .collect()
    }

    pub fn email_for(&self, candidate_name: &str) -> Option<&GeneratedEmail> {
        self.emails.get(&name_key(candidate_name))
    }

    /// Later entries win when two candidates share a name.
    pub fn find_candidate(&self, candidate_name: &str) -> Option<&ScoredCandidate> {
        let key = name_key(candidate_name);
        self.results
            .iter()
            .rev()
            .find(|c| name_key(&c.result.candidate_name) == key)
    }

    pub fn job_title(&self) -> Option<String> {
        self.job_description.as_deref().map(derive_job_title)
    }

    pub fn store_email(&mut self, candidate_name: &str, email: GeneratedEmail) {
        self.emails.insert(name_key(candidate_name), email);
    }

    pub fn view(&self, ttl: Duration) -> SessionView {
        SessionView {
            id: self.id,
            created_at: self.created_at,
            expires_at: self.last_accessed + ttl,
            job_description: self.job_description.clone(),
            job_title: self.job_title(),
            candidates: self.ranked(),
        }
    }
}

/// Email job title taken from the first non-empty line of a job description.
///
/// Markdown `#`/`*` markers and a leading "Job Title:" label are removed. A line
/// longer than 100 characters (or one that is empty once cleaned) falls back to
/// `FALLBACK_JOB_TITLE`.
pub fn derive_job_title(job_description: &str) -> String {
    let Some(line) = job_description.lines().map(str::trim).find(|l| !l.is_empty()) else {
        return FALLBACK_JOB_TITLE.to_string();
    };

    let cleaned = line.replace(['#', '*'], "");
    let mut title = cleaned.trim();
    if title
        .get(..JOB_TITLE_LABEL.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(JOB_TITLE_LABEL))
    {
        title = title[JOB_TITLE_LABEL.len()..].trim();
    }

    if title.is_empty() || title.chars().count() > MAX_JOB_TITLE_CHARS {
        FALLBACK_JOB_TITLE.to_string()
    } else {
        title.to_string()
    }
}

/// In-memory session map shared through `AppState`.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, Session>>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl_minutes: i64) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl: Duration::minutes(ttl_minutes),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub async fn create(&self) -> Session {
        let now = Utc::now();
        let session = Session::new(now);
        let mut sessions = self.sessions.write().await;

        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired(now, self.ttl));
        let purged = before - sessions.len();
        if purged > 0 {
            debug!("Purged {purged} expired sessions");
        }

        sessions.insert(session.id, session.clone());
        info!("Created session {} ({} active)", session.id, sessions.len());
        session
    }

    /// Snapshot of a live session. Refreshes its idle timer.
    pub async fn get(&self, id: Uuid) -> Result<Session, AppError> {
        self.update(id, |session| session.clone()).await
    }

    /// Runs `f` against a live session under the write lock. `f` must not block.
    pub async fn update<F, R>(&self, id: Uuid, f: F) -> Result<R, AppError>
    where
        F: FnOnce(&mut Session) -> R,
    {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;

        if sessions
            .get(&id)
            .is_some_and(|s| s.is_expired(now, self.ttl))
        {
            sessions.remove(&id);
            info!("Session {id} expired");
        }

        let session = sessions
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Session {id} not found or expired")))?;
        session.last_accessed = now;
        Ok(f(session))
    }

    pub async fn remove(&self, id: Uuid) -> Result<(), AppError> {
        match self.sessions.write().await.remove(&id) {
            Some(_) => {
                info!("Deleted session {id}");
                Ok(())
            }
            None => Err(AppError::NotFound(format!(
                "Session {id} not found or expired"
            ))),
        }
    }

    #[cfg(test)]
    pub(crate) async fn backdate(&self, id: Uuid, minutes: i64) {
        if let Some(session) = self.sessions.write().await.get_mut(&id) {
            session.last_accessed -= Duration::minutes(minutes);
        }
    }

    #[cfg(test)]
    pub(crate) async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}
