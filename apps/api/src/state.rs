use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::recruiting::keywords::KeywordExtractor;
use crate::session::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub llm: LlmClient,
    pub config: Config,
    pub sessions: SessionStore,
    /// `None` when KEYWORD_ENRICHMENT is off; the matching prompt then gets empty keyword lists.
    pub keywords: Option<KeywordExtractor>,
}

impl AppState {
    pub fn new(config: Config, llm: LlmClient) -> Self {
        Self {
            sessions: SessionStore::new(config.session_ttl_minutes),
            keywords: config.keyword_enrichment.then(KeywordExtractor::default),
            llm,
            config,
        }
    }
}
