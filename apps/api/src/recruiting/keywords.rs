//! Local keyword extraction used as advisory context in the matching prompt.
//!
//! Two heuristics run over each document:
//! - phrase proxy: runs of 2+ consecutive non-stopword words within a clause,
//!   chunked to at most `MAX_PHRASE_WORDS`, kept when longer than 5 characters;
//! - lemma proxy: lowercased, singularised non-stopword tokens longer than 2 characters.
//!
//! Results are deduplicated in first-seen order and capped. The output never
//! influences the score directly; it is only shown to the model.

use std::collections::HashSet;

/// Default cap on keywords per document.
pub const MAX_KEYWORDS: usize = 30;
const MAX_PHRASE_WORDS: usize = 3;
const MIN_PHRASE_CHARS: usize = 6;
const MIN_TOKEN_CHARS: usize = 3;

/// Characters that end a clause; phrases never span them.
const CLAUSE_BREAKS: &[char] = &[
    ',', ';', ':', '!', '?', '(', ')', '[', ']', '{', '}', '|', '\n', '\r', '\t', '•', '*', '"',
];

const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "across", "after", "again", "against", "all", "also", "am", "an",
    "and", "any", "are", "as", "at", "be", "because", "been", "before", "being", "below",
    "between", "both", "but", "by", "can", "could", "did", "do", "does", "doing", "down",
    "during", "each", "etc", "every", "few", "for", "from", "further", "had", "has", "have",
    "having", "he", "her", "here", "hers", "him", "his", "how", "i", "if", "in", "into", "is",
    "it", "its", "itself", "just", "least", "less", "like", "made", "make", "many", "may", "me",
    "more", "most", "must", "my", "no", "nor", "not", "of", "off", "on", "once", "only", "or",
    "other", "our", "ours", "out", "over", "own", "per", "same", "she", "should", "so", "some",
    "such", "than", "that", "the", "their", "theirs", "them", "then", "there", "these", "they",
    "this", "those", "through", "to", "too", "under", "until", "up", "upon", "us", "use",
    "using", "very", "via", "was", "we", "well", "were", "what", "when", "where", "which",
    "while", "who", "whom", "why", "will", "with", "within", "without", "would", "year",
    "years", "you", "your", "yours",
];

/// Stateless extractor; `AppState` carries `None` when enrichment is disabled.
#[derive(Debug, Clone)]
pub struct KeywordExtractor {
    max_keywords: usize,
}

impl Default for KeywordExtractor {
    fn default() -> Self {
        Self {
            max_keywords: MAX_KEYWORDS,
        }
    }
}

impl KeywordExtractor {
    #[cfg(test)]
    pub fn new(max_keywords: usize) -> Self {
        Self { max_keywords }
    }

    /// Extracts up to `max_keywords` phrases and lemmas from `text`.
    pub fn extract(&self, text: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut keywords = Vec::new();
        let mut lemmas = Vec::new();

        for clause in split_clauses(text) {
            let words: Vec<(String, bool)> = clause
                .split(|c: char| c.is_whitespace() || c == '/')
                .map(|raw| (clean_token(raw), starts_uppercase(raw)))
                .filter(|(w, _)| !w.is_empty())
                .collect();

            let mut run: Vec<&str> = Vec::new();
            for (word, capitalised) in &words {
                if is_stop_word(word) || is_numeric(word) {
                    push_phrases(&run, &mut keywords, &mut seen);
                    run.clear();
                    continue;
                }
                run.push(word);
                // Capitalised tokens are treated as proper nouns and kept as written.
                let lemma = if *capitalised {
                    word.clone()
                } else {
                    lemmatize(word)
                };
                if lemma.chars().count() >= MIN_TOKEN_CHARS && !is_stop_word(&lemma) {
                    lemmas.push(lemma);
                }
            }
            push_phrases(&run, &mut keywords, &mut seen);
        }

        for lemma in lemmas {
            if seen.insert(lemma.clone()) {
                keywords.push(lemma);
            }
        }

        keywords.truncate(self.max_keywords);
        keywords
    }

    /// Comma-joined keyword list as embedded into the prompt.
    pub fn keywords_proxy(&self, text: &str) -> String {
        self.extract(text).join(", ")
    }
}

/// Keyword context for one document, or an empty string when enrichment is off.
pub fn keyword_context(extractor: Option<&KeywordExtractor>, text: &str) -> String {
    extractor
        .map(|e| e.keywords_proxy(text))
        .unwrap_or_default()
}

/// Splits on clause punctuation and on sentence-ending periods (". ").
fn split_clauses(text: &str) -> Vec<String> {
    text.replace(". ", "\n")
        .split(CLAUSE_BREAKS)
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect()
}

/// Lowercases and trims punctuation, keeping the `+`/`#` of names like C++ or C#.
fn clean_token(raw: &str) -> String {
    let lower = raw.to_lowercase();
    let trimmed = lower
        .trim_start_matches(|c: char| !c.is_alphanumeric())
        .trim_end_matches(|c: char| !(c.is_alphanumeric() || c == '+' || c == '#'));
    trimmed.to_string()
}

fn starts_uppercase(raw: &str) -> bool {
    raw.chars()
        .find(|c| c.is_alphanumeric())
        .is_some_and(char::is_uppercase)
}

fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.contains(&word)
}

fn is_numeric(word: &str) -> bool {
    word.chars()
        .all(|c| c.is_ascii_digit() || c == '.' || c == '+' || c == '%')
}

/// Naive singularisation standing in for a real lemmatiser.
fn lemmatize(word: &str) -> String {
    if word.len() > 4 && word.ends_with("ies") {
        format!("{}y", &word[..word.len() - 3])
    } else if word.len() > 3
        && word.ends_with('s')
        && !(word.ends_with("ss") || word.ends_with("us") || word.ends_with("is"))
        && word.chars().all(|c| c.is_ascii_alphabetic())
    {
        word[..word.len() - 1].to_string()
    } else {
        word.to_string()
    }
}

fn push_phrases(run: &[&str], keywords: &mut Vec<String>, seen: &mut HashSet<String>) {
    for chunk in run.chunks(MAX_PHRASE_WORDS) {
        if chunk.len() < 2 {
            continue;
        }
        let phrase = chunk.join(" ");
        if phrase.chars().count() >= MIN_PHRASE_CHARS && seen.insert(phrase.clone()) {
            keywords.push(phrase);
        }
    }
}
