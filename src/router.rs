//! Query classification and response routing
//!
//! Classification is an ordered list of rules. Each rule sees the lowercased
//! query and either returns a decision or passes to the next rule; the
//! default is the generation fallback. Order is part of the contract:
//! earlier rules shadow later ones.

use crate::error::Result;
use crate::generation::{GenerationClient, GenerationError};
use crate::kb::KbSearch;

/// Terminal outcome of classifying a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Answer with a fixed reply.
    Reply(String),

    /// Delegate to the knowledgebase ranker.
    SearchKb,

    /// Forward to the generation service.
    Generate,
}

/// Canned short replies, kept exactly as shipped. The cased entries can
/// never match a lowercased query, and "seri" matches the set without
/// producing a reply, so it falls through to the rules after it.
const CANNED_QUERIES: &[&str] = &["yes", "Yes", "Yes you too", "seri", "okay", "ok"];

const APOLOGY_REPLY: &str = "It's okay! Don't cry. Go and Work!";

const GRATITUDE_REPLY: &str = "Aww! So sweet of you! You're Welcome";

/// Keywords that send a query to the knowledgebase regardless of outcome.
const KB_TRIGGERS: &[&str] = &["cfi", "flashing", "error", "issue", "problem"];

/// Greeting table in iteration order. Substring containment, first match
/// wins; "hi" matching inside unrelated words is expected.
const GREETINGS: &[(&str, &str)] = &[
    ("hi", "Hello! How can I assist you today?"),
    ("hello", "Hello! Have a great day."),
    ("hey", "Hello! How can I assist you today?"),
    ("good morning", "Good morning! Have a nice day."),
    ("good afternoon", "Good afternoon! Have a great day."),
    ("good evening", "Good evening! Go and have snacks."),
    ("good night", "Good night! Sleep well."),
];

const DISALLOWED_PHRASES: &[&str] = &[
    "brutal",
    "badword",
    "i hate you",
    "fuck you",
    "i love you",
    "i want to marry you",
];

const FILTER_REPLY: &str = "I didn't get you...";

type Rule = fn(&str) -> Option<Decision>;

/// Classifier rules in priority order.
const RULES: &[(&str, Rule)] = &[
    ("canned", canned_rule),
    ("apology", apology_rule),
    ("gratitude", gratitude_rule),
    ("kb-trigger", kb_trigger_rule),
    ("greeting", greeting_rule),
    ("content-filter", content_filter_rule),
];

/// Classify a raw query. Falls through to the generation service when no
/// rule decides.
pub fn classify(query: &str) -> Decision {
    let lowered = query.to_lowercase();
    for (name, rule) in RULES {
        if let Some(decision) = rule(&lowered) {
            log::debug!("Rule '{}' decided the query", name);
            return decision;
        }
    }
    Decision::Generate
}

fn canned_rule(query: &str) -> Option<Decision> {
    if !CANNED_QUERIES.contains(&query) {
        return None;
    }
    if query == "yes" {
        return Some(Decision::Reply("Seri! Okay".to_string()));
    }
    if query == "okay" || query == "ok" {
        return Some(Decision::Reply("ok".to_string()));
    }
    // "seri" reaches here and decides nothing.
    None
}

fn apology_rule(query: &str) -> Option<Decision> {
    query
        .contains("sorry")
        .then(|| Decision::Reply(APOLOGY_REPLY.to_string()))
}

fn gratitude_rule(query: &str) -> Option<Decision> {
    query
        .contains("thank you")
        .then(|| Decision::Reply(GRATITUDE_REPLY.to_string()))
}

fn kb_trigger_rule(query: &str) -> Option<Decision> {
    KB_TRIGGERS
        .iter()
        .any(|keyword| query.contains(keyword))
        .then_some(Decision::SearchKb)
}

fn greeting_rule(query: &str) -> Option<Decision> {
    GREETINGS
        .iter()
        .find(|(phrase, _)| query.contains(phrase))
        .map(|(_, reply)| Decision::Reply((*reply).to_string()))
}

fn content_filter_rule(query: &str) -> Option<Decision> {
    DISALLOWED_PHRASES
        .iter()
        .any(|phrase| query.contains(phrase))
        .then(|| Decision::Reply(FILTER_REPLY.to_string()))
}

/// Executes classification decisions against the knowledgebase and the
/// generation service.
pub struct ResponseRouter {
    search: KbSearch,
    client: GenerationClient,
}

impl ResponseRouter {
    pub fn new(search: KbSearch, client: GenerationClient) -> Self {
        Self { search, client }
    }

    pub fn search(&self) -> &KbSearch {
        &self.search
    }

    pub fn client(&self) -> &GenerationClient {
        &self.client
    }

    /// Resolve one query to a reply. Generation failures degrade to
    /// formatted reply strings; only knowledgebase failures propagate.
    pub async fn respond(&self, query: &str) -> Result<String> {
        match classify(query) {
            Decision::Reply(reply) => Ok(reply),
            Decision::SearchKb => self.search.answer(query),
            Decision::Generate => self.generate(query).await,
        }
    }

    async fn generate(&self, query: &str) -> Result<String> {
        match self.client.generate(query).await {
            Ok(reply) => Ok(reply),
            Err(GenerationError::NotFound) => {
                log::warn!("Generation endpoint returned 404, falling back to knowledgebase");
                self.search.answer(query)
            }
            Err(err @ GenerationError::Status(_)) => Ok(format!("HTTP error occurred: {}", err)),
            Err(err @ GenerationError::Network(_)) => Ok(format!("Request error occurred: {}", err)),
            Err(err @ GenerationError::Decode(_)) => {
                Ok(format!("JSON decode error occurred: {}", err))
            }
        }
    }
}
