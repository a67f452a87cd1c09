pub mod extract;
pub mod record;
pub mod scan;

use serde_json::Value;
use tracing::debug;

use extract::Strategy;
use record::RawCustodyRecord;

/// An upstream response body, parsed as far as its content type allows.
#[derive(Debug, Clone)]
pub enum Document {
    Json(Value),
    Markup(String),
}

impl Document {
    /// Bodies declared as JSON must parse; anything else is kept as text.
    pub fn from_body(body: String, content_type: Option<&str>) -> serde_json::Result<Self> {
        match content_type {
            Some(ct) if ct.to_ascii_lowercase().contains("json") => {
                serde_json::from_str(&body).map(Document::Json)
            }
            _ => Ok(Document::Markup(body)),
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Document::Markup(s) => Some(s),
            Document::Json(_) => None,
        }
    }
}

/// Tries each strategy in order; the first non-empty record list wins.
pub struct Extractor {
    strategies: Vec<Box<dyn Strategy>>,
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(extract::default_strategies())
    }
}

impl Extractor {
    pub fn new(strategies: Vec<Box<dyn Strategy>>) -> Self {
        Self { strategies }
    }

    /// `None` is the "subject has no record" outcome.
    pub fn extract(&self, doc: &Document) -> Option<Vec<RawCustodyRecord>> {
        for strategy in &self.strategies {
            match strategy.attempt(doc) {
                Some(records) => {
                    debug!(strategy = strategy.name(), records = records.len(), "extraction hit");
                    return Some(records);
                }
                None => debug!(strategy = strategy.name(), "extraction miss"),
            }
        }
        None
    }
}
