pub mod escaped;
pub mod marker;
pub mod shape;
pub mod structured;

use super::record::RawCustodyRecord;
use super::Document;

/// Field names the upstream has been seen to keep the custody array under.
pub const RECORD_FIELDS: &[&str] = &[
    "custodyHistory",
    "custodyRecords",
    "records",
    "history",
    "data",
    "results",
];

/// One independent way of pulling custody records out of a document.
pub trait Strategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// `None` means "nothing here", never a failure.
    fn attempt(&self, doc: &Document) -> Option<Vec<RawCustodyRecord>>;
}

/// Strategies in the order they are tried.
pub fn default_strategies() -> Vec<Box<dyn Strategy>> {
    vec![
        Box::new(structured::Structured),
        Box::new(marker::Marker),
        Box::new(shape::Shape),
        Box::new(escaped::Escaped),
    ]
}
