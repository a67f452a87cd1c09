use super::Strategy;
use crate::parser::record::RawCustodyRecord;
use crate::parser::{scan, Document};

/// JSON array embedded in page markup next to a known field name.
pub struct Marker;

impl Strategy for Marker {
    fn name(&self) -> &'static str {
        "marker"
    }

    fn attempt(&self, doc: &Document) -> Option<Vec<RawCustodyRecord>> {
        scan::find_marked_array(doc.text()?)
    }
}
