use super::Strategy;
use crate::parser::record::RawCustodyRecord;
use crate::parser::{scan, Document};

/// Any array of record-shaped objects, wherever it sits in the markup.
pub struct Shape;

impl Strategy for Shape {
    fn name(&self) -> &'static str {
        "shape"
    }

    fn attempt(&self, doc: &Document) -> Option<Vec<RawCustodyRecord>> {
        scan::find_shaped_array(doc.text()?)
    }
}
