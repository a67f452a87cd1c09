use serde_json::Value;

use super::{Strategy, RECORD_FIELDS};
use crate::parser::record::{records_from_array, RawCustodyRecord};
use crate::parser::Document;

/// Direct lookup in a parsed JSON API response.
pub struct Structured;

impl Strategy for Structured {
    fn name(&self) -> &'static str {
        "structured"
    }

    fn attempt(&self, doc: &Document) -> Option<Vec<RawCustodyRecord>> {
        match doc {
            Document::Json(value) => lookup(value),
            Document::Markup(_) => None,
        }
    }
}

/// Depth-first: known fields at this level first, then nested containers.
/// Strings holding encoded JSON are decoded and searched the same way.
fn lookup(value: &Value) -> Option<Vec<RawCustodyRecord>> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim_start();
            if !trimmed.starts_with('[') && !trimmed.starts_with('{') {
                return None;
            }
            let inner: Value = serde_json::from_str(s).ok()?;
            lookup(&inner)
        }
        Value::Array(items) => records_from_array(value)
            .or_else(|| items.iter().find_map(lookup)),
        Value::Object(obj) => RECORD_FIELDS
            .iter()
            .filter_map(|k| obj.get(*k))
            .find_map(records_from_array)
            .or_else(|| obj.values().find_map(lookup)),
        _ => None,
    }
}
