use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use super::extract::RECORD_FIELDS;
use super::record::{records_from_array, RawCustodyRecord};

static MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    let keys = RECORD_FIELDS.join("|");
    Regex::new(&format!(r#"["']?\b(?:{})\b["']?\s*[:=]\s*\["#, keys)).unwrap()
});
static SHAPE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[\s*\{").unwrap());

/// First record array assigned to a known field name (`"records": [...]`, `history = [...]`).
pub fn find_marked_array(text: &str) -> Option<Vec<RawCustodyRecord>> {
    let mut regions = Regions::new(text);
    MARKER_RE
        .find_iter(text)
        .find_map(|m| regions.parse_array_at(m.end() - 1))
}

/// First array of objects anywhere in the text whose elements all look like records.
pub fn find_shaped_array(text: &str) -> Option<Vec<RawCustodyRecord>> {
    let mut regions = Regions::new(text);
    SHAPE_RE
        .find_iter(text)
        .find_map(|m| regions.parse_array_at(m.start()))
}

/// Slice from the opening bracket at `start` to its matching close.
/// Brackets inside JSON string literals are ignored.
pub fn balanced_region(text: &str, start: usize) -> Option<&str> {
    Regions::new(text).region(start)
}

/// Bracket matcher that remembers every pair (or dangling open) seen by
/// earlier scans, so each candidate start costs at most one pass over the text.
struct Regions<'a> {
    text: &'a str,
    known: HashMap<usize, Option<usize>>,
}

impl<'a> Regions<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            known: HashMap::new(),
        }
    }

    fn parse_array_at(&mut self, start: usize) -> Option<Vec<RawCustodyRecord>> {
        let region = self.region(start)?;
        let value: serde_json::Value = serde_json::from_str(region).ok()?;
        records_from_array(&value)
    }

    fn region(&mut self, start: usize) -> Option<&'a str> {
        let end = match self.known.get(&start) {
            Some(end) => *end,
            None => self.scan(start),
        }?;
        let text = self.text;
        Some(&text[start..=end])
    }

    fn scan(&mut self, start: usize) -> Option<usize> {
        let text = self.text;
        let bytes = text.as_bytes();
        if !matches!(bytes.get(start), Some(b'[') | Some(b'{')) {
            return None;
        }

        let mut open: Vec<usize> = Vec::new();
        let mut in_string = false;
        let mut escaped = false;

        for (pos, &b) in bytes.iter().enumerate().skip(start) {
            if in_string {
                match b {
                    _ if escaped => escaped = false,
                    b'\\' => escaped = true,
                    b'"' => in_string = false,
                    _ => {}
                }
                continue;
            }
            match b {
                b'"' => in_string = true,
                b'[' | b'{' => open.push(pos),
                b']' | b'}' => {
                    // Non-empty: the start itself is always on the stack until it closes.
                    if let Some(opened) = open.pop() {
                        self.known.insert(opened, Some(pos));
                    }
                    if open.is_empty() {
                        return Some(pos);
                    }
                }
                _ => {}
            }
        }

        // Ran off the end: every bracket still open here is unterminated too.
        for opened in open {
            self.known.insert(opened, None);
        }
        None
    }
}
