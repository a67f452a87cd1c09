use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};

use super::Strategy;
use crate::parser::record::RawCustodyRecord;
use crate::parser::{scan, Document};

/// JSON blobs hidden behind a layer of escaping: HTML entities in attributes,
/// percent-encoding, or backslash-escaped quotes inside script strings.
pub struct Escaped;

// A percent-encoded run opening with `[` or `{`: unreserved chars, sub-delims or %XX.
static PERCENT_RUN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)%(?:5B|7B)(?:[A-Za-z0-9\-._~!$'()*+,;:=@/?]|%[0-9A-F]{2})*").unwrap()
});

impl Strategy for Escaped {
    fn name(&self) -> &'static str {
        "escaped"
    }

    fn attempt(&self, doc: &Document) -> Option<Vec<RawCustodyRecord>> {
        let text = doc.text()?;
        decoded_variants(text).iter().find_map(|candidate| {
            scan::find_marked_array(candidate).or_else(|| scan::find_shaped_array(candidate))
        })
    }
}

fn decoded_variants(text: &str) -> Vec<String> {
    let mut out = entity_decoded(text);

    out.extend(
        PERCENT_RUN_RE
            .find_iter(text)
            .filter_map(|m| urlencoding::decode(m.as_str()).ok())
            .map(|decoded| decoded.into_owned()),
    );

    if text.contains("\\\"") {
        out.push(unescape_quotes(text));
    }

    out
}

/// Attribute values and text content, which the HTML parser hands back entity-decoded.
fn entity_decoded(text: &str) -> Vec<String> {
    if !text.contains("&#") && !text.to_ascii_lowercase().contains("&quot;") {
        return Vec::new();
    }

    let Ok(any) = Selector::parse("*") else {
        return Vec::new();
    };
    let html = Html::parse_document(text);
    let mut out: Vec<String> = html
        .select(&any)
        .flat_map(|el| el.value().attrs().map(|(_, v)| v.to_string()).collect::<Vec<_>>())
        .filter(|v| v.contains('['))
        .collect();

    let body_text: String = html.root_element().text().collect();
    if body_text.contains('[') {
        out.push(body_text);
    }
    out
}

/// `\"` becomes `"` and `\\` becomes `\`; other escapes are left alone.
fn unescape_quotes(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some(next @ ('"' | '\\')) => out.push(next),
            Some(next) => {
                out.push('\\');
                out.push(next);
            }
            None => out.push('\\'),
        }
    }
    out
}
