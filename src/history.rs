use std::sync::LazyLock;

use chrono::{SecondsFormat, Utc};
use regex::Regex;
use serde::Serialize;
use tracing::info;

use crate::error::AppError;
use crate::parser::Extractor;
use crate::source::Source;
use crate::timeline::{self, TimelineEntry};

static ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$").unwrap()
});

pub const NO_RECORDS_MESSAGE: &str = "No custody history found for this identifier";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustodyHistory {
    pub id: String,
    pub total_records: usize,
    pub records: Vec<TimelineEntry>,
    pub retrieved_at: String,
    pub currently_in_custody: bool,
}

#[derive(Debug, Serialize)]
pub struct NoRecords {
    pub id: String,
    pub records: Vec<TimelineEntry>,
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum HistoryResponse {
    Found(CustodyHistory),
    NotFound(NoRecords),
}

pub fn validate_id(id: &str) -> Result<(), AppError> {
    if ID_RE.is_match(id) {
        Ok(())
    } else {
        Err(AppError::InvalidId(id.to_string()))
    }
}

/// Validate, fetch, extract, build. A miss comes back as `NotFound`, not an error.
pub async fn lookup(
    source: &dyn Source,
    extractor: &Extractor,
    id: &str,
) -> Result<HistoryResponse, AppError> {
    validate_id(id)?;
    let doc = source.fetch(id).await?;

    let Some(records) = extractor.extract(&doc) else {
        info!(id, "no custody records found");
        return Ok(HistoryResponse::NotFound(NoRecords {
            id: id.to_string(),
            records: Vec::new(),
            message: NO_RECORDS_MESSAGE.to_string(),
        }));
    };

    let timeline = timeline::build(&records);
    info!(
        id,
        total_records = timeline.total_records,
        entries = timeline.records.len(),
        in_custody = timeline.currently_in_custody,
        "custody history built"
    );

    Ok(HistoryResponse::Found(CustodyHistory {
        id: id.to_string(),
        total_records: timeline.total_records,
        records: timeline.records,
        retrieved_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        currently_in_custody: timeline.currently_in_custody,
    }))
}
