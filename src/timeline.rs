use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;

use crate::parser::record::RawCustodyRecord;

const MS_PER_DAY: i64 = 86_400_000;
const MS_PER_HOUR: i64 = 3_600_000;
const MS_PER_MINUTE: i64 = 60_000;

const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TimelineEntry {
    Custody(CustodyEntry),
    Gap(GapEntry),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustodyEntry {
    pub offender_number: String,
    pub facility: String,
    pub intake_date: Option<String>,
    pub release_date: Option<String>,
    pub currently_in_custody: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GapEntry {
    pub duration_ms: i64,
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub start_date: String,
    pub end_date: String,
}

impl GapEntry {
    fn new(duration_ms: i64, start_date: String, end_date: String) -> Self {
        GapEntry {
            duration_ms,
            days: duration_ms / MS_PER_DAY,
            hours: (duration_ms % MS_PER_DAY) / MS_PER_HOUR,
            minutes: (duration_ms % MS_PER_HOUR) / MS_PER_MINUTE,
            start_date,
            end_date,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Timeline {
    pub total_records: usize,
    pub currently_in_custody: bool,
    pub records: Vec<TimelineEntry>,
}

/// Sort by intake and interleave custody periods with the gaps between them.
pub fn build(records: &[RawCustodyRecord]) -> Timeline {
    let mut sorted: Vec<&RawCustodyRecord> = records.iter().collect();
    // Stable; absent or unparseable intake (None) sorts first.
    sorted.sort_by_key(|r| parse_date(r.intake_date.as_deref()));

    let mut entries = Vec::with_capacity(sorted.len() * 2);
    for (i, rec) in sorted.iter().enumerate() {
        entries.push(TimelineEntry::Custody(CustodyEntry {
            offender_number: rec.name.clone(),
            facility: rec.facility_id.clone(),
            intake_date: rec.intake_date.clone(),
            release_date: rec.release_date.clone(),
            currently_in_custody: rec.release_date.is_none(),
        }));

        if let Some(gap) = sorted.get(i + 1).and_then(|next| gap_between(rec, next)) {
            entries.push(TimelineEntry::Gap(gap));
        }
    }

    Timeline {
        total_records: records.len(),
        currently_in_custody: sorted.last().is_some_and(|r| r.release_date.is_none()),
        records: entries,
    }
}

fn gap_between(prev: &RawCustodyRecord, next: &RawCustodyRecord) -> Option<GapEntry> {
    let release = prev.release_date.as_deref()?;
    let intake = next.intake_date.as_deref()?;
    let ms = (parse_date(Some(intake))? - parse_date(Some(release))?).num_milliseconds();
    (ms > 0).then(|| GapEntry::new(ms, release.to_string(), intake.to_string()))
}

/// RFC 3339, naive date-time (as UTC), or a bare date (midnight UTC).
pub fn parse_date(raw: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = raw?.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Some(dt) = NAIVE_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(raw, f).ok())
    {
        return Some(dt.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(name: &str, intake: Option<&str>, release: Option<&str>) -> RawCustodyRecord {
        RawCustodyRecord {
            name: name.to_string(),
            facility_id: "F".to_string(),
            intake_date: intake.map(String::from),
            release_date: release.map(String::from),
        }
    }

    fn custody_names(t: &Timeline) -> Vec<&str> {
        t.records
            .iter()
            .filter_map(|e| match e {
                TimelineEntry::Custody(c) => Some(c.offender_number.as_str()),
                TimelineEntry::Gap(_) => None,
            })
            .collect()
    }

    #[test]
    fn two_periods_with_gap() {
        let t = build(&[
            rec("A", Some("2020-01-01"), Some("2020-02-01")),
            rec("B", Some("2020-03-01"), None),
        ]);
        assert_eq!(t.total_records, 2);
        assert!(t.currently_in_custody);
        assert_eq!(t.records.len(), 3);

        match &t.records[0] {
            TimelineEntry::Custody(c) => {
                assert_eq!(c.offender_number, "A");
                assert!(!c.currently_in_custody);
            }
            other => panic!("expected custody, got {:?}", other),
        }
        match &t.records[1] {
            TimelineEntry::Gap(g) => {
                assert_eq!(g.days, 29);
                assert_eq!((g.hours, g.minutes), (0, 0));
                assert_eq!(g.start_date, "2020-02-01");
                assert_eq!(g.end_date, "2020-03-01");
            }
            other => panic!("expected gap, got {:?}", other),
        }
        match &t.records[2] {
            TimelineEntry::Custody(c) => assert!(c.currently_in_custody),
            other => panic!("expected custody, got {:?}", other),
        }
    }

    #[test]
    fn empty_input() {
        let t = build(&[]);
        assert_eq!(t.total_records, 0);
        assert!(!t.currently_in_custody);
        assert!(t.records.is_empty());
    }

    #[test]
    fn gap_decomposition_truncates_seconds() {
        let g = GapEntry::new(90_061_000, String::new(), String::new());
        assert_eq!((g.days, g.hours, g.minutes), (1, 1, 1));
    }

    #[test]
    fn sorts_by_intake_with_missing_first() {
        let t = build(&[
            rec("late", Some("2021-06-01"), None),
            rec("early", Some("2019-06-01"), Some("2019-07-01")),
            rec("undated", None, Some("2018-01-01")),
            rec("garbled", Some("sometime"), None),
        ]);
        assert_eq!(custody_names(&t), ["undated", "garbled", "early", "late"]);
    }

    #[test]
    fn equal_intake_keeps_input_order() {
        let t = build(&[
            rec("first", Some("2020-01-01"), Some("2020-01-02")),
            rec("second", Some("2020-01-01T00:00:00Z"), Some("2020-01-03")),
            rec("third", Some("2020-01-01"), Some("2020-01-04")),
        ]);
        assert_eq!(custody_names(&t), ["first", "second", "third"]);
    }

    #[test]
    fn overlap_and_back_to_back_produce_no_gap() {
        let t = build(&[
            rec("A", Some("2020-01-01"), Some("2020-03-01")),
            rec("B", Some("2020-02-01"), Some("2020-04-01")),
            rec("C", Some("2020-04-01"), Some("2020-05-01")),
        ]);
        assert_eq!(t.records.len(), 3);
        assert!(!t.currently_in_custody);
    }

    #[test]
    fn missing_dates_suppress_gap() {
        let t = build(&[
            rec("A", Some("2020-01-01"), None),
            rec("B", Some("2020-03-01"), Some("2020-04-01")),
            rec("C", None, None),
        ]);
        // C sorts first; A has no release; B is last.
        assert_eq!(custody_names(&t), ["C", "A", "B"]);
        assert!(t.records.iter().all(|e| matches!(e, TimelineEntry::Custody(_))));
        assert!(!t.currently_in_custody);
    }

    #[test]
    fn entry_count_is_records_plus_gaps() {
        let t = build(&[
            rec("A", Some("2015-01-01T08:00:00"), Some("2015-06-01 12:30:00")),
            rec("B", Some("2016-01-01T00:00:00-05:00"), Some("2016-02-01")),
            rec("C", Some("2016-02-01"), Some("2017-01-01")),
            rec("D", Some("2018-01-01"), None),
        ]);
        let gaps = t.records.iter().filter(|e| matches!(e, TimelineEntry::Gap(_))).count();
        assert_eq!(gaps, 2);
        assert_eq!(t.records.len(), 4 + gaps);
        assert!(t.currently_in_custody);
    }

    #[test]
    fn serializes_tagged_camel_case() {
        let t = build(&[rec("A", Some("2020-01-01"), None)]);
        let v = serde_json::to_value(&t.records).unwrap();
        assert_eq!(v[0]["type"], "custody");
        assert_eq!(v[0]["offenderNumber"], "A");
        assert_eq!(v[0]["releaseDate"], serde_json::Value::Null);
        assert_eq!(v[0]["currentlyInCustody"], true);
    }

    #[test]
    fn parses_supported_date_forms() {
        assert!(parse_date(Some("2020-01-01")).is_some());
        assert!(parse_date(Some("2020-01-01T10:00:00.123Z")).is_some());
        assert!(parse_date(Some("2020-01-01 10:00:00")).is_some());
        assert!(parse_date(Some("01/02/2020")).is_none());
        assert!(parse_date(None).is_none());
    }
}
