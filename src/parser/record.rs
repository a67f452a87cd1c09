use serde_json::{Map, Value};

const NAME_KEYS: &[&str] = &["name", "offenderNumber", "offender_number", "number", "fullName"];
const FACILITY_KEYS: &[&str] = &["facilityId", "facility_id", "facility", "location"];
const INTAKE_KEYS: &[&str] = &["intakeDate", "intake_date", "admissionDate", "admitDate", "startDate"];
const RELEASE_KEYS: &[&str] = &["releaseDate", "release_date", "dischargeDate", "endDate"];

/// One custody period as the upstream source describes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCustodyRecord {
    pub name: String,
    pub facility_id: String,
    pub intake_date: Option<String>,
    pub release_date: Option<String>,
}

impl RawCustodyRecord {
    /// Map a loosely-shaped JSON object onto a record. Requires a name-like field.
    pub fn from_object(obj: &Map<String, Value>) -> Option<Self> {
        let name = first_text(obj, NAME_KEYS)?;
        Some(RawCustodyRecord {
            name,
            facility_id: first_text(obj, FACILITY_KEYS).unwrap_or_default(),
            intake_date: first_text(obj, INTAKE_KEYS),
            release_date: first_text(obj, RELEASE_KEYS),
        })
    }
}

/// Accept a JSON array only when it is non-empty and every element is a record.
pub fn records_from_array(value: &Value) -> Option<Vec<RawCustodyRecord>> {
    let items = value.as_array()?;
    if items.is_empty() {
        return None;
    }
    items
        .iter()
        .map(|item| item.as_object().and_then(RawCustodyRecord::from_object))
        .collect()
}

fn first_text(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| match obj.get(*k)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}
