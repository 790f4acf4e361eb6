use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::dates::optional_day;

/// A booking as the scheduler widget sees it: one monday.com item flattened
/// into scalar fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
    #[serde(default, with = "optional_day", skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, with = "optional_day", skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guests: Option<u32>,
    /// Index into the board's status labels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, deserialize_with = "ids_from_strings_or_numbers")]
    pub resources: Vec<String>,
}

/// A bookable resource (a property on the demo board).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRecord {
    pub id: String,
    pub name: String,
}

/// One selectable status label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusOption {
    pub value: u32,
    pub text: String,
    pub color: String,
}

/// Links an event to one of its resources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: String,
    pub event_id: String,
    pub resource_id: String,
}

impl Assignment {
    pub fn new(event_id: impl Into<String>, resource_id: impl Into<String>) -> Self {
        let event_id = event_id.into();
        let resource_id = resource_id.into();
        Self {
            id: format!("{event_id}-{resource_id}"),
            event_id,
            resource_id,
        }
    }
}

/// Column values keyed by monday.com column id, in the shape accepted by
/// `create_item` and `change_multiple_column_values`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnValues(pub serde_json::Map<String, serde_json::Value>);

impl ColumnValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, column_id: impl Into<String>, value: serde_json::Value) {
        self.0.insert(column_id.into(), value);
    }

    pub fn get(&self, column_id: &str) -> Option<&serde_json::Value> {
        self.0.get(column_id)
    }

    pub fn contains(&self, column_id: &str) -> bool {
        self.0.contains_key(column_id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Number(serde_json::Number),
}

impl From<StringOrNumber> for String {
    fn from(value: StringOrNumber) -> Self {
        match value {
            StringOrNumber::String(s) => s,
            StringOrNumber::Number(n) => n.to_string(),
        }
    }
}

// The widget keeps ids as whatever type it received, so both shapes show up.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    StringOrNumber::deserialize(deserializer).map(String::from)
}

fn ids_from_strings_or_numbers<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let ids: Vec<StringOrNumber> = Vec::deserialize(deserializer)?;
    Ok(ids.into_iter().map(String::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_record_accepts_widget_payload() {
        let json = r#"{
            "id": "_generated_7",
            "name": "Jane Doe",
            "startDate": "2024-05-01T00:00:00.000Z",
            "endDate": "2024-05-04",
            "price": 450.5,
            "guests": 3,
            "status": 1,
            "resources": [12, "13"]
        }"#;

        let event: EventRecord = serde_json::from_str(json).unwrap();
        assert_eq!(event.id, "_generated_7");
        assert_eq!(event.start_date, NaiveDate::from_ymd_opt(2024, 5, 1));
        assert_eq!(event.end_date, NaiveDate::from_ymd_opt(2024, 5, 4));
        assert_eq!(event.guests, Some(3));
        assert_eq!(event.resources, vec!["12".to_string(), "13".to_string()]);
        assert_eq!(event.note, None);
    }

    #[test]
    fn test_event_record_numeric_id() {
        let event: EventRecord = serde_json::from_str(r#"{"id": 1234, "name": "x"}"#).unwrap();
        assert_eq!(event.id, "1234");
    }

    #[test]
    fn test_event_record_serializes_camel_case_days() {
        let event = EventRecord {
            id: "1".to_string(),
            name: "Booking".to_string(),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 2),
            ..Default::default()
        };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["startDate"], "2024-01-02");
        assert!(json.get("endDate").is_none());
        assert_eq!(json["resources"], serde_json::json!([]));
    }

    #[test]
    fn test_assignment_id_is_deterministic() {
        let assignment = Assignment::new("100", "7");
        assert_eq!(assignment.id, "100-7");
        let json = serde_json::to_value(&assignment).unwrap();
        assert_eq!(json["eventId"], "100");
        assert_eq!(json["resourceId"], "7");
    }
}
