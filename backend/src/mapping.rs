//! Translation between monday.com board items and scheduler records.
//!
//! Reading matches columns by *title*, writing addresses them by *id*; both
//! come from the [`ColumnLayout`].

use serde::Deserialize;
use serde_json::{json, Value};
use shared::api::{is_phantom_id, LoadResponse, SaveItemRequest};
use shared::dates::{format_day, parse_day};
use shared::models::{Assignment, ColumnValues, EventRecord, ResourceRecord, StatusOption};
use validator::Validate;

use crate::monday::types::{ColumnValue, Item};

/// monday.com's default label colour, used when a status has none.
const FALLBACK_STATUS_COLOR: &str = "#c4c4c4";

/// Column key through which `change_multiple_column_values` renames an item.
const NAME_COLUMN_ID: &str = "name";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventField {
    Resources,
    Dates,
    Price,
    Guests,
    Status,
    Agent,
    Note,
}

impl EventField {
    pub const ALL: [EventField; 7] = [
        EventField::Resources,
        EventField::Dates,
        EventField::Price,
        EventField::Guests,
        EventField::Status,
        EventField::Agent,
        EventField::Note,
    ];
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ColumnRef {
    pub title: String,
    pub id: String,
}

impl ColumnRef {
    fn new(title: &str, id: &str) -> Self {
        Self {
            title: title.to_string(),
            id: id.to_string(),
        }
    }
}

/// Where each event field lives on the board.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ColumnLayout {
    pub resources: ColumnRef,
    pub dates: ColumnRef,
    pub price: ColumnRef,
    pub guests: ColumnRef,
    pub status: ColumnRef,
    pub agent: ColumnRef,
    pub note: ColumnRef,
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self {
            resources: ColumnRef::new("Property", "dropdown9__1"),
            dates: ColumnRef::new("Dates", "project_timeline"),
            price: ColumnRef::new("Price", "numbers__1"),
            guests: ColumnRef::new("Guests", "numbers0__1"),
            status: ColumnRef::new("Status", "project_status"),
            agent: ColumnRef::new("Agent", "person"),
            note: ColumnRef::new("Notes", "text9"),
        }
    }
}

impl ColumnLayout {
    pub fn column(&self, field: EventField) -> &ColumnRef {
        match field {
            EventField::Resources => &self.resources,
            EventField::Dates => &self.dates,
            EventField::Price => &self.price,
            EventField::Guests => &self.guests,
            EventField::Status => &self.status,
            EventField::Agent => &self.agent,
            EventField::Note => &self.note,
        }
    }

    /// Exact, case-sensitive title lookup.
    pub fn field_for_title(&self, title: &str) -> Option<EventField> {
        EventField::ALL
            .into_iter()
            .find(|field| self.column(*field).title == title)
    }
}

// ============================================================================
// Board -> scheduler
// ============================================================================

/// Everything the scheduler needs to render one board.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoardSnapshot {
    pub status_values: Vec<StatusOption>,
    pub resources: Vec<ResourceRecord>,
    pub events: Vec<EventRecord>,
    pub assignments: Vec<Assignment>,
}

impl From<BoardSnapshot> for LoadResponse {
    fn from(snapshot: BoardSnapshot) -> Self {
        LoadResponse {
            success: true,
            status_values: snapshot.status_values,
            resources: snapshot.resources.into(),
            events: snapshot.events.into(),
            assignments: snapshot.assignments.into(),
        }
    }
}

/// Flattens board items into events. Resource and status metadata is read
/// from the first item only; every row of a board shares column settings.
pub fn flatten_board(items: &[Item], layout: &ColumnLayout) -> BoardSnapshot {
    let mut snapshot = BoardSnapshot::default();

    if let Some(first) = items.first() {
        for column in &first.column_values {
            match column.title().and_then(|t| layout.field_for_title(t)) {
                Some(EventField::Resources) => {
                    snapshot.resources = column.settings().map(parse_resources).unwrap_or_default();
                }
                Some(EventField::Status) => {
                    snapshot.status_values =
                        column.settings().map(parse_status_options).unwrap_or_default();
                }
                _ => {}
            }
        }
    }

    for item in items {
        let (event, assignments) = flatten_item(item, layout);
        snapshot.events.push(event);
        snapshot.assignments.extend(assignments);
    }

    snapshot
}

pub fn flatten_item(item: &Item, layout: &ColumnLayout) -> (EventRecord, Vec<Assignment>) {
    let mut event = EventRecord {
        id: item.id.clone(),
        name: item.name.clone(),
        ..Default::default()
    };

    for column in &item.column_values {
        let Some(field) = column.title().and_then(|t| layout.field_for_title(t)) else {
            continue;
        };

        match field {
            EventField::Resources => event.resources = dropdown_ids(column),
            EventField::Dates => {
                if let Some(raw) = raw_value(column) {
                    event.start_date = raw.get("from").and_then(Value::as_str).and_then(parse_day);
                    event.end_date = raw.get("to").and_then(Value::as_str).and_then(parse_day);
                }
            }
            EventField::Price => event.price = number_text(column),
            EventField::Guests => {
                event.guests = number_text(column)
                    .filter(|n| *n >= 0.0 && n.fract() == 0.0)
                    .map(|n| n as u32);
            }
            EventField::Status => {
                event.status = raw_value(column)
                    .and_then(|raw| raw.get("index").and_then(Value::as_u64))
                    .and_then(|index| u32::try_from(index).ok());
            }
            EventField::Agent => event.agent = non_empty_text(column),
            EventField::Note => event.note = non_empty_text(column),
        }
    }

    let assignments = event
        .resources
        .iter()
        .map(|resource_id| Assignment::new(event.id.clone(), resource_id.clone()))
        .collect();

    (event, assignments)
}

fn raw_value(column: &ColumnValue) -> Option<Value> {
    let raw = column.value.as_deref()?;
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Null) => None,
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(column_id = %column.id, "Ignoring malformed column value: {}", e);
            None
        }
    }
}

fn dropdown_ids(column: &ColumnValue) -> Vec<String> {
    raw_value(column)
        .and_then(|raw| raw.get("ids").and_then(Value::as_array).cloned())
        .unwrap_or_default()
        .into_iter()
        .filter_map(|id| match id {
            Value::Number(n) => Some(n.to_string()),
            Value::String(s) => Some(s),
            _ => None,
        })
        .collect()
}

fn non_empty_text(column: &ColumnValue) -> Option<String> {
    column
        .text
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

fn number_text(column: &ColumnValue) -> Option<f64> {
    non_empty_text(column).and_then(|t| t.parse().ok())
}

/// Dropdown settings: `{"labels":[{"id":1,"name":"Beach house"}]}`.
pub fn parse_resources(settings: &str) -> Vec<ResourceRecord> {
    #[derive(Deserialize)]
    struct DropdownSettings {
        #[serde(default)]
        labels: Vec<DropdownLabel>,
    }

    #[derive(Deserialize)]
    struct DropdownLabel {
        id: Value,
        name: String,
    }

    match serde_json::from_str::<DropdownSettings>(settings) {
        Ok(parsed) => parsed
            .labels
            .into_iter()
            .map(|label| ResourceRecord {
                id: match label.id {
                    Value::String(s) => s,
                    other => other.to_string(),
                },
                name: label.name,
            })
            .collect(),
        Err(e) => {
            tracing::warn!("Could not read dropdown labels: {}", e);
            Vec::new()
        }
    }
}

/// Status settings: `{"labels":{"0":"Booked"},"labels_colors":{"0":{"color":"#00c875"}}}`.
pub fn parse_status_options(settings: &str) -> Vec<StatusOption> {
    #[derive(Deserialize)]
    struct StatusSettings {
        #[serde(default)]
        labels: serde_json::Map<String, Value>,
        #[serde(default)]
        labels_colors: serde_json::Map<String, Value>,
    }

    let parsed = match serde_json::from_str::<StatusSettings>(settings) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::warn!("Could not read status labels: {}", e);
            return Vec::new();
        }
    };

    let mut options: Vec<StatusOption> = parsed
        .labels
        .iter()
        .filter_map(|(key, text)| {
            let value = key.parse::<u32>().ok()?;
            let text = text.as_str()?.to_string();
            let color = parsed
                .labels_colors
                .get(key)
                .and_then(|c| c.get("color"))
                .and_then(Value::as_str)
                .unwrap_or(FALLBACK_STATUS_COLOR)
                .to_string();
            Some(StatusOption { value, text, color })
        })
        .collect();

    options.sort_by_key(|o| o.value);
    options
}

// ============================================================================
// Scheduler -> board
// ============================================================================

/// Serializes an event into column values for the writable columns.
///
/// A create fills property and notes with empty values when the event has
/// none; an update only writes what the event carries.
pub fn event_column_values(
    event: &EventRecord,
    layout: &ColumnLayout,
    target: SaveTarget,
) -> ColumnValues {
    let mut values = ColumnValues::new();

    if target == SaveTarget::Create || !event.resources.is_empty() {
        let ids: Vec<Value> = event
            .resources
            .iter()
            .map(|id| id.parse::<i64>().map(Value::from).unwrap_or_else(|_| json!(id)))
            .collect();
        values.insert(layout.resources.id.clone(), json!({ "ids": ids }));
    }

    if let (Some(from), Some(to)) = (event.start_date, event.end_date) {
        values.insert(
            layout.dates.id.clone(),
            json!({ "from": format_day(from), "to": format_day(to) }),
        );
    }
    if let Some(price) = event.price {
        values.insert(layout.price.id.clone(), json!(price));
    }
    if let Some(guests) = event.guests {
        values.insert(layout.guests.id.clone(), json!(guests));
    }
    if let Some(status) = event.status {
        values.insert(layout.status.id.clone(), json!({ "index": status }));
    }
    match (&event.note, target) {
        (Some(note), _) => values.insert(layout.note.id.clone(), json!(note)),
        (None, SaveTarget::Create) => values.insert(layout.note.id.clone(), json!("")),
        (None, SaveTarget::Update) => {}
    }

    values
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveTarget {
    Create,
    Update,
}

/// A validated item write, ready to send.
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct ItemDraft {
    #[validate(length(min = 1, message = "item name must not be empty"))]
    pub item_name: String,
    pub column_values: ColumnValues,
    pub phantom_id: Option<String>,
}

impl ItemDraft {
    pub fn from_request(
        request: SaveItemRequest,
        layout: &ColumnLayout,
        target: SaveTarget,
    ) -> Self {
        let mut draft = match request {
            SaveItemRequest::Prepared(prepared) => ItemDraft {
                item_name: prepared.item_name.trim().to_string(),
                column_values: prepared.column_values,
                phantom_id: prepared.phantom_id,
            },
            SaveItemRequest::Event(event) => ItemDraft {
                item_name: event.name.trim().to_string(),
                column_values: event_column_values(&event, layout, target),
                phantom_id: Some(event.id),
            },
        };

        // Only placeholders are echoed back; a real id needs no patching.
        draft.phantom_id = draft.phantom_id.filter(|id| is_phantom_id(id));

        // create_item takes the name separately; updates carry it as a column.
        if target == SaveTarget::Update && !draft.column_values.contains(NAME_COLUMN_ID) {
            draft
                .column_values
                .insert(NAME_COLUMN_ID, json!(draft.item_name.clone()));
        }
        if target == SaveTarget::Update {
            draft.phantom_id = None;
        }

        draft
    }

    /// True when the draft replaces a client placeholder.
    pub fn replaces_phantom(&self) -> bool {
        self.phantom_id.as_deref().is_some_and(is_phantom_id)
    }
}
