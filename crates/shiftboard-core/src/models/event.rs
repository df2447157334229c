use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::utils::{format_time_range, parse_timestamp};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(default)]
    pub id: i64,
    #[serde(rename = "startTime", default)]
    pub start_time: Option<String>,
    #[serde(rename = "endTime", default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub resources: Vec<EventResource>,
    /// Server fields this client does not interpret (name, location, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A slot within an event that shifts are assigned to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventResource {
    pub id: i64,
    #[serde(rename = "startTime", default)]
    pub start_time: Option<String>,
    #[serde(rename = "endTime", default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub shifts: Vec<Shift>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shift {
    pub id: i64,
    #[serde(rename = "eventResourceId")]
    pub event_resource_id: i64,
    #[serde(rename = "userId", default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(rename = "startTime", default)]
    pub start_time: Option<String>,
    #[serde(rename = "endTime", default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Body of `POST /api/resources/{id}/shifts`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewShift {
    #[serde(rename = "startTime", skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(rename = "endTime", skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(rename = "userId")]
    pub user_id: i64,
}

impl NewShift {
    /// A shift covering the resource's whole time window
    pub fn for_resource(resource: &EventResource, user: &User) -> Self {
        Self {
            start_time: resource.start_time.clone(),
            end_time: resource.end_time.clone(),
            user_id: user.id,
        }
    }
}

/// Read a string field from a flattened extra map
fn extra_str<'a>(extra: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    extra.get(key).and_then(Value::as_str)
}

impl Event {
    pub fn name(&self) -> &str {
        extra_str(&self.extra, "name").unwrap_or("(untitled)")
    }

    /// Start time as naive UTC, if present and parseable
    pub fn start(&self) -> Option<NaiveDateTime> {
        self.start_time.as_deref().and_then(parse_timestamp)
    }

    pub fn formatted_time_range(&self) -> String {
        format_time_range(self.start_time.as_deref(), self.end_time.as_deref())
    }

    pub fn shift_count(&self) -> usize {
        self.resources.iter().map(|r| r.shifts.len()).sum()
    }
}

impl EventResource {
    pub fn name(&self) -> &str {
        extra_str(&self.extra, "name").unwrap_or("(unnamed resource)")
    }

    pub fn shift(&self, shift_id: i64) -> Option<&Shift> {
        self.shifts.iter().find(|s| s.id == shift_id)
    }
}

impl Shift {
    /// User name for lists: embedded user name, else "user #id"
    pub fn display_user(&self) -> String {
        if let Some(name) = self.user.as_ref().and_then(User::display_name) {
            return name;
        }
        match self.user_id.or(self.user.as_ref().map(|u| u.id)) {
            Some(id) => format!("user #{}", id),
            None => "unassigned".to_string(),
        }
    }

    pub fn formatted_time_range(&self) -> String {
        format_time_range(self.start_time.as_deref(), self.end_time.as_deref())
    }

    /// Copy the fields a shift update may change, keeping id and owner
    pub(crate) fn apply_update(&mut self, updated: Shift) {
        self.user = updated.user;
        self.start_time = updated.start_time;
        self.end_time = updated.end_time;
        self.comment = updated.comment;
    }
}

impl User {
    pub fn new(id: i64) -> Self {
        Self {
            id,
            extra: Map::new(),
        }
    }

    /// "First Last" when the server sent name fields, else its `name` field
    pub fn display_name(&self) -> Option<String> {
        let first = extra_str(&self.extra, "firstName");
        let last = extra_str(&self.extra, "lastName");
        match (first, last) {
            (Some(f), Some(l)) => Some(format!("{} {}", f, l)),
            (Some(n), None) | (None, Some(n)) => Some(n.to_string()),
            (None, None) => extra_str(&self.extra, "name").map(str::to_string),
        }
    }
}
