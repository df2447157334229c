//! In-memory implementation of the shiftboard REST API.
//!
//! Serves every endpoint the client consumes from a single shared `Db`.
//! Ids are handed out sequentially across all entity kinds. The DTOs here are
//! defined independently from `shiftboard-core`; the core's integration tests
//! catch schema drift between the two.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;

/// Times given to events created from a template
const TEMPLATE_START: &str = "09:00:00";
const TEMPLATE_END: &str = "17:00:00";

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub name: String,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    #[serde(default)]
    pub resources: Vec<Resource>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub name: String,
    pub resource_type_id: Option<i64>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    #[serde(default)]
    pub shifts: Vec<Shift>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shift {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub event_resource_id: i64,
    pub user_id: Option<i64>,
    pub user: Option<User>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub comment: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
}

impl User {
    fn placeholder(id: i64) -> Self {
        Self {
            id,
            first_name: "User".to_string(),
            last_name: id.to_string(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceType {
    #[serde(default)]
    pub id: i64,
    pub name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub resources: Vec<TemplateResource>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateResource {
    pub name: String,
    pub resource_type_id: Option<i64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewShift {
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub user_id: i64,
}

#[derive(Deserialize)]
pub struct NewTemplateFromEvent {
    pub name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEventFromTemplate {
    pub start_date: String,
}

#[derive(Deserialize)]
pub struct RangeQuery {
    pub start: Option<String>,
    pub end: Option<String>,
}

#[derive(Debug, Default)]
pub struct Db {
    last_id: i64,
    pub events: Vec<Event>,
    pub resource_types: Vec<ResourceType>,
    pub templates: Vec<Template>,
}

impl Db {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    /// Give fresh ids to every resource and shift that has none, and point
    /// shifts at their resource.
    fn assign_ids(&mut self, event: &mut Event) {
        for resource in &mut event.resources {
            if resource.id == 0 {
                resource.id = self.next_id();
            }
            for shift in &mut resource.shifts {
                if shift.id == 0 {
                    shift.id = self.next_id();
                }
                shift.event_resource_id = resource.id;
            }
        }
    }

    fn resource_mut(&mut self, resource_id: i64) -> Option<&mut Resource> {
        self.events
            .iter_mut()
            .flat_map(|e| e.resources.iter_mut())
            .find(|r| r.id == resource_id)
    }

    fn shift_mut(&mut self, shift_id: i64) -> Option<&mut Shift> {
        self.events
            .iter_mut()
            .flat_map(|e| e.resources.iter_mut())
            .flat_map(|r| r.shifts.iter_mut())
            .find(|s| s.id == shift_id)
    }
}

pub type SharedDb = Arc<RwLock<Db>>;

pub fn app() -> Router {
    app_with_db(SharedDb::default())
}

/// Router over an existing store, so tests can inspect server state
pub fn app_with_db(db: SharedDb) -> Router {
    Router::new()
        .route("/api/events", get(list_events).post(create_event))
        .route("/api/events/{id}", get(get_event).put(update_event).delete(delete_event))
        .route("/api/events/{id}/template", post(template_from_event))
        .route("/api/events/template/{id}", post(event_from_template))
        .route("/api/resourcetypes", get(list_resource_types).post(create_resource_type))
        .route("/api/resourcetypes/{id}", put(update_resource_type).delete(delete_resource_type))
        .route("/api/resources/{id}/shifts", post(add_shift))
        .route("/api/shifts/{id}", put(update_shift).delete(delete_shift))
        .route("/api/templates", get(list_templates).post(create_template))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Calendar date of an ISO timestamp
fn date_part(ts: &str) -> &str {
    ts.get(..10).unwrap_or(ts)
}

// ===== Events =====

async fn list_events(State(db): State<SharedDb>, Query(range): Query<RangeQuery>) -> Json<Vec<Event>> {
    let db = db.read().await;
    let events = db
        .events
        .iter()
        .filter(|e| {
            let Some(date) = e.start_time.as_deref().map(date_part) else {
                return false;
            };
            range.start.as_deref().map_or(true, |s| date >= s)
                && range.end.as_deref().map_or(true, |end| date < end)
        })
        .cloned()
        .collect();
    Json(events)
}

async fn create_event(State(db): State<SharedDb>, Json(mut event): Json<Event>) -> (StatusCode, Json<Event>) {
    let mut db = db.write().await;
    event.id = db.next_id();
    db.assign_ids(&mut event);
    db.events.push(event.clone());
    debug!(id = event.id, "event created");
    (StatusCode::CREATED, Json(event))
}

async fn get_event(State(db): State<SharedDb>, Path(id): Path<i64>) -> Result<Json<Event>, StatusCode> {
    let db = db.read().await;
    db.events.iter().find(|e| e.id == id).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn update_event(
    State(db): State<SharedDb>,
    Path(id): Path<i64>,
    Json(mut event): Json<Event>,
) -> Result<Json<Event>, StatusCode> {
    let mut db = db.write().await;
    let index = db.events.iter().position(|e| e.id == id).ok_or(StatusCode::NOT_FOUND)?;
    event.id = id;
    db.assign_ids(&mut event);
    db.events[index] = event.clone();
    Ok(Json(event))
}

async fn delete_event(State(db): State<SharedDb>, Path(id): Path<i64>) -> StatusCode {
    let mut db = db.write().await;
    let before = db.events.len();
    db.events.retain(|e| e.id != id);
    if db.events.len() == before {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::NO_CONTENT
    }
}

async fn template_from_event(
    State(db): State<SharedDb>,
    Path(id): Path<i64>,
    Json(input): Json<NewTemplateFromEvent>,
) -> Result<(StatusCode, Json<Template>), StatusCode> {
    let mut db = db.write().await;
    let event = db.events.iter().find(|e| e.id == id).ok_or(StatusCode::NOT_FOUND)?;
    let resources = event
        .resources
        .iter()
        .map(|r| TemplateResource {
            name: r.name.clone(),
            resource_type_id: r.resource_type_id,
        })
        .collect();
    let template = Template {
        id: db.next_id(),
        name: input.name,
        resources,
    };
    db.templates.push(template.clone());
    Ok((StatusCode::CREATED, Json(template)))
}

async fn event_from_template(
    State(db): State<SharedDb>,
    Path(id): Path<i64>,
    Json(input): Json<NewEventFromTemplate>,
) -> Result<(StatusCode, Json<Event>), StatusCode> {
    let mut db = db.write().await;
    let template = db.templates.iter().find(|t| t.id == id).cloned().ok_or(StatusCode::NOT_FOUND)?;
    let start = format!("{}T{}", input.start_date, TEMPLATE_START);
    let end = format!("{}T{}", input.start_date, TEMPLATE_END);
    let mut event = Event {
        id: db.next_id(),
        name: template.name,
        start_time: Some(start.clone()),
        end_time: Some(end.clone()),
        resources: template
            .resources
            .into_iter()
            .map(|r| Resource {
                name: r.name,
                resource_type_id: r.resource_type_id,
                start_time: Some(start.clone()),
                end_time: Some(end.clone()),
                ..Resource::default()
            })
            .collect(),
    };
    db.assign_ids(&mut event);
    db.events.push(event.clone());
    Ok((StatusCode::CREATED, Json(event)))
}

// ===== Resource types =====

async fn list_resource_types(State(db): State<SharedDb>) -> Json<Vec<ResourceType>> {
    Json(db.read().await.resource_types.clone())
}

async fn create_resource_type(
    State(db): State<SharedDb>,
    Json(mut resource_type): Json<ResourceType>,
) -> Result<(StatusCode, Json<ResourceType>), StatusCode> {
    if resource_type.name.trim().is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }
    let mut db = db.write().await;
    resource_type.id = db.next_id();
    db.resource_types.push(resource_type.clone());
    Ok((StatusCode::CREATED, Json(resource_type)))
}

async fn update_resource_type(
    State(db): State<SharedDb>,
    Path(id): Path<i64>,
    Json(input): Json<ResourceType>,
) -> Result<Json<ResourceType>, StatusCode> {
    let mut db = db.write().await;
    let existing = db.resource_types.iter_mut().find(|t| t.id == id).ok_or(StatusCode::NOT_FOUND)?;
    existing.name = input.name;
    Ok(Json(existing.clone()))
}

/// Removing a type also detaches it from every resource that used it
async fn delete_resource_type(State(db): State<SharedDb>, Path(id): Path<i64>) -> StatusCode {
    let mut db = db.write().await;
    let before = db.resource_types.len();
    db.resource_types.retain(|t| t.id != id);
    if db.resource_types.len() == before {
        return StatusCode::NOT_FOUND;
    }
    for resource in db.events.iter_mut().flat_map(|e| e.resources.iter_mut()) {
        if resource.resource_type_id == Some(id) {
            resource.resource_type_id = None;
        }
    }
    StatusCode::NO_CONTENT
}

// ===== Shifts =====

async fn add_shift(
    State(db): State<SharedDb>,
    Path(resource_id): Path<i64>,
    Json(input): Json<NewShift>,
) -> Result<(StatusCode, Json<Shift>), StatusCode> {
    let mut db = db.write().await;
    let id = db.next_id();
    let resource = db.resource_mut(resource_id).ok_or(StatusCode::NOT_FOUND)?;
    let shift = Shift {
        id,
        event_resource_id: resource_id,
        user_id: Some(input.user_id),
        user: Some(User::placeholder(input.user_id)),
        start_time: input.start_time,
        end_time: input.end_time,
        comment: None,
    };
    resource.shifts.push(shift.clone());
    Ok((StatusCode::CREATED, Json(shift)))
}

async fn update_shift(
    State(db): State<SharedDb>,
    Path(id): Path<i64>,
    Json(input): Json<Shift>,
) -> Result<Json<Shift>, StatusCode> {
    let mut db = db.write().await;
    let shift = db.shift_mut(id).ok_or(StatusCode::NOT_FOUND)?;
    if let Some(user_id) = input.user_id {
        shift.user_id = Some(user_id);
        shift.user = Some(User::placeholder(user_id));
    }
    shift.start_time = input.start_time;
    shift.end_time = input.end_time;
    shift.comment = input.comment;
    Ok(Json(shift.clone()))
}

/// Responds with the removed shift so clients know which resource held it
async fn delete_shift(State(db): State<SharedDb>, Path(id): Path<i64>) -> Result<Json<Shift>, StatusCode> {
    let mut db = db.write().await;
    for resource in db.events.iter_mut().flat_map(|e| e.resources.iter_mut()) {
        if let Some(index) = resource.shifts.iter().position(|s| s.id == id) {
            return Ok(Json(resource.shifts.remove(index)));
        }
    }
    Err(StatusCode::NOT_FOUND)
}

// ===== Templates =====

async fn list_templates(State(db): State<SharedDb>) -> Json<Vec<Template>> {
    Json(db.read().await.templates.clone())
}

async fn create_template(
    State(db): State<SharedDb>,
    Json(mut template): Json<Template>,
) -> (StatusCode, Json<Template>) {
    let mut db = db.write().await;
    template.id = db.next_id();
    db.templates.push(template.clone());
    (StatusCode::CREATED, Json(template))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_part_takes_calendar_date() {
        assert_eq!(date_part("2024-01-03T10:00:00"), "2024-01-03");
        assert_eq!(date_part("short"), "short");
    }

    #[test]
    fn assign_ids_links_shifts_to_resources() {
        let mut db = Db::default();
        let mut event: Event = serde_json::from_str(
            r#"{"name":"Fair","startTime":"2024-01-01T09:00:00","endTime":null,
                "resources":[{"name":"Gate","startTime":null,"endTime":null,"resourceTypeId":null,
                  "shifts":[{"userId":3,"user":null,"startTime":null,"endTime":null,"comment":null}]}]}"#,
        )
        .unwrap();

        db.assign_ids(&mut event);

        let resource = &event.resources[0];
        assert_ne!(resource.id, 0);
        assert_ne!(resource.shifts[0].id, 0);
        assert_eq!(resource.shifts[0].event_resource_id, resource.id);
    }

    #[test]
    fn ids_are_sequential() {
        let mut db = Db::default();
        assert_eq!(db.next_id(), 1);
        assert_eq!(db.next_id(), 2);
    }

    #[test]
    fn new_shift_requires_user_id() {
        let result: Result<NewShift, _> = serde_json::from_str(r#"{"startTime":"2024-01-01T09:00:00"}"#);
        assert!(result.is_err());
    }
}
