use axum::http::{self, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use mock_server::{app, app_with_db, Event, SharedDb, Shift, Template};
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<String> {
    Request::builder().method(method).uri(uri).body(String::new()).unwrap()
}

async fn call(app: &Router, request: Request<String>) -> axum::response::Response {
    app.clone().oneshot(request).await.unwrap()
}

const FAIR: &str = r#"{
    "name": "Fair",
    "startTime": "2024-01-02T09:00:00",
    "endTime": "2024-01-02T17:00:00",
    "resources": [{ "name": "Gate", "startTime": "2024-01-02T09:00:00", "endTime": "2024-01-02T12:00:00" }]
}"#;

async fn create_fair(app: &Router) -> Event {
    let resp = call(app, json_request("POST", "/api/events", FAIR)).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    body_json(resp).await
}

// --- events ---

#[tokio::test]
async fn list_events_filters_by_half_open_range() {
    let app = app();
    create_fair(&app).await;

    let inside = call(&app, empty_request("GET", "/api/events?start=2024-01-02&end=2024-01-03")).await;
    let events: Vec<Event> = body_json(inside).await;
    assert_eq!(events.len(), 1);

    let excluded = call(&app, empty_request("GET", "/api/events?start=2024-01-01&end=2024-01-02")).await;
    let events: Vec<Event> = body_json(excluded).await;
    assert!(events.is_empty());
}

#[tokio::test]
async fn create_event_assigns_nested_ids() {
    let app = app();
    let event = create_fair(&app).await;

    assert_ne!(event.id, 0);
    assert_ne!(event.resources[0].id, 0);
    assert_ne!(event.resources[0].id, event.id);
}

#[tokio::test]
async fn get_missing_event_returns_404() {
    let resp = call(&app(), empty_request("GET", "/api/events/42")).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_event_then_404() {
    let app = app();
    let event = create_fair(&app).await;
    let uri = format!("/api/events/{}", event.id);

    let resp = call(&app, empty_request("DELETE", &uri)).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = call(&app, empty_request("DELETE", &uri)).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- shifts ---

#[tokio::test]
async fn shift_lifecycle() {
    let db = SharedDb::default();
    let app = app_with_db(db.clone());
    let event = create_fair(&app).await;
    let resource_id = event.resources[0].id;

    let resp = call(
        &app,
        json_request(
            "POST",
            &format!("/api/resources/{resource_id}/shifts"),
            r#"{"startTime":"2024-01-02T09:00:00","endTime":"2024-01-02T12:00:00","userId":7}"#,
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let shift: Shift = body_json(resp).await;
    assert_eq!(shift.event_resource_id, resource_id);
    assert_eq!(shift.user.as_ref().map(|u| u.id), Some(7));

    let mut edited = shift.clone();
    edited.comment = Some("late".to_string());
    let resp = call(
        &app,
        json_request("PUT", &format!("/api/shifts/{}", shift.id), &serde_json::to_string(&edited).unwrap()),
    )
    .await;
    let updated: Shift = body_json(resp).await;
    assert_eq!(updated.comment.as_deref(), Some("late"));

    let resp = call(&app, empty_request("DELETE", &format!("/api/shifts/{}", shift.id))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let deleted: Shift = body_json(resp).await;
    assert_eq!(deleted.id, shift.id);
    assert_eq!(deleted.event_resource_id, resource_id);

    assert!(db.read().await.events[0].resources[0].shifts.is_empty());
}

#[tokio::test]
async fn add_shift_to_unknown_resource_returns_404() {
    let resp = call(
        &app(),
        json_request("POST", "/api/resources/99/shifts", r#"{"userId":1}"#),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- resource types ---

#[tokio::test]
async fn resource_type_requires_name() {
    let resp = call(&app(), json_request("POST", "/api/resourcetypes", r#"{"name":"  "}"#)).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn deleting_resource_type_detaches_resources() {
    let db = SharedDb::default();
    let app = app_with_db(db.clone());
    let resp = call(&app, json_request("POST", "/api/resourcetypes", r#"{"name":"Usher"}"#)).await;
    let created: mock_server::ResourceType = body_json(resp).await;

    let body = format!(
        r#"{{"name":"Mass","startTime":"2024-01-07T10:00:00","resources":[{{"name":"Door","resourceTypeId":{}}}]}}"#,
        created.id
    );
    call(&app, json_request("POST", "/api/events", &body)).await;

    let resp = call(&app, empty_request("DELETE", &format!("/api/resourcetypes/{}", created.id))).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(db.read().await.events[0].resources[0].resource_type_id.is_none());
}

// --- templates ---

#[tokio::test]
async fn template_round_trip_through_event() {
    let app = app();
    let event = create_fair(&app).await;

    let resp = call(
        &app,
        json_request("POST", &format!("/api/events/{}/template", event.id), r#"{"name":"Fair template"}"#),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let template: Template = body_json(resp).await;
    assert_eq!(template.resources.len(), 1);

    let resp = call(
        &app,
        json_request("POST", &format!("/api/events/template/{}", template.id), r#"{"startDate":"2024-02-01"}"#),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Event = body_json(resp).await;
    assert_eq!(created.name, "Fair template");
    assert_eq!(created.start_time.as_deref(), Some("2024-02-01T09:00:00"));
    assert_eq!(created.resources[0].name, "Gate");

    let resp = call(&app, empty_request("GET", "/api/templates")).await;
    let templates: Vec<Template> = body_json(resp).await;
    assert_eq!(templates.len(), 1);
}
