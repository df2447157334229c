//! End-to-end tests of `ApiClient` + `EventStore` against the mock server.
//!
//! Each test starts its own server on a random port, so tests stay
//! independent and can run in parallel.

use chrono::NaiveDate;
use serde_json::json;
use shiftboard_core::models::{Event, ResourceType, Template, User};
use shiftboard_core::{ApiClient, ApiError, EventStore};
use tokio::net::TcpListener;

async fn start_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        mock_server::run(listener).await.unwrap();
    });
    format!("http://{addr}")
}

async fn new_store() -> EventStore {
    let base_url = start_server().await;
    EventStore::new(ApiClient::new(&base_url).unwrap())
}

fn draft_event(name: &str, start: &str, end: &str, resources: &[&str]) -> Event {
    let resources: Vec<_> = resources
        .iter()
        .map(|r| json!({ "id": 0, "name": r, "startTime": start, "endTime": end }))
        .collect();
    serde_json::from_value(json!({
        "name": name,
        "startTime": start,
        "endTime": end,
        "resources": resources,
    }))
    .unwrap()
}

#[tokio::test]
async fn event_lifecycle() {
    let mut store = new_store().await;

    let fair = store
        .add_event(&draft_event("Fair", "2024-01-02T09:00:00", "2024-01-02T17:00:00", &["Gate", "Bar"]))
        .await
        .unwrap();
    store
        .add_event(&draft_event("Late show", "2024-01-04T20:00:00", "2024-01-04T23:00:00", &[]))
        .await
        .unwrap();
    // adding does not cache
    assert!(store.events().is_empty());

    // end date is inclusive: the Jan 4 event is in range
    store.get_events_for_dates("2024-01-01", "2024-01-04").await.unwrap();
    assert_eq!(store.events().len(), 2);

    store.get_events_for_dates("2024-01-01", "2024-01-03").await.unwrap();
    assert_eq!(store.events().len(), 1);
    assert_eq!(store.events()[0].name(), "Fair");

    let day = store.events_for_date(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
    assert_eq!(day.len(), 1);

    store.get_event(fair.id).await.unwrap();
    let mut edited = store.selected_event().cloned().unwrap();
    edited.extra.insert("name".to_string(), json!("Winter fair"));
    store.update_event(fair.id, &edited).await.unwrap();
    assert_eq!(store.selected_event().unwrap().name(), "Winter fair");
    assert_eq!(store.selected_event().unwrap().resources.len(), 2);

    store.delete_event(fair.id).await.unwrap();
    assert!(store.selected_event().is_none());
    assert!(store.events().is_empty());

    let err = store.get_event(fair.id).await.unwrap_err();
    assert!(err.downcast_ref::<ApiError>().is_some_and(ApiError::is_not_found));
}

#[tokio::test]
async fn shift_assignment_flow() {
    let mut store = new_store().await;
    store
        .add_event(&draft_event("Fair", "2024-01-02T09:00:00", "2024-01-02T17:00:00", &["Gate"]))
        .await
        .unwrap();
    store
        .add_event(&draft_event("Market", "2024-01-02T10:00:00", "2024-01-02T14:00:00", &["Stall"]))
        .await
        .unwrap();
    store.get_events_for_dates("2024-01-02", "2024-01-02").await.unwrap();

    let gate = store.events()[0].resources[0].clone();
    let market_before = store.events()[1].clone();

    store.add_shift(&gate, &User::new(7)).await.unwrap();
    let shifts = &store.events()[0].resources[0].shifts;
    assert_eq!(shifts.len(), 1);
    assert_eq!(shifts[0].event_resource_id, gate.id);
    assert_eq!(shifts[0].start_time, gate.start_time);
    assert_eq!(shifts[0].display_user(), "User 7");
    assert_eq!(store.events()[1], market_before);

    let mut edited = shifts[0].clone();
    edited.comment = Some("bring keys".to_string());
    edited.end_time = Some("2024-01-02T11:00:00".to_string());
    store.update_shift(&edited).await.unwrap();
    let cached = store.shift(edited.id).unwrap();
    assert_eq!(cached.comment.as_deref(), Some("bring keys"));
    assert_eq!(cached.end_time.as_deref(), Some("2024-01-02T11:00:00"));

    store.delete_shift(&edited).await.unwrap();
    assert!(store.events()[0].resources[0].shifts.is_empty());
    assert_eq!(store.events()[1], market_before);
}

#[tokio::test]
async fn resource_types_are_refetched() {
    let mut store = new_store().await;

    store.create_resource_type(&ResourceType::named("Usher")).await.unwrap();
    store.create_resource_type(&ResourceType::named("Driver")).await.unwrap();
    assert_eq!(store.resource_types().len(), 2);

    let mut usher = store.resource_types()[0].clone();
    usher.extra.insert("name".to_string(), json!("Head usher"));
    store.update_resource_type(&usher).await.unwrap();
    assert_eq!(store.resource_types()[0].name(), "Head usher");

    store.delete_resource_type(&usher).await.unwrap();
    let names: Vec<&str> = store.resource_types().iter().map(|t| t.name()).collect();
    assert_eq!(names, vec!["Driver"]);

    let err = store
        .create_resource_type(&ResourceType::named(""))
        .await
        .unwrap_err();
    assert!(err.downcast_ref::<ApiError>().is_some());
    assert_eq!(store.resource_types().len(), 1);
}

#[tokio::test]
async fn templates_and_instantiation() {
    let mut store = new_store().await;
    let fair = store
        .add_event(&draft_event("Fair", "2024-01-02T09:00:00", "2024-01-02T17:00:00", &["Gate"]))
        .await
        .unwrap();

    let template = store.create_template_from_event(fair.id, "Fair template").await.unwrap();
    store.add_template(&Template::named("Blank")).await.unwrap();
    store.get_templates().await.unwrap();
    assert_eq!(store.templates().len(), 2);

    store.get_events_for_dates("2024-01-02", "2024-01-02").await.unwrap();
    store
        .create_event_from_template(template.id, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
        .await
        .unwrap();

    assert_eq!(store.events().len(), 2);
    let created = &store.events()[1];
    assert_eq!(created.name(), "Fair template");
    assert_eq!(created.resources[0].name(), "Gate");
}
