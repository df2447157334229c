//! In-memory cache of events, resource types and templates, kept in step
//! with the server.
//!
//! Every mutating method sends exactly one request (resource type changes
//! send a second one to refetch the list) and touches local state only after
//! the server answered with a success status and a decodable body. A failed
//! call therefore leaves the cache as it was.
//!
//! Shift owners are found by scanning events and their resources in cache
//! order; resource ids are unique across events, so the first match wins.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::api::{ApiClient, ApiRequest, ApiResponse, Transport};
use crate::models::{
    Event, EventResource, NewEventFromTemplate, NewShift, NewTemplateFromEvent, ResourceType,
    Shift, Template, User,
};
use crate::utils::{day_bounds, next_day, parse_date, query_date};

pub struct EventStore<T: Transport = ApiClient> {
    api: T,
    selected_event: Option<Event>,
    events: Vec<Event>,
    resource_types: Vec<ResourceType>,
    templates: Vec<Template>,
}

impl<T: Transport> EventStore<T> {
    pub fn new(api: T) -> Self {
        Self {
            api,
            selected_event: None,
            events: Vec::new(),
            resource_types: Vec::new(),
            templates: Vec::new(),
        }
    }

    pub fn api(&self) -> &T {
        &self.api
    }

    pub fn selected_event(&self) -> Option<&Event> {
        self.selected_event.as_ref()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn resource_types(&self) -> &[ResourceType] {
        &self.resource_types
    }

    pub fn templates(&self) -> &[Template] {
        &self.templates
    }

    /// Cached resource with the given id, searched in cache order
    pub fn resource(&self, resource_id: i64) -> Option<&EventResource> {
        self.events
            .iter()
            .flat_map(|e| e.resources.iter())
            .find(|r| r.id == resource_id)
    }

    /// Cached shift with the given id
    pub fn shift(&self, shift_id: i64) -> Option<&Shift> {
        self.events
            .iter()
            .flat_map(|e| e.resources.iter())
            .find_map(|r| r.shift(shift_id))
    }

    fn resource_mut(&mut self, resource_id: i64) -> Option<&mut EventResource> {
        self.events
            .iter_mut()
            .flat_map(|e| e.resources.iter_mut())
            .find(|r| r.id == resource_id)
    }

    // ===== Request helpers =====

    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let method = request.method.clone();
        let path = request.path.clone();
        let response = self.api.send(request).await?;
        response
            .error_for_status()
            .with_context(|| format!("{} {} failed", method, path))
    }

    /// Send a request and decode the JSON body
    async fn fetch<R: DeserializeOwned>(&self, request: ApiRequest) -> Result<R> {
        let path = request.path.clone();
        let response = self.send(request).await?;
        response
            .json()
            .with_context(|| format!("Failed to parse JSON response from {}", path))
    }

    /// Send a request whose response body is not needed
    async fn execute(&self, request: ApiRequest) -> Result<()> {
        self.send(request).await.map(|_| ())
    }

    // ===== Events =====

    /// Load all events between `start` and `end` (both inclusive), replacing
    /// the cached list.
    pub async fn get_events_for_dates(&mut self, start: &str, end: &str) -> Result<()> {
        let start_date = parse_date(start).context("Invalid start date")?;
        let end_date = parse_date(end).context("Invalid end date")?;
        let end_exclusive = next_day(end_date)?;

        let request = ApiRequest::get("/api/events")
            .query("start", query_date(start_date))
            .query("end", query_date(end_exclusive));
        let events: Vec<Event> = self.fetch(request).await?;

        info!(count = events.len(), start = %start_date, end = %end_date, "Events loaded");
        self.events = events;
        Ok(())
    }

    /// Cached events starting strictly inside the given day.
    ///
    /// Both bounds are exclusive: an event starting exactly at midnight of
    /// `date` is not included. Events without a parseable start are skipped.
    pub fn events_for_date(&self, date: NaiveDate) -> Vec<&Event> {
        let Some((start, end)) = day_bounds(date) else {
            return Vec::new();
        };
        self.events
            .iter()
            .filter(|e| e.start().is_some_and(|t| t > start && t < end))
            .collect()
    }

    /// Create an event. The cache is not changed; the created event is returned.
    pub async fn add_event(&mut self, event: &Event) -> Result<Event> {
        let created: Event = self.fetch(ApiRequest::post("/api/events").json(event)?).await?;
        debug!(id = created.id, "Event created");
        Ok(created)
    }

    pub async fn get_event(&mut self, id: i64) -> Result<()> {
        let event: Event = self.fetch(ApiRequest::get(format!("/api/events/{}", id))).await?;
        self.selected_event = Some(event);
        Ok(())
    }

    /// Delete an event, clear the selection and drop it from the cached list
    pub async fn delete_event(&mut self, id: i64) -> Result<()> {
        self.execute(ApiRequest::delete(format!("/api/events/{}", id))).await?;
        self.selected_event = None;
        self.events.retain(|e| e.id != id);
        debug!(id, remaining = self.events.len(), "Event deleted");
        Ok(())
    }

    /// Replace an event on the server and select the server's copy
    pub async fn update_event(&mut self, id: i64, event: &Event) -> Result<()> {
        let request = ApiRequest::put(format!("/api/events/{}", id)).json(event)?;
        let updated: Event = self.fetch(request).await?;
        self.selected_event = Some(updated);
        Ok(())
    }

    // ===== Resource types =====
    // Every change refetches the whole list so server-side side effects show up.

    pub async fn create_resource_type(&mut self, resource_type: &ResourceType) -> Result<()> {
        self.execute(ApiRequest::post("/api/resourcetypes").json(resource_type)?)
            .await?;
        self.get_resource_types().await
    }

    pub async fn update_resource_type(&mut self, resource_type: &ResourceType) -> Result<()> {
        let request =
            ApiRequest::put(format!("/api/resourcetypes/{}", resource_type.id)).json(resource_type)?;
        self.execute(request).await?;
        self.get_resource_types().await
    }

    pub async fn delete_resource_type(&mut self, resource_type: &ResourceType) -> Result<()> {
        self.execute(ApiRequest::delete(format!("/api/resourcetypes/{}", resource_type.id)))
            .await?;
        self.get_resource_types().await
    }

    pub async fn get_resource_types(&mut self) -> Result<()> {
        let types: Vec<ResourceType> = self.fetch(ApiRequest::get("/api/resourcetypes")).await?;
        debug!(count = types.len(), "Resource types loaded");
        self.resource_types = types;
        Ok(())
    }

    // ===== Shifts =====

    /// Assign `user` to `parent` for the resource's whole time window and
    /// append the created shift to the owning cached resource.
    pub async fn add_shift(&mut self, parent: &EventResource, user: &User) -> Result<()> {
        let body = NewShift::for_resource(parent, user);
        let request = ApiRequest::post(format!("/api/resources/{}/shifts", parent.id)).json(&body)?;
        let shift: Shift = self.fetch(request).await?;

        let shift_id = shift.id;
        let owner_id = shift.event_resource_id;
        match self.resource_mut(owner_id) {
            Some(resource) => {
                resource.shifts.push(shift);
                debug!(shift_id, resource_id = owner_id, "Shift added");
            }
            None => warn!(shift_id, resource_id = owner_id, "Created shift has no cached owner"),
        }
        Ok(())
    }

    /// Delete a shift. The server answers with the deleted shift, whose
    /// `eventResourceId` names the resource to remove it from.
    pub async fn delete_shift(&mut self, shift: &Shift) -> Result<()> {
        let deleted: Shift = self
            .fetch(ApiRequest::delete(format!("/api/shifts/{}", shift.id)))
            .await?;

        let owner_id = deleted.event_resource_id;
        match self.resource_mut(owner_id) {
            Some(resource) => {
                resource.shifts.retain(|s| s.id != deleted.id);
                debug!(shift_id = deleted.id, resource_id = owner_id, "Shift deleted");
            }
            None => warn!(shift_id = deleted.id, resource_id = owner_id, "Deleted shift has no cached owner"),
        }
        Ok(())
    }

    /// Send the full shift and patch the cached copy in place: user, start,
    /// end and comment change; id, owner and position in the list do not.
    pub async fn update_shift(&mut self, shift: &Shift) -> Result<()> {
        let request = ApiRequest::put(format!("/api/shifts/{}", shift.id)).json(shift)?;
        let updated: Shift = self.fetch(request).await?;

        let shift_id = updated.id;
        let owner_id = updated.event_resource_id;
        let Some(resource) = self.resource_mut(owner_id) else {
            warn!(shift_id, resource_id = owner_id, "Updated shift has no cached owner");
            return Ok(());
        };
        match resource.shifts.iter_mut().find(|s| s.id == shift_id) {
            Some(cached) => {
                cached.apply_update(updated);
                debug!(shift_id, resource_id = owner_id, "Shift updated");
            }
            None => warn!(shift_id, resource_id = owner_id, "Updated shift not found in its resource"),
        }
        Ok(())
    }

    // ===== Templates =====

    pub async fn get_templates(&mut self) -> Result<()> {
        let templates: Vec<Template> = self.fetch(ApiRequest::get("/api/templates")).await?;
        debug!(count = templates.len(), "Templates loaded");
        self.templates = templates;
        Ok(())
    }

    /// Create a template. The cached list is left alone; call `get_templates`
    /// to refresh it.
    pub async fn add_template(&mut self, template: &Template) -> Result<Template> {
        self.fetch(ApiRequest::post("/api/templates").json(template)?)
            .await
    }

    pub async fn create_template_from_event(&mut self, event_id: i64, name: &str) -> Result<Template> {
        let request = ApiRequest::post(format!("/api/events/{}/template", event_id))
            .json(&NewTemplateFromEvent { name })?;
        self.fetch(request).await
    }

    /// Instantiate a template on `date` and append the new event to the cache
    pub async fn create_event_from_template(&mut self, template_id: i64, date: NaiveDate) -> Result<()> {
        let request = ApiRequest::post(format!("/api/events/template/{}", template_id))
            .json(&NewEventFromTemplate { start_date: date })?;
        let event: Event = self.fetch(request).await?;
        debug!(id = event.id, template_id, "Event created from template");
        self.events.push(event);
        Ok(())
    }
}
