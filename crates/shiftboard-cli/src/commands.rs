//! Command parsing and execution.

use anyhow::{anyhow, bail, Context, Result};
use chrono::NaiveDate;
use serde_json::Value;
use shiftboard_core::models::{Event, ResourceType, Template, User};
use shiftboard_core::utils::parse_date;
use shiftboard_core::{Config, EventStore, Transport};

use crate::render;

pub const USAGE: &str = "\
Usage: shiftboard <command> [args]

Configuration:
  configure <api-url> [token]              Save the API URL (and bearer token)

Events:
  events <start> <end>                     List events between two dates (inclusive)
  day <date>                               List events starting on a date
  event <id>                               Show an event with its resources and shifts
  add-event <name> <start> <end>           Create an event (ISO timestamps)
  rename-event <id> <name>                 Rename an event
  delete-event <id>                        Delete an event

Shifts (the date is the day of the owning event):
  add-shift <date> <resource-id> <user-id>
  remove-shift <date> <shift-id>
  comment-shift <date> <shift-id> <comment>

Resource types:
  resource-types                           List resource types
  add-resource-type <name>
  rename-resource-type <id> <name>
  delete-resource-type <id>

Templates:
  templates                                List templates
  add-template <name>
  template-from-event <event-id> <name>
  event-from-template <template-id> <date>

Environment: SHIFTBOARD_API_URL, SHIFTBOARD_TOKEN, SHIFTBOARD_TIMEOUT_SECS, RUST_LOG";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Help,
    Configure { api_url: String, token: Option<String> },
    Events { start: String, end: String },
    Day { date: NaiveDate },
    Event { id: i64 },
    AddEvent { name: String, start: String, end: String },
    RenameEvent { id: i64, name: String },
    DeleteEvent { id: i64 },
    AddShift { date: NaiveDate, resource_id: i64, user_id: i64 },
    RemoveShift { date: NaiveDate, shift_id: i64 },
    CommentShift { date: NaiveDate, shift_id: i64, comment: String },
    ResourceTypes,
    AddResourceType { name: String },
    RenameResourceType { id: i64, name: String },
    DeleteResourceType { id: i64 },
    Templates,
    AddTemplate { name: String },
    TemplateFromEvent { event_id: i64, name: String },
    EventFromTemplate { template_id: i64, date: NaiveDate },
}

fn parse_id(raw: &str, what: &str) -> Result<i64> {
    raw.parse().with_context(|| format!("Invalid {}: {:?}", what, raw))
}

impl Command {
    pub fn parse(args: &[String]) -> Result<Self> {
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        let command = match args.as_slice() {
            [] | ["help"] | ["--help"] | ["-h"] => Command::Help,
            ["configure", url] => Command::Configure { api_url: url.to_string(), token: None },
            ["configure", url, token] => Command::Configure {
                api_url: url.to_string(),
                token: Some(token.to_string()),
            },
            ["events", start, end] => {
                // validate early so typos fail before any request
                parse_date(start)?;
                parse_date(end)?;
                Command::Events { start: start.to_string(), end: end.to_string() }
            }
            ["day", date] => Command::Day { date: parse_date(date)? },
            ["event", id] => Command::Event { id: parse_id(id, "event id")? },
            ["add-event", name, start, end] => Command::AddEvent {
                name: name.to_string(),
                start: start.to_string(),
                end: end.to_string(),
            },
            ["rename-event", id, name] => Command::RenameEvent {
                id: parse_id(id, "event id")?,
                name: name.to_string(),
            },
            ["delete-event", id] => Command::DeleteEvent { id: parse_id(id, "event id")? },
            ["add-shift", date, resource_id, user_id] => Command::AddShift {
                date: parse_date(date)?,
                resource_id: parse_id(resource_id, "resource id")?,
                user_id: parse_id(user_id, "user id")?,
            },
            ["remove-shift", date, shift_id] => Command::RemoveShift {
                date: parse_date(date)?,
                shift_id: parse_id(shift_id, "shift id")?,
            },
            ["comment-shift", date, shift_id, comment] => Command::CommentShift {
                date: parse_date(date)?,
                shift_id: parse_id(shift_id, "shift id")?,
                comment: comment.to_string(),
            },
            ["resource-types"] => Command::ResourceTypes,
            ["add-resource-type", name] => Command::AddResourceType { name: name.to_string() },
            ["rename-resource-type", id, name] => Command::RenameResourceType {
                id: parse_id(id, "resource type id")?,
                name: name.to_string(),
            },
            ["delete-resource-type", id] => Command::DeleteResourceType {
                id: parse_id(id, "resource type id")?,
            },
            ["templates"] => Command::Templates,
            ["add-template", name] => Command::AddTemplate { name: name.to_string() },
            ["template-from-event", event_id, name] => Command::TemplateFromEvent {
                event_id: parse_id(event_id, "event id")?,
                name: name.to_string(),
            },
            ["event-from-template", template_id, date] => Command::EventFromTemplate {
                template_id: parse_id(template_id, "template id")?,
                date: parse_date(date)?,
            },
            [other, ..] => bail!("Unknown command or wrong arguments: {}", other),
        };
        Ok(command)
    }
}

pub fn configure(api_url: String, token: Option<String>) -> Result<()> {
    let mut config = Config::load_file()?;
    config.api_url = Some(api_url);
    if token.is_some() {
        config.token = token;
    }
    let path = config.save()?;
    println!("Saved configuration to {}", path.display());
    Ok(())
}

/// Load the events of `date` so their resources and shifts are cached
async fn load_day<T: Transport>(store: &mut EventStore<T>, date: NaiveDate) -> Result<()> {
    let day = date.format("%Y-%m-%d").to_string();
    store.get_events_for_dates(&day, &day).await
}

async fn resource_type_by_id<T: Transport>(store: &mut EventStore<T>, id: i64) -> Result<ResourceType> {
    store.get_resource_types().await?;
    store
        .resource_types()
        .iter()
        .find(|t| t.id == id)
        .cloned()
        .ok_or_else(|| anyhow!("No resource type with id {}", id))
}

fn set_name(extra: &mut serde_json::Map<String, Value>, name: String) {
    extra.insert("name".to_string(), Value::String(name));
}

pub async fn execute<T: Transport>(store: &mut EventStore<T>, command: Command) -> Result<()> {
    match command {
        Command::Help => println!("{}", USAGE),
        Command::Configure { api_url, token } => configure(api_url, token)?,

        // ===== Events =====
        Command::Events { start, end } => {
            store.get_events_for_dates(&start, &end).await?;
            render::print_events(store.events().iter());
        }
        Command::Day { date } => {
            load_day(store, date).await?;
            let events = store.events_for_date(date);
            if events.is_empty() {
                println!("No events on {}", date);
            }
            render::print_events(events.into_iter());
        }
        Command::Event { id } => {
            store.get_event(id).await?;
            if let Some(event) = store.selected_event() {
                render::print_event_detail(event);
            }
        }
        Command::AddEvent { name, start, end } => {
            let mut event: Event = serde_json::from_value(serde_json::json!({
                "startTime": start,
                "endTime": end,
            }))?;
            set_name(&mut event.extra, name);
            let created = store.add_event(&event).await?;
            println!("Created event {} ({})", created.id, created.name());
        }
        Command::RenameEvent { id, name } => {
            store.get_event(id).await?;
            let mut event = store
                .selected_event()
                .cloned()
                .ok_or_else(|| anyhow!("Event {} was not loaded", id))?;
            set_name(&mut event.extra, name);
            store.update_event(id, &event).await?;
            if let Some(updated) = store.selected_event() {
                render::print_event_detail(updated);
            }
        }
        Command::DeleteEvent { id } => {
            store.delete_event(id).await?;
            println!("Deleted event {}", id);
        }

        // ===== Shifts =====
        Command::AddShift { date, resource_id, user_id } => {
            load_day(store, date).await?;
            let parent = store
                .resource(resource_id)
                .cloned()
                .ok_or_else(|| anyhow!("No resource {} in events on {}", resource_id, date))?;
            store.add_shift(&parent, &User::new(user_id)).await?;
            if let Some(resource) = store.resource(resource_id) {
                render::print_resource(resource);
            }
        }
        Command::RemoveShift { date, shift_id } => {
            load_day(store, date).await?;
            let shift = store
                .shift(shift_id)
                .cloned()
                .ok_or_else(|| anyhow!("No shift {} in events on {}", shift_id, date))?;
            store.delete_shift(&shift).await?;
            println!("Removed shift {}", shift_id);
        }
        Command::CommentShift { date, shift_id, comment } => {
            load_day(store, date).await?;
            let mut shift = store
                .shift(shift_id)
                .cloned()
                .ok_or_else(|| anyhow!("No shift {} in events on {}", shift_id, date))?;
            shift.comment = Some(comment);
            store.update_shift(&shift).await?;
            if let Some(updated) = store.shift(shift_id) {
                render::print_shift(updated);
            }
        }

        // ===== Resource types =====
        Command::ResourceTypes => {
            store.get_resource_types().await?;
            render::print_resource_types(store.resource_types());
        }
        Command::AddResourceType { name } => {
            store.create_resource_type(&ResourceType::named(&name)).await?;
            render::print_resource_types(store.resource_types());
        }
        Command::RenameResourceType { id, name } => {
            let mut resource_type = resource_type_by_id(store, id).await?;
            set_name(&mut resource_type.extra, name);
            store.update_resource_type(&resource_type).await?;
            render::print_resource_types(store.resource_types());
        }
        Command::DeleteResourceType { id } => {
            let resource_type = resource_type_by_id(store, id).await?;
            store.delete_resource_type(&resource_type).await?;
            render::print_resource_types(store.resource_types());
        }

        // ===== Templates =====
        Command::Templates => {
            store.get_templates().await?;
            render::print_templates(store.templates());
        }
        Command::AddTemplate { name } => {
            let created = store.add_template(&Template::named(&name)).await?;
            println!("Created template {} ({})", created.id, created.name);
        }
        Command::TemplateFromEvent { event_id, name } => {
            let created = store.create_template_from_event(event_id, &name).await?;
            println!("Created template {} ({}) from event {}", created.id, created.name, event_id);
        }
        Command::EventFromTemplate { template_id, date } => {
            store.create_event_from_template(template_id, date).await?;
            if let Some(event) = store.events().last() {
                render::print_event_detail(event);
            }
        }
    }
    Ok(())
}
