//! Plain-text output for the CLI.

use shiftboard_core::models::{Event, EventResource, ResourceType, Shift, Template};
use shiftboard_core::utils::{format_optional, format_time_range, truncate_string};

/// Column width for event names in lists
const NAME_WIDTH: usize = 32;

pub fn print_events<'a>(events: impl Iterator<Item = &'a Event>) {
    for event in events {
        println!(
            "{:>6}  {:<width$}  {:<28}  {} resources, {} shifts",
            event.id,
            truncate_string(event.name(), NAME_WIDTH),
            event.formatted_time_range(),
            event.resources.len(),
            event.shift_count(),
            width = NAME_WIDTH,
        );
    }
}

pub fn print_event_detail(event: &Event) {
    println!("Event {}: {}", event.id, event.name());
    println!("  When: {}", event.formatted_time_range());
    if event.resources.is_empty() {
        println!("  (no resources)");
    }
    for resource in &event.resources {
        print_resource(resource);
    }
}

pub fn print_resource(resource: &EventResource) {
    println!(
        "  Resource {}: {} [{}]",
        resource.id,
        resource.name(),
        format_time_range(resource.start_time.as_deref(), resource.end_time.as_deref())
    );
    for shift in &resource.shifts {
        print_shift(shift);
    }
}

pub fn print_shift(shift: &Shift) {
    println!(
        "    Shift {}: {} {} {}",
        shift.id,
        shift.display_user(),
        shift.formatted_time_range(),
        format_optional(&shift.comment, ""),
    );
}

pub fn print_resource_types(types: &[ResourceType]) {
    if types.is_empty() {
        println!("No resource types");
    }
    for resource_type in types {
        println!("{:>6}  {}", resource_type.id, resource_type.name());
    }
}

pub fn print_templates(templates: &[Template]) {
    if templates.is_empty() {
        println!("No templates");
    }
    for template in templates {
        println!("{:>6}  {}", template.id, template.name);
    }
}
