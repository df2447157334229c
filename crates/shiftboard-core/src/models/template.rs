use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A reusable event blueprint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Body of `POST /api/events/{id}/template`
#[derive(Debug, Clone, Serialize)]
pub struct NewTemplateFromEvent<'a> {
    pub name: &'a str,
}

/// Body of `POST /api/events/template/{id}`; serializes the date as `YYYY-MM-DD`
#[derive(Debug, Clone, Serialize)]
pub struct NewEventFromTemplate {
    #[serde(rename = "startDate")]
    pub start_date: NaiveDate,
}

impl Template {
    pub fn named(name: &str) -> Self {
        Self {
            id: 0,
            name: name.to_string(),
            extra: Map::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_from_template_body_uses_date_only() {
        let body = NewEventFromTemplate {
            start_date: NaiveDate::from_ymd_opt(2024, 5, 4).unwrap(),
        };
        assert_eq!(serde_json::to_value(&body).unwrap(), json!({ "startDate": "2024-05-04" }));
    }

    #[test]
    fn test_template_defaults() {
        let template: Template = serde_json::from_value(json!({ "id": 3 })).unwrap();
        assert_eq!(template.name, "");
        assert!(template.extra.is_empty());
    }
}
