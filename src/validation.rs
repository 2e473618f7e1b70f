use crate::models::{Category, NewComponent};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One problem with one input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Checks a create-component body field by field. Every problem found is
/// reported, not only the first.
pub fn validate_new_component(body: &Value) -> Result<NewComponent, Vec<FieldError>> {
    let Some(object) = body.as_object() else {
        return Err(vec![FieldError::new("body", "Expected a JSON object")]);
    };

    let mut errors = Vec::new();

    let name = required_string(object, "name", true, &mut errors);
    let description = required_string(object, "description", false, &mut errors);
    let category = required_string(object, "category", true, &mut errors);
    let code = required_string(object, "code", false, &mut errors);
    let tags = optional_tags(object, &mut errors);
    let author_name = optional_string(object, "authorName", &mut errors);
    let preview_image = optional_string(object, "previewImage", &mut errors);

    match (name, description, category, code) {
        (Some(name), Some(description), Some(category), Some(code)) if errors.is_empty() => {
            match Category::new(category) {
                Ok(category) => Ok(NewComponent {
                    name,
                    description,
                    category,
                    code,
                    tags,
                    author_name,
                    preview_image,
                }),
                Err(err) => Err(vec![FieldError::new("category", err.to_string())]),
            }
        }
        _ => Err(errors),
    }
}

fn required_string(
    object: &Map<String, Value>,
    field: &str,
    non_blank: bool,
    errors: &mut Vec<FieldError>,
) -> Option<String> {
    match object.get(field) {
        None | Some(Value::Null) => {
            errors.push(FieldError::new(field, "Required"));
            None
        }
        Some(Value::String(s)) if non_blank && s.trim().is_empty() => {
            errors.push(FieldError::new(field, "Cannot be empty"));
            None
        }
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => {
            errors.push(FieldError::new(field, "Expected a string"));
            None
        }
    }
}

fn optional_string(
    object: &Map<String, Value>,
    field: &str,
    errors: &mut Vec<FieldError>,
) -> Option<String> {
    match object.get(field) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => {
            errors.push(FieldError::new(field, "Expected a string"));
            None
        }
    }
}

fn optional_tags(object: &Map<String, Value>, errors: &mut Vec<FieldError>) -> Vec<String> {
    let items = match object.get("tags") {
        None | Some(Value::Null) => return Vec::new(),
        Some(Value::Array(items)) => items,
        Some(_) => {
            errors.push(FieldError::new("tags", "Expected an array of strings"));
            return Vec::new();
        }
    };

    let mut tags = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        match item {
            Value::String(tag) => tags.push(tag.clone()),
            _ => errors.push(FieldError::new(format!("tags[{}]", i), "Expected a string")),
        }
    }
    tags
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(errors: &[FieldError]) -> Vec<&str> {
        errors.iter().map(|e| e.field.as_str()).collect()
    }

    #[test]
    fn accepts_required_fields_alone() {
        let body = json!({
            "name": "Chip",
            "description": "",
            "category": "Chips",
            "code": "fun Chip() {}"
        });

        let component = validate_new_component(&body).unwrap();
        assert_eq!(component.name, "Chip");
        assert_eq!(component.category.as_str(), "Chips");
        assert!(component.tags.is_empty());
        assert!(component.author_name.is_none());
        assert!(component.preview_image.is_none());
    }

    #[test]
    fn accepts_optional_fields_and_nulls() {
        let body = json!({
            "name": "Chip",
            "description": "A chip",
            "category": "Chips",
            "code": "fun Chip() {}",
            "tags": ["chip", "input"],
            "authorName": "Ada",
            "previewImage": null
        });

        let component = validate_new_component(&body).unwrap();
        assert_eq!(component.tags, vec!["chip", "input"]);
        assert_eq!(component.author_name.as_deref(), Some("Ada"));
    }

    #[test]
    fn reports_every_missing_required_field() {
        let errors = validate_new_component(&json!({ "name": "X" })).unwrap_err();
        assert_eq!(fields(&errors), vec!["description", "category", "code"]);
        assert!(errors.iter().all(|e| e.message == "Required"));
    }

    #[test]
    fn rejects_wrong_types_and_blank_names() {
        let body = json!({
            "name": "  ",
            "description": 7,
            "category": "Chips",
            "code": "x",
            "tags": ["ok", 3],
            "authorName": false
        });

        let errors = validate_new_component(&body).unwrap_err();
        assert_eq!(
            fields(&errors),
            vec!["name", "description", "tags[1]", "authorName"]
        );
    }

    #[test]
    fn rejects_non_object_bodies() {
        let errors = validate_new_component(&json!(["name"])).unwrap_err();
        assert_eq!(errors, vec![FieldError::new("body", "Expected a JSON object")]);
    }
}
