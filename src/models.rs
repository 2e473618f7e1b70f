use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Category value that means "no filtering" when passed as a list filter.
pub const ALL_CATEGORIES: &str = "All";

/// Author recorded when the caller does not name one.
pub const DEFAULT_AUTHOR: &str = "Anonymous";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("category cannot be empty")]
pub struct EmptyCategory;

/// Open-ended category name. Any non-blank string is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Category(String);

impl Category {
    pub fn new(name: impl Into<String>) -> Result<Self, EmptyCategory> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(EmptyCategory);
        }
        Ok(Self(name))
    }

    /// Turns a raw `?category=` value into an equality filter.
    /// Absent, empty and `"All"` all mean the full list.
    pub fn filter_from(raw: Option<&str>) -> Option<Self> {
        raw.filter(|name| *name != ALL_CATEGORIES)
            .and_then(|name| Self::new(name).ok())
    }

    /// For built-in names known to be non-blank.
    pub(crate) fn known(name: &str) -> Self {
        Self(name.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Category {
    type Error = EmptyCategory;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        category.0
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One catalog entry. `id` and `created_at` are assigned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: Category,
    pub code: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub author_name: String,
    pub preview_image: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Component {
    pub fn new(data: NewComponent) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: data.name,
            description: data.description,
            category: data.category,
            code: data.code,
            tags: data.tags,
            author_name: data
                .author_name
                .unwrap_or_else(|| DEFAULT_AUTHOR.to_string()),
            preview_image: data.preview_image,
            created_at: Utc::now(),
        }
    }

    /// Case-insensitive substring match over name, description and tags.
    /// An empty query matches every record.
    pub fn matches_query(&self, query: &str) -> bool {
        let needle = query.to_lowercase();

        self.name.to_lowercase().contains(&needle)
            || self.description.to_lowercase().contains(&needle)
            || self
                .tags
                .iter()
                .any(|tag| tag.to_lowercase().contains(&needle))
    }
}

/// Validated input for creating a component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComponent {
    pub name: String,
    pub description: String,
    pub category: Category,
    pub code: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub author_name: Option<String>,
    #[serde(default)]
    pub preview_image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub components: usize,
}
