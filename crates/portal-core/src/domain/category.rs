use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// What kind of entries a category groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CategoryType {
    Location,
    Post,
}

impl CategoryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryType::Location => "LOCATION",
            CategoryType::Post => "POST",
        }
    }
}

impl fmt::Display for CategoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CategoryType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LOCATION" => Ok(CategoryType::Location),
            "POST" => Ok(CategoryType::Post),
            _ => Err(DomainError::validation(format!(
                "Invalid category type '{s}', expected LOCATION or POST"
            ))),
        }
    }
}

/// Category entity - groups locations or posts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub category_type: CategoryType,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Category {
    pub const MAX_NAME_LEN: usize = 100;
    pub const MAX_ICON_LEN: usize = 50;

    /// Create a new category from validated input.
    pub fn new(input: CategoryInput) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: input.name.trim().to_string(),
            category_type: input.category_type,
            description: input.description,
            icon: input.icon,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace every editable field.
    pub fn apply(&mut self, input: CategoryInput) {
        self.name = input.name.trim().to_string();
        self.category_type = input.category_type;
        self.description = input.description;
        self.icon = input.icon;
        self.updated_at = Utc::now();
    }
}

/// Create/replace payload for a category.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryInput {
    pub name: String,
    #[serde(rename = "type")]
    pub category_type: CategoryType,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
}

impl CategoryInput {
    pub fn validate(&self) -> Result<(), DomainError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("Category name must not be blank"));
        }
        if name.chars().count() > Category::MAX_NAME_LEN {
            return Err(DomainError::validation(format!(
                "Category name must be at most {} characters",
                Category::MAX_NAME_LEN
            )));
        }
        if let Some(icon) = &self.icon {
            if icon.chars().count() > Category::MAX_ICON_LEN {
                return Err(DomainError::validation(format!(
                    "Icon must be at most {} characters",
                    Category::MAX_ICON_LEN
                )));
            }
        }
        Ok(())
    }
}

/// How to treat locations and posts still referencing a category on delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeletePolicy {
    /// Refuse while any location or post references the category.
    #[default]
    Restrict,
    /// Remove the category together with everything referencing it.
    Cascade,
}

impl DeletePolicy {
    pub fn from_force(force: bool) -> Self {
        if force {
            DeletePolicy::Cascade
        } else {
            DeletePolicy::Restrict
        }
    }
}
