mod agent;
mod catalog;
mod contact;
mod project;
mod property;
mod story;
mod user;

pub use agent::{Agent, AgentDraft, NewAgentAccount};
pub use catalog::{Category, CategoryDraft, Service, ServiceDraft};
pub use contact::{Contact, ContactDraft, ContactStatus, ContactUpdate};
pub use project::{Project, ProjectDraft, ProjectStatus};
pub use property::{Property, PropertyDraft};
pub use story::{MediaType, Story, StoryDraft, StoryUpdate};
pub use user::{Role, User};

use std::fmt;
use thiserror::Error;

/// Rejected input on a create or update payload
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {reason}")]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

pub(crate) fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "must not be empty"));
    }
    Ok(())
}

/// Path segment addressing a record either by numeric id or by slug
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceKey {
    Id(i64),
    Slug(String),
}

impl ResourceKey {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().parse::<i64>() {
            Ok(id) => ResourceKey::Id(id),
            Err(_) => ResourceKey::Slug(raw.trim().to_lowercase()),
        }
    }
}

impl From<i64> for ResourceKey {
    fn from(id: i64) -> Self {
        ResourceKey::Id(id)
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKey::Id(id) => write!(f, "{}", id),
            ResourceKey::Slug(slug) => f.write_str(slug),
        }
    }
}

/// Lowercase ASCII slug: alphanumerics kept, every other run collapsed to one dash
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;

    for c in input.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_key_parse() {
        assert_eq!(ResourceKey::parse("42"), ResourceKey::Id(42));
        assert_eq!(
            ResourceKey::parse("Ocean-View-Villa"),
            ResourceKey::Slug("ocean-view-villa".to_string())
        );
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Ocean View Villa"), "ocean-view-villa");
        assert_eq!(slugify("  3-Bed  Apartment, Hodan!  "), "3-bed-apartment-hodan");
        assert_eq!(slugify("!!!"), "");
    }
}
