use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{require, ValidationError};
use crate::search::{PropertyType, Purpose};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub id: i64,
    pub slug: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price: i64,
    pub currency: String,
    pub purpose: Purpose,
    pub property_type: PropertyType,
    pub location: String,
    pub city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    pub bedrooms: u32,
    pub bathrooms: u32,
    /// Floor area in square metres
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area: Option<f64>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
    pub featured: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Property {
    /// Featured listings are only surfaced when an agent is attached to them.
    pub fn is_featured(&self) -> bool {
        self.featured && self.agent_id.is_some()
    }

    pub fn cover_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }
}

/// Create/replace payload for a property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDraft {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price: i64,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub purpose: Purpose,
    pub property_type: PropertyType,
    pub location: String,
    pub city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default)]
    pub bedrooms: u32,
    #[serde(default)]
    pub bathrooms: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area: Option<f64>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<i64>,
}

pub(crate) fn default_currency() -> String {
    "USD".to_string()
}

impl PropertyDraft {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("title", &self.title)?;
        require("location", &self.location)?;
        require("city", &self.city)?;
        if self.price < 0 {
            return Err(ValidationError::new("price", "must not be negative"));
        }
        if self.currency.len() != 3 {
            return Err(ValidationError::new("currency", "expected a 3-letter code"));
        }
        if matches!(self.area, Some(area) if area < 0.0) {
            return Err(ValidationError::new("area", "must not be negative"));
        }
        Ok(())
    }

    /// Slug to persist: the explicit one when given, otherwise derived from the title
    pub fn effective_slug(&self) -> String {
        match self.slug.as_deref().map(str::trim) {
            Some(slug) if !slug.is_empty() => super::slugify(slug),
            _ => super::slugify(&self.title),
        }
    }
}
