//! Listing filters.
//!
//! Each filter has one canonical query-string form: `to_query_pairs` builds it (only
//! set fields, in a fixed key order), `from_query_pairs` and serde read it back, and
//! `matches` applies the same filter to records already in memory. The API, the
//! stores and the client all go through these types so the wire values cannot drift.

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

use crate::models::{Agent, ProjectStatus, Project, Property, ValidationError};

// ============================================================================
// PURPOSE
// ============================================================================

/// Listing intent. Wire values are `Sale` / `Rent`; the UI labels them `Buy` / `Rent`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Purpose {
    #[default]
    Sale,
    Rent,
}

impl Purpose {
    pub fn as_wire(&self) -> &'static str {
        match self {
            Purpose::Sale => "Sale",
            Purpose::Rent => "Rent",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Purpose::Sale => "Buy",
            Purpose::Rent => "Rent",
        }
    }
}

impl fmt::Display for Purpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}

impl FromStr for Purpose {
    type Err = ValidationError;

    /// Accepts wire values and UI labels, case-insensitively
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sale" | "buy" => Ok(Purpose::Sale),
            "rent" => Ok(Purpose::Rent),
            other => Err(ValidationError::new("purpose", format!("unknown purpose '{}'", other))),
        }
    }
}

impl Serialize for Purpose {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_wire())
    }
}

impl<'de> Deserialize<'de> for Purpose {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

// ============================================================================
// PROPERTY TYPE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    Apartment,
    House,
    Villa,
    Townhouse,
    Land,
    Commercial,
}

impl PropertyType {
    pub const ALL: [PropertyType; 6] = [
        PropertyType::Apartment,
        PropertyType::House,
        PropertyType::Villa,
        PropertyType::Townhouse,
        PropertyType::Land,
        PropertyType::Commercial,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyType::Apartment => "apartment",
            PropertyType::House => "house",
            PropertyType::Villa => "villa",
            PropertyType::Townhouse => "townhouse",
            PropertyType::Land => "land",
            PropertyType::Commercial => "commercial",
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PropertyType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == needle)
            .ok_or_else(|| ValidationError::new("type", format!("unknown property type '{}'", s)))
    }
}

// ============================================================================
// LENIENT QUERY VALUES
// ============================================================================

/// Query values arrive as strings (`?min_beds=3`), JSON bodies as numbers.
/// Both are accepted; blank strings count as absent.
mod lenient {
    use super::*;

    struct OptionVisitor<T>(PhantomData<T>);

    impl<'de, T> Visitor<'de> for OptionVisitor<T>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        type Value = Option<T>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a string or number")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            let v = v.trim();
            if v.is_empty() {
                return Ok(None);
            }
            v.parse::<T>().map(Some).map_err(E::custom)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
            self.visit_str(&v.to_string())
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
            self.visit_str(&v.to_string())
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
            deserializer.deserialize_any(self)
        }
    }

    pub fn option<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: FromStr,
        T::Err: fmt::Display,
    {
        deserializer.deserialize_any(OptionVisitor(PhantomData))
    }

    pub fn purpose<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Purpose, D::Error> {
        Ok(option::<D, Purpose>(deserializer)?.unwrap_or_default())
    }
}

fn parse_field<T>(field: &'static str, raw: &str) -> Result<Option<T>, ValidationError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<T>()
        .map(Some)
        .map_err(|e| ValidationError::new(field, e.to_string()))
}

fn push_value<T: ToString>(pairs: &mut Vec<(&'static str, String)>, key: &'static str, value: Option<T>) {
    if let Some(value) = value {
        pairs.push((key, value.to_string()));
    }
}

fn push_text(pairs: &mut Vec<(&'static str, String)>, key: &'static str, value: Option<&str>) {
    if let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) {
        pairs.push((key, value.to_string()));
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.trim().to_lowercase())
}

fn within<T: PartialOrd>(value: T, min: Option<T>, max: Option<T>) -> bool {
    min.map_or(true, |m| value >= m) && max.map_or(true, |m| value <= m)
}

fn active_text(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

// ============================================================================
// PROPERTY FILTER
// ============================================================================

/// Search state of the property listing screens
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyFilter {
    #[serde(default, deserialize_with = "lenient::purpose")]
    pub purpose: Purpose,
    #[serde(default, deserialize_with = "lenient::option", skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(
        rename = "type",
        default,
        deserialize_with = "lenient::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub property_type: Option<PropertyType>,
    #[serde(default, deserialize_with = "lenient::option", skip_serializing_if = "Option::is_none")]
    pub min_beds: Option<u32>,
    #[serde(default, deserialize_with = "lenient::option", skip_serializing_if = "Option::is_none")]
    pub max_beds: Option<u32>,
    #[serde(default, deserialize_with = "lenient::option", skip_serializing_if = "Option::is_none")]
    pub min_baths: Option<u32>,
    #[serde(default, deserialize_with = "lenient::option", skip_serializing_if = "Option::is_none")]
    pub max_baths: Option<u32>,
    #[serde(default, deserialize_with = "lenient::option", skip_serializing_if = "Option::is_none")]
    pub min_price: Option<i64>,
    #[serde(default, deserialize_with = "lenient::option", skip_serializing_if = "Option::is_none")]
    pub max_price: Option<i64>,
    #[serde(default, deserialize_with = "lenient::option", skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
    #[serde(default, deserialize_with = "lenient::option", skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<i64>,
}

impl PropertyFilter {
    pub fn new(purpose: Purpose) -> Self {
        Self {
            purpose,
            ..Self::default()
        }
    }

    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn property_type(mut self, property_type: PropertyType) -> Self {
        self.property_type = Some(property_type);
        self
    }

    pub fn beds(mut self, min: Option<u32>, max: Option<u32>) -> Self {
        self.min_beds = min;
        self.max_beds = max;
        self
    }

    pub fn baths(mut self, min: Option<u32>, max: Option<u32>) -> Self {
        self.min_baths = min;
        self.max_baths = max;
        self
    }

    pub fn price(mut self, min: Option<i64>, max: Option<i64>) -> Self {
        self.min_price = min;
        self.max_price = max;
        self
    }

    pub fn agent(mut self, agent_id: i64) -> Self {
        self.agent_id = Some(agent_id);
        self
    }

    pub fn category(mut self, category_id: i64) -> Self {
        self.category_id = Some(category_id);
        self
    }

    /// Trimmed location, `None` when blank
    pub fn active_location(&self) -> Option<&str> {
        active_text(&self.location)
    }

    /// Canonical query parameters: `purpose` always, everything else only when set
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("purpose", self.purpose.as_wire().to_string())];
        push_text(&mut pairs, "location", self.location.as_deref());
        push_value(&mut pairs, "type", self.property_type);
        push_value(&mut pairs, "min_beds", self.min_beds);
        push_value(&mut pairs, "max_beds", self.max_beds);
        push_value(&mut pairs, "min_baths", self.min_baths);
        push_value(&mut pairs, "max_baths", self.max_baths);
        push_value(&mut pairs, "min_price", self.min_price);
        push_value(&mut pairs, "max_price", self.max_price);
        push_value(&mut pairs, "category_id", self.category_id);
        push_value(&mut pairs, "agent_id", self.agent_id);
        pairs
    }

    /// Inverse of `to_query_pairs`; unknown keys are ignored
    pub fn from_query_pairs<I, K, V>(pairs: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut filter = Self::default();
        for (key, value) in pairs {
            let value = value.as_ref();
            match key.as_ref() {
                "purpose" => filter.purpose = parse_field("purpose", value)?.unwrap_or_default(),
                "location" => filter.location = parse_field("location", value)?,
                "type" => filter.property_type = parse_field("type", value)?,
                "min_beds" => filter.min_beds = parse_field("min_beds", value)?,
                "max_beds" => filter.max_beds = parse_field("max_beds", value)?,
                "min_baths" => filter.min_baths = parse_field("min_baths", value)?,
                "max_baths" => filter.max_baths = parse_field("max_baths", value)?,
                "min_price" => filter.min_price = parse_field("min_price", value)?,
                "max_price" => filter.max_price = parse_field("max_price", value)?,
                "category_id" => filter.category_id = parse_field("category_id", value)?,
                "agent_id" => filter.agent_id = parse_field("agent_id", value)?,
                _ => {}
            }
        }
        Ok(filter)
    }

    pub fn matches(&self, property: &Property) -> bool {
        if property.purpose != self.purpose {
            return false;
        }
        if let Some(location) = self.active_location() {
            let hit = contains_ci(&property.location, location)
                || contains_ci(&property.city, location)
                || property
                    .region
                    .as_deref()
                    .is_some_and(|r| contains_ci(r, location));
            if !hit {
                return false;
            }
        }
        if self.property_type.is_some_and(|t| t != property.property_type) {
            return false;
        }
        if self.category_id.is_some() && self.category_id != property.category_id {
            return false;
        }
        if self.agent_id.is_some() && self.agent_id != property.agent_id {
            return false;
        }
        within(property.bedrooms, self.min_beds, self.max_beds)
            && within(property.bathrooms, self.min_baths, self.max_baths)
            && within(property.price, self.min_price, self.max_price)
    }
}

// ============================================================================
// AGENT FILTER
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentFilter {
    #[serde(default, deserialize_with = "lenient::option", skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "lenient::option", skip_serializing_if = "Option::is_none")]
    pub specialty: Option<String>,
    #[serde(default, deserialize_with = "lenient::option", skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl AgentFilter {
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        push_text(&mut pairs, "location", self.location.as_deref());
        push_text(&mut pairs, "specialty", self.specialty.as_deref());
        push_text(&mut pairs, "language", self.language.as_deref());
        pairs
    }

    pub fn from_query_pairs<I, K, V>(pairs: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut filter = Self::default();
        for (key, value) in pairs {
            let value = value.as_ref();
            match key.as_ref() {
                "location" => filter.location = parse_field("location", value)?,
                "specialty" => filter.specialty = parse_field("specialty", value)?,
                "language" => filter.language = parse_field("language", value)?,
                _ => {}
            }
        }
        Ok(filter)
    }

    pub fn matches(&self, agent: &Agent) -> bool {
        if let Some(location) = active_text(&self.location) {
            if !agent.city.as_deref().is_some_and(|c| contains_ci(c, location)) {
                return false;
            }
        }
        if let Some(specialty) = active_text(&self.specialty) {
            if !agent.specialty.as_deref().is_some_and(|s| contains_ci(s, specialty)) {
                return false;
            }
        }
        if let Some(language) = active_text(&self.language) {
            if !agent
                .language_list()
                .iter()
                .any(|l| l.eq_ignore_ascii_case(language))
            {
                return false;
            }
        }
        true
    }
}

// ============================================================================
// PROJECT FILTER
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectFilter {
    #[serde(default, deserialize_with = "lenient::option", skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "lenient::option", skip_serializing_if = "Option::is_none")]
    pub status: Option<ProjectStatus>,
}

impl ProjectFilter {
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        push_text(&mut pairs, "location", self.location.as_deref());
        push_value(&mut pairs, "status", self.status);
        pairs
    }

    pub fn from_query_pairs<I, K, V>(pairs: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut filter = Self::default();
        for (key, value) in pairs {
            let value = value.as_ref();
            match key.as_ref() {
                "location" => filter.location = parse_field("location", value)?,
                "status" => filter.status = parse_field("status", value)?,
                _ => {}
            }
        }
        Ok(filter)
    }

    pub fn matches(&self, project: &Project) -> bool {
        if let Some(location) = active_text(&self.location) {
            if !(contains_ci(&project.location, location) || contains_ci(&project.city, location)) {
                return false;
            }
        }
        self.status.map_or(true, |s| s == project.status)
    }
}

// ============================================================================
// PAGINATION
// ============================================================================

#[derive(Debug, Default, Deserialize)]
struct RawPage {
    #[serde(default, deserialize_with = "lenient::option")]
    page: Option<u32>,
    #[serde(default, deserialize_with = "lenient::option")]
    limit: Option<u32>,
}

/// 1-based page; `limit` is capped at `Page::MAX_LIMIT`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawPage")]
pub struct Page {
    pub page: u32,
    pub limit: u32,
}

impl Page {
    pub const DEFAULT_LIMIT: u32 = 20;
    pub const MAX_LIMIT: u32 = 100;

    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.clamp(1, Self::MAX_LIMIT),
        }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }

    /// Slice an already-filtered, already-ordered list
    pub fn apply<T>(&self, items: Vec<T>) -> Vec<T> {
        items
            .into_iter()
            .skip(self.offset() as usize)
            .take(self.limit as usize)
            .collect()
    }

    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if self.page != 1 {
            pairs.push(("page", self.page.to_string()));
        }
        if self.limit != Self::DEFAULT_LIMIT {
            pairs.push(("limit", self.limit.to_string()));
        }
        pairs
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(1, Self::DEFAULT_LIMIT)
    }
}

impl From<RawPage> for Page {
    fn from(raw: RawPage) -> Self {
        Page::new(raw.page.unwrap_or(1), raw.limit.unwrap_or(Self::DEFAULT_LIMIT))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_purpose_parsing_accepts_labels_and_wire_values() {
        assert_eq!("buy".parse::<Purpose>().unwrap(), Purpose::Sale);
        assert_eq!("Sale".parse::<Purpose>().unwrap(), Purpose::Sale);
        assert_eq!("RENT".parse::<Purpose>().unwrap(), Purpose::Rent);
        assert!("lease".parse::<Purpose>().is_err());
    }

    #[test]
    fn test_purpose_serializes_to_wire_value() {
        assert_eq!(serde_json::to_string(&Purpose::Rent).unwrap(), "\"Rent\"");
        let parsed: Purpose = serde_json::from_str("\"buy\"").unwrap();
        assert_eq!(parsed, Purpose::Sale);
        assert_eq!(Purpose::Sale.label(), "Buy");
    }

    #[test]
    fn test_page_clamps() {
        let page = Page::new(0, 500);
        assert_eq!(page.page, 1);
        assert_eq!(page.limit, Page::MAX_LIMIT);
        assert_eq!(Page::new(3, 10).offset(), 20);
    }

    #[test]
    fn test_page_apply() {
        let items: Vec<u32> = (1..=25).collect();
        assert_eq!(Page::new(2, 10).apply(items.clone()), (11..=20).collect::<Vec<_>>());
        assert!(Page::new(4, 10).apply(items).is_empty());
    }

    #[test]
    fn test_blank_values_are_absent() {
        let filter = PropertyFilter::from_query_pairs([("location", "  "), ("min_beds", "")]).unwrap();
        assert_eq!(filter, PropertyFilter::default());
    }

    #[test]
    fn test_invalid_number_is_rejected() {
        let err = PropertyFilter::from_query_pairs([("min_price", "cheap")]).unwrap_err();
        assert_eq!(err.field, "min_price");
    }
}
