//! Row shapes as MySQL returns them, and their conversion into domain records.
//!
//! Enum columns are stored as strings; a value that no longer parses is reported
//! as a corrupt row instead of being silently defaulted.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::types::Json;
use sqlx::FromRow;
use std::str::FromStr;

use guri_types::{
    Agent, Category, Contact, Project, Property, Service, Story, User, ValidationError,
};

use crate::error::{PersistError, Result};
use crate::records::UserCredentials;

fn parse_column<T>(table: &'static str, id: i64, raw: &str) -> Result<T>
where
    T: FromStr<Err = ValidationError>,
{
    raw.parse().map_err(|e: ValidationError| PersistError::Corrupt {
        table,
        id,
        detail: e.to_string(),
    })
}

pub const PROPERTY_COLUMNS: &str = "id, slug, title, description, price, currency, purpose, \
    property_type, location, city, region, bedrooms, bathrooms, area, images, category_id, \
    featured, agent_id, created_at, updated_at";

#[derive(Debug, FromRow)]
pub struct PropertyRow {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    pub price: i64,
    pub currency: String,
    pub purpose: String,
    pub property_type: String,
    pub location: String,
    pub city: String,
    pub region: Option<String>,
    pub bedrooms: u32,
    pub bathrooms: u32,
    pub area: Option<f64>,
    pub images: Json<Vec<String>>,
    pub category_id: Option<i64>,
    pub featured: bool,
    pub agent_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<PropertyRow> for Property {
    type Error = PersistError;

    fn try_from(row: PropertyRow) -> Result<Self> {
        Ok(Property {
            purpose: parse_column("properties", row.id, &row.purpose)?,
            property_type: parse_column("properties", row.id, &row.property_type)?,
            id: row.id,
            slug: row.slug,
            title: row.title,
            description: row.description,
            price: row.price,
            currency: row.currency,
            location: row.location,
            city: row.city,
            region: row.region,
            bedrooms: row.bedrooms,
            bathrooms: row.bathrooms,
            area: row.area,
            images: row.images.0,
            category_id: row.category_id,
            featured: row.featured,
            agent_id: row.agent_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

pub const AGENT_COLUMNS: &str = "id, user_id, name, title, specialty, rating, reviews_count, \
    languages, profile_photo, image, city, company, phone, whatsapp, email, trubroker, \
    created_at, updated_at";

#[derive(Debug, FromRow)]
pub struct AgentRow {
    pub id: i64,
    pub user_id: Option<i64>,
    pub name: String,
    pub title: Option<String>,
    pub specialty: Option<String>,
    pub rating: f64,
    pub reviews_count: u32,
    pub languages: String,
    pub profile_photo: Option<String>,
    pub image: Option<String>,
    pub city: Option<String>,
    pub company: Option<String>,
    pub phone: Option<String>,
    pub whatsapp: Option<String>,
    pub email: Option<String>,
    pub trubroker: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<AgentRow> for Agent {
    fn from(row: AgentRow) -> Self {
        Agent {
            id: row.id,
            user_id: row.user_id,
            name: row.name,
            title: row.title,
            specialty: row.specialty,
            rating: row.rating,
            reviews_count: row.reviews_count,
            languages: row.languages,
            profile_photo: row.profile_photo,
            image: row.image,
            city: row.city,
            company: row.company,
            phone: row.phone,
            whatsapp: row.whatsapp,
            email: row.email,
            trubroker: row.trubroker,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

pub const CATEGORY_COLUMNS: &str = "id, name, slug, description, icon";

#[derive(Debug, FromRow)]
pub struct CategoryRow {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub icon: Option<String>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Category {
            id: row.id,
            name: row.name,
            slug: row.slug,
            description: row.description,
            icon: row.icon,
        }
    }
}

pub const SERVICE_COLUMNS: &str = "id, title, description, icon, created_at";

#[derive(Debug, FromRow)]
pub struct ServiceRow {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<ServiceRow> for Service {
    fn from(row: ServiceRow) -> Self {
        Service {
            id: row.id,
            title: row.title,
            description: row.description,
            icon: row.icon,
            created_at: row.created_at,
        }
    }
}

pub const PROJECT_COLUMNS: &str = "id, slug, name, developer, description, location, city, \
    status, starting_price, currency, completion_date, images, featured, created_at, updated_at";

#[derive(Debug, FromRow)]
pub struct ProjectRow {
    pub id: i64,
    pub slug: String,
    pub name: String,
    pub developer: String,
    pub description: Option<String>,
    pub location: String,
    pub city: String,
    pub status: String,
    pub starting_price: Option<i64>,
    pub currency: String,
    pub completion_date: Option<NaiveDate>,
    pub images: Json<Vec<String>>,
    pub featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ProjectRow> for Project {
    type Error = PersistError;

    fn try_from(row: ProjectRow) -> Result<Self> {
        Ok(Project {
            status: parse_column("projects", row.id, &row.status)?,
            id: row.id,
            slug: row.slug,
            name: row.name,
            developer: row.developer,
            description: row.description,
            location: row.location,
            city: row.city,
            starting_price: row.starting_price,
            currency: row.currency,
            completion_date: row.completion_date,
            images: row.images.0,
            featured: row.featured,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

pub const CONTACT_COLUMNS: &str =
    "id, name, email, phone, subject, message, property_id, status, created_at";

#[derive(Debug, FromRow)]
pub struct ContactRow {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: Option<String>,
    pub message: String,
    pub property_id: Option<i64>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<ContactRow> for Contact {
    type Error = PersistError;

    fn try_from(row: ContactRow) -> Result<Self> {
        Ok(Contact {
            status: parse_column("contacts", row.id, &row.status)?,
            id: row.id,
            name: row.name,
            email: row.email,
            phone: row.phone,
            subject: row.subject,
            message: row.message,
            property_id: row.property_id,
            created_at: row.created_at,
        })
    }
}

/// Stories joined with the owning agent's display fields
pub const STORY_SELECT: &str = "SELECT s.id, s.agent_id, s.media_type, s.media_url, \
    s.thumbnail_url, s.duration, s.created_at, s.expires_at, a.name AS agent_name, \
    a.title AS agent_title, COALESCE(NULLIF(a.profile_photo, ''), NULLIF(a.image, '')) AS agent_photo, \
    a.phone AS agent_phone FROM stories s LEFT JOIN agents a ON a.id = s.agent_id";

#[derive(Debug, FromRow)]
pub struct StoryRow {
    pub id: i64,
    pub agent_id: i64,
    pub media_type: String,
    pub media_url: String,
    pub thumbnail_url: Option<String>,
    pub duration: u32,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub agent_name: Option<String>,
    pub agent_title: Option<String>,
    pub agent_photo: Option<String>,
    pub agent_phone: Option<String>,
}

impl TryFrom<StoryRow> for Story {
    type Error = PersistError;

    fn try_from(row: StoryRow) -> Result<Self> {
        Ok(Story {
            media_type: parse_column("stories", row.id, &row.media_type)?,
            id: row.id,
            agent_id: row.agent_id,
            media_url: row.media_url,
            thumbnail_url: row.thumbnail_url,
            duration: row.duration,
            created_at: row.created_at,
            expires_at: row.expires_at,
            agent_name: row.agent_name,
            agent_title: row.agent_title,
            agent_photo: row.agent_photo,
            agent_phone: row.agent_phone,
        })
    }
}

pub const USER_COLUMNS: &str = "id, name, email, role, password_hash, created_at";

#[derive(Debug, FromRow)]
pub struct UserRow {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for UserCredentials {
    type Error = PersistError;

    fn try_from(row: UserRow) -> Result<Self> {
        Ok(UserCredentials {
            user: User {
                role: parse_column("users", row.id, &row.role)?,
                id: row.id,
                name: row.name,
                email: row.email,
                created_at: row.created_at,
            },
            password_hash: row.password_hash,
        })
    }
}

/// Convert a batch of rows, failing on the first corrupt one
pub fn convert_all<R, T>(rows: Vec<R>) -> Result<Vec<T>>
where
    T: TryFrom<R, Error = PersistError>,
{
    rows.into_iter().map(T::try_from).collect()
}
