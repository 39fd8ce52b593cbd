use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{require, ValidationError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specialty: Option<String>,
    pub rating: f64,
    pub reviews_count: u32,
    /// Comma-separated, as entered in the back office
    #[serde(default)]
    pub languages: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_photo: Option<String>,
    /// Legacy photo column, superseded by `profile_photo`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub whatsapp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Display badge for vetted agents; carries no other behaviour
    #[serde(default)]
    pub trubroker: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Agent {
    pub fn photo_url(&self) -> Option<&str> {
        self.profile_photo
            .as_deref()
            .filter(|p| !p.is_empty())
            .or_else(|| self.image.as_deref().filter(|p| !p.is_empty()))
    }

    pub fn language_list(&self) -> Vec<&str> {
        split_languages(&self.languages)
    }
}

pub(crate) fn split_languages(raw: &str) -> Vec<&str> {
    raw.split(',')
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentDraft {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specialty: Option<String>,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub reviews_count: u32,
    #[serde(default)]
    pub languages: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_photo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub whatsapp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub trubroker: bool,
}

impl AgentDraft {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("name", &self.name)?;
        if !(0.0..=5.0).contains(&self.rating) {
            return Err(ValidationError::new("rating", "must be between 0 and 5"));
        }
        Ok(())
    }
}

/// Agent profile plus the login account created with it in one unit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAgentAccount {
    #[serde(flatten)]
    pub agent: AgentDraft,
    pub email: String,
    pub password: String,
}

impl NewAgentAccount {
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.agent.validate()?;
        crate::auth::validate_credentials(&self.email, &self.password)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agent() -> Agent {
        let now = Utc::now();
        Agent {
            id: 1,
            user_id: None,
            name: "Hodan Ali".to_string(),
            title: None,
            specialty: None,
            rating: 4.5,
            reviews_count: 10,
            languages: "Somali, English,,Arabic ".to_string(),
            profile_photo: None,
            image: Some("/uploads/legacy.jpg".to_string()),
            city: None,
            company: None,
            phone: None,
            whatsapp: None,
            email: None,
            trubroker: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_photo_priority() {
        let mut a = agent();
        assert_eq!(a.photo_url(), Some("/uploads/legacy.jpg"));

        a.profile_photo = Some("/uploads/profile.jpg".to_string());
        assert_eq!(a.photo_url(), Some("/uploads/profile.jpg"));

        a.profile_photo = Some(String::new());
        assert_eq!(a.photo_url(), Some("/uploads/legacy.jpg"));
    }

    #[test]
    fn test_language_list() {
        assert_eq!(agent().language_list(), vec!["Somali", "English", "Arabic"]);
    }
}
