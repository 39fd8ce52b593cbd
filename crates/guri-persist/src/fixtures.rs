//! Seed data for demos and local development.
//!
//! Every row has a fixed id so seeding twice updates rows in place instead of
//! duplicating them.

use chrono::NaiveDate;
use serde::Serialize;

use guri_types::{
    AgentDraft, CategoryDraft, ProjectDraft, ProjectStatus, PropertyDraft, PropertyType, Purpose,
    Role, ServiceDraft,
};

/// Pre-hashed passwords for the seeded logins
#[derive(Debug, Clone)]
pub struct SeedAccounts {
    pub admin_password_hash: String,
    pub agent_password_hash: String,
}

#[derive(Debug, Clone)]
pub struct Seeded<T> {
    pub id: i64,
    pub row: T,
}

#[derive(Debug, Clone)]
pub struct SeededUser {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: Role,
}

#[derive(Debug, Clone)]
pub struct SeededAgent {
    pub id: i64,
    pub user_id: i64,
    pub draft: AgentDraft,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub categories: usize,
    pub services: usize,
    pub users: usize,
    pub agents: usize,
    pub properties: usize,
    pub projects: usize,
}

#[derive(Debug, Clone)]
pub struct Fixtures {
    pub categories: Vec<Seeded<CategoryDraft>>,
    pub services: Vec<Seeded<ServiceDraft>>,
    pub users: Vec<SeededUser>,
    pub agents: Vec<SeededAgent>,
    pub properties: Vec<Seeded<PropertyDraft>>,
    pub projects: Vec<Seeded<ProjectDraft>>,
}

impl Fixtures {
    pub fn report(&self) -> SeedReport {
        SeedReport {
            categories: self.categories.len(),
            services: self.services.len(),
            users: self.users.len(),
            agents: self.agents.len(),
            properties: self.properties.len(),
            projects: self.projects.len(),
        }
    }

    pub fn password_hash_for<'a>(&self, role: Role, accounts: &'a SeedAccounts) -> &'a str {
        match role {
            Role::Admin => &accounts.admin_password_hash,
            _ => &accounts.agent_password_hash,
        }
    }
}

fn category(id: i64, name: &str, icon: &str) -> Seeded<CategoryDraft> {
    Seeded {
        id,
        row: CategoryDraft {
            name: name.to_string(),
            slug: None,
            description: Some(format!("{} listings", name)),
            icon: Some(icon.to_string()),
        },
    }
}

fn service(id: i64, title: &str, description: &str, icon: &str) -> Seeded<ServiceDraft> {
    Seeded {
        id,
        row: ServiceDraft {
            title: title.to_string(),
            description: Some(description.to_string()),
            icon: Some(icon.to_string()),
        },
    }
}

fn agent(id: i64, user_id: i64, name: &str, specialty: &str, city: &str, rating: f64) -> SeededAgent {
    SeededAgent {
        id,
        user_id,
        draft: AgentDraft {
            name: name.to_string(),
            title: Some("Senior Agent".to_string()),
            specialty: Some(specialty.to_string()),
            rating,
            reviews_count: 24,
            languages: "Somali, English".to_string(),
            profile_photo: None,
            image: Some(format!("/uploads/agents/{}.jpg", id)),
            city: Some(city.to_string()),
            company: Some("Guri Realty".to_string()),
            phone: Some(format!("+25261000000{}", id)),
            whatsapp: Some(format!("+25261000000{}", id)),
            email: None,
            trubroker: id == 1,
        },
    }
}

#[allow(clippy::too_many_arguments)]
fn property(
    id: i64,
    title: &str,
    purpose: Purpose,
    property_type: PropertyType,
    location: &str,
    city: &str,
    price: i64,
    bedrooms: u32,
    agent_id: i64,
) -> Seeded<PropertyDraft> {
    Seeded {
        id,
        row: PropertyDraft {
            title: title.to_string(),
            slug: None,
            description: Some(format!("{} in {}, {}", title, location, city)),
            price,
            currency: "USD".to_string(),
            purpose,
            property_type,
            location: location.to_string(),
            city: city.to_string(),
            region: Some("Banaadir".to_string()),
            bedrooms,
            bathrooms: bedrooms.saturating_sub(1).max(1),
            area: Some(f64::from(bedrooms) * 45.0),
            images: vec![format!("/uploads/properties/{}.jpg", id)],
            category_id: Some(if property_type == PropertyType::Commercial { 3 } else { 1 }),
            featured: id % 2 == 1,
            agent_id: Some(agent_id),
        },
    }
}

/// The demo catalogue: categories, services, an admin, two agents with logins,
/// a handful of listings and two new-build projects.
pub fn demo() -> Fixtures {
    let users = vec![
        SeededUser {
            id: 1,
            name: "Guri Admin".to_string(),
            email: "admin@guri.so".to_string(),
            role: Role::Admin,
        },
        SeededUser {
            id: 2,
            name: "Amina Warsame".to_string(),
            email: "amina@guri.so".to_string(),
            role: Role::Agent,
        },
        SeededUser {
            id: 3,
            name: "Yusuf Abdi".to_string(),
            email: "yusuf@guri.so".to_string(),
            role: Role::Agent,
        },
    ];

    let projects = vec![
        Seeded {
            id: 1,
            row: ProjectDraft {
                name: "Lido Heights".to_string(),
                slug: None,
                developer: "Banadir Developments".to_string(),
                description: Some("Sea-view apartments near Lido beach".to_string()),
                location: "Lido".to_string(),
                city: "Mogadishu".to_string(),
                status: ProjectStatus::UnderConstruction,
                starting_price: Some(85_000),
                currency: "USD".to_string(),
                completion_date: NaiveDate::from_ymd_opt(2027, 6, 30),
                images: vec!["/uploads/projects/1.jpg".to_string()],
                featured: true,
            },
        },
        Seeded {
            id: 2,
            row: ProjectDraft {
                name: "Jigjiga Yar Gardens".to_string(),
                slug: None,
                developer: "Hargeisa Homes".to_string(),
                description: Some("Family villas with private gardens".to_string()),
                location: "Jigjiga Yar".to_string(),
                city: "Hargeisa".to_string(),
                status: ProjectStatus::Planned,
                starting_price: Some(120_000),
                currency: "USD".to_string(),
                completion_date: None,
                images: Vec::new(),
                featured: false,
            },
        },
    ];

    Fixtures {
        categories: vec![
            category(1, "Residential", "home"),
            category(2, "Land", "map"),
            category(3, "Commercial", "building"),
        ],
        services: vec![
            service(1, "Buying", "Find and purchase the right home", "key"),
            service(2, "Renting", "Short and long term rentals", "calendar"),
            service(3, "Valuation", "Free market valuation of your property", "chart"),
        ],
        users,
        agents: vec![
            agent(1, 2, "Amina Warsame", "Residential", "Mogadishu", 4.8),
            agent(2, 3, "Yusuf Abdi", "Commercial", "Hargeisa", 4.5),
        ],
        properties: vec![
            property(1, "Hodan Family Villa", Purpose::Sale, PropertyType::Villa, "Hodan", "Mogadishu", 250_000, 5, 1),
            property(2, "Waberi Apartment", Purpose::Rent, PropertyType::Apartment, "Waberi", "Mogadishu", 600, 2, 1),
            property(3, "KM4 Office Floor", Purpose::Rent, PropertyType::Commercial, "KM4", "Mogadishu", 2_500, 0, 2),
            property(4, "Hargeisa Townhouse", Purpose::Sale, PropertyType::Townhouse, "26 June", "Hargeisa", 140_000, 3, 2),
        ],
        projects,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_demo_fixtures_are_valid() {
        let fixtures = demo();
        for c in &fixtures.categories {
            c.row.validate().unwrap();
        }
        for s in &fixtures.services {
            s.row.validate().unwrap();
        }
        for a in &fixtures.agents {
            a.draft.validate().unwrap();
        }
        for p in &fixtures.properties {
            p.row.validate().unwrap();
        }
        for p in &fixtures.projects {
            p.row.validate().unwrap();
        }
    }

    #[test]
    fn test_demo_references_resolve() {
        let fixtures = demo();
        let users: HashSet<i64> = fixtures.users.iter().map(|u| u.id).collect();
        let agents: HashSet<i64> = fixtures.agents.iter().map(|a| a.id).collect();
        let categories: HashSet<i64> = fixtures.categories.iter().map(|c| c.id).collect();

        assert!(fixtures.agents.iter().all(|a| users.contains(&a.user_id)));
        for p in &fixtures.properties {
            assert!(p.row.agent_id.map_or(true, |id| agents.contains(&id)));
            assert!(p.row.category_id.map_or(true, |id| categories.contains(&id)));
        }
    }

    #[test]
    fn test_report_counts() {
        let report = demo().report();
        assert_eq!(report.users, 3);
        assert_eq!(report.agents, 2);
        assert_eq!(report.properties, 4);
    }
}
