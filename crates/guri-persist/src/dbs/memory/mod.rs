//! In-process store used by tests and `--memory` dev runs.
//!
//! All tables sit behind one lock, so multi-row writes (agent plus login,
//! cascading deletes) are atomic the same way a transaction is on MySQL. The
//! foreign-key behaviour of the relational schema is reproduced by hand.

mod catalog;
mod listings;
mod people;
mod stories;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

use guri_types::{
    Agent, Category, Contact, ContactStatus, Project, Property, Service, StoreStats, Story, User,
    STORY_TTL_HOURS,
};

use crate::error::{PersistError, Result};
use crate::fixtures::{Fixtures, SeedAccounts, SeedReport};
use crate::records::{normalize_email, PasswordResetToken, UserCredentials};
use crate::trait_client::PersistenceClient;

pub struct MemoryPersistenceClient {
    tables: RwLock<Tables>,
    story_ttl: Duration,
}

#[derive(Default)]
struct Tables {
    properties: BTreeMap<i64, Property>,
    agents: BTreeMap<i64, Agent>,
    categories: BTreeMap<i64, Category>,
    services: BTreeMap<i64, Service>,
    projects: BTreeMap<i64, Project>,
    contacts: BTreeMap<i64, Contact>,
    /// Stored without the joined agent fields
    stories: BTreeMap<i64, Story>,
    users: BTreeMap<i64, UserCredentials>,
    reset_tokens: Vec<PasswordResetToken>,
    sequences: HashMap<&'static str, i64>,
}

impl Tables {
    /// Next auto-increment id; ids are never reused after a delete
    fn allocate(&mut self, table: &'static str) -> i64 {
        let next = self.sequences.entry(table).or_insert(0);
        *next += 1;
        *next
    }

    /// Keep the sequence ahead of an explicitly inserted id
    fn reserve(&mut self, table: &'static str, id: i64) {
        let next = self.sequences.entry(table).or_insert(0);
        if *next < id {
            *next = id;
        }
    }

    fn require_agent(&self, entity: &'static str, agent_id: Option<i64>) -> Result<()> {
        match agent_id {
            Some(id) if !self.agents.contains_key(&id) => Err(PersistError::missing_reference(
                entity,
                format!("agent {} does not exist", id),
            )),
            _ => Ok(()),
        }
    }

    fn require_category(&self, entity: &'static str, category_id: Option<i64>) -> Result<()> {
        match category_id {
            Some(id) if !self.categories.contains_key(&id) => Err(PersistError::missing_reference(
                entity,
                format!("category {} does not exist", id),
            )),
            _ => Ok(()),
        }
    }

    fn require_property(&self, entity: &'static str, property_id: Option<i64>) -> Result<()> {
        match property_id {
            Some(id) if !self.properties.contains_key(&id) => Err(PersistError::missing_reference(
                entity,
                format!("property {} does not exist", id),
            )),
            _ => Ok(()),
        }
    }

    fn email_taken(&self, email: &str, except: Option<i64>) -> bool {
        self.users
            .values()
            .any(|c| c.user.email == email && Some(c.user.id) != except)
    }

    /// ON DELETE CASCADE for stories, SET NULL for listings
    fn detach_agent(&mut self, agent_id: i64) {
        self.stories.retain(|_, s| s.agent_id != agent_id);
        for property in self.properties.values_mut() {
            if property.agent_id == Some(agent_id) {
                property.agent_id = None;
            }
        }
    }

    fn remove_user(&mut self, user_id: i64) -> bool {
        let removed = self.users.remove(&user_id).is_some();
        self.reset_tokens.retain(|t| t.user_id != user_id);
        removed
    }
}

/// Newest first, ties broken by the higher id like `ORDER BY created_at DESC, id DESC`
fn newest_first<T>(rows: &mut [T], key: impl Fn(&T) -> (DateTime<Utc>, i64)) {
    rows.sort_by(|a, b| key(b).cmp(&key(a)));
}

impl MemoryPersistenceClient {
    pub fn new() -> Self {
        Self::with_story_ttl(Duration::hours(STORY_TTL_HOURS))
    }

    pub fn with_story_ttl(story_ttl: Duration) -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
            story_ttl,
        }
    }

    /// Load the fixtures, updating rows that already exist
    pub async fn seed(&self, fixtures: &Fixtures, accounts: &SeedAccounts) -> Result<SeedReport> {
        let mut t = self.tables.write().await;
        let now = Utc::now();

        for seeded in &fixtures.categories {
            t.reserve("categories", seeded.id);
            let category = catalog::category_from_draft(seeded.id, seeded.row.clone());
            t.categories.insert(seeded.id, category);
        }

        for seeded in &fixtures.services {
            t.reserve("services", seeded.id);
            let created_at = t.services.get(&seeded.id).map_or(now, |s| s.created_at);
            let service = catalog::service_from_draft(seeded.id, seeded.row.clone(), created_at);
            t.services.insert(seeded.id, service);
        }

        for seeded in &fixtures.users {
            t.reserve("users", seeded.id);
            let created_at = t.users.get(&seeded.id).map_or(now, |c| c.user.created_at);
            let credentials = UserCredentials {
                user: User {
                    id: seeded.id,
                    name: seeded.name.clone(),
                    email: normalize_email(&seeded.email),
                    role: seeded.role,
                    created_at,
                },
                password_hash: fixtures.password_hash_for(seeded.role, accounts).to_string(),
            };
            t.users.insert(seeded.id, credentials);
        }

        for seeded in &fixtures.agents {
            t.reserve("agents", seeded.id);
            let created_at = t.agents.get(&seeded.id).map_or(now, |a| a.created_at);
            let email = t.users.get(&seeded.user_id).map(|c| c.user.email.clone());
            let mut agent =
                people::agent_from_draft(seeded.id, Some(seeded.user_id), seeded.draft.clone(), created_at, now);
            if agent.email.is_none() {
                agent.email = email;
            }
            t.agents.insert(seeded.id, agent);
        }

        for seeded in &fixtures.properties {
            t.reserve("properties", seeded.id);
            let created_at = t.properties.get(&seeded.id).map_or(now, |p| p.created_at);
            let property = listings::property_from_draft(seeded.id, seeded.row.clone(), created_at, now);
            t.properties.insert(seeded.id, property);
        }

        for seeded in &fixtures.projects {
            t.reserve("projects", seeded.id);
            let created_at = t.projects.get(&seeded.id).map_or(now, |p| p.created_at);
            let project = listings::project_from_draft(seeded.id, seeded.row.clone(), created_at, now);
            t.projects.insert(seeded.id, project);
        }

        Ok(fixtures.report())
    }
}

impl Default for MemoryPersistenceClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PersistenceClient for MemoryPersistenceClient {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn stats(&self, now: DateTime<Utc>) -> Result<StoreStats> {
        let t = self.tables.read().await;
        let count = |n: usize| n as i64;

        Ok(StoreStats {
            properties: count(t.properties.len()),
            featured_properties: count(t.properties.values().filter(|p| p.is_featured()).count()),
            agents: count(t.agents.len()),
            projects: count(t.projects.len()),
            categories: count(t.categories.len()),
            services: count(t.services.len()),
            contacts: count(t.contacts.len()),
            new_contacts: count(
                t.contacts
                    .values()
                    .filter(|c| c.status == ContactStatus::New)
                    .count(),
            ),
            stories: count(t.stories.len()),
            live_stories: count(t.stories.values().filter(|s| s.is_live(now)).count()),
            users: count(t.users.len()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    fn accounts() -> SeedAccounts {
        SeedAccounts {
            admin_password_hash: "admin-hash".to_string(),
            agent_password_hash: "agent-hash".to_string(),
        }
    }

    #[test]
    fn test_allocate_never_reuses_ids() {
        let mut t = Tables::default();
        assert_eq!(t.allocate("properties"), 1);
        assert_eq!(t.allocate("properties"), 2);
        t.reserve("properties", 10);
        assert_eq!(t.allocate("properties"), 11);
        t.reserve("properties", 3);
        assert_eq!(t.allocate("properties"), 12);
    }

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let store = MemoryPersistenceClient::new();
        let demo = fixtures::demo();

        let first = store.seed(&demo, &accounts()).await.unwrap();
        let second = store.seed(&demo, &accounts()).await.unwrap();
        assert_eq!(first, second);

        let stats = store.stats(Utc::now()).await.unwrap();
        assert_eq!(stats.users, 3);
        assert_eq!(stats.agents, 2);
        assert_eq!(stats.properties, 4);
    }

    #[tokio::test]
    async fn test_seeded_agents_inherit_login_email() {
        let store = MemoryPersistenceClient::new();
        store.seed(&fixtures::demo(), &accounts()).await.unwrap();

        let t = store.tables.read().await;
        assert_eq!(t.agents[&1].email.as_deref(), Some("amina@guri.so"));
        assert_eq!(t.users[&1].password_hash, "admin-hash");
        assert_eq!(t.users[&2].password_hash, "agent-hash");
    }
}
