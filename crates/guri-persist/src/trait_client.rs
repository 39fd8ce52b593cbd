use async_trait::async_trait;
use chrono::{DateTime, Utc};

use guri_types::{
    Agent, AgentDraft, AgentFilter, Category, CategoryDraft, Contact, ContactDraft, ContactStatus,
    Page, Project, ProjectDraft, ProjectFilter, Property, PropertyDraft, PropertyFilter,
    ResourceKey, Service, ServiceDraft, Story, StoryDraft, StoryUpdate, StoreStats, User,
};

use crate::error::Result;
use crate::records::{NewUser, UserCredentials};

/// Listings for sale or rent.
///
/// Updates replace every mutable column; `None` means no row had that id.
#[async_trait]
pub trait PropertyRepository: Send + Sync {
    /// Filtered page, newest first
    async fn list_properties(&self, filter: &PropertyFilter, page: Page) -> Result<Vec<Property>>;

    /// Featured listings that have an agent attached, newest first
    async fn featured_properties(&self, limit: u32) -> Result<Vec<Property>>;

    async fn get_property(&self, key: &ResourceKey) -> Result<Option<Property>>;

    async fn create_property(&self, draft: PropertyDraft) -> Result<Property>;

    async fn update_property(&self, id: i64, draft: PropertyDraft) -> Result<Option<Property>>;

    /// Append uploaded image URLs to the gallery
    async fn add_property_images(&self, id: i64, urls: Vec<String>) -> Result<Option<Property>>;

    async fn delete_property(&self, id: i64) -> Result<bool>;
}

#[async_trait]
pub trait AgentRepository: Send + Sync {
    /// Highest rated first
    async fn list_agents(&self, filter: &AgentFilter, page: Page) -> Result<Vec<Agent>>;

    async fn get_agent(&self, id: i64) -> Result<Option<Agent>>;

    async fn find_agent_by_user(&self, user_id: i64) -> Result<Option<Agent>>;

    /// Create the login and the agent profile together. Either both rows exist
    /// afterwards or neither does.
    async fn create_agent_account(&self, user: NewUser, draft: AgentDraft) -> Result<(User, Agent)>;

    async fn update_agent(&self, id: i64, draft: AgentDraft) -> Result<Option<Agent>>;

    async fn set_agent_photo(&self, id: i64, url: String) -> Result<Option<Agent>>;

    /// Removes the profile and its login; the agent's stories go with it and its
    /// listings are left unassigned.
    async fn delete_agent(&self, id: i64) -> Result<bool>;
}

#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn list_categories(&self) -> Result<Vec<Category>>;
    async fn get_category(&self, key: &ResourceKey) -> Result<Option<Category>>;
    async fn create_category(&self, draft: CategoryDraft) -> Result<Category>;
    async fn update_category(&self, id: i64, draft: CategoryDraft) -> Result<Option<Category>>;
    async fn delete_category(&self, id: i64) -> Result<bool>;
}

#[async_trait]
pub trait ServiceRepository: Send + Sync {
    async fn list_services(&self) -> Result<Vec<Service>>;
    async fn get_service(&self, id: i64) -> Result<Option<Service>>;
    async fn create_service(&self, draft: ServiceDraft) -> Result<Service>;
    async fn update_service(&self, id: i64, draft: ServiceDraft) -> Result<Option<Service>>;
    async fn delete_service(&self, id: i64) -> Result<bool>;
}

#[async_trait]
pub trait ProjectRepository: Send + Sync {
    async fn list_projects(&self, filter: &ProjectFilter, page: Page) -> Result<Vec<Project>>;
    async fn get_project(&self, key: &ResourceKey) -> Result<Option<Project>>;
    async fn create_project(&self, draft: ProjectDraft) -> Result<Project>;
    async fn update_project(&self, id: i64, draft: ProjectDraft) -> Result<Option<Project>>;
    async fn add_project_images(&self, id: i64, urls: Vec<String>) -> Result<Option<Project>>;
    async fn delete_project(&self, id: i64) -> Result<bool>;
}

#[async_trait]
pub trait ContactRepository: Send + Sync {
    /// Newest first
    async fn list_contacts(&self, page: Page) -> Result<Vec<Contact>>;
    async fn get_contact(&self, id: i64) -> Result<Option<Contact>>;
    async fn create_contact(&self, draft: ContactDraft) -> Result<Contact>;
    async fn set_contact_status(&self, id: i64, status: ContactStatus) -> Result<Option<Contact>>;
    async fn delete_contact(&self, id: i64) -> Result<bool>;
}

/// Stories are returned with the owning agent's display fields joined in.
///
/// `live_at` filters out stories whose effective expiry is before that instant;
/// `None` returns everything, expired or not.
#[async_trait]
pub trait StoryRepository: Send + Sync {
    async fn list_stories(&self, live_at: Option<DateTime<Utc>>) -> Result<Vec<Story>>;

    async fn list_agent_stories(
        &self,
        agent_id: i64,
        live_at: Option<DateTime<Utc>>,
    ) -> Result<Vec<Story>>;

    async fn get_story(&self, id: i64) -> Result<Option<Story>>;

    /// Stores the story with `expires_at = created_at + story TTL`
    async fn create_story(&self, draft: StoryDraft, created_at: DateTime<Utc>) -> Result<Story>;

    async fn update_story(&self, id: i64, update: StoryUpdate) -> Result<Option<Story>>;

    async fn delete_story(&self, id: i64) -> Result<bool>;

    /// Delete every story that expired before `now`; returns how many went
    async fn purge_expired_stories(&self, now: DateTime<Utc>) -> Result<u64>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with a conflict when the email is taken
    async fn create_user(&self, user: NewUser) -> Result<User>;

    async fn find_credentials(&self, email: &str) -> Result<Option<UserCredentials>>;

    async fn get_user(&self, id: i64) -> Result<Option<User>>;

    async fn list_users(&self, page: Page) -> Result<Vec<User>>;

    async fn delete_user(&self, id: i64) -> Result<bool>;

    async fn set_password_hash(&self, user_id: i64, password_hash: String) -> Result<bool>;

    async fn store_reset_token(
        &self,
        user_id: i64,
        token_hash: String,
        expires_at: DateTime<Utc>,
    ) -> Result<()>;

    /// Mark an unused, unexpired token as used and return its user. A token can
    /// be redeemed once.
    async fn redeem_reset_token(&self, token_hash: &str, now: DateTime<Utc>) -> Result<Option<i64>>;
}

/// Everything the HTTP layer needs from a backing store.
///
/// Implementations provide database-specific CRUD for each resource
#[async_trait]
pub trait PersistenceClient:
    PropertyRepository
    + AgentRepository
    + CategoryRepository
    + ServiceRepository
    + ProjectRepository
    + ContactRepository
    + StoryRepository
    + UserRepository
{
    /// Short name for logs and the health endpoint
    fn backend(&self) -> &'static str;

    async fn ping(&self) -> Result<()>;

    async fn stats(&self, now: DateTime<Utc>) -> Result<StoreStats>;
}
