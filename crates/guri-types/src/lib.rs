//! Core types for the Guri marketplace.
//!
//! Everything in here is pure: records as they come out of the store, the derived
//! story groups shown in the stories row, relative-time helpers, the listing
//! filters shared by the API, the store and the client, and the response envelope.

pub mod auth;
pub mod envelope;
pub mod models;
pub mod search;
pub mod stories;
pub mod time;

pub use auth::{
    validate_credentials, AuthResponse, ForgotPasswordRequest, ForgotPasswordResponse,
    LoginRequest, PurgeReport, RegisterRequest, ResetPasswordRequest, StoreStats,
};
pub use envelope::ApiResponse;
pub use models::{
    slugify, Agent, AgentDraft, Category, CategoryDraft, Contact, ContactDraft, ContactStatus,
    ContactUpdate, MediaType, NewAgentAccount, Project, ProjectDraft, ProjectStatus, Property,
    PropertyDraft, ResourceKey, Role, Service, ServiceDraft, Story, StoryDraft, StoryUpdate, User,
    ValidationError,
};
pub use search::{AgentFilter, Page, ProjectFilter, PropertyFilter, PropertyType, Purpose};
pub use stories::{filter_live, group_stories_by_agent, StoryGroup};
pub use time::{days_ago, is_expired, time_until_expiry, STORY_TTL_HOURS};
