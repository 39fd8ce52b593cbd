//! Persistence for the Guri marketplace.
//!
//! [`PersistenceClient`] is the seam the API is written against. Two backends
//! implement it: MySQL through `sqlx` (feature `mysql`) and an in-process store
//! used by tests and `--memory` dev runs. Both honour the same ordering, filtering,
//! uniqueness and foreign-key rules.

pub mod builder;
pub mod dbs;
pub mod error;
pub mod fixtures;
pub mod records;
pub mod trait_client;

pub use builder::PersistClientBuilder;
pub use dbs::memory::MemoryPersistenceClient;
#[cfg(feature = "mysql")]
pub use dbs::mysql::{maintenance, MySqlPersistenceClient};
pub use error::{PersistError, Result};
pub use fixtures::{Fixtures, SeedAccounts, SeedReport};
pub use guri_types::StoreStats;
pub use records::{normalize_email, NewUser, PasswordResetToken, UserCredentials};
pub use trait_client::{
    AgentRepository, CategoryRepository, ContactRepository, PersistenceClient, ProjectRepository,
    PropertyRepository, ServiceRepository, StoryRepository, UserRepository,
};
