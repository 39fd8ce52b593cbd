pub mod client;
pub mod maintenance;
pub mod models;
pub mod repositories;
pub mod schema;

pub use client::MySqlPersistenceClient;
