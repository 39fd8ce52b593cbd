//! Credentials: bearer tokens, password hashes and password-reset tokens.

mod passwords;
mod tokens;

pub use passwords::{
    hash_password, hash_password_async, hash_reset_token, new_reset_token, seed_accounts,
    verify_password, verify_password_async,
};
pub use tokens::{Claims, TokenKeys};
