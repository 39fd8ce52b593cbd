//! HTTP client for the Guri marketplace API.
//!
//! One [`GuriClient`] per user session. It owns the [`Session`], attaches the bearer
//! token to every request, and turns any non-2xx response into a [`ClientError`].
//!
//! ```no_run
//! use guri_client::GuriClient;
//! use guri_types::PropertyFilter;
//!
//! # async fn run() -> guri_client::Result<()> {
//! let client = GuriClient::new("http://localhost:8080")?;
//! let filter = PropertyFilter::default().location("Mogadishu");
//! let listings = client.properties(&filter, Default::default()).await?;
//! println!("{} listings", listings.len());
//! # Ok(())
//! # }
//! ```

mod api;
mod client;
mod error;
mod session;

pub use api::{NewStory, Upload};
pub use client::{GuriClient, GuriClientBuilder};
pub use error::{ClientError, Result};
pub use session::Session;
