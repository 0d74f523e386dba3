//! # Instant Preview Client
//! Asynchronous wrapper around the Litmus Instant email preview HTTP API: upload email content with [`PreviewApi::create_email`], then request, prefetch, or embed rendered screenshots of it as seen in various mail clients.
//!
//! ## Audience and uses
//! For Rust developers building email editors, ESP integrations, or QA tooling that need to show how a message renders across clients. Authenticate with an API key, or with per-end-user OAuth tokens when acting for connected users.
//!
//! ## Clients
//! Two types implement [`PreviewApi`]:
//! - [`Client`] owns its credential. Build one per identity; it is safe to share across tasks because its credential can only change through `&mut`.
//! - [`SharedClient`] is configured through `&self` setters, with a process-wide instance at [`shared()`]. Use it when the whole process acts as a single identity. It is not safe for concurrent use on behalf of different end users; derive isolated clients with [`SharedClient::isolated`] instead.
//!
//! ## Runtime requirements
//! Async-only; run inside a Tokio (v1) runtime. HTTP calls use `reqwest`.
//!
//! ## Out of scope
//! No retries, caching, or rate limiting. Transport timeouts are whatever [`ClientBuilder::timeout`] sets.
//!
//! ## Errors
//! Transport failures become [`Error::Network`]. Non-2xx responses become the matching API error ([`Error::Request`], [`Error::NotFound`], [`Error::Authentication`], ...), refined to the OAuth-specific kinds when the `WWW-Authenticate` header carries a recognised bearer challenge. The crate-wide [`Result`] alias wraps these errors.
//!
//! ## Example
//! ```no_run
//! use instant_preview_client::{Client, EmailSource, ImageUrlOptions, PreviewApi, PreviewOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), instant_preview_client::Error> {
//!     let client = Client::with_api_key("my-api-key")?;
//!     let email = EmailSource::from_html("<h1>Hello</h1>").with_subject("Hello");
//!     let handle = client.create_email(&email).await?;
//!
//!     let urls = client
//!         .get_preview(&handle.email_guid, "outlook2016", &PreviewOptions::default())
//!         .await?;
//!     for (size, url) in urls {
//!         println!("{size}: {url}");
//!     }
//!
//!     let embed = client.preview_image_url(
//!         &handle.email_guid,
//!         "gmailw",
//!         &ImageUrlOptions::default().capture_size("thumb"),
//!     )?;
//!     println!("{embed}");
//!     Ok(())
//! }
//! ```

mod api;
mod challenge;
mod client;
mod credential;
mod error;
mod models;
mod pipeline;

pub use api::PreviewApi;
pub use client::{Client, ClientBuilder, SharedClient, shared};
pub use credential::{Config, Credential, DEFAULT_BASE_URL};
pub use error::Error;
pub use models::{
    EmailHandle, EmailSource, ImageUrlOptions, ImageVisibility, Orientation,
    PreviewConfiguration, PreviewOptions, PreviewUrls,
};
pub use pipeline::{Pipeline, RequestOptions};

/// Result type alias for Instant API operations.
///
/// This is equivalent to `std::result::Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
