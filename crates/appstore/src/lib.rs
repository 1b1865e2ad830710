//! App Store Connect infrastructure adapter.
//!
//! Implements the [`events::BuildInfoSource`] port over the App Store Connect
//! REST API.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Credential signing, HTTP transport, timeouts, and
//! response parsing all live here. The [`events`] crate sees only
//! [`events::BuildInfoSource`] and [`events::EnrichmentError`].
//!
//! ## Credentials
//!
//! | Configured | Behaviour |
//! |------------|-----------|
//! | pre-generated token | used as-is for every request |
//! | key id + issuer id + base64 `.p8` key | a fresh ES256 token per request |
//! | anything less | `EnrichmentError::IncompleteCredentials` / `MissingPrivateKey` |

pub mod client;
pub mod credentials;

pub use client::{AppStoreClient, AppStoreConfig, DEFAULT_API_BASE_URL, DEFAULT_TIMEOUT};
pub use credentials::{Claims, CredentialConfig, TokenProvider, AUDIENCE, TOKEN_LIFETIME_SECS};
