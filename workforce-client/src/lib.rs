//! Client for a third-party workforce (HR) API.
//!
//! # Components
//!
//! - **CredentialStore**: where the consumer key/secret live (supplied by the caller)
//! - **CredentialCache**: acquires and caches the access token, renewing it
//!   on expiry or when the server rejects it
//! - **ResponseCache**: TTL cache for the layout catalogs
//! - **RemoteSource**: authenticated requests with a single retry on 401
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use workforce_client::{
//!     ClientConfig, Credential, CredentialCache, MemoryCredentialStore, RemoteSource,
//!     ResponseCache, WorkforceApi,
//! };
//!
//! # async fn run() -> workforce_client::ClientResult<()> {
//! let config = ClientConfig::default();
//! let store = Arc::new(MemoryCredentialStore::with_credential(Credential::new("key", "secret")));
//! let credentials = Arc::new(CredentialCache::from_config(&config, store)?);
//! let source = RemoteSource::new(config, credentials, Arc::new(ResponseCache::new()))?;
//!
//! let info = source.member_info().await?;
//! println!("{}", info.members);
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod credential;
mod error;
pub mod remote;
pub mod source;
pub mod token;

pub use cache::ResponseCache;
pub use config::ClientConfig;
pub use credential::{
    has_credential, Credential, CredentialStore, EnvCredentialStore, MemoryCredentialStore,
};
pub use error::{ClientError, ClientResult};
pub use remote::RemoteSource;
pub use source::{MemberInfo, SheetFetch, SheetInfo, SourceDescriptor, WorkforceApi};
pub use token::{AccessToken, CredentialCache, HttpTokenExchange, TokenExchange, TokenGrant};
