//! Blocking client for a token-protected entity API.
//!
//! A [`TokenManager`] obtains a bearer token from the password-grant token
//! endpoint; an [`EntityClient`] borrows that token to run create / list /
//! get / delete against one collection (companies or employees), plus the
//! bulk helpers used to reset a collection between test cases.
//!
//! ```no_run
//! use entity_api_client::{ClientConfig, EntityKind, TokenManager};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let tokens = TokenManager::connect(ClientConfig::from_env()?, true)?;
//! let companies = tokens.entity_client(EntityKind::Company);
//!
//! companies.delete_all()?;
//! companies.create("test1")?;
//! assert_eq!(companies.count()?, 1);
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod config;
pub mod entity;
pub mod error;
pub mod logging;
pub mod transport;

pub use auth::{Credentials, TokenManager, TokenRecord, TokenState};
pub use config::{ClientConfig, FileConfig};
pub use entity::{entity_code, EntityClient, EntityKind, EntityRecord};
pub use error::{ApiError, ApiResult};
pub use transport::{ApiRequest, ApiResponse, HttpTransport, ReqwestTransport};
