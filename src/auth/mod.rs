//! Token acquisition against the password-grant token endpoint.

mod credentials;
mod manager;
mod token;

pub use credentials::{Credentials, DEFAULT_PASSWORD, DEFAULT_USERNAME, PASSWORD_GRANT};
pub use manager::{TokenManager, TokenState};
pub use token::{http_date, TokenRecord};
