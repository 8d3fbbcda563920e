/// Username used when no credentials are configured.
pub const DEFAULT_USERNAME: &str = "testName";
/// Password used when no credentials are configured.
pub const DEFAULT_PASSWORD: &str = "test";
/// The only grant type the token provider accepts.
pub const PASSWORD_GRANT: &str = "password";

/// Credentials for the password-grant token endpoint.
///
/// `None` values are sent as empty form fields; the provider accepts those.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: Option<String>,
    pub password: Option<String>,
    pub grant_type: String,
}

impl Default for Credentials {
    fn default() -> Self {
        Self::password_grant(Some(DEFAULT_USERNAME), Some(DEFAULT_PASSWORD))
    }
}

impl Credentials {
    pub fn new(username: Option<&str>, password: Option<&str>, grant_type: &str) -> Self {
        Self {
            username: username.map(str::to_string),
            password: password.map(str::to_string),
            grant_type: grant_type.to_string(),
        }
    }

    pub fn password_grant(username: Option<&str>, password: Option<&str>) -> Self {
        Self::new(username, password, PASSWORD_GRANT)
    }

    /// Fields of the urlencoded token request body, in wire order.
    pub fn form_fields(&self) -> Vec<(String, String)> {
        vec![
            (
                "username".to_string(),
                self.username.clone().unwrap_or_default(),
            ),
            (
                "password".to_string(),
                self.password.clone().unwrap_or_default(),
            ),
            ("grant_type".to_string(), self.grant_type.clone()),
        ]
    }
}
