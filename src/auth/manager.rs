use super::credentials::Credentials;
use super::token::TokenRecord;
use crate::config::ClientConfig;
use crate::entity::{EntityClient, EntityKind};
use crate::error::{ApiError, ApiResult};
use crate::transport::{ApiRequest, ApiResponse, HttpTransport, ReqwestTransport};
use tracing::{debug, info, warn};

/// Whether a [`TokenManager`] currently holds a bearer token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenState {
    Authenticated { token: TokenRecord },
    Unauthenticated,
}

/// Acquires and holds the bearer token used by [`EntityClient`]s.
///
/// Construction never touches the network; call [`TokenManager::login`] (or
/// use [`TokenManager::connect`]) to obtain a token. Credentials are owned by
/// the instance, so overriding them on one manager never leaks into another.
pub struct TokenManager {
    transport: Box<dyn HttpTransport>,
    config: ClientConfig,
    state: TokenState,
}

impl TokenManager {
    /// Creates an unauthenticated manager backed by a reqwest transport.
    pub fn new(config: ClientConfig) -> ApiResult<Self> {
        let transport = ReqwestTransport::new(config.request_timeout())?;
        Ok(Self::with_transport(config, Box::new(transport)))
    }

    pub fn with_transport(config: ClientConfig, transport: Box<dyn HttpTransport>) -> Self {
        Self {
            transport,
            config,
            state: TokenState::Unauthenticated,
        }
    }

    /// Creates a manager and, if `initialize_token` is set, logs in with the
    /// configured credentials. With `initialize_token = false` the manager
    /// stays unauthenticated, which is how callers exercise 401 paths.
    pub fn connect(config: ClientConfig, initialize_token: bool) -> ApiResult<Self> {
        let transport = ReqwestTransport::new(config.request_timeout())?;
        Self::connect_with_transport(config, Box::new(transport), initialize_token)
    }

    pub fn connect_with_transport(
        config: ClientConfig,
        transport: Box<dyn HttpTransport>,
        initialize_token: bool,
    ) -> ApiResult<Self> {
        let mut manager = Self::with_transport(config, transport);
        if initialize_token {
            manager.login()?;
        }
        Ok(manager)
    }

    /// Requests a token with the current credentials and returns the raw
    /// response. Held state is not touched.
    pub fn authenticate(&self) -> ApiResult<ApiResponse> {
        let credentials = &self.config.credentials;
        debug!(
            "Requesting token for {:?} (grant_type={})",
            credentials.username, credentials.grant_type
        );

        let request =
            ApiRequest::post(self.config.token_url()).form(credentials.form_fields());
        let response = self.transport.send(request)?;
        if !response.is_success() {
            info!("Token request rejected with status {}", response.status);
        }
        Ok(response)
    }

    /// Replaces this manager's credentials, then behaves like
    /// [`TokenManager::authenticate`]. Later no-argument calls reuse them.
    pub fn authenticate_with(&mut self, credentials: Credentials) -> ApiResult<ApiResponse> {
        self.config.credentials = credentials;
        self.authenticate()
    }

    /// Authenticates and keeps the issued token.
    pub fn login(&mut self) -> ApiResult<TokenRecord> {
        let response = self.authenticate()?;
        if !response.is_success() {
            warn!("Login failed with status {}", response.status);
            return Err(ApiError::Authentication {
                status: response.status,
                body: response.body,
            });
        }

        let token = Self::parse_token_response(&response)?;
        info!(
            "Obtained {} token, expires in {}s",
            token.token_type, token.expires_in
        );
        self.state = TokenState::Authenticated {
            token: token.clone(),
        };
        Ok(token)
    }

    /// Drops the held token.
    pub fn logout(&mut self) {
        self.state = TokenState::Unauthenticated;
    }

    pub fn parse_token_response(response: &ApiResponse) -> ApiResult<TokenRecord> {
        response.json()
    }

    pub fn current_token(&self) -> Option<&str> {
        match &self.state {
            TokenState::Authenticated { token } => Some(token.access_token.as_str()),
            TokenState::Unauthenticated => None,
        }
    }

    pub fn token(&self) -> Option<&TokenRecord> {
        match &self.state {
            TokenState::Authenticated { token } => Some(token),
            TokenState::Unauthenticated => None,
        }
    }

    pub fn state(&self) -> &TokenState {
        &self.state
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.state, TokenState::Authenticated { .. })
    }

    pub fn credentials(&self) -> &Credentials {
        &self.config.credentials
    }

    pub(crate) fn transport(&self) -> &dyn HttpTransport {
        self.transport.as_ref()
    }

    /// Entity client bound to the configured collection for `kind`.
    pub fn entity_client(&self, kind: EntityKind) -> EntityClient<'_> {
        EntityClient::new(self, self.config.collection_url(kind))
    }
}
