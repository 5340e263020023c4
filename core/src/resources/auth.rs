//! Login, registration and the current user.

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::http::{HttpMethod, RequestBody};
use crate::normalize::MessageResponse;
use crate::request::RequestSpec;
use crate::types::{AuthResponse, LoginRequest, RegisterRequest, User};

#[derive(Debug, Clone)]
pub struct Auth {
    client: ApiClient,
}

impl Auth {
    pub(crate) fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Exchange credentials for a token and store it in the session.
    pub async fn login(&self, credentials: &LoginRequest) -> Result<AuthResponse, ApiError> {
        self.authenticate("/auth/login", ApiClient::json_body(credentials)?).await
    }

    /// Create an account; the backend signs the new user in directly.
    pub async fn register(&self, account: &RegisterRequest) -> Result<AuthResponse, ApiError> {
        self.authenticate("/auth/register", ApiClient::json_body(account)?).await
    }

    async fn authenticate(&self, path: &str, body: RequestBody) -> Result<AuthResponse, ApiError> {
        let spec = RequestSpec::new(HttpMethod::Post, path).body(body);
        let auth: AuthResponse = self.client.fetch_json(spec).await?;
        self.client.session().set_token(auth.token.clone());
        tracing::debug!(path, "session established");
        Ok(auth)
    }

    pub async fn me(&self) -> Result<User, ApiError> {
        self.client
            .fetch_entity(RequestSpec::new(HttpMethod::Get, "/auth/me"), "user")
            .await
    }

    /// Tell the backend, then drop the local token whatever it answered.
    pub async fn logout(&self) -> Result<MessageResponse, ApiError> {
        let result = self
            .client
            .fetch_message(RequestSpec::new(HttpMethod::Post, "/auth/logout"))
            .await;
        self.client.session().clear_token();
        result
    }

    pub fn is_authenticated(&self) -> bool {
        self.client.session().is_authenticated()
    }
}
