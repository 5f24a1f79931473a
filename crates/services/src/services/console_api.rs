//! HTTP client for the church management backend.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use models::{
    auth::{LoginRequest, LoginResponse},
    collection::{Collection, CollectionFilter, CreateCollection},
    entity::{CreateEntity, Entity, UpdateEntity},
    field_descriptor::FieldDescriptor,
    member::{Member, MemberPayload, MemberQuery},
    user::{CreateUser, UpdateUser, User},
};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;
use url::Url;
use utils::response::ApiResponse;
use uuid::Uuid;

use super::field_registry::FieldSource;

#[derive(Debug, Clone, Error)]
pub enum ConsoleApiError {
    #[error("invalid server url '{0}'")]
    InvalidUrl(String),
    #[error("network error: {0}")]
    Transport(String),
    #[error("timeout")]
    Timeout,
    #[error("not signed in or session expired")]
    Unauthorized,
    #[error("permission denied: {0}")]
    Forbidden(String),
    #[error("http {status}: {body}")]
    Http { status: u16, body: String },
    #[error("{0}")]
    Api(String),
    #[error("json error: {0}")]
    Serde(String),
}

impl ConsoleApiError {
    /// True when signing in again is the fix
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }
}

#[derive(Debug, Clone)]
pub struct ConsoleApiClient {
    http: Client,
    base_url: Url,
    token: Option<Arc<SecretString>>,
}

impl ConsoleApiClient {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ConsoleApiError> {
        let mut base_url =
            Url::parse(base_url).map_err(|_| ConsoleApiError::InvalidUrl(base_url.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(ConsoleApiError::InvalidUrl(base_url.to_string()));
        }
        // Url::join replaces the last segment unless the path ends with a slash
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("church-console/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ConsoleApiError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            base_url,
            token: None,
        })
    }

    pub fn with_token(mut self, token: SecretString) -> Self {
        self.token = Some(Arc::new(token));
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    fn url(&self, path: &str) -> Result<Url, ConsoleApiError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|_| ConsoleApiError::InvalidUrl(format!("{}{}", self.base_url, path)))
    }

    /// Request carrying the bearer token, if one is set
    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ConsoleApiError> {
        let builder = self.http.request(method, self.url(path)?);
        Ok(match &self.token {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => builder,
        })
    }

    async fn send<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<T, ConsoleApiError> {
        let envelope: ApiResponse<T> = self.execute(builder).await?;
        envelope.into_result().map_err(ConsoleApiError::Api)
    }

    async fn send_empty(&self, builder: RequestBuilder) -> Result<(), ConsoleApiError> {
        let envelope: ApiResponse<serde_json::Value> = self.execute(builder).await?;
        envelope.into_optional().map(|_| ()).map_err(ConsoleApiError::Api)
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<ApiResponse<T>, ConsoleApiError> {
        let request = builder.build().map_err(map_reqwest_error)?;
        let method = request.method().clone();
        let path = request.url().path().to_string();

        let res = self
            .http
            .execute(request)
            .await
            .map_err(map_reqwest_error)?;
        let status = res.status();
        debug!(method = %method, path = %path, status = status.as_u16(), "Backend responded");

        if status.is_success() {
            return res
                .json::<ApiResponse<T>>()
                .await
                .map_err(|e| ConsoleApiError::Serde(e.to_string()));
        }

        let body = res.text().await.unwrap_or_default();
        let message = error_message(&body);
        Err(match status {
            StatusCode::UNAUTHORIZED => ConsoleApiError::Unauthorized,
            StatusCode::FORBIDDEN => ConsoleApiError::Forbidden(message),
            s => ConsoleApiError::Http {
                status: s.as_u16(),
                body: message,
            },
        })
    }

    /// Exchange credentials for tokens. Sent without any bearer token.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<LoginResponse, ConsoleApiError> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        self.send(self.http.post(self.url("auth/login")?).json(&request))
            .await
    }

    pub async fn list_fields(&self) -> Result<Vec<FieldDescriptor>, ConsoleApiError> {
        self.send(self.request(Method::GET, "fields")?).await
    }

    pub async fn create_field(
        &self,
        descriptor: &FieldDescriptor,
    ) -> Result<FieldDescriptor, ConsoleApiError> {
        self.send(self.request(Method::POST, "fields")?.json(descriptor))
            .await
    }

    pub async fn delete_field(&self, id: Uuid) -> Result<(), ConsoleApiError> {
        self.send_empty(self.request(Method::DELETE, &format!("fields/{}", id))?)
            .await
    }

    pub async fn list_members(&self, query: &MemberQuery) -> Result<Vec<Member>, ConsoleApiError> {
        self.send(self.request(Method::GET, "members")?.query(query))
            .await
    }

    pub async fn get_member(&self, id: Uuid) -> Result<Member, ConsoleApiError> {
        self.send(self.request(Method::GET, &format!("members/{}", id))?)
            .await
    }

    pub async fn create_member(&self, payload: &MemberPayload) -> Result<Member, ConsoleApiError> {
        self.send(self.request(Method::POST, "members")?.json(payload))
            .await
    }

    pub async fn update_member(
        &self,
        id: Uuid,
        payload: &MemberPayload,
    ) -> Result<Member, ConsoleApiError> {
        self.send(
            self.request(Method::PUT, &format!("members/{}", id))?
                .json(payload),
        )
        .await
    }

    pub async fn delete_member(&self, id: Uuid) -> Result<(), ConsoleApiError> {
        self.send_empty(self.request(Method::DELETE, &format!("members/{}", id))?)
            .await
    }

    pub async fn list_collections(
        &self,
        filter: &CollectionFilter,
    ) -> Result<Vec<Collection>, ConsoleApiError> {
        self.send(self.request(Method::GET, "collections")?.query(filter))
            .await
    }

    pub async fn create_collection(
        &self,
        collection: &CreateCollection,
    ) -> Result<Collection, ConsoleApiError> {
        self.send(self.request(Method::POST, "collections")?.json(collection))
            .await
    }

    pub async fn update_collection(
        &self,
        id: Uuid,
        collection: &CreateCollection,
    ) -> Result<Collection, ConsoleApiError> {
        self.send(
            self.request(Method::PUT, &format!("collections/{}", id))?
                .json(collection),
        )
        .await
    }

    pub async fn delete_collection(&self, id: Uuid) -> Result<(), ConsoleApiError> {
        self.send_empty(self.request(Method::DELETE, &format!("collections/{}", id))?)
            .await
    }

    pub async fn list_entities(&self) -> Result<Vec<Entity>, ConsoleApiError> {
        self.send(self.request(Method::GET, "entities")?).await
    }

    pub async fn create_entity(&self, entity: &CreateEntity) -> Result<Entity, ConsoleApiError> {
        self.send(self.request(Method::POST, "entities")?.json(entity))
            .await
    }

    pub async fn update_entity(
        &self,
        id: Uuid,
        update: &UpdateEntity,
    ) -> Result<Entity, ConsoleApiError> {
        self.send(
            self.request(Method::PUT, &format!("entities/{}", id))?
                .json(update),
        )
        .await
    }

    pub async fn delete_entity(&self, id: Uuid) -> Result<(), ConsoleApiError> {
        self.send_empty(self.request(Method::DELETE, &format!("entities/{}", id))?)
            .await
    }

    pub async fn list_users(&self) -> Result<Vec<User>, ConsoleApiError> {
        self.send(self.request(Method::GET, "users")?).await
    }

    pub async fn create_user(&self, user: &CreateUser) -> Result<User, ConsoleApiError> {
        self.send(self.request(Method::POST, "users")?.json(user))
            .await
    }

    pub async fn update_user(
        &self,
        id: Uuid,
        update: &UpdateUser,
    ) -> Result<User, ConsoleApiError> {
        self.send(
            self.request(Method::PUT, &format!("users/{}", id))?
                .json(update),
        )
        .await
    }

    pub async fn delete_user(&self, id: Uuid) -> Result<(), ConsoleApiError> {
        self.send_empty(self.request(Method::DELETE, &format!("users/{}", id))?)
            .await
    }
}

#[async_trait]
impl FieldSource for ConsoleApiClient {
    async fn fetch_fields(&self) -> Result<Vec<FieldDescriptor>, ConsoleApiError> {
        self.list_fields().await
    }
}

fn map_reqwest_error(e: reqwest::Error) -> ConsoleApiError {
    if e.is_timeout() {
        ConsoleApiError::Timeout
    } else {
        ConsoleApiError::Transport(e.to_string())
    }
}

/// Prefer the envelope's message over the raw body
fn error_message(body: &str) -> String {
    serde_json::from_str::<ApiResponse<serde_json::Value>>(body)
        .ok()
        .and_then(|envelope| envelope.message)
        .unwrap_or_else(|| body.trim().to_string())
}
