//! HTTP implementation of the Synchronization API endpoints
//!
//! Routes:
//! - GET    /api/v1/{watchlist|favorites}
//! - POST   /api/v1/{watchlist|favorites}
//! - DELETE /api/v1/{watchlist|favorites}/{mediaType}/{id}
//! - GET    /api/v1/favorite-actors
//! - POST   /api/v1/favorite-actors
//! - DELETE /api/v1/favorite-actors/{actor_id}
use crate::endpoint::CollectionEndpoint;
use crate::error::ApiError;
use crate::identity::TokenSource;
use async_trait::async_trait;
use cinehub_core::{
    ClientConfig, CollectionItem, CollectionKind, FavoriteActor, ItemEnvelope, ItemKey,
    ItemsEnvelope, NewCollectionItem, NewFavoriteActor,
};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;
use url::Url;

/// Shared HTTP plumbing for all collection endpoints
pub struct HttpSyncClient {
    http_client: Client,
    base_url: Url,
    tokens: Arc<dyn TokenSource>,
}

impl HttpSyncClient {
    pub fn new(config: &ClientConfig, tokens: Arc<dyn TokenSource>) -> Result<Self, ApiError> {
        let mut base_url = Url::parse(&config.api_base_url)
            .map_err(|e| ApiError::BadRequest(format!("invalid base URL: {}", e)))?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let http_client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url,
            tokens,
        })
    }

    fn url(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path)
            .map_err(|e| ApiError::BadRequest(format!("invalid path {}: {}", path, e)))
    }

    fn authorized(&self, owner: &str, request: RequestBuilder) -> Result<RequestBuilder, ApiError> {
        let token = self
            .tokens
            .bearer_token(owner)
            .ok_or(ApiError::Unauthorized)?;
        Ok(request.bearer_auth(token))
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(error_for_status(status, body))
    }

    pub async fn get_json<T: DeserializeOwned>(&self, owner: &str, path: &str) -> Result<T, ApiError> {
        let url = self.url(path)?;
        debug!("GET {}", url);
        let request = self.authorized(owner, self.http_client.get(url))?;
        let response = self.send(request).await?;
        response
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    pub async fn post_json<B, T>(&self, owner: &str, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let url = self.url(path)?;
        debug!("POST {}", url);
        let request = self.authorized(owner, self.http_client.post(url).json(body))?;
        let response = self.send(request).await?;
        response
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    pub async fn delete(&self, owner: &str, path: &str) -> Result<(), ApiError> {
        let url = self.url(path)?;
        debug!("DELETE {}", url);
        let request = self.authorized(owner, self.http_client.delete(url))?;
        self.send(request).await?;
        Ok(())
    }
}

fn transport_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        ApiError::Network(format!("request timed out: {}", err))
    } else {
        ApiError::Network(err.to_string())
    }
}

/// Map a non-success status to the client error taxonomy
pub(crate) fn error_for_status(status: StatusCode, body: String) -> ApiError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiError::Unauthorized,
        StatusCode::NOT_FOUND => ApiError::NotFound,
        StatusCode::CONFLICT => ApiError::Conflict(body),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => ApiError::BadRequest(body),
        _ => ApiError::Server {
            status: status.as_u16(),
            message: body,
        },
    }
}

/// Watchlist or favorites over HTTP
pub struct HttpCollectionEndpoint {
    client: Arc<HttpSyncClient>,
    kind: CollectionKind,
}

impl HttpCollectionEndpoint {
    pub fn new(client: Arc<HttpSyncClient>, kind: CollectionKind) -> Self {
        Self { client, kind }
    }

    fn collection_path(&self) -> String {
        format!("api/v1/{}", self.kind)
    }

    fn item_path(&self, key: &ItemKey) -> String {
        format!("api/v1/{}/{}/{}", self.kind, key.media_type, key.id)
    }
}

#[async_trait]
impl CollectionEndpoint<CollectionItem> for HttpCollectionEndpoint {
    async fn list(&self, owner: &str) -> Result<Vec<CollectionItem>, ApiError> {
        let envelope: ItemsEnvelope<CollectionItem> =
            self.client.get_json(owner, &self.collection_path()).await?;
        Ok(envelope.items)
    }

    async fn add(
        &self,
        owner: &str,
        draft: &NewCollectionItem,
    ) -> Result<CollectionItem, ApiError> {
        let envelope: ItemEnvelope<CollectionItem> = self
            .client
            .post_json(owner, &self.collection_path(), draft)
            .await?;
        Ok(envelope.item)
    }

    async fn remove(&self, owner: &str, key: &ItemKey) -> Result<(), ApiError> {
        self.client.delete(owner, &self.item_path(key)).await
    }
}

/// Favorite actors over HTTP
pub struct HttpFavoriteActorEndpoint {
    client: Arc<HttpSyncClient>,
}

impl HttpFavoriteActorEndpoint {
    const PATH: &'static str = "api/v1/favorite-actors";

    pub fn new(client: Arc<HttpSyncClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CollectionEndpoint<FavoriteActor> for HttpFavoriteActorEndpoint {
    async fn list(&self, owner: &str) -> Result<Vec<FavoriteActor>, ApiError> {
        let envelope: ItemsEnvelope<FavoriteActor> =
            self.client.get_json(owner, Self::PATH).await?;
        Ok(envelope.items)
    }

    async fn add(&self, owner: &str, draft: &NewFavoriteActor) -> Result<FavoriteActor, ApiError> {
        let envelope: ItemEnvelope<FavoriteActor> =
            self.client.post_json(owner, Self::PATH, draft).await?;
        Ok(envelope.item)
    }

    async fn remove(&self, owner: &str, actor_id: &i64) -> Result<(), ApiError> {
        let path = format!("{}/{}", Self::PATH, actor_id);
        self.client.delete(owner, &path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{IdentityProvider, Session};

    fn client_for(base_url: &str) -> HttpSyncClient {
        let config = ClientConfig {
            api_base_url: base_url.to_string(),
            ..ClientConfig::default()
        };
        HttpSyncClient::new(&config, Arc::new(IdentityProvider::new())).unwrap()
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            error_for_status(StatusCode::UNAUTHORIZED, String::new()),
            ApiError::Unauthorized
        );
        assert_eq!(
            error_for_status(StatusCode::FORBIDDEN, String::new()),
            ApiError::Unauthorized
        );
        assert_eq!(
            error_for_status(StatusCode::NOT_FOUND, String::new()),
            ApiError::NotFound
        );
        assert!(matches!(
            error_for_status(StatusCode::CONFLICT, "dup".to_string()),
            ApiError::Conflict(_)
        ));
        assert!(matches!(
            error_for_status(StatusCode::BAD_REQUEST, String::new()),
            ApiError::BadRequest(_)
        ));
        assert_eq!(
            error_for_status(StatusCode::BAD_GATEWAY, "upstream".to_string()),
            ApiError::Server {
                status: 502,
                message: "upstream".to_string()
            }
        );
    }

    #[test]
    fn test_url_join_keeps_base_path() {
        let client = client_for("https://cinehub.example.com/sync");
        let url = client.url("api/v1/watchlist").unwrap();
        assert_eq!(url.as_str(), "https://cinehub.example.com/sync/api/v1/watchlist");

        let root = client_for("http://localhost:8080");
        assert_eq!(
            root.url("api/v1/favorites").unwrap().as_str(),
            "http://localhost:8080/api/v1/favorites"
        );
    }

    #[test]
    fn test_item_path() {
        let endpoint = HttpCollectionEndpoint::new(
            Arc::new(client_for("http://localhost:8080")),
            CollectionKind::Watchlist,
        );
        assert_eq!(endpoint.item_path(&ItemKey::tv(1399)), "api/v1/watchlist/tv/1399");
    }

    #[tokio::test]
    async fn test_request_without_session_is_unauthorized() {
        let provider = Arc::new(IdentityProvider::new());
        provider.login(Session::new("alice", "token-a"));

        let client = HttpSyncClient::new(&ClientConfig::default(), provider).unwrap();

        // Token for "bob" is never handed out while "alice" is signed in
        let result: Result<ItemsEnvelope<CollectionItem>, _> =
            client.get_json("bob", "api/v1/watchlist").await;
        assert_eq!(result.unwrap_err(), ApiError::Unauthorized);
    }
}
