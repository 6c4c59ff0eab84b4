//! HTTP implementation of the remote document store

use super::RemoteStore;
use crate::config::RemoteConfig;
use crate::error::{ClientError, ClientResult};
use crate::repositories::Collection;
use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Remote store over a JSON REST API with bearer-token auth
pub struct HttpRemoteStore {
    base_url: Url,
    api_key: Option<SecretString>,
    client: Client,
}

impl std::fmt::Debug for HttpRemoteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpRemoteStore")
            .field("base_url", &self.base_url.as_str())
            .field("authenticated", &self.api_key.is_some())
            .finish()
    }
}

impl HttpRemoteStore {
    /// Create a store from the `remote` config section
    pub fn new(config: &RemoteConfig) -> ClientResult<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| ClientError::Validation(format!("Invalid remote base URL: {}", e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::Validation(format!(
                "Remote base URL cannot hold paths: {}",
                config.base_url
            )));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("neurolift-client/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            base_url,
            api_key: config.api_key.clone().map(SecretString::new),
            client,
        })
    }

    fn url(&self, segments: &[&str]) -> ClientResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::Validation("Remote base URL cannot hold paths".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key.expose_secret()),
            None => request,
        }
    }
}

/// Turn a non-success response into `ClientError::Remote`
async fn check(response: Response) -> ClientResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(ClientError::Remote {
        status: status.as_u16(),
        message: if message.is_empty() {
            status.canonical_reason().unwrap_or("unknown").to_string()
        } else {
            message
        },
    })
}

#[async_trait]
impl RemoteStore for HttpRemoteStore {
    async fn put_document(&self, user_id: &str, collection: Collection, id: &str, body: &Value) -> ClientResult<()> {
        let url = self.url(&["users", user_id, collection.as_str(), id])?;

        let mut payload = body.clone();
        if let Value::Object(map) = &mut payload {
            map.insert("syncedAt".to_string(), Value::String(Utc::now().to_rfc3339()));
        }

        debug!(%url, "PUT document");
        let response = self.authorize(self.client.put(url)).json(&payload).send().await?;
        check(response).await?;
        Ok(())
    }

    async fn list_documents(&self, user_id: &str, collection: Collection) -> ClientResult<Vec<Value>> {
        let url = self.url(&["users", user_id, collection.as_str()])?;

        debug!(%url, "GET collection");
        let response = self.authorize(self.client.get(url)).send().await?;
        let documents = check(response).await?.json::<Vec<Value>>().await?;
        Ok(documents)
    }

    async fn delete_document(&self, user_id: &str, collection: Collection, id: &str) -> ClientResult<()> {
        let url = self.url(&["users", user_id, collection.as_str(), id])?;

        debug!(%url, "DELETE document");
        let response = self.authorize(self.client.delete(url)).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(());
        }
        check(response).await?;
        Ok(())
    }
}
