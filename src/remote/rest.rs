//! PostgREST implementation of `BackendApi`
//!
//! Talks to the hosted backend's REST gateway:
//! - RPCs: `POST {url}/rest/v1/rpc/<function>`
//! - relations: `POST|DELETE {url}/rest/v1/<table>` with `column=eq.value` filters
//!
//! Every request carries the project `apikey` header plus a bearer token (the
//! signed-in viewer's access token when one was provided, the anon key
//! otherwise).

use super::error::RemoteError;
use super::models::*;
use super::traits::{BackendApi, RemoteResult};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use uuid::Uuid;

/// PostgREST error body (`{"message": ..., "code": ..., "details": ..., "hint": ...}`)
#[derive(Debug, Deserialize)]
struct PostgrestError {
    message: String,
    #[serde(default)]
    code: Option<String>,
}

/// HTTP client for the backend's REST gateway.
///
/// Cheaply cloneable (shares the reqwest client internally).
#[derive(Clone)]
pub struct RestBackend {
    client: reqwest::Client,
    base_url: String,
    anon_key: String,
    access_token: Option<String>,
}

impl RestBackend {
    /// Create a client for `base_url` (e.g. `https://xyz.supabase.co`).
    pub fn new(base_url: &str, anon_key: &str, timeout: Duration) -> RemoteResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RemoteError::network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
            access_token: None,
        })
    }

    /// Authenticate subsequent requests as the given session.
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    fn rpc_url(&self, function: &str) -> String {
        format!("{}/rest/v1/rpc/{}", self.base_url, function)
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let bearer = self.access_token.as_deref().unwrap_or(&self.anon_key);
        req.header("apikey", &self.anon_key)
            .header("Authorization", format!("Bearer {}", bearer))
    }

    async fn send(&self, req: reqwest::RequestBuilder) -> RemoteResult<reqwest::Response> {
        let response = self.authorize(req).send().await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<PostgrestError>(&body) {
            Ok(err) => match err.code {
                Some(code) => format!("{} [{}]", err.message, code),
                None => err.message,
            },
            Err(_) => body,
        };
        Err(RemoteError::from_status(status.as_u16(), message))
    }

    async fn send_json<T: DeserializeOwned>(&self, req: reqwest::RequestBuilder) -> RemoteResult<T> {
        let response = self.send(req).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| RemoteError::decode(format!("invalid response body: {e}")))
    }
}

#[async_trait]
impl BackendApi for RestBackend {
    async fn get_comments_for_post(
        &self,
        post_id: Uuid,
        viewer_id: Option<Uuid>,
    ) -> RemoteResult<Vec<CommentRow>> {
        let query = CommentsQuery { post_id, viewer_id };
        let req = self
            .client
            .post(self.rpc_url("get_comments_for_post"))
            .json(&query);
        self.send_json(req).await
    }

    async fn insert_comment(&self, row: &NewCommentRow) -> RemoteResult<InsertedComment> {
        let req = self
            .client
            .post(self.table_url("comments"))
            .query(&[("select", "id,created_at")])
            .header("Prefer", "return=representation")
            .json(row);
        let inserted: Vec<InsertedComment> = self.send_json(req).await?;
        inserted
            .into_iter()
            .next()
            .ok_or_else(|| RemoteError::decode("insert returned no row"))
    }

    async fn delete_comment(&self, comment_id: Uuid) -> RemoteResult<()> {
        let req = self
            .client
            .delete(self.table_url("comments"))
            .query(&[("id", format!("eq.{}", comment_id))]);
        self.send(req).await.map(|_| ())
    }

    async fn insert_like(&self, row: &LikeRow) -> RemoteResult<()> {
        let req = self.client.post(self.table_url(row.relation())).json(row);
        self.send(req).await.map(|_| ())
    }

    async fn delete_like(&self, row: &LikeRow) -> RemoteResult<()> {
        let filters = match row {
            LikeRow::Comment {
                comment_id,
                user_id,
            } => [
                ("comment_id", format!("eq.{}", comment_id)),
                ("user_id", format!("eq.{}", user_id)),
            ],
            LikeRow::Post { post_id, user_id } => [
                ("post_id", format!("eq.{}", post_id)),
                ("user_id", format!("eq.{}", user_id)),
            ],
        };
        let req = self
            .client
            .delete(self.table_url(row.relation()))
            .query(&filters);
        self.send(req).await.map(|_| ())
    }

    async fn get_notifications(&self) -> RemoteResult<Vec<NotificationRow>> {
        let req = self
            .client
            .post(self.rpc_url("get_notifications"))
            .json(&serde_json::json!({}));
        self.send_json(req).await
    }
}
