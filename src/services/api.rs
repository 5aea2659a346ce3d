//! Blog backend client.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::models::{
    Comment, Credentials, LikeToggle, LoginResponse, NewComment, NewPost, Post, PostUpdate,
    SignupRequest,
};

/// Operations offered by the blog backend.
///
/// Methods taking a `token` send it as a bearer credential.
#[async_trait]
pub trait BlogApi: Send + Sync {
    /// `POST /signup`
    async fn signup(&self, request: &SignupRequest) -> Result<(), ApiError>;

    /// `POST /login`
    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError>;

    /// `GET /posts/?search=<query>`
    async fn list_posts(&self, search: &str) -> Result<Vec<Post>, ApiError>;

    /// `GET /posts/:id`
    async fn get_post(&self, id: &str, token: Option<&str>) -> Result<Post, ApiError>;

    /// `GET /posts/user`
    async fn my_posts(&self, token: &str) -> Result<Vec<Post>, ApiError>;

    /// `POST /posts/`
    async fn create_post(&self, token: &str, post: &NewPost) -> Result<Post, ApiError>;

    /// `PUT /posts/:id`
    async fn update_post(&self, token: &str, id: &str, update: &PostUpdate)
        -> Result<Post, ApiError>;

    /// `DELETE /posts/:id`
    async fn delete_post(&self, token: &str, id: &str) -> Result<(), ApiError>;

    /// `POST /posts/:id/like`
    async fn toggle_like(&self, token: &str, id: &str) -> Result<LikeToggle, ApiError>;

    /// `POST /posts/:id/comments`
    async fn add_comment(
        &self,
        token: &str,
        post_id: &str,
        comment: &NewComment,
    ) -> Result<Comment, ApiError>;

    /// `DELETE /posts/:id/comments/:commentId`
    async fn delete_comment(
        &self,
        token: &str,
        post_id: &str,
        comment_id: &str,
    ) -> Result<(), ApiError>;
}

/// [`BlogApi`] over HTTP.
#[derive(Clone)]
pub struct HttpBlogApi {
    client: Client,
    base_url: String,
}

impl HttpBlogApi {
    /// Create a client for the backend described by `config`.
    pub fn new(config: &ApiConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        request
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))
    }

    async fn json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = self.send(request).await?;
        let response = check(response, ApiError::from_status).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn empty(&self, request: RequestBuilder) -> Result<(), ApiError> {
        let response = self.send(request).await?;
        check(response, ApiError::from_status).await?;
        Ok(())
    }
}

/// Pass successful responses through; classify the rest with `classify`.
async fn check(
    response: Response,
    classify: fn(u16, Option<String>) -> ApiError,
) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let detail = response
        .json::<serde_json::Value>()
        .await
        .ok()
        .and_then(|body| body.get("detail")?.as_str().map(str::to_string));
    debug!("Backend answered {} (detail: {:?})", status, detail);
    Err(classify(status.as_u16(), detail))
}

#[async_trait]
impl BlogApi for HttpBlogApi {
    async fn signup(&self, request: &SignupRequest) -> Result<(), ApiError> {
        let response = self
            .send(self.client.post(self.url("/signup")).json(request))
            .await?;
        check(response, ApiError::from_credential_status).await?;
        Ok(())
    }

    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError> {
        let response = self
            .send(self.client.post(self.url("/login")).json(credentials))
            .await?;
        let response = check(response, ApiError::from_credential_status).await?;
        response
            .json::<LoginResponse>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn list_posts(&self, search: &str) -> Result<Vec<Post>, ApiError> {
        self.json(
            self.client
                .get(self.url("/posts/"))
                .query(&[("search", search)]),
        )
        .await
    }

    async fn get_post(&self, id: &str, token: Option<&str>) -> Result<Post, ApiError> {
        let mut request = self.client.get(self.url(&format!("/posts/{}", id)));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        self.json(request).await
    }

    async fn my_posts(&self, token: &str) -> Result<Vec<Post>, ApiError> {
        self.json(self.client.get(self.url("/posts/user")).bearer_auth(token))
            .await
    }

    async fn create_post(&self, token: &str, post: &NewPost) -> Result<Post, ApiError> {
        self.json(
            self.client
                .post(self.url("/posts/"))
                .bearer_auth(token)
                .json(post),
        )
        .await
    }

    async fn update_post(
        &self,
        token: &str,
        id: &str,
        update: &PostUpdate,
    ) -> Result<Post, ApiError> {
        self.json(
            self.client
                .put(self.url(&format!("/posts/{}", id)))
                .bearer_auth(token)
                .json(update),
        )
        .await
    }

    async fn delete_post(&self, token: &str, id: &str) -> Result<(), ApiError> {
        self.empty(
            self.client
                .delete(self.url(&format!("/posts/{}", id)))
                .bearer_auth(token),
        )
        .await
    }

    async fn toggle_like(&self, token: &str, id: &str) -> Result<LikeToggle, ApiError> {
        self.json(
            self.client
                .post(self.url(&format!("/posts/{}/like", id)))
                .bearer_auth(token),
        )
        .await
    }

    async fn add_comment(
        &self,
        token: &str,
        post_id: &str,
        comment: &NewComment,
    ) -> Result<Comment, ApiError> {
        self.json(
            self.client
                .post(self.url(&format!("/posts/{}/comments", post_id)))
                .bearer_auth(token)
                .json(comment),
        )
        .await
    }

    async fn delete_comment(
        &self,
        token: &str,
        post_id: &str,
        comment_id: &str,
    ) -> Result<(), ApiError> {
        self.empty(
            self.client
                .delete(self.url(&format!("/posts/{}/comments/{}", post_id, comment_id)))
                .bearer_auth(token),
        )
        .await
    }
}
