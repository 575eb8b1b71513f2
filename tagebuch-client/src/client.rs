//! Typed client for the backend's `/posts` REST surface.

use reqwest::{Client, Response, StatusCode};
use std::time::Duration;
use tagebuch_common::model::{
    Id,
    post::{Post, PostDraft, PostMarker},
};
use thiserror::Error;

pub type Result<T, E = ApiError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
#[error("Building the http client failed: {0}")]
pub struct BuildClientError(#[source] reqwest::Error);

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Sending the request failed: {0}")]
    Request(#[source] reqwest::Error),
    #[error("The backend replied with status {0}")]
    Status(StatusCode),
    #[error("Decoding the response body failed: {0}")]
    Decode(#[source] reqwest::Error),
}

/// Handle to the backend data server. One method per REST call.
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, BuildClientError> {
        let http = Client::builder()
            .user_agent(concat!("tagebuch/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(BuildClientError)?;

        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }

        Ok(Self { http, base_url })
    }

    fn posts_url(&self) -> String {
        format!("{}/posts", self.base_url)
    }

    fn post_url(&self, id: Id<PostMarker>) -> String {
        format!("{}/posts/{id}", self.base_url)
    }

    pub async fn fetch_posts(&self) -> Result<Vec<Post>> {
        let response = self
            .http
            .get(self.posts_url())
            .send()
            .await
            .map_err(ApiError::Request)?;

        checked(response)?.json().await.map_err(ApiError::Decode)
    }

    pub async fn create_post(&self, draft: &PostDraft) -> Result<Post> {
        let response = self
            .http
            .post(self.posts_url())
            .json(draft)
            .send()
            .await
            .map_err(ApiError::Request)?;

        checked(response)?.json().await.map_err(ApiError::Decode)
    }

    /// Full-resource PUT. The backend may reply with the updated post or
    /// with an empty body; only the status is checked.
    pub async fn update_post(&self, post: &Post) -> Result<()> {
        let response = self
            .http
            .put(self.post_url(post.id))
            .json(post)
            .send()
            .await
            .map_err(ApiError::Request)?;

        checked(response)?;
        Ok(())
    }

    pub async fn delete_post(&self, id: Id<PostMarker>) -> Result<()> {
        let response = self
            .http
            .delete(self.post_url(id))
            .send()
            .await
            .map_err(ApiError::Request)?;

        checked(response)?;
        Ok(())
    }
}

fn checked(response: Response) -> Result<Response> {
    let status = response.status();

    if status.is_success() {
        Ok(response)
    } else {
        Err(ApiError::Status(status))
    }
}

#[cfg(test)]
mod tests {
    use crate::client::{ApiClient, ApiError};
    use reqwest::StatusCode;
    use std::time::Duration;
    use tagebuch_common::model::{
        Id,
        post::{Comment, Post, PostDraft},
    };
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{body_json, method, path},
    };

    fn client_for(server: &MockServer) -> ApiClient {
        ApiClient::new(server.uri(), Duration::from_secs(5)).unwrap()
    }

    fn sample_post(id: u64, title: &str) -> Post {
        Post {
            id: Id::new(id),
            title: title.to_owned(),
            content: format!("content of {title}"),
            comments: vec![Comment {
                id: Id::new(1),
                content: "hi".to_owned(),
            }],
        }
    }

    #[tokio::test]
    async fn fetch_posts_preserves_backend_order() {
        let server = MockServer::start().await;
        let backend = vec![sample_post(2, "B"), sample_post(1, "A")];
        Mock::given(method("GET"))
            .and(path("/posts"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&backend))
            .expect(1)
            .mount(&server)
            .await;

        let posts = client_for(&server).fetch_posts().await.unwrap();

        assert_eq!(posts, backend);
    }

    #[tokio::test]
    async fn create_post_sends_draft_and_decodes_created_post() {
        let server = MockServer::start().await;
        let draft = PostDraft::new("A".to_owned(), "B".to_owned());
        let created = Post {
            id: Id::new(7),
            title: "A".to_owned(),
            content: "B".to_owned(),
            comments: Vec::new(),
        };
        Mock::given(method("POST"))
            .and(path("/posts"))
            .and(body_json(&draft))
            .respond_with(ResponseTemplate::new(201).set_body_json(&created))
            .expect(1)
            .mount(&server)
            .await;

        let post = client_for(&server).create_post(&draft).await.unwrap();

        assert_eq!(post, created);
    }

    #[tokio::test]
    async fn update_post_puts_the_full_post() {
        let server = MockServer::start().await;
        let post = sample_post(3, "C");
        Mock::given(method("PUT"))
            .and(path("/posts/3"))
            .and(body_json(&post))
            .respond_with(ResponseTemplate::new(200).set_body_json(&post))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server).update_post(&post).await.unwrap();
    }

    #[tokio::test]
    async fn update_post_tolerates_an_empty_response_body() {
        let server = MockServer::start().await;
        let post = sample_post(3, "C");
        Mock::given(method("PUT"))
            .and(path("/posts/3"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server).update_post(&post).await.unwrap();
    }

    #[tokio::test]
    async fn delete_post_targets_the_post_by_id() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/posts/4"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server).delete_post(Id::new(4)).await.unwrap();
    }

    #[tokio::test]
    async fn backend_failure_surfaces_as_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/posts"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let error = client_for(&server).fetch_posts().await.unwrap_err();

        assert!(matches!(
            error,
            ApiError::Status(StatusCode::INTERNAL_SERVER_ERROR)
        ));
    }

    #[tokio::test]
    async fn garbage_response_surfaces_as_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/posts"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let error = client_for(&server).fetch_posts().await.unwrap_err();

        assert!(matches!(error, ApiError::Decode(_)));
    }
}
