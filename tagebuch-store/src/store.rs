//! The in-memory post collection and its synchronization with the backend.
//!
//! Every mutating operation follows one policy: the backend round-trip comes
//! first, and local state changes only after it succeeds. On failure the
//! collection is left exactly as it was and the error is returned to the
//! caller (and logged).
//!
//! Operations take `&mut self`, so a store never has more than one request
//! in flight and a superseded response cannot be applied out of order.

use std::sync::Arc;
use tagebuch_client::client::{ApiClient, ApiError};
use tagebuch_common::model::{
    Id,
    post::{Post, PostDraft, PostMarker},
};
use thiserror::Error;
use tracing::error;

pub type Result<T, E = StoreError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Post with id {0} is not in the local collection.")]
    UnknownPost(Id<PostMarker>),
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Immutable view of the collection at one point in time.
///
/// The revision increases with every successful mutation, so a caller
/// holding an old snapshot can tell it is stale.
#[derive(Clone, Debug)]
pub struct Snapshot {
    posts: Arc<[Post]>,
    revision: u64,
}

impl Snapshot {
    #[must_use]
    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    #[must_use]
    pub fn find(&self, id: Id<PostMarker>) -> Option<&Post> {
        self.posts.iter().find(|post| post.id == id)
    }
}

/// Authoritative post collection for one session, newest first.
#[derive(Debug)]
pub struct PostStore {
    client: ApiClient,
    posts: Vec<Post>,
    revision: u64,
}

impl PostStore {
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            posts: Vec::new(),
            revision: 0,
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            posts: self.posts.clone().into(),
            revision: self.revision,
        }
    }

    /// Rehydrates the collection from the backend, replacing local state
    /// wholesale. Invoked once per session start.
    pub async fn load(&mut self) -> Result<Snapshot> {
        let posts = self
            .client
            .fetch_posts()
            .await
            .inspect_err(log_backend_failure)?;

        self.posts = posts;
        Ok(self.bump())
    }

    /// Creates the draft on the backend and prepends the canonical post,
    /// with its assigned id, to the collection.
    pub async fn add(&mut self, draft: PostDraft) -> Result<Snapshot> {
        let post = self
            .client
            .create_post(&draft)
            .await
            .inspect_err(log_backend_failure)?;

        self.posts.insert(0, post);
        Ok(self.bump())
    }

    /// Deletes the post on the backend, then filters it out locally. No
    /// optimistic removal.
    pub async fn remove(&mut self, post_id: Id<PostMarker>) -> Result<Snapshot> {
        self.client
            .delete_post(post_id)
            .await
            .inspect_err(log_backend_failure)?;

        self.posts.retain(|post| post.id != post_id);
        Ok(self.bump())
    }

    /// Replaces the whole post on the backend, then in the collection. The
    /// post must already be present locally.
    pub async fn update(&mut self, post: Post) -> Result<Snapshot> {
        let index = self.index_of(post.id)?;

        self.client
            .update_post(&post)
            .await
            .inspect_err(log_backend_failure)?;

        self.posts[index] = post;
        Ok(self.bump())
    }

    /// Appends a comment with the next sequence id to the target post and
    /// pushes the result through the same update path as [`update`].
    ///
    /// [`update`]: PostStore::update
    pub async fn add_comment(
        &mut self,
        post_id: Id<PostMarker>,
        content: String,
    ) -> Result<Snapshot> {
        let index = self.index_of(post_id)?;
        let updated = self.posts[index].clone().with_comment(content);

        self.update(updated).await
    }

    fn index_of(&self, post_id: Id<PostMarker>) -> Result<usize> {
        self.posts
            .iter()
            .position(|post| post.id == post_id)
            .ok_or(StoreError::UnknownPost(post_id))
    }

    fn bump(&mut self) -> Snapshot {
        self.revision += 1;
        self.snapshot()
    }
}

fn log_backend_failure(error: &ApiError) {
    error!(%error, "Backend call failed, local collection left unchanged");
}
