use crate::model::Id;
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct PostMarker;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct CommentMarker;

/// A blog entry as stored by the backend. The comment thread is embedded
/// in the post resource, so a full-post PUT carries it along.
#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Deserialize, Serialize)]
pub struct Post {
    pub id: Id<PostMarker>,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Deserialize, Serialize)]
pub struct Comment {
    pub id: Id<CommentMarker>,
    pub content: String,
}

/// A post before the backend has assigned it an id. Serializes with an
/// empty comment thread so the created resource is complete from birth.
#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Deserialize, Serialize)]
pub struct PostDraft {
    pub title: String,
    pub content: String,
    pub comments: Vec<Comment>,
}

impl Post {
    /// Next comment id for this post. One past the largest existing id, so
    /// ids stay unique even if the sequence ever has gaps.
    #[must_use]
    pub fn next_comment_id(&self) -> Id<CommentMarker> {
        let max = self
            .comments
            .iter()
            .map(|comment| comment.id.get())
            .max()
            .unwrap_or(0);

        Id::new(max + 1)
    }

    #[must_use]
    pub fn with_comment(mut self, content: String) -> Self {
        let comment = Comment {
            id: self.next_comment_id(),
            content,
        };
        self.comments.push(comment);

        self
    }
}

impl PostDraft {
    #[must_use]
    pub fn new(title: String, content: String) -> Self {
        Self {
            title,
            content,
            comments: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::model::{
        Id,
        post::{Comment, Post, PostDraft},
    };

    fn post_with_comment_ids(ids: &[u64]) -> Post {
        Post {
            id: Id::new(1),
            title: "A".to_owned(),
            content: "content".to_owned(),
            comments: ids
                .iter()
                .map(|&id| Comment {
                    id: Id::new(id),
                    content: format!("comment {id}"),
                })
                .collect(),
        }
    }

    #[test]
    fn first_comment_gets_id_one() {
        assert_eq!(post_with_comment_ids(&[]).next_comment_id(), Id::new(1));
    }

    #[test]
    fn comment_ids_continue_the_sequence() {
        assert_eq!(post_with_comment_ids(&[1, 2]).next_comment_id(), Id::new(3));
    }

    #[test]
    fn comment_ids_skip_past_gaps() {
        assert_eq!(post_with_comment_ids(&[1, 5]).next_comment_id(), Id::new(6));
    }

    #[test]
    fn with_comment_appends_and_keeps_other_fields() {
        let post = post_with_comment_ids(&[1, 2]).with_comment("hello".to_owned());

        assert_eq!(post.comments.len(), 3);
        assert_eq!(post.comments[2].id, Id::new(3));
        assert_eq!(post.comments[2].content, "hello");
        assert_eq!(post.title, "A");
        assert_eq!(post.content, "content");
    }

    #[test]
    fn post_deserializes_from_backend_shape() {
        let json = r#"{
            "id": 3,
            "title": "A",
            "content": "B",
            "comments": [{"id": 1, "content": "hi"}]
        }"#;

        let post: Post = serde_json::from_str(json).unwrap();

        assert_eq!(post.id, Id::new(3));
        assert_eq!(post.title, "A");
        assert_eq!(post.content, "B");
        assert_eq!(
            post.comments,
            vec![Comment {
                id: Id::new(1),
                content: "hi".to_owned(),
            }]
        );
    }

    #[test]
    fn missing_comments_deserialize_as_empty() {
        let post: Post =
            serde_json::from_str(r#"{"id": 1, "title": "A", "content": "B"}"#).unwrap();

        assert!(post.comments.is_empty());
    }

    #[test]
    fn draft_serializes_with_empty_comment_thread() {
        let draft = PostDraft::new("A".to_owned(), "B".to_owned());

        let json = serde_json::to_value(&draft).unwrap();

        assert_eq!(
            json,
            serde_json::json!({"title": "A", "content": "B", "comments": []})
        );
    }
}
