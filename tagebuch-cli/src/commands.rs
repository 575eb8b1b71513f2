//! Subcommands mirroring the pages of the original front end: list, show,
//! write, edit, delete, comment, and the gate in front of edit/delete.

use clap::{Parser, Subcommand};
use std::fmt::{self, Display, Formatter};
use tagebuch_common::{
    gate::{GateHashError, GateKey},
    model::{
        Id,
        post::{Post, PostDraft, PostMarker},
    },
};
use tagebuch_store::store::{PostStore, Snapshot, StoreError};
use thiserror::Error;
use tracing::warn;

#[derive(Parser, Debug)]
#[command(name = "tagebuch", about = "Command-line front end for a tagebuch blog backend")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List all posts, newest first
    List,
    /// Show one post with its comment thread
    Show { id: Id<PostMarker> },
    /// Create a new post
    Write {
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
    },
    /// Edit a post; unchanged fields keep their current value (gated)
    Edit {
        id: Id<PostMarker>,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
        #[arg(long)]
        passphrase: Option<String>,
    },
    /// Delete a post (gated)
    Delete {
        id: Id<PostMarker>,
        #[arg(long)]
        passphrase: Option<String>,
    },
    /// Comment on a post
    Comment { id: Id<PostMarker>, content: String },
    /// Derive a gate key string for TAGEBUCH_GATE_KEY from a passphrase
    GateKey { passphrase: String },
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub enum GateAction {
    Edit,
    Delete,
}

impl Display for GateAction {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            GateAction::Edit => f.write_str("edit"),
            GateAction::Delete => f.write_str("delete"),
        }
    }
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("The gate rejected the {0} action")]
    GateDenied(GateAction),
    #[error(transparent)]
    GateHash(#[from] GateHashError),
}

pub async fn run(
    command: Command,
    mut store: PostStore,
    gate_key: Option<&GateKey>,
) -> Result<(), CommandError> {
    match command {
        Command::List => {
            let snapshot = store.load().await?;
            render_list(&snapshot);
        }
        Command::Show { id } => {
            let snapshot = store.load().await?;
            let post = snapshot.find(id).ok_or(StoreError::UnknownPost(id))?;
            render_post(post);
        }
        Command::Write { title, content } => {
            store.load().await?;
            let snapshot = store.add(PostDraft::new(title, content)).await?;
            if let Some(post) = snapshot.posts().first() {
                println!("Created post {}", post.id);
            }
        }
        Command::Edit {
            id,
            title,
            content,
            passphrase,
        } => {
            check_gate(gate_key, GateAction::Edit, passphrase.as_deref())?;
            let snapshot = store.load().await?;
            let mut post = snapshot
                .find(id)
                .cloned()
                .ok_or(StoreError::UnknownPost(id))?;
            if let Some(title) = title {
                post.title = title;
            }
            if let Some(content) = content {
                post.content = content;
            }
            store.update(post).await?;
            println!("Updated post {id}");
        }
        Command::Delete { id, passphrase } => {
            check_gate(gate_key, GateAction::Delete, passphrase.as_deref())?;
            store.load().await?;
            store.remove(id).await?;
            println!("Deleted post {id}");
        }
        Command::Comment { id, content } => {
            store.load().await?;
            let snapshot = store.add_comment(id, content).await?;
            if let Some(comment) = snapshot.find(id).and_then(|post| post.comments.last()) {
                println!("Added comment {} to post {id}", comment.id);
            }
        }
        Command::GateKey { passphrase } => {
            let key = GateKey::derive(&passphrase)?;
            println!("{}", key.as_key_str());
        }
    }

    Ok(())
}

fn check_gate(
    key: Option<&GateKey>,
    action: GateAction,
    passphrase: Option<&str>,
) -> Result<(), CommandError> {
    let Some(key) = key else {
        warn!(%action, "No gate key configured, allowing the action");
        return Ok(());
    };

    let passphrase = passphrase.ok_or(CommandError::GateDenied(action))?;
    if key.verify(passphrase)? {
        Ok(())
    } else {
        Err(CommandError::GateDenied(action))
    }
}

fn render_list(snapshot: &Snapshot) {
    if snapshot.posts().is_empty() {
        println!("No posts yet.");
        return;
    }

    for post in snapshot.posts() {
        println!(
            "{:>6}  {}  ({} comments)",
            post.id,
            post.title,
            post.comments.len()
        );
    }
}

fn render_post(post: &Post) {
    println!("#{} {}", post.id, post.title);
    println!();
    println!("{}", post.content);

    if !post.comments.is_empty() {
        println!();
        println!("Comments:");
        for comment in &post.comments {
            println!("  {}. {}", comment.id, comment.content);
        }
    }
}
