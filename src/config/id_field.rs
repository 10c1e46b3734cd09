use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::post::{Post, PostId};

/// Which identifier addresses a post in update calls.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, Hash, ValueEnum, PartialEq, Eq, Default)]
pub enum IdField {
    #[default]
    Id,
    DocumentId,
}

impl IdField {
    /// Falls back to `id` when the post carries no document id.
    pub fn select<'a>(&self, post: &'a Post) -> &'a PostId {
        match self {
            Self::Id => &post.id,
            Self::DocumentId => post.document_id.as_ref().unwrap_or(&post.id),
        }
    }
}

impl fmt::Display for IdField {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Id => write!(f, "id"),
            Self::DocumentId => write!(f, "document-id"),
        }
    }
}
