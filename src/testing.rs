//! Test doubles for the view's collaborators.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Mutex,
};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use crate::{
    api::PostApi,
    error::{Error, Result},
    post::{Category, Cover, Post, PostId, PostUpdate},
    services::{Clipboard, Navigator, Notifier},
};

pub fn sample_post() -> Post {
    Post {
        id: PostId::new("7"),
        document_id: Some(PostId::new("k2f9a")),
        slug: "hello-rust".to_string(),
        title: "Hello Rust".to_string(),
        description: "A first post".to_string(),
        content: "Hello from the body.\n\n```rust\nfn main() {}\n```\n".to_string(),
        created_at: Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap(),
        categories: vec![
            Category {
                name: "rust".to_string(),
                document_id: "c1".to_string(),
            },
            Category {
                name: "cli".to_string(),
                document_id: "c2".to_string(),
            },
        ],
        cover: Some(Cover {
            url: "/uploads/cover.png".to_string(),
        }),
    }
}

fn rejected() -> Error {
    Error::Api {
        status: 400,
        name: "ValidationError".to_string(),
        message: "rejected".to_string(),
    }
}

#[derive(Default)]
pub struct FakeApi {
    post: Option<Post>,
    returning: Option<Post>,
    fail_fetch: bool,
    fail_update: bool,
    stalled: Option<String>,
    abandoned: AtomicUsize,
    fetched: Mutex<Vec<String>>,
    updates: Mutex<Vec<(PostId, PostUpdate)>>,
}

impl FakeApi {
    pub fn with_post(post: Post) -> Self {
        Self {
            post: Some(post),
            ..Self::default()
        }
    }
    pub fn empty() -> Self {
        Self::default()
    }
    pub fn failing_fetch() -> Self {
        Self {
            fail_fetch: true,
            ..Self::default()
        }
    }
    /// Answer updates with `post` instead of echoing the drafts.
    pub fn returning(mut self, post: Post) -> Self {
        self.returning = Some(post);
        self
    }
    pub fn failing_update(mut self) -> Self {
        self.fail_update = true;
        self
    }
    /// Fetches of `slug` never resolve.
    pub fn stalling(mut self, slug: &str) -> Self {
        self.stalled = Some(slug.to_string());
        self
    }
    /// Stalled fetches that were dropped before resolving.
    pub fn abandoned(&self) -> usize {
        self.abandoned.load(Ordering::SeqCst)
    }
    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }
    pub fn updates(&self) -> Vec<(PostId, PostUpdate)> {
        self.updates.lock().unwrap().clone()
    }
}

#[async_trait]
impl PostApi for FakeApi {
    async fn get_post_by_slug(&self, slug: &str) -> Result<Option<Post>> {
        self.fetched.lock().unwrap().push(slug.to_string());
        if self.stalled.as_deref() == Some(slug) {
            let _guard = Abandoned(&self.abandoned);
            std::future::pending::<()>().await;
        }
        if self.fail_fetch {
            return Err(rejected());
        }
        Ok(self.post.clone())
    }

    async fn update_post(&self, id: &PostId, update: &PostUpdate) -> Result<Post> {
        self.updates
            .lock()
            .unwrap()
            .push((id.clone(), update.clone()));
        if self.fail_update {
            return Err(rejected());
        }
        if let Some(post) = &self.returning {
            return Ok(post.clone());
        }
        let mut post = self.post.clone().ok_or_else(rejected)?;
        post.title = update.title.clone();
        post.description = update.description.clone();
        post.content = update.content.clone();
        Ok(post)
    }
}

struct Abandoned<'a>(&'a AtomicUsize);

impl Drop for Abandoned<'_> {
    fn drop(&mut self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Failure(String),
}

#[derive(Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn success(&self, message: &str) {
        self.notices
            .lock()
            .unwrap()
            .push(Notice::Success(message.to_string()));
    }
    fn failure(&self, message: &str) {
        self.notices
            .lock()
            .unwrap()
            .push(Notice::Failure(message.to_string()));
    }
}

#[derive(Default)]
pub struct MemoryClipboard {
    contents: Mutex<Option<String>>,
    broken: bool,
}

impl MemoryClipboard {
    pub fn broken() -> Self {
        Self {
            broken: true,
            ..Self::default()
        }
    }
    pub fn contents(&self) -> Option<String> {
        self.contents.lock().unwrap().clone()
    }
}

impl Clipboard for MemoryClipboard {
    fn copy(&self, text: &str) -> Result<()> {
        if self.broken {
            return Err(Error::Clipboard("no clipboard".to_string()));
        }
        *self.contents.lock().unwrap() = Some(text.to_string());
        Ok(())
    }
}

#[derive(Default)]
pub struct StaticNavigator {
    pub backs: usize,
}

impl Navigator for StaticNavigator {
    fn back(&mut self) {
        self.backs += 1;
    }
}
