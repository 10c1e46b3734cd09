mod screen;

use chrono::{DateTime, Utc};
use log::{error, info, warn};
use thiserror::Error;

use crate::{
    api::PostApi,
    config::IdField,
    error::Result,
    post::{Post, PostUpdate},
    render::{CodeBlock, Renderer},
    services::{Clipboard, Navigator, Notifier},
    time::from_now,
};

pub use screen::{CoverImage, EditForm, PostPage, Screen};

pub const FETCH_FAILED: &str = "Error fetching post.";
pub const UPDATE_SUCCEEDED: &str = "Post updated successfully!";
pub const UPDATE_FAILED: &str = "Failed to update post.";
pub const CODE_COPIED: &str = "Code copied to clipboard!";

#[derive(Debug, Clone, PartialEq)]
pub enum LoadState {
    Loading,
    Loaded(Loaded),
    /// The API answered but holds no post for the slug.
    Missing,
    LoadFailed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Loaded {
    pub post: Post,
    pub draft: PostUpdate,
    pub mode: Mode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Viewing,
    Editing,
}

/// Identifies one fetch; results for an older ticket are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket(u64);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejected {
    #[error("the post is not loaded")]
    NotLoaded,
    #[error("not in edit mode")]
    NotEditing,
    #[error("already editing")]
    AlreadyEditing,
    #[error("no code block numbered {0}")]
    NoCodeBlock(usize),
}

/// Everything rendering needs besides the view state.
pub struct RenderContext<'a> {
    pub renderer: &'a Renderer,
    pub media_url: &'a str,
    pub now: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct PostView {
    slug: String,
    id_field: IdField,
    generation: u64,
    state: LoadState,
}

impl PostView {
    pub fn new(slug: impl Into<String>, id_field: IdField) -> Self {
        Self {
            slug: slug.into(),
            id_field,
            generation: 0,
            state: LoadState::Loading,
        }
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }
    #[cfg(test)]
    pub fn state(&self) -> &LoadState {
        &self.state
    }
    pub fn is_editing(&self) -> bool {
        matches!(&self.state, LoadState::Loaded(Loaded { mode: Mode::Editing, .. }))
    }
    #[cfg(test)]
    pub fn post(&self) -> Option<&Post> {
        match &self.state {
            LoadState::Loaded(loaded) => Some(&loaded.post),
            _ => None,
        }
    }
    #[cfg(test)]
    pub fn draft(&self) -> Option<&PostUpdate> {
        match &self.state {
            LoadState::Loaded(loaded) => Some(&loaded.draft),
            _ => None,
        }
    }

    /// Point the view at `slug` and start over from `Loading`.
    pub fn begin_fetch(&mut self, slug: impl Into<String>) -> FetchTicket {
        self.slug = slug.into();
        self.generation += 1;
        self.state = LoadState::Loading;
        FetchTicket(self.generation)
    }

    pub fn apply_fetch(&mut self, ticket: FetchTicket, result: Result<Option<Post>>) {
        if ticket != FetchTicket(self.generation) {
            warn!("Dropping stale result for fetch #{}", ticket.0);
            return;
        }

        self.state = match result {
            Ok(Some(post)) => {
                info!("Loaded `{}`", post.slug);
                LoadState::Loaded(Loaded {
                    draft: PostUpdate::from(&post),
                    post,
                    mode: Mode::Viewing,
                })
            }
            Ok(None) => LoadState::Missing,
            Err(e) => {
                error!("Failed to fetch `{}`: {}", self.slug, e);
                LoadState::LoadFailed(FETCH_FAILED.to_string())
            }
        };
    }

    /// Fetch the current slug and apply the result.
    #[cfg(test)]
    pub async fn load(&mut self, api: &dyn PostApi) {
        let slug = self.slug.clone();
        let ticket = self.begin_fetch(slug.clone());
        let result = api.get_post_by_slug(&slug).await;
        self.apply_fetch(ticket, result);
    }

    pub fn edit(&mut self) -> std::result::Result<(), Rejected> {
        let loaded = self.loaded_mut()?;
        if loaded.mode == Mode::Editing {
            return Err(Rejected::AlreadyEditing);
        }
        loaded.mode = Mode::Editing;
        Ok(())
    }

    /// Leave edit mode. Drafts are kept as typed.
    pub fn cancel(&mut self) -> std::result::Result<(), Rejected> {
        let loaded = self.loaded_mut()?;
        loaded.mode = Mode::Viewing;
        Ok(())
    }

    pub fn set_title(&mut self, title: impl Into<String>) -> std::result::Result<(), Rejected> {
        self.editing_mut()?.draft.title = title.into();
        Ok(())
    }
    pub fn set_description(
        &mut self,
        description: impl Into<String>,
    ) -> std::result::Result<(), Rejected> {
        self.editing_mut()?.draft.description = description.into();
        Ok(())
    }
    pub fn set_content(&mut self, content: impl Into<String>) -> std::result::Result<(), Rejected> {
        self.editing_mut()?.draft.content = content.into();
        Ok(())
    }

    /// Push the drafts to the API. On failure the view stays in edit mode with
    /// the drafts untouched.
    pub async fn save(
        &mut self,
        api: &dyn PostApi,
        notifier: &dyn Notifier,
    ) -> std::result::Result<(), Rejected> {
        let id_field = self.id_field;
        let loaded = self.editing_mut()?;
        let id = id_field.select(&loaded.post).clone();

        match api.update_post(&id, &loaded.draft).await {
            Ok(post) => {
                info!("Saved `{}`", post.slug);
                loaded.post = post;
                loaded.mode = Mode::Viewing;
                notifier.success(UPDATE_SUCCEEDED);
            }
            Err(e) => {
                error!("Failed to update post {}: {}", id, e);
                notifier.failure(UPDATE_FAILED);
            }
        }
        Ok(())
    }

    pub fn back(&self, navigator: &mut dyn Navigator) {
        navigator.back();
    }

    pub fn render(&self, ctx: &RenderContext) -> Screen {
        match &self.state {
            LoadState::Loading => Screen::Loading,
            LoadState::LoadFailed(message) => Screen::Error(message.clone()),
            LoadState::Missing => Screen::NotFound,
            LoadState::Loaded(Loaded {
                draft,
                mode: Mode::Editing,
                ..
            }) => Screen::Edit(EditForm {
                title: draft.title.clone(),
                description: draft.description.clone(),
                content: draft.content.clone(),
            }),
            LoadState::Loaded(Loaded {
                post,
                mode: Mode::Viewing,
                ..
            }) => Screen::View(PostPage {
                title: post.title.clone(),
                published: from_now(post.created_at, ctx.now),
                categories: post
                    .categories
                    .iter()
                    .map(|category| category.name.clone())
                    .collect(),
                cover: post.cover_src(ctx.media_url).map(|src| CoverImage {
                    src,
                    alt: post.title.clone(),
                }),
                description: post.description.clone(),
                body: ctx.renderer.render(&post.content),
            }),
        }
    }

    fn loaded_mut(&mut self) -> std::result::Result<&mut Loaded, Rejected> {
        match &mut self.state {
            LoadState::Loaded(loaded) => Ok(loaded),
            _ => Err(Rejected::NotLoaded),
        }
    }

    fn editing_mut(&mut self) -> std::result::Result<&mut Loaded, Rejected> {
        let loaded = self.loaded_mut()?;
        if loaded.mode != Mode::Editing {
            return Err(Rejected::NotEditing);
        }
        Ok(loaded)
    }
}

/// Copy a code block's text to the clipboard. Failures are only logged.
pub fn copy_code(block: &CodeBlock, clipboard: &dyn Clipboard, notifier: &dyn Notifier) {
    match clipboard.copy(&block.code) {
        Ok(()) => notifier.success(CODE_COPIED),
        Err(e) => error!("Failed to copy code: {}", e),
    }
}

/// Copy the `number`-th code block of a rendered post.
pub fn copy_from_screen(
    screen: &Screen,
    number: usize,
    clipboard: &dyn Clipboard,
    notifier: &dyn Notifier,
) -> std::result::Result<(), Rejected> {
    let block = screen
        .copy_target(number)
        .ok_or(Rejected::NoCodeBlock(number))?;
    copy_code(block, clipboard, notifier);
    Ok(())
}
