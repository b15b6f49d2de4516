use serde::{Deserialize, Serialize};

use crate::{
    posts::repo_types::{Post, PostPatch},
    validation::{FieldErrors, Validate},
};

pub const MAX_PAGE_SIZE: i64 = 2000;
pub const RESPONSE_TITLE_MAX_CHARS: usize = 10;

#[derive(Debug, Clone, Deserialize)]
pub struct PostCreate {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

impl Validate for PostCreate {
    fn validate(&self, errors: &mut FieldErrors) {
        errors.require_not_blank("title", &self.title, "title is required");
        errors.require_not_blank("content", &self.content, "content is required");
    }
}

/// Partial update; a missing or `null` field keeps the stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostEdit {
    pub title: Option<String>,
    pub content: Option<String>,
}

impl Validate for PostEdit {
    fn validate(&self, errors: &mut FieldErrors) {
        if let Some(title) = &self.title {
            errors.require_not_blank("title", title, "title must not be blank");
        }
        if let Some(content) = &self.content {
            errors.require_not_blank("content", content, "content must not be blank");
        }
    }
}

impl From<PostEdit> for PostPatch {
    fn from(edit: PostEdit) -> Self {
        Self {
            title: edit.title,
            content: edit.content,
        }
    }
}

/// `?page=&size=` of the listing endpoint. Pages are 1-based.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PostSearch {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_size")]
    pub size: i64,
}
fn default_page() -> i64 {
    1
}
fn default_size() -> i64 {
    5
}

impl Default for PostSearch {
    fn default() -> Self {
        Self {
            page: default_page(),
            size: default_size(),
        }
    }
}

impl PostSearch {
    pub fn new(page: i64, size: i64) -> Self {
        Self { page, size }
    }

    /// Page size, capped at [`MAX_PAGE_SIZE`] and at least 1.
    pub fn limit(&self) -> i64 {
        self.size.clamp(1, MAX_PAGE_SIZE)
    }

    /// Rows to skip; pages below 1 read as the first page.
    pub fn offset(&self) -> i64 {
        (self.page.max(1) - 1).saturating_mul(self.limit())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostResponse {
    pub id: i64,
    pub title: String,
    pub content: String,
}

impl From<Post> for PostResponse {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            title: post.title.chars().take(RESPONSE_TITLE_MAX_CHARS).collect(),
            content: post.content,
        }
    }
}
