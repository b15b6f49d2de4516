use tracing::{info, warn};

use crate::{
    error::AppError,
    posts::{
        dto::{PostCreate, PostEdit, PostResponse, PostSearch},
        repo::PostStore,
        repo_types::{NewPost, Post},
    },
};

/// Rejects a title containing any banned word.
pub fn check_title(title: &str, banned: &[String]) -> Result<(), AppError> {
    if let Some(word) = banned.iter().find(|w| title.contains(w.as_str())) {
        warn!(word = %word, "banned word in title");
        return Err(AppError::InvalidRequest {
            field: "title",
            message: format!("title must not contain \"{word}\""),
        });
    }
    Ok(())
}

pub async fn write(
    store: &dyn PostStore,
    banned: &[String],
    create: PostCreate,
) -> Result<Post, AppError> {
    check_title(&create.title, banned)?;
    let post = store
        .insert(NewPost {
            title: create.title,
            content: create.content,
        })
        .await?;
    info!(post_id = post.id, "post written");
    Ok(post)
}

pub async fn get(store: &dyn PostStore, id: i64) -> Result<PostResponse, AppError> {
    store
        .find(id)
        .await?
        .map(PostResponse::from)
        .ok_or(AppError::PostNotFound)
}

pub async fn get_list(
    store: &dyn PostStore,
    search: PostSearch,
) -> Result<Vec<PostResponse>, AppError> {
    let posts = store.list(search.limit(), search.offset()).await?;
    Ok(posts.into_iter().map(PostResponse::from).collect())
}

pub async fn edit(
    store: &dyn PostStore,
    banned: &[String],
    id: i64,
    edit: PostEdit,
) -> Result<Post, AppError> {
    // A missing post is reported before any content rule.
    if store.find(id).await?.is_none() {
        return Err(AppError::PostNotFound);
    }
    if let Some(title) = &edit.title {
        check_title(title, banned)?;
    }
    let post = store
        .edit(id, edit.into())
        .await?
        .ok_or(AppError::PostNotFound)?;
    info!(post_id = post.id, "post edited");
    Ok(post)
}

pub async fn delete(store: &dyn PostStore, id: i64) -> Result<(), AppError> {
    if !store.delete(id).await? {
        return Err(AppError::PostNotFound);
    }
    info!(post_id = id, "post deleted");
    Ok(())
}
