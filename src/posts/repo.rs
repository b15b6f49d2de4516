use std::collections::BTreeMap;

use anyhow::Context;
use axum::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;
use tokio::sync::RwLock;

use crate::posts::repo_types::{NewPost, Post, PostPatch};

/// Post store. Listings are always newest (highest id) first.
#[async_trait]
pub trait PostStore: Send + Sync {
    async fn insert(&self, new: NewPost) -> anyhow::Result<Post>;

    async fn find(&self, id: i64) -> anyhow::Result<Option<Post>>;

    async fn list(&self, limit: i64, offset: i64) -> anyhow::Result<Vec<Post>>;

    /// Applies `patch` atomically; `None` when the post does not exist.
    async fn edit(&self, id: i64, patch: PostPatch) -> anyhow::Result<Option<Post>>;

    /// `false` when the post does not exist.
    async fn delete(&self, id: i64) -> anyhow::Result<bool>;
}

pub struct PgPostStore {
    db: PgPool,
}

impl PgPostStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PostStore for PgPostStore {
    async fn insert(&self, new: NewPost) -> anyhow::Result<Post> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            INSERT INTO posts (title, content)
            VALUES ($1, $2)
            RETURNING id, title, content, created_at
            "#,
        )
        .bind(&new.title)
        .bind(&new.content)
        .fetch_one(&self.db)
        .await
        .context("insert post")?;
        Ok(post)
    }

    async fn find(&self, id: i64) -> anyhow::Result<Option<Post>> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            SELECT id, title, content, created_at
            FROM posts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("find post")?;
        Ok(post)
    }

    async fn list(&self, limit: i64, offset: i64) -> anyhow::Result<Vec<Post>> {
        let rows = sqlx::query_as::<_, Post>(
            r#"
            SELECT id, title, content, created_at
            FROM posts
            ORDER BY id DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db)
        .await
        .context("list posts")?;
        Ok(rows)
    }

    async fn edit(&self, id: i64, patch: PostPatch) -> anyhow::Result<Option<Post>> {
        let mut tx = self.db.begin().await.context("begin edit post")?;

        let current = sqlx::query_as::<_, Post>(
            r#"
            SELECT id, title, content, created_at
            FROM posts
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .context("lock post")?;

        let Some(mut post) = current else {
            return Ok(None);
        };
        post.apply(patch);

        sqlx::query(
            r#"
            UPDATE posts
               SET title = $2, content = $3
             WHERE id = $1
            "#,
        )
        .bind(post.id)
        .bind(&post.title)
        .bind(&post.content)
        .execute(&mut *tx)
        .await
        .context("update post")?;

        tx.commit().await.context("commit edit post")?;
        Ok(Some(post))
    }

    async fn delete(&self, id: i64) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await
            .context("delete post")?;
        Ok(result.rows_affected() > 0)
    }
}

#[derive(Default)]
struct MemoryPosts {
    next_id: i64,
    rows: BTreeMap<i64, Post>,
}

/// Posts kept in process memory; one lock makes every edit atomic.
#[derive(Default)]
pub struct MemoryPostStore {
    inner: RwLock<MemoryPosts>,
}

impl MemoryPostStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn count(&self) -> usize {
        self.inner.read().await.rows.len()
    }
}

#[async_trait]
impl PostStore for MemoryPostStore {
    async fn insert(&self, new: NewPost) -> anyhow::Result<Post> {
        let mut inner = self.inner.write().await;
        inner.next_id += 1;
        let post = Post {
            id: inner.next_id,
            title: new.title,
            content: new.content,
            created_at: OffsetDateTime::now_utc(),
        };
        inner.rows.insert(post.id, post.clone());
        Ok(post)
    }

    async fn find(&self, id: i64) -> anyhow::Result<Option<Post>> {
        Ok(self.inner.read().await.rows.get(&id).cloned())
    }

    async fn list(&self, limit: i64, offset: i64) -> anyhow::Result<Vec<Post>> {
        let limit = usize::try_from(limit).context("negative limit")?;
        let offset = usize::try_from(offset).context("negative offset")?;
        let inner = self.inner.read().await;
        Ok(inner
            .rows
            .values()
            .rev()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn edit(&self, id: i64, patch: PostPatch) -> anyhow::Result<Option<Post>> {
        let mut inner = self.inner.write().await;
        Ok(inner.rows.get_mut(&id).map(|post| {
            post.apply(patch);
            post.clone()
        }))
    }

    async fn delete(&self, id: i64) -> anyhow::Result<bool> {
        Ok(self.inner.write().await.rows.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seeded(n: usize) -> MemoryPostStore {
        let store = MemoryPostStore::new();
        for i in 0..n {
            store
                .insert(NewPost {
                    title: format!("title {i}"),
                    content: format!("content {i}"),
                })
                .await
                .unwrap();
        }
        store
    }

    #[tokio::test]
    async fn list_is_newest_first() {
        let store = seeded(10).await;
        let page = store.list(5, 0).await.unwrap();
        let ids: Vec<i64> = page.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![10, 9, 8, 7, 6]);

        let next = store.list(5, 5).await.unwrap();
        assert_eq!(next.first().map(|p| p.id), Some(5));
        assert_eq!(next.last().map(|p| p.id), Some(1));
    }

    #[tokio::test]
    async fn offset_past_end_is_empty() {
        let store = seeded(3).await;
        assert!(store.list(5, 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn ids_are_not_reused_after_delete() {
        let store = seeded(2).await;
        assert!(store.delete(2).await.unwrap());
        let post = store
            .insert(NewPost {
                title: "t".into(),
                content: "c".into(),
            })
            .await
            .unwrap();
        assert_eq!(post.id, 3);
    }

    #[tokio::test]
    async fn edit_and_delete_missing() {
        let store = seeded(1).await;
        assert!(store.edit(42, PostPatch::default()).await.unwrap().is_none());
        assert!(!store.delete(42).await.unwrap());
        assert_eq!(store.count().await, 1);
    }
}
