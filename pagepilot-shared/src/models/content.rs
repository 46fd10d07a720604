/// Content model
///
/// A content record is a post authored (or generated) by a user. It starts as
/// a draft and ends up `published` or `failed` after a publish attempt; the
/// publish metadata columns record the outcome.
///
/// Every query takes the owning `user_id`, so one user can never read or
/// modify another user's content.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE contents (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     title VARCHAR(255),
///     body TEXT NOT NULL,
///     image_url TEXT,
///     status VARCHAR(32) NOT NULL DEFAULT 'draft',
///     platform VARCHAR(32),
///     external_post_id VARCHAR(255),
///     external_url TEXT,
///     publish_error TEXT,
///     published_at TIMESTAMPTZ,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::social_account::Platform;
use super::UnknownVariant;

/// Lifecycle of a content record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentStatus {
    #[default]
    Draft,
    Published,
    Failed,
}

impl ContentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentStatus::Draft => "draft",
            ContentStatus::Published => "published",
            ContentStatus::Failed => "failed",
        }
    }
}

impl TryFrom<String> for ContentStatus {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "draft" => Ok(ContentStatus::Draft),
            "published" => Ok(ContentStatus::Published),
            "failed" => Ok(ContentStatus::Failed),
            _ => Err(UnknownVariant::new("content status", value)),
        }
    }
}

/// Content record
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: Option<String>,
    pub body: String,
    pub image_url: Option<String>,

    #[sqlx(try_from = "String")]
    pub status: ContentStatus,

    /// Platform of the last publish attempt
    pub platform: Option<String>,

    pub external_post_id: Option<String>,
    pub external_url: Option<String>,
    pub publish_error: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a draft
#[derive(Debug, Clone)]
pub struct CreateContent {
    pub user_id: Uuid,
    pub title: Option<String>,
    pub body: String,
    pub image_url: Option<String>,
}

/// Partial update; `None` leaves a column unchanged
#[derive(Debug, Clone, Default)]
pub struct UpdateContent {
    pub title: Option<String>,
    pub body: Option<String>,
    pub image_url: Option<String>,
}

impl UpdateContent {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.body.is_none() && self.image_url.is_none()
    }
}

const COLUMNS: &str = "id, user_id, title, body, image_url, status, platform, external_post_id, \
                       external_url, publish_error, published_at, created_at, updated_at";

impl Content {
    pub async fn create(pool: &PgPool, data: CreateContent) -> Result<Self, sqlx::Error> {
        let query = format!(
            r#"
            INSERT INTO contents (user_id, title, body, image_url)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            COLUMNS
        );

        sqlx::query_as::<_, Content>(&query)
            .bind(data.user_id)
            .bind(data.title)
            .bind(data.body)
            .bind(data.image_url)
            .fetch_one(pool)
            .await
    }

    /// Finds a record owned by `user_id`
    pub async fn find_for_user(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM contents WHERE id = $1 AND user_id = $2",
            COLUMNS
        );

        sqlx::query_as::<_, Content>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Lists a user's content, newest first
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            r#"
            SELECT {} FROM contents
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
            COLUMNS
        );

        sqlx::query_as::<_, Content>(&query)
            .bind(user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count_for_user(pool: &PgPool, user_id: Uuid) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM contents WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(pool)
            .await
    }

    /// Applies a partial update; returns `None` when the record is not found
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
        data: UpdateContent,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            r#"
            UPDATE contents
            SET title = COALESCE($3, title),
                body = COALESCE($4, body),
                image_url = COALESCE($5, image_url),
                updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING {}
            "#,
            COLUMNS
        );

        sqlx::query_as::<_, Content>(&query)
            .bind(id)
            .bind(user_id)
            .bind(data.title)
            .bind(data.body)
            .bind(data.image_url)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM contents WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Records a successful publish and clears any previous error
    pub async fn mark_published(
        pool: &PgPool,
        id: Uuid,
        platform: Platform,
        post_id: &str,
        url: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE contents
            SET status = $2,
                platform = $3,
                external_post_id = $4,
                external_url = $5,
                publish_error = NULL,
                published_at = NOW(),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(ContentStatus::Published.as_str())
        .bind(platform.as_str())
        .bind(post_id)
        .bind(url)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Records a failed publish attempt
    pub async fn mark_failed(
        pool: &PgPool,
        id: Uuid,
        platform: Platform,
        error: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE contents
            SET status = $2,
                platform = $3,
                publish_error = $4,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(ContentStatus::Failed.as_str())
        .bind(platform.as_str())
        .bind(error)
        .execute(pool)
        .await?;

        Ok(())
    }
}
