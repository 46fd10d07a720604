/// Social account model
///
/// Stores the page-level credentials obtained at the end of the OAuth
/// callback. One row per (user, platform), enforced by
/// `social_accounts_user_platform_key`.
///
/// For Facebook the connected entity is a page, so `page_id` should equal
/// `account_id`. For Instagram `account_id` is the business account and
/// `page_id` the Facebook page it is linked to. Older rows may be missing
/// `page_id`; [`SocialAccount::repair_missing_page_ids`] fixes them.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE social_accounts (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     platform VARCHAR(32) NOT NULL,
///     account_id VARCHAR(255) NOT NULL,
///     page_id VARCHAR(255),
///     account_name VARCHAR(255),
///     access_token TEXT NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     CONSTRAINT social_accounts_user_platform_key UNIQUE (user_id, platform)
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::PgPool;
use std::{fmt, str::FromStr};
use uuid::Uuid;

use super::UnknownVariant;

/// Supported publishing platforms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Facebook,
    Instagram,
}

impl Platform {
    pub const ALL: [Platform; 2] = [Platform::Facebook, Platform::Instagram];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Facebook => "facebook",
            Platform::Instagram => "instagram",
        }
    }

    /// Human-readable name for pages and messages
    pub fn display_name(&self) -> &'static str {
        match self {
            Platform::Facebook => "Facebook",
            Platform::Instagram => "Instagram",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "facebook" => Ok(Platform::Facebook),
            "instagram" => Ok(Platform::Instagram),
            _ => Err(UnknownVariant::new("platform", s)),
        }
    }
}

impl TryFrom<String> for Platform {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Connected social account
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SocialAccount {
    pub id: Uuid,
    pub user_id: Uuid,

    #[sqlx(try_from = "String")]
    pub platform: Platform,

    /// Platform-side account (page ID or Instagram business account ID)
    pub account_id: String,

    /// Facebook page the account publishes through
    pub page_id: Option<String>,

    pub account_name: Option<String>,

    /// Page access token; never serialized
    #[serde(skip_serializing, default)]
    pub access_token: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for connecting (or reconnecting) an account
#[derive(Debug, Clone)]
pub struct UpsertSocialAccount {
    pub user_id: Uuid,
    pub platform: Platform,
    pub account_id: String,
    pub page_id: Option<String>,
    pub account_name: Option<String>,
    pub access_token: String,
}

const COLUMNS: &str =
    "id, user_id, platform, account_id, page_id, account_name, access_token, created_at, updated_at";

impl SocialAccount {
    /// Inserts the account or replaces the credentials of the existing one
    pub async fn upsert(pool: &PgPool, data: UpsertSocialAccount) -> Result<Self, sqlx::Error> {
        let query = format!(
            r#"
            INSERT INTO social_accounts (user_id, platform, account_id, page_id, account_name, access_token)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (user_id, platform) DO UPDATE
            SET account_id = EXCLUDED.account_id,
                page_id = EXCLUDED.page_id,
                account_name = EXCLUDED.account_name,
                access_token = EXCLUDED.access_token,
                updated_at = NOW()
            RETURNING {}
            "#,
            COLUMNS
        );

        sqlx::query_as::<_, SocialAccount>(&query)
            .bind(data.user_id)
            .bind(data.platform.as_str())
            .bind(data.account_id)
            .bind(data.page_id)
            .bind(data.account_name)
            .bind(data.access_token)
            .fetch_one(pool)
            .await
    }

    /// Stored credentials for one platform
    pub async fn find_for_user(
        pool: &PgPool,
        user_id: Uuid,
        platform: Platform,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM social_accounts WHERE user_id = $1 AND platform = $2",
            COLUMNS
        );

        sqlx::query_as::<_, SocialAccount>(&query)
            .bind(user_id)
            .bind(platform.as_str())
            .fetch_optional(pool)
            .await
    }

    pub async fn list_by_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM social_accounts WHERE user_id = $1 ORDER BY platform",
            COLUMNS
        );

        sqlx::query_as::<_, SocialAccount>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Disconnects a platform; returns whether a row was removed
    pub async fn delete_for_user(
        pool: &PgPool,
        user_id: Uuid,
        platform: Platform,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM social_accounts WHERE user_id = $1 AND platform = $2")
            .bind(user_id)
            .bind(platform.as_str())
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Diagnostic view of a user's accounts as a JSON aggregate
    ///
    /// `json_agg` yields SQL `NULL` when the user has no accounts, so the
    /// result is optional and should go through
    /// [`crate::db::rows::normalize_rows`].
    pub async fn diagnostics(pool: &PgPool, user_id: Uuid) -> Result<Option<JsonValue>, sqlx::Error> {
        sqlx::query_scalar::<_, Option<JsonValue>>(
            r#"
            SELECT json_agg(
                json_build_object(
                    'id', id,
                    'platform', platform,
                    'accountId', account_id,
                    'pageId', page_id,
                    'accountName', account_name,
                    'missingPageId', page_id IS NULL,
                    'updatedAt', updated_at
                )
                ORDER BY platform
            )
            FROM social_accounts
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_one(pool)
        .await
    }

    /// Sets `page_id = account_id` on the user's Facebook accounts missing it
    ///
    /// Rows are locked and updated one at a time inside a single
    /// transaction; either every affected row is repaired or none is.
    /// Returns the repaired account IDs.
    pub async fn repair_missing_page_ids(
        pool: &PgPool,
        user_id: Uuid,
    ) -> Result<Vec<Uuid>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let broken: Vec<Uuid> = sqlx::query_scalar(
            r#"
            SELECT id FROM social_accounts
            WHERE user_id = $1 AND platform = $2 AND page_id IS NULL
            FOR UPDATE
            "#,
        )
        .bind(user_id)
        .bind(Platform::Facebook.as_str())
        .fetch_all(&mut *tx)
        .await?;

        for id in &broken {
            sqlx::query(
                "UPDATE social_accounts SET page_id = account_id, updated_at = NOW() WHERE id = $1",
            )
            .bind(id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        if !broken.is_empty() {
            tracing::info!(user_id = %user_id, repaired = broken.len(), "Repaired missing page ids");
        }

        Ok(broken)
    }

    /// Page the publish call should target
    pub fn target_page_id(&self) -> &str {
        self.page_id.as_deref().unwrap_or(&self.account_id)
    }
}
