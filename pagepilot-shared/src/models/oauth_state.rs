/// Pending OAuth states
///
/// The connect endpoint issues a state and stores its hash here; the callback
/// consumes it. Consumption deletes the row before any check runs, so a state
/// can be redeemed at most once even when the check fails.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE oauth_states (
///     state_hash CHAR(64) PRIMARY KEY,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     platform VARCHAR(32) NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     expires_at TIMESTAMPTZ NOT NULL
/// );
/// ```

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::social_account::Platform;
use crate::auth::oauth_state::{generate_state, hash_state, state_ttl};

/// Stored state row
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OAuthState {
    pub state_hash: String,
    pub user_id: Uuid,

    #[sqlx(try_from = "String")]
    pub platform: Platform,

    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Result of redeeming a state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateCheck {
    /// The state was issued to this user and is still fresh
    Valid { platform: Platform },

    /// Never issued, or already redeemed
    Unknown,

    /// Issued but past its expiry
    Expired,

    /// Issued to a different user
    WrongUser,
}

impl StateCheck {
    pub fn is_valid(&self) -> bool {
        matches!(self, StateCheck::Valid { .. })
    }

    /// Classifies a consumed row against the redeeming user
    pub fn evaluate(row: Option<&OAuthState>, user_id: Uuid, now: DateTime<Utc>) -> Self {
        match row {
            None => StateCheck::Unknown,
            Some(row) if row.user_id != user_id => StateCheck::WrongUser,
            Some(row) if row.expires_at <= now => StateCheck::Expired,
            Some(row) => StateCheck::Valid {
                platform: row.platform,
            },
        }
    }
}

impl OAuthState {
    /// Issues a new state for `user_id`, returning the plaintext value
    ///
    /// The plaintext goes to the provider and is never stored.
    pub async fn issue(
        pool: &PgPool,
        user_id: Uuid,
        platform: Platform,
    ) -> Result<String, sqlx::Error> {
        let state = generate_state();
        let expires_at = Utc::now() + state_ttl();

        sqlx::query(
            r#"
            INSERT INTO oauth_states (state_hash, user_id, platform, expires_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(hash_state(&state))
        .bind(user_id)
        .bind(platform.as_str())
        .bind(expires_at)
        .execute(pool)
        .await?;

        Ok(state)
    }

    /// Redeems a state for `user_id`; the row is deleted whatever the outcome
    pub async fn consume(
        pool: &PgPool,
        state: &str,
        user_id: Uuid,
    ) -> Result<StateCheck, sqlx::Error> {
        let row = sqlx::query_as::<_, OAuthState>(
            r#"
            DELETE FROM oauth_states
            WHERE state_hash = $1
            RETURNING state_hash, user_id, platform, created_at, expires_at
            "#,
        )
        .bind(hash_state(state))
        .fetch_optional(pool)
        .await?;

        Ok(StateCheck::evaluate(row.as_ref(), user_id, Utc::now()))
    }

    /// Removes expired states; returns how many were deleted
    pub async fn purge_expired(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM oauth_states WHERE expires_at <= NOW()")
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }
}
