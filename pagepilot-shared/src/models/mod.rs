/// Database models for PagePilot
///
/// Each model owns its inline SQL. Enumerated columns are stored as text and
/// converted through `TryFrom<String>` when rows are decoded.
///
/// # Models
///
/// - `user`: Accounts, plus transactional registration with a subscription
/// - `subscription`: Plan and billing status per user
/// - `social_account`: Connected Facebook/Instagram credentials
/// - `content`: Authored posts and their publish metadata
/// - `oauth_state`: Pending OAuth anti-forgery states
///
/// # Example
///
/// ```no_run
/// use pagepilot_shared::models::user::{CreateUser, User};
/// use pagepilot_shared::models::subscription::Plan;
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// let (user, subscription) = User::register(
///     &pool,
///     CreateUser {
///         name: "Ana".to_string(),
///         email: "ana@example.com".to_string(),
///         password_hash: "$argon2id$...".to_string(),
///     },
///     Plan::Pro,
/// )
/// .await?;
/// assert_eq!(subscription.user_id, user.id);
/// # Ok(())
/// # }
/// ```

pub mod content;
pub mod oauth_state;
pub mod social_account;
pub mod subscription;
pub mod user;

/// A text column held a value outside its enumeration
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value}")]
pub struct UnknownVariant {
    /// Which enumeration was being parsed
    pub kind: &'static str,

    /// The offending value
    pub value: String,
}

impl UnknownVariant {
    pub(crate) fn new(kind: &'static str, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}
