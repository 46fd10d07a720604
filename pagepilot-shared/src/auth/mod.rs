/// Authentication and session utilities
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing
/// - [`session`]: HS256 session tokens carried in a cookie or bearer header
/// - [`oauth_state`]: Anti-forgery state values for the OAuth connect flow
/// - [`gate`]: Path classification and session extraction for the request gate
///
/// # Example
///
/// ```no_run
/// use pagepilot_shared::auth::password::{hash_password, verify_password};
/// use pagepilot_shared::auth::session::{create_session_token, SessionClaims};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("correct horse battery")?;
/// assert!(verify_password("correct horse battery", &hash)?);
///
/// let claims = SessionClaims::new(Uuid::new_v4(), "ana@example.com", chrono::Duration::hours(1));
/// let token = create_session_token(&claims, "a-secret-of-at-least-thirty-two-bytes")?;
/// # Ok(())
/// # }
/// ```

pub mod gate;
pub mod oauth_state;
pub mod password;
pub mod session;
