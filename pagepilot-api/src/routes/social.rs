/// Social account connection endpoints
///
/// # Endpoints
///
/// - `GET /api/social/facebook/connect` - Redirect to the Facebook login dialog
/// - `GET /api/social/instagram/connect` - Same flow; Instagram is reached through the page
/// - `GET /api/social/facebook/callback` - Verify state, exchange code, store page credentials
/// - `GET /api/social/accounts` - Connected accounts (tokens omitted)
/// - `DELETE /api/social/accounts/:platform` - Disconnect a platform
///
/// # Callback flow
///
/// ```text
/// provider error?      -> 303 /dashboard/settings?error=<description>
/// code/state missing?  -> 400
/// state not issued to this user, expired or reused -> 401
/// exchange code -> list pages -> upsert first page (+ linked Instagram)
///                      -> 303 /dashboard/settings?connected=facebook
/// ```

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Redirect,
    Extension, Json,
};
use pagepilot_shared::{
    auth::gate::SessionContext,
    models::{
        oauth_state::{OAuthState, StateCheck},
        social_account::{Platform, SocialAccount},
    },
};
use serde::Deserialize;
use uuid::Uuid;

/// Settings page the callback returns to
pub const SETTINGS_PATH: &str = "/dashboard/settings";

/// Query parameters the provider sends back
#[derive(Debug, Default, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// `/dashboard/settings?{key}={value}` with the value percent-encoded
pub fn settings_redirect(key: &str, value: &str) -> Redirect {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair(key, value)
        .finish();
    Redirect::to(&format!("{}?{}", SETTINGS_PATH, query))
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Starts the Facebook authorization flow
///
/// Issues a single-use state bound to the session user and redirects the
/// browser to the login dialog.
pub async fn connect_facebook(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
) -> ApiResult<Redirect> {
    let purged = OAuthState::purge_expired(&state.db).await?;
    if purged > 0 {
        tracing::debug!(purged, "Purged expired OAuth states");
    }

    let oauth_state = OAuthState::issue(&state.db, session.user_id, Platform::Facebook).await?;
    let url = state.oauth.authorization_url(&oauth_state)?;

    tracing::info!(user_id = %session.user_id, platform = "facebook", "Starting OAuth connect");
    Ok(Redirect::to(url.as_str()))
}

/// Handles the provider redirect
pub async fn facebook_callback(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    Query(query): Query<CallbackQuery>,
) -> ApiResult<Redirect> {
    if let Some(error) = non_empty(&query.error) {
        let description = non_empty(&query.error_description).unwrap_or(error);
        tracing::info!(user_id = %session.user_id, error = %error, "OAuth authorization was declined");
        return Ok(settings_redirect("error", description));
    }

    let (code, oauth_state) = match (non_empty(&query.code), non_empty(&query.state)) {
        (Some(code), Some(oauth_state)) => (code, oauth_state),
        _ => {
            return Err(ApiError::BadRequest(
                "Missing code or state parameter".to_string(),
            ))
        }
    };

    match OAuthState::consume(&state.db, oauth_state, session.user_id).await? {
        StateCheck::Valid { .. } => {}
        rejected => {
            tracing::warn!(user_id = %session.user_id, reason = ?rejected, "Rejected OAuth state");
            return Err(ApiError::Unauthorized(
                "Invalid or expired OAuth state".to_string(),
            ));
        }
    }

    let user_token = match state.oauth.exchange_code(&state.graph, code).await {
        Ok(token) => token,
        Err(e) => {
            tracing::warn!(user_id = %session.user_id, error = %e, "Code exchange failed");
            return Ok(settings_redirect("error", "token_exchange_failed"));
        }
    };

    let pages = match state.oauth.fetch_pages(&state.graph, &user_token).await {
        Ok(pages) => pages,
        Err(e) => {
            tracing::warn!(user_id = %session.user_id, error = %e, "Listing pages failed");
            return Ok(settings_redirect("error", "pages_fetch_failed"));
        }
    };

    let Some(page) = pages.into_iter().next() else {
        return Ok(settings_redirect("error", "no_pages"));
    };

    let page_id = page.id.clone();
    for account in page.into_accounts(session.user_id) {
        let platform = account.platform;
        SocialAccount::upsert(&state.db, account).await?;
        tracing::info!(
            user_id = %session.user_id,
            platform = %platform,
            page_id = %page_id,
            "Connected social account"
        );
    }

    Ok(settings_redirect("connected", Platform::Facebook.as_str()))
}

/// Lists the session user's connected accounts
pub async fn list_accounts(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
) -> ApiResult<Json<Vec<SocialAccount>>> {
    Ok(Json(SocialAccount::list_by_user(&state.db, session.user_id).await?))
}

/// Disconnects a platform
pub(crate) async fn disconnect(state: &AppState, user_id: Uuid, platform: &str) -> ApiResult<Platform> {
    let platform: Platform = platform
        .parse()
        .map_err(|_| ApiError::BadRequest("Unsupported platform".to_string()))?;

    if !SocialAccount::delete_for_user(&state.db, user_id, platform).await? {
        return Err(ApiError::NotFound(format!("{} account not connected", platform)));
    }

    tracing::info!(user_id = %user_id, platform = %platform, "Disconnected social account");
    Ok(platform)
}

pub async fn disconnect_account(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    Path(platform): Path<String>,
) -> ApiResult<StatusCode> {
    disconnect(&state, session.user_id, &platform).await?;
    Ok(StatusCode::NO_CONTENT)
}
