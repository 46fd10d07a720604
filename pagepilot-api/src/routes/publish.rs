/// Publish endpoint
///
/// # Endpoint
///
/// ```text
/// POST /api/publish
/// Content-Type: application/json
///
/// { "contentId": "5b6f...", "platform": "facebook" }
/// ```
///
/// # Response
///
/// - `200 OK`: `{"success": true, "postId": "...", "url": "..."}`
/// - `502 Bad Gateway`: `{"success": false, "error": "..."}` when the platform rejected the post
///
/// # Errors
///
/// - `400 Bad Request`: Missing or malformed content id, unsupported platform,
///   or the platform is not connected
/// - `404 Not Found`: Content does not exist or belongs to another user
///
/// The request is fully validated before the database or any platform is
/// contacted. Each request makes one publish attempt.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::ApiJson,
};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use pagepilot_shared::{
    auth::gate::SessionContext,
    models::{
        content::Content,
        social_account::{Platform, SocialAccount},
    },
    social::{Post, PublishOutcome},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Publish request
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishRequest {
    pub content_id: Option<String>,
    pub platform: Option<String>,
}

/// A checked publish request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublishTarget {
    pub content_id: Uuid,
    pub platform: Platform,
}

impl PublishRequest {
    pub fn target(&self) -> ApiResult<PublishTarget> {
        let content_id = self
            .content_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ApiError::BadRequest("contentId is required".to_string()))?;

        let content_id = Uuid::parse_str(content_id)
            .map_err(|_| ApiError::BadRequest("contentId must be a valid UUID".to_string()))?;

        let platform = self
            .platform
            .as_deref()
            .and_then(|p| p.parse::<Platform>().ok())
            .ok_or_else(|| ApiError::BadRequest("Unsupported platform".to_string()))?;

        Ok(PublishTarget {
            content_id,
            platform,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PublishResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    post_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// `200` with the post reference, or `502` with the platform error
pub fn outcome_response(outcome: PublishOutcome) -> Response {
    match outcome {
        PublishOutcome::Published { post_id, url } => (
            StatusCode::OK,
            Json(PublishResponse {
                success: true,
                post_id: Some(post_id),
                url: Some(url),
                error: None,
            }),
        )
            .into_response(),
        PublishOutcome::Failed { error } => (
            StatusCode::BAD_GATEWAY,
            Json(PublishResponse {
                success: false,
                post_id: None,
                url: None,
                error: Some(error),
            }),
        )
            .into_response(),
    }
}

/// Publishes a content record and records the outcome on it
pub(crate) async fn publish_content(
    state: &AppState,
    user_id: Uuid,
    target: PublishTarget,
) -> ApiResult<PublishOutcome> {
    let content = Content::find_for_user(&state.db, target.content_id, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Content not found".to_string()))?;

    let account = SocialAccount::find_for_user(&state.db, user_id, target.platform)
        .await?
        .ok_or_else(|| {
            ApiError::BadRequest(format!("{} account not connected", target.platform))
        })?;

    let outcome = state
        .publisher
        .dispatch(&account, Post::from(&content))
        .await;

    match &outcome {
        PublishOutcome::Published { post_id, url } => {
            Content::mark_published(&state.db, content.id, target.platform, post_id, url).await?
        }
        PublishOutcome::Failed { error } => {
            Content::mark_failed(&state.db, content.id, target.platform, error).await?
        }
    }

    Ok(outcome)
}

pub async fn publish(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    ApiJson(req): ApiJson<PublishRequest>,
) -> ApiResult<Response> {
    let target = req.target()?;
    let outcome = publish_content(&state, session.user_id, target).await?;
    Ok(outcome_response(outcome))
}
