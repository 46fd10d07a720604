/// Subscription endpoint
///
/// - `GET /api/subscription` - Plan and billing status of the session user

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::State, Extension, Json};
use pagepilot_shared::{auth::gate::SessionContext, models::subscription::Subscription};
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionResponse {
    #[serde(flatten)]
    pub subscription: Subscription,

    /// Whether the plan includes AI-assisted generation
    pub ai_generation: bool,
}

pub async fn current_subscription(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
) -> ApiResult<Json<SubscriptionResponse>> {
    let subscription = Subscription::find_by_user(&state.db, session.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Subscription not found".to_string()))?;

    Ok(Json(SubscriptionResponse {
        ai_generation: subscription.plan.includes_ai_generation(),
        subscription,
    }))
}
