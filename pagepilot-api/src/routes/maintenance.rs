/// Maintenance endpoints for connected accounts
///
/// - `GET /api/maintenance/social-accounts` - Accounts with a `missingPageId` flag
/// - `POST /api/maintenance/fix-page-ids` - Fill missing Facebook page ids from the account id

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Extension, Json};
use pagepilot_shared::{
    auth::gate::SessionContext, db::rows::normalize_rows, models::social_account::SocialAccount,
};
use serde::Serialize;
use serde_json::Value as JsonValue;
use uuid::Uuid;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticsResponse {
    pub accounts: Vec<JsonValue>,
    pub missing_page_ids: usize,
}

impl DiagnosticsResponse {
    pub fn from_rows(rows: Option<&JsonValue>) -> Self {
        let accounts = normalize_rows(rows);
        let missing_page_ids = accounts
            .iter()
            .filter(|a| a.get("missingPageId").and_then(JsonValue::as_bool) == Some(true))
            .count();

        Self {
            accounts,
            missing_page_ids,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FixPageIdsResponse {
    pub fixed: usize,
    pub account_ids: Vec<Uuid>,
}

pub async fn social_account_diagnostics(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
) -> ApiResult<Json<DiagnosticsResponse>> {
    let rows = SocialAccount::diagnostics(&state.db, session.user_id).await?;
    Ok(Json(DiagnosticsResponse::from_rows(rows.as_ref())))
}

pub async fn fix_page_ids(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
) -> ApiResult<Json<FixPageIdsResponse>> {
    let account_ids = SocialAccount::repair_missing_page_ids(&state.db, session.user_id).await?;

    Ok(Json(FixPageIdsResponse {
        fixed: account_ids.len(),
        account_ids,
    }))
}
