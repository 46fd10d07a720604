/// Content endpoints
///
/// # Endpoints
///
/// - `GET /api/content` - List drafts and posts, newest first
/// - `POST /api/content` - Create a draft
/// - `POST /api/content/generate` - Draft a post with the AI generator
/// - `GET /api/content/:id` - Get one record
/// - `PATCH /api/content/:id` - Update title, body or image
/// - `DELETE /api/content/:id` - Delete a record
///
/// Every query is scoped to the session user; another user's content is
/// reported as not found.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{ApiJson, ApiQuery},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use pagepilot_shared::{
    auth::gate::SessionContext,
    generator::GenerationRequest,
    models::{
        content::{Content, CreateContent, UpdateContent},
        social_account::Platform,
        subscription::Subscription,
    },
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default page size
pub const DEFAULT_LIMIT: i64 = 20;

/// Largest page size a client may request
pub const MAX_LIMIT: i64 = 100;

/// Longest title the column holds
const MAX_TITLE_CHARS: usize = 255;

/// Generated drafts are titled with the start of the prompt
const GENERATED_TITLE_CHARS: usize = 60;

/// Pagination query
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl ListQuery {
    /// `(limit, offset)` with the limit clamped to `1..=MAX_LIMIT`
    pub fn bounds(&self) -> (i64, i64) {
        let limit = self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        let offset = self.offset.unwrap_or(0).max(0);
        (limit, offset)
    }
}

/// Paginated content listing
#[derive(Debug, Serialize)]
pub struct ContentList {
    pub items: Vec<Content>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

/// Create request
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateContentRequest {
    pub title: Option<String>,
    pub body: Option<String>,
    pub image_url: Option<String>,
}

/// Update request; omitted fields are left unchanged
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateContentRequest {
    pub title: Option<String>,
    pub body: Option<String>,
    pub image_url: Option<String>,
}

/// Generation request
#[derive(Debug, Default, Deserialize)]
pub struct GenerateRequest {
    pub prompt: Option<String>,
    pub platform: Option<String>,
    pub tone: Option<String>,
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn check_title(title: Option<&str>) -> ApiResult<()> {
    match title {
        Some(title) if title.chars().count() > MAX_TITLE_CHARS => Err(ApiError::BadRequest(
            format!("title must be at most {} characters", MAX_TITLE_CHARS),
        )),
        _ => Ok(()),
    }
}

fn not_found() -> ApiError {
    ApiError::NotFound("Content not found".to_string())
}

impl CreateContentRequest {
    fn into_create(self, user_id: Uuid) -> ApiResult<CreateContent> {
        let body = trimmed(self.body)
            .ok_or_else(|| ApiError::BadRequest("body is required".to_string()))?;
        let title = trimmed(self.title);
        check_title(title.as_deref())?;

        Ok(CreateContent {
            user_id,
            title,
            body,
            image_url: trimmed(self.image_url),
        })
    }
}

impl UpdateContentRequest {
    fn into_update(self) -> ApiResult<UpdateContent> {
        let body = match self.body {
            Some(body) => Some(
                trimmed(Some(body))
                    .ok_or_else(|| ApiError::BadRequest("body cannot be empty".to_string()))?,
            ),
            None => None,
        };

        let update = UpdateContent {
            title: self.title.map(|t| t.trim().to_string()),
            body,
            image_url: self.image_url.map(|u| u.trim().to_string()),
        };

        if update.is_empty() {
            return Err(ApiError::BadRequest("No fields to update".to_string()));
        }
        check_title(update.title.as_deref())?;

        Ok(update)
    }
}

/// Title for a generated draft
pub fn generated_title(prompt: &str) -> String {
    let mut title: String = prompt.chars().take(GENERATED_TITLE_CHARS).collect();
    if prompt.chars().count() > GENERATED_TITLE_CHARS {
        title.push_str("...");
    }
    title
}

pub async fn list_content(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> ApiResult<Json<ContentList>> {
    let (limit, offset) = query.bounds();

    let items = Content::list_for_user(&state.db, session.user_id, limit, offset).await?;
    let total = Content::count_for_user(&state.db, session.user_id).await?;

    Ok(Json(ContentList {
        items,
        total,
        limit,
        offset,
    }))
}

pub async fn create_content(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    ApiJson(req): ApiJson<CreateContentRequest>,
) -> ApiResult<(StatusCode, Json<Content>)> {
    let data = req.into_create(session.user_id)?;
    let content = Content::create(&state.db, data).await?;

    tracing::info!(user_id = %session.user_id, content_id = %content.id, "Created draft");
    Ok((StatusCode::CREATED, Json(content)))
}

pub async fn get_content(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Content>> {
    Content::find_for_user(&state.db, id, session.user_id)
        .await?
        .map(Json)
        .ok_or_else(not_found)
}

pub async fn update_content(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    Path(id): Path<Uuid>,
    ApiJson(req): ApiJson<UpdateContentRequest>,
) -> ApiResult<Json<Content>> {
    let update = req.into_update()?;

    Content::update(&state.db, id, session.user_id, update)
        .await?
        .map(Json)
        .ok_or_else(not_found)
}

pub async fn delete_content(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    if !Content::delete(&state.db, id, session.user_id).await? {
        return Err(not_found());
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Drafts a post with the configured generator
///
/// # Errors
///
/// - `400 Bad Request`: Missing prompt or unsupported platform
/// - `403 Forbidden`: The plan does not include AI generation
/// - `502 Bad Gateway`: The generator failed
/// - `503 Service Unavailable`: No generator is configured
pub async fn generate_content(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    ApiJson(req): ApiJson<GenerateRequest>,
) -> ApiResult<(StatusCode, Json<Content>)> {
    let prompt = trimmed(req.prompt)
        .ok_or_else(|| ApiError::BadRequest("prompt is required".to_string()))?;

    let platform = match trimmed(req.platform) {
        Some(raw) => Some(
            raw.parse::<Platform>()
                .map_err(|_| ApiError::BadRequest("Unsupported platform".to_string()))?,
        ),
        None => None,
    };
    let tone = trimmed(req.tone);

    let generator = state.generator.as_ref().ok_or_else(|| {
        ApiError::ServiceUnavailable("Content generation is not configured".to_string())
    })?;

    let plan = Subscription::find_by_user(&state.db, session.user_id)
        .await?
        .map(|s| s.plan)
        .unwrap_or_default();
    if !plan.includes_ai_generation() {
        return Err(ApiError::Forbidden(format!(
            "AI generation is not included in the {} plan",
            plan
        )));
    }

    let body = generator
        .generate(&GenerationRequest {
            prompt: &prompt,
            platform,
            tone: tone.as_deref(),
        })
        .await?;

    let content = Content::create(
        &state.db,
        CreateContent {
            user_id: session.user_id,
            title: Some(generated_title(&prompt)),
            body,
            image_url: None,
        },
    )
    .await?;

    tracing::info!(
        user_id = %session.user_id,
        content_id = %content.id,
        model = generator.model(),
        "Generated draft"
    );

    Ok((StatusCode::CREATED, Json(content)))
}
