/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /api/auth/register` - Create an account and subscription, start a session
/// - `POST /api/auth/login` - Start a session
/// - `POST /api/auth/logout` - Clear the session cookie
/// - `GET /api/auth/me` - Current user and subscription (session required)
///
/// Sessions are HS256 tokens. They are returned in the `pagepilot_session`
/// cookie (`HttpOnly; SameSite=Lax; Path=/`, plus `Secure` in production)
/// and, for login, in the response body for API clients.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::ApiJson,
};
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use pagepilot_shared::{
    auth::{
        gate::SessionContext,
        password,
        session::{create_session_token, SessionClaims, SESSION_COOKIE},
    },
    models::{
        subscription::{Plan, Subscription},
        user::{CreateUser, User},
    },
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Register request
///
/// Fields are optional at the type level so that a missing field is
/// reported as `400` rather than a body rejection.
#[derive(Debug, Default, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,

    /// Plan name; defaults to `free`
    pub plan: Option<String>,
}

/// Registration fields once presence has been checked
#[derive(Debug, Validate)]
struct NewAccount {
    #[validate(length(max = 255, message = "Name must be at most 255 characters"))]
    name: String,

    #[validate(email(message = "Invalid email format"))]
    email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    password: String,
}

/// Register response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub user_id: Uuid,
    pub email: String,
    pub plan: Plan,
}

/// Login request
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Login response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user_id: Uuid,
    pub token: String,
}

/// Current user response
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: User,
    pub subscription: Option<Subscription>,
}

/// A freshly created account with its session
pub(crate) struct Registered {
    pub user: User,
    pub subscription: Subscription,
    pub cookie: String,
}

/// Trimmed value, or `None` when missing or blank
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Passwords are used verbatim; only an all-blank value counts as missing
fn present_password(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

/// `Set-Cookie` value carrying a session token
pub(crate) fn session_cookie(token: &str, max_age_seconds: i64, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
        SESSION_COOKIE, token, max_age_seconds
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` value that removes the session cookie
pub(crate) fn clear_session_cookie(secure: bool) -> String {
    session_cookie("", 0, secure)
}

/// Signs a session for `user` and returns `(token, cookie)`
pub(crate) fn start_session(state: &AppState, user: &User) -> ApiResult<(String, String)> {
    let claims = SessionClaims::new(user.id, &user.email, state.config.session.ttl());
    let token = create_session_token(&claims, state.session_secret())?;
    let cookie = session_cookie(
        &token,
        claims.remaining_seconds(),
        state.config.api.production,
    );
    Ok((token, cookie))
}

/// Validates a registration and creates the user with their subscription
///
/// Presence and plan checks run before anything touches the database.
pub(crate) async fn register_account(state: &AppState, req: RegisterRequest) -> ApiResult<Registered> {
    let account = match (
        present(&req.name),
        present(&req.email),
        present_password(&req.password),
    ) {
        (Some(name), Some(email), Some(password)) => NewAccount {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        },
        _ => {
            return Err(ApiError::BadRequest(
                "name, email and password are required".to_string(),
            ))
        }
    };

    let plan = match present(&req.plan) {
        Some(raw) => raw
            .parse::<Plan>()
            .map_err(|_| ApiError::BadRequest(format!("Unknown plan: {}", raw)))?,
        None => Plan::default(),
    };

    account.validate()?;

    let password_hash = password::hash_password(&account.password)?;

    let (user, subscription) = User::register(
        &state.db,
        CreateUser {
            name: account.name,
            email: account.email,
            password_hash,
        },
        plan,
    )
    .await?;

    let (_, cookie) = start_session(state, &user)?;

    Ok(Registered {
        user,
        subscription,
        cookie,
    })
}

/// Checks credentials and records the login
pub(crate) async fn authenticate(state: &AppState, req: &LoginRequest) -> ApiResult<User> {
    let (email, password) = match (present(&req.email), present_password(&req.password)) {
        (Some(email), Some(password)) => (email, password),
        _ => {
            return Err(ApiError::BadRequest(
                "email and password are required".to_string(),
            ))
        }
    };

    let invalid = || ApiError::Unauthorized("Invalid email or password".to_string());

    let user = User::find_by_email(&state.db, email)
        .await?
        .ok_or_else(invalid)?;

    if !password::verify_password(password, &user.password_hash)? {
        tracing::info!(user_id = %user.id, "Rejected login with wrong password");
        return Err(invalid());
    }

    User::update_last_login(&state.db, user.id).await?;
    Ok(user)
}

/// Register a new user
///
/// # Endpoint
///
/// ```text
/// POST /api/auth/register
/// Content-Type: application/json
///
/// {
///   "name": "Ana",
///   "email": "ana@example.com",
///   "password": "correct horse battery",
///   "plan": "pro"
/// }
/// ```
///
/// # Response
///
/// `201 Created` with `{"userId", "email", "plan"}` and a session cookie.
///
/// # Errors
///
/// - `400 Bad Request`: Missing field or unknown plan
/// - `409 Conflict`: Email already registered
/// - `422 Unprocessable Entity`: Invalid email or short password
pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    let registered = register_account(&state, req).await?;

    Ok((
        StatusCode::CREATED,
        [(header::SET_COOKIE, registered.cookie)],
        Json(RegisterResponse {
            user_id: registered.user.id,
            email: registered.user.email,
            plan: registered.subscription.plan,
        }),
    ))
}

/// Login endpoint
///
/// # Errors
///
/// - `400 Bad Request`: Missing email or password
/// - `401 Unauthorized`: Invalid credentials
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let user = authenticate(&state, &req).await?;
    let (token, cookie) = start_session(&state, &user)?;

    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(LoginResponse {
            user_id: user.id,
            token,
        }),
    ))
}

/// Logout endpoint; always succeeds
pub async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::SET_COOKIE, clear_session_cookie(state.config.api.production))],
        Json(serde_json::json!({ "success": true })),
    )
}

/// Current user and subscription
pub async fn me(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
) -> ApiResult<Json<MeResponse>> {
    let user = User::find_by_id(&state.db, session.user_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Session user no longer exists".to_string()))?;
    let subscription = Subscription::find_by_user(&state.db, user.id).await?;

    Ok(Json(MeResponse { user, subscription }))
}
