/// Server-rendered HTML pages
///
/// # Pages
///
/// - `GET /` - Landing page
/// - `GET|POST /login` - Sign-in form; honors `callbackUrl`
/// - `GET|POST /register` - Sign-up form
/// - `POST /logout` - Clear the session and return to `/`
/// - `GET /dashboard` - Plan, connected accounts and content count
/// - `GET /dashboard/settings` - Connect and disconnect platforms
/// - `POST /dashboard/settings/disconnect/:platform` - Disconnect from the settings page
///
/// Pages carry no scripts. Forms post back to this origin and every
/// user-provided string is escaped with [`escape`].

use crate::{
    app::AppState,
    error::ApiResult,
    routes::{
        auth::{self, clear_session_cookie, LoginRequest, RegisterRequest},
        social,
    },
};
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    Extension, Form,
};
use pagepilot_shared::{
    auth::gate::{safe_callback_path, SessionContext, LOGIN_PATH, PAGE_PREFIX},
    models::{
        content::Content,
        social_account::{Platform, SocialAccount},
        subscription::{Plan, Subscription},
        user::User,
    },
};
use serde::Deserialize;

const STYLE: &str = "body{font-family:system-ui,sans-serif;max-width:42rem;margin:2rem auto;padding:0 1rem;color:#1f2933}\
nav a,nav button{margin-right:1rem}\
form.inline{display:inline}\
label{display:block;margin:.75rem 0}\
input,select{display:block;width:100%;padding:.4rem}\
.error{color:#b42318}\
.notice{color:#067647}\
table{width:100%;border-collapse:collapse}\
td,th{text-align:left;padding:.35rem;border-bottom:1px solid #e4e7eb}";

/// Escapes text for HTML element and attribute content
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, signed_in: bool, body: &str) -> Html<String> {
    let nav = if signed_in {
        r#"<a href="/dashboard">Dashboard</a><a href="/dashboard/settings">Settings</a><form class="inline" method="post" action="/logout"><button type="submit">Sign out</button></form>"#
    } else {
        r#"<a href="/">PagePilot</a><a href="/login">Sign in</a><a href="/register">Create account</a>"#
    };

    Html(format!(
        "<!doctype html>\n<html lang=\"en\"><head><meta charset=\"utf-8\">\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\
         <title>{} | PagePilot</title><style>{}</style></head>\
         <body><nav>{}</nav><main>{}</main></body></html>",
        escape(title),
        STYLE,
        nav,
        body
    ))
}

fn message(class: &str, text: Option<&str>) -> String {
    match text {
        Some(text) => format!(r#"<p class="{}">{}</p>"#, class, escape(text)),
        None => String::new(),
    }
}

pub async fn landing() -> Html<String> {
    layout(
        "Social publishing",
        false,
        "<h1>PagePilot</h1>\
         <p>Draft posts with AI assistance and publish them to your Facebook page and Instagram business account.</p>\
         <p><a href=\"/register\">Create an account</a> or <a href=\"/login\">sign in</a>.</p>",
    )
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginPageQuery {
    #[serde(rename = "callbackUrl")]
    pub callback_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    pub email: Option<String>,
    pub password: Option<String>,
    #[serde(rename = "callbackUrl")]
    pub callback_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RegisterForm {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub plan: Option<String>,
}

fn login_form(callback: &str, email: &str, error: Option<&str>) -> Html<String> {
    let body = format!(
        r#"<h1>Sign in</h1>{}
<form method="post" action="{}">
<input type="hidden" name="callbackUrl" value="{}">
<label>Email<input type="email" name="email" value="{}" required></label>
<label>Password<input type="password" name="password" required></label>
<button type="submit">Sign in</button>
</form>
<p>No account yet? <a href="/register">Create one</a>.</p>"#,
        message("error", error),
        LOGIN_PATH,
        escape(callback),
        escape(email)
    );
    layout("Sign in", false, &body)
}

fn register_form(form: &RegisterForm, error: Option<&str>) -> Html<String> {
    let selected = form
        .plan
        .as_deref()
        .and_then(|p| p.parse::<Plan>().ok())
        .unwrap_or_default();

    let options: String = Plan::ALL
        .iter()
        .map(|plan| {
            format!(
                r#"<option value="{}"{}>{}</option>"#,
                plan.as_str(),
                if *plan == selected { " selected" } else { "" },
                plan
            )
        })
        .collect();

    let body = format!(
        r#"<h1>Create account</h1>{}
<form method="post" action="/register">
<label>Name<input type="text" name="name" value="{}" required></label>
<label>Email<input type="email" name="email" value="{}" required></label>
<label>Password<input type="password" name="password" minlength="8" required></label>
<label>Plan<select name="plan">{}</select></label>
<button type="submit">Create account</button>
</form>"#,
        message("error", error),
        escape(form.name.as_deref().unwrap_or_default()),
        escape(form.email.as_deref().unwrap_or_default()),
        options
    );
    layout("Create account", false, &body)
}

pub async fn login_page(Query(query): Query<LoginPageQuery>) -> Html<String> {
    let callback = safe_callback_path(query.callback_url.as_deref());
    login_form(&callback, "", None)
}

pub async fn login_submit(State(state): State<AppState>, Form(form): Form<LoginForm>) -> Response {
    let callback = safe_callback_path(form.callback_url.as_deref());
    let req = LoginRequest {
        email: form.email,
        password: form.password,
    };

    let signed_in = match auth::authenticate(&state, &req).await {
        Ok(user) => auth::start_session(&state, &user),
        Err(e) => Err(e),
    };

    match signed_in {
        Ok((_, cookie)) => (
            [(header::SET_COOKIE, cookie)],
            Redirect::to(&callback),
        )
            .into_response(),
        Err(e) => (
            e.status(),
            login_form(&callback, req.email.as_deref().unwrap_or_default(), Some(e.public_message().as_str())),
        )
            .into_response(),
    }
}

pub async fn register_page() -> Html<String> {
    register_form(&RegisterForm::default(), None)
}

pub async fn register_submit(
    State(state): State<AppState>,
    Form(form): Form<RegisterForm>,
) -> Response {
    let req = RegisterRequest {
        name: form.name.clone(),
        email: form.email.clone(),
        password: form.password.clone(),
        plan: form.plan.clone(),
    };

    match auth::register_account(&state, req).await {
        Ok(registered) => (
            [(header::SET_COOKIE, registered.cookie)],
            Redirect::to(PAGE_PREFIX),
        )
            .into_response(),
        Err(e) => (e.status(), register_form(&form, Some(e.public_message().as_str()))).into_response(),
    }
}

pub async fn logout_submit(State(state): State<AppState>) -> Response {
    (
        [(header::SET_COOKIE, clear_session_cookie(state.config.api.production))],
        Redirect::to("/"),
    )
        .into_response()
}

/// Loads the signed-in user, or signs out a session whose user is gone
async fn current_user(state: &AppState, session: &SessionContext) -> ApiResult<Result<User, Response>> {
    match User::find_by_id(&state.db, session.user_id).await? {
        Some(user) => Ok(Ok(user)),
        None => Ok(Err((
            [(header::SET_COOKIE, clear_session_cookie(state.config.api.production))],
            Redirect::to(LOGIN_PATH),
        )
            .into_response())),
    }
}

fn account_rows(accounts: &[SocialAccount]) -> String {
    if accounts.is_empty() {
        return "<p>No accounts connected yet.</p>".to_string();
    }

    let rows: String = accounts
        .iter()
        .map(|a| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
                a.platform.display_name(),
                escape(a.account_name.as_deref().unwrap_or(&a.account_id)),
                escape(a.target_page_id())
            )
        })
        .collect();

    format!(
        "<table><tr><th>Platform</th><th>Account</th><th>Page</th></tr>{}</table>",
        rows
    )
}

pub async fn dashboard(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
) -> ApiResult<Response> {
    let user = match current_user(&state, &session).await? {
        Ok(user) => user,
        Err(signed_out) => return Ok(signed_out),
    };

    let plan = Subscription::find_by_user(&state.db, user.id)
        .await?
        .map(|s| s.plan)
        .unwrap_or_default();
    let accounts = SocialAccount::list_by_user(&state.db, user.id).await?;
    let content_count = Content::count_for_user(&state.db, user.id).await?;

    let body = format!(
        r#"<h1>Welcome, {}</h1>
<p>Plan: <strong>{}</strong>{}</p>
<h2>Connected accounts</h2>{}
<p><a href="/dashboard/settings">Manage connections</a></p>
<h2>Content</h2>
<p>{} item(s) in your library.</p>"#,
        escape(&user.name),
        plan,
        if plan.includes_ai_generation() {
            " (AI generation included)"
        } else {
            ""
        },
        account_rows(&accounts),
        content_count
    );

    Ok(layout("Dashboard", true, &body).into_response())
}

#[derive(Debug, Default, Deserialize)]
pub struct SettingsQuery {
    pub connected: Option<String>,
    pub disconnected: Option<String>,
    pub error: Option<String>,
}

impl SettingsQuery {
    fn notice(&self) -> Option<String> {
        if let Some(platform) = self.connected.as_deref().and_then(|p| p.parse::<Platform>().ok()) {
            return Some(format!("{} connected.", platform.display_name()));
        }
        self.disconnected
            .as_deref()
            .and_then(|p| p.parse::<Platform>().ok())
            .map(|platform| format!("{} disconnected.", platform.display_name()))
    }
}

fn platform_controls(platform: Platform, account: Option<&SocialAccount>) -> String {
    match account {
        Some(account) => format!(
            r#"<li>{}: connected as {} <form class="inline" method="post" action="/dashboard/settings/disconnect/{}"><button type="submit">Disconnect</button></form></li>"#,
            platform.display_name(),
            escape(account.account_name.as_deref().unwrap_or(&account.account_id)),
            platform.as_str()
        ),
        None => format!(
            r#"<li>{}: not connected <a href="/api/social/{}/connect">Connect</a></li>"#,
            platform.display_name(),
            platform.as_str()
        ),
    }
}

pub async fn settings(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    Query(query): Query<SettingsQuery>,
) -> ApiResult<Response> {
    let user = match current_user(&state, &session).await? {
        Ok(user) => user,
        Err(signed_out) => return Ok(signed_out),
    };

    let accounts = SocialAccount::list_by_user(&state.db, user.id).await?;
    let controls: String = Platform::ALL
        .iter()
        .map(|platform| {
            platform_controls(
                *platform,
                accounts.iter().find(|a| a.platform == *platform),
            )
        })
        .collect();

    let body = format!(
        r#"<h1>Settings</h1>{}{}
<h2>Connections</h2>
<ul>{}</ul>
<p>Instagram is connected through the Instagram business account linked to your Facebook page.</p>
<p>Signed in as {}.</p>"#,
        message("notice", query.notice().as_deref()),
        message("error", query.error.as_deref()),
        controls,
        escape(&user.email)
    );

    Ok(layout("Settings", true, &body).into_response())
}

pub async fn disconnect_submit(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    Path(platform): Path<String>,
) -> Redirect {
    match social::disconnect(&state, session.user_id, &platform).await {
        Ok(platform) => social::settings_redirect("disconnected", platform.as_str()),
        Err(e) => social::settings_redirect("error", &e.public_message()),
    }
}

/// `404` page for unknown HTML routes
pub async fn not_found() -> (StatusCode, Html<String>) {
    (
        StatusCode::NOT_FOUND,
        layout(
            "Not found",
            false,
            "<h1>Not found</h1><p><a href=\"/\">Back to the start page</a></p>",
        ),
    )
}
