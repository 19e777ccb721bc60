use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, header},
    response::{AppendHeaders, Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    auth::{
        self, OAUTH_STATE_COOKIE, SESSION_COOKIE, Session, clear_cookie, oauth_state_cookie,
        read_cookie, resolve_access_level, session_cookie,
    },
    config::AppConfig,
    error::ApiError,
    identity::IdentityState,
    models::{MessageResponse, SessionProfile, User},
    repository::Repository,
};

/// home
///
/// Landing page: a login link for anonymous visitors, a link to the API docs otherwise.
#[utoipa::path(
    get,
    path = "/",
    tag = "session",
    responses((status = 200, description = "Landing page", body = String, content_type = "text/html"))
)]
pub async fn home(session: Session) -> Html<String> {
    match (session.is_logged_in, session.username) {
        (true, Some(username)) => Html(format!(
            "<p>Signed in as {}.</p><a href=\"/swagger-ui\">API documentation</a> | <a href=\"/logout\">Log out</a>",
            escape_html(&username)
        )),
        _ => Html("<a href=\"/auth/github\">Login with GitHub</a>".to_string()),
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// github_login
///
/// Starts the OAuth flow. The random `state` is parked in a short-lived cookie and
/// checked again on the callback.
#[utoipa::path(
    get,
    path = "/auth/github",
    tag = "session",
    responses((status = 303, description = "Redirect to the GitHub consent screen"))
)]
pub async fn github_login(
    State(identity): State<IdentityState>,
    State(config): State<AppConfig>,
) -> Result<Response, ApiError> {
    let state = Uuid::new_v4().simple().to_string();
    let url = identity
        .authorize_url(&state)
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok((
        AppendHeaders([(header::SET_COOKIE, oauth_state_cookie(&state, &config))]),
        Redirect::to(&url),
    )
        .into_response())
}

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
}

/// github_callback
///
/// Completes the OAuth flow. On success the caller is signed in with an unknown role and
/// sent on to the role lookup; any failure lands back on `/` still anonymous.
#[utoipa::path(
    get,
    path = "/auth/github/callback",
    tag = "session",
    params(
        ("code" = Option<String>, Query, description = "Authorization code"),
        ("state" = Option<String>, Query, description = "State echoed from the login redirect")
    ),
    responses((status = 303, description = "Redirect to the role lookup, or home on failure"))
)]
pub async fn github_callback(
    State(identity): State<IdentityState>,
    State(config): State<AppConfig>,
    Query(params): Query<CallbackParams>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let clear_state = clear_cookie(OAUTH_STATE_COOKIE, &config);

    let expected = read_cookie(&headers, OAUTH_STATE_COOKIE);
    let state_matches = params.state.is_some() && params.state == expected;
    let Some(code) = params.code.filter(|_| state_matches) else {
        tracing::warn!("GitHub callback rejected: missing code or state mismatch");
        return Ok((
            AppendHeaders([(header::SET_COOKIE, clear_state)]),
            Redirect::to("/"),
        )
            .into_response());
    };

    let profile = match identity.exchange_code(&code).await {
        Ok(profile) => profile,
        Err(e) => {
            tracing::warn!(error = %e, "GitHub login failed");
            return Ok((
                AppendHeaders([(header::SET_COOKIE, clear_state)]),
                Redirect::to("/"),
            )
                .into_response());
        }
    };

    tracing::info!(username = %profile.username, "GitHub login succeeded");
    let token = Session::signed_in(&profile.username).encode(&config)?;

    Ok((
        AppendHeaders([
            (header::SET_COOKIE, session_cookie(&token, &config)),
            (header::SET_COOKIE, clear_state),
        ]),
        Redirect::to(&format!("/users/checkAdmin/{}", profile.username)),
    )
        .into_response())
}

/// check_admin
///
/// Looks up the stored user whose `gitName` matches the signed-in username and records
/// that user's access level in the session (`user` when none matches).
#[utoipa::path(
    get,
    path = "/users/checkAdmin/{gitName}",
    tag = "session",
    params(("gitName" = String, Path, description = "GitHub username of the session")),
    responses(
        (status = 303, description = "Session updated, redirect to the API docs"),
        (status = 403, description = "Not signed in, or not this session's username", body = MessageResponse)
    )
)]
pub async fn check_admin(
    session: Session,
    State(users): State<Repository<User>>,
    State(config): State<AppConfig>,
    Path(git_name): Path<String>,
) -> Result<Response, ApiError> {
    auth::require(&session, auth::Requirement::SignedIn)?;
    if session.username.as_deref() != Some(git_name.as_str()) {
        tracing::warn!(requested = %git_name, username = ?session.username, "role lookup for another user refused");
        return Err(ApiError::Forbidden);
    }

    let level = resolve_access_level(&users, &git_name).await?;
    tracing::info!(username = %git_name, access_level = ?level, "session access level resolved");

    let token = session.with_access_level(level).encode(&config)?;
    Ok((
        AppendHeaders([(header::SET_COOKIE, session_cookie(&token, &config))]),
        Redirect::to("/swagger-ui"),
    )
        .into_response())
}

#[utoipa::path(
    get,
    path = "/users/me",
    tag = "session",
    responses(
        (status = 200, description = "Current session", body = SessionProfile),
        (status = 403, description = "Not signed in", body = MessageResponse)
    )
)]
pub async fn me(session: Session) -> Json<SessionProfile> {
    Json(SessionProfile {
        is_logged_in: session.is_logged_in,
        username: session.username,
        access_level: session.access_level,
    })
}

#[utoipa::path(
    get,
    path = "/logout",
    tag = "session",
    responses((status = 303, description = "Session cleared, redirect home"))
)]
pub async fn logout(session: Session, State(config): State<AppConfig>) -> Response {
    if let Some(username) = session.username {
        tracing::info!(%username, "signed out");
    }
    (
        AppendHeaders([(header::SET_COOKIE, clear_cookie(SESSION_COOKIE, &config))]),
        Redirect::to("/"),
    )
        .into_response()
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "session",
    responses((status = 200, description = "Service is up", body = String))
)]
pub async fn health() -> &'static str {
    "ok"
}
