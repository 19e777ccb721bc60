use crate::{AppState, handlers::session};
use axum::{Router, routing::get};

/// Authenticated Router Module
///
/// Routes for any signed-in caller, whatever their access level. `create_router` wraps
/// this router in the `require_sign_in` layer, so anonymous requests are answered with
/// the sign-in 403 before a handler runs.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET /users/checkAdmin/{gitName}
        // Second leg of the login: resolves the session's access level from the stored
        // user whose `gitName` matches, then redirects to the API docs.
        .route("/users/checkAdmin/{gitName}", get(session::check_admin))
        // GET /users/me
        // What the current session knows about its caller.
        .route("/users/me", get(session::me))
}
