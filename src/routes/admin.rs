use crate::{
    AppState,
    handlers::{characters, images, quotes, users},
};
use axum::{
    Router,
    routing::{delete, get, patch, post, put},
};

/// Admin Router Module
///
/// Every write to the catalog and all user management. The routes are reachable by
/// anyone; each handler requires an admin session and answers 403 otherwise. Some
/// handlers validate the payload before that check, so a malformed body can still
/// produce a 400 for a non-admin caller.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // --- Characters ---
        .route(
            "/characters/createNewCharacter",
            post(characters::create_character),
        )
        .route(
            "/characters/updateCharacter/{id}",
            put(characters::update_character),
        )
        .route(
            "/characters/deleteCharacter/{id}",
            delete(characters::delete_character),
        )
        // --- Quotes ---
        .route("/quotes/createNewQuote", post(quotes::create_quote))
        .route("/quotes/updateQuote/{id}", put(quotes::update_quote))
        .route("/quotes/removeQuote/{id}", delete(quotes::delete_quote))
        // --- Images ---
        .route("/images/createNewImage", post(images::create_image))
        .route("/images/updateImage/{id}", put(images::update_image))
        .route("/images/removeImage/{id}", delete(images::delete_image))
        // --- Users ---
        // Listing and reading accounts is admin-only; passwords are never returned.
        .route("/users", get(users::list_users))
        .route("/users/", get(users::list_users))
        .route("/users/{id}", get(users::get_user))
        .route("/users/createNewUser", post(users::create_user))
        .route("/users/updateUser/{id}", put(users::update_user))
        // PATCH /users/changePassword/{id}
        // Stores a fresh Argon2id hash of the new password.
        .route("/users/changePassword/{id}", patch(users::change_password))
        .route("/users/setAccessLevel/{id}", patch(users::set_access_level))
        .route("/users/removeUser/{id}", delete(users::delete_user))
}
