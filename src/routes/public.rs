use crate::{
    AppState,
    handlers::{characters, images, quotes, session},
};
use axum::{Router, routing::get};

/// Public Router Module
///
/// Read-only catalog access and the session entry points. Nothing here mutates the
/// store; the login flow only issues cookies.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for monitors and load balancers.
        .route("/health", get(session::health))
        // --- Session ---
        .route("/", get(session::home))
        .route("/auth/github", get(session::github_login))
        // GET /auth/github/callback?code=...&state=...
        // Verifies the state cookie, then trades the code for the GitHub profile.
        .route("/auth/github/callback", get(session::github_callback))
        .route("/logout", get(session::logout))
        // --- Characters ---
        .route("/characters", get(characters::list_characters))
        .route("/characters/", get(characters::list_characters))
        .route("/characters/{id}", get(characters::get_character))
        .route(
            "/characters/listByBook/{book}",
            get(characters::list_characters_by_book),
        )
        .route(
            "/characters/listByQuality/{quality}",
            get(characters::list_characters_by_quality),
        )
        // --- Quotes ---
        .route("/quotes", get(quotes::list_quotes))
        .route("/quotes/", get(quotes::list_quotes))
        .route("/quotes/{id}", get(quotes::get_quote))
        .route("/quotes/listByBook/{book}", get(quotes::list_quotes_by_book))
        .route(
            "/quotes/listByCharacter/{character}",
            get(quotes::list_quotes_by_character),
        )
        .route(
            "/quotes/listByQuality/{quality}",
            get(quotes::list_quotes_by_quality),
        )
        // --- Images ---
        .route("/images", get(images::list_images))
        .route("/images/", get(images::list_images))
        .route("/images/{id}", get(images::get_image))
        .route("/images/listByBook/{book}", get(images::list_images_by_book))
        .route(
            "/images/listByCharacter/{character}",
            get(images::list_images_by_character),
        )
        .route(
            "/images/listByQuality/{quality}",
            get(images::list_images_by_quality),
        )
}
