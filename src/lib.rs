use axum::{
    Router,
    extract::FromRef,
    http::HeaderName,
    middleware,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod identity;
pub mod models;
pub mod repository;
pub mod schema;
pub mod store;

// Module for routing segregation (Public, Authenticated, Admin).
pub mod routes;
use routes::{admin, authenticated, public};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use identity::{GitHubClient, IdentityState, MockIdentityProvider};
pub use repository::{Repository, Resource};
pub use store::{MemoryStore, PostgresStore, StoreState};

use handlers::{characters, images, quotes, session, users};

/// ApiDoc
///
/// The OpenAPI document served at `/api-docs/openapi.json` and rendered by Swagger UI.
#[derive(OpenApi)]
#[openapi(
    paths(
        characters::list_characters, characters::get_character,
        characters::list_characters_by_book, characters::list_characters_by_quality,
        characters::create_character, characters::update_character, characters::delete_character,
        quotes::list_quotes, quotes::get_quote, quotes::list_quotes_by_book,
        quotes::list_quotes_by_character, quotes::list_quotes_by_quality,
        quotes::create_quote, quotes::update_quote, quotes::delete_quote,
        images::list_images, images::get_image, images::list_images_by_book,
        images::list_images_by_character, images::list_images_by_quality,
        images::create_image, images::update_image, images::delete_image,
        users::list_users, users::get_user, users::create_user, users::update_user,
        users::change_password, users::set_access_level, users::delete_user,
        session::home, session::github_login, session::github_callback,
        session::check_admin, session::me, session::logout, session::health
    ),
    components(
        schemas(
            models::Quality, models::AccessLevel,
            models::Character, models::Quote, models::Image, models::User,
            models::NewCharacter, models::NewQuote, models::NewImage, models::NewUser,
            models::PasswordChangeRequest, models::AccessLevelRequest,
            models::MessageResponse, models::ErrorResponse, models::SessionProfile,
            store::InsertOneResult,
        )
    ),
    tags(
        (name = "characters", description = "Characters of the Book of Mormon"),
        (name = "quotes", description = "Quoted passages"),
        (name = "images", description = "Artwork depicting characters"),
        (name = "users", description = "Account management (admin only)"),
        (name = "session", description = "GitHub login and session state")
    )
)]
struct ApiDoc;

/// AppState
///
/// The single shared container handed to every handler: the document store, the identity
/// provider and the loaded configuration.
#[derive(Clone)]
pub struct AppState {
    /// Persistence: the document store every repository reads and writes through.
    pub store: StoreState,
    /// Login: the external OAuth identity provider.
    pub identity: IdentityState,
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for StoreState {
    fn from_ref(app_state: &AppState) -> StoreState {
        app_state.store.clone()
    }
}

impl FromRef<AppState> for IdentityState {
    fn from_ref(app_state: &AppState) -> IdentityState {
        app_state.identity.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

// Any typed repository can be pulled straight out of the state.
impl<R: Resource> FromRef<AppState> for Repository<R> {
    fn from_ref(app_state: &AppState) -> Repository<R> {
        Repository::new(app_state.store.clone())
    }
}

/// create_router
///
/// Assembles the public, authenticated and admin routers, the Swagger UI, and the
/// request-id, tracing and CORS layers around them.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        // Signed-in callers only; anonymous requests stop at the layer with a 403.
        .merge(
            authenticated::authenticated_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                auth::require_sign_in,
            )),
        )
        // Admin checks happen inside each handler, after any payload validation that
        // precedes them.
        .merge(admin::admin_routes())
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Span for `TraceLayer`: method, URI and the `x-request-id` set by `SetRequestIdLayer`,
/// so every log line of one request can be correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
