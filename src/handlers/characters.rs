use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use super::{IdPath, JsonBody, deleted, list_by_id, list_matching, payload, updated};
use crate::{
    auth::{Requirement, Session, require},
    error::ApiError,
    models::{Character, ErrorResponse, MessageResponse, NewCharacter},
    repository::{Repository, to_body},
    schema,
    store::InsertOneResult,
};

/// list_characters
///
/// Every character, oldest first. An empty catalog is an empty array, not a 404.
#[utoipa::path(
    get,
    path = "/characters/",
    tag = "characters",
    responses(
        (status = 200, description = "All characters", body = [Character]),
        (status = 500, description = "Store failure", body = MessageResponse)
    )
)]
pub async fn list_characters(
    State(characters): State<Repository<Character>>,
) -> Result<Json<Vec<Character>>, ApiError> {
    Ok(Json(characters.list_all().await?))
}

#[utoipa::path(
    get,
    path = "/characters/{id}",
    tag = "characters",
    params(("id" = Uuid, Path, description = "Character id")),
    responses(
        (status = 200, description = "The character, as a one-element array", body = [Character]),
        (status = 404, description = "Not found", body = MessageResponse)
    )
)]
pub async fn get_character(
    State(characters): State<Repository<Character>>,
    IdPath(id): IdPath,
) -> Result<Json<Vec<Character>>, ApiError> {
    list_by_id(&characters, id).await
}

#[utoipa::path(
    get,
    path = "/characters/listByBook/{book}",
    tag = "characters",
    params(("book" = String, Path, description = "Book the character first appears in")),
    responses(
        (status = 200, description = "Matching characters", body = [Character]),
        (status = 404, description = "No matches", body = MessageResponse)
    )
)]
pub async fn list_characters_by_book(
    State(characters): State<Repository<Character>>,
    Path(book): Path<String>,
) -> Result<Json<Vec<Character>>, ApiError> {
    list_matching(&characters, "firstBookSeen", "book", &book).await
}

#[utoipa::path(
    get,
    path = "/characters/listByQuality/{quality}",
    tag = "characters",
    params(("quality" = String, Path, description = "Hero, Zero or Ambiguous")),
    responses(
        (status = 200, description = "Matching characters", body = [Character]),
        (status = 404, description = "No matches", body = MessageResponse)
    )
)]
pub async fn list_characters_by_quality(
    State(characters): State<Repository<Character>>,
    Path(quality): Path<String>,
) -> Result<Json<Vec<Character>>, ApiError> {
    list_matching(&characters, "quality", "quality", &quality).await
}

/// create_character
///
/// The payload is validated before the admin check, so malformed bodies get a 400 even
/// from anonymous callers.
#[utoipa::path(
    post,
    path = "/characters/createNewCharacter",
    tag = "characters",
    request_body = NewCharacter,
    responses(
        (status = 201, description = "Created", body = InsertOneResult),
        (status = 400, description = "Invalid payload", body = ErrorResponse),
        (status = 403, description = "Not an admin", body = MessageResponse)
    )
)]
pub async fn create_character(
    session: Session,
    State(characters): State<Repository<Character>>,
    body: JsonBody,
) -> Result<(StatusCode, Json<InsertOneResult>), ApiError> {
    let character = schema::character(&payload(body)?)?;
    require(&session, Requirement::Admin)?;

    let result = characters.create(&character).await?;
    tracing::info!(id = %result.inserted_id, name = %character.character_name, "character created");
    Ok((StatusCode::CREATED, Json(result)))
}

/// update_character
///
/// Sets the validated fields on the stored character. Fields absent from the payload
/// keep their stored values.
#[utoipa::path(
    put,
    path = "/characters/updateCharacter/{id}",
    tag = "characters",
    params(("id" = Uuid, Path, description = "Character id")),
    request_body = NewCharacter,
    responses(
        (status = 204, description = "Updated"),
        (status = 400, description = "Invalid payload", body = ErrorResponse),
        (status = 403, description = "Not an admin", body = MessageResponse),
        (status = 404, description = "Not found or unchanged", body = MessageResponse)
    )
)]
pub async fn update_character(
    session: Session,
    State(characters): State<Repository<Character>>,
    IdPath(id): IdPath,
    body: JsonBody,
) -> Result<StatusCode, ApiError> {
    require(&session, Requirement::Admin)?;
    let character = schema::character(&payload(body)?)?;

    let result = characters.set_fields(id, to_body(&character)?).await?;
    updated::<Character>(result)
}

#[utoipa::path(
    delete,
    path = "/characters/deleteCharacter/{id}",
    tag = "characters",
    params(("id" = Uuid, Path, description = "Character id")),
    responses(
        (status = 200, description = "Deleted", body = MessageResponse),
        (status = 403, description = "Not an admin", body = MessageResponse),
        (status = 404, description = "Not found", body = MessageResponse)
    )
)]
pub async fn delete_character(
    session: Session,
    State(characters): State<Repository<Character>>,
    IdPath(id): IdPath,
) -> Result<Json<MessageResponse>, ApiError> {
    require(&session, Requirement::Admin)?;
    deleted::<Character>(characters.delete(id).await?)
}
