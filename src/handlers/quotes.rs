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
    models::{ErrorResponse, MessageResponse, NewQuote, Quote},
    repository::Repository,
    schema,
    store::InsertOneResult,
};

#[utoipa::path(
    get,
    path = "/quotes/",
    tag = "quotes",
    responses(
        (status = 200, description = "All quotes", body = [Quote]),
        (status = 500, description = "Store failure", body = MessageResponse)
    )
)]
pub async fn list_quotes(
    State(quotes): State<Repository<Quote>>,
) -> Result<Json<Vec<Quote>>, ApiError> {
    Ok(Json(quotes.list_all().await?))
}

#[utoipa::path(
    get,
    path = "/quotes/{id}",
    tag = "quotes",
    params(("id" = Uuid, Path, description = "Quote id")),
    responses(
        (status = 200, description = "The quote, as a one-element array", body = [Quote]),
        (status = 404, description = "Not found", body = MessageResponse)
    )
)]
pub async fn get_quote(
    State(quotes): State<Repository<Quote>>,
    IdPath(id): IdPath,
) -> Result<Json<Vec<Quote>>, ApiError> {
    list_by_id(&quotes, id).await
}

#[utoipa::path(
    get,
    path = "/quotes/listByBook/{book}",
    tag = "quotes",
    params(("book" = String, Path, description = "Book the quote comes from")),
    responses(
        (status = 200, description = "Matching quotes", body = [Quote]),
        (status = 404, description = "No matches", body = MessageResponse)
    )
)]
pub async fn list_quotes_by_book(
    State(quotes): State<Repository<Quote>>,
    Path(book): Path<String>,
) -> Result<Json<Vec<Quote>>, ApiError> {
    list_matching(&quotes, "bookName", "book", &book).await
}

#[utoipa::path(
    get,
    path = "/quotes/listByCharacter/{character}",
    tag = "quotes",
    params(("character" = String, Path, description = "Name of the quoted character")),
    responses(
        (status = 200, description = "Matching quotes", body = [Quote]),
        (status = 404, description = "No matches", body = MessageResponse)
    )
)]
pub async fn list_quotes_by_character(
    State(quotes): State<Repository<Quote>>,
    Path(character): Path<String>,
) -> Result<Json<Vec<Quote>>, ApiError> {
    list_matching(&quotes, "characterName", "character", &character).await
}

#[utoipa::path(
    get,
    path = "/quotes/listByQuality/{quality}",
    tag = "quotes",
    params(("quality" = String, Path, description = "Hero, Zero or Ambiguous")),
    responses(
        (status = 200, description = "Matching quotes", body = [Quote]),
        (status = 404, description = "No matches", body = MessageResponse)
    )
)]
pub async fn list_quotes_by_quality(
    State(quotes): State<Repository<Quote>>,
    Path(quality): Path<String>,
) -> Result<Json<Vec<Quote>>, ApiError> {
    list_matching(&quotes, "characterQuality", "quality", &quality).await
}

#[utoipa::path(
    post,
    path = "/quotes/createNewQuote",
    tag = "quotes",
    request_body = NewQuote,
    responses(
        (status = 201, description = "Created", body = InsertOneResult),
        (status = 400, description = "Invalid payload", body = ErrorResponse),
        (status = 403, description = "Not an admin", body = MessageResponse)
    )
)]
pub async fn create_quote(
    session: Session,
    State(quotes): State<Repository<Quote>>,
    body: JsonBody,
) -> Result<(StatusCode, Json<InsertOneResult>), ApiError> {
    require(&session, Requirement::Admin)?;
    let quote = schema::quote(&payload(body)?)?;

    let result = quotes.create(&quote).await?;
    tracing::info!(id = %result.inserted_id, character = %quote.character_name, "quote created");
    Ok((StatusCode::CREATED, Json(result)))
}

/// update_quote
///
/// Replaces the stored quote with the validated payload.
#[utoipa::path(
    put,
    path = "/quotes/updateQuote/{id}",
    tag = "quotes",
    params(("id" = Uuid, Path, description = "Quote id")),
    request_body = NewQuote,
    responses(
        (status = 204, description = "Updated"),
        (status = 400, description = "Invalid payload", body = ErrorResponse),
        (status = 403, description = "Not an admin", body = MessageResponse),
        (status = 404, description = "Not found or unchanged", body = MessageResponse)
    )
)]
pub async fn update_quote(
    session: Session,
    State(quotes): State<Repository<Quote>>,
    IdPath(id): IdPath,
    body: JsonBody,
) -> Result<StatusCode, ApiError> {
    require(&session, Requirement::Admin)?;
    let quote = schema::quote(&payload(body)?)?;

    updated::<Quote>(quotes.replace(id, &quote).await?)
}

#[utoipa::path(
    delete,
    path = "/quotes/removeQuote/{id}",
    tag = "quotes",
    params(("id" = Uuid, Path, description = "Quote id")),
    responses(
        (status = 200, description = "Deleted", body = MessageResponse),
        (status = 403, description = "Not an admin", body = MessageResponse),
        (status = 404, description = "Not found", body = MessageResponse)
    )
)]
pub async fn delete_quote(
    session: Session,
    State(quotes): State<Repository<Quote>>,
    IdPath(id): IdPath,
) -> Result<Json<MessageResponse>, ApiError> {
    require(&session, Requirement::Admin)?;
    deleted::<Quote>(quotes.delete(id).await?)
}
