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
    models::{ErrorResponse, Image, MessageResponse, NewImage},
    repository::Repository,
    schema,
    store::InsertOneResult,
};

#[utoipa::path(
    get,
    path = "/images/",
    tag = "images",
    responses(
        (status = 200, description = "All images", body = [Image]),
        (status = 500, description = "Store failure", body = MessageResponse)
    )
)]
pub async fn list_images(
    State(images): State<Repository<Image>>,
) -> Result<Json<Vec<Image>>, ApiError> {
    Ok(Json(images.list_all().await?))
}

#[utoipa::path(
    get,
    path = "/images/{id}",
    tag = "images",
    params(("id" = Uuid, Path, description = "Image id")),
    responses(
        (status = 200, description = "The image, as a one-element array", body = [Image]),
        (status = 404, description = "Not found", body = MessageResponse)
    )
)]
pub async fn get_image(
    State(images): State<Repository<Image>>,
    IdPath(id): IdPath,
) -> Result<Json<Vec<Image>>, ApiError> {
    list_by_id(&images, id).await
}

#[utoipa::path(
    get,
    path = "/images/listByBook/{book}",
    tag = "images",
    params(("book" = String, Path, description = "Book where the depicted scene appears")),
    responses(
        (status = 200, description = "Matching images", body = [Image]),
        (status = 404, description = "No matches", body = MessageResponse)
    )
)]
pub async fn list_images_by_book(
    State(images): State<Repository<Image>>,
    Path(book): Path<String>,
) -> Result<Json<Vec<Image>>, ApiError> {
    list_matching(&images, "bookWhereSeen", "book", &book).await
}

#[utoipa::path(
    get,
    path = "/images/listByCharacter/{character}",
    tag = "images",
    params(("character" = String, Path, description = "Name of the depicted character")),
    responses(
        (status = 200, description = "Matching images", body = [Image]),
        (status = 404, description = "No matches", body = MessageResponse)
    )
)]
pub async fn list_images_by_character(
    State(images): State<Repository<Image>>,
    Path(character): Path<String>,
) -> Result<Json<Vec<Image>>, ApiError> {
    list_matching(&images, "characterName", "character", &character).await
}

#[utoipa::path(
    get,
    path = "/images/listByQuality/{quality}",
    tag = "images",
    params(("quality" = String, Path, description = "Hero, Zero or Ambiguous")),
    responses(
        (status = 200, description = "Matching images", body = [Image]),
        (status = 404, description = "No matches", body = MessageResponse)
    )
)]
pub async fn list_images_by_quality(
    State(images): State<Repository<Image>>,
    Path(quality): Path<String>,
) -> Result<Json<Vec<Image>>, ApiError> {
    list_matching(&images, "characterQuality", "quality", &quality).await
}

#[utoipa::path(
    post,
    path = "/images/createNewImage",
    tag = "images",
    request_body = NewImage,
    responses(
        (status = 201, description = "Created", body = InsertOneResult),
        (status = 400, description = "Invalid payload", body = ErrorResponse),
        (status = 403, description = "Not an admin", body = MessageResponse)
    )
)]
pub async fn create_image(
    session: Session,
    State(images): State<Repository<Image>>,
    body: JsonBody,
) -> Result<(StatusCode, Json<InsertOneResult>), ApiError> {
    let image = schema::image(&payload(body)?)?;
    require(&session, Requirement::Admin)?;

    let result = images.create(&image).await?;
    tracing::info!(id = %result.inserted_id, source = %image.source, "image created");
    Ok((StatusCode::CREATED, Json(result)))
}

#[utoipa::path(
    put,
    path = "/images/updateImage/{id}",
    tag = "images",
    params(("id" = Uuid, Path, description = "Image id")),
    request_body = NewImage,
    responses(
        (status = 204, description = "Updated"),
        (status = 400, description = "Invalid payload", body = ErrorResponse),
        (status = 403, description = "Not an admin", body = MessageResponse),
        (status = 404, description = "Not found or unchanged", body = MessageResponse)
    )
)]
pub async fn update_image(
    session: Session,
    State(images): State<Repository<Image>>,
    IdPath(id): IdPath,
    body: JsonBody,
) -> Result<StatusCode, ApiError> {
    let image = schema::image(&payload(body)?)?;
    require(&session, Requirement::Admin)?;

    updated::<Image>(images.replace(id, &image).await?)
}

#[utoipa::path(
    delete,
    path = "/images/removeImage/{id}",
    tag = "images",
    params(("id" = Uuid, Path, description = "Image id")),
    responses(
        (status = 200, description = "Deleted", body = MessageResponse),
        (status = 403, description = "Not an admin", body = MessageResponse),
        (status = 404, description = "Not found", body = MessageResponse)
    )
)]
pub async fn delete_image(
    session: Session,
    State(images): State<Repository<Image>>,
    IdPath(id): IdPath,
) -> Result<Json<MessageResponse>, ApiError> {
    require(&session, Requirement::Admin)?;
    deleted::<Image>(images.delete(id).await?)
}
