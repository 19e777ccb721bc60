//! HTTP handlers, one module per resource plus the session flow.
//!
//! Catalog handlers share the helpers below so every resource answers with the same
//! status codes and message wording.

use axum::{
    Json,
    extract::{FromRequestParts, Path, rejection::JsonRejection},
    http::{StatusCode, request::Parts},
};
use uuid::Uuid;

use crate::{
    error::ApiError,
    models::MessageResponse,
    repository::{Repository, Resource},
    schema::Payload,
    store::{DeleteResult, UpdateResult},
};

pub mod characters;
pub mod images;
pub mod quotes;
pub mod session;
pub mod users;

/// A JSON object body whose rejection is turned into a 400 by the handler, in order.
pub type JsonBody = Result<Json<Payload>, JsonRejection>;

/// IdPath
///
/// The `{id}` segment of a route as a UUID. A malformed id answers 400 with a JSON
/// `{message}` body instead of axum's plain-text rejection.
#[derive(Debug, Clone, Copy)]
pub struct IdPath(pub Uuid);

impl<S> FromRequestParts<S> for IdPath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<Uuid>::from_request_parts(parts, state).await?;
        Ok(IdPath(id))
    }
}

pub(crate) fn payload(body: JsonBody) -> Result<Payload, ApiError> {
    let Json(payload) = body?;
    Ok(payload)
}

/// `MM/DD/YYYY` stamp written to `accountModified`.
pub(crate) fn today() -> String {
    chrono::Local::now().format("%m/%d/%Y").to_string()
}

pub(crate) fn not_found_by_id<R: Resource>() -> ApiError {
    ApiError::NotFound(format!(
        "The {} with the specified id was not found.",
        R::LABEL
    ))
}

/// Lists records whose `field` equals `value`; an empty result is a 404 naming `label`.
pub(crate) async fn list_matching<R: Resource>(
    repo: &Repository<R>,
    field: &'static str,
    label: &str,
    value: &str,
) -> Result<Json<Vec<R>>, ApiError> {
    let records = repo.find_by(field, value).await?;
    if records.is_empty() {
        return Err(ApiError::NotFound(format!(
            "No {} with the specified {label} were found.",
            R::PLURAL
        )));
    }
    Ok(Json(records))
}

pub(crate) async fn list_by_id<R: Resource>(
    repo: &Repository<R>,
    id: Uuid,
) -> Result<Json<Vec<R>>, ApiError> {
    let records = repo.find_by_id(id).await?;
    if records.is_empty() {
        return Err(not_found_by_id::<R>());
    }
    Ok(Json(records))
}

/// 204 when the update changed a document, 404 otherwise.
pub(crate) fn updated<R: Resource>(result: UpdateResult) -> Result<StatusCode, ApiError> {
    if result.modified_count == 0 {
        return Err(ApiError::NotFound(format!(
            "The {} with the specified id was not found or there was not a change in the request body.",
            R::LABEL
        )));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// 200 with a confirmation message, or 404 when nothing was deleted.
pub(crate) fn deleted<R: Resource>(result: DeleteResult) -> Result<Json<MessageResponse>, ApiError> {
    if result.deleted_count == 0 {
        return Err(not_found_by_id::<R>());
    }
    Ok(Json(MessageResponse {
        message: format!(
            "The {} with the specified id was successfully deleted.",
            R::LABEL
        ),
    }))
}
