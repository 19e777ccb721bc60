use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use serde_json::{Value, json};
use uuid::Uuid;

use super::{IdPath, JsonBody, list_by_id, not_found_by_id, payload, today, updated};
use crate::{
    auth::{Requirement, Session, hash_password, require, verify_password},
    error::ApiError,
    models::{AccessLevelRequest, ErrorResponse, MessageResponse, NewUser, PasswordChangeRequest, User},
    repository::Repository,
    schema::{self, UserFields},
    store::{Body, InsertOneResult},
};

// An unchanged password keeps its stored hash, so an identical body leaves the document
// untouched and the update answers 404.
async fn password_hash(
    users: &Repository<User>,
    id: Option<Uuid>,
    password: &str,
) -> Result<String, ApiError> {
    if let Some(id) = id
        && let Some(stored) = users.password_hash(id).await?
        && verify_password(password, &stored)
    {
        return Ok(stored);
    }
    hash_password(password)
}

// Hashes the password and stamps the modification date.
async fn to_document(
    users: &Repository<User>,
    id: Option<Uuid>,
    fields: UserFields,
) -> Result<NewUser, ApiError> {
    Ok(NewUser {
        password: password_hash(users, id, &fields.password).await?,
        first_name: fields.first_name,
        last_name: fields.last_name,
        email: fields.email,
        user_name: fields.user_name,
        access_level: fields.access_level,
        account_modified: today(),
        git_name: fields.git_name,
    })
}

fn field_update(field: &str, value: Value) -> Body {
    let mut set = Body::new();
    set.insert(field.to_string(), value);
    set.insert("accountModified".to_string(), Value::String(today()));
    set
}

#[utoipa::path(
    get,
    path = "/users/",
    tag = "users",
    responses(
        (status = 200, description = "All users, without passwords", body = [User]),
        (status = 403, description = "Not an admin", body = MessageResponse)
    )
)]
pub async fn list_users(
    session: Session,
    State(users): State<Repository<User>>,
) -> Result<Json<Vec<User>>, ApiError> {
    require(&session, Requirement::Admin)?;
    Ok(Json(users.list_all().await?))
}

#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "users",
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "The user, as a one-element array", body = [User]),
        (status = 403, description = "Not an admin", body = MessageResponse),
        (status = 404, description = "Not found", body = MessageResponse)
    )
)]
pub async fn get_user(
    session: Session,
    State(users): State<Repository<User>>,
    IdPath(id): IdPath,
) -> Result<Json<Vec<User>>, ApiError> {
    require(&session, Requirement::Admin)?;
    list_by_id(&users, id).await
}

/// create_user
///
/// Stores a new account. The password is kept only as an Argon2id hash and
/// `accountModified` is set to today.
#[utoipa::path(
    post,
    path = "/users/createNewUser",
    tag = "users",
    request_body = NewUser,
    responses(
        (status = 201, description = "Created", body = InsertOneResult),
        (status = 400, description = "Invalid payload", body = ErrorResponse),
        (status = 403, description = "Not an admin", body = MessageResponse)
    )
)]
pub async fn create_user(
    session: Session,
    State(users): State<Repository<User>>,
    body: JsonBody,
) -> Result<(StatusCode, Json<InsertOneResult>), ApiError> {
    let fields = schema::user(&payload(body)?)?;
    require(&session, Requirement::Admin)?;

    let user = to_document(&users, None, fields).await?;
    let result = users.create(&user).await?;
    tracing::info!(id = %result.inserted_id, user_name = %user.user_name, "user created");
    Ok((StatusCode::CREATED, Json(result)))
}

#[utoipa::path(
    put,
    path = "/users/updateUser/{id}",
    tag = "users",
    params(("id" = Uuid, Path, description = "User id")),
    request_body = NewUser,
    responses(
        (status = 204, description = "Updated"),
        (status = 400, description = "Invalid payload", body = ErrorResponse),
        (status = 403, description = "Not an admin", body = MessageResponse),
        (status = 404, description = "Not found or unchanged", body = MessageResponse)
    )
)]
pub async fn update_user(
    session: Session,
    State(users): State<Repository<User>>,
    IdPath(id): IdPath,
    body: JsonBody,
) -> Result<StatusCode, ApiError> {
    let fields = schema::user(&payload(body)?)?;
    require(&session, Requirement::Admin)?;

    let user = to_document(&users, Some(id), fields).await?;
    updated::<User>(users.replace(id, &user).await?)
}

#[utoipa::path(
    patch,
    path = "/users/changePassword/{id}",
    tag = "users",
    params(("id" = Uuid, Path, description = "User id")),
    request_body = PasswordChangeRequest,
    responses(
        (status = 204, description = "Password changed"),
        (status = 400, description = "Invalid payload", body = ErrorResponse),
        (status = 403, description = "Not an admin", body = MessageResponse),
        (status = 404, description = "Not found", body = MessageResponse)
    )
)]
pub async fn change_password(
    session: Session,
    State(users): State<Repository<User>>,
    IdPath(id): IdPath,
    body: JsonBody,
) -> Result<StatusCode, ApiError> {
    require(&session, Requirement::Admin)?;
    let password = schema::password(&payload(body)?)?;

    let hash = password_hash(&users, Some(id), &password).await?;
    let set = field_update("password", Value::String(hash));
    updated::<User>(users.set_fields(id, set).await?)
}

#[utoipa::path(
    patch,
    path = "/users/setAccessLevel/{id}",
    tag = "users",
    params(("id" = Uuid, Path, description = "User id")),
    request_body = AccessLevelRequest,
    responses(
        (status = 204, description = "Access level set"),
        (status = 400, description = "Invalid payload", body = ErrorResponse),
        (status = 403, description = "Not an admin", body = MessageResponse),
        (status = 404, description = "Not found or unchanged", body = MessageResponse)
    )
)]
pub async fn set_access_level(
    session: Session,
    State(users): State<Repository<User>>,
    IdPath(id): IdPath,
    body: JsonBody,
) -> Result<StatusCode, ApiError> {
    require(&session, Requirement::Admin)?;
    let level = schema::access_level(&payload(body)?)?;

    let result = users
        .set_fields(id, field_update("accessLevel", json!(level)))
        .await?;
    let status = updated::<User>(result)?;
    tracing::info!(%id, access_level = ?level, by = ?session.username, "access level changed");
    Ok(status)
}

/// delete_user
///
/// Unlike the catalog resources, a successful user delete answers 204 with no body.
#[utoipa::path(
    delete,
    path = "/users/removeUser/{id}",
    tag = "users",
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Not an admin", body = MessageResponse),
        (status = 404, description = "Not found", body = MessageResponse)
    )
)]
pub async fn delete_user(
    session: Session,
    State(users): State<Repository<User>>,
    IdPath(id): IdPath,
) -> Result<StatusCode, ApiError> {
    require(&session, Requirement::Admin)?;

    let result = users.delete(id).await?;
    if result.deleted_count == 0 {
        return Err(not_found_by_id::<User>());
    }
    Ok(StatusCode::NO_CONTENT)
}
