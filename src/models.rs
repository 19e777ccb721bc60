use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Shared Enumerations ---

/// Quality
///
/// The moral tag attached to a character and denormalized onto its quotes and images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub enum Quality {
    Hero,
    Zero,
    Ambiguous,
}

impl Quality {
    pub const NAMES: &'static [&'static str] = &["Hero", "Zero", "Ambiguous"];

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Hero" => Some(Quality::Hero),
            "Zero" => Some(Quality::Zero),
            "Ambiguous" => Some(Quality::Ambiguous),
            _ => None,
        }
    }
}

/// AccessLevel
///
/// The two-tier role stored on every user. Only `admin` may write to the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum AccessLevel {
    #[default]
    User,
    Admin,
}

impl AccessLevel {
    pub const NAMES: &'static [&'static str] = &["user", "admin"];

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "user" => Some(AccessLevel::User),
            "admin" => Some(AccessLevel::Admin),
            _ => None,
        }
    }
}

// --- Stored Records (Output Schemas) ---

/// Character
///
/// A person from the text, as stored in the `characters` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Character {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub character_name: String,
    pub first_book_seen: String,
    pub first_verse_seen: String,
    pub quality: Quality,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub notes: Option<String>,
}

/// Quote
///
/// A quoted passage. `characterName` and `characterQuality` are copies of the
/// character's values taken at write time and are not kept in sync.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Quote {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub character_id: Uuid,
    pub character_name: String,
    pub book_name: String,
    pub verse: String,
    pub character_quality: Quality,
    pub text: String,
}

/// Image
///
/// An artwork depicting a character, with the same denormalized character fields as `Quote`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Image {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub character_id: Uuid,
    pub character_name: String,
    pub book_where_seen: String,
    pub character_quality: Quality,
    pub caption: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub description: Option<String>,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub filename: Option<String>,
}

/// User
///
/// An account record. The stored password hash is deliberately absent from this
/// struct, so it is dropped on read and never serialized into a response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub first_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub last_name: Option<String>,
    pub email: String,
    pub user_name: String,
    pub access_level: AccessLevel,
    pub account_modified: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub git_name: Option<String>,
}

// --- Validated Documents (Input Schemas) ---
// Produced by the schema validator and written to the store as-is.

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct NewCharacter {
    #[schema(example = "Nephi")]
    pub character_name: String,
    #[schema(example = "1 Nephi")]
    pub first_book_seen: String,
    #[schema(example = "1:1")]
    pub first_verse_seen: String,
    pub quality: Quality,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct NewQuote {
    pub character_id: Uuid,
    pub character_name: String,
    #[schema(example = "1 Nephi")]
    pub book_name: String,
    #[schema(example = "3:7")]
    pub verse: String,
    pub character_quality: Quality,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct NewImage {
    pub character_id: Uuid,
    pub character_name: String,
    pub book_where_seen: String,
    pub character_quality: Quality,
    pub caption: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub description: Option<String>,
    #[schema(example = "https://example.org/nephi.jpg")]
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub filename: Option<String>,
}

/// NewUser
///
/// The stored shape of a user. `password` travels as plaintext in the request and is
/// replaced by its Argon2id hash before this document is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct NewUser {
    pub first_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub last_name: Option<String>,
    pub email: String,
    pub user_name: String,
    pub password: String,
    pub access_level: AccessLevel,
    // Server-set, MM/DD/YYYY. Ignored when sent by a client.
    pub account_modified: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub git_name: Option<String>,
}

/// PasswordChangeRequest
///
/// Body of PATCH /users/changePassword/{id}.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PasswordChangeRequest {
    pub password: String,
}

/// AccessLevelRequest
///
/// Body of PATCH /users/setAccessLevel/{id}.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccessLevelRequest {
    pub access_level: AccessLevel,
}

// --- Response Envelopes ---

/// MessageResponse
///
/// `{message}` body used by delete confirmations and every non-validation error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema, TS)]
#[ts(export)]
pub struct MessageResponse {
    pub message: String,
}

/// ErrorResponse
///
/// `{error}` body of a 400 schema-validation failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema, TS)]
#[ts(export)]
pub struct ErrorResponse {
    pub error: String,
}

/// SessionProfile
///
/// Output of GET /users/me: what the current session knows about its caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SessionProfile {
    pub is_logged_in: bool,
    pub username: Option<String>,
    pub access_level: Option<AccessLevel>,
}
