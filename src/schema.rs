//! Request payload schemas.
//!
//! Each schema checks the fields of a JSON object in declaration order and stops at the
//! first violation, then rejects keys it does not declare. Messages name the offending
//! key in quotes, e.g. `"characterName" is not allowed to be empty`.

use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;
use thiserror::Error;
use uuid::Uuid;
use validator::{ValidateEmail, ValidateUrl};

use crate::models::{AccessLevel, NewCharacter, NewImage, NewQuote, Quality};

/// A request body as received, before validation.
pub type Payload = Map<String, Value>;

const PASSWORD_SOURCE: &str = "^[a-zA-Z0-9]{8,30}$";

static PASSWORD_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(PASSWORD_SOURCE).expect("password pattern is a valid regex"));

/// The single message reported for a rejected payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct SchemaError(pub String);

impl SchemaError {
    fn field(key: &str, problem: impl std::fmt::Display) -> Self {
        SchemaError(format!("\"{key}\" {problem}"))
    }
}

#[derive(Debug, Clone, Copy)]
enum Format {
    Email,
    Uri,
    Alphanum,
    Pattern(&'static LazyLock<Regex>, &'static str),
    Id,
}

/// Rules
///
/// Entry point of a schema: hands out one rule per declared key.
pub struct Rules<'a> {
    payload: &'a Payload,
}

impl<'a> Rules<'a> {
    pub fn new(payload: &'a Payload) -> Self {
        Self { payload }
    }

    pub fn string(&self, key: &'static str) -> StringRule<'a> {
        StringRule {
            key,
            value: self.payload.get(key),
            min: None,
            max: None,
            allow_empty: false,
            one_of: None,
            format: None,
        }
    }

    /// Fails on the first key of the payload that is not in `allowed`.
    pub fn deny_unknown(&self, allowed: &[&str]) -> Result<(), SchemaError> {
        match self.payload.keys().find(|key| !allowed.contains(&key.as_str())) {
            Some(key) => Err(SchemaError::field(key, "is not allowed")),
            None => Ok(()),
        }
    }
}

/// StringRule
///
/// Constraints on one string field. Checks run in a fixed order when the rule is
/// finished with `required`, `optional` or `required_as`: type, emptiness, allowed
/// values, length, then format.
pub struct StringRule<'a> {
    key: &'static str,
    value: Option<&'a Value>,
    min: Option<usize>,
    max: Option<usize>,
    allow_empty: bool,
    one_of: Option<&'static [&'static str]>,
    format: Option<Format>,
}

impl StringRule<'_> {
    pub fn length(mut self, min: usize, max: usize) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    pub fn max(mut self, max: usize) -> Self {
        self.max = Some(max);
        self
    }

    pub fn allow_empty(mut self) -> Self {
        self.allow_empty = true;
        self
    }

    pub fn one_of(mut self, values: &'static [&'static str]) -> Self {
        self.one_of = Some(values);
        self
    }

    pub fn email(mut self) -> Self {
        self.format = Some(Format::Email);
        self
    }

    pub fn uri(mut self) -> Self {
        self.format = Some(Format::Uri);
        self
    }

    pub fn alphanum(mut self) -> Self {
        self.format = Some(Format::Alphanum);
        self
    }

    fn pattern(mut self, regex: &'static LazyLock<Regex>, source: &'static str) -> Self {
        self.format = Some(Format::Pattern(regex, source));
        self
    }

    pub fn id(mut self) -> Self {
        self.format = Some(Format::Id);
        self
    }

    pub fn required(self) -> Result<String, SchemaError> {
        match self.value {
            None => Err(SchemaError::field(self.key, "is required")),
            Some(value) => self.check(value),
        }
    }

    pub fn optional(self) -> Result<Option<String>, SchemaError> {
        match self.value {
            None => Ok(None),
            Some(value) => self.check(value).map(Some),
        }
    }

    /// Required field converted to a typed value. `parse` only sees strings that already
    /// passed every other check.
    pub fn required_as<T>(self, parse: impl FnOnce(&str) -> Option<T>) -> Result<T, SchemaError> {
        let key = self.key;
        let choices = self.one_of;
        let raw = self.required()?;
        parse(&raw).ok_or_else(|| match choices {
            Some(values) => {
                SchemaError::field(key, format!("must be one of [{}]", values.join(", ")))
            }
            None => SchemaError::field(key, "must be a valid id"),
        })
    }

    fn check(&self, value: &Value) -> Result<String, SchemaError> {
        let Value::String(text) = value else {
            return Err(SchemaError::field(self.key, "must be a string"));
        };

        if text.is_empty() {
            return if self.allow_empty {
                Ok(String::new())
            } else {
                Err(SchemaError::field(self.key, "is not allowed to be empty"))
            };
        }

        if let Some(values) = self.one_of {
            if !values.contains(&text.as_str()) {
                return Err(SchemaError::field(
                    self.key,
                    format!("must be one of [{}]", values.join(", ")),
                ));
            }
        }

        let length = text.chars().count();
        if let Some(min) = self.min.filter(|min| length < *min) {
            return Err(SchemaError::field(
                self.key,
                format!("length must be at least {min} characters long"),
            ));
        }
        if let Some(max) = self.max.filter(|max| length > *max) {
            return Err(SchemaError::field(
                self.key,
                format!("length must be less than or equal to {max} characters long"),
            ));
        }

        let problem = match self.format {
            Some(Format::Email) if !text.validate_email() => Some("must be a valid email".to_string()),
            Some(Format::Uri) if !text.validate_url() => Some("must be a valid uri".to_string()),
            Some(Format::Alphanum) if !text.chars().all(|c| c.is_ascii_alphanumeric()) => {
                Some("must only contain alpha-numeric characters".to_string())
            }
            Some(Format::Pattern(regex, source)) if !regex.is_match(text) => {
                Some(format!("fails to match the required pattern: /{source}/"))
            }
            Some(Format::Id) if Uuid::parse_str(text).is_err() => {
                Some("must be a valid id".to_string())
            }
            _ => None,
        };

        match problem {
            Some(problem) => Err(SchemaError::field(self.key, problem)),
            None => Ok(text.clone()),
        }
    }
}

// --- Resource Schemas ---

const CHARACTER_KEYS: &[&str] = &[
    "characterName",
    "firstBookSeen",
    "firstVerseSeen",
    "quality",
    "notes",
];

pub fn character(payload: &Payload) -> Result<NewCharacter, SchemaError> {
    let rules = Rules::new(payload);
    let character = NewCharacter {
        character_name: rules.string("characterName").length(2, 50).required()?,
        first_book_seen: rules.string("firstBookSeen").length(2, 50).required()?,
        first_verse_seen: rules.string("firstVerseSeen").length(1, 20).required()?,
        quality: rules
            .string("quality")
            .one_of(Quality::NAMES)
            .required_as(Quality::parse)?,
        notes: rules.string("notes").allow_empty().max(500).optional()?,
    };
    rules.deny_unknown(CHARACTER_KEYS)?;
    Ok(character)
}

const QUOTE_KEYS: &[&str] = &[
    "characterId",
    "characterName",
    "bookName",
    "verse",
    "characterQuality",
    "text",
];

pub fn quote(payload: &Payload) -> Result<NewQuote, SchemaError> {
    let rules = Rules::new(payload);
    let quote = NewQuote {
        character_id: rules
            .string("characterId")
            .id()
            .required_as(|raw| Uuid::parse_str(raw).ok())?,
        character_name: rules.string("characterName").length(2, 50).required()?,
        book_name: rules.string("bookName").length(2, 50).required()?,
        verse: rules.string("verse").length(1, 20).required()?,
        character_quality: rules
            .string("characterQuality")
            .one_of(Quality::NAMES)
            .required_as(Quality::parse)?,
        text: rules.string("text").length(1, 1000).required()?,
    };
    rules.deny_unknown(QUOTE_KEYS)?;
    Ok(quote)
}

const IMAGE_KEYS: &[&str] = &[
    "characterId",
    "characterName",
    "bookWhereSeen",
    "characterQuality",
    "caption",
    "description",
    "source",
    "filename",
];

pub fn image(payload: &Payload) -> Result<NewImage, SchemaError> {
    let rules = Rules::new(payload);
    let image = NewImage {
        character_id: rules
            .string("characterId")
            .id()
            .required_as(|raw| Uuid::parse_str(raw).ok())?,
        character_name: rules.string("characterName").length(2, 50).required()?,
        book_where_seen: rules.string("bookWhereSeen").length(2, 50).required()?,
        character_quality: rules
            .string("characterQuality")
            .one_of(Quality::NAMES)
            .required_as(Quality::parse)?,
        caption: rules.string("caption").length(1, 200).required()?,
        description: rules.string("description").allow_empty().max(1000).optional()?,
        source: rules.string("source").uri().required()?,
        filename: rules.string("filename").length(1, 255).optional()?,
    };
    rules.deny_unknown(IMAGE_KEYS)?;
    Ok(image)
}

/// UserFields
///
/// A validated user payload. The password is still plaintext here; handlers hash it
/// before anything reaches the store.
#[derive(Debug, Clone, PartialEq)]
pub struct UserFields {
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: String,
    pub user_name: String,
    pub password: String,
    pub access_level: AccessLevel,
    pub git_name: Option<String>,
}

// `accountModified` is accepted and dropped: the server owns that field.
const USER_KEYS: &[&str] = &[
    "firstName",
    "lastName",
    "email",
    "userName",
    "password",
    "accessLevel",
    "accountModified",
    "gitName",
];

pub fn user(payload: &Payload) -> Result<UserFields, SchemaError> {
    let rules = Rules::new(payload);
    let fields = UserFields {
        first_name: rules.string("firstName").length(3, 50).required()?,
        last_name: rules.string("lastName").length(3, 50).optional()?,
        email: rules.string("email").email().required()?,
        user_name: rules.string("userName").alphanum().length(4, 30).required()?,
        password: password_rule(&rules).required()?,
        access_level: access_level_rule(&rules).required_as(AccessLevel::parse)?,
        git_name: rules.string("gitName").length(1, 39).optional()?,
    };
    rules.deny_unknown(USER_KEYS)?;
    Ok(fields)
}

/// Body of a password change: `{password}` only.
pub fn password(payload: &Payload) -> Result<String, SchemaError> {
    let rules = Rules::new(payload);
    let password = password_rule(&rules).required()?;
    rules.deny_unknown(&["password"])?;
    Ok(password)
}

/// Body of an access-level change: `{accessLevel}` only.
pub fn access_level(payload: &Payload) -> Result<AccessLevel, SchemaError> {
    let rules = Rules::new(payload);
    let level = access_level_rule(&rules).required_as(AccessLevel::parse)?;
    rules.deny_unknown(&["accessLevel"])?;
    Ok(level)
}

fn password_rule<'a>(rules: &Rules<'a>) -> StringRule<'a> {
    rules
        .string("password")
        .pattern(&PASSWORD_PATTERN, PASSWORD_SOURCE)
}

fn access_level_rule<'a>(rules: &Rules<'a>) -> StringRule<'a> {
    rules.string("accessLevel").one_of(AccessLevel::NAMES)
}
