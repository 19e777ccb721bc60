use bountiful_api::{
    models::{AccessLevel, Quality},
    schema::{self, Payload, SchemaError},
};
use serde_json::{Value, json};
use uuid::Uuid;

fn payload(value: Value) -> Payload {
    match value {
        Value::Object(map) => map,
        other => panic!("test payload must be an object, got {other}"),
    }
}

fn nephi() -> Value {
    json!({
        "characterName": "Nephi",
        "firstBookSeen": "1 Nephi",
        "firstVerseSeen": "1:1",
        "quality": "Hero",
        "notes": ""
    })
}

fn message(result: Result<impl std::fmt::Debug, SchemaError>) -> String {
    result.expect_err("payload should be rejected").0
}

// --- Characters ---

#[test]
fn test_character_valid_payload() {
    let character = schema::character(&payload(nephi())).unwrap();

    assert_eq!(character.character_name, "Nephi");
    assert_eq!(character.first_book_seen, "1 Nephi");
    assert_eq!(character.quality, Quality::Hero);
    // An empty `notes` is allowed and kept.
    assert_eq!(character.notes.as_deref(), Some(""));
}

#[test]
fn test_character_notes_optional() {
    let mut body = nephi();
    body.as_object_mut().unwrap().remove("notes");

    let character = schema::character(&payload(body)).unwrap();
    assert_eq!(character.notes, None);
}

#[test]
fn test_character_empty_name_rejected() {
    let mut body = nephi();
    body["characterName"] = json!("");

    assert_eq!(
        message(schema::character(&payload(body))),
        "\"characterName\" is not allowed to be empty"
    );
}

#[test]
fn test_character_missing_field_reports_first_in_order() {
    let body = json!({ "quality": "Hero" });

    // characterName is declared first, so it is the one reported.
    assert_eq!(
        message(schema::character(&payload(body))),
        "\"characterName\" is required"
    );
}

#[test]
fn test_character_length_bounds() {
    let mut body = nephi();
    body["characterName"] = json!("N");
    assert_eq!(
        message(schema::character(&payload(body))),
        "\"characterName\" length must be at least 2 characters long"
    );

    let mut body = nephi();
    body["firstVerseSeen"] = json!("1".repeat(21));
    assert_eq!(
        message(schema::character(&payload(body))),
        "\"firstVerseSeen\" length must be less than or equal to 20 characters long"
    );
}

#[test]
fn test_character_wrong_type() {
    let mut body = nephi();
    body["firstBookSeen"] = json!(42);

    assert_eq!(
        message(schema::character(&payload(body))),
        "\"firstBookSeen\" must be a string"
    );
}

#[test]
fn test_character_quality_must_be_allowed_value() {
    let mut body = nephi();
    body["quality"] = json!("Villain");

    assert_eq!(
        message(schema::character(&payload(body))),
        "\"quality\" must be one of [Hero, Zero, Ambiguous]"
    );
}

#[test]
fn test_character_unknown_key_rejected() {
    let mut body = nephi();
    body["tribe"] = json!("Nephites");

    assert_eq!(
        message(schema::character(&payload(body))),
        "\"tribe\" is not allowed"
    );
}

// --- Quotes & Images ---

#[test]
fn test_quote_requires_valid_character_id() {
    let body = json!({
        "characterId": "not-an-id",
        "characterName": "Nephi",
        "bookName": "1 Nephi",
        "verse": "3:7",
        "characterQuality": "Hero",
        "text": "I will go and do the things which the Lord hath commanded."
    });

    assert_eq!(
        message(schema::quote(&payload(body))),
        "\"characterId\" must be a valid id"
    );
}

#[test]
fn test_quote_valid_payload() {
    let character_id = Uuid::new_v4();
    let body = json!({
        "characterId": character_id.to_string(),
        "characterName": "Nephi",
        "bookName": "1 Nephi",
        "verse": "3:7",
        "characterQuality": "Hero",
        "text": "I will go and do the things which the Lord hath commanded."
    });

    let quote = schema::quote(&payload(body)).unwrap();
    assert_eq!(quote.character_id, character_id);
    assert_eq!(quote.character_quality, Quality::Hero);
}

#[test]
fn test_image_source_must_be_uri() {
    let body = json!({
        "characterId": Uuid::new_v4().to_string(),
        "characterName": "Nephi",
        "bookWhereSeen": "1 Nephi",
        "characterQuality": "Hero",
        "caption": "Nephi obtains the plates",
        "source": "not a uri"
    });

    assert_eq!(
        message(schema::image(&payload(body))),
        "\"source\" must be a valid uri"
    );
}

#[test]
fn test_image_optional_fields() {
    let body = json!({
        "characterId": Uuid::new_v4().to_string(),
        "characterName": "Nephi",
        "bookWhereSeen": "1 Nephi",
        "characterQuality": "Hero",
        "caption": "Nephi obtains the plates",
        "description": "",
        "source": "https://example.org/nephi.jpg"
    });

    let image = schema::image(&payload(body)).unwrap();
    assert_eq!(image.description.as_deref(), Some(""));
    assert_eq!(image.filename, None);
}

// --- Users ---

fn moroni() -> Value {
    json!({
        "firstName": "Moroni",
        "lastName": "Mormonson",
        "email": "moroni@example.org",
        "userName": "moroni421",
        "password": "TitleOfLiberty1",
        "accessLevel": "admin",
        "gitName": "moroni"
    })
}

#[test]
fn test_user_valid_payload() {
    let fields = schema::user(&payload(moroni())).unwrap();

    assert_eq!(fields.user_name, "moroni421");
    assert_eq!(fields.access_level, AccessLevel::Admin);
    assert_eq!(fields.git_name.as_deref(), Some("moroni"));
}

#[test]
fn test_user_account_modified_is_accepted_and_dropped() {
    let mut body = moroni();
    body["accountModified"] = json!("01/01/1830");

    assert!(schema::user(&payload(body)).is_ok());
}

#[test]
fn test_user_email_and_alphanum_rules() {
    let mut body = moroni();
    body["email"] = json!("not-an-email");
    assert_eq!(
        message(schema::user(&payload(body))),
        "\"email\" must be a valid email"
    );

    let mut body = moroni();
    body["userName"] = json!("moroni_421");
    assert_eq!(
        message(schema::user(&payload(body))),
        "\"userName\" must only contain alpha-numeric characters"
    );
}

#[test]
fn test_user_password_pattern_does_not_echo_value() {
    let mut body = moroni();
    body["password"] = json!("short");

    let error = message(schema::user(&payload(body)));
    assert_eq!(
        error,
        "\"password\" fails to match the required pattern: /^[a-zA-Z0-9]{8,30}$/"
    );
    assert!(!error.contains("\"short\""));
}

#[test]
fn test_access_level_body() {
    let level = schema::access_level(&payload(json!({ "accessLevel": "user" }))).unwrap();
    assert_eq!(level, AccessLevel::User);

    assert_eq!(
        message(schema::access_level(&payload(json!({ "accessLevel": "root" })))),
        "\"accessLevel\" must be one of [user, admin]"
    );
}

#[test]
fn test_password_body_rejects_extra_keys() {
    let body = json!({ "password": "NewPassword1", "userName": "moroni421" });

    assert_eq!(
        message(schema::password(&payload(body))),
        "\"userName\" is not allowed"
    );
}
