//! Runs the document-store contract against a real Postgres.
//!
//! `cargo test -- --ignored` with `DATABASE_URL` pointing at a scratch database.

use bountiful_api::store::{Body, Collection, DocumentStore, Filter, PostgresStore, StoreError};
use serde_json::json;
use sqlx::PgPool;
use tokio::test;
use uuid::Uuid;

// --- Test Context and Setup ---

async fn setup() -> PostgresStore {
    dotenv::dotenv().ok();

    let db_url = std::env::var("DATABASE_URL")
        .expect("DATABASE_URL must be set to run integration tests");
    let pool = PgPool::connect(&db_url)
        .await
        .expect("Failed to connect to database for integration tests.");

    let store = PostgresStore::new(pool);
    store.ensure_schema().await.expect("Failed to create tables.");
    store
}

fn body(value: serde_json::Value) -> Body {
    value.as_object().cloned().unwrap()
}

#[test]
#[ignore = "requires a running Postgres (DATABASE_URL)"]
async fn test_insert_find_and_field_filter() {
    let store = setup().await;
    let book = format!("Book {}", Uuid::new_v4());

    let id = store
        .insert_one(
            Collection::Characters,
            body(json!({ "characterName": "Nephi", "firstBookSeen": book })),
        )
        .await
        .unwrap()
        .inserted_id;

    let by_id = store.find(Collection::Characters, Filter::Id(id)).await.unwrap();
    assert_eq!(by_id.len(), 1);
    assert_eq!(by_id[0].body["characterName"], "Nephi");

    let by_book = store
        .find(Collection::Characters, Filter::FieldEq("firstBookSeen", book))
        .await
        .unwrap();
    assert_eq!(by_book.len(), 1);
    assert_eq!(by_book[0].id, id);

    store.delete_one(Collection::Characters, id).await.unwrap();
}

#[test]
#[ignore = "requires a running Postgres (DATABASE_URL)"]
async fn test_replace_and_update_modified_counts() {
    let store = setup().await;
    let doc = body(json!({ "characterName": "Lehi", "quality": "Hero" }));
    let id = store
        .insert_one(Collection::Characters, doc.clone())
        .await
        .unwrap()
        .inserted_id;

    let same = store.replace_one(Collection::Characters, id, doc).await.unwrap();
    assert_eq!((same.matched_count, same.modified_count), (1, 0));

    let unchanged = store
        .update_one(Collection::Characters, id, body(json!({ "quality": "Hero" })))
        .await
        .unwrap();
    assert_eq!(unchanged.modified_count, 0);

    let changed = store
        .update_one(Collection::Characters, id, body(json!({ "notes": "Prophet" })))
        .await
        .unwrap();
    assert_eq!(changed.modified_count, 1);

    let found = store.find(Collection::Characters, Filter::Id(id)).await.unwrap();
    assert_eq!(found[0].body["characterName"], "Lehi");
    assert_eq!(found[0].body["notes"], "Prophet");

    let missing = store
        .replace_one(Collection::Characters, Uuid::new_v4(), Body::new())
        .await
        .unwrap();
    assert_eq!(missing.matched_count, 0);

    assert_eq!(
        store.delete_one(Collection::Characters, id).await.unwrap().deleted_count,
        1
    );
}

#[test]
#[ignore = "requires a running Postgres (DATABASE_URL)"]
async fn test_unique_user_name() {
    let store = setup().await;
    let user_name = format!("user{}", Uuid::new_v4().simple());

    let id = store
        .insert_one(Collection::Users, body(json!({ "userName": user_name })))
        .await
        .unwrap()
        .inserted_id;
    let duplicate = store
        .insert_one(Collection::Users, body(json!({ "userName": user_name })))
        .await;

    assert!(matches!(duplicate, Err(StoreError::Duplicate { field: "userName" })));
    store.delete_one(Collection::Users, id).await.unwrap();
}
