use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::{PgPool, Row, postgres::PgRow, types::Json};
use std::{collections::HashMap, sync::Arc};
use thiserror::Error;
use tokio::sync::RwLock;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

/// The field map of a stored document, without its identifier.
pub type Body = Map<String, Value>;

/// Collection
///
/// The four collections of the catalog database. Names are static so they can be
/// interpolated into SQL without risk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Characters,
    Quotes,
    Images,
    Users,
}

impl Collection {
    pub const ALL: [Collection; 4] = [
        Collection::Characters,
        Collection::Quotes,
        Collection::Images,
        Collection::Users,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Collection::Characters => "characters",
            Collection::Quotes => "quotes",
            Collection::Images => "images",
            Collection::Users => "users",
        }
    }

    /// Document fields whose values must be unique across the collection.
    pub fn unique_fields(self) -> &'static [&'static str] {
        match self {
            Collection::Users => &["userName"],
            _ => &[],
        }
    }
}

/// Filter
///
/// The query shapes the repositories need: everything, one id, or exact match on one field.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    All,
    Id(Uuid),
    FieldEq(&'static str, String),
}

impl Filter {
    fn matches(&self, document: &Document) -> bool {
        match self {
            Filter::All => true,
            Filter::Id(id) => document.id == *id,
            Filter::FieldEq(field, value) => {
                document.body.get(*field).and_then(Value::as_str) == Some(value.as_str())
            }
        }
    }
}

/// A stored document: the store-assigned identifier plus its fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: Uuid,
    pub body: Body,
}

/// InsertOneResult
///
/// Acknowledgment of an insert. Returned verbatim as the body of every 201 response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct InsertOneResult {
    pub acknowledged: bool,
    pub inserted_id: Uuid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UpdateResult {
    pub matched_count: u64,
    // Zero when no document matched or the stored document already held the same values.
    pub modified_count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeleteResult {
    pub deleted_count: u64,
}

/// StoreError
///
/// Every failure a store can report. Handlers never inspect these beyond turning them
/// into a 500 response carrying the message.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("stored document could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("duplicate value for unique field \"{field}\"")]
    Duplicate { field: &'static str },

    #[error("{0}")]
    Unavailable(String),
}

/// DocumentStore
///
/// The contract for the external document database. Repositories talk to this trait so
/// the Postgres implementation and the in-memory one are interchangeable.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Returns matching documents in insertion order.
    async fn find(&self, collection: Collection, filter: Filter)
    -> Result<Vec<Document>, StoreError>;

    /// Inserts a new document and assigns its identifier.
    async fn insert_one(
        &self,
        collection: Collection,
        body: Body,
    ) -> Result<InsertOneResult, StoreError>;

    /// Replaces every field of the document with `id`.
    async fn replace_one(
        &self,
        collection: Collection,
        id: Uuid,
        body: Body,
    ) -> Result<UpdateResult, StoreError>;

    /// Sets the given fields on the document with `id`, leaving the others untouched.
    async fn update_one(
        &self,
        collection: Collection,
        id: Uuid,
        set: Body,
    ) -> Result<UpdateResult, StoreError>;

    async fn delete_one(&self, collection: Collection, id: Uuid)
    -> Result<DeleteResult, StoreError>;
}

/// StoreState
///
/// The concrete type used to share the document store across the application state.
pub type StoreState = Arc<dyn DocumentStore>;

// --- Postgres (JSONB) implementation ---

/// PostgresStore
///
/// Keeps each collection in its own table of `(id, doc JSONB, created_at)` rows.
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// ensure_schema
    ///
    /// Creates the collection tables and unique indexes when they are missing. Idempotent,
    /// so it runs on every startup.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        for collection in Collection::ALL {
            let table = collection.name();
            let create = format!(
                "CREATE TABLE IF NOT EXISTS {table} (
                    id UUID PRIMARY KEY,
                    doc JSONB NOT NULL,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
                )"
            );
            sqlx::query(&create).execute(&self.pool).await?;

            for field in collection.unique_fields() {
                let index = format!(
                    "CREATE UNIQUE INDEX IF NOT EXISTS {table}_{field}_key ON {table} ((doc ->> '{field}'))"
                );
                sqlx::query(&index).execute(&self.pool).await?;
            }
        }
        Ok(())
    }

    fn classify(collection: Collection, err: sqlx::Error) -> StoreError {
        let unique_violation = err
            .as_database_error()
            .is_some_and(|db_err| db_err.is_unique_violation());

        match collection.unique_fields().first() {
            Some(&field) if unique_violation => StoreError::Duplicate { field },
            _ => StoreError::Database(err),
        }
    }

    fn to_document(row: PgRow) -> Result<Document, StoreError> {
        let id: Uuid = row.try_get("id")?;
        let Json(body): Json<Body> = row.try_get("doc")?;
        Ok(Document { id, body })
    }

    fn to_update_result(row: PgRow) -> Result<UpdateResult, StoreError> {
        let matched: i64 = row.try_get("matched")?;
        let modified: i64 = row.try_get("modified")?;
        Ok(UpdateResult {
            matched_count: matched as u64,
            modified_count: modified as u64,
        })
    }
}

#[async_trait]
impl DocumentStore for PostgresStore {
    async fn find(
        &self,
        collection: Collection,
        filter: Filter,
    ) -> Result<Vec<Document>, StoreError> {
        let table = collection.name();
        let rows = match filter {
            Filter::All => {
                let sql = format!("SELECT id, doc FROM {table} ORDER BY created_at, id");
                sqlx::query(&sql).fetch_all(&self.pool).await?
            }
            Filter::Id(id) => {
                let sql = format!("SELECT id, doc FROM {table} WHERE id = $1");
                sqlx::query(&sql).bind(id).fetch_all(&self.pool).await?
            }
            Filter::FieldEq(field, value) => {
                let sql = format!(
                    "SELECT id, doc FROM {table} WHERE doc ->> $1 = $2 ORDER BY created_at, id"
                );
                sqlx::query(&sql)
                    .bind(field)
                    .bind(value)
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        rows.into_iter().map(Self::to_document).collect()
    }

    async fn insert_one(
        &self,
        collection: Collection,
        body: Body,
    ) -> Result<InsertOneResult, StoreError> {
        let id = Uuid::new_v4();
        let sql = format!("INSERT INTO {} (id, doc) VALUES ($1, $2)", collection.name());

        sqlx::query(&sql)
            .bind(id)
            .bind(Json(body))
            .execute(&self.pool)
            .await
            .map_err(|e| Self::classify(collection, e))?;

        Ok(InsertOneResult {
            acknowledged: true,
            inserted_id: id,
        })
    }

    async fn replace_one(
        &self,
        collection: Collection,
        id: Uuid,
        body: Body,
    ) -> Result<UpdateResult, StoreError> {
        let table = collection.name();
        // An identical replacement matches but does not count as a modification.
        let sql = format!(
            "WITH target AS (SELECT id, doc FROM {table} WHERE id = $1),
             changed AS (
                UPDATE {table} SET doc = $2 FROM target
                WHERE {table}.id = target.id AND target.doc IS DISTINCT FROM $2
                RETURNING {table}.id
             )
             SELECT (SELECT COUNT(*) FROM target) AS matched,
                    (SELECT COUNT(*) FROM changed) AS modified"
        );

        let row = sqlx::query(&sql)
            .bind(id)
            .bind(Json(body))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| Self::classify(collection, e))?;

        Self::to_update_result(row)
    }

    async fn update_one(
        &self,
        collection: Collection,
        id: Uuid,
        set: Body,
    ) -> Result<UpdateResult, StoreError> {
        let table = collection.name();
        let sql = format!(
            "WITH target AS (SELECT id, doc FROM {table} WHERE id = $1),
             changed AS (
                UPDATE {table} SET doc = target.doc || $2 FROM target
                WHERE {table}.id = target.id AND NOT (target.doc @> $2)
                RETURNING {table}.id
             )
             SELECT (SELECT COUNT(*) FROM target) AS matched,
                    (SELECT COUNT(*) FROM changed) AS modified"
        );

        let row = sqlx::query(&sql)
            .bind(id)
            .bind(Json(set))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| Self::classify(collection, e))?;

        Self::to_update_result(row)
    }

    async fn delete_one(
        &self,
        collection: Collection,
        id: Uuid,
    ) -> Result<DeleteResult, StoreError> {
        let sql = format!("DELETE FROM {} WHERE id = $1", collection.name());
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;

        Ok(DeleteResult {
            deleted_count: result.rows_affected(),
        })
    }
}

// --- In-memory implementation ---

/// MemoryStore
///
/// An in-process store with the same matching and modification semantics as the Postgres
/// one. Used when no `DATABASE_URL` is configured locally, and by the test suite.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<Collection, Vec<Document>>>,
    /// When true, every operation returns a simulated failure.
    should_fail: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    /// Number of documents currently held in `collection`.
    pub async fn len(&self, collection: Collection) -> usize {
        self.collections
            .read()
            .await
            .get(&collection)
            .map_or(0, Vec::len)
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.should_fail {
            return Err(StoreError::Unavailable(
                "Memory store error: simulation requested".to_string(),
            ));
        }
        Ok(())
    }
}

/// Returns the first unique field of `body` already taken by another document.
fn duplicate_field(
    collection: Collection,
    documents: &[Document],
    body: &Body,
    except: Option<Uuid>,
) -> Option<&'static str> {
    collection.unique_fields().iter().copied().find(|field| {
        body.get(*field).is_some_and(|value| {
            documents
                .iter()
                .filter(|doc| Some(doc.id) != except)
                .any(|doc| doc.body.get(*field) == Some(value))
        })
    })
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find(
        &self,
        collection: Collection,
        filter: Filter,
    ) -> Result<Vec<Document>, StoreError> {
        self.check_available()?;
        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection)
            .map(|docs| docs.iter().filter(|doc| filter.matches(doc)).cloned().collect())
            .unwrap_or_default())
    }

    async fn insert_one(
        &self,
        collection: Collection,
        body: Body,
    ) -> Result<InsertOneResult, StoreError> {
        self.check_available()?;
        let mut collections = self.collections.write().await;
        let documents = collections.entry(collection).or_default();

        if let Some(field) = duplicate_field(collection, documents, &body, None) {
            return Err(StoreError::Duplicate { field });
        }

        let id = Uuid::new_v4();
        documents.push(Document { id, body });
        Ok(InsertOneResult {
            acknowledged: true,
            inserted_id: id,
        })
    }

    async fn replace_one(
        &self,
        collection: Collection,
        id: Uuid,
        body: Body,
    ) -> Result<UpdateResult, StoreError> {
        self.check_available()?;
        let mut collections = self.collections.write().await;
        let documents = collections.entry(collection).or_default();

        let Some(position) = documents.iter().position(|doc| doc.id == id) else {
            return Ok(UpdateResult::default());
        };
        if documents[position].body == body {
            return Ok(UpdateResult {
                matched_count: 1,
                modified_count: 0,
            });
        }
        if let Some(field) = duplicate_field(collection, documents, &body, Some(id)) {
            return Err(StoreError::Duplicate { field });
        }

        documents[position].body = body;
        Ok(UpdateResult {
            matched_count: 1,
            modified_count: 1,
        })
    }

    async fn update_one(
        &self,
        collection: Collection,
        id: Uuid,
        set: Body,
    ) -> Result<UpdateResult, StoreError> {
        self.check_available()?;
        let mut collections = self.collections.write().await;
        let documents = collections.entry(collection).or_default();

        let Some(position) = documents.iter().position(|doc| doc.id == id) else {
            return Ok(UpdateResult::default());
        };

        let current = &documents[position].body;
        let changed = set.iter().any(|(key, value)| current.get(key) != Some(value));
        if !changed {
            return Ok(UpdateResult {
                matched_count: 1,
                modified_count: 0,
            });
        }
        if let Some(field) = duplicate_field(collection, documents, &set, Some(id)) {
            return Err(StoreError::Duplicate { field });
        }

        documents[position].body.extend(set);
        Ok(UpdateResult {
            matched_count: 1,
            modified_count: 1,
        })
    }

    async fn delete_one(
        &self,
        collection: Collection,
        id: Uuid,
    ) -> Result<DeleteResult, StoreError> {
        self.check_available()?;
        let mut collections = self.collections.write().await;
        let documents = collections.entry(collection).or_default();

        let before = documents.len();
        documents.retain(|doc| doc.id != id);
        Ok(DeleteResult {
            deleted_count: (before - documents.len()) as u64,
        })
    }
}
