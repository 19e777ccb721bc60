use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::marker::PhantomData;
use uuid::Uuid;

use crate::{
    models::{Character, Image, NewCharacter, NewImage, NewQuote, NewUser, Quote, User},
    store::{
        Body, Collection, DeleteResult, Document, Filter, InsertOneResult, StoreError, StoreState,
        UpdateResult,
    },
};

/// Resource
///
/// Ties a stored record type to its collection and to the document shape written on
/// create and replace. `LABEL` and `PLURAL` name the resource in response messages.
pub trait Resource: Serialize + DeserializeOwned + Send + Sync + 'static {
    const COLLECTION: Collection;
    const LABEL: &'static str;
    const PLURAL: &'static str;
    type Document: Serialize + Send + Sync;
}

impl Resource for Character {
    const COLLECTION: Collection = Collection::Characters;
    const LABEL: &'static str = "character";
    const PLURAL: &'static str = "characters";
    type Document = NewCharacter;
}

impl Resource for Quote {
    const COLLECTION: Collection = Collection::Quotes;
    const LABEL: &'static str = "quote";
    const PLURAL: &'static str = "quotes";
    type Document = NewQuote;
}

impl Resource for Image {
    const COLLECTION: Collection = Collection::Images;
    const LABEL: &'static str = "image";
    const PLURAL: &'static str = "images";
    type Document = NewImage;
}

impl Resource for User {
    const COLLECTION: Collection = Collection::Users;
    const LABEL: &'static str = "user";
    const PLURAL: &'static str = "users";
    type Document = NewUser;
}

/// Repository
///
/// Typed access to one collection of the shared document store. Cheap to clone; every
/// copy talks to the same store.
pub struct Repository<R> {
    store: StoreState,
    resource: PhantomData<fn() -> R>,
}

impl<R> Clone for Repository<R> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            resource: PhantomData,
        }
    }
}

impl<R: Resource> Repository<R> {
    pub fn new(store: StoreState) -> Self {
        Self {
            store,
            resource: PhantomData,
        }
    }

    /// Every record of the collection, oldest first.
    pub async fn list_all(&self) -> Result<Vec<R>, StoreError> {
        self.fetch(Filter::All).await
    }

    /// The record with `id`, as a zero- or one-element list.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Vec<R>, StoreError> {
        self.fetch(Filter::Id(id)).await
    }

    /// Records whose `field` equals `value` exactly.
    pub async fn find_by(&self, field: &'static str, value: &str) -> Result<Vec<R>, StoreError> {
        self.fetch(Filter::FieldEq(field, value.to_string())).await
    }

    pub async fn create(&self, document: &R::Document) -> Result<InsertOneResult, StoreError> {
        let body = to_body(document)?;
        self.store.insert_one(R::COLLECTION, body).await
    }

    /// Replaces the whole stored document with `document`.
    pub async fn replace(
        &self,
        id: Uuid,
        document: &R::Document,
    ) -> Result<UpdateResult, StoreError> {
        let body = to_body(document)?;
        self.store.replace_one(R::COLLECTION, id, body).await
    }

    /// Overwrites only the fields present in `fields`.
    pub async fn set_fields(&self, id: Uuid, fields: Body) -> Result<UpdateResult, StoreError> {
        self.store.update_one(R::COLLECTION, id, fields).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<DeleteResult, StoreError> {
        self.store.delete_one(R::COLLECTION, id).await
    }

    async fn fetch(&self, filter: Filter) -> Result<Vec<R>, StoreError> {
        let documents = self.store.find(R::COLLECTION, filter).await?;
        documents.into_iter().map(decode).collect()
    }
}

impl Repository<User> {
    /// The stored password hash of user `id`, which the `User` record never carries.
    pub async fn password_hash(&self, id: Uuid) -> Result<Option<String>, StoreError> {
        let documents = self.store.find(Collection::Users, Filter::Id(id)).await?;
        Ok(documents.into_iter().next().and_then(|document| {
            document
                .body
                .get("password")
                .and_then(Value::as_str)
                .map(str::to_string)
        }))
    }
}

/// Serializes a document into the field map written to the store.
pub fn to_body<T: Serialize>(document: &T) -> Result<Body, StoreError> {
    match serde_json::to_value(document)? {
        Value::Object(body) => Ok(body),
        other => Err(StoreError::Unavailable(format!(
            "expected a JSON object, got {other}"
        ))),
    }
}

// Stored bodies do not carry their id; it is spliced back in as `_id` before decoding.
fn decode<R: DeserializeOwned>(document: Document) -> Result<R, StoreError> {
    let Document { id, mut body } = document;
    body.insert("_id".to_string(), Value::String(id.to_string()));
    Ok(serde_json::from_value(Value::Object(body))?)
}
