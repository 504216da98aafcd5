//! In-memory key/value collection resource.
//!
//! Serves a flat map of JSON values:
//! - `GET`    whole collection, or one item when the route captures `key`
//! - `PUT`/`POST` merge the members of an object body into the collection
//! - `DELETE` one item, or the whole collection
//!
//! Concurrent writers are serialized per key by the underlying `DashMap`;
//! there is no cross-key atomicity.

use std::sync::Arc;

use dashmap::DashMap;

use crate::codec::Value;
use crate::http::{HandlerError, HttpError};
use crate::resource::{Call, Resource};

/// Capture name carrying the item key.
pub const KEY_ARG: &str = "key";

/// Shared map behind a collection resource.
#[derive(Debug, Clone, Default)]
pub struct MemoryCollection {
    items: Arc<DashMap<String, Value>>,
}

impl MemoryCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.items.get(key).map(|entry| entry.value().clone())
    }

    pub fn insert(&self, key: impl Into<String>, value: Value) {
        self.items.insert(key.into(), value);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// All items as one object (keys sorted).
    pub fn snapshot(&self) -> Value {
        let map: serde_json::Map<String, Value> = self
            .items
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        Value::Object(map)
    }

    fn read(&self, call: &Call) -> Result<Value, HandlerError> {
        match call.arg(KEY_ARG) {
            Some(key) => self.get(key).ok_or_else(|| HttpError::not_found().into()),
            None => Ok(self.snapshot()),
        }
    }

    fn merge(&self, call: &Call) -> Result<(), HandlerError> {
        match &call.input {
            Some(Value::Object(members)) => {
                for (key, value) in members {
                    self.items.insert(key.clone(), value.clone());
                }
                tracing::debug!(count = members.len(), "Collection items stored");
                Ok(())
            }
            Some(_) => Err(HttpError::bad_request("expected an object").into()),
            None => Err(HttpError::bad_request("missing request body").into()),
        }
    }

    fn remove(&self, call: &Call) -> Result<(), HandlerError> {
        match call.arg(KEY_ARG) {
            Some(key) => {
                self.items.remove(key).ok_or_else(|| HandlerError::from(HttpError::not_found()))?;
                tracing::debug!(key = %key, "Collection item removed");
            }
            None => {
                tracing::debug!("Removing entire collection");
                self.items.clear();
            }
        }
        Ok(())
    }

    /// Build a resource serving this collection.
    pub fn resource(&self, name: impl Into<String>) -> Resource {
        let (get, put, post, delete) = (self.clone(), self.clone(), self.clone(), self.clone());
        Resource::new(name)
            .get(move |call: Call| {
                let result = get.read(&call);
                async move { result }
            })
            .put(move |call: Call| {
                let result = put.merge(&call);
                async move { result }
            })
            .post(move |call: Call| {
                let result = post.merge(&call);
                async move { result }
            })
            .delete(move |call: Call| {
                let result = delete.remove(&call);
                async move { result }
            })
    }
}
