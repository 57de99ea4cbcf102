//! Property lookup for filter evaluation.
//!
//! The evaluator reads entity properties through `PropertyResolver`. Stored
//! properties are raw text; the evaluator parses them into the discriminant a
//! predicate declares.
//!
//! `HashPropertyStore` is the in-memory backing: entity id → field → bytes,
//! with hash-style field lookup.

use std::borrow::Cow;
use std::sync::Arc;

use ahash::AHashMap;
use dashmap::DashMap;

/// Read-only property access: `(entity id, property name) -> raw bytes`.
///
/// `None` covers both "no such entity" and "property unset". Implementations
/// shared across threads must be safe for concurrent reads; the filter core
/// adds no locking of its own.
pub trait PropertyResolver {
    fn get_property(&self, entity_id: &str, property: &str) -> Option<Cow<'_, [u8]>>;
}

impl<T: PropertyResolver + ?Sized> PropertyResolver for &T {
    fn get_property(&self, entity_id: &str, property: &str) -> Option<Cow<'_, [u8]>> {
        (**self).get_property(entity_id, property)
    }
}

impl<T: PropertyResolver + ?Sized> PropertyResolver for Box<T> {
    fn get_property(&self, entity_id: &str, property: &str) -> Option<Cow<'_, [u8]>> {
        (**self).get_property(entity_id, property)
    }
}

impl<T: PropertyResolver + ?Sized> PropertyResolver for Arc<T> {
    fn get_property(&self, entity_id: &str, property: &str) -> Option<Cow<'_, [u8]>> {
        (**self).get_property(entity_id, property)
    }
}

/// Adapts a closure into a `PropertyResolver`.
pub struct FnResolver<F>(pub F);

impl<F> PropertyResolver for FnResolver<F>
where
    F: Fn(&str, &str) -> Option<Vec<u8>>,
{
    fn get_property(&self, entity_id: &str, property: &str) -> Option<Cow<'_, [u8]>> {
        (self.0)(entity_id, property).map(Cow::Owned)
    }
}

// ============================================================================
// HashPropertyStore
// ============================================================================

/// Concurrent in-memory property store keyed by entity id.
#[derive(Debug, Default)]
pub struct HashPropertyStore {
    entities: DashMap<String, AHashMap<String, Vec<u8>>>,
}

impl HashPropertyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set one field of an entity, creating the entity if needed.
    /// Returns the previous value of the field.
    pub fn hset(
        &self,
        entity_id: impl Into<String>,
        field: impl Into<String>,
        value: impl Into<Vec<u8>>,
    ) -> Option<Vec<u8>> {
        self.entities
            .entry(entity_id.into())
            .or_default()
            .insert(field.into(), value.into())
    }

    pub fn hget(&self, entity_id: &str, field: &str) -> Option<Vec<u8>> {
        self.entities
            .get(entity_id)
            .and_then(|fields| fields.get(field).cloned())
    }

    /// Remove one field. Entities left without fields are dropped.
    pub fn hdel(&self, entity_id: &str, field: &str) -> Option<Vec<u8>> {
        let removed = self
            .entities
            .get_mut(entity_id)
            .and_then(|mut fields| fields.remove(field));
        self.entities.remove_if(entity_id, |_, fields| fields.is_empty());
        removed
    }

    /// Set several fields of one entity.
    pub fn insert_entity<K, V>(&self, entity_id: impl Into<String>, fields: impl IntoIterator<Item = (K, V)>)
    where
        K: Into<String>,
        V: Into<Vec<u8>>,
    {
        // Consume the caller's iterator before taking the shard lock.
        let fields: AHashMap<String, Vec<u8>> =
            fields.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        self.entities.entry(entity_id.into()).or_default().extend(fields);
    }

    pub fn remove_entity(&self, entity_id: &str) -> bool {
        self.entities.remove(entity_id).is_some()
    }

    pub fn contains_entity(&self, entity_id: &str) -> bool {
        self.entities.contains_key(entity_id)
    }

    /// Number of entities.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl PropertyResolver for HashPropertyStore {
    fn get_property(&self, entity_id: &str, property: &str) -> Option<Cow<'_, [u8]>> {
        // Entries are guarded by shard locks; hand out an owned copy.
        self.hget(entity_id, property).map(Cow::Owned)
    }
}
