//! Whole-document storage for the site's collections.
//!
//! Every collection is a single JSON document that is read and overwritten as
//! a unit. Backends only move strings around; typing happens in [`load`] and
//! [`save`].

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::models::Reservation;
use crate::types::StoreError;

pub mod file_store;
pub mod redis_store;

pub use file_store::FileStore;
pub use redis_store::RedisStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Reservations,
    CapacitySettings,
    Menu,
    Messages,
}

impl Collection {
    pub fn key(self) -> &'static str {
        match self {
            Collection::Reservations => "reservations",
            Collection::CapacitySettings => "capacity-settings",
            Collection::Menu => "menu",
            Collection::Messages => "messages",
        }
    }
}

pub trait DocumentStore: Send {
    /// Raw document for `collection`, or `None` when it was never written.
    fn get(&self, collection: Collection) -> Result<Option<String>, StoreError>;

    fn put(&self, collection: Collection, document: &str) -> Result<(), StoreError>;
}

/// Decodes a collection, yielding `T::default()` when it does not exist yet.
pub fn load<T>(store: &dyn DocumentStore, collection: Collection) -> Result<T, StoreError>
where
    T: DeserializeOwned + Default,
{
    match store.get(collection)? {
        Some(document) if !document.trim().is_empty() => Ok(serde_json::from_str(&document)?),
        _ => Ok(T::default()),
    }
}

pub fn save<T: Serialize + ?Sized>(
    store: &dyn DocumentStore,
    collection: Collection,
    value: &T,
) -> Result<(), StoreError> {
    let document = serde_json::to_string_pretty(value)?;
    store.put(collection, &document)
}

/// The only view of storage the capacity evaluator needs.
pub trait ReservationSource {
    fn list_reservations(&self, date: &str, time: &str) -> Result<Vec<Reservation>, StoreError>;
}

impl ReservationSource for dyn DocumentStore + '_ {
    fn list_reservations(&self, date: &str, time: &str) -> Result<Vec<Reservation>, StoreError> {
        let reservations: Vec<Reservation> = load(self, Collection::Reservations)?;

        Ok(reservations
            .into_iter()
            .filter(|reservation| reservation.is_in_slot(date, time))
            .collect())
    }
}
