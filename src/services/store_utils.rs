use std::time::Duration;

use actix::{Actor, Addr, SyncArbiter, SyncContext};

use crate::settings::{StorageBackend, StorageSettings};
use crate::store::{DocumentStore, FileStore, RedisStore};
use crate::types::StoreError;

/// Owns the document store. Started on a single sync thread, so messages are
/// handled strictly one after another and each handler is a critical section.
pub struct StoreActor {
    pub store: Box<dyn DocumentStore>,
    pub atomic_capacity: bool,
}

impl Actor for StoreActor {
    type Context = SyncContext<Self>;
}

pub struct AppState {
    pub store: Addr<StoreActor>,
}

#[derive(Clone)]
pub enum StoreHandle {
    File(FileStore),
    Redis { client: redis::Client, prefix: String, connect_timeout: Duration },
}

impl StoreHandle {
    pub fn from_settings(settings: &StorageSettings) -> Result<Self, StoreError> {
        match settings.backend {
            StorageBackend::File => Ok(StoreHandle::File(FileStore::open(&settings.data_dir)?)),
            StorageBackend::Redis => Ok(StoreHandle::Redis {
                client: redis::Client::open(settings.redis_uri.as_str())?,
                prefix: settings.redis_prefix.clone(),
                connect_timeout: settings.redis_connect_timeout(),
            }),
        }
    }

    fn open(&self) -> Box<dyn DocumentStore> {
        match self {
            StoreHandle::File(store) => Box::new(store.clone()),
            StoreHandle::Redis { client, prefix, connect_timeout } => {
                Box::new(RedisStore::new(client.clone(), prefix.clone(), *connect_timeout))
            }
        }
    }
}

pub fn start_store_actor(handle: StoreHandle, atomic_capacity: bool) -> Addr<StoreActor> {
    SyncArbiter::start(1, move || StoreActor { store: handle.open(), atomic_capacity })
}
