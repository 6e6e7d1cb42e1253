use std::time::Duration;

use crate::store::{Collection, DocumentStore};
use crate::types::StoreError;

/// Keeps each collection as one string value under `<prefix>:<collection>`.
pub struct RedisStore {
    client: redis::Client,
    prefix: String,
    connect_timeout: Duration,
}

impl RedisStore {
    pub fn new(client: redis::Client, prefix: impl Into<String>, connect_timeout: Duration) -> Self {
        Self { client, prefix: prefix.into(), connect_timeout }
    }

    fn connection(&self) -> Result<redis::Connection, StoreError> {
        Ok(self.client.get_connection_with_timeout(self.connect_timeout)?)
    }

    pub fn key_of(&self, collection: Collection) -> String {
        format!("{}:{}", self.prefix, collection.key())
    }
}

impl DocumentStore for RedisStore {
    fn get(&self, collection: Collection) -> Result<Option<String>, StoreError> {
        let mut conn = self.connection()?;

        let document = redis::cmd("GET")
            .arg(self.key_of(collection))
            .query::<Option<String>>(&mut conn)?;

        Ok(document)
    }

    fn put(&self, collection: Collection, document: &str) -> Result<(), StoreError> {
        let mut conn = self.connection()?;

        redis::cmd("SET")
            .arg(self.key_of(collection))
            .arg(document)
            .query::<()>(&mut conn)?;

        Ok(())
    }
}
