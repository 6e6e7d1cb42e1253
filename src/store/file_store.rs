use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use crate::store::{Collection, DocumentStore};
use crate::types::StoreError;

/// One `<collection>.json` file per collection inside `dir`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;

        Ok(Self { dir })
    }

    pub fn path_of(&self, collection: Collection) -> PathBuf {
        self.dir.join(format!("{}.json", collection.key()))
    }
}

impl DocumentStore for FileStore {
    fn get(&self, collection: Collection) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.path_of(collection)) {
            Ok(document) => Ok(Some(document)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn put(&self, collection: Collection, document: &str) -> Result<(), StoreError> {
        fs::write(self.path_of(collection), document)?;

        Ok(())
    }
}
