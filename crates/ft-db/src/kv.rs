use std::collections::BTreeMap;

use crate::DbError;

/// A flat string key-value store.
pub trait KvStore {
    fn get(&self, key: &str) -> Result<Option<String>, DbError>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), DbError>;

    fn remove(&mut self, key: &str) -> Result<(), DbError>;

    /// All keys, sorted.
    fn keys(&self) -> Result<Vec<String>, DbError>;

    fn remove_many(&mut self, keys: &[String]) -> Result<(), DbError> {
        for key in keys {
            self.remove(key)?;
        }
        Ok(())
    }
}

impl<S: KvStore + ?Sized> KvStore for &mut S {
    fn get(&self, key: &str) -> Result<Option<String>, DbError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), DbError> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), DbError> {
        (**self).remove(key)
    }

    fn keys(&self) -> Result<Vec<String>, DbError> {
        (**self).keys()
    }
}

/// In-memory store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, DbError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), DbError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), DbError> {
        self.entries.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, DbError> {
        Ok(self.entries.keys().cloned().collect())
    }
}
