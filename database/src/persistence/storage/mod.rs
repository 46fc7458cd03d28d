use std::sync::Arc;

use thiserror::Error;

use crate::{
    consts::consts::{ErrorString, PersonId},
    model::person::{NewPerson, Person},
};

use self::{memory::MemoryStorage, postgres::PgStorage};

pub mod memory;
pub mod network;
pub mod postgres;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StorageError {
    #[error("No person found [id: {0}]")]
    NotFound(PersonId),

    #[error("Unable to connect to the store: {0}")]
    Connection(ErrorString),

    #[error("Store query failed: {0}")]
    Query(ErrorString),

    #[error("Store worker stopped before responding")]
    Disconnected,
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Entity level access to stored persons. Calls block until the store responds.
pub trait PersonRepository: Send + Sync {
    fn get_all_persons(&self) -> StorageResult<Vec<Person>>;

    /// Stores a new record, the store assigns its id
    fn create_person(&self, person: NewPerson) -> StorageResult<Person>;

    fn get_person_by_id(&self, id: PersonId) -> StorageResult<Person>;

    /// Overwrites every mutable field of the record stored under `id`
    fn update_person_by_id(&self, id: PersonId, person: Person) -> StorageResult<()>;

    fn delete_person_by_id(&self, id: PersonId) -> StorageResult<()>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum StorageEngine {
    /// Connection string, key/value (`host=localhost user=postgres`) or URL form
    Postgres(String),
    Memory,
}

impl StorageEngine {
    /// Opens the store. Connection failures are returned, the caller decides whether they
    /// are fatal.
    pub fn get_engine(self) -> StorageResult<Arc<dyn PersonRepository>> {
        match self {
            StorageEngine::Postgres(dsn) => {
                log::info!("Connecting to postgres storage");
                Ok(Arc::new(PgStorage::connect(dsn)?))
            }
            StorageEngine::Memory => {
                log::info!("Using in-memory storage, records are lost on exit");
                Ok(Arc::new(MemoryStorage::new()))
            }
        }
    }
}
