use std::{
    collections::BTreeMap,
    sync::{Mutex, MutexGuard, PoisonError},
};

use crate::{
    consts::consts::{PersonId, START_AT_INDEX},
    model::person::{NewPerson, Person},
};

use super::{PersonRepository, StorageError, StorageResult};

struct PersonRows {
    next_id: PersonId,
    rows: BTreeMap<PersonId, Person>,
}

/// Keeps every person in process memory, ordered by id. Nothing survives a restart.
pub struct MemoryStorage {
    table: Mutex<PersonRows>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            table: Mutex::new(PersonRows {
                next_id: START_AT_INDEX,
                rows: BTreeMap::new(),
            }),
        }
    }

    // A panic while holding the lock cannot leave a half written row, every mutation is a
    //  single map operation
    fn table(&self) -> MutexGuard<'_, PersonRows> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl PersonRepository for MemoryStorage {
    fn get_all_persons(&self) -> StorageResult<Vec<Person>> {
        Ok(self.table().rows.values().cloned().collect())
    }

    fn create_person(&self, person: NewPerson) -> StorageResult<Person> {
        let mut table = self.table();

        let id = table.next_id;
        table.next_id = id.increment();

        let person = person.with_id(id);
        table.rows.insert(id, person.clone());

        Ok(person)
    }

    fn get_person_by_id(&self, id: PersonId) -> StorageResult<Person> {
        self.table()
            .rows
            .get(&id)
            .cloned()
            .ok_or(StorageError::NotFound(id))
    }

    fn update_person_by_id(&self, id: PersonId, person: Person) -> StorageResult<()> {
        match self.table().rows.get_mut(&id) {
            Some(row) => {
                *row = Person { id, ..person };
                Ok(())
            }
            None => Err(StorageError::NotFound(id)),
        }
    }

    fn delete_person_by_id(&self, id: PersonId) -> StorageResult<()> {
        self.table()
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or(StorageError::NotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_person(name: &str) -> NewPerson {
        NewPerson {
            name: name.to_string(),
            age: Some(30),
            address: None,
            work: Some("Work".to_string()),
        }
    }

    mod create {
        use super::*;

        #[test]
        fn assigns_increasing_ids() {
            let storage = MemoryStorage::new();

            let first = storage.create_person(new_person("One")).unwrap();
            let second = storage.create_person(new_person("Two")).unwrap();

            assert_eq!(first.id, PersonId(1));
            assert_eq!(second.id, PersonId(2));
        }

        #[test]
        fn ids_are_not_reused_after_delete() {
            let storage = MemoryStorage::new();

            let first = storage.create_person(new_person("One")).unwrap();
            storage.delete_person_by_id(first.id).unwrap();

            let second = storage.create_person(new_person("Two")).unwrap();

            assert_eq!(second.id, PersonId(2));
        }
    }

    mod get {
        use super::*;

        #[test]
        fn returns_created_person() {
            let storage = MemoryStorage::new();

            let created = storage.create_person(new_person("Ann")).unwrap();

            assert_eq!(storage.get_person_by_id(created.id), Ok(created));
        }

        #[test]
        fn missing_id_is_not_found() {
            let storage = MemoryStorage::new();

            assert_eq!(
                storage.get_person_by_id(PersonId(7)),
                Err(StorageError::NotFound(PersonId(7)))
            );
        }

        #[test]
        fn list_is_ordered_by_id() {
            let storage = MemoryStorage::new();

            storage.create_person(new_person("One")).unwrap();
            storage.create_person(new_person("Two")).unwrap();

            let names: Vec<String> = storage
                .get_all_persons()
                .unwrap()
                .into_iter()
                .map(|p| p.name)
                .collect();

            assert_eq!(names, vec!["One".to_string(), "Two".to_string()]);
        }
    }

    mod update {
        use super::*;

        #[test]
        fn overwrites_mutable_fields() {
            let storage = MemoryStorage::new();

            let created = storage.create_person(new_person("Ann")).unwrap();

            let replacement = NewPerson {
                name: "Bob".to_string(),
                age: None,
                address: Some("Street".to_string()),
                work: None,
            }
            .with_id(created.id);

            storage
                .update_person_by_id(created.id, replacement.clone())
                .unwrap();

            assert_eq!(storage.get_person_by_id(created.id), Ok(replacement));
        }

        #[test]
        fn keeps_row_under_the_given_id() {
            let storage = MemoryStorage::new();

            let created = storage.create_person(new_person("Ann")).unwrap();

            // The record carries a different id, the key wins
            let replacement = new_person("Bob").with_id(PersonId(99));

            storage
                .update_person_by_id(created.id, replacement)
                .unwrap();

            assert_eq!(storage.get_person_by_id(created.id).unwrap().name, "Bob");
            assert_eq!(
                storage.get_person_by_id(PersonId(99)),
                Err(StorageError::NotFound(PersonId(99)))
            );
        }

        #[test]
        fn missing_id_is_not_found() {
            let storage = MemoryStorage::new();

            let result = storage.update_person_by_id(PersonId(3), Person::new_test());

            assert_eq!(result, Err(StorageError::NotFound(PersonId(3))));
        }
    }

    mod delete {
        use super::*;

        #[test]
        fn removes_the_row() {
            let storage = MemoryStorage::new();

            let created = storage.create_person(new_person("Ann")).unwrap();

            storage.delete_person_by_id(created.id).unwrap();

            assert_eq!(
                storage.get_person_by_id(created.id),
                Err(StorageError::NotFound(created.id))
            );
            assert!(storage.get_all_persons().unwrap().is_empty());
        }

        #[test]
        fn missing_id_is_not_found() {
            let storage = MemoryStorage::new();

            assert_eq!(
                storage.delete_person_by_id(PersonId(1)),
                Err(StorageError::NotFound(PersonId(1)))
            );
        }
    }
}
