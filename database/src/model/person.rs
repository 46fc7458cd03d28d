use serde::{Deserialize, Serialize};

use crate::consts::consts::PersonId;

use super::validation::{Validate, ValidationErrors, Validator};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Person {
    pub id: PersonId,
    pub name: String,
    pub age: Option<i32>,
    pub address: Option<String>,
    pub work: Option<String>,
}

impl Person {
    pub fn new_test() -> Self {
        Person {
            id: PersonId(1),
            name: "test".to_string(),
            age: Some(1),
            address: Some("test".to_string()),
            work: Some("test".to_string()),
        }
    }
}

/// A person that passed validation but has not been stored yet, so it has no id
#[derive(Clone, Debug, PartialEq)]
pub struct NewPerson {
    pub name: String,
    pub age: Option<i32>,
    pub address: Option<String>,
    pub work: Option<String>,
}

impl NewPerson {
    pub fn with_id(self, id: PersonId) -> Person {
        Person {
            id,
            name: self.name,
            age: self.age,
            address: self.address,
            work: self.work,
        }
    }
}

/// Request body for both create and update. Fields are optional so that a missing name is
/// reported by validation instead of failing to deserialize.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct PersonRequest {
    /// Never trusted, the store or the request path decides the id
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub age: Option<i32>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub work: Option<String>,
}

impl Validate for PersonRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Validator::new()
            .required("name", self.name.as_deref())
            .greater_than("age", self.age.map(i64::from), 0)
            .finish()
    }
}

impl TryFrom<PersonRequest> for NewPerson {
    type Error = ValidationErrors;

    fn try_from(request: PersonRequest) -> Result<Self, Self::Error> {
        request.validate()?;

        Ok(NewPerson {
            name: request.name.unwrap_or_default(),
            age: request.age,
            address: request.address,
            work: request.work,
        })
    }
}

impl From<Person> for PersonRequest {
    fn from(person: Person) -> Self {
        PersonRequest {
            id: Some(i64::from(person.id.to_number())),
            name: Some(person.name),
            age: person.age,
            address: person.address,
            work: person.work,
        }
    }
}
