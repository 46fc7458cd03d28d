use std::{fmt, num::IntErrorKind, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

// Types
pub type ErrorString = String;

// New Type Pattern -- https://doc.rust-lang.org/rust-by-example/generics/new_types.html
/// Store assigned key of a person, always positive once it has been parsed from user input
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PersonId(pub i32);

impl PersonId {
    pub fn to_number(self) -> i32 {
        self.0
    }

    pub fn increment(&self) -> PersonId {
        PersonId(self.0 + 1)
    }
}

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum PersonIdError {
    #[error("PersonId must be a number, got '{0}'")]
    NotANumber(String),
    #[error("PersonId must be greater than 0, got '{0}'")]
    NegativeOrZero(String),
    #[error("PersonId must be at most {}, got {0}", i32::MAX)]
    TooLarge(String),
}

impl TryFrom<i64> for PersonId {
    type Error = PersonIdError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if value <= 0 {
            return Err(PersonIdError::NegativeOrZero(value.to_string()));
        }

        let id = i32::try_from(value).map_err(|_| PersonIdError::TooLarge(value.to_string()))?;

        Ok(PersonId(id))
    }
}

impl FromStr for PersonId {
    type Err = PersonIdError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.parse::<i64>() {
            Ok(value) => PersonId::try_from(value),
            // Digits that overflow i64 are still a number, just not one we can store
            Err(e) if *e.kind() == IntErrorKind::PosOverflow => {
                Err(PersonIdError::TooLarge(raw.to_string()))
            }
            Err(e) if *e.kind() == IntErrorKind::NegOverflow => {
                Err(PersonIdError::NegativeOrZero(raw.to_string()))
            }
            Err(_) => Err(PersonIdError::NotANumber(raw.to_string())),
        }
    }
}

// Values
pub const START_AT_INDEX: PersonId = PersonId(1);
