//! Person records and the stores that keep them.
//!
//! - [`model`] the person entity, its request shape and validation rules
//! - [`persistence`] the [`PersonRepository`](persistence::storage::PersonRepository) capability
//!   and its storage engines

pub mod consts;
pub mod model;
pub mod persistence;
