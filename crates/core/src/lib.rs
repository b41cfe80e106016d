//! Domain logic for the movies API.
//!
//! Everything here is pure: no database, no HTTP. The `db` and `api` crates
//! build on these types.

pub mod error;
pub mod filters;
pub mod movie;
pub mod types;
pub mod validator;
