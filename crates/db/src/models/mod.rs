//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - `Deserialize` DTOs for the requests that create or mutate it

pub mod booking;
pub mod spot;
pub mod user;
pub mod verification;
pub mod wallet;
