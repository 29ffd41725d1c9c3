//! Request handlers.
//!
//! Each submodule provides async handler functions for one resource.
//! Handlers delegate to the corresponding repository in `parkify_db` and
//! map errors via [`AppError`](crate::error::AppError).

pub mod bookings;
pub mod spots;
pub mod wallet;
