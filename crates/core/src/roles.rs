//! Well-known role name constants.
//!
//! These must match the `role` values seeded in the `users` table migration.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_OWNER: &str = "owner";
pub const ROLE_DRIVER: &str = "driver";
