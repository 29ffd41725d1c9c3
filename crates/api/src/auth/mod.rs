//! Authentication primitives.
//!
//! Users sign in through the identity service; this server only verifies
//! the access tokens it issues. See [`jwt`].

pub mod jwt;
