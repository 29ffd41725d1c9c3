//! Parkify domain core.
//!
//! Pure booking logic with no I/O: vehicle types, the booking state machine,
//! OTP handling, admission decisions, pricing and settlement arithmetic.
//! The `db` and `api` crates gather state and apply these decisions.

pub mod admission;
pub mod booking;
pub mod error;
pub mod otp;
pub mod pricing;
pub mod roles;
pub mod settlement;
pub mod status;
pub mod types;
pub mod vehicle;
