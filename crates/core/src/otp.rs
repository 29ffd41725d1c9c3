//! Check-in one-time codes.
//!
//! The owner receives a 4-digit code when confirming a booking and reads it
//! back from the driver on arrival. Codes are compared as strings so a
//! leading-zero or whitespace difference in the input never matches.

use rand::Rng;

/// Smallest code ever issued.
pub const OTP_MIN: u32 = 1000;
/// Largest code ever issued.
pub const OTP_MAX: u32 = 9999;

/// Generate a fresh 4-digit numeric code in `OTP_MIN..=OTP_MAX`.
pub fn generate_otp() -> String {
    rand::rng().random_range(OTP_MIN..=OTP_MAX).to_string()
}

/// True when `supplied` equals the stored code exactly.
///
/// A booking with no stored code (not yet confirmed, or already activated)
/// never matches.
pub fn otp_matches(stored: Option<&str>, supplied: &str) -> bool {
    match stored {
        Some(code) => !code.is_empty() && code == supplied,
        None => false,
    }
}
