//! Domain error taxonomy shared by the `db` and `api` crates.

use crate::booking::BookingError;
use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// A booking operation was rejected by admission control or the
    /// state machine. Carries its own machine-readable code.
    #[error(transparent)]
    Booking(#[from] BookingError),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vehicle::VehicleType;

    #[test]
    fn not_found_display() {
        let err = CoreError::NotFound {
            entity: "Booking",
            id: 7,
        };
        assert_eq!(err.to_string(), "Entity not found: Booking with id 7");
    }

    #[test]
    fn booking_error_is_transparent() {
        let err: CoreError = BookingError::CapacityExceeded {
            spot_id: 3,
            vehicle_type: VehicleType::Car,
            capacity: 1,
        }
        .into();
        assert_eq!(
            err.to_string(),
            "No car slots left at spot 3 (capacity 1)"
        );
    }
}
