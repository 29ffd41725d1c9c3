//! Fixtures shared by the repository integration tests.

#![allow(dead_code)]

use chrono::{Duration, Utc};
use parkify_core::pricing::PricingPolicy;
use parkify_core::types::{DbId, Timestamp};
use parkify_core::vehicle::{PerVehicle, VehicleType};
use parkify_db::models::booking::{Booking, NewBooking};
use parkify_db::models::spot::{CreateSpot, ParkingSpot};
use parkify_db::models::user::{CreateUser, User};
use parkify_db::repositories::{BookingRepo, SpotRepo, UserRepo};
use sqlx::PgPool;

pub const MAX_SESSION_HOURS: i64 = 12;

pub fn max_session() -> Duration {
    Duration::hours(MAX_SESSION_HOURS)
}

pub async fn create_user(pool: &PgPool, name: &str, role: &str) -> User {
    UserRepo::create(
        pool,
        &CreateUser {
            name: name.to_string(),
            email: format!("{}@parkify.test", name.to_lowercase().replace(' ', ".")),
            role: role.to_string(),
        },
    )
    .await
    .unwrap()
}

/// A spot with `car_slots` car slots priced at `car_price` per hour.
pub async fn create_car_spot(
    pool: &PgPool,
    owner_id: DbId,
    car_slots: i32,
    car_price: Option<i64>,
) -> ParkingSpot {
    SpotRepo::create(
        pool,
        &CreateSpot {
            owner_id,
            name: "Riverside Lot".to_string(),
            price: None,
            pricing: PerVehicle {
                car: car_price,
                ..Default::default()
            },
            slots: PerVehicle {
                car: Some(car_slots),
                ..Default::default()
            },
        },
    )
    .await
    .unwrap()
}

pub fn car_request(spot_id: DbId, user_id: DbId) -> NewBooking {
    NewBooking {
        spot_id,
        user_id,
        vehicle_type: VehicleType::Car,
        requested_price: None,
    }
}

pub async fn admit(pool: &PgPool, spot_id: DbId, user_id: DbId) -> Booking {
    BookingRepo::admit(
        pool,
        &car_request(spot_id, user_id),
        &PricingPolicy::default(),
        Utc::now(),
    )
    .await
    .unwrap()
}

/// Admit, confirm and activate a booking starting at `start`.
pub async fn active_booking(
    pool: &PgPool,
    spot_id: DbId,
    user_id: DbId,
    start: Timestamp,
) -> Booking {
    let booking = admit(pool, spot_id, user_id).await;
    let confirmed = BookingRepo::confirm(pool, booking.id).await.unwrap();
    let otp = confirmed.otp.clone().unwrap();
    BookingRepo::activate(pool, booking.id, &otp, start, max_session())
        .await
        .unwrap()
}
