//! Integration tests for booking admission.
//!
//! Exercises `BookingRepo::admit` against a real database:
//! - Capacity per (spot, vehicle type) including concurrent requests
//! - One open booking per user including concurrent requests
//! - Unit price resolution and verification tier boosts
//! - Spot lookups and availability

mod common;

use assert_matches::assert_matches;
use chrono::{Duration, Utc};
use futures::future::join_all;
use parkify_core::booking::{BookingError, BookingStatus, CancelReason};
use parkify_core::pricing::PricingPolicy;
use parkify_core::vehicle::VehicleType;
use parkify_db::models::booking::NewBooking;
use parkify_db::models::verification::ActivateVerification;
use parkify_db::repositories::{BookingRepo, SpotRepo, VerificationRepo};
use parkify_db::LifecycleError;
use sqlx::PgPool;

use common::*;

// ---------------------------------------------------------------------------
// Capacity
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn second_car_rejected_when_single_slot_taken(pool: PgPool) {
    let owner = create_user(&pool, "Olga Owner", "owner").await;
    let a = create_user(&pool, "Driver A", "driver").await;
    let b = create_user(&pool, "Driver B", "driver").await;
    let spot = create_car_spot(&pool, owner.id, 1, Some(60)).await;

    let first = admit(&pool, spot.id, a.id).await;
    assert_eq!(first.status_id, BookingStatus::Pending.id());
    assert_eq!(first.unit_price, 60);

    let err = BookingRepo::admit(
        &pool,
        &car_request(spot.id, b.id),
        &PricingPolicy::default(),
        Utc::now(),
    )
    .await
    .unwrap_err();
    assert_matches!(
        err,
        LifecycleError::Rejected(BookingError::CapacityExceeded { capacity: 1, .. })
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn other_vehicle_types_have_their_own_capacity(pool: PgPool) {
    let owner = create_user(&pool, "Olga Owner", "owner").await;
    let a = create_user(&pool, "Driver A", "driver").await;
    let b = create_user(&pool, "Driver B", "driver").await;
    let spot = create_car_spot(&pool, owner.id, 1, Some(60)).await;

    admit(&pool, spot.id, a.id).await;

    // No bike slots configured: defaults to one.
    let bike = BookingRepo::admit(
        &pool,
        &NewBooking {
            vehicle_type: VehicleType::Bike,
            ..car_request(spot.id, b.id)
        },
        &PricingPolicy::default(),
        Utc::now(),
    )
    .await
    .unwrap();
    assert_eq!(bike.vehicle_type, "bike");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn concurrent_admissions_never_exceed_capacity(pool: PgPool) {
    const CAPACITY: i32 = 2;
    const REQUESTS: usize = 6;

    let owner = create_user(&pool, "Olga Owner", "owner").await;
    let spot = create_car_spot(&pool, owner.id, CAPACITY, Some(60)).await;
    let mut drivers = Vec::new();
    for i in 0..REQUESTS {
        drivers.push(create_user(&pool, &format!("Driver {i}"), "driver").await);
    }

    let policy = PricingPolicy::default();
    let now = Utc::now();
    let results = join_all(drivers.iter().map(|d| {
        let request = car_request(spot.id, d.id);
        let pool = pool.clone();
        async move { BookingRepo::admit(&pool, &request, &policy, now).await }
    }))
    .await;

    let admitted = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(admitted, CAPACITY as usize);
    for result in results.iter().filter(|r| r.is_err()) {
        assert_matches!(
            result,
            Err(LifecycleError::Rejected(BookingError::CapacityExceeded { .. }))
        );
    }
    assert_eq!(
        SpotRepo::admitted_count(&pool, spot.id, VehicleType::Car)
            .await
            .unwrap(),
        CAPACITY as i64
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn cancelled_booking_frees_its_slot(pool: PgPool) {
    let owner = create_user(&pool, "Olga Owner", "owner").await;
    let a = create_user(&pool, "Driver A", "driver").await;
    let b = create_user(&pool, "Driver B", "driver").await;
    let spot = create_car_spot(&pool, owner.id, 1, None).await;

    let first = admit(&pool, spot.id, a.id).await;
    BookingRepo::cancel(&pool, first.id, CancelReason::DriverCancelled)
        .await
        .unwrap();

    let second = admit(&pool, spot.id, b.id).await;
    assert_eq!(second.status_id, BookingStatus::Pending.id());
}

// ---------------------------------------------------------------------------
// One open booking per user
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn user_with_open_booking_is_rejected_elsewhere(pool: PgPool) {
    let owner = create_user(&pool, "Olga Owner", "owner").await;
    let driver = create_user(&pool, "Driver A", "driver").await;
    let first_spot = create_car_spot(&pool, owner.id, 3, None).await;
    let second_spot = create_car_spot(&pool, owner.id, 3, None).await;

    admit(&pool, first_spot.id, driver.id).await;

    let err = BookingRepo::admit(
        &pool,
        &car_request(second_spot.id, driver.id),
        &PricingPolicy::default(),
        Utc::now(),
    )
    .await
    .unwrap_err();
    assert_matches!(
        err,
        LifecycleError::Rejected(BookingError::UserAlreadyBooked { user_id }) if user_id == driver.id
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn concurrent_requests_by_one_user_admit_one(pool: PgPool) {
    let owner = create_user(&pool, "Olga Owner", "owner").await;
    let driver = create_user(&pool, "Driver A", "driver").await;
    let mut spots = Vec::new();
    for _ in 0..4 {
        spots.push(create_car_spot(&pool, owner.id, 5, None).await);
    }

    let policy = PricingPolicy::default();
    let now = Utc::now();
    let results = join_all(spots.iter().map(|s| {
        let request = car_request(s.id, driver.id);
        let pool = pool.clone();
        async move { BookingRepo::admit(&pool, &request, &policy, now).await }
    }))
    .await;

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    for result in results.iter().filter(|r| r.is_err()) {
        assert_matches!(
            result,
            Err(LifecycleError::Rejected(BookingError::UserAlreadyBooked { .. }))
        );
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn completed_booking_does_not_block_new_one(pool: PgPool) {
    let owner = create_user(&pool, "Olga Owner", "owner").await;
    let driver = create_user(&pool, "Driver A", "driver").await;
    let spot = create_car_spot(&pool, owner.id, 1, Some(60)).await;

    let start = Utc::now() - Duration::minutes(30);
    let booking = active_booking(&pool, spot.id, driver.id, start).await;
    BookingRepo::complete(
        &pool,
        booking.id,
        Utc::now(),
        &Default::default(),
        None,
    )
    .await
    .unwrap();

    admit(&pool, spot.id, driver.id).await;
}

// ---------------------------------------------------------------------------
// Spot lookup and pricing
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_and_inactive_spots_are_not_found(pool: PgPool) {
    let owner = create_user(&pool, "Olga Owner", "owner").await;
    let driver = create_user(&pool, "Driver A", "driver").await;
    let spot = create_car_spot(&pool, owner.id, 1, None).await;
    assert!(SpotRepo::deactivate(&pool, spot.id).await.unwrap());

    for spot_id in [spot.id, spot.id + 1000] {
        let err = BookingRepo::admit(
            &pool,
            &car_request(spot_id, driver.id),
            &PricingPolicy::default(),
            Utc::now(),
        )
        .await
        .unwrap_err();
        assert_matches!(
            err,
            LifecycleError::Rejected(BookingError::SpotNotFound(id)) if id == spot_id
        );
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn default_price_when_spot_has_none(pool: PgPool) {
    let owner = create_user(&pool, "Olga Owner", "owner").await;
    let driver = create_user(&pool, "Driver A", "driver").await;
    let spot = create_car_spot(&pool, owner.id, 1, None).await;

    let booking = admit(&pool, spot.id, driver.id).await;
    assert_eq!(booking.unit_price, 50);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn active_verification_boosts_spot_price(pool: PgPool) {
    let owner = create_user(&pool, "Olga Owner", "owner").await;
    let a = create_user(&pool, "Driver A", "driver").await;
    let b = create_user(&pool, "Driver B", "driver").await;
    let spot = create_car_spot(&pool, owner.id, 2, Some(60)).await;
    VerificationRepo::activate(
        &pool,
        &ActivateVerification {
            owner_id: owner.id,
            tier: "gold".to_string(),
            expires_at: Some(Utc::now() + Duration::days(30)),
        },
    )
    .await
    .unwrap();

    let boosted = admit(&pool, spot.id, a.id).await;
    assert_eq!(boosted.unit_price, 66);

    // An explicit price is taken as-is.
    let explicit = BookingRepo::admit(
        &pool,
        &NewBooking {
            requested_price: Some(40),
            ..car_request(spot.id, b.id)
        },
        &PricingPolicy::default(),
        Utc::now(),
    )
    .await
    .unwrap();
    assert_eq!(explicit.unit_price, 40);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn expired_verification_gives_no_boost(pool: PgPool) {
    let owner = create_user(&pool, "Olga Owner", "owner").await;
    let driver = create_user(&pool, "Driver A", "driver").await;
    let spot = create_car_spot(&pool, owner.id, 1, Some(60)).await;
    VerificationRepo::activate(
        &pool,
        &ActivateVerification {
            owner_id: owner.id,
            tier: "platinum".to_string(),
            expires_at: Some(Utc::now() - Duration::days(1)),
        },
    )
    .await
    .unwrap();

    let booking = admit(&pool, spot.id, driver.id).await;
    assert_eq!(booking.unit_price, 60);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn availability_reports_every_vehicle_type(pool: PgPool) {
    let owner = create_user(&pool, "Olga Owner", "owner").await;
    let driver = create_user(&pool, "Driver A", "driver").await;
    let spot = create_car_spot(&pool, owner.id, 3, None).await;
    admit(&pool, spot.id, driver.id).await;

    let availability = SpotRepo::availability(&pool, &spot).await.unwrap();
    assert_eq!(availability.spot_id, spot.id);
    assert_eq!(availability.vehicles.len(), VehicleType::ALL.len());

    let car = availability
        .vehicles
        .iter()
        .find(|o| o.vehicle_type == VehicleType::Car)
        .unwrap();
    assert_eq!((car.admitted, car.capacity, car.available()), (1, 3, 2));

    let bus = availability
        .vehicles
        .iter()
        .find(|o| o.vehicle_type == VehicleType::Bus)
        .unwrap();
    assert_eq!((bus.admitted, bus.capacity), (0, 1));
}
