//! Repository for the `parking_spots` table and the capacity ledger.
//!
//! Spot listing and editing belong to the owner-facing service; this
//! repository reads spots and counts the open bookings against them.

use parkify_core::admission::Occupancy;
use parkify_core::booking::open_status_ids;
use parkify_core::types::DbId;
use parkify_core::vehicle::VehicleType;
use sqlx::PgPool;

use crate::models::spot::{CreateSpot, ParkingSpot, SpotAvailability};

const COLUMNS: &str = "\
    id, owner_id, name, price, \
    price_car, price_bike, price_bus, price_heavy, \
    slots_car, slots_bike, slots_bus, slots_heavy, \
    is_active, created_at, updated_at";

pub struct SpotRepo;

impl SpotRepo {
    /// Insert a new spot, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateSpot) -> Result<ParkingSpot, sqlx::Error> {
        let query = format!(
            "INSERT INTO parking_spots \
                 (owner_id, name, price, price_car, price_bike, price_bus, price_heavy, \
                  slots_car, slots_bike, slots_bus, slots_heavy) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ParkingSpot>(&query)
            .bind(input.owner_id)
            .bind(&input.name)
            .bind(input.price)
            .bind(input.pricing.car)
            .bind(input.pricing.bike)
            .bind(input.pricing.bus)
            .bind(input.pricing.heavy)
            .bind(input.slots.car)
            .bind(input.slots.bike)
            .bind(input.slots.bus)
            .bind(input.slots.heavy)
            .fetch_one(pool)
            .await
    }

    /// Find a spot by ID regardless of its active flag.
    pub async fn find_by_id<'e, E>(executor: E, id: DbId) -> Result<Option<ParkingSpot>, sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let query = format!("SELECT {COLUMNS} FROM parking_spots WHERE id = $1");
        sqlx::query_as::<_, ParkingSpot>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Find a spot that is currently accepting bookings.
    pub async fn find_active<'e, E>(executor: E, id: DbId) -> Result<Option<ParkingSpot>, sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let query = format!("SELECT {COLUMNS} FROM parking_spots WHERE id = $1 AND is_active");
        sqlx::query_as::<_, ParkingSpot>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Take a spot out of service. Existing bookings are unaffected.
    pub async fn deactivate(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE parking_spots SET is_active = false, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Number of open bookings for one (spot, vehicle type) pair.
    pub async fn admitted_count<'e, E>(
        executor: E,
        spot_id: DbId,
        vehicle: VehicleType,
    ) -> Result<i64, sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM bookings \
             WHERE spot_id = $1 AND vehicle_type = $2 AND status_id = ANY($3)",
        )
        .bind(spot_id)
        .bind(vehicle.as_str())
        .bind(open_status_ids())
        .fetch_one(executor)
        .await
    }

    /// Admitted count and capacity for every vehicle type at `spot`.
    pub async fn availability(
        pool: &PgPool,
        spot: &ParkingSpot,
    ) -> Result<SpotAvailability, sqlx::Error> {
        let counts: Vec<(String, i64)> = sqlx::query_as(
            "SELECT vehicle_type, COUNT(*) FROM bookings \
             WHERE spot_id = $1 AND status_id = ANY($2) \
             GROUP BY vehicle_type",
        )
        .bind(spot.id)
        .bind(open_status_ids())
        .fetch_all(pool)
        .await?;

        let slots = spot.slots();
        let vehicles = VehicleType::ALL
            .into_iter()
            .map(|vehicle| {
                let admitted = counts
                    .iter()
                    .find(|(name, _)| name == vehicle.as_str())
                    .map(|(_, n)| *n)
                    .unwrap_or(0);
                Occupancy {
                    vehicle_type: vehicle,
                    admitted,
                    capacity: slots.capacity_for(vehicle),
                }
            })
            .collect();

        Ok(SpotAvailability {
            spot_id: spot.id,
            vehicles,
        })
    }
}
