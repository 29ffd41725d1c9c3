//! Parking spot entity model and DTOs.

use parkify_core::admission::Occupancy;
use parkify_core::pricing::SpotRates;
use parkify_core::types::{Amount, DbId, Timestamp};
use parkify_core::vehicle::{PerVehicle, SlotTable};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `parking_spots` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ParkingSpot {
    pub id: DbId,
    pub owner_id: DbId,
    pub name: String,
    /// Flat hourly price used when no per-vehicle price is set.
    pub price: Option<Amount>,
    pub price_car: Option<Amount>,
    pub price_bike: Option<Amount>,
    pub price_bus: Option<Amount>,
    pub price_heavy: Option<Amount>,
    pub slots_car: Option<i32>,
    pub slots_bike: Option<i32>,
    pub slots_bus: Option<i32>,
    pub slots_heavy: Option<i32>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ParkingSpot {
    /// Configured slot capacity per vehicle type.
    pub fn slots(&self) -> SlotTable {
        PerVehicle {
            car: self.slots_car.map(i64::from),
            bike: self.slots_bike.map(i64::from),
            bus: self.slots_bus.map(i64::from),
            heavy: self.slots_heavy.map(i64::from),
        }
    }

    /// Price inputs for unit price resolution.
    pub fn rates(&self) -> SpotRates {
        SpotRates {
            per_vehicle: PerVehicle {
                car: self.price_car,
                bike: self.price_bike,
                bus: self.price_bus,
                heavy: self.price_heavy,
            },
            flat: self.price,
        }
    }
}

/// DTO for creating a parking spot.
#[derive(Debug, Default, Deserialize)]
pub struct CreateSpot {
    pub owner_id: DbId,
    pub name: String,
    pub price: Option<Amount>,
    #[serde(default)]
    pub pricing: PerVehicle<Amount>,
    #[serde(default)]
    pub slots: PerVehicle<i32>,
}

/// Live occupancy of every vehicle type at one spot.
#[derive(Debug, Clone, Serialize)]
pub struct SpotAvailability {
    pub spot_id: DbId,
    pub vehicles: Vec<Occupancy>,
}
