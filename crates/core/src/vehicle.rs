//! Vehicle types and enumeration-keyed per-vehicle records.
//!
//! Spots configure slot capacity and hourly price per vehicle type. Both are
//! modelled as a [`PerVehicle`] record with one optional field per variant,
//! so a missing entry is an explicit `None` rather than an absent map key.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Capacity assumed for a vehicle type the spot did not configure.
pub const DEFAULT_SLOT_CAPACITY: i64 = 1;

/// The closed set of vehicle types a spot can admit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleType {
    Car,
    Bike,
    Bus,
    Heavy,
}

impl VehicleType {
    pub const ALL: [VehicleType; 4] = [Self::Car, Self::Bike, Self::Bus, Self::Heavy];

    /// Lowercase name as stored in the `bookings.vehicle_type` column.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Car => "car",
            Self::Bike => "bike",
            Self::Bus => "bus",
            Self::Heavy => "heavy",
        }
    }

    /// Stable small index, used to derive per-(spot, vehicle) lock keys.
    pub fn index(self) -> i64 {
        match self {
            Self::Car => 0,
            Self::Bike => 1,
            Self::Bus => 2,
            Self::Heavy => 3,
        }
    }
}

impl fmt::Display for VehicleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not one of the known vehicle types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown vehicle type '{0}' (expected car, bike, bus or heavy)")]
pub struct UnknownVehicleType(pub String);

impl FromStr for VehicleType {
    type Err = UnknownVehicleType;

    /// Case-insensitive, surrounding whitespace ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "car" => Ok(Self::Car),
            "bike" => Ok(Self::Bike),
            "bus" => Ok(Self::Bus),
            "heavy" => Ok(Self::Heavy),
            _ => Err(UnknownVehicleType(s.to_string())),
        }
    }
}

/// One optional value per vehicle type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerVehicle<T> {
    pub car: Option<T>,
    pub bike: Option<T>,
    pub bus: Option<T>,
    pub heavy: Option<T>,
}

impl<T: Copy> PerVehicle<T> {
    pub fn get(&self, vehicle: VehicleType) -> Option<T> {
        match vehicle {
            VehicleType::Car => self.car,
            VehicleType::Bike => self.bike,
            VehicleType::Bus => self.bus,
            VehicleType::Heavy => self.heavy,
        }
    }
}

/// Slot capacity per vehicle type.
pub type SlotTable = PerVehicle<i64>;

impl SlotTable {
    /// Configured capacity for `vehicle`, [`DEFAULT_SLOT_CAPACITY`] when unset.
    ///
    /// Negative values are treated as zero capacity.
    pub fn capacity_for(&self, vehicle: VehicleType) -> i64 {
        self.get(vehicle)
            .map(|c| c.max(0))
            .unwrap_or(DEFAULT_SLOT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_types_case_insensitively() {
        assert_eq!("car".parse::<VehicleType>(), Ok(VehicleType::Car));
        assert_eq!(" Bike ".parse::<VehicleType>(), Ok(VehicleType::Bike));
        assert_eq!("BUS".parse::<VehicleType>(), Ok(VehicleType::Bus));
        assert_eq!("heavy".parse::<VehicleType>(), Ok(VehicleType::Heavy));
    }

    #[test]
    fn rejects_unknown_type() {
        let err = "truck".parse::<VehicleType>().unwrap_err();
        assert_eq!(err, UnknownVehicleType("truck".to_string()));
        assert!(err.to_string().contains("truck"));
    }

    #[test]
    fn rejects_empty_type() {
        assert!("".parse::<VehicleType>().is_err());
    }

    #[test]
    fn as_str_round_trips_through_from_str() {
        for v in VehicleType::ALL {
            assert_eq!(v.as_str().parse::<VehicleType>(), Ok(v));
        }
    }

    #[test]
    fn indices_are_distinct() {
        let mut seen: Vec<i64> = VehicleType::ALL.iter().map(|v| v.index()).collect();
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), 4);
    }

    #[test]
    fn capacity_defaults_to_one() {
        let slots = SlotTable {
            car: Some(3),
            ..Default::default()
        };
        assert_eq!(slots.capacity_for(VehicleType::Car), 3);
        assert_eq!(slots.capacity_for(VehicleType::Bike), 1);
        assert_eq!(slots.capacity_for(VehicleType::Heavy), 1);
    }

    #[test]
    fn explicit_zero_capacity_is_respected() {
        let slots = SlotTable {
            bus: Some(0),
            ..Default::default()
        };
        assert_eq!(slots.capacity_for(VehicleType::Bus), 0);
    }

    #[test]
    fn negative_capacity_clamps_to_zero() {
        let slots = SlotTable {
            heavy: Some(-2),
            ..Default::default()
        };
        assert_eq!(slots.capacity_for(VehicleType::Heavy), 0);
    }
}
