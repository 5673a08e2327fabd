//! Vehicle types and the vehicles that request spots.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Type tag shared by vehicles and the spots that accept them.
///
/// Declaration order is also the order in which spots are laid out when an
/// inventory is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleType {
    Car,
    Motorcycle,
    Truck,
}

impl VehicleType {
    pub const ALL: [VehicleType; 3] = [Self::Car, Self::Motorcycle, Self::Truck];

    /// Fee scaling factor for this type.
    pub fn size_multiplier(&self) -> f64 {
        match self {
            Self::Car => 1.0,
            Self::Motorcycle => 0.5,
            Self::Truck => 2.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Car => "car",
            Self::Motorcycle => "motorcycle",
            Self::Truck => "truck",
        }
    }
}

impl fmt::Display for VehicleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown vehicle type '{0}', expected car, motorcycle or truck")]
pub struct UnknownVehicleType(pub String);

impl FromStr for VehicleType {
    type Err = UnknownVehicleType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "car" => Ok(Self::Car),
            "motorcycle" | "bike" => Ok(Self::Motorcycle),
            "truck" => Ok(Self::Truck),
            _ => Err(UnknownVehicleType(s.to_string())),
        }
    }
}

/// A caller's demand for one spot of a given type.
///
/// Plates are not required to be unique; they are used for display and
/// equality only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Vehicle {
    plate: String,
    #[serde(rename = "type")]
    vehicle_type: VehicleType,
}

impl Vehicle {
    pub fn new(plate: impl Into<String>, vehicle_type: VehicleType) -> Self {
        Self {
            plate: plate.into(),
            vehicle_type,
        }
    }

    pub fn car(plate: impl Into<String>) -> Self {
        Self::new(plate, VehicleType::Car)
    }

    pub fn motorcycle(plate: impl Into<String>) -> Self {
        Self::new(plate, VehicleType::Motorcycle)
    }

    pub fn truck(plate: impl Into<String>) -> Self {
        Self::new(plate, VehicleType::Truck)
    }

    pub fn plate(&self) -> &str {
        &self.plate
    }

    pub fn vehicle_type(&self) -> VehicleType {
        self.vehicle_type
    }
}

impl fmt::Display for Vehicle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.vehicle_type, self.plate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_multipliers() {
        assert_eq!(VehicleType::Car.size_multiplier(), 1.0);
        assert_eq!(VehicleType::Motorcycle.size_multiplier(), 0.5);
        assert_eq!(VehicleType::Truck.size_multiplier(), 2.0);
    }

    #[test]
    fn parses_type_names() {
        assert_eq!("car".parse::<VehicleType>().unwrap(), VehicleType::Car);
        assert_eq!(" Truck ".parse::<VehicleType>().unwrap(), VehicleType::Truck);
        assert_eq!(
            "bike".parse::<VehicleType>().unwrap(),
            VehicleType::Motorcycle
        );
        assert!("boat".parse::<VehicleType>().is_err());
    }

    #[test]
    fn display_matches_as_str() {
        for ty in VehicleType::ALL {
            assert_eq!(ty.to_string(), ty.as_str());
        }
        assert_eq!(Vehicle::car("ABC-123").to_string(), "car ABC-123");
    }

    #[test]
    fn vehicle_serializes() {
        insta::assert_json_snapshot!(Vehicle::truck("TRUCK-001"), @r#"
        {
          "plate": "TRUCK-001",
          "type": "truck"
        }
        "#);
    }

    #[test]
    fn vehicle_type_deserializes_lowercase() {
        assert_eq!(
            serde_json::from_str::<VehicleType>("\"motorcycle\"").unwrap(),
            VehicleType::Motorcycle
        );
    }
}
