//! Spot inventory: a fixed, ordered pool of typed spots.
//!
//! Spots are created once at construction and never removed. Occupancy only
//! changes through [`SpotInventory::commit`] and [`SpotInventory::release`],
//! and `commit` re-validates against the live spot so a selection made from
//! an older snapshot can never put a vehicle in the wrong or a taken spot.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::vehicle::{Vehicle, VehicleType};

/// 1-based spot number, stable for the lifetime of the inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpotId(u32);

impl SpotId {
    pub fn new(number: u32) -> Self {
        Self(number)
    }

    pub fn get(&self) -> u32 {
        self.0
    }

    fn index(&self) -> Option<usize> {
        (self.0 as usize).checked_sub(1)
    }
}

impl fmt::Display for SpotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Number of spots to build per vehicle type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpotCounts {
    pub car: u32,
    pub motorcycle: u32,
    pub truck: u32,
}

impl Default for SpotCounts {
    fn default() -> Self {
        Self {
            car: 5,
            motorcycle: 3,
            truck: 2,
        }
    }
}

impl SpotCounts {
    pub fn new(car: u32, motorcycle: u32, truck: u32) -> Self {
        Self {
            car,
            motorcycle,
            truck,
        }
    }

    pub fn for_type(&self, vehicle_type: VehicleType) -> u32 {
        match vehicle_type {
            VehicleType::Car => self.car,
            VehicleType::Motorcycle => self.motorcycle,
            VehicleType::Truck => self.truck,
        }
    }

    pub fn total(&self) -> usize {
        self.car as usize + self.motorcycle as usize + self.truck as usize
    }
}

/// A single allocatable spot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spot {
    id: SpotId,
    accepts: VehicleType,
    #[serde(skip_serializing_if = "Option::is_none")]
    occupant: Option<Vehicle>,
}

impl Spot {
    fn new(id: SpotId, accepts: VehicleType) -> Self {
        Self {
            id,
            accepts,
            occupant: None,
        }
    }

    pub fn id(&self) -> SpotId {
        self.id
    }

    pub fn accepts(&self) -> VehicleType {
        self.accepts
    }

    pub fn occupant(&self) -> Option<&Vehicle> {
        self.occupant.as_ref()
    }

    pub fn is_occupied(&self) -> bool {
        self.occupant.is_some()
    }

    /// Whether `vehicle` could be committed here right now.
    pub fn can_fit(&self, vehicle: &Vehicle) -> bool {
        !self.is_occupied() && self.accepts == vehicle.vehicle_type()
    }
}

impl fmt::Display for Spot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Spot {} ({})", self.id, self.accepts)?;
        match &self.occupant {
            Some(vehicle) => write!(f, " - OCCUPIED by {}", vehicle),
            None => f.write_str(" - AVAILABLE"),
        }
    }
}

/// Fixed pool of spots in construction order.
#[derive(Debug, Clone)]
pub struct SpotInventory {
    spots: Vec<Spot>,
}

impl SpotInventory {
    /// Lay out all car spots, then motorcycle, then truck, numbered from 1.
    pub fn new(counts: SpotCounts) -> Self {
        let mut spots = Vec::with_capacity(counts.total());
        let mut number = 1;
        for vehicle_type in VehicleType::ALL {
            for _ in 0..counts.for_type(vehicle_type) {
                spots.push(Spot::new(SpotId::new(number), vehicle_type));
                number += 1;
            }
        }
        Self { spots }
    }

    pub fn get(&self, id: SpotId) -> Option<&Spot> {
        self.spots.get(id.index()?)
    }

    pub fn list_all(&self) -> Vec<Spot> {
        self.spots.clone()
    }

    pub fn list_available(&self) -> Vec<Spot> {
        self.spots
            .iter()
            .filter(|spot| !spot.is_occupied())
            .cloned()
            .collect()
    }

    pub fn count_available_of(&self, vehicle_type: VehicleType) -> usize {
        self.spots
            .iter()
            .filter(|spot| !spot.is_occupied() && spot.accepts == vehicle_type)
            .count()
    }

    /// Occupy `id` with `vehicle`.
    ///
    /// Returns false and leaves everything untouched if the spot is unknown,
    /// taken, or accepts a different type.
    pub fn commit(&mut self, id: SpotId, vehicle: &Vehicle) -> bool {
        let Some(spot) = id.index().and_then(|i| self.spots.get_mut(i)) else {
            return false;
        };
        if !spot.can_fit(vehicle) {
            return false;
        }
        spot.occupant = Some(vehicle.clone());
        true
    }

    /// Free `id`, returning whoever was parked there. Freeing an empty spot
    /// is a no-op.
    pub fn release(&mut self, id: SpotId) -> Option<Vehicle> {
        let spot = self.spots.get_mut(id.index()?)?;
        spot.occupant.take()
    }

    pub fn count_occupied(&self) -> usize {
        self.spots.iter().filter(|spot| spot.is_occupied()).count()
    }

    pub fn count_total(&self) -> usize {
        self.spots.len()
    }

    pub fn is_full(&self) -> bool {
        self.spots.iter().all(Spot::is_occupied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(spots: &[Spot]) -> Vec<u32> {
        spots.iter().map(|s| s.id().get()).collect()
    }

    #[test]
    fn layout_follows_type_order() {
        let inv = SpotInventory::new(SpotCounts::new(2, 1, 2));
        let all = inv.list_all();

        assert_eq!(ids(&all), vec![1, 2, 3, 4, 5]);
        let types: Vec<_> = all.iter().map(Spot::accepts).collect();
        assert_eq!(
            types,
            vec![
                VehicleType::Car,
                VehicleType::Car,
                VehicleType::Motorcycle,
                VehicleType::Truck,
                VehicleType::Truck,
            ]
        );
    }

    #[test]
    fn empty_inventory() {
        let inv = SpotInventory::new(SpotCounts::new(0, 0, 0));
        assert_eq!(inv.count_total(), 0);
        assert!(inv.list_available().is_empty());
        // Nothing to allocate means nothing is free.
        assert!(inv.is_full());
    }

    #[test]
    fn commit_occupies_matching_spot() {
        let mut inv = SpotInventory::new(SpotCounts::new(1, 1, 0));
        let car = Vehicle::car("ABC-123");

        assert!(inv.commit(SpotId::new(1), &car));
        let spot = inv.get(SpotId::new(1)).unwrap();
        assert!(spot.is_occupied());
        assert_eq!(spot.occupant(), Some(&car));
        assert_eq!(ids(&inv.list_available()), vec![2]);
    }

    #[test]
    fn commit_rejects_type_mismatch() {
        let mut inv = SpotInventory::new(SpotCounts::new(1, 1, 0));

        assert!(!inv.commit(SpotId::new(2), &Vehicle::car("ABC-123")));
        assert_eq!(inv.count_occupied(), 0);
    }

    #[test]
    fn commit_rejects_occupied_spot() {
        let mut inv = SpotInventory::new(SpotCounts::new(1, 0, 0));
        let first = Vehicle::car("FIRST");
        let second = Vehicle::car("SECOND");

        assert!(inv.commit(SpotId::new(1), &first));
        assert!(!inv.commit(SpotId::new(1), &second));
        assert_eq!(inv.get(SpotId::new(1)).unwrap().occupant(), Some(&first));
    }

    #[test]
    fn commit_from_stale_snapshot_is_rejected() {
        let mut inv = SpotInventory::new(SpotCounts::new(1, 0, 0));
        let snapshot = inv.list_available();

        assert!(inv.commit(snapshot[0].id(), &Vehicle::car("A")));
        assert!(!inv.commit(snapshot[0].id(), &Vehicle::car("B")));
    }

    #[test]
    fn commit_unknown_spot() {
        let mut inv = SpotInventory::new(SpotCounts::new(1, 0, 0));
        assert!(!inv.commit(SpotId::new(0), &Vehicle::car("A")));
        assert!(!inv.commit(SpotId::new(9), &Vehicle::car("A")));
    }

    #[test]
    fn release_returns_occupant_once() {
        let mut inv = SpotInventory::new(SpotCounts::new(0, 1, 0));
        let bike = Vehicle::motorcycle("BIKE-123");
        inv.commit(SpotId::new(1), &bike);

        assert_eq!(inv.release(SpotId::new(1)), Some(bike));
        assert_eq!(inv.release(SpotId::new(1)), None);
        assert_eq!(inv.count_occupied(), 0);
    }

    #[test]
    fn counts_stay_consistent() {
        let mut inv = SpotInventory::new(SpotCounts::new(2, 1, 1));
        inv.commit(SpotId::new(1), &Vehicle::car("A"));
        inv.commit(SpotId::new(4), &Vehicle::truck("T"));

        assert_eq!(inv.count_occupied(), 2);
        assert_eq!(
            inv.count_occupied() + inv.list_available().len(),
            inv.count_total()
        );
        assert_eq!(inv.count_available_of(VehicleType::Car), 1);
        assert_eq!(inv.count_available_of(VehicleType::Truck), 0);
        assert!(!inv.is_full());
    }

    #[test]
    fn spot_display() {
        let mut inv = SpotInventory::new(SpotCounts::new(1, 1, 0));
        inv.commit(SpotId::new(1), &Vehicle::car("ABC-123"));

        assert_eq!(
            inv.get(SpotId::new(1)).unwrap().to_string(),
            "Spot 1 (car) - OCCUPIED by car ABC-123"
        );
        assert_eq!(
            inv.get(SpotId::new(2)).unwrap().to_string(),
            "Spot 2 (motorcycle) - AVAILABLE"
        );
    }
}
