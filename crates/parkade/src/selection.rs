//! Spot selection policies.
//!
//! A policy only reads the availability snapshot it is given; committing the
//! choice is the engine's job.

use std::sync::Mutex;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::inventory::Spot;
use crate::vehicle::Vehicle;

/// Picks which available spot serves a vehicle.
pub trait SelectionPolicy: Send + Sync {
    fn select(&self, vehicle: &Vehicle, available: &[Spot]) -> Option<Spot>;

    fn name(&self) -> &'static str;
}

/// First matching spot in inventory order.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstAvailable;

impl SelectionPolicy for FirstAvailable {
    fn select(&self, vehicle: &Vehicle, available: &[Spot]) -> Option<Spot> {
        available
            .iter()
            .find(|spot| spot.accepts() == vehicle.vehicle_type())
            .cloned()
    }

    fn name(&self) -> &'static str {
        "first"
    }
}

/// Uniformly random spot among those matching the vehicle type.
pub struct RandomAvailable {
    rng: Mutex<ChaCha8Rng>,
}

impl RandomAvailable {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(ChaCha8Rng::from_entropy()),
        }
    }

    /// Deterministic sequence of choices for a given seed.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(ChaCha8Rng::seed_from_u64(seed)),
        }
    }
}

impl Default for RandomAvailable {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionPolicy for RandomAvailable {
    fn select(&self, vehicle: &Vehicle, available: &[Spot]) -> Option<Spot> {
        let candidates: Vec<&Spot> = available
            .iter()
            .filter(|spot| spot.accepts() == vehicle.vehicle_type())
            .collect();

        if candidates.is_empty() {
            return None;
        }

        // A poisoned generator still holds a usable state.
        let mut rng = match self.rng.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                tracing::error!("Selection RNG mutex poisoned - recovering");
                poisoned.into_inner()
            }
        };
        let pick = rng.gen_range(0..candidates.len());
        Some(candidates[pick].clone())
    }

    fn name(&self) -> &'static str {
        "random"
    }
}
