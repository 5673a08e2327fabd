//! Lot configuration with environment overrides.
//!
//! Recognized variables:
//! - `PARKADE_CAR_SPOTS`, `PARKADE_MOTORCYCLE_SPOTS`, `PARKADE_TRUCK_SPOTS`
//! - `PARKADE_SELECTION` (`first` or `random`)
//! - `PARKADE_SEED` (seed for `random`)

use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::LotError;
use crate::fee::HourlyFee;
use crate::inventory::SpotCounts;
use crate::lot::ParkingLot;
use crate::selection::{FirstAvailable, RandomAvailable, SelectionPolicy};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionKind {
    #[default]
    First,
    Random,
}

impl SelectionKind {
    /// Instantiate the policy. `seed` only affects `Random`.
    pub fn policy(&self, seed: Option<u64>) -> Arc<dyn SelectionPolicy> {
        match (self, seed) {
            (Self::First, _) => Arc::new(FirstAvailable),
            (Self::Random, Some(seed)) => Arc::new(RandomAvailable::with_seed(seed)),
            (Self::Random, None) => Arc::new(RandomAvailable::new()),
        }
    }
}

impl FromStr for SelectionKind {
    type Err = LotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first" | "nearest" => Ok(Self::First),
            "random" => Ok(Self::Random),
            other => Err(LotError::Config(format!(
                "unknown selection policy '{other}', expected 'first' or 'random'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LotConfig {
    pub spots: SpotCounts,
    pub selection: SelectionKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl LotConfig {
    /// Defaults overlaid with `PARKADE_*` environment variables.
    pub fn from_env() -> Result<Self, LotError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overlaid with values from `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, LotError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(v) = lookup("PARKADE_CAR_SPOTS") {
            config.spots.car = parse_number("PARKADE_CAR_SPOTS", &v)?;
        }
        if let Some(v) = lookup("PARKADE_MOTORCYCLE_SPOTS") {
            config.spots.motorcycle = parse_number("PARKADE_MOTORCYCLE_SPOTS", &v)?;
        }
        if let Some(v) = lookup("PARKADE_TRUCK_SPOTS") {
            config.spots.truck = parse_number("PARKADE_TRUCK_SPOTS", &v)?;
        }
        if let Some(v) = lookup("PARKADE_SELECTION") {
            config.selection = v.parse()?;
        }
        if let Some(v) = lookup("PARKADE_SEED") {
            config.seed = Some(parse_number("PARKADE_SEED", &v)?);
        }

        Ok(config)
    }

    /// Build a lot with the configured selection policy and hourly fees.
    pub fn build(&self) -> ParkingLot {
        ParkingLot::new(self.spots)
            .with_selection_policy(self.selection.policy(self.seed))
            .with_fee_policy(Arc::new(HourlyFee))
    }
}

fn parse_number<T: FromStr>(key: &str, value: &str) -> Result<T, LotError> {
    value.trim().parse().map_err(|_| {
        LotError::Config(format!(
            "{key} must be a non-negative integer, got '{value}'"
        ))
    })
}
