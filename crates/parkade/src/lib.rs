//! parkade: typed spot allocation engine.
//!
//! A [`ParkingLot`] hands out spots from a fixed [`SpotInventory`] using a
//! pluggable [`SelectionPolicy`], records each allocation as a [`Ticket`],
//! charges through a pluggable [`FeePolicy`] on release, and reports every
//! change to registered [`LotListener`]s.

mod clock;
mod config;
mod error;
mod fee;
mod inventory;
mod ledger;
mod listener;
mod lot;
mod selection;
mod ticket;
mod vehicle;
mod version;

#[cfg(any(test, feature = "test-util"))]
pub use clock::ManualClock;
pub use clock::{Clock, SystemClock};
pub use config::{LotConfig, SelectionKind};
pub use error::{LotError, Result};
pub use fee::{FeePolicy, HourlyFee};
pub use inventory::{Spot, SpotCounts, SpotId, SpotInventory};
pub use ledger::TicketLedger;
pub use listener::{ChannelListener, Listeners, LotEvent, LotListener};
pub use lot::{LotSnapshot, ParkingLot};
pub use selection::{FirstAvailable, RandomAvailable, SelectionPolicy};
pub use ticket::{Ticket, TicketId};
pub use vehicle::{UnknownVehicleType, Vehicle, VehicleType};
pub use version::PARKADE_VERSION;
