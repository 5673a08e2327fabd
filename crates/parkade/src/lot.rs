//! ParkingLot: the allocation engine.
//!
//! Owns:
//! - The spot inventory (behind a mutex; allocations are serialized, and
//!   commit/release are atomic against it)
//! - The ticket ledger
//! - The active selection and fee policies (swappable at any time)
//! - The listener fan-out
//!
//! No policy or listener code runs while the inventory lock is held, so both
//! may call back into the lot. Listeners may also allocate and release.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use serde::Serialize;

use crate::clock::{Clock, SystemClock};
use crate::error::{LotError, Result};
use crate::fee::FeePolicy;
use crate::inventory::{Spot, SpotCounts, SpotInventory};
use crate::ledger::TicketLedger;
use crate::listener::{Listeners, LotEvent, LotListener};
use crate::selection::SelectionPolicy;
use crate::ticket::{Ticket, TicketId};
use crate::vehicle::{Vehicle, VehicleType};
use crate::version::PARKADE_VERSION;

/// Point-in-time view of the lot for callers to report on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LotSnapshot {
    pub total_spots: usize,
    pub occupied_spots: usize,
    pub available_spots: usize,
    pub available_by_type: BTreeMap<VehicleType, usize>,
    pub active_tickets: usize,
    pub listeners: usize,
    pub is_full: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selection_policy: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fee_policy: Option<&'static str>,
    pub version: &'static str,
}

enum Allocation {
    Allocated { ticket: Ticket, spot: Spot },
    NoCandidate,
    Rejected,
}

pub struct ParkingLot {
    inventory: Mutex<SpotInventory>,
    allocating: Mutex<()>,
    ledger: TicketLedger,
    selection: RwLock<Option<Arc<dyn SelectionPolicy>>>,
    fee: RwLock<Option<Arc<dyn FeePolicy>>>,
    listeners: Listeners,
    clock: Arc<dyn Clock>,
}

impl ParkingLot {
    /// Create a lot with no policies configured.
    ///
    /// `allocate` fails until a selection policy is set. Without a fee policy
    /// every release is free.
    pub fn new(counts: SpotCounts) -> Self {
        let inventory = SpotInventory::new(counts);
        tracing::info!(
            car = counts.car,
            motorcycle = counts.motorcycle,
            truck = counts.truck,
            total = inventory.count_total(),
            "Parking lot created"
        );
        Self {
            inventory: Mutex::new(inventory),
            allocating: Mutex::new(()),
            ledger: TicketLedger::new(),
            selection: RwLock::new(None),
            fee: RwLock::new(None),
            listeners: Listeners::new(),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_selection_policy(self, policy: Arc<dyn SelectionPolicy>) -> Self {
        self.set_selection_policy(policy);
        self
    }

    pub fn with_fee_policy(self, policy: Arc<dyn FeePolicy>) -> Self {
        self.set_fee_policy(policy);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Swap the selection policy. Existing tickets are unaffected.
    pub fn set_selection_policy(&self, policy: Arc<dyn SelectionPolicy>) {
        tracing::info!(policy = policy.name(), "Selection policy set");
        *self.selection.write().unwrap_or_else(|e| e.into_inner()) = Some(policy);
    }

    /// Swap the fee policy. Fees already charged are unaffected.
    pub fn set_fee_policy(&self, policy: Arc<dyn FeePolicy>) {
        tracing::info!(policy = policy.name(), "Fee policy set");
        *self.fee.write().unwrap_or_else(|e| e.into_inner()) = Some(policy);
    }

    pub fn clear_fee_policy(&self) {
        tracing::info!("Fee policy cleared");
        *self.fee.write().unwrap_or_else(|e| e.into_inner()) = None;
    }

    fn selection_policy(&self) -> Option<Arc<dyn SelectionPolicy>> {
        self.selection
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn fee_policy(&self) -> Option<Arc<dyn FeePolicy>> {
        self.fee.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn add_listener(&self, listener: Arc<dyn LotListener>) {
        self.listeners.add(listener);
    }

    pub fn remove_listener(&self, listener: &Arc<dyn LotListener>) -> bool {
        self.listeners.remove(listener)
    }

    /// Lock the inventory. On poison, log and carry on: only engine code runs
    /// under this lock and each mutation completes within a single call.
    fn lock_inventory(&self) -> MutexGuard<'_, SpotInventory> {
        match self.inventory.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                tracing::error!("Inventory mutex poisoned - recovering");
                poisoned.into_inner()
            }
        }
    }

    /// Find a spot for `vehicle` and issue a ticket for it.
    ///
    /// `Ok(None)` means no spot was available; listeners are told the lot is
    /// full. Fails only when no selection policy is configured.
    ///
    /// Allocations are serialized against each other, but the policy runs
    /// without the inventory lock held, so it may query the lot. It must not
    /// allocate from inside `select`.
    pub fn allocate(&self, vehicle: &Vehicle) -> Result<Option<Ticket>> {
        let policy = self.selection_policy().ok_or(LotError::NoSelectionPolicy)?;

        let outcome = {
            let _serial = self.allocating.lock().unwrap_or_else(|e| e.into_inner());
            let available = self.lock_inventory().list_available();

            match policy.select(vehicle, &available) {
                None => Allocation::NoCandidate,
                Some(choice) => {
                    let mut inventory = self.lock_inventory();
                    if inventory.commit(choice.id(), vehicle) {
                        let ticket = self
                            .ledger
                            .issue(vehicle.clone(), choice.id(), self.clock.now());
                        let spot = inventory.get(choice.id()).cloned().unwrap_or(choice);
                        Allocation::Allocated { ticket, spot }
                    } else {
                        tracing::warn!(
                            spot = %choice.id(),
                            plate = %vehicle.plate(),
                            policy = policy.name(),
                            "Selected spot rejected at commit"
                        );
                        Allocation::Rejected
                    }
                }
            }
        };

        match outcome {
            Allocation::Allocated { ticket, spot } => {
                tracing::debug!(
                    ticket = %ticket.id(),
                    spot = %spot.id(),
                    plate = %vehicle.plate(),
                    "Vehicle parked"
                );
                self.listeners.notify(&LotEvent::Allocated {
                    vehicle: vehicle.clone(),
                    spot,
                });
                Ok(Some(ticket))
            }
            Allocation::NoCandidate => {
                tracing::warn!(
                    plate = %vehicle.plate(),
                    vehicle_type = %vehicle.vehicle_type(),
                    "No spot available"
                );
                self.listeners.notify(&LotEvent::Full);
                Ok(None)
            }
            Allocation::Rejected => Ok(None),
        }
    }

    /// Release a ticket and return the fee charged.
    pub fn release(&self, id: TicketId) -> Result<f64> {
        self.checkout(id).map(|ticket| ticket.fee())
    }

    /// Release a ticket and return the finalized record.
    ///
    /// The ticket is no longer reachable through the lot afterwards; a second
    /// checkout of the same id fails with [`LotError::InvalidTicket`].
    pub fn checkout(&self, id: TicketId) -> Result<Ticket> {
        // Finalize a copy before touching any state, so a failing fee policy
        // leaves the ticket active and its spot occupied.
        let Some(mut ticket) = self.ledger.lookup(id) else {
            tracing::warn!(ticket = %id, "Release of unknown ticket");
            return Err(LotError::InvalidTicket(id));
        };
        ticket.close(self.clock.now());
        if let Some(policy) = self.fee_policy() {
            ticket.set_fee(policy.compute(&ticket));
        }

        let (spot, is_full) = {
            let mut inventory = self.lock_inventory();

            // The ledger arbitrates between racing releases of the same id.
            if self.ledger.remove(id).is_none() {
                tracing::warn!(ticket = %id, "Ticket already released");
                return Err(LotError::InvalidTicket(id));
            }

            if inventory.release(ticket.spot_id()).is_none() {
                tracing::error!(
                    ticket = %id,
                    spot = %ticket.spot_id(),
                    "Bug: ticket referenced a free spot"
                );
            }
            (inventory.get(ticket.spot_id()).cloned(), inventory.is_full())
        };

        tracing::debug!(
            ticket = %id,
            spot = %ticket.spot_id(),
            fee = ticket.fee(),
            "Vehicle removed"
        );

        if let Some(spot) = spot {
            self.listeners.notify(&LotEvent::Released {
                vehicle: ticket.vehicle().clone(),
                spot,
            });
        }
        if !is_full {
            self.listeners.notify(&LotEvent::AvailableAgain);
        }

        Ok(ticket)
    }

    pub fn ticket(&self, id: TicketId) -> Option<Ticket> {
        self.ledger.lookup(id)
    }

    pub fn active_tickets(&self) -> Vec<Ticket> {
        self.ledger.active()
    }

    pub fn list_available(&self) -> Vec<Spot> {
        self.lock_inventory().list_available()
    }

    pub fn list_all(&self) -> Vec<Spot> {
        self.lock_inventory().list_all()
    }

    pub fn count_occupied(&self) -> usize {
        self.lock_inventory().count_occupied()
    }

    pub fn count_total(&self) -> usize {
        self.lock_inventory().count_total()
    }

    pub fn is_full(&self) -> bool {
        self.lock_inventory().is_full()
    }

    pub fn snapshot(&self) -> LotSnapshot {
        let (total_spots, occupied_spots, available_by_type, is_full) = {
            let inventory = self.lock_inventory();
            let by_type = VehicleType::ALL
                .into_iter()
                .map(|ty| (ty, inventory.count_available_of(ty)))
                .collect();
            (
                inventory.count_total(),
                inventory.count_occupied(),
                by_type,
                inventory.is_full(),
            )
        };

        LotSnapshot {
            total_spots,
            occupied_spots,
            available_spots: total_spots - occupied_spots,
            available_by_type,
            active_tickets: self.ledger.len(),
            listeners: self.listeners.count(),
            is_full,
            selection_policy: self.selection_policy().map(|p| p.name()),
            fee_policy: self.fee_policy().map(|p| p.name()),
            version: PARKADE_VERSION,
        }
    }
}
