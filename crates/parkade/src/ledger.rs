//! Ticket ledger - active tickets keyed by id.
//!
//! Ids come from a per-ledger atomic counter starting at 1. The counter is
//! never rewound, so ids are unique for the lifetime of the ledger even as
//! tickets are removed.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use dashmap::DashMap;

use crate::inventory::SpotId;
use crate::ticket::{Ticket, TicketId};
use crate::vehicle::Vehicle;

pub struct TicketLedger {
    tickets: DashMap<TicketId, Ticket>,
    next_id: AtomicU64,
}

impl TicketLedger {
    pub fn new() -> Self {
        Self {
            tickets: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Create and store a ticket under the next id.
    pub fn issue(&self, vehicle: Vehicle, spot: SpotId, entry_time: DateTime<Utc>) -> Ticket {
        let id = TicketId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        let ticket = Ticket::new(id, vehicle, spot, entry_time);
        self.tickets.insert(id, ticket.clone());
        tracing::debug!(ticket = %id, spot = %spot, "Ticket issued");
        ticket
    }

    pub fn lookup(&self, id: TicketId) -> Option<Ticket> {
        self.tickets.get(&id).map(|entry| entry.value().clone())
    }

    pub fn remove(&self, id: TicketId) -> Option<Ticket> {
        self.tickets.remove(&id).map(|(_, ticket)| ticket)
    }

    /// Active tickets ordered by id.
    pub fn active(&self) -> Vec<Ticket> {
        let mut tickets: Vec<Ticket> = self.tickets.iter().map(|e| e.value().clone()).collect();
        tickets.sort_by_key(Ticket::id);
        tickets
    }

    pub fn len(&self) -> usize {
        self.tickets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickets.is_empty()
    }
}

impl Default for TicketLedger {
    fn default() -> Self {
        Self::new()
    }
}
