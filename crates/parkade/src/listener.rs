//! Lot event listeners and the fan-out that drives them.
//!
//! Listeners are invoked in registration order. A panicking listener is
//! logged and skipped; the rest still run and the triggering allocate or
//! release still succeeds.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::inventory::Spot;
use crate::vehicle::Vehicle;

/// Observer of allocation, release and capacity changes.
pub trait LotListener: Send + Sync {
    fn on_allocated(&self, vehicle: &Vehicle, spot: &Spot);

    fn on_released(&self, vehicle: &Vehicle, spot: &Spot);

    /// No spot could be selected for a vehicle.
    fn on_full(&self);

    /// A release left at least one spot free.
    fn on_available_again(&self);
}

/// Owned form of a listener callback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LotEvent {
    Allocated { vehicle: Vehicle, spot: Spot },
    Released { vehicle: Vehicle, spot: Spot },
    Full,
    AvailableAgain,
}

impl LotEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Allocated { .. } => "allocated",
            Self::Released { .. } => "released",
            Self::Full => "full",
            Self::AvailableAgain => "available_again",
        }
    }

    /// Replay this event onto a listener.
    pub fn dispatch(&self, listener: &dyn LotListener) {
        match self {
            Self::Allocated { vehicle, spot } => listener.on_allocated(vehicle, spot),
            Self::Released { vehicle, spot } => listener.on_released(vehicle, spot),
            Self::Full => listener.on_full(),
            Self::AvailableAgain => listener.on_available_again(),
        }
    }
}

/// Ordered listener set.
#[derive(Default)]
pub struct Listeners {
    listeners: RwLock<Vec<Arc<dyn LotListener>>>,
}

impl Listeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, listener: Arc<dyn LotListener>) {
        let mut listeners = self.listeners.write().unwrap_or_else(|e| e.into_inner());
        listeners.push(listener);
    }

    /// Remove the first registration of `listener` (compared by identity).
    pub fn remove(&self, listener: &Arc<dyn LotListener>) -> bool {
        let mut listeners = self.listeners.write().unwrap_or_else(|e| e.into_inner());
        let position = listeners
            .iter()
            .position(|l| std::ptr::addr_eq(Arc::as_ptr(l), Arc::as_ptr(listener)));
        match position {
            Some(i) => {
                listeners.remove(i);
                true
            }
            None => false,
        }
    }

    /// Number of registrations, counting duplicates.
    pub fn count(&self) -> usize {
        self.listeners.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Deliver `event` to every listener.
    ///
    /// Works on a copy of the list so listeners may add or remove listeners
    /// from inside a callback.
    pub fn notify(&self, event: &LotEvent) {
        let listeners = self
            .listeners
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone();

        for (index, listener) in listeners.iter().enumerate() {
            let result = catch_unwind(AssertUnwindSafe(|| event.dispatch(listener.as_ref())));
            if result.is_err() {
                tracing::error!(
                    listener = index,
                    event = event.as_str(),
                    "Listener panicked - skipping"
                );
            }
        }
    }
}

/// Forwards events into a bounded tokio channel without ever blocking.
///
/// Events that do not fit (channel full or receiver gone) are dropped and
/// logged.
pub struct ChannelListener {
    tx: mpsc::Sender<LotEvent>,
}

impl ChannelListener {
    pub fn new(tx: mpsc::Sender<LotEvent>) -> Self {
        Self { tx }
    }

    /// Listener plus the receiving end of a channel holding `capacity` events.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<LotEvent>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }

    fn forward(&self, event: LotEvent) {
        if let Err(e) = self.tx.try_send(event) {
            tracing::warn!(error = %e, "Dropping lot event");
        }
    }
}

impl LotListener for ChannelListener {
    fn on_allocated(&self, vehicle: &Vehicle, spot: &Spot) {
        self.forward(LotEvent::Allocated {
            vehicle: vehicle.clone(),
            spot: spot.clone(),
        });
    }

    fn on_released(&self, vehicle: &Vehicle, spot: &Spot) {
        self.forward(LotEvent::Released {
            vehicle: vehicle.clone(),
            spot: spot.clone(),
        });
    }

    fn on_full(&self) {
        self.forward(LotEvent::Full);
    }

    fn on_available_again(&self) {
        self.forward(LotEvent::AvailableAgain);
    }
}
