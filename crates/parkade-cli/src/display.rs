//! Console display board listener.

use std::io::Write;
use std::sync::Mutex;

use parkade::{LotListener, Spot, Vehicle};

/// Prints lot events to a writer, prefixed with the board name.
pub struct DisplayBoard<W: Write + Send> {
    name: String,
    out: Mutex<W>,
}

impl DisplayBoard<std::io::Stdout> {
    pub fn stdout(name: impl Into<String>) -> Self {
        Self::new(name, std::io::stdout())
    }
}

impl<W: Write + Send> DisplayBoard<W> {
    pub fn new(name: impl Into<String>, out: W) -> Self {
        Self {
            name: name.into(),
            out: Mutex::new(out),
        }
    }

    fn show(&self, message: std::fmt::Arguments<'_>) {
        let mut out = self.out.lock().unwrap_or_else(|e| e.into_inner());
        if let Err(e) = writeln!(out, "[{}] {}", self.name, message) {
            tracing::warn!(board = %self.name, error = %e, "Display write failed");
        }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(|e| e.into_inner())
    }
}

impl<W: Write + Send> LotListener for DisplayBoard<W> {
    fn on_allocated(&self, vehicle: &Vehicle, spot: &Spot) {
        self.show(format_args!(
            "Vehicle {} parked at spot {}",
            vehicle.plate(),
            spot.id()
        ));
    }

    fn on_released(&self, vehicle: &Vehicle, spot: &Spot) {
        self.show(format_args!(
            "Vehicle {} removed from spot {}",
            vehicle.plate(),
            spot.id()
        ));
    }

    fn on_full(&self) {
        self.show(format_args!("PARKING LOT IS FULL!"));
    }

    fn on_available_again(&self) {
        self.show(format_args!("Parking lot has available spots"));
    }
}
