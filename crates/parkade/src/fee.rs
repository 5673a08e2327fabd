//! Fee policies.

use chrono::Duration;

use crate::ticket::Ticket;

/// Computes the charge for a finished ticket.
pub trait FeePolicy: Send + Sync {
    /// Tickets without an exit time cost nothing.
    fn compute(&self, ticket: &Ticket) -> f64;

    fn name(&self) -> &'static str;
}

/// Flat hourly rate, rounded up to the next whole hour, scaled by vehicle size.
#[derive(Debug, Clone, Copy, Default)]
pub struct HourlyFee;

impl HourlyFee {
    /// Dollars per billed hour for a size-1.0 vehicle.
    pub const BASE_RATE: f64 = 2.0;

    /// Whole hours, plus one for any remainder at all. Zero stays zero and
    /// negative durations are treated as zero.
    pub fn billed_hours(elapsed: Duration) -> u64 {
        let Ok(elapsed) = elapsed.to_std() else {
            return 0;
        };
        let secs = elapsed.as_secs();
        let hours = secs / 3600;
        if secs % 3600 != 0 || elapsed.subsec_nanos() != 0 {
            hours + 1
        } else {
            hours
        }
    }
}

impl FeePolicy for HourlyFee {
    fn compute(&self, ticket: &Ticket) -> f64 {
        let Some(elapsed) = ticket.duration() else {
            return 0.0;
        };
        let hours = Self::billed_hours(elapsed);
        let multiplier = ticket.vehicle().vehicle_type().size_multiplier();
        let fee = hours as f64 * Self::BASE_RATE * multiplier;

        tracing::debug!(
            ticket = %ticket.id(),
            hours,
            multiplier,
            fee,
            "Computed hourly fee"
        );
        fee
    }

    fn name(&self) -> &'static str {
        "hourly"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::SpotId;
    use crate::ticket::TicketId;
    use crate::vehicle::Vehicle;
    use chrono::{DateTime, Utc};

    fn start() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn parked_for(vehicle: Vehicle, elapsed: Duration) -> Ticket {
        let mut ticket = Ticket::new(TicketId::new(1), vehicle, SpotId::new(1), start());
        ticket.close(start() + elapsed);
        ticket
    }

    #[test]
    fn billed_hours_rounding() {
        assert_eq!(HourlyFee::billed_hours(Duration::zero()), 0);
        assert_eq!(HourlyFee::billed_hours(Duration::nanoseconds(1)), 1);
        assert_eq!(HourlyFee::billed_hours(Duration::seconds(1)), 1);
        assert_eq!(HourlyFee::billed_hours(Duration::minutes(59)), 1);
        assert_eq!(HourlyFee::billed_hours(Duration::hours(1)), 1);
        assert_eq!(HourlyFee::billed_hours(Duration::minutes(61)), 2);
        assert_eq!(
            HourlyFee::billed_hours(Duration::hours(1) + Duration::milliseconds(1)),
            2
        );
        assert_eq!(HourlyFee::billed_hours(Duration::hours(2)), 2);
        assert_eq!(HourlyFee::billed_hours(Duration::seconds(-30)), 0);
    }

    #[test]
    fn one_hour_one_minute_bills_two_hours() {
        let rate = HourlyFee::BASE_RATE;
        for vehicle in [
            Vehicle::car("C"),
            Vehicle::motorcycle("M"),
            Vehicle::truck("T"),
        ] {
            let m = vehicle.vehicle_type().size_multiplier();
            let ticket = parked_for(vehicle, Duration::minutes(61));
            assert_eq!(HourlyFee.compute(&ticket), 2.0 * rate * m);
        }
    }

    #[test]
    fn exactly_two_hours_bills_two_hours() {
        let ticket = parked_for(Vehicle::truck("T"), Duration::hours(2));
        assert_eq!(HourlyFee.compute(&ticket), 2.0 * HourlyFee::BASE_RATE * 2.0);
    }

    #[test]
    fn zero_duration_is_free() {
        let ticket = parked_for(Vehicle::car("C"), Duration::zero());
        assert_eq!(HourlyFee.compute(&ticket), 0.0);
    }

    #[test]
    fn open_ticket_is_free() {
        let ticket = Ticket::new(TicketId::new(1), Vehicle::car("C"), SpotId::new(1), start());
        assert_eq!(HourlyFee.compute(&ticket), 0.0);
    }

    #[test]
    fn motorcycle_short_stay() {
        let ticket = parked_for(Vehicle::motorcycle("BIKE-123"), Duration::seconds(1));
        assert_eq!(HourlyFee.compute(&ticket), 1.0);
    }
}
