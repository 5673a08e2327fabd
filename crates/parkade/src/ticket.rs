//! Tickets binding a vehicle to a spot.

use std::fmt;

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::LotError;
use crate::inventory::SpotId;
use crate::vehicle::Vehicle;

const TICKET_PREFIX: &str = "TICKET-";

/// Ticket identifier, rendered as `TICKET-<n>`.
///
/// Callers may hold on to the string form, so the format is fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct TicketId(u64);

impl TicketId {
    pub fn new(n: u64) -> Self {
        Self(n)
    }

    pub fn number(&self) -> u64 {
        self.0
    }

    /// Parse the exact `TICKET-<n>` form produced by `Display`.
    ///
    /// Zero-padded numbers are rejected so that each id has one spelling.
    pub fn parse(s: &str) -> Result<Self, LotError> {
        s.strip_prefix(TICKET_PREFIX)
            .filter(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
            .and_then(|digits| {
                digits
                    .parse::<u64>()
                    .ok()
                    .filter(|n| n.to_string() == digits)
            })
            .map(Self)
            .ok_or_else(|| LotError::InvalidTicketFormat(s.to_string()))
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", TICKET_PREFIX, self.0)
    }
}

impl From<TicketId> for String {
    fn from(id: TicketId) -> Self {
        id.to_string()
    }
}

impl TryFrom<String> for TicketId {
    type Error = LotError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl std::str::FromStr for TicketId {
    type Err = LotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Allocation record.
///
/// Entry time is fixed at creation. Exit time and fee are written once, when
/// the ticket is released.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    id: TicketId,
    vehicle: Vehicle,
    spot: SpotId,
    entry_time: DateTime<Utc>,
    exit_time: Option<DateTime<Utc>>,
    fee: f64,
}

impl Ticket {
    pub fn new(id: TicketId, vehicle: Vehicle, spot: SpotId, entry_time: DateTime<Utc>) -> Self {
        Self {
            id,
            vehicle,
            spot,
            entry_time,
            exit_time: None,
            fee: 0.0,
        }
    }

    pub fn id(&self) -> TicketId {
        self.id
    }

    pub fn vehicle(&self) -> &Vehicle {
        &self.vehicle
    }

    pub fn spot_id(&self) -> SpotId {
        self.spot
    }

    pub fn entry_time(&self) -> DateTime<Utc> {
        self.entry_time
    }

    pub fn exit_time(&self) -> Option<DateTime<Utc>> {
        self.exit_time
    }

    pub fn fee(&self) -> f64 {
        self.fee
    }

    pub fn is_released(&self) -> bool {
        self.exit_time.is_some()
    }

    /// Time parked, once released.
    pub fn duration(&self) -> Option<Duration> {
        self.exit_time.map(|exit| exit - self.entry_time)
    }

    /// Stamp the exit time. Returns false if it was already set.
    pub(crate) fn close(&mut self, exit_time: DateTime<Utc>) -> bool {
        if self.exit_time.is_some() {
            return false;
        }
        self.exit_time = Some(exit_time);
        true
    }

    pub(crate) fn set_fee(&mut self, fee: f64) {
        self.fee = fee;
    }

    pub fn to_response(&self) -> serde_json::Value {
        let mut response = serde_json::json!({
            "id": self.id.to_string(),
            "plate": self.vehicle.plate(),
            "vehicle_type": self.vehicle.vehicle_type().as_str(),
            "spot": self.spot.get(),
            "entry_time": self.entry_time.to_rfc3339_opts(SecondsFormat::Secs, true),
        });

        if let Some(exit) = self.exit_time {
            response["exit_time"] =
                serde_json::Value::String(exit.to_rfc3339_opts(SecondsFormat::Secs, true));
            response["fee"] = serde_json::json!(self.fee);
        }

        response
    }
}

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] spot {} since {}",
            self.id,
            self.vehicle,
            self.spot,
            self.entry_time.to_rfc3339_opts(SecondsFormat::Secs, true)
        )?;
        if let Some(exit) = self.exit_time {
            write!(
                f,
                " until {} fee ${:.2}",
                exit.to_rfc3339_opts(SecondsFormat::Secs, true),
                self.fee
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    fn ticket() -> Ticket {
        Ticket::new(
            TicketId::new(3),
            Vehicle::car("ABC-123"),
            SpotId::new(2),
            at(1_700_000_000),
        )
    }

    #[test]
    fn id_format() {
        assert_eq!(TicketId::new(1).to_string(), "TICKET-1");
        assert_eq!(TicketId::new(42).to_string(), "TICKET-42");
    }

    #[test]
    fn id_parse() {
        assert_eq!(TicketId::parse("TICKET-17").unwrap(), TicketId::new(17));
        assert_eq!(TicketId::parse("TICKET-0").unwrap(), TicketId::new(0));
        let bad = [
            "TICKET-", "ticket-1", "TICKET-x", "TICKET--1", "TICKET-+1", "TICKET-01", "TICKET-001",
            "TICKET-00", "17", "",
        ];
        for bad in bad {
            assert_eq!(
                TicketId::parse(bad),
                Err(LotError::InvalidTicketFormat(bad.to_string())),
                "{bad}"
            );
        }
    }

    #[test]
    fn id_serde_as_string() {
        let json = serde_json::to_string(&TicketId::new(5)).unwrap();
        assert_eq!(json, "\"TICKET-5\"");
        let back: TicketId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, TicketId::new(5));
        assert!(serde_json::from_str::<TicketId>("\"NOPE\"").is_err());
        assert!(serde_json::from_str::<TicketId>("\"TICKET-05\"").is_err());
        assert!("TICKET-05".parse::<TicketId>().is_err());
    }

    #[test]
    fn new_ticket_is_active() {
        let t = ticket();
        assert!(!t.is_released());
        assert_eq!(t.fee(), 0.0);
        assert!(t.duration().is_none());
    }

    #[test]
    fn close_only_once() {
        let mut t = ticket();
        assert!(t.close(at(1_700_003_600)));
        assert!(!t.close(at(1_700_007_200)));
        assert_eq!(t.exit_time(), Some(at(1_700_003_600)));
        assert_eq!(t.duration(), Some(Duration::hours(1)));
    }

    #[test]
    fn active_ticket_response() {
        insta::assert_json_snapshot!(ticket().to_response(), @r#"
        {
          "entry_time": "2023-11-14T22:13:20Z",
          "id": "TICKET-3",
          "plate": "ABC-123",
          "spot": 2,
          "vehicle_type": "car"
        }
        "#);
    }

    #[test]
    fn released_ticket_response() {
        let mut t = ticket();
        t.close(at(1_700_003_660));
        t.set_fee(4.0);
        insta::assert_json_snapshot!(t.to_response(), @r#"
        {
          "entry_time": "2023-11-14T22:13:20Z",
          "exit_time": "2023-11-14T23:14:20Z",
          "fee": 4.0,
          "id": "TICKET-3",
          "plate": "ABC-123",
          "spot": 2,
          "vehicle_type": "car"
        }
        "#);
    }

    #[test]
    fn display() {
        let mut t = ticket();
        assert_eq!(
            t.to_string(),
            "TICKET-3 [car ABC-123] spot 2 since 2023-11-14T22:13:20Z"
        );
        t.close(at(1_700_003_600));
        t.set_fee(2.0);
        assert!(t.to_string().ends_with("until 2023-11-14T23:13:20Z fee $2.00"));
    }
}
