use thiserror::Error;

use crate::ticket::TicketId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LotError {
    /// `allocate` was called before any selection policy was configured.
    #[error("no selection policy configured")]
    NoSelectionPolicy,

    #[error("invalid ticket id: {0}")]
    InvalidTicket(TicketId),

    #[error("malformed ticket id '{0}', expected TICKET-<n>")]
    InvalidTicketFormat(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl LotError {
    /// Whether the caller can sensibly retry or carry on.
    ///
    /// A missing selection policy and bad configuration are programming
    /// errors; a wrong ticket id is the caller's to correct.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::InvalidTicket(_) | Self::InvalidTicketFormat(_))
    }
}

pub type Result<T> = std::result::Result<T, LotError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages() {
        assert_eq!(
            LotError::NoSelectionPolicy.to_string(),
            "no selection policy configured"
        );
        assert_eq!(
            LotError::InvalidTicket(TicketId::new(7)).to_string(),
            "invalid ticket id: TICKET-7"
        );
    }

    #[test]
    fn recoverability() {
        assert!(!LotError::NoSelectionPolicy.is_recoverable());
        assert!(!LotError::Config("x".into()).is_recoverable());
        assert!(LotError::InvalidTicket(TicketId::new(1)).is_recoverable());
    }
}
