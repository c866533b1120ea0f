use std::fmt;

use thiserror::Error;

/// Transaction phases, for error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Attention,
    Sync,
    Command,
    ServiceRequest,
    Turnaround,
    Talk,
    Listen,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Attention => "attention",
            Phase::Sync => "sync",
            Phase::Command => "command",
            Phase::ServiceRequest => "service request",
            Phase::Turnaround => "turnaround",
            Phase::Talk => "talk",
            Phase::Listen => "listen",
        };
        f.write_str(name)
    }
}

/// A line-state rule the host (or another device) broke.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolFault {
    #[error("bit low period of {ticks} ticks is outside the bit window")]
    BitOutOfWindow { ticks: u8 },

    #[error("line stayed high past the bit ceiling")]
    BitHighOverrun,

    #[error("line already asserted before driving a bit")]
    LineBusy,

    #[error("line was released before the service request could be held")]
    SrqLineReleased,

    #[error("line did not float high after the command stop bit")]
    SrqNotReleased,

    #[error("host start bit did not arrive")]
    ListenStartTimeout,

    #[error("host start bit held low too long")]
    ListenStartOverrun,

    #[error("first listen data bit did not arrive")]
    ListenSyncTimeout,

    #[error("listen payload of {received} byte(s) is too short")]
    ShortListen { received: usize },
}

/// Why a transaction was abandoned. Errors never outlive the transaction they occurred in.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BusError {
    #[error("{phase} timing out of window ({ticks} ticks)")]
    PhaseTiming { phase: Phase, ticks: u8 },

    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolFault),

    #[error("collision during {phase}")]
    Collision { phase: Phase },
}

impl BusError {
    /// Collisions are the only errors that feed address-collision bookkeeping.
    pub fn is_collision(&self) -> bool {
        matches!(self, BusError::Collision { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_collisions_are_collisions() {
        assert!(BusError::Collision { phase: Phase::Talk }.is_collision());
        assert!(!BusError::from(ProtocolFault::LineBusy).is_collision());
        assert!(!BusError::PhaseTiming {
            phase: Phase::Sync,
            ticks: 3
        }
        .is_collision());
    }

    #[test]
    fn messages_name_the_phase() {
        let err = BusError::PhaseTiming {
            phase: Phase::Sync,
            ticks: 200,
        };
        assert_eq!(err.to_string(), "sync timing out of window (200 ticks)");
        assert_eq!(
            BusError::Collision {
                phase: Phase::Turnaround
            }
            .to_string(),
            "collision during turnaround"
        );
    }
}
