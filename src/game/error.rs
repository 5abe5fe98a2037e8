//! Match-level error types

use uuid::Uuid;

use super::combatant::CombatantId;
use super::state::MatchPhase;

/// Rejected action submission; the match state is left untouched
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    #[error("Actions are not accepted during the {0:?} phase")]
    WrongPhase(MatchPhase),

    #[error("Unknown combatant {0}")]
    UnknownCombatant(CombatantId),

    #[error("Combatant {0} has been eliminated")]
    Eliminated(CombatantId),
}

/// Contract violations surfaced by the controller and registry
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MatchError {
    #[error("Match not found: {0}")]
    NotFound(Uuid),

    #[error("Unknown session")]
    UnknownSession,

    #[error("Player name must be 1-16 characters")]
    InvalidName,

    #[error("Operation requires the {expected:?} phase, match is in {actual:?}")]
    WrongPhase {
        expected: MatchPhase,
        actual: MatchPhase,
    },

    #[error("Unknown combatant {0}")]
    UnknownCombatant(CombatantId),

    #[error(transparent)]
    Submit(#[from] SubmitError),
}
