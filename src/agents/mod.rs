//! Agent decisions for policy-driven combatants

pub mod coordinator;
pub mod heuristic;

pub use coordinator::{AgentCoordinator, AgentDecision};
pub use heuristic::HeuristicProvider;

use std::future::Future;
use std::time::Duration;

use crate::game::{ActionSubmission, PlayerView};

/// Something that picks one action for a combatant from its view
pub trait DecisionProvider: Send + Sync + 'static {
    fn decide(
        &self,
        view: PlayerView,
    ) -> impl Future<Output = Result<ActionSubmission, DecisionError>> + Send;
}

/// Why a decision attempt produced nothing usable
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecisionError {
    #[error("Decision timed out after {0:?}")]
    Timeout(Duration),

    #[error("Provider failed: {0}")]
    Provider(String),

    #[error("Invalid action: {0}")]
    Invalid(String),
}
