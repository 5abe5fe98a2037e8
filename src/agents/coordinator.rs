//! Collects one validated action per agent before a turn resolves

use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use super::{DecisionError, DecisionProvider};
use crate::game::{Action, ActionSubmission, CombatantId, MatchHandle, MatchPhase, PlayerView};

/// Most tiles a move may cover
const MAX_MOVE_DISTANCE: u32 = 3;

/// Outcome of one agent's decision
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentDecision {
    pub combatant: CombatantId,
    pub submission: ActionSubmission,
    /// Provider calls made, including the retry
    pub attempts: u32,
    /// True when the hide fallback was used
    pub fell_back: bool,
}

/// Runs a decision provider with a timeout, retries and a hide fallback
pub struct AgentCoordinator<P> {
    provider: Arc<P>,
    timeout: Duration,
    max_retries: u32,
}

impl<P> Clone for AgentCoordinator<P> {
    fn clone(&self) -> Self {
        Self {
            provider: self.provider.clone(),
            timeout: self.timeout,
            max_retries: self.max_retries,
        }
    }
}

impl<P: DecisionProvider> AgentCoordinator<P> {
    pub fn new(provider: P, timeout: Duration, max_retries: u32) -> Self {
        Self {
            provider: Arc::new(provider),
            timeout,
            max_retries,
        }
    }

    /// Decide for one combatant; never fails
    pub async fn decide(&self, view: PlayerView) -> AgentDecision {
        let combatant = view.you.id;
        let attempts_allowed = self.max_retries + 1;

        for attempt in 1..=attempts_allowed {
            match self.attempt(view.clone()).await {
                Ok(submission) => {
                    debug!(
                        combatant = %combatant,
                        attempt,
                        action = submission.action.name(),
                        "Agent decided"
                    );
                    return AgentDecision {
                        combatant,
                        submission,
                        attempts: attempt,
                        fell_back: false,
                    };
                }
                Err(e) => {
                    warn!(combatant = %combatant, attempt, error = %e, "Agent decision rejected");
                }
            }
        }

        warn!(combatant = %combatant, "Agent falling back to hide");
        AgentDecision {
            combatant,
            submission: ActionSubmission::fallback(),
            attempts: attempts_allowed,
            fell_back: true,
        }
    }

    async fn attempt(&self, view: PlayerView) -> Result<ActionSubmission, DecisionError> {
        let submission = tokio::time::timeout(self.timeout, self.provider.decide(view.clone()))
            .await
            .map_err(|_| DecisionError::Timeout(self.timeout))??;
        validate(&view, &submission)?;
        Ok(submission)
    }

    /// Decide for every view concurrently
    pub async fn decide_all(&self, views: Vec<PlayerView>) -> Vec<AgentDecision> {
        join_all(views.into_iter().map(|view| self.decide(view))).await
    }

    /// Collect and submit actions for every agent still to act in a match.
    /// The match lock is not held while providers run. Decisions are dropped
    /// if the turn they were made for resolved in the meantime.
    pub async fn run_turn(&self, handle: &MatchHandle) -> Vec<AgentDecision> {
        let (turn, views) = {
            let controller = handle.lock();
            let views: Vec<PlayerView> = controller
                .pending_agents()
                .into_iter()
                .filter_map(|id| controller.view(id).ok())
                .collect();
            (controller.state().turn, views)
        };
        if views.is_empty() {
            return Vec::new();
        }

        let decisions = self.decide_all(views).await;

        let mut controller = handle.lock();
        if controller.phase() != MatchPhase::Action || controller.state().turn != turn {
            warn!(
                match_id = %controller.id(),
                decided_for = turn,
                turn = controller.state().turn,
                phase = ?controller.phase(),
                dropped = decisions.len(),
                "Agent decisions outlived their turn"
            );
            return Vec::new();
        }

        for decision in &decisions {
            if let Err(e) = controller.submit(decision.combatant, decision.submission.clone()) {
                warn!(
                    match_id = %controller.id(),
                    combatant = %decision.combatant,
                    error = %e,
                    "Agent action not accepted"
                );
            }
        }

        decisions
    }
}

/// Semantic checks serde cannot express
pub fn validate(view: &PlayerView, submission: &ActionSubmission) -> Result<(), DecisionError> {
    let me = &view.you;
    let action = &submission.action;

    if let Some(required) = action.required_archetype() {
        if me.archetype != Some(required) {
            return Err(DecisionError::Invalid(format!(
                "{} is not available to this combatant",
                action.name()
            )));
        }
        if me.status.special_used {
            return Err(DecisionError::Invalid("special ability already used".into()));
        }
    }

    match action {
        Action::Move { distance, .. } if !(1..=MAX_MOVE_DISTANCE).contains(distance) => Err(
            DecisionError::Invalid(format!("move distance {} out of 1-3", distance)),
        ),
        Action::Attack { target, .. } if !target.in_bounds() => {
            Err(DecisionError::Invalid(format!("attack target {} off the map", target)))
        }
        Action::UseItem {
            target: Some(target),
            ..
        } if !target.in_bounds() => {
            Err(DecisionError::Invalid(format!("item target {} off the map", target)))
        }
        Action::MarkTarget { target_id } if *target_id == me.id => {
            Err(DecisionError::Invalid("cannot mark self".into()))
        }
        Action::Overwatch { tiles } if tiles.is_empty() || !tiles.iter().all(|t| t.in_bounds()) => {
            Err(DecisionError::Invalid("overwatch needs tiles on the map".into()))
        }
        Action::FalseFlag { text, .. } if text.trim().is_empty() => {
            Err(DecisionError::Invalid("false flag without text".into()))
        }
        _ => Ok(()),
    }
}
