//! Turn controller - owns one match and runs its phase state machine

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};
use uuid::Uuid;

use super::action::ActionSubmission;
use super::combatant::{CombatantId, Controller};
use super::error::{MatchError, SubmitError};
use super::event::TurnResult;
use super::resolver::ActionResolver;
use super::rules::Rules;
use super::snapshot::{PlayerView, SnapshotBuilder};
use super::state::{MatchPhase, MatchState};

/// The authoritative controller for one match
pub struct TurnController {
    state: MatchState,
    /// Dodge and flinch rolls; seeded from the match seed
    rng: ChaCha8Rng,
}

impl TurnController {
    pub fn new(state: MatchState) -> Self {
        let rng = ChaCha8Rng::seed_from_u64(state.seed);
        Self { state, rng }
    }

    /// Standard six-combatant match on a generated map
    pub fn standard(id: Uuid, seed: u64, rules: Rules, player_name: &str) -> Self {
        Self::new(MatchState::standard(id, seed, rules, player_name))
    }

    pub fn id(&self) -> Uuid {
        self.state.id
    }

    pub fn phase(&self) -> MatchPhase {
        self.state.phase
    }

    pub fn state(&self) -> &MatchState {
        &self.state
    }

    /// Lobby -> action, turn 1
    pub fn start(&mut self) -> Result<(), MatchError> {
        self.expect_phase(MatchPhase::Lobby)?;

        self.state.phase = MatchPhase::Action;
        self.state.turn = 1;

        info!(
            match_id = %self.state.id,
            seed = self.state.seed,
            combatants = self.state.combatants.len(),
            "Match started"
        );
        Ok(())
    }

    /// Buffer a combatant's action for this turn. A later submission in the
    /// same turn replaces the earlier one.
    pub fn submit(&mut self, id: CombatantId, submission: ActionSubmission) -> Result<(), SubmitError> {
        if self.state.phase != MatchPhase::Action {
            return Err(SubmitError::WrongPhase(self.state.phase));
        }
        let combatant = self
            .state
            .combatant(id)
            .ok_or(SubmitError::UnknownCombatant(id))?;
        if !combatant.alive {
            return Err(SubmitError::Eliminated(id));
        }

        debug!(
            match_id = %self.state.id,
            turn = self.state.turn,
            combatant = %id,
            action = submission.action.name(),
            "Action submitted"
        );
        self.state.pending.insert(id, submission);
        Ok(())
    }

    /// Living combatants still to submit this turn
    pub fn pending_combatants(&self) -> Vec<CombatantId> {
        self.state.awaiting()
    }

    pub fn all_submitted(&self) -> bool {
        self.state.awaiting().is_empty()
    }

    /// Agent-controlled combatants still to submit this turn
    pub fn pending_agents(&self) -> Vec<CombatantId> {
        self.state
            .awaiting()
            .into_iter()
            .filter(|id| {
                self.state
                    .combatant(*id)
                    .is_some_and(|c| c.controller == Controller::Agent)
            })
            .collect()
    }

    /// Resolve the buffered actions and advance the state machine
    pub fn resolve_turn(&mut self) -> Result<TurnResult, MatchError> {
        self.expect_phase(MatchPhase::Action)?;
        self.state.phase = MatchPhase::Resolving;

        let turn = self.state.turn;
        let resolution = ActionResolver::resolve(&mut self.state, &mut self.rng);
        let result = TurnResult::new(turn, resolution.events, resolution.eliminated);
        self.state.history.push(result.clone());

        let alive = self.state.alive_ids();
        if alive.len() <= 1 {
            self.state.phase = MatchPhase::Finished;
            self.state.winner = alive.first().copied();
            info!(
                match_id = %self.state.id,
                turn,
                winner = ?self.state.winner,
                "Match finished"
            );
        } else {
            self.state.turn += 1;
            self.state.phase = MatchPhase::Action;
        }

        info!(
            match_id = %self.state.id,
            turn,
            events = result.events.len(),
            eliminated = result.eliminated.len(),
            alive = alive.len(),
            "Turn resolved"
        );
        Ok(result)
    }

    /// Fog-filtered view for one combatant
    pub fn view(&self, viewer: CombatantId) -> Result<PlayerView, MatchError> {
        SnapshotBuilder::player_view(&self.state, viewer).ok_or(MatchError::UnknownCombatant(viewer))
    }

    fn expect_phase(&self, expected: MatchPhase) -> Result<(), MatchError> {
        if self.state.phase == expected {
            Ok(())
        } else {
            Err(MatchError::WrongPhase {
                expected,
                actual: self.state.phase,
            })
        }
    }
}
