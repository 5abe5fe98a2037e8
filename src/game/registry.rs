//! Match registry - live matches and the session tokens that reach them

use dashmap::DashMap;
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use super::action::ActionSubmission;
use super::combatant::CombatantId;
use super::controller::TurnController;
use super::error::MatchError;
use super::event::TurnResult;
use super::rules::Rules;
use super::snapshot::PlayerView;

/// Longest accepted player name, in characters
pub const MAX_NAME_LEN: usize = 16;

/// Shared handle to one match
pub type MatchHandle = Arc<Mutex<TurnController>>;

/// What a session token grants access to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    pub match_id: Uuid,
    pub combatant: CombatantId,
}

/// Returned to whoever creates a match
#[derive(Debug, Clone, Serialize)]
pub struct CreatedMatch {
    pub match_id: Uuid,
    pub session_token: Uuid,
    pub combatant: CombatantId,
}

/// Registry of all matches in this process
pub struct MatchRegistry {
    matches: DashMap<Uuid, MatchHandle>,
    sessions: DashMap<Uuid, Session>,
    rules: Rules,
}

impl MatchRegistry {
    pub fn new(rules: Rules) -> Self {
        Self {
            matches: DashMap::new(),
            sessions: DashMap::new(),
            rules,
        }
    }

    /// Create a standard match with `player_name` as the human combatant.
    /// A random seed is drawn when none is given.
    pub fn create_match(&self, player_name: &str, seed: Option<u64>) -> Result<CreatedMatch, MatchError> {
        let name = player_name.trim();
        let len = name.chars().count();
        if len == 0 || len > MAX_NAME_LEN {
            return Err(MatchError::InvalidName);
        }

        let match_id = Uuid::new_v4();
        let seed = seed.unwrap_or_else(rand::random);
        let controller = TurnController::standard(match_id, seed, self.rules, name);

        let session_token = Uuid::new_v4();
        let combatant = CombatantId(0);

        self.matches.insert(match_id, Arc::new(Mutex::new(controller)));
        self.sessions.insert(session_token, Session { match_id, combatant });

        info!(match_id = %match_id, seed, "Match created");

        Ok(CreatedMatch {
            match_id,
            session_token,
            combatant,
        })
    }

    pub fn get(&self, id: &Uuid) -> Option<MatchHandle> {
        self.matches.get(id).map(|m| m.value().clone())
    }

    fn handle(&self, id: &Uuid) -> Result<MatchHandle, MatchError> {
        self.get(id).ok_or(MatchError::NotFound(*id))
    }

    pub fn session(&self, token: &Uuid) -> Option<Session> {
        self.sessions.get(token).map(|s| *s.value())
    }

    pub fn start(&self, id: &Uuid) -> Result<(), MatchError> {
        self.handle(id)?.lock().start()
    }

    pub fn submit(
        &self,
        id: &Uuid,
        combatant: CombatantId,
        submission: ActionSubmission,
    ) -> Result<(), MatchError> {
        Ok(self.handle(id)?.lock().submit(combatant, submission)?)
    }

    pub fn resolve(&self, id: &Uuid) -> Result<TurnResult, MatchError> {
        self.handle(id)?.lock().resolve_turn()
    }

    pub fn view(&self, id: &Uuid, combatant: CombatantId) -> Result<PlayerView, MatchError> {
        self.handle(id)?.lock().view(combatant)
    }

    /// Drop a match and every session pointing at it
    /// Drop a match and revoke its sessions; returns the revoked tokens
    pub fn remove(&self, id: &Uuid) -> Option<(MatchHandle, Vec<Uuid>)> {
        let (_, handle) = self.matches.remove(id)?;
        let mut revoked = Vec::new();
        self.sessions.retain(|token, s| {
            let keep = s.match_id != *id;
            if !keep {
                revoked.push(*token);
            }
            keep
        });
        info!(match_id = %id, sessions = revoked.len(), "Match removed");
        Some((handle, revoked))
    }

    pub fn active_matches(&self) -> usize {
        self.matches.len()
    }
}

impl Default for MatchRegistry {
    fn default() -> Self {
        Self::new(Rules::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::action::Action;
    use crate::game::error::SubmitError;
    use crate::game::state::MatchPhase;

    #[test]
    fn create_issues_session_for_player_zero() {
        let registry = MatchRegistry::default();
        let created = registry.create_match("Ada", Some(9)).unwrap();
        let session = registry.session(&created.session_token).unwrap();
        assert_eq!(session.match_id, created.match_id);
        assert_eq!(session.combatant, CombatantId(0));
        assert_eq!(registry.active_matches(), 1);
    }

    #[test]
    fn name_length_is_validated() {
        let registry = MatchRegistry::default();
        assert_eq!(registry.create_match("   ", None).unwrap_err(), MatchError::InvalidName);
        assert_eq!(
            registry.create_match("abcdefghijklmnopq", None).unwrap_err(),
            MatchError::InvalidName
        );
        assert!(registry.create_match("abcdefghijklmnop", None).is_ok());
    }

    #[test]
    fn matches_are_isolated() {
        let registry = MatchRegistry::default();
        let a = registry.create_match("A", Some(1)).unwrap();
        let b = registry.create_match("B", Some(1)).unwrap();
        registry.start(&a.match_id).unwrap();

        assert_eq!(
            registry.submit(&b.match_id, CombatantId(0), Action::Hide.into()),
            Err(MatchError::Submit(SubmitError::WrongPhase(MatchPhase::Lobby)))
        );
        registry.submit(&a.match_id, CombatantId(0), Action::Hide.into()).unwrap();
        assert_eq!(registry.view(&b.match_id, CombatantId(0)).unwrap().turn, 0);
    }

    #[test]
    fn remove_drops_sessions() {
        let registry = MatchRegistry::default();
        let created = registry.create_match("Ada", None).unwrap();
        let (_, revoked) = registry.remove(&created.match_id).unwrap();
        assert_eq!(revoked, vec![created.session_token]);
        assert!(registry.session(&created.session_token).is_none());
        assert_eq!(
            registry.start(&created.match_id),
            Err(MatchError::NotFound(created.match_id))
        );
    }
}
