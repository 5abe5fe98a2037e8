//! Turn-based battle engine

pub mod action;
pub mod combat;
pub mod combatant;
pub mod controller;
pub mod error;
pub mod event;
pub mod fog;
pub mod mapgen;
pub mod registry;
pub mod resolver;
pub mod rules;
pub mod snapshot;
pub mod state;
pub mod types;
pub mod zone;

pub use action::{Action, ActionSubmission, OutboundMessage, Recipient};
pub use combatant::{Archetype, Combatant, CombatantId, Controller, Status, TimedEffect};
pub use controller::TurnController;
pub use error::{MatchError, SubmitError};
pub use event::{ChatMessage, EventKind, EventPayload, GameEvent, KillFeedEntry, TurnResult};
pub use fog::FogOfWar;
pub use mapgen::{GeneratedMap, MapGenerator};
pub use registry::{CreatedMatch, MatchHandle, MatchRegistry, Session};
pub use resolver::{ActionResolver, Resolution};
pub use rules::{Rules, ZoneRules};
pub use snapshot::{CombatantSighting, PlayerView, SnapshotBuilder};
pub use state::{MatchPhase, MatchState};
pub use types::{Direction, Grid, Item, Loot, Position, Terrain, Tile, Weapon};
pub use zone::{DangerZone, SafeArea};
