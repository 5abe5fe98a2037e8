//! Kill Zone - authoritative turn resolution for six-combatant grid battles
//!
//! The engine lives in [`game`]: map generation, fog of war, the danger zone,
//! the twelve-phase action resolver and the per-match turn controller.
//! [`agents`] picks actions for non-human combatants and [`http`] exposes
//! matches over a JSON API.

pub mod agents;
pub mod app;
pub mod config;
pub mod game;
pub mod http;
pub mod util;
