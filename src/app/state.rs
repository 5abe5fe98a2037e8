//! Application state shared across routes

use std::sync::Arc;
use uuid::Uuid;

use crate::agents::{AgentCoordinator, HeuristicProvider};
use crate::config::Config;
use crate::game::MatchRegistry;
use crate::util::rate_limit::SessionRateLimiter;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub registry: Arc<MatchRegistry>,
    pub agents: AgentCoordinator<HeuristicProvider>,
    pub submit_limiter: Arc<SessionRateLimiter>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let config = Arc::new(config);

        let registry = Arc::new(MatchRegistry::new(config.rules));

        let agents = AgentCoordinator::new(
            HeuristicProvider,
            config.agent_timeout,
            config.agent_max_retries,
        );

        let submit_limiter = Arc::new(SessionRateLimiter::new(config.submit_rate_limit));

        Self {
            config,
            registry,
            agents,
            submit_limiter,
        }
    }

    /// Remove a match together with its sessions and their rate limiters
    pub fn remove_match(&self, id: &Uuid) -> bool {
        match self.registry.remove(id) {
            Some((_, revoked)) => {
                for token in &revoked {
                    self.submit_limiter.remove(token);
                }
                true
            }
            None => false,
        }
    }
}
