use std::sync::Arc;

use crate::config::AppConfig;
use crate::services::{SessionService, TurnService};
use crate::store::GameStore;

/// Application state containing shared resources.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub sessions: SessionService,
    pub turns: TurnService,
}

impl AppState {
    pub fn new(store: Arc<dyn GameStore>, config: AppConfig) -> Self {
        Self {
            config,
            sessions: SessionService::new(store.clone()),
            turns: TurnService::new(store),
        }
    }
}
