// libs/signaling-cell/src/state.rs
use std::sync::{Arc, Mutex};

use shared_config::AppConfig;

use crate::services::SignalingRelay;
use crate::transport::ClientSinks;

/// Both registries live behind one lock: the join→ready check-then-act must
/// be atomic, and no dispatch path ever suspends while holding it.
pub type SharedRelay = Arc<Mutex<SignalingRelay>>;

/// Per-cell shared state handed to every handler. Cloning is cheap; all
/// fields are handles.
#[derive(Clone)]
pub struct CellState {
    pub config: Arc<AppConfig>,
    pub relay: SharedRelay,
    pub sinks: ClientSinks,
}

impl CellState {
    pub fn new(config: Arc<AppConfig>) -> Self {
        Self {
            config,
            relay: Arc::new(Mutex::new(SignalingRelay::new())),
            sinks: ClientSinks::new(),
        }
    }
}
