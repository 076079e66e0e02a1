//! Connectivity tracking for the backend.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Connectivity state of the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectivityState {
    /// The last call reached the backend.
    Online,
    /// The last call could not reach the backend.
    Offline,
}

/// Connectivity state machine, fed by the outcome of every gateway call.
#[derive(Debug)]
pub struct OfflineMode {
    state: ConnectivityState,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum OfflineError {
    #[error("client is offline; the backend could not be reached")]
    Offline,
}

impl Default for OfflineMode {
    fn default() -> Self {
        Self::new()
    }
}

impl OfflineMode {
    pub fn new() -> Self {
        Self {
            state: ConnectivityState::Online,
        }
    }

    pub fn state(&self) -> ConnectivityState {
        self.state
    }

    pub fn set_offline(&mut self) {
        if self.state != ConnectivityState::Offline {
            tracing::warn!("backend unreachable; switching to offline");
        }
        self.state = ConnectivityState::Offline;
    }

    pub fn set_online(&mut self) {
        if self.state != ConnectivityState::Online {
            tracing::info!("backend reachable again");
        }
        self.state = ConnectivityState::Online;
    }

    pub fn is_offline(&self) -> bool {
        self.state == ConnectivityState::Offline
    }

    /// Ensure the client is online; return error if offline.
    pub fn require_online(&self) -> Result<(), OfflineError> {
        if self.is_offline() {
            Err(OfflineError::Offline)
        } else {
            Ok(())
        }
    }
}
