//! Sync runtime integration.
//!
//! Bridges the sync session loop with async link tasks.

use anyhow::{Context, Result};
use tokio::runtime::Runtime;
use tokio::sync::mpsc;

use crate::link::{run_link, LinkConfig, LinkHandle, SyncCommand, SyncEvent};

/// Owns the tokio runtime that link tasks run on.
pub struct SyncRuntime {
    rt: Runtime,
    config: LinkConfig,
}

impl SyncRuntime {
    pub fn new(config: LinkConfig) -> Result<Self> {
        let rt = Runtime::new().context("failed to create tokio runtime")?;
        Ok(Self { rt, config })
    }

    /// Start from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(LinkConfig::from_env())
    }

    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    /// Spawn a fresh link task. It fetches a snapshot immediately and then polls
    /// until the returned handle is dropped.
    pub fn open_link(&self) -> LinkHandle {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<SyncCommand>();
        let (event_tx, event_rx) = mpsc::unbounded_channel::<SyncEvent>();

        log::info!("[Sync] opening link to {}", self.config.address());
        let task = self.rt.spawn(run_link(self.config.clone(), cmd_rx, event_tx));

        LinkHandle::new(cmd_tx, event_rx, Some(task))
    }
}
