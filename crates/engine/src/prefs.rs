//! Preferred side, remembered across runs.
//!
//! The file holds a single side label. A present, readable preference makes the
//! binary resume multiplayer straight away.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::types::Side;

#[derive(Debug, Clone)]
pub struct SidePreference {
    path: PathBuf,
}

impl SidePreference {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored side. Missing or unreadable files mean "no preference".
    pub fn load(&self) -> Option<Side> {
        match fs::read_to_string(&self.path) {
            Ok(text) => {
                let side = Side::from_str(&text);
                if side.is_none() {
                    log::warn!("[Prefs] ignoring unrecognised side in {}", self.path.display());
                }
                side
            }
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                log::warn!("[Prefs] cannot read {}: {}", self.path.display(), e);
                None
            }
        }
    }

    pub fn store(&self, side: Side) -> Result<()> {
        fs::write(&self.path, side.as_str())
            .with_context(|| format!("failed to write {}", self.path.display()))
    }

    /// Forget the stored side. Clearing an absent preference is not an error.
    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("failed to remove {}", self.path.display())),
        }
    }
}
