use arc_swap::ArcSwap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::Config;
use crate::error::ConfigError;

/// Live-reloadable configuration holder.
///
/// Wraps `Config` in an `ArcSwap` so readers never block and writers
/// atomically swap the pointer. Components read a fresh snapshot per
/// operation, so a [`ConfigHandle::reload`] or [`ConfigHandle::store`]
/// takes effect on their next call.
pub struct ConfigHandle {
    inner: Arc<ArcSwap<Config>>,
    path: PathBuf,
}

impl ConfigHandle {
    /// Create a new handle seeded with `config`.
    pub fn new(config: Config) -> Self {
        let path = config.config_path.clone();
        Self {
            inner: Arc::new(ArcSwap::from_pointee(config)),
            path,
        }
    }

    /// Load current config snapshot. Lock-free.
    pub fn load(&self) -> arc_swap::Guard<Arc<Config>> {
        self.inner.load()
    }

    /// Return a clone of the current `Arc<Config>`.
    pub fn load_full(&self) -> Arc<Config> {
        self.inner.load_full()
    }

    /// Re-read the config file, re-apply env overrides and swap the active
    /// snapshot. The current snapshot stays in place on error.
    pub fn reload(&self) -> Result<(), ConfigError> {
        let mut fresh = Config::load_from_path(&self.path).map_err(|e| {
            e.downcast::<ConfigError>()
                .unwrap_or_else(|e| ConfigError::HotReload(format!("{e:#}")))
        })?;
        fresh.apply_env_overrides();
        fresh.validate()?;
        self.inner.store(Arc::new(fresh));
        tracing::info!(path = %self.path.display(), "config hot-reloaded");
        Ok(())
    }

    /// Manually swap in a new config (e.g. after programmatic mutation).
    pub fn store(&self, config: Config) {
        self.inner.store(Arc::new(config));
    }

    /// Apply `update` to a copy of the current snapshot and swap it in.
    pub fn update(&self, update: impl Fn(&mut Config)) {
        self.inner.rcu(|current| {
            let mut next = Config::clone(current);
            update(&mut next);
            next
        });
    }

    /// Config file path being watched.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Clone for ConfigHandle {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            path: self.path.clone(),
        }
    }
}
