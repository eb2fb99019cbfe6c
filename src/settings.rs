//! Settings provider.
//!
//! Settings are fetched from a source once and shared as an `Arc` until
//! invalidated or replaced. Every change bumps a version number that callers
//! can use to detect that derived state (cached fields, primitives) is out of
//! date.

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::EngineSettings;
use crate::error::{CoverageError, Result};

/// Where settings come from
pub trait SettingsSource: Send {
    fn fetch(&self) -> Result<EngineSettings>;
}

impl<S: SettingsSource + ?Sized> SettingsSource for Box<S> {
    fn fetch(&self) -> Result<EngineSettings> {
        (**self).fetch()
    }
}

/// Settings read from a TOML file on every fetch
pub struct TomlFileSource {
    path: PathBuf,
}

impl TomlFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SettingsSource for TomlFileSource {
    fn fetch(&self) -> Result<EngineSettings> {
        EngineSettings::load(&self.path).map_err(|e| {
            CoverageError::Settings(format!("{}: {}", self.path.display(), e))
        })
    }
}

/// Fixed in-memory settings
#[derive(Debug, Clone, Default)]
pub struct StaticSource(pub EngineSettings);

impl SettingsSource for StaticSource {
    fn fetch(&self) -> Result<EngineSettings> {
        self.0.validate()?;
        Ok(self.0.clone())
    }
}

pub struct SettingsProvider<S: SettingsSource> {
    source: S,
    cached: Option<Arc<EngineSettings>>,
    version: u64,
    fetches: usize,
}

impl<S: SettingsSource> SettingsProvider<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            cached: None,
            version: 0,
            fetches: 0,
        }
    }

    /// Current settings, fetched from the source on first use
    ///
    /// A failed fetch leaves the provider empty so the next call retries.
    pub fn current(&mut self) -> Result<Arc<EngineSettings>> {
        if let Some(settings) = &self.cached {
            return Ok(Arc::clone(settings));
        }
        let settings = Arc::new(self.source.fetch()?);
        self.fetches += 1;
        self.version += 1;
        log::debug!("Settings fetched (version {})", self.version);
        self.cached = Some(Arc::clone(&settings));
        Ok(settings)
    }

    /// Replace the settings without consulting the source
    pub fn update(&mut self, settings: EngineSettings) -> Result<Arc<EngineSettings>> {
        settings.validate()?;
        let settings = Arc::new(settings);
        self.version += 1;
        log::info!("Settings updated (version {})", self.version);
        self.cached = Some(Arc::clone(&settings));
        Ok(settings)
    }

    /// Drop the cached settings; the next [`current`](Self::current) refetches
    pub fn invalidate(&mut self) {
        if self.cached.take().is_some() {
            log::debug!("Settings invalidated");
        }
    }

    /// Incremented on every fetch or update
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Number of successful fetches from the source
    pub fn fetches(&self) -> usize {
        self.fetches
    }
}
