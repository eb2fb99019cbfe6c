use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::emitter::Emitter;
use crate::error::Result;
use crate::field::{FieldParams, Grid, compute_field};
use crate::geometry::Bounds;

/// Lifecycle of the cached field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    /// No field, or inputs changed since the last computation
    Stale,
    /// A computation is in progress
    Computing,
    /// The cached field matches the last requested inputs
    Fresh,
}

/// All inputs of one field computation
///
/// View transforms (pan/zoom) are deliberately absent: they apply at render
/// time and never change field values.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldRequest {
    pub emitters: Vec<Emitter>,
    pub bounds: Bounds,
    pub cell_size: f64,
    pub params: FieldParams,
}

impl FieldRequest {
    pub fn new(emitters: Vec<Emitter>, bounds: Bounds, cell_size: f64, params: FieldParams) -> Self {
        Self {
            emitters,
            bounds,
            cell_size,
            params,
        }
    }

    /// Hash of every value that influences the field
    pub fn key(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.emitters.len().hash(&mut hasher);
        for e in &self.emitters {
            e.id.hash(&mut hasher);
            e.position.x.to_bits().hash(&mut hasher);
            e.position.y.to_bits().hash(&mut hasher);
            e.tx_power_dbm.to_bits().hash(&mut hasher);
            e.frequency_mhz.to_bits().hash(&mut hasher);
            e.active.hash(&mut hasher);
        }
        for v in [
            self.bounds.origin_x,
            self.bounds.origin_y,
            self.bounds.width,
            self.bounds.height,
            self.cell_size,
        ] {
            v.to_bits().hash(&mut hasher);
        }
        self.params.hash(&mut hasher);
        hasher.finish()
    }

    pub fn compute(&self) -> Result<Grid> {
        compute_field(&self.emitters, &self.bounds, self.cell_size, &self.params)
    }
}

/// Single-entry cache for the most recent field
pub struct FieldCache {
    state: CacheState,
    key: Option<u64>,
    request: Option<FieldRequest>,
    grid: Option<Arc<Grid>>,
    computations: usize,
}

impl FieldCache {
    pub fn new() -> Self {
        Self {
            state: CacheState::Stale,
            key: None,
            request: None,
            grid: None,
            computations: 0,
        }
    }

    pub fn state(&self) -> CacheState {
        self.state
    }

    /// Number of fields computed (cache misses)
    pub fn computations(&self) -> usize {
        self.computations
    }

    /// Whether the cached field was computed from exactly `request`
    ///
    /// The key only narrows the comparison; a hash collision still misses.
    pub fn is_fresh_for(&self, request: &FieldRequest) -> bool {
        self.matches(request.key(), request)
    }

    fn matches(&self, key: u64, request: &FieldRequest) -> bool {
        self.state == CacheState::Fresh
            && self.key == Some(key)
            && self.request.as_ref() == Some(request)
    }

    /// Cached field for `request`, computing it on a miss
    ///
    /// A failed computation leaves the cache stale; the previous field stays
    /// available through [`FieldCache::latest`].
    pub fn get_or_compute(&mut self, request: &FieldRequest) -> Result<Arc<Grid>> {
        let key = request.key();
        if self.matches(key, request) {
            if let Some(grid) = &self.grid {
                log::trace!("Field cache hit {:016x}", key);
                return Ok(Arc::clone(grid));
            }
        }

        self.state = CacheState::Computing;
        match request.compute() {
            Ok(grid) => {
                let grid = Arc::new(grid);
                self.grid = Some(Arc::clone(&grid));
                self.key = Some(key);
                self.request = Some(request.clone());
                self.state = CacheState::Fresh;
                self.computations += 1;
                Ok(grid)
            }
            Err(e) => {
                self.state = CacheState::Stale;
                self.key = None;
                self.request = None;
                Err(e)
            }
        }
    }

    /// Mark the cached field as out of date
    pub fn invalidate(&mut self) {
        if self.state == CacheState::Fresh {
            log::debug!("Field cache invalidated");
        }
        self.state = CacheState::Stale;
        self.key = None;
    }

    /// Most recently computed field, fresh or not
    pub fn latest(&self) -> Option<Arc<Grid>> {
        self.grid.clone()
    }
}

impl Default for FieldCache {
    fn default() -> Self {
        Self::new()
    }
}
