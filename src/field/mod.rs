pub mod cache;
pub mod grid;
pub mod sampler;
pub mod worker;

pub use cache::{CacheState, FieldCache, FieldRequest};
pub use grid::Grid;
pub use sampler::{
    Aggregation, EmitterSignal, FieldParams, compute_field, point_signals, signal_at,
};
pub use worker::{FieldUpdate, FieldWorker};
