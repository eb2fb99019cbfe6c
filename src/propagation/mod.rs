pub mod path_loss;

pub use path_loss::{PathLossModel, attenuation_db};
