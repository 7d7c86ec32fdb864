pub use error::*;
pub use fetcher::*;
pub use manager::*;
pub use model::*;

pub mod cue;
pub mod detector;
pub mod parsers;

mod error;
mod fetcher;
mod manager;
mod model;
