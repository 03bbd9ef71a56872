//! Runtime settings read from the environment, plus fixed constants.

mod constants;
mod settings;

pub use constants::*;
pub use settings::{Config, DatabaseSource};
