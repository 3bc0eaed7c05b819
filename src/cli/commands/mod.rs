//! CLI command implementations.

mod ask;
mod config;
mod doctor;
mod inspect;
mod search;
mod serve;

pub use ask::run_ask;
pub use config::run_config;
pub use doctor::run_doctor;
pub use inspect::run_inspect;
pub use search::{run_popular, run_search};
pub use serve::run_serve;
