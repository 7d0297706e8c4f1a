//! Search orchestration module
//!
//! Runs configured searches against the API, concurrently across a fixed
//! pool of workers, and reports one outcome per enabled search.

mod dispatcher;
mod executor;
mod models;
pub mod split;

pub use dispatcher::Dispatcher;
pub use executor::{SearchExecutor, SearchRunner};
pub use models::*;
