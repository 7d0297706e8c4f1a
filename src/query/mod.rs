//! Query wire types
//!
//! Defines the filter payload sent to the API and the response envelopes it
//! returns for queries, dataset listings and ticker listings.

mod request;
mod response;

pub use request::{Filter, Request};
pub use response::*;
