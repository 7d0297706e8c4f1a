//! Authentication module
//!
//! Obtains the token used by every data call, reusing a locally cached one
//! until it expires.

mod store;
mod token;

pub use store::TokenStore;
pub use token::{Credential, EXPIRES_FORMAT};
