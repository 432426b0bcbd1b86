//! Shared utilities.
//!
//! - [`errors`]: Application error type and its JSON response

pub mod errors;
