//! Feature modules.
//!
//! - [`catalog`]: Generic catalog API served under `/v1/{family}`

pub mod catalog;
