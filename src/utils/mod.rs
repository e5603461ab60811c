// Utility functions
pub mod error;
pub mod json;
pub mod oid;
pub mod paging;

pub use error::*;
pub use json::*;
pub use oid::*;
pub use paging::*;
