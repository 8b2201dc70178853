//! Parser error handling module
//!
//! Errors are collected on the tree instead of aborting the parse, so a
//! broken file still yields every statement that could be recognized.

mod codes;
mod error;

pub use codes::ErrorCode;
pub use error::SyntaxError;
