//! Aggregation and export
//!
//! Joins each instrument's bars with its indicators, applies column
//! selection and assembles a document of named sheets plus a summary.

pub mod builder;
pub mod column;
pub mod document;
pub mod sink;
pub mod table;

pub use builder::*;
pub use column::*;
pub use document::*;
pub use sink::*;
pub use table::*;
