//! Configuration module

pub mod query;

pub use query::*;
