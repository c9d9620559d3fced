//! Data management module
//!
//! Price bars, query ranges, ticker input and the fetcher contract.

pub mod bar;
pub mod fetch;
pub mod interval;
pub mod symbols;

pub use bar::*;
pub use fetch::*;
pub use interval::*;
pub use symbols::*;
