pub mod cache;
pub mod config;
pub mod listings;
pub mod watchlist;
pub mod yahoo;

pub use cache::{QueryKey, TtlCache};
pub use config::Config;
pub use listings::{Listing, ListingsClient};
pub use watchlist::Watchlist;
pub use yahoo::YahooClient;
