use shared::{Config, ListingsClient, QueryKey, TtlCache, Watchlist, YahooClient};
use std::sync::Arc;
use tickerboard::data::{FetchOutcome, PriceQuery};

/// Shared application state, passed to handlers via `State`.
pub struct AppState {
    pub config: Config,
    pub yahoo: YahooClient,
    pub listings: ListingsClient,
    pub cache: TtlCache<QueryKey, FetchOutcome>,
    pub watchlist: Watchlist,
}

impl AppState {
    pub fn new(config: Config) -> Result<Arc<Self>, anyhow::Error> {
        let yahoo = YahooClient::from_config(&config)?;
        let listings = ListingsClient::new(
            config.fmp_api_key.clone(),
            config.eodhd_api_key.clone(),
            config.http_timeout(),
        )?;
        let cache = TtlCache::new(config.cache_ttl());

        Ok(Arc::new(AppState {
            config,
            yahoo,
            listings,
            cache,
            watchlist: Watchlist::new(),
        }))
    }

    /// Fetch a query through the cache. Outcomes with failures are not
    /// cached so a transient error is retried on the next request.
    pub async fn load(&self, symbols: &[String], query: &PriceQuery) -> FetchOutcome {
        let key = QueryKey::new(symbols, query);
        self.cache
            .get_or_insert_with(
                key,
                || self.yahoo.fetch_all(symbols, query),
                |outcome| outcome.failures.is_empty(),
            )
            .await
    }
}
