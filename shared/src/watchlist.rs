use tickerboard::data::parse_tickers;
use tokio::sync::RwLock;

/// Symbols pinned by the user, in insertion order.
#[derive(Debug, Default)]
pub struct Watchlist {
    symbols: RwLock<Vec<String>>,
}

impl Watchlist {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn list(&self) -> Vec<String> {
        self.symbols.read().await.clone()
    }

    /// Add every ticker in free-form input, returning the ones that were new.
    pub async fn add(&self, raw: &str) -> Vec<String> {
        let mut symbols = self.symbols.write().await;
        let mut added = Vec::new();
        for ticker in parse_tickers(raw) {
            if !symbols.contains(&ticker) {
                symbols.push(ticker.clone());
                added.push(ticker);
            }
        }
        added
    }

    pub async fn remove(&self, symbol: &str) -> bool {
        let symbol = symbol.trim().to_uppercase();
        let mut symbols = self.symbols.write().await;
        let before = symbols.len();
        symbols.retain(|s| *s != symbol);
        symbols.len() != before
    }

    pub async fn clear(&self) {
        self.symbols.write().await.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_watchlist() {
        let watchlist = Watchlist::new();
        assert_eq!(watchlist.add("aapl, msft").await, vec!["AAPL", "MSFT"]);
        assert_eq!(watchlist.add("MSFT;thyao.is").await, vec!["THYAO.IS"]);
        assert_eq!(watchlist.list().await, vec!["AAPL", "MSFT", "THYAO.IS"]);

        assert!(watchlist.remove("msft").await);
        assert!(!watchlist.remove("MSFT").await);
        assert_eq!(watchlist.list().await, vec!["AAPL", "THYAO.IS"]);

        watchlist.clear().await;
        assert!(watchlist.list().await.is_empty());
    }
}
