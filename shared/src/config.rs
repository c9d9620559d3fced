use dotenv::dotenv;
use std::time::Duration;

const DEFAULT_CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
const DEFAULT_SEARCH_URL: &str = "https://query2.finance.yahoo.com/v1/finance/search";

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub export_dir: String,
    pub symbols_file: String,
    pub cache_ttl_secs: u64,
    pub http_timeout_secs: u64,
    pub yahoo_chart_url: String,
    pub yahoo_search_url: String,
    pub fmp_api_key: Option<String>,
    pub eodhd_api_key: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bind_addr: "0.0.0.0:9999".to_string(),
            export_dir: "./exports".to_string(),
            symbols_file: "./symbols.csv".to_string(),
            cache_ttl_secs: 3600,
            http_timeout_secs: 30,
            yahoo_chart_url: DEFAULT_CHART_URL.to_string(),
            yahoo_search_url: DEFAULT_SEARCH_URL.to_string(),
            fmp_api_key: None,
            eodhd_api_key: None,
        }
    }
}

fn api_key(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|key| !key.trim().is_empty())
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenv().ok();
        let defaults = Config::default();

        Ok(Config {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or(defaults.bind_addr),
            export_dir: std::env::var("EXPORT_DIR").unwrap_or(defaults.export_dir),
            symbols_file: std::env::var("SYMBOLS_FILE").unwrap_or(defaults.symbols_file),
            cache_ttl_secs: std::env::var("CACHE_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.cache_ttl_secs),
            http_timeout_secs: std::env::var("HTTP_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.http_timeout_secs),
            yahoo_chart_url: std::env::var("YAHOO_CHART_URL").unwrap_or(defaults.yahoo_chart_url),
            yahoo_search_url: std::env::var("YAHOO_SEARCH_URL")
                .unwrap_or(defaults.yahoo_search_url),
            fmp_api_key: api_key("FMP_API_KEY"),
            eodhd_api_key: api_key("EODHD_API_KEY"),
        })
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}
