//! Listed-symbol universe
//!
//! Built from the Nasdaq Trader symbol directories, optionally the EOD
//! Historical Data and Financial Modeling Prep lists, and any user supplied
//! CSV. The merged list is
//! written to a `symbol,company,exchange` CSV.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

pub const NASDAQ_TRADER_BASE: &str = "https://ftp.nasdaqtrader.com/dynamic/SymSymbolDirectory/";
const FMP_STOCK_LIST: &str = "https://financialmodelingprep.com/api/v3/stock/list";
const EODHD_BASE: &str = "https://eodhistoricaldata.com/api/";
const CREATION_TIME_MARKER: &str = "File Creation Time";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    pub symbol: String,
    pub company: String,
    pub exchange: String,
}

impl Listing {
    pub fn new(
        symbol: impl Into<String>,
        company: impl Into<String>,
        exchange: impl Into<String>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            company: company.into(),
            exchange: exchange.into(),
        }
    }
}

fn exchange_name(code: &str) -> String {
    match code.trim() {
        "N" => "NYSE".to_string(),
        "A" => "AMEX".to_string(),
        other => other.to_string(),
    }
}

/// Parse a pipe separated Nasdaq Trader directory file.
///
/// `nasdaqlisted.txt` has no exchange column; its rows get `default_exchange`.
/// `otherlisted.txt` names its symbol column `ACT Symbol`.
pub fn parse_nasdaq_directory(text: &str, default_exchange: &str) -> Result<Vec<Listing>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'|')
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader.headers().context("Missing directory header")?.clone();
    let find = |name: &str| headers.iter().position(|h| h.trim() == name);
    let symbol_col = find("Symbol").or_else(|| find("ACT Symbol"));
    let (Some(symbol_idx), Some(name_idx)) = (symbol_col, find("Security Name")) else {
        warn!("Directory file without Symbol/Security Name columns");
        return Ok(Vec::new());
    };
    let exchange_idx = find("Exchange");

    let mut listings = Vec::new();
    for record in reader.records() {
        let record = record.context("Malformed directory row")?;
        let symbol = record.get(symbol_idx).unwrap_or_default();
        if symbol.starts_with(CREATION_TIME_MARKER) {
            continue;
        }
        let exchange = match exchange_idx.and_then(|i| record.get(i)) {
            Some(code) => exchange_name(code),
            None => default_exchange.to_string(),
        };
        listings.push(Listing::new(
            symbol,
            record.get(name_idx).unwrap_or_default(),
            exchange,
        ));
    }
    Ok(listings)
}

/// Read a user CSV with loosely named headers.
///
/// Headers are trimmed and lower-cased; `ticker`, `name`, `companyname`,
/// `securityname` and `market` are accepted as aliases. Missing columns are
/// left empty.
pub fn read_user_csv<R: Read>(reader: R) -> Result<Vec<Listing>> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = reader.headers().context("Missing CSV header")?.clone();

    let mut symbol_idx = None;
    let mut company_idx = None;
    let mut exchange_idx = None;
    for (i, header) in headers.iter().enumerate() {
        match header.trim().to_lowercase().as_str() {
            "symbol" | "ticker" => symbol_idx = symbol_idx.or(Some(i)),
            "company" | "name" | "companyname" | "securityname" => {
                company_idx = company_idx.or(Some(i))
            }
            "exchange" | "market" => exchange_idx = exchange_idx.or(Some(i)),
            _ => {}
        }
    }

    let field = |record: &csv::StringRecord, idx: Option<usize>| {
        idx.and_then(|i| record.get(i)).unwrap_or_default().to_string()
    };

    let mut listings = Vec::new();
    for record in reader.records() {
        let record = record.context("Malformed CSV row")?;
        listings.push(Listing {
            symbol: field(&record, symbol_idx),
            company: field(&record, company_idx),
            exchange: field(&record, exchange_idx),
        });
    }
    Ok(listings)
}

/// Trim fields, drop empty symbols, keep the first of each
/// (symbol, exchange) pair and sort by exchange then symbol.
pub fn normalize(listings: Vec<Listing>) -> Vec<Listing> {
    let mut seen = HashSet::new();
    let mut out: Vec<Listing> = listings
        .into_iter()
        .map(|l| Listing::new(l.symbol.trim(), l.company.trim(), l.exchange.trim()))
        .filter(|l| !l.symbol.is_empty())
        .filter(|l| seen.insert((l.symbol.clone(), l.exchange.clone())))
        .collect();
    out.sort_by(|a, b| (&a.exchange, &a.symbol).cmp(&(&b.exchange, &b.symbol)));
    out
}

/// Merge user rows into a base list. An unreadable user file leaves the base
/// list untouched.
pub fn merge_user_csv<R: Read>(base: Vec<Listing>, user: R) -> Vec<Listing> {
    match read_user_csv(user) {
        Ok(rows) => {
            info!("Merging {} user listings", rows.len());
            let mut all = base;
            all.extend(rows);
            normalize(all)
        }
        Err(e) => {
            warn!("Ignoring user CSV: {:#}", e);
            base
        }
    }
}

pub fn write_symbols_csv(path: &Path, listings: &[Listing]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    if listings.is_empty() {
        writer.write_record(["symbol", "company", "exchange"])?;
    }
    for listing in listings {
        writer.serialize(listing)?;
    }
    writer.flush()?;
    info!("Wrote {} listings to {}", listings.len(), path.display());
    Ok(())
}

/// Load a previously written universe file; a missing file is an empty universe.
pub fn read_symbols_csv(path: &Path) -> Result<Vec<Listing>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    reader
        .deserialize()
        .collect::<Result<Vec<Listing>, _>>()
        .with_context(|| format!("Failed to read {}", path.display()))
}

#[derive(Debug, Deserialize)]
struct FmpStock {
    symbol: Option<String>,
    name: Option<String>,
    #[serde(rename = "exchangeShortName")]
    exchange_short_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EodhdExchange {
    #[serde(rename = "Code")]
    code: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EodhdSymbol {
    #[serde(rename = "Code")]
    code: Option<String>,
    #[serde(rename = "Name")]
    name: Option<String>,
}

/// Exchange codes to download: every available code, or only the requested
/// ones that EODHD actually lists.
pub fn select_exchange_codes(available: &[String], wanted: Option<&[String]>) -> Vec<String> {
    let wanted: Vec<&str> = wanted
        .unwrap_or_default()
        .iter()
        .map(|code| code.trim())
        .filter(|code| !code.is_empty())
        .collect();
    available
        .iter()
        .filter(|code| wanted.is_empty() || wanted.contains(&code.as_str()))
        .cloned()
        .collect()
}

/// Decode one EODHD exchange symbol list. Every row is tagged with `code`.
pub fn eodhd_listings(code: &str, body: &str) -> Result<Vec<Listing>> {
    let symbols: Vec<EodhdSymbol> = serde_json::from_str(body)
        .with_context(|| format!("Failed to decode EODHD symbol list for {}", code))?;
    Ok(symbols
        .into_iter()
        .filter_map(|s| {
            let symbol = s.code?;
            Some(Listing::new(symbol, s.name.unwrap_or_default(), code))
        })
        .collect())
}

/// Fold one source's result into the running list. A failing source is
/// logged and skipped.
fn absorb(listings: &mut Vec<Listing>, source: &str, result: Result<Option<Vec<Listing>>>) {
    match result {
        Ok(Some(rows)) => {
            info!("Loaded {} {} listings", rows.len(), source);
            listings.extend(rows);
        }
        Ok(None) => {}
        Err(e) => warn!("{} listings unavailable: {:#}", source, e),
    }
}

#[derive(Debug, Clone)]
pub struct ListingsClient {
    client: reqwest::Client,
    fmp_api_key: Option<String>,
    eodhd_api_key: Option<String>,
    nasdaq_base: String,
}

impl ListingsClient {
    pub fn new(
        fmp_api_key: Option<String>,
        eodhd_api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            client,
            fmp_api_key,
            eodhd_api_key,
            nasdaq_base: NASDAQ_TRADER_BASE.to_string(),
        })
    }

    /// Read the Nasdaq Trader directories from another base URL.
    pub fn with_nasdaq_base(mut self, base: impl Into<String>) -> Self {
        self.nasdaq_base = base.into();
        self
    }

    async fn get_text(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("GET {}", url))?;
        Ok(response.error_for_status()?.text().await?)
    }

    /// NASDAQ, NYSE and AMEX listings from the Nasdaq Trader directories.
    pub async fn fetch_us_listings(&self) -> Result<Vec<Listing>> {
        let nasdaq = self
            .get_text(&format!("{}nasdaqlisted.txt", self.nasdaq_base))
            .await?;
        let other = self
            .get_text(&format!("{}otherlisted.txt", self.nasdaq_base))
            .await?;

        let mut all = parse_nasdaq_directory(&nasdaq, "NASDAQ")?;
        all.extend(parse_nasdaq_directory(&other, "")?);
        Ok(normalize(all))
    }

    /// Financial Modeling Prep stock list; `None` when no API key is configured.
    pub async fn fetch_fmp_listings(&self) -> Result<Option<Vec<Listing>>> {
        let Some(key) = &self.fmp_api_key else {
            return Ok(None);
        };
        let stocks: Vec<FmpStock> = self
            .client
            .get(FMP_STOCK_LIST)
            .query(&[("apikey", key)])
            .send()
            .await
            .context("GET FMP stock list")?
            .error_for_status()?
            .json()
            .await
            .context("Failed to decode FMP stock list")?;

        let listings = stocks
            .into_iter()
            .map(|s| {
                Listing::new(
                    s.symbol.unwrap_or_default(),
                    s.name.unwrap_or_default(),
                    s.exchange_short_name.unwrap_or_default(),
                )
            })
            .collect();
        Ok(Some(normalize(listings)))
    }

    /// EOD Historical Data symbol lists, optionally limited to some exchange
    /// codes. `None` when no API key is configured.
    ///
    /// Without a filter every exchange is downloaded, which is large.
    /// Exchanges whose list cannot be read are skipped.
    pub async fn fetch_eodhd_listings(
        &self,
        exchanges: Option<&[String]>,
    ) -> Result<Option<Vec<Listing>>> {
        let Some(key) = &self.eodhd_api_key else {
            return Ok(None);
        };
        let available: Vec<EodhdExchange> = self
            .client
            .get(format!("{}exchanges-list/", EODHD_BASE))
            .query(&[("fmt", "json"), ("api_token", key.as_str())])
            .send()
            .await
            .context("GET EODHD exchange list")?
            .error_for_status()?
            .json()
            .await
            .context("Failed to decode EODHD exchange list")?;
        let available: Vec<String> = available.into_iter().filter_map(|e| e.code).collect();

        let mut listings = Vec::new();
        for code in select_exchange_codes(&available, exchanges) {
            let response = self
                .client
                .get(format!("{}exchange-symbol-list/{}", EODHD_BASE, code))
                .query(&[("api_token", key.as_str()), ("fmt", "json")])
                .send()
                .await;
            let body = match response {
                Ok(r) if r.status().is_success() => r.text().await.unwrap_or_default(),
                Ok(r) => {
                    warn!("EODHD {} returned {}", code, r.status());
                    continue;
                }
                Err(e) => {
                    warn!("EODHD {} unavailable: {}", code, e);
                    continue;
                }
            };
            match eodhd_listings(&code, &body) {
                Ok(rows) => listings.extend(rows),
                Err(e) => warn!("{:#}", e),
            }
        }
        Ok(Some(normalize(listings)))
    }

    /// Rebuild the universe file from every configured source plus an
    /// optional user CSV, returning the written listings.
    ///
    /// Sources fail independently. The file is only rewritten when at least
    /// one row was produced, so a total outage keeps the previous universe.
    pub async fn refresh(
        &self,
        symbols_file: &Path,
        user_csv: Option<&str>,
        eodhd_exchanges: Option<&[String]>,
    ) -> Result<Vec<Listing>> {
        let mut listings = Vec::new();
        absorb(&mut listings, "US", self.fetch_us_listings().await.map(Some));
        absorb(
            &mut listings,
            "EODHD",
            self.fetch_eodhd_listings(eodhd_exchanges).await,
        );
        absorb(&mut listings, "FMP", self.fetch_fmp_listings().await);
        let mut listings = normalize(listings);

        if let Some(csv_text) = user_csv {
            listings = merge_user_csv(listings, csv_text.as_bytes());
        }
        if listings.is_empty() {
            bail!("No listing source produced any rows");
        }

        write_symbols_csv(symbols_file, &listings)?;
        Ok(listings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NASDAQ_LISTED: &str = "Symbol|Security Name|Market Category|Test Issue|Financial Status|Round Lot Size|ETF|NextShares
AAPL|Apple Inc. - Common Stock|Q|N|N|100|N|N
MSFT|Microsoft Corporation - Common Stock|Q|N|N|100|N|N
File Creation Time: 0919202418:00|||||||
";

    const OTHER_LISTED: &str = "ACT Symbol|Security Name|Exchange|CQS Symbol|ETF|Round Lot Size|Test Issue|NASDAQ Symbol
IBM|International Business Machines Corporation Common Stock|N|IBM|N|100|N|IBM
BTG|B2Gold Corp Common shares (Canada)|A|BTG|N|100|N|BTG
SPY|SPDR S&P 500 ETF Trust|P|SPY|Y|100|N|SPY
File Creation Time: 0919202418:00|||||||
";

    #[test]
    fn test_parse_nasdaq_listed_drops_trailer() {
        let listings = parse_nasdaq_directory(NASDAQ_LISTED, "NASDAQ").unwrap();
        assert_eq!(listings.len(), 2);
        assert_eq!(
            listings[0],
            Listing::new("AAPL", "Apple Inc. - Common Stock", "NASDAQ")
        );
    }

    #[test]
    fn test_directory_without_symbol_column_is_skipped() {
        let text = "Code|Security Name\nX|Something\n";
        assert!(parse_nasdaq_directory(text, "").unwrap().is_empty());
    }

    #[test]
    fn test_exchange_codes_are_expanded() {
        let listings = parse_nasdaq_directory(OTHER_LISTED, "").unwrap();
        assert_eq!(listings[0].symbol, "IBM");
        let exchanges: Vec<&str> = listings.iter().map(|l| l.exchange.as_str()).collect();
        assert_eq!(exchanges, vec!["NYSE", "AMEX", "P"]);
    }

    #[test]
    fn test_normalize_dedupes_and_sorts() {
        let listings = normalize(vec![
            Listing::new(" MSFT ", "Microsoft", "NASDAQ"),
            Listing::new("IBM", "IBM", "NYSE"),
            Listing::new("AAPL", "Apple", "NASDAQ"),
            Listing::new("MSFT", "Duplicate", "NASDAQ"),
            Listing::new("", "No symbol", "NYSE"),
            Listing::new("MSFT", "Other venue", "XETRA"),
        ]);
        let keys: Vec<(&str, &str)> = listings
            .iter()
            .map(|l| (l.exchange.as_str(), l.symbol.as_str()))
            .collect();
        assert_eq!(
            keys,
            vec![("NASDAQ", "AAPL"), ("NASDAQ", "MSFT"), ("NYSE", "IBM"), ("XETRA", "MSFT")]
        );
        assert_eq!(listings[1].company, "Microsoft");
    }

    #[test]
    fn test_user_csv_header_aliases() {
        let csv_text = " Ticker ,CompanyName,Market\nTHYAO.IS,Turk Hava Yollari,BIST\nASELS.IS,,BIST\n";
        let rows = read_user_csv(csv_text.as_bytes()).unwrap();
        assert_eq!(rows[0], Listing::new("THYAO.IS", "Turk Hava Yollari", "BIST"));
        assert_eq!(rows[1].company, "");

        let only_symbols = read_user_csv("symbol\n7203.T\n".as_bytes()).unwrap();
        assert_eq!(only_symbols, vec![Listing::new("7203.T", "", "")]);
    }

    #[test]
    fn test_merge_user_csv() {
        let base = vec![Listing::new("AAPL", "Apple", "NASDAQ")];
        let merged = merge_user_csv(base, "ticker,name,exchange\nAAPL,Apple again,NASDAQ\nSAP.DE,SAP,XETRA\n".as_bytes());
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].company, "Apple");
    }

    #[test]
    fn test_symbols_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("symbols.csv");
        assert!(read_symbols_csv(&path).unwrap().is_empty());

        let listings = vec![
            Listing::new("AAPL", "Apple, Inc.", "NASDAQ"),
            Listing::new("IBM", "IBM", "NYSE"),
        ];
        write_symbols_csv(&path, &listings).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("symbol,company,exchange\n"));
        assert_eq!(read_symbols_csv(&path).unwrap(), listings);
    }

    #[test]
    fn test_select_exchange_codes() {
        let available: Vec<String> = ["US", "BIST", "XETRA"].iter().map(|s| s.to_string()).collect();
        assert_eq!(select_exchange_codes(&available, None), available);

        let wanted = vec![" BIST".to_string(), "HKEX".to_string()];
        assert_eq!(select_exchange_codes(&available, Some(&wanted)), vec!["BIST"]);
        assert_eq!(select_exchange_codes(&available, Some(&[])), available);
    }

    #[test]
    fn test_eodhd_listings_tag_exchange_code() {
        let body = r#"[
            {"Code": "THYAO", "Name": "Turk Hava Yollari", "Country": "Turkey", "Type": "Common Stock"},
            {"Code": "ASELS", "Name": null},
            {"Name": "No code"}
        ]"#;
        let listings = eodhd_listings("BIST", body).unwrap();
        assert_eq!(
            listings,
            vec![
                Listing::new("THYAO", "Turk Hava Yollari", "BIST"),
                Listing::new("ASELS", "", "BIST"),
            ]
        );
        assert!(eodhd_listings("BIST", "{\"error\": 1}").is_err());
    }

    // Nothing listens on the discard port, so the US directories fail fast.
    fn offline_client() -> ListingsClient {
        ListingsClient::new(None, None, Duration::from_secs(2))
            .unwrap()
            .with_nasdaq_base("http://127.0.0.1:9/")
    }

    #[tokio::test]
    async fn test_refresh_survives_us_outage_with_user_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("symbols.csv");

        let listings = offline_client()
            .refresh(&path, Some("symbol,company,exchange\nTHYAO.IS,THY,BIST\n"), None)
            .await
            .unwrap();
        assert_eq!(listings, vec![Listing::new("THYAO.IS", "THY", "BIST")]);
        assert_eq!(read_symbols_csv(&path).unwrap(), listings);
    }

    #[tokio::test]
    async fn test_refresh_without_any_rows_keeps_previous_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("symbols.csv");
        let previous = vec![Listing::new("AAPL", "Apple", "NASDAQ")];
        write_symbols_csv(&path, &previous).unwrap();

        assert!(offline_client().refresh(&path, None, None).await.is_err());
        assert_eq!(read_symbols_csv(&path).unwrap(), previous);
    }
}
