use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use shared::listings::{read_symbols_csv, Listing};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use tickerboard::config::{ExportRequest, QuerySettings};
use tickerboard::data::{looks_like_symbol, FetchError, FetchOutcome, SymbolMatch};
use tickerboard::export::{
    build_export, prepare_instruments, sheet_name, Column, CsvSink, ExportDocument,
    InstrumentData, Sheet, XlsxSink,
};
use tickerboard::stats::{QuoteOverview, SeriesStats};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::ApiError;
use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    let export_dir = PathBuf::from(&state.config.export_dir);

    Router::new()
        .route("/health", get(health))
        .route("/api/search", get(search))
        .route("/api/quote/:symbol", get(quote))
        .route("/api/instruments", post(instruments))
        .route("/api/export", post(export))
        .route(
            "/api/watchlist",
            get(list_watchlist).post(add_watchlist).delete(clear_watchlist),
        )
        .route("/api/watchlist/:symbol", delete(remove_watchlist))
        .route("/api/universe", get(universe))
        .route("/api/universe/refresh", post(refresh_universe))
        .nest_service("/exports", ServeDir::new(export_dir))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    #[serde(default)]
    q: String,
}

#[derive(Debug, Serialize)]
struct SearchResponse {
    /// The query was taken as a symbol without calling the search provider
    direct: bool,
    results: Vec<SymbolMatch>,
}

/// GET /api/search?q=: Direct symbol or provider results.
async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    let q = params.q.trim();
    if q.is_empty() {
        return Err(ApiError::BadRequest("query must not be empty".to_string()));
    }

    if looks_like_symbol(q) {
        return Ok(Json(SearchResponse {
            direct: true,
            results: vec![SymbolMatch {
                symbol: q.to_uppercase(),
                name: String::new(),
                exchange: String::new(),
            }],
        }));
    }

    let results = state.yahoo.search(q).await;
    Ok(Json(SearchResponse {
        direct: false,
        results,
    }))
}

/// GET /api/quote/:symbol: Last close and change.
async fn quote(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
) -> Result<Json<QuoteOverview>, ApiError> {
    let overview = state.yahoo.quote(&symbol.trim().to_uppercase()).await?;
    Ok(Json(overview))
}

#[derive(Debug, Serialize)]
struct InstrumentView {
    symbol: String,
    table: Sheet,
    stats: Option<SeriesStats>,
}

#[derive(Debug, Serialize)]
struct InstrumentsResponse {
    instruments: Vec<InstrumentView>,
    failures: BTreeMap<String, FetchError>,
    warnings: Vec<String>,
}

/// Validated symbols of a query, fetched through the cache.
async fn fetch_settings(
    state: &AppState,
    settings: &QuerySettings,
) -> Result<FetchOutcome, ApiError> {
    settings
        .validate()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let symbols = settings.symbols();
    if symbols.is_empty() {
        return Err(ApiError::BadRequest("no tickers given".to_string()));
    }
    Ok(state.load(&symbols, &settings.query()).await)
}

/// POST /api/instruments: Unfiltered joined table and statistics per symbol.
async fn instruments(
    State(state): State<Arc<AppState>>,
    Json(settings): Json<QuerySettings>,
) -> Result<Json<InstrumentsResponse>, ApiError> {
    let outcome = fetch_settings(&state, &settings).await?;

    let instruments = outcome
        .series
        .values()
        .map(|series| {
            let data = InstrumentData::from_series(series.clone());
            InstrumentView {
                symbol: series.symbol().to_string(),
                table: data
                    .table()
                    .to_sheet(sheet_name(series.symbol()), &Column::PRESENTATION),
                stats: SeriesStats::from_series(series).map(|s| s.rounded()),
            }
        })
        .collect();

    Ok(Json(InstrumentsResponse {
        instruments,
        failures: outcome.failures,
        warnings: outcome.warnings,
    }))
}

#[derive(Debug, Serialize)]
struct ExportResponse {
    document: ExportDocument,
    workbook: String,
    files: Vec<String>,
    failures: BTreeMap<String, FetchError>,
    warnings: Vec<String>,
}

/// POST /api/export: Build the document and write it as a workbook plus
/// CSV sheets.
async fn export(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ExportRequest>,
) -> Result<Json<ExportResponse>, ApiError> {
    let outcome = fetch_settings(&state, &request.settings).await?;

    let instruments = prepare_instruments(outcome.series.into_values());
    let document = build_export(&instruments, &request.selections());
    if document.is_empty() {
        return Err(ApiError::NotFound("nothing to show".to_string()));
    }

    let stamp = format!(
        "{}-{}",
        Utc::now().format("%Y%m%d-%H%M%S"),
        sheet_name(&request.settings.name).replace([' ', '.'], "_")
    );
    let dir = PathBuf::from(&state.config.export_dir).join(&stamp);
    XlsxSink::new(dir.join(format!("{}.xlsx", stamp))).write(&document)?;
    let paths = CsvSink::new(dir).write(&document)?;

    let workbook = format!("/exports/{}/{}.xlsx", stamp, stamp);
    let files = paths
        .iter()
        .filter_map(|p| p.file_name())
        .map(|name| format!("/exports/{}/{}", stamp, name.to_string_lossy()))
        .collect();
    info!("Export {} written ({} sheets)", stamp, document.sheets().len());

    Ok(Json(ExportResponse {
        document,
        workbook,
        files,
        failures: outcome.failures,
        warnings: outcome.warnings,
    }))
}

#[derive(Debug, Deserialize)]
struct WatchlistAdd {
    symbols: String,
}

async fn list_watchlist(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({ "symbols": state.watchlist.list().await }))
}

async fn add_watchlist(
    State(state): State<Arc<AppState>>,
    Json(body): Json<WatchlistAdd>,
) -> Json<Value> {
    let added = state.watchlist.add(&body.symbols).await;
    Json(json!({ "added": added, "symbols": state.watchlist.list().await }))
}

async fn clear_watchlist(State(state): State<Arc<AppState>>) -> Json<Value> {
    state.watchlist.clear().await;
    Json(json!({ "symbols": [] }))
}

async fn remove_watchlist(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
) -> Result<Json<Value>, ApiError> {
    if !state.watchlist.remove(&symbol).await {
        return Err(ApiError::NotFound(format!("{} is not on the watchlist", symbol)));
    }
    Ok(Json(json!({ "symbols": state.watchlist.list().await })))
}

#[derive(Debug, Deserialize)]
struct UniverseParams {
    exchange: Option<String>,
}

#[derive(Debug, Serialize)]
struct UniverseResponse {
    count: usize,
    listings: Vec<Listing>,
}

/// GET /api/universe: The stored symbol universe, optionally one exchange.
async fn universe(
    State(state): State<Arc<AppState>>,
    Query(params): Query<UniverseParams>,
) -> Result<Json<UniverseResponse>, ApiError> {
    let mut listings = read_symbols_csv(std::path::Path::new(&state.config.symbols_file))?;
    if let Some(exchange) = params.exchange.filter(|e| !e.is_empty()) {
        listings.retain(|l| l.exchange.eq_ignore_ascii_case(&exchange));
    }
    Ok(Json(UniverseResponse {
        count: listings.len(),
        listings,
    }))
}

#[derive(Debug, Default, Deserialize)]
struct RefreshRequest {
    /// Extra rows to merge, as CSV text
    user_csv: Option<String>,
    /// EODHD exchange codes; all exchanges when absent
    exchanges: Option<Vec<String>>,
}

/// POST /api/universe/refresh: Rebuild the symbol universe file.
async fn refresh_universe(
    State(state): State<Arc<AppState>>,
    body: Option<Json<RefreshRequest>>,
) -> Result<Json<Value>, ApiError> {
    let request = body.map(|Json(r)| r).unwrap_or_default();
    let listings = state
        .listings
        .refresh(
            std::path::Path::new(&state.config.symbols_file),
            request.user_csv.as_deref(),
            request.exchanges.as_deref(),
        )
        .await
        .map_err(|e| ApiError::Upstream(format!("{:#}", e)))?;

    Ok(Json(json!({
        "count": listings.len(),
        "file": state.config.symbols_file,
    })))
}
