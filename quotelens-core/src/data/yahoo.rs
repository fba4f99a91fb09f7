//! Yahoo Finance provider.
//!
//! Symbol search goes through the v1 search API; bars come from the v8 chart
//! API using `range` + `interval`. Each call is one HTTP attempt over a
//! shared, explicitly constructed blocking client.
//!
//! Yahoo Finance has no official API and is subject to unannounced format changes.

use super::provider::{DataError, MarketDataProvider, RawBar, SearchCandidate, SymbolSearch};
use crate::config::ProviderConfig;
use crate::domain::{CompanyQuery, Interval, Period, Symbol};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Yahoo Finance v1 search API response.
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    quotes: Option<Vec<SearchQuote>>,
}

#[derive(Debug, Deserialize)]
struct SearchQuote {
    symbol: Option<String>,
}

/// Yahoo Finance v8 chart API response.
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct QuoteData {
    open: Vec<Option<f64>>,
    high: Vec<Option<f64>>,
    low: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
    volume: Vec<Option<u64>>,
}

/// Yahoo Finance search + chart provider.
pub struct YahooProvider {
    client: reqwest::blocking::Client,
    search_url: String,
    chart_url: String,
    quotes_count: u32,
}

impl YahooProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self, DataError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| DataError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            search_url: config.search_url.trim_end_matches('/').to_string(),
            chart_url: config.chart_url.trim_end_matches('/').to_string(),
            quotes_count: config.quotes_count,
        })
    }

    fn send(
        &self,
        request: reqwest::blocking::RequestBuilder,
        endpoint: &str,
    ) -> Result<reqwest::blocking::Response, DataError> {
        let resp = request
            .send()
            .map_err(|e| DataError::NetworkUnreachable(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(DataError::HttpStatus {
                status: status.as_u16(),
                endpoint: endpoint.to_string(),
            });
        }
        Ok(resp)
    }

    /// Convert the chart payload into raw rows. Holes stay `None`.
    fn parse_chart(symbol: &Symbol, resp: ChartResponse) -> Result<Vec<RawBar>, DataError> {
        let Some(result) = resp.chart.result else {
            return match resp.chart.error {
                // Unknown symbol or unsupported range/interval: no data, not a fault.
                Some(err) if err.code == "Not Found" || err.code == "Bad Request" => {
                    debug!(%symbol, code = %err.code, "chart returned no data: {}", err.description);
                    Ok(Vec::new())
                }
                Some(err) => Err(DataError::ResponseFormatChanged(format!(
                    "{}: {}",
                    err.code, err.description
                ))),
                None => Err(DataError::ResponseFormatChanged(
                    "empty result with no error".into(),
                )),
            };
        };

        let Some(data) = result.into_iter().next() else {
            return Ok(Vec::new());
        };
        // Yahoo omits `timestamp` entirely when the range holds no bars.
        let timestamps = data.timestamp.unwrap_or_default();
        let quote = data.indicators.quote.into_iter().next().unwrap_or_default();

        timestamps
            .iter()
            .enumerate()
            .map(|(i, &ts)| {
                let timestamp = chrono::DateTime::from_timestamp(ts, 0).ok_or_else(|| {
                    DataError::ResponseFormatChanged(format!("invalid timestamp: {ts}"))
                })?;
                Ok(RawBar {
                    timestamp,
                    open: quote.open.get(i).copied().flatten(),
                    high: quote.high.get(i).copied().flatten(),
                    low: quote.low.get(i).copied().flatten(),
                    close: quote.close.get(i).copied().flatten(),
                    volume: quote.volume.get(i).copied().flatten(),
                })
            })
            .collect()
    }

    fn parse_search(resp: SearchResponse) -> Vec<SearchCandidate> {
        resp.quotes
            .unwrap_or_default()
            .into_iter()
            .filter_map(|q| q.symbol.map(SearchCandidate::new))
            .collect()
    }
}

impl SymbolSearch for YahooProvider {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    fn search(&self, query: &CompanyQuery) -> Result<Vec<SearchCandidate>, DataError> {
        let count = self.quotes_count.to_string();
        let request = self.client.get(&self.search_url).query(&[
            ("q", query.raw().trim()),
            ("quotesCount", count.as_str()),
            ("newsCount", "0"),
        ]);
        let resp = self.send(request, &self.search_url)?;
        let body: SearchResponse = resp.json().map_err(|e| {
            DataError::ResponseFormatChanged(format!("failed to parse search response: {e}"))
        })?;
        Ok(Self::parse_search(body))
    }
}

impl MarketDataProvider for YahooProvider {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    fn fetch_bars(
        &self,
        symbol: &Symbol,
        period: &Period,
        interval: Interval,
    ) -> Result<Vec<RawBar>, DataError> {
        let url = format!("{}/{}", self.chart_url, symbol);
        let request = self.client.get(&url).query(&[
            ("range", period.as_str()),
            ("interval", interval.as_str()),
            ("includePrePost", "false"),
        ]);
        let resp = match self.send(request, &url) {
            // The chart API answers 404 with a JSON error body for unknown symbols.
            Err(DataError::HttpStatus { status: 404, .. }) => return Ok(Vec::new()),
            other => other?,
        };
        let chart: ChartResponse = resp.json().map_err(|e| {
            DataError::ResponseFormatChanged(format!(
                "failed to parse chart response for {symbol}: {e}"
            ))
        })?;
        Self::parse_chart(symbol, chart)
    }
}
