//! Scripted providers shared by the integration tests.

#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use parking_lot::Mutex;
use quotelens_core::data::{
    DataError, FetchClient, MarketDataProvider, RawBar, RetryPolicy, SearchCandidate,
    SymbolSearch,
};
use quotelens_core::domain::{CompanyQuery, Interval, Period, Symbol};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// One scripted search response.
#[derive(Debug, Clone)]
pub enum SearchStep {
    Candidates(Vec<&'static str>),
    TransportError,
    HttpError(u16),
}

impl SearchStep {
    fn play(&self) -> Result<Vec<SearchCandidate>, DataError> {
        match self {
            SearchStep::Candidates(symbols) => {
                Ok(symbols.iter().map(|s| SearchCandidate::new(*s)).collect())
            }
            SearchStep::TransportError => {
                Err(DataError::NetworkUnreachable("connection reset".into()))
            }
            SearchStep::HttpError(status) => Err(DataError::HttpStatus {
                status: *status,
                endpoint: "search".into(),
            }),
        }
    }
}

/// Plays scripted responses in order, then repeats `fallback`.
pub struct ScriptedSearch {
    steps: Mutex<VecDeque<SearchStep>>,
    fallback: SearchStep,
    calls: AtomicUsize,
    queries: Mutex<Vec<String>>,
}

impl ScriptedSearch {
    pub fn new(steps: Vec<SearchStep>, fallback: SearchStep) -> Self {
        Self {
            steps: Mutex::new(steps.into()),
            fallback,
            calls: AtomicUsize::new(0),
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Always answers with the given candidates.
    pub fn answering(symbols: Vec<&'static str>) -> Self {
        Self::new(vec![], SearchStep::Candidates(symbols))
    }

    /// Never succeeds.
    pub fn failing() -> Self {
        Self::new(vec![], SearchStep::TransportError)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().clone()
    }
}

impl SymbolSearch for ScriptedSearch {
    fn name(&self) -> &str {
        "scripted_search"
    }

    fn search(&self, query: &CompanyQuery) -> Result<Vec<SearchCandidate>, DataError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.queries.lock().push(query.raw().to_string());
        let step = self
            .steps
            .lock()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());
        step.play()
    }
}

/// Scripted answer for one interval.
#[derive(Debug, Clone)]
pub enum BarsStep {
    Bars(Vec<RawBar>),
    TransportError,
}

/// Answers per interval; intervals without a script return no bars.
#[derive(Default)]
pub struct ScriptedMarketData {
    by_interval: HashMap<Interval, BarsStep>,
    delay: Option<std::time::Duration>,
    calls: Mutex<Vec<(Symbol, Period, Interval)>>,
}

impl ScriptedMarketData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, interval: Interval, step: BarsStep) -> Self {
        self.by_interval.insert(interval, step);
        self
    }

    /// Sleep this long inside every call (for concurrency tests).
    pub fn with_delay(mut self, delay: std::time::Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<(Symbol, Period, Interval)> {
        self.calls.lock().clone()
    }

    pub fn intervals_tried(&self) -> Vec<Interval> {
        self.calls.lock().iter().map(|(_, _, iv)| *iv).collect()
    }
}

impl MarketDataProvider for ScriptedMarketData {
    fn name(&self) -> &str {
        "scripted_market_data"
    }

    fn fetch_bars(
        &self,
        symbol: &Symbol,
        period: &Period,
        interval: Interval,
    ) -> Result<Vec<RawBar>, DataError> {
        self.calls
            .lock()
            .push((symbol.clone(), period.clone(), interval));
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        match self.by_interval.get(&interval) {
            Some(BarsStep::Bars(bars)) => Ok(bars.clone()),
            Some(BarsStep::TransportError) => {
                Err(DataError::NetworkUnreachable("timed out".into()))
            }
            None => Ok(Vec::new()),
        }
    }
}

pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 3, 13, 30, 0).unwrap()
}

/// `n` complete rows spaced `step_minutes` apart with closes 100, 101, ...
pub fn valid_rows(n: usize, step_minutes: i64) -> Vec<RawBar> {
    (0..n)
        .map(|i| {
            let close = 100.0 + i as f64;
            RawBar {
                timestamp: base_time() + Duration::minutes(step_minutes * i as i64),
                open: Some(close - 0.5),
                high: Some(close + 1.0),
                low: Some(close - 1.0),
                close: Some(close),
                volume: Some(10_000 + i as u64),
            }
        })
        .collect()
}

/// `n` rows that each miss at least one field.
pub fn malformed_rows(n: usize, step_minutes: i64) -> Vec<RawBar> {
    valid_rows(n, step_minutes)
        .into_iter()
        .enumerate()
        .map(|(i, mut row)| {
            match i % 3 {
                0 => row.close = None,
                1 => row.volume = None,
                _ => row.open = Some(f64::NAN),
            }
            row
        })
        .collect()
}

pub fn symbol(s: &str) -> Symbol {
    Symbol::parse(s).unwrap()
}

pub fn client(
    search: Arc<ScriptedSearch>,
    market_data: Arc<ScriptedMarketData>,
    retry: RetryPolicy,
) -> FetchClient {
    FetchClient::new(search, market_data, retry)
}
