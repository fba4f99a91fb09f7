//! Cache layer behavior through `QuoteService` and `TtlCache`.

mod common;

use common::*;
use quotelens_core::config::{CachePolicy, CoreConfig};
use quotelens_core::data::{
    CancelToken, LookupMiss, QuoteService, RetryPolicy, SeriesOutcome, SymbolLookup, TtlCache,
};
use quotelens_core::domain::{CompanyQuery, Interval, Period};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

struct Harness {
    service: QuoteService,
    search: Arc<ScriptedSearch>,
    market: Arc<ScriptedMarketData>,
}

fn harness(search: ScriptedSearch, market: ScriptedMarketData, config: CoreConfig) -> Harness {
    let search = Arc::new(search);
    let market = Arc::new(market);
    let client = client(
        Arc::clone(&search),
        Arc::clone(&market),
        RetryPolicy::immediate(3),
    );
    Harness {
        service: QuoteService::new(client, &config),
        search,
        market,
    }
}

fn daily_market() -> ScriptedMarketData {
    ScriptedMarketData::new().with(Interval::OneDay, BarsStep::Bars(valid_rows(30, 60 * 24)))
}

#[test]
fn repeated_resolution_hits_cache() {
    let h = harness(
        ScriptedSearch::answering(vec!["TSLA"]),
        daily_market(),
        CoreConfig::default(),
    );

    let first = h.service.resolve_symbol_cached(&CompanyQuery::new("Tesla Inc"));
    let second = h.service.resolve_symbol_cached(&CompanyQuery::new("  tesla   INC "));

    assert_eq!(first, second);
    assert_eq!(first.symbol().unwrap().as_str(), "TSLA");
    assert_eq!(h.search.calls(), 1);
    let stats = h.service.ticker_cache_stats();
    assert_eq!((stats.hits, stats.misses), (1, 1));
}

#[test]
fn not_found_is_cached() {
    let h = harness(
        ScriptedSearch::answering(vec![]),
        daily_market(),
        CoreConfig::default(),
    );

    for _ in 0..3 {
        let lookup = h.service.resolve_symbol_cached(&CompanyQuery::new("Nonexistent Widgets"));
        assert_eq!(
            lookup,
            SymbolLookup::NotFound {
                miss: LookupMiss::NoMatch
            }
        );
    }
    assert_eq!(h.search.calls(), 1);
}

#[test]
fn exhausted_transport_miss_is_cached() {
    let h = harness(ScriptedSearch::failing(), daily_market(), CoreConfig::default());

    h.service.resolve_symbol_cached(&CompanyQuery::new("Tesla"));
    h.service.resolve_symbol_cached(&CompanyQuery::new("Tesla"));
    assert_eq!(h.search.calls(), 3);
}

#[test]
fn cancelled_resolution_is_not_cached() {
    let h = harness(
        ScriptedSearch::answering(vec!["TSLA"]),
        daily_market(),
        CoreConfig::default(),
    );
    let cancel = CancelToken::new();
    cancel.cancel();

    let cancelled = h
        .service
        .resolve_symbol_cancellable(&CompanyQuery::new("Tesla"), &cancel);
    assert_eq!(
        cancelled,
        SymbolLookup::NotFound {
            miss: LookupMiss::Cancelled
        }
    );

    let resolved = h.service.resolve_symbol_cached(&CompanyQuery::new("Tesla"));
    assert!(resolved.is_found());
    assert_eq!(h.search.calls(), 1);
}

#[test]
fn repeated_series_fetch_hits_cache() {
    let h = harness(
        ScriptedSearch::failing(),
        daily_market(),
        CoreConfig::default(),
    );
    let sym = symbol("TSLA");

    let a = h.service.fetch_series_cached(&sym, &Period::OneMonth);
    let b = h.service.fetch_series_cached(&sym, &Period::OneMonth);
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(a.series().unwrap().len(), 30);
    assert_eq!(h.market.calls().len(), 1);
    let stats = h.service.series_cache_stats();
    assert_eq!((stats.hits, stats.misses, stats.len), (1, 1, 1));

    // A different period is a different key.
    h.service.fetch_series_cached(&sym, &Period::ThreeMonths);
    assert_eq!(h.market.calls().len(), 2);
}

#[test]
fn empty_series_is_cached() {
    let h = harness(
        ScriptedSearch::failing(),
        ScriptedMarketData::new(),
        CoreConfig::default(),
    );
    let sym = symbol("ZZZZ");

    let first = h.service.fetch_series_cached(&sym, &Period::FiveDays);
    assert_eq!(
        *first,
        SeriesOutcome::Empty {
            last_interval: Interval::OneHour
        }
    );
    h.service.fetch_series_cached(&sym, &Period::FiveDays);
    assert_eq!(h.market.calls().len(), 4);
}

#[test]
fn series_entries_expire_after_ttl() {
    let mut config = CoreConfig::default();
    config.cache.series = CachePolicy {
        ttl_secs: 0,
        capacity: 10,
    };
    let h = harness(ScriptedSearch::failing(), daily_market(), config);
    let sym = symbol("TSLA");

    h.service.fetch_series_cached(&sym, &Period::OneMonth);
    h.service.fetch_series_cached(&sym, &Period::OneMonth);
    assert_eq!(h.market.calls().len(), 2);
}

#[test]
fn capacity_two_evicts_first_key() {
    let cache: TtlCache<&str, usize> = TtlCache::new("test", Duration::from_secs(60), 2);
    let computes = AtomicUsize::new(0);
    let compute = |v: usize| {
        computes.fetch_add(1, Ordering::SeqCst);
        v
    };

    cache.get_or_fetch("A", || compute(1));
    cache.get_or_fetch("B", || compute(2));
    cache.get_or_fetch("C", || compute(3));
    assert_eq!(computes.load(Ordering::SeqCst), 3);

    // A was evicted when C arrived: this lookup is a miss.
    assert_eq!(*cache.get_or_fetch("A", || compute(10)), 10);
    assert_eq!(computes.load(Ordering::SeqCst), 4);
    assert_eq!(cache.stats().misses, 4);
}

#[test]
fn ticker_cache_capacity_applies_to_service() {
    let mut config = CoreConfig::default();
    config.cache.ticker = CachePolicy {
        ttl_secs: 3600,
        capacity: 2,
    };
    let h = harness(
        ScriptedSearch::answering(vec!["XYZ"]),
        daily_market(),
        config,
    );

    for name in ["alpha", "beta", "gamma", "alpha"] {
        h.service.resolve_symbol_cached(&CompanyQuery::new(name));
    }
    assert_eq!(h.search.calls(), 4);
    assert_eq!(h.service.ticker_cache_stats().len, 2);
}

#[test]
fn concurrent_misses_on_one_key_fetch_once() {
    let h = Arc::new(harness(
        ScriptedSearch::failing(),
        daily_market().with_delay(Duration::from_millis(50)),
        CoreConfig::default(),
    ));
    let sym = symbol("TSLA");

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let h = Arc::clone(&h);
            let sym = sym.clone();
            std::thread::spawn(move || {
                h.service
                    .fetch_series_cached(&sym, &Period::OneMonth)
                    .series()
                    .map(|s| s.len())
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), Some(30));
    }
    assert_eq!(h.market.calls().len(), 1);
}

#[test]
fn indicators_from_cached_series() {
    let h = harness(
        ScriptedSearch::answering(vec!["TSLA"]),
        daily_market(),
        CoreConfig::default(),
    );

    let lookup = h.service.resolve_symbol_cached(&CompanyQuery::new("Tesla Inc"));
    let sym = lookup.symbol().unwrap();
    let outcome = h.service.fetch_series_cached(sym, &Period::OneMonth);
    let series = outcome.series().unwrap();
    let set = h.service.compute_indicators(series);

    assert_eq!(set.len(), series.len());
    assert!(set.has_enough_for_metrics());
    let snap = set.latest();
    assert_eq!(snap.latest_close, Some(129.0));
    // Closes rise by 1 every bar.
    assert_eq!(snap.rsi14, Some(100.0));
    assert!(snap.volatility20.unwrap() > 0.0);
}

#[test]
fn clear_caches_forces_refetch() {
    let h = harness(
        ScriptedSearch::answering(vec!["TSLA"]),
        daily_market(),
        CoreConfig::default(),
    );
    h.service.resolve_symbol_cached(&CompanyQuery::new("Tesla"));
    h.service.clear_caches();
    h.service.resolve_symbol_cached(&CompanyQuery::new("Tesla"));
    assert_eq!(h.search.calls(), 2);
}
