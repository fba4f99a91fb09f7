//! Interval cascade behavior of `FetchClient::fetch_series`.

mod common;

use common::*;
use quotelens_core::data::{FetchClient, RetryPolicy, SeriesOutcome};
use quotelens_core::domain::{Interval, Period};
use std::sync::Arc;

fn cascade(market: ScriptedMarketData) -> (FetchClient, Arc<ScriptedMarketData>) {
    let market = Arc::new(market);
    let client = client(
        Arc::new(ScriptedSearch::failing()),
        Arc::clone(&market),
        RetryPolicy::immediate(3),
    );
    (client, market)
}

#[test]
fn malformed_15m_falls_through_to_30m() {
    let (client, market) = cascade(
        ScriptedMarketData::new()
            .with(Interval::FifteenMinutes, BarsStep::Bars(malformed_rows(12, 15)))
            .with(Interval::ThirtyMinutes, BarsStep::Bars(valid_rows(5, 30)))
            .with(Interval::SixtyMinutes, BarsStep::Bars(valid_rows(8, 60))),
    );

    let outcome = client.fetch_series(&symbol("TSLA"), &Period::FiveDays);

    let series = outcome.series().expect("30m should yield a series");
    assert_eq!(series.len(), 5);
    assert_eq!(series.interval(), Interval::ThirtyMinutes);
    assert_eq!(outcome.interval(), Interval::ThirtyMinutes);
    assert_eq!(series.symbol().as_str(), "TSLA");
    assert_eq!(series.period(), &Period::FiveDays);
    // The cascade stops at the first non-empty interval.
    assert_eq!(
        market.intervals_tried(),
        vec![Interval::FifteenMinutes, Interval::ThirtyMinutes]
    );
}

#[test]
fn first_success_short_circuits() {
    let (client, market) = cascade(
        ScriptedMarketData::new()
            .with(Interval::OneWeek, BarsStep::Bars(valid_rows(52, 60 * 24 * 7)))
            .with(Interval::OneDay, BarsStep::Bars(valid_rows(250, 60 * 24))),
    );

    let outcome = client.fetch_series(&symbol("AAPL"), &Period::OneYear);
    assert_eq!(outcome.series().unwrap().len(), 52);
    assert_eq!(market.intervals_tried(), vec![Interval::OneWeek]);
}

#[test]
fn all_empty_reports_last_interval() {
    let (client, market) = cascade(ScriptedMarketData::new());

    let outcome = client.fetch_series(&symbol("NOPE"), &Period::FiveDays);
    assert_eq!(
        outcome,
        SeriesOutcome::Empty {
            last_interval: Interval::OneHour
        }
    );
    assert_eq!(market.intervals_tried().len(), 4);
}

#[test]
fn transport_error_continues_cascade() {
    let (client, market) = cascade(
        ScriptedMarketData::new()
            .with(Interval::OneMonth, BarsStep::TransportError)
            .with(Interval::OneWeek, BarsStep::Bars(valid_rows(260, 60 * 24 * 7))),
    );

    let outcome = client.fetch_series(&symbol("MSFT"), &Period::FiveYears);
    assert_eq!(outcome.interval(), Interval::OneWeek);
    assert_eq!(market.intervals_tried(), vec![Interval::OneMonth, Interval::OneWeek]);
}

#[test]
fn transport_error_on_every_candidate_is_empty() {
    let (client, _market) = cascade(
        ScriptedMarketData::new()
            .with(Interval::ThreeMonths, BarsStep::TransportError)
            .with(Interval::OneMonth, BarsStep::TransportError),
    );

    let outcome = client.fetch_series(&symbol("IBM"), &Period::Max);
    assert_eq!(
        outcome,
        SeriesOutcome::Empty {
            last_interval: Interval::OneMonth
        }
    );
}

#[test]
fn partially_malformed_rows_are_dropped() {
    let mut rows = valid_rows(6, 60 * 24);
    rows[2].high = None;
    rows[4].close = Some(f64::INFINITY);
    let (client, _market) =
        cascade(ScriptedMarketData::new().with(Interval::OneDay, BarsStep::Bars(rows)));

    let outcome = client.fetch_series(&symbol("KO"), &Period::OneMonth);
    let closes = outcome.series().unwrap().closes();
    assert_eq!(closes, vec![100.0, 101.0, 103.0, 105.0]);
}

#[test]
fn unrecognized_period_asks_for_daily_bars() {
    let (client, market) = cascade(
        ScriptedMarketData::new().with(Interval::OneDay, BarsStep::Bars(valid_rows(3, 60 * 24))),
    );

    let outcome = client.fetch_series(&symbol("KO"), &Period::parse("ytd"));
    assert_eq!(outcome.interval(), Interval::OneDay);
    let calls = market.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].1.as_str(), "ytd");
}

#[test]
fn provider_rows_out_of_order_come_back_sorted() {
    let mut rows = valid_rows(4, 60 * 24);
    rows.reverse();
    let (client, _market) =
        cascade(ScriptedMarketData::new().with(Interval::OneDay, BarsStep::Bars(rows)));

    let outcome = client.fetch_series(&symbol("KO"), &Period::SixMonths);
    let bars = outcome.series().unwrap().bars().to_vec();
    for pair in bars.windows(2) {
        assert!(pair[0].timestamp < pair[1].timestamp);
    }
}
