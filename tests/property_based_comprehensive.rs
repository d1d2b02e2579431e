//! Property-based tests for the latency evaluation engine
//!
//! Properties covered:
//! 1. Histogram text round-trips through the parser
//! 2. The bucket matcher is total inside the covered range and empty outside
//! 3. The second reading triggers iff the growth reaches the warning count
//! 4. The parser never panics on arbitrary input

use dmlatency::latency::{
    find_bucket, parse_histogram, HistogramRecord, TriggerState, Unit,
};
use proptest::prelude::*;

/// Contiguous ascending buckets starting at `first`
fn contiguous_records(first: u64, buckets: &[(u64, u64)]) -> Vec<HistogramRecord> {
    let mut start = first;
    buckets
        .iter()
        .map(|&(length, count)| {
            let record = HistogramRecord {
                range_start: start,
                range_length: length,
                event_count: count,
            };
            start += length;
            record
        })
        .collect()
}

fn render(records: &[HistogramRecord], unit: Unit) -> String {
    records
        .iter()
        .map(|r| {
            format!(
                "{}-{}({}):{}\n",
                r.range_start,
                r.range_start + r.range_length - 1,
                unit.label(),
                r.event_count
            )
        })
        .collect()
}

fn unit_strategy() -> impl Strategy<Value = Unit> {
    prop_oneof![Just(Unit::Millis), Just(Unit::Seconds)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_histogram_round_trip(
        first in 0u64..1_000,
        buckets in prop::collection::vec((1u64..500, any::<u64>()), 1..40),
        unit in unit_strategy(),
    ) {
        let records = contiguous_records(first, &buckets);
        let text = render(&records, unit);

        let set = parse_histogram(&text, unit).unwrap();
        prop_assert_eq!(set.records(), records.as_slice());
        prop_assert_eq!(set.unit(), unit);
        prop_assert_eq!(set.to_string(), text);
    }

    #[test]
    fn prop_matcher_total_within_range(
        first in 0u64..1_000,
        buckets in prop::collection::vec((1u64..100, 0u64..10), 1..20),
        probe in 0u64..5_000,
    ) {
        let records = contiguous_records(first, &buckets);
        let upper = records.last().unwrap().range_end();

        match find_bucket(&records, probe) {
            Some(i) => {
                prop_assert!(probe >= first && probe < upper);
                prop_assert!(records[i].contains(probe));
                let containing = records.iter().filter(|r| r.contains(probe)).count();
                prop_assert_eq!(containing, 1);
            }
            None => prop_assert!(probe < first || probe >= upper),
        }
    }

    #[test]
    fn prop_monotone_delta_trigger(
        first_total in 0u64..1_000_000,
        growth in 0u64..1_000,
        warning_count in 0u64..1_000,
    ) {
        let mut state = TriggerState::new();

        let baseline = state.advance(first_total, warning_count);
        prop_assert!(baseline.baseline);
        prop_assert!(!baseline.triggered);

        let step = state.advance(first_total + growth, warning_count);
        prop_assert_eq!(step.delta, growth);
        prop_assert_eq!(step.triggered, growth >= warning_count);
        prop_assert_eq!(state.cumulative_total(), first_total + growth);
    }

    #[test]
    fn prop_parser_never_panics(input in ".{0,200}", unit in unit_strategy()) {
        if let Ok(set) = parse_histogram(&input, unit) {
            prop_assert!(!set.records().is_empty());
            prop_assert!(set.records().iter().all(|r| r.range_length >= 1));
        }
    }
}
