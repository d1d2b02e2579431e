// Threshold-to-bucket matching

use super::histogram::HistogramRecord;

/// Index of the first bucket whose range contains `threshold`
///
/// Buckets are scanned in source order. `None` means the threshold lies
/// outside every bucket (or there are no buckets).
pub fn find_bucket(records: &[HistogramRecord], threshold: u64) -> Option<usize> {
    records.iter().position(|r| r.contains(threshold))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buckets(ranges: &[(u64, u64)]) -> Vec<HistogramRecord> {
        ranges
            .iter()
            .map(|&(start, len)| HistogramRecord {
                range_start: start,
                range_length: len,
                event_count: 0,
            })
            .collect()
    }

    #[test]
    fn test_threshold_inside_bucket() {
        let records = buckets(&[(0, 10), (10, 10), (20, 30)]);
        assert_eq!(find_bucket(&records, 0), Some(0));
        assert_eq!(find_bucket(&records, 9), Some(0));
        assert_eq!(find_bucket(&records, 12), Some(1));
        assert_eq!(find_bucket(&records, 49), Some(2));
    }

    #[test]
    fn test_upper_bound_is_exclusive() {
        let records = buckets(&[(0, 10), (10, 10)]);
        assert_eq!(find_bucket(&records, 10), Some(1));
        assert_eq!(find_bucket(&records, 20), None);
    }

    #[test]
    fn test_threshold_below_first_bucket() {
        let records = buckets(&[(5, 5), (10, 10)]);
        assert_eq!(find_bucket(&records, 4), None);
    }

    #[test]
    fn test_empty_records() {
        assert_eq!(find_bucket(&[], 0), None);
    }

    #[test]
    fn test_first_match_wins() {
        let records = buckets(&[(0, 10), (5, 10)]);
        assert_eq!(find_bucket(&records, 7), Some(0));
    }
}
