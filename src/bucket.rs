use chrono::TimeDelta;
use tracing::warn;
use crate::error::{Error, Result};
use crate::models::SearchResult;
use crate::window::{TimeWindow, parse_created_at};

pub const DEFAULT_BUCKET_MINUTES: i64 = 20;

// Upper bound on buckets per histogram, a week of 1-minute buckets
pub const MAX_BUCKETS: i64 = 10_080;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketSeries {
    counts: Vec<u64>,
}

impl BucketSeries {
    pub fn zeroed(window: &TimeWindow, width: TimeDelta) -> Result<Self> {
        Ok(Self {
            counts: vec![0; bucket_count(window, width)?],
        })
    }

    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    // Returns false when the index is outside the series
    fn increment(&mut self, index: i64) -> bool {
        match usize::try_from(index).ok().and_then(|i| self.counts.get_mut(i)) {
            Some(count) => {
                *count += 1;
                true
            }
            None => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Histogram {
    pub series: BucketSeries,
    pub labels: Vec<String>,
    // Results that fell outside the window and were not counted
    pub dropped: u64,
}

fn width_seconds(width: TimeDelta) -> Result<i64> {
    let secs = width.num_seconds();
    if secs <= 0 {
        return Err(Error::InvalidBucketWidth(width.num_minutes()));
    }
    Ok(secs)
}

// Number of whole buckets in the window, refused above MAX_BUCKETS
pub fn bucket_count(window: &TimeWindow, width: TimeDelta) -> Result<usize> {
    let buckets = window.span().num_seconds() / width_seconds(width)?;
    if buckets > MAX_BUCKETS {
        return Err(Error::TooManyBuckets { buckets, max: MAX_BUCKETS });
    }
    Ok(buckets as usize)
}

// Index of the bucket `offset` past the window start falls into (floor division).
pub fn bucket_index(offset: TimeDelta, width: TimeDelta) -> Result<i64> {
    Ok(offset.num_seconds().div_euclid(width_seconds(width)?))
}

pub fn bucket_labels(len: usize, width: TimeDelta) -> Vec<String> {
    let w = width.num_minutes();
    (0..len as i64)
        .map(|i| format!("{}-{} min", i * w, (i + 1) * w))
        .collect()
}

pub fn bucketize(results: &[SearchResult], window: &TimeWindow, width: TimeDelta) -> Result<Histogram> {
    let mut series = BucketSeries::zeroed(window, width)?;
    let mut dropped = 0;

    for result in results {
        let created = parse_created_at(&result.created_at)?;
        let index = bucket_index(created - window.from(), width)?;
        if !series.increment(index) {
            dropped += 1;
        }
    }

    if dropped > 0 {
        warn!(dropped, "results outside the time window were not counted");
    }

    let labels = bucket_labels(series.len(), width);
    Ok(Histogram { series, labels, dropped })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(created_at: &str) -> SearchResult {
        SearchResult {
            created_at: created_at.to_string(),
            payload: serde_json::Map::new(),
        }
    }

    fn twenty() -> TimeDelta {
        TimeDelta::minutes(DEFAULT_BUCKET_MINUTES)
    }

    #[test]
    fn test_eleven_minutes_in_lands_in_first_bucket() {
        let window = TimeWindow::from_api_dates("201906171800", "201906171900").unwrap();
        let histogram = bucketize(&[result("Mon Jun 17 18:11:13 +0000 2019")], &window, twenty()).unwrap();

        assert_eq!(histogram.series.counts(), &[1, 0, 0]);
    }

    #[test]
    fn test_sixty_minute_window_labels() {
        let window = TimeWindow::from_api_dates("201906171800", "201906171900").unwrap();
        let histogram = bucketize(&[], &window, twenty()).unwrap();

        assert_eq!(histogram.labels, vec!["0-20 min", "20-40 min", "40-60 min"]);
        assert_eq!(histogram.series.counts(), &[0, 0, 0]);
    }

    #[test]
    fn test_partial_trailing_bucket_is_floored() {
        let window = TimeWindow::from_api_dates("201906171800", "201906171850").unwrap();
        let series = BucketSeries::zeroed(&window, twenty()).unwrap();
        assert_eq!(series.len(), 2);
    }

    #[test]
    fn test_out_of_window_results_are_dropped() {
        let window = TimeWindow::from_api_dates("201906171800", "201906171900").unwrap();
        let results = [
            result("Mon Jun 17 17:59:59 +0000 2019"), // just before
            result("Mon Jun 17 18:00:00 +0000 2019"),
            result("Mon Jun 17 18:25:00 +0000 2019"),
            result("Mon Jun 17 18:59:59 +0000 2019"),
            result("Mon Jun 17 19:00:00 +0000 2019"), // one past the last bucket
        ];
        let histogram = bucketize(&results, &window, twenty()).unwrap();

        assert_eq!(histogram.series.counts(), &[1, 1, 1]);
        assert_eq!(histogram.dropped, 2);
    }

    #[test]
    fn test_counts_sum_to_in_window_results() {
        let window = TimeWindow::from_api_dates("201906171800", "201906172000").unwrap();
        let results: Vec<SearchResult> = (0..120)
            .step_by(7)
            .map(|m| result(&format!("Mon Jun 17 {:02}:{:02}:00 +0000 2019", 18 + m / 60, m % 60)))
            .chain([result("Mon Jun 17 23:00:00 +0000 2019")])
            .collect();
        let histogram = bucketize(&results, &window, twenty()).unwrap();

        assert_eq!(histogram.series.len(), 6);
        assert_eq!(histogram.series.total(), results.len() as u64 - 1);
        assert_eq!(histogram.dropped, 1);
    }

    #[test]
    fn test_malformed_timestamp_fails() {
        let window = TimeWindow::from_api_dates("201906171800", "201906171900").unwrap();
        let err = bucketize(&[result("not a date")], &window, twenty()).unwrap_err();
        assert!(matches!(err, Error::MalformedTimestamp(_)));
    }

    #[test]
    fn test_zero_width_rejected() {
        let window = TimeWindow::from_api_dates("201906171800", "201906171900").unwrap();
        assert!(matches!(
            bucketize(&[], &window, TimeDelta::zero()),
            Err(Error::InvalidBucketWidth(0))
        ));
    }

    #[test]
    fn test_bucket_index_floors_negative_offsets() {
        assert_eq!(bucket_index(TimeDelta::seconds(-1), twenty()).unwrap(), -1);
        assert_eq!(bucket_index(TimeDelta::minutes(39), twenty()).unwrap(), 1);
    }

    #[test]
    fn test_empty_window() {
        let window = TimeWindow::from_api_dates("201906171800", "201906171800").unwrap();
        let histogram = bucketize(&[result("Mon Jun 17 18:00:00 +0000 2019")], &window, twenty()).unwrap();

        assert!(histogram.series.is_empty());
        assert!(histogram.labels.is_empty());
        assert_eq!(histogram.dropped, 1);
    }

    #[test]
    fn test_oversized_window_rejected() {
        let window = TimeWindow::from_api_dates("000001010000", "999912312359").unwrap();
        assert!(matches!(
            bucketize(&[], &window, twenty()),
            Err(Error::TooManyBuckets { max: MAX_BUCKETS, .. })
        ));

        // 300 years of 20 minute buckets
        let window = TimeWindow::from_api_dates("170001010000", "200001010000").unwrap();
        assert!(matches!(bucket_count(&window, twenty()), Err(Error::TooManyBuckets { .. })));
    }

    #[test]
    fn test_bucket_cap_is_inclusive() {
        // exactly MAX_BUCKETS one-minute buckets (7 days)
        let window = TimeWindow::from_api_dates("201906010000", "201906080000").unwrap();
        assert_eq!(bucket_count(&window, TimeDelta::minutes(1)).unwrap(), MAX_BUCKETS as usize);

        let window = TimeWindow::from_api_dates("201906010000", "201906080001").unwrap();
        assert!(bucket_count(&window, TimeDelta::minutes(1)).is_err());
    }

    #[test]
    fn test_custom_width_labels() {
        assert_eq!(
            bucket_labels(2, TimeDelta::minutes(15)),
            vec!["0-15 min", "15-30 min"]
        );
    }
}
