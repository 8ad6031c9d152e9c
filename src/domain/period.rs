//! Pagination planner.
//!
//! Splits a requested time range into windows that each fit in one page of
//! the candles endpoint (`max_points_per_page` buckets of `granularity`).

use crate::domain::error::RatesError;
use chrono::{DateTime, Duration, Utc};

/// One page-sized slice of a requested range, `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Period {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

/// Partition `[start, end)` into ascending, contiguous windows of at most
/// `max_points_per_page * granularity`. The last window is clipped to `end`.
///
/// An empty range yields no windows.
pub fn plan(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    granularity: Duration,
    max_points_per_page: u32,
) -> Result<Vec<Period>, RatesError> {
    if granularity <= Duration::zero() {
        return Err(RatesError::Planning {
            reason: format!("granularity must be positive, got {granularity}"),
        });
    }
    if max_points_per_page == 0 {
        return Err(RatesError::Planning {
            reason: "max points per page must be positive".into(),
        });
    }
    if start > end {
        return Err(RatesError::Planning {
            reason: format!("start {start} is after end {end}"),
        });
    }

    let page = i32::try_from(max_points_per_page)
        .ok()
        .and_then(|points| granularity.checked_mul(points))
        .ok_or_else(|| RatesError::Planning {
            reason: format!(
                "page span of {max_points_per_page} x {granularity} overflows"
            ),
        })?;

    let mut periods = Vec::new();
    let mut cursor = start;
    while cursor < end {
        // Past the representable range means the page reaches beyond `end`.
        let next = cursor
            .checked_add_signed(page)
            .map_or(end, |next| next.min(end));
        periods.push(Period::new(cursor, next));
        cursor = next;
    }

    Ok(periods)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn may_2017_hourly_splits_into_four_pages() {
        let periods = plan(
            at(2017, 5, 1, 0),
            at(2017, 6, 1, 0),
            Duration::seconds(3600),
            200,
        )
        .unwrap();

        assert_eq!(
            periods,
            vec![
                Period::new(at(2017, 5, 1, 0), at(2017, 5, 9, 8)),
                Period::new(at(2017, 5, 9, 8), at(2017, 5, 17, 16)),
                Period::new(at(2017, 5, 17, 16), at(2017, 5, 26, 0)),
                Period::new(at(2017, 5, 26, 0), at(2017, 6, 1, 0)),
            ]
        );
    }

    #[test]
    fn empty_range_yields_no_periods() {
        let t = at(2017, 9, 1, 0);
        assert!(plan(t, t, Duration::seconds(60), 300).unwrap().is_empty());
    }

    #[test]
    fn exact_multiple_has_no_trailing_window() {
        let periods = plan(
            at(2017, 9, 1, 0),
            at(2017, 9, 3, 0),
            Duration::seconds(3600),
            24,
        )
        .unwrap();
        assert_eq!(periods.len(), 2);
        assert_eq!(periods[1].end, at(2017, 9, 3, 0));
        assert_eq!(periods[1].duration(), Duration::hours(24));
    }

    #[test]
    fn range_shorter_than_a_page_is_one_window() {
        let periods = plan(
            at(2017, 9, 1, 0),
            at(2017, 9, 1, 5),
            Duration::seconds(3600),
            300,
        )
        .unwrap();
        assert_eq!(periods, vec![Period::new(at(2017, 9, 1, 0), at(2017, 9, 1, 5))]);
    }

    #[test]
    fn rejects_non_positive_granularity() {
        let start = at(2017, 9, 1, 0);
        let end = at(2017, 9, 2, 0);
        assert!(matches!(
            plan(start, end, Duration::zero(), 300),
            Err(RatesError::Planning { .. })
        ));
        assert!(matches!(
            plan(start, end, Duration::seconds(-60), 300),
            Err(RatesError::Planning { .. })
        ));
    }

    #[test]
    fn rejects_zero_page_size() {
        let result = plan(at(2017, 9, 1, 0), at(2017, 9, 2, 0), Duration::seconds(60), 0);
        assert!(matches!(result, Err(RatesError::Planning { .. })));
    }

    #[test]
    fn rejects_inverted_range() {
        let result = plan(at(2017, 9, 2, 0), at(2017, 9, 1, 0), Duration::seconds(60), 300);
        assert!(matches!(result, Err(RatesError::Planning { .. })));
    }

    proptest! {
        #[test]
        fn windows_cover_range_without_gaps_or_overlap(
            start_secs in 1_400_000_000i64..1_800_000_000,
            granularity_secs in 1i64..100_000,
            max_points in 1u32..1_000,
            whole_pages in 0i64..40,
            remainder_seed in any::<u64>(),
        ) {
            let page_secs = granularity_secs * i64::from(max_points);
            let remainder = (remainder_seed % page_secs as u64) as i64;
            let span_secs = whole_pages * page_secs + remainder;
            let start = Utc.timestamp_opt(start_secs, 0).unwrap();
            let end = start + Duration::seconds(span_secs);
            let granularity = Duration::seconds(granularity_secs);
            let page = Duration::seconds(page_secs);

            let periods = plan(start, end, granularity, max_points).unwrap();

            if span_secs == 0 {
                prop_assert!(periods.is_empty());
            } else {
                prop_assert_eq!(periods.first().unwrap().start, start);
                prop_assert_eq!(periods.last().unwrap().end, end);
            }
            let expected_count = whole_pages + i64::from(remainder > 0);
            prop_assert_eq!(periods.len() as i64, expected_count);
            for pair in periods.windows(2) {
                prop_assert_eq!(pair[0].end, pair[1].start);
            }
            for (i, period) in periods.iter().enumerate() {
                prop_assert!(period.start < period.end);
                prop_assert!(period.duration() <= page);
                if i + 1 < periods.len() {
                    prop_assert_eq!(period.duration(), page);
                }
            }
        }
    }
}
