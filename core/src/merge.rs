//! Merging weight observations from the backend and the device health store.
//!
//! # Design
//! Both sources are reduced to a [`WeightPoint`] per observation, filtered to
//! a plausible range, grouped by calendar date and averaged. Same-day
//! observations are averaged regardless of where they came from. The output
//! is itself a valid input, so merging is idempotent.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone};
use tracing::debug;

use crate::types::WeightRecord;

/// Exclusive bounds of a plausible body weight in kilograms.
pub const MIN_WEIGHT_KG: f64 = 0.0;
pub const MAX_WEIGHT_KG: f64 = 500.0;

/// One weight per calendar day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightPoint {
    pub date: NaiveDate,
    pub weight: f64,
}

/// A device sample. `recorded_at` is wall-clock time in the device's zone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HealthSample {
    pub recorded_at: NaiveDateTime,
    pub weight: f64,
}

impl HealthSample {
    pub fn new(recorded_at: NaiveDateTime, weight: f64) -> Self {
        Self {
            recorded_at,
            weight,
        }
    }

    /// Keep the timestamp's local wall-clock reading; no zone conversion.
    pub fn at<Tz: TimeZone>(recorded_at: &DateTime<Tz>, weight: f64) -> Self {
        Self::new(recorded_at.naive_local(), weight)
    }
}

/// Anything that can be read as a dated weight observation.
pub trait WeightSource {
    /// `None` when the observation has no usable date.
    fn observation(&self) -> Option<WeightPoint>;
}

impl WeightSource for WeightRecord {
    fn observation(&self) -> Option<WeightPoint> {
        let date = NaiveDate::parse_from_str(&self.date, "%Y-%m-%d").ok()?;
        Some(WeightPoint {
            date,
            weight: self.weight as f64,
        })
    }
}

impl WeightSource for HealthSample {
    fn observation(&self) -> Option<WeightPoint> {
        Some(WeightPoint {
            date: self.recorded_at.date(),
            weight: self.weight,
        })
    }
}

impl WeightSource for WeightPoint {
    fn observation(&self) -> Option<WeightPoint> {
        Some(*self)
    }
}

fn plausible(weight: f64) -> bool {
    weight > MIN_WEIGHT_KG && weight < MAX_WEIGHT_KG
}

/// Merge backend records and device samples into one series, ascending by
/// date, one point per date. Out-of-range and undatable observations are
/// dropped silently.
pub fn merge_weight_series<A, B>(backend: &[A], device: &[B]) -> Vec<WeightPoint>
where
    A: WeightSource,
    B: WeightSource,
{
    let observations = backend
        .iter()
        .filter_map(A::observation)
        .chain(device.iter().filter_map(B::observation))
        .filter(|point| plausible(point.weight));

    let mut by_date: BTreeMap<NaiveDate, (f64, u32)> = BTreeMap::new();
    for point in observations {
        let entry = by_date.entry(point.date).or_insert((0.0, 0));
        entry.0 += point.weight;
        entry.1 += 1;
    }

    let merged: Vec<WeightPoint> = by_date
        .into_iter()
        .map(|(date, (sum, count))| WeightPoint {
            date,
            weight: sum / f64::from(count),
        })
        .collect();
    debug!(
        backend = backend.len(),
        device = device.len(),
        merged = merged.len(),
        "merged weight series"
    );
    merged
}

/// Sum per calendar date, ascending. Used for quantities that accumulate
/// over a day, like active energy or exercise minutes.
pub fn daily_totals(samples: &[(NaiveDateTime, f64)]) -> Vec<(NaiveDate, f64)> {
    let mut by_date: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for (at, value) in samples {
        *by_date.entry(at.date()).or_insert(0.0) += value;
    }
    by_date.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(date: &str, weight: i64) -> WeightRecord {
        WeightRecord {
            id: 1,
            user_id: 1,
            date: date.to_string(),
            weight,
        }
    }

    fn sample(date: NaiveDate, hour: u32, weight: f64) -> HealthSample {
        HealthSample::new(date.and_hms_opt(hour, 15, 0).unwrap(), weight)
    }

    const NO_SAMPLES: &[HealthSample] = &[];

    #[test]
    fn same_day_observations_are_averaged() {
        let merged = merge_weight_series(
            &[record("2024-01-01", 70)],
            &[sample(day(2024, 1, 1), 8, 72.0)],
        );
        assert_eq!(
            merged,
            vec![WeightPoint {
                date: day(2024, 1, 1),
                weight: 71.0
            }]
        );
    }

    #[test]
    fn several_device_samples_on_one_day_are_averaged_too() {
        let d = day(2024, 2, 2);
        let merged = merge_weight_series(
            &[record("2024-02-02", 80)],
            &[sample(d, 7, 81.0), sample(d, 21, 82.0)],
        );
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].weight, 81.0);
    }

    #[test]
    fn range_filter_is_exclusive() {
        let backend = [
            record("2024-01-01", 0),
            record("2024-01-02", 500),
            record("2024-01-03", 501),
            record("2024-01-04", 1),
            record("2024-01-05", 499),
        ];
        let merged = merge_weight_series(&backend, NO_SAMPLES);
        let dates: Vec<NaiveDate> = merged.iter().map(|p| p.date).collect();
        assert_eq!(dates, vec![day(2024, 1, 4), day(2024, 1, 5)]);
    }

    #[test]
    fn out_of_range_device_samples_are_dropped() {
        let d = day(2024, 1, 1);
        let merged = merge_weight_series(
            &[] as &[WeightRecord],
            &[sample(d, 9, -3.0), sample(d, 10, 500.0), sample(d, 11, 68.4)],
        );
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].weight, 68.4);
    }

    #[test]
    fn output_is_sorted_by_date() {
        let merged = merge_weight_series(
            &[record("2024-03-05", 70), record("2024-01-09", 72)],
            &[sample(day(2024, 2, 1), 6, 71.0), sample(day(2023, 12, 31), 6, 73.0)],
        );
        assert!(merged.windows(2).all(|w| w[0].date < w[1].date));
        assert_eq!(merged.first().unwrap().date, day(2023, 12, 31));
        assert_eq!(merged.last().unwrap().date, day(2024, 3, 5));
    }

    #[test]
    fn merging_is_idempotent() {
        let backend = [record("2024-01-01", 70), record("2024-01-03", 69)];
        let device = [
            sample(day(2024, 1, 1), 9, 72.0),
            sample(day(2024, 1, 2), 9, 71.5),
        ];
        let once = merge_weight_series(&backend, &device);
        let twice = merge_weight_series(&once, NO_SAMPLES);
        assert_eq!(once, twice);
    }

    #[test]
    fn merging_ignores_source_order() {
        let backend = [record("2024-01-01", 70), record("2024-01-02", 69)];
        let device = [sample(day(2024, 1, 1), 9, 72.0)];
        let forward = merge_weight_series(&backend, &device);
        let reverse = merge_weight_series(&device, &backend);
        assert_eq!(forward, reverse);
    }

    #[test]
    fn undatable_backend_records_are_skipped() {
        let merged = merge_weight_series(&[record("yesterday", 70)], NO_SAMPLES);
        assert!(merged.is_empty());
    }

    #[test]
    fn zoned_timestamps_keep_their_local_date() {
        let offset = chrono::FixedOffset::east_opt(8 * 3600).unwrap();
        let at = offset.with_ymd_and_hms(2024, 5, 1, 0, 30, 0).unwrap();
        let merged = merge_weight_series(&[] as &[WeightRecord], &[HealthSample::at(&at, 60.0)]);
        assert_eq!(merged[0].date, day(2024, 5, 1));
    }

    #[test]
    fn daily_totals_sum_per_day() {
        let d = day(2024, 4, 4);
        let totals = daily_totals(&[
            (d.and_hms_opt(18, 0, 0).unwrap(), 120.0),
            (day(2024, 4, 3).and_hms_opt(9, 0, 0).unwrap(), 50.0),
            (d.and_hms_opt(7, 0, 0).unwrap(), 30.5),
        ]);
        assert_eq!(totals, vec![(day(2024, 4, 3), 50.0), (d, 150.5)]);
    }
}
