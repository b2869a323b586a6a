//! Yearly value series.
//!
//! Emissions, production, intensities and benchmark curves are all keyed by
//! calendar year. Lookups between known years interpolate linearly, lookups
//! outside the known range hold the nearest value flat.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::RangeInclusive;

/// A single (year, value) observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YearValue {
    /// Calendar year.
    pub year: i32,
    /// Observed or projected value.
    pub value: f64,
}

impl YearValue {
    /// Create a new observation.
    pub const fn new(year: i32, value: f64) -> Self {
        Self { year, value }
    }
}

/// Ordered yearly series.
///
/// Serialized as a list of `{year, value}` objects.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<YearValue>", into = "Vec<YearValue>")]
pub struct YearSeries {
    points: BTreeMap<i32, f64>,
}

impl From<Vec<YearValue>> for YearSeries {
    fn from(points: Vec<YearValue>) -> Self {
        points.into_iter().collect()
    }
}

impl From<YearSeries> for Vec<YearValue> {
    fn from(series: YearSeries) -> Self {
        series.iter().collect()
    }
}

impl FromIterator<YearValue> for YearSeries {
    fn from_iter<I: IntoIterator<Item = YearValue>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().map(|p| (p.year, p.value)).collect(),
        }
    }
}

impl FromIterator<(i32, f64)> for YearSeries {
    fn from_iter<I: IntoIterator<Item = (i32, f64)>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}

impl YearSeries {
    /// Create an empty series.
    pub const fn new() -> Self {
        Self {
            points: BTreeMap::new(),
        }
    }

    /// Insert or replace the value for a year.
    pub fn insert(&mut self, year: i32, value: f64) {
        self.points.insert(year, value);
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the series has no observations.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Exact value for a year, without interpolation.
    pub fn get(&self, year: i32) -> Option<f64> {
        self.points.get(&year).copied()
    }

    /// Earliest observation.
    pub fn first(&self) -> Option<YearValue> {
        self.points
            .first_key_value()
            .map(|(&year, &value)| YearValue::new(year, value))
    }

    /// Latest observation.
    pub fn last(&self) -> Option<YearValue> {
        self.points
            .last_key_value()
            .map(|(&year, &value)| YearValue::new(year, value))
    }

    /// Iterate observations in year order.
    pub fn iter(&self) -> impl Iterator<Item = YearValue> + '_ {
        self.points
            .iter()
            .map(|(&year, &value)| YearValue::new(year, value))
    }

    /// Latest observation at or before `year`.
    pub fn latest_at_or_before(&self, year: i32) -> Option<YearValue> {
        self.points
            .range(..=year)
            .next_back()
            .map(|(&y, &value)| YearValue::new(y, value))
    }

    /// Value at `year`, interpolating linearly between known years and holding
    /// the first/last value flat outside the known range.
    pub fn value_at(&self, year: i32) -> Option<f64> {
        if let Some(value) = self.get(year) {
            return Some(value);
        }
        let before = self.points.range(..year).next_back();
        let after = self.points.range(year..).next();
        match (before, after) {
            (Some((&y0, &v0)), Some((&y1, &v1))) => {
                let t = f64::from(year - y0) / f64::from(y1 - y0);
                Some(v0 + (v1 - v0) * t)
            }
            (Some((_, &v)), None) | (None, Some((_, &v))) => Some(v),
            (None, None) => None,
        }
    }

    /// Resample the series onto every year of `years`.
    ///
    /// Returns an empty series when `self` is empty.
    pub fn resample(&self, years: RangeInclusive<i32>) -> Self {
        years
            .filter_map(|year| self.value_at(year).map(|v| (year, v)))
            .collect()
    }

    /// Observations restricted to `years`, without resampling.
    pub fn window(&self, years: RangeInclusive<i32>) -> Self {
        Self {
            points: self
                .points
                .range(years)
                .map(|(&y, &v)| (y, v))
                .collect(),
        }
    }

    /// Element-wise sum over the years present in both series.
    pub fn sum_common(&self, other: &Self) -> Self {
        self.points
            .iter()
            .filter_map(|(&year, &value)| other.get(year).map(|o| (year, value + o)))
            .collect()
    }

    /// Element-wise combination over the years present in both series.
    pub fn zip_with<F>(&self, other: &Self, f: F) -> Self
    where
        F: Fn(f64, f64) -> Option<f64>,
    {
        self.points
            .iter()
            .filter_map(|(&year, &a)| {
                other
                    .get(year)
                    .and_then(|b| f(a, b))
                    .map(|value| (year, value))
            })
            .collect()
    }

    /// Whether the series never changes direction: entirely non-increasing or
    /// entirely non-decreasing.
    pub fn is_monotonic(&self) -> bool {
        let values: Vec<f64> = self.points.values().copied().collect();
        let non_increasing = values.windows(2).all(|w| w[1] <= w[0]);
        let non_decreasing = values.windows(2).all(|w| w[1] >= w[0]);
        non_increasing || non_decreasing
    }

    /// Whether every value is finite.
    pub fn is_finite(&self) -> bool {
        self.points.values().all(|v| v.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample() -> YearSeries {
        YearSeries::from(vec![YearValue::new(2020, 10.0), YearValue::new(2030, 20.0)])
    }

    #[test]
    fn test_value_at_interpolates() {
        let series = sample();
        assert_relative_eq!(series.value_at(2025).unwrap(), 15.0);
        assert_relative_eq!(series.value_at(2020).unwrap(), 10.0);
    }

    #[test]
    fn test_value_at_holds_flat_outside_range() {
        let series = sample();
        assert_relative_eq!(series.value_at(2010).unwrap(), 10.0);
        assert_relative_eq!(series.value_at(2050).unwrap(), 20.0);
        assert!(YearSeries::new().value_at(2020).is_none());
    }

    #[test]
    fn test_resample_fills_every_year() {
        let resampled = sample().resample(2020..=2030);
        assert_eq!(resampled.len(), 11);
        assert_relative_eq!(resampled.get(2021).unwrap(), 11.0);
    }

    #[test]
    fn test_latest_at_or_before() {
        let series = sample();
        assert_eq!(series.latest_at_or_before(2025).unwrap().year, 2020);
        assert_eq!(series.latest_at_or_before(2030).unwrap().year, 2030);
        assert!(series.latest_at_or_before(2019).is_none());
    }

    #[test]
    fn test_sum_common_uses_shared_years() {
        let a = YearSeries::from(vec![YearValue::new(2019, 1.0), YearValue::new(2020, 2.0)]);
        let b = YearSeries::from(vec![YearValue::new(2020, 3.0), YearValue::new(2021, 4.0)]);
        let sum = a.sum_common(&b);
        assert_eq!(sum.len(), 1);
        assert_relative_eq!(sum.get(2020).unwrap(), 5.0);
    }

    #[test]
    fn test_monotonic() {
        assert!(sample().is_monotonic());
        let bumpy: YearSeries = vec![(2020, 1.0), (2021, 0.5), (2022, 0.8)]
            .into_iter()
            .collect();
        assert!(!bumpy.is_monotonic());
    }

    #[test]
    fn test_serde_as_list() {
        let json = serde_json::to_string(&sample()).unwrap();
        assert_eq!(
            json,
            r#"[{"year":2020,"value":10.0},{"year":2030,"value":20.0}]"#
        );
        let back: YearSeries = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sample());
    }
}
