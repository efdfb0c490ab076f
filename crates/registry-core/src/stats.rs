//! Aggregate statistics over the registry.

use serde::Serialize;

use crate::store::AgeAggregate;

/// A fixed, inclusive age range used for the histogram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bucket {
  pub min:   u32,
  pub max:   u32,
  pub label: &'static str,
}

/// Histogram buckets in ascending order. The last one is effectively open.
pub const BUCKETS: [Bucket; 5] = [
  Bucket { min: 18, max: 24, label: "18-24" },
  Bucket { min: 25, max: 29, label: "25-29" },
  Bucket { min: 30, max: 34, label: "30-34" },
  Bucket { min: 35, max: 39, label: "35-39" },
  Bucket { min: 40, max: 100, label: "40+" },
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Overview {
  pub total_users:  u64,
  pub male_count:   u64,
  pub female_count: u64,
  /// Rounded to one decimal place, ties to even.
  pub avg_age:      f64,
  pub min_age:      u32,
  pub max_age:      u32,
}

impl From<AgeAggregate> for Overview {
  fn from(agg: AgeAggregate) -> Self {
    if agg.total == 0 {
      return Self::default();
    }
    Self {
      total_users:  agg.total,
      male_count:   agg.male_count,
      female_count: agg.female_count,
      avg_age:      agg.avg_age.map(round_one).unwrap_or(0.0),
      min_age:      agg.min_age.unwrap_or(0),
      max_age:      agg.max_age.unwrap_or(0),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BucketCount {
  pub age_range: &'static str,
  pub count:     u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Statistics {
  pub overview:         Overview,
  pub age_distribution: Vec<BucketCount>,
}

/// Keep only the non-empty buckets, in bucket order.
pub fn distribution(
  counts: impl IntoIterator<Item = (Bucket, u64)>,
) -> Vec<BucketCount> {
  counts
    .into_iter()
    .filter(|(_, count)| *count > 0)
    .map(|(bucket, count)| BucketCount { age_range: bucket.label, count })
    .collect()
}

/// One decimal place, ties to even.
fn round_one(x: f64) -> f64 { (x * 10.0).round_ties_even() / 10.0 }

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_aggregate_is_all_zero() {
    let overview = Overview::from(AgeAggregate::default());
    assert_eq!(overview, Overview::default());
    assert_eq!(
      serde_json::to_value(Statistics::default()).unwrap(),
      serde_json::json!({
        "overview": {
          "total_users": 0, "male_count": 0, "female_count": 0,
          "avg_age": 0.0, "min_age": 0, "max_age": 0
        },
        "age_distribution": []
      })
    );
  }

  #[test]
  fn average_is_rounded_to_one_decimal() {
    let overview = Overview::from(AgeAggregate {
      total:        3,
      male_count:   1,
      female_count: 2,
      avg_age:      Some(26.666_666),
      min_age:      Some(22),
      max_age:      Some(31),
    });
    assert_eq!(overview.avg_age, 26.7);
    assert_eq!(overview.min_age, 22);
    assert_eq!(overview.max_age, 31);
  }

  #[test]
  fn halves_round_to_even() {
    assert_eq!(round_one(26.25), 26.2);
    assert_eq!(round_one(26.75), 26.8);
    assert_eq!(round_one(28.5), 28.5);
  }

  #[test]
  fn distribution_drops_empty_buckets() {
    let counts = BUCKETS.iter().copied().zip([0, 3, 0, 1, 2]);
    let dist = distribution(counts);
    assert_eq!(
      dist,
      [
        BucketCount { age_range: "25-29", count: 3 },
        BucketCount { age_range: "35-39", count: 1 },
        BucketCount { age_range: "40+", count: 2 },
      ]
    );
  }
}
