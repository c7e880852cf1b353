use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Buckets of equal width; each bucket is named by its (exclusive) end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinearBucketer {
    width: u64,
}

impl LinearBucketer {
    /// A zero width is treated as 1.
    pub fn new(width: u64) -> Self {
        Self {
            width: width.max(1),
        }
    }

    pub fn width(&self) -> u64 {
        self.width
    }

    pub fn bucket_for(&self, value: f64) -> u64 {
        self.bucket_before(value).saturating_add(self.width)
    }

    pub fn bucket_before(&self, value: f64) -> u64 {
        let value = if value > 0.0 { value } else { 0.0 };
        ((value / self.width as f64).floor() as u64).saturating_mul(self.width)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bucket {
    pub end: u64,
    pub count: u64,
}

/// Sparse histogram of values.
#[derive(Debug, Clone)]
pub struct Distribution {
    bucketer: LinearBucketer,
    buckets: BTreeMap<u64, u64>,
}

impl Distribution {
    pub fn new(bucketer: LinearBucketer) -> Self {
        Self {
            bucketer,
            buckets: BTreeMap::new(),
        }
    }

    pub fn add_value(&mut self, value: f64) {
        *self
            .buckets
            .entry(self.bucketer.bucket_for(value))
            .or_insert(0) += 1;
    }

    pub fn counts(&self) -> &BTreeMap<u64, u64> {
        &self.buckets
    }

    pub fn total_count(&self) -> u64 {
        self.buckets.values().sum()
    }

    /// Buckets in increasing order of `end`.
    ///
    /// A zero-count bucket is inserted before any bucket that does not start
    /// where the previous one ended, so readers can tell where the gap is.
    pub fn snapshot(&self) -> Vec<Bucket> {
        let width = self.bucketer.width();
        let mut out = Vec::with_capacity(self.buckets.len() * 2);
        let mut previous_end = 0;
        for (&end, &count) in &self.buckets {
            let start = end - width;
            if start > previous_end {
                out.push(Bucket {
                    end: start,
                    count: 0,
                });
            }
            out.push(Bucket { end, count });
            previous_end = end;
        }
        out
    }
}

impl Extend<f64> for Distribution {
    fn extend<I: IntoIterator<Item = f64>>(&mut self, values: I) {
        for value in values {
            self.add_value(value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bucket(end: u64, count: u64) -> Bucket {
        Bucket { end, count }
    }

    #[test]
    fn test_linear_bucketer() {
        let bucketer = LinearBucketer::new(1);
        assert_eq!(bucketer.bucket_for(0.0), 1);
        assert_eq!(bucketer.bucket_for(5.0), 6);

        let bucketer = LinearBucketer::new(10);
        assert_eq!(bucketer.bucket_for(0.0), 10);
        assert_eq!(bucketer.bucket_for(1.0), 10);
        assert_eq!(bucketer.bucket_for(9.0), 10);
        assert_eq!(bucketer.bucket_for(10.0), 20);
        assert_eq!(bucketer.bucket_for(101.0), 110);
        assert_eq!(bucketer.bucket_for(-3.0), 10);
    }

    #[test]
    fn test_bucket_before() {
        let bucketer = LinearBucketer::new(10);
        assert_eq!(bucketer.bucket_before(0.0), 0);
        assert_eq!(bucketer.bucket_before(9.0), 0);
        assert_eq!(bucketer.bucket_before(10.0), 10);
        assert_eq!(bucketer.bucket_before(19.0), 10);
        assert_eq!(bucketer.bucket_before(101.0), 100);
    }

    #[test]
    fn test_add_value() {
        let mut dist = Distribution::new(LinearBucketer::new(10));
        dist.extend([0.0, 1.0, 9.0, 10.0, 101.0]);

        let expected = BTreeMap::from([(10, 3), (20, 1), (110, 1)]);
        assert_eq!(dist.counts(), &expected);
        assert_eq!(dist.total_count(), 5);
    }

    #[test]
    fn test_snapshot_marks_gaps() {
        let mut dist = Distribution::new(LinearBucketer::new(10));
        dist.extend([0.0, 1.0, 9.0, 10.0, 101.0]);

        assert_eq!(
            dist.snapshot(),
            vec![bucket(10, 3), bucket(20, 1), bucket(100, 0), bucket(110, 1)]
        );
    }

    #[test]
    fn test_snapshot_one_wide() {
        let mut dist = Distribution::new(LinearBucketer::new(1));
        dist.extend([0.0, 9.0, 10.0]);

        assert_eq!(
            dist.snapshot(),
            vec![bucket(1, 1), bucket(9, 0), bucket(10, 1), bucket(11, 1)]
        );
    }

    #[test]
    fn test_snapshot_with_starting_gap() {
        let mut dist = Distribution::new(LinearBucketer::new(10));
        dist.add_value(21.0);

        assert_eq!(dist.snapshot(), vec![bucket(20, 0), bucket(30, 1)]);
    }

    #[test]
    fn test_empty_snapshot() {
        let dist = Distribution::new(LinearBucketer::new(10));
        assert!(dist.snapshot().is_empty());
    }
}
