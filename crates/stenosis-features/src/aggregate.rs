//! Region Statistics

use crate::burden::BurdenSignal;
use crate::region::Region;
use pullback_signal::{FrameMask, FrameRange, Series, SignalPair};
use serde::{Deserialize, Serialize};

/// Per-frame quantity a statistic is taken over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    /// Lumen area
    Lumen,
    /// Plaque area
    Plaque,
    /// External elastic membrane area, `lumen + plaque`
    Eem,
    /// Plaque burden; undefined frames are skipped
    Burden,
}

/// Statistic computed over the frames of a region
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Statistic {
    /// Frames with lumen area strictly below `threshold`
    CountBelowArea { threshold: f64 },
    /// Frames with burden strictly above `threshold`
    CountAboveBurden { threshold: f64 },
    Sum(Channel),
    Mean(Channel),
    Max(Channel),
    /// Population variance
    Variance(Channel),
    /// `sum(plaque) / sum(eem)`, `0` when the EEM sum is zero
    BurdenRatio,
}

/// Summary statistics of a set of values
#[derive(Debug, Clone, Default)]
pub struct RegionStatistics {
    /// Number of values
    pub count: usize,
    /// Sum of values
    pub sum: f64,
    /// Mean value
    pub mean: f64,
    /// Maximum value
    pub max: f64,
    /// Population variance
    pub variance: f64,
}

impl RegionStatistics {
    /// Compute summary statistics; all zero when `values` is empty
    pub fn compute(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }

        let n = values.len() as f64;
        let sum: f64 = values.iter().sum();
        let mean = sum / n;
        let max = values.iter().cloned().fold(f64::MIN, f64::max);

        let m2: f64 = values.iter().map(|v| (v - mean) * (v - mean)).sum();

        Self {
            count: values.len(),
            sum,
            mean,
            max,
            variance: m2 / n,
        }
    }
}

/// `(reference - local) / reference`, `0` when the reference is zero
pub fn stenosis_ratio(reference: f64, local: f64) -> f64 {
    if reference == 0.0 {
        0.0
    } else {
        (reference - local) / reference
    }
}

/// `local / reference`, `0` when the reference is zero
pub fn remodeling_index(local: f64, reference: f64) -> f64 {
    if reference == 0.0 {
        0.0
    } else {
        local / reference
    }
}

/// Computes statistics over regions of one case
///
/// Every statistic over [`Region::Empty`] is `0`. With a burden filter only
/// frames whose burden strictly exceeds the filter threshold take part.
pub struct FeatureAggregator<'a> {
    case: &'a SignalPair,
    burden: &'a BurdenSignal,
}

impl<'a> FeatureAggregator<'a> {
    pub fn new(case: &'a SignalPair, burden: &'a BurdenSignal) -> Self {
        Self { case, burden }
    }

    /// Evaluate `statistic` over `region`
    ///
    /// For [`Region::Average`] the result is the mean of the proximal and
    /// distal values, or `0` whenever the proximal value is `0`.
    pub fn aggregate(
        &self,
        region: &Region,
        statistic: Statistic,
        burden_filter: Option<f64>,
    ) -> f64 {
        let filter = burden_filter.map(|threshold| self.burden.above(threshold));
        let over = |range| self.over_frames(range, statistic, filter.as_ref());
        match region {
            Region::Empty => 0.0,
            Region::Span(range) => over(*range),
            Region::Average { proximal, distal } => {
                let proximal = proximal.map_or(0.0, over);
                if proximal == 0.0 {
                    return 0.0;
                }
                (proximal + distal.map_or(0.0, over)) / 2.0
            }
        }
    }

    /// Value of `channel` at one frame, NaN past the end
    pub fn value_at(&self, channel: Channel, frame: usize) -> f64 {
        self.series(channel).get(frame).unwrap_or(f64::NAN)
    }

    fn series(&self, channel: Channel) -> &'a Series {
        match channel {
            Channel::Lumen => self.case.lumen(),
            Channel::Plaque => self.case.plaque(),
            Channel::Eem => self.case.eem(),
            Channel::Burden => self.burden.as_series(),
        }
    }

    fn over_frames(
        &self,
        range: FrameRange,
        statistic: Statistic,
        filter: Option<&FrameMask>,
    ) -> f64 {
        let count = |selected: FrameMask| {
            let frames = match filter {
                Some(filter) => selected.and(filter).count_in(range),
                None => selected.count_in(range),
            };
            frames as f64
        };

        match statistic {
            Statistic::CountBelowArea { threshold } => {
                count(self.case.lumen().mask(|lumen| lumen < threshold))
            }
            Statistic::CountAboveBurden { threshold } => count(self.burden.above(threshold)),
            Statistic::Sum(channel) => self.statistics(range, channel, filter).sum,
            Statistic::Mean(channel) => self.statistics(range, channel, filter).mean,
            Statistic::Max(channel) => self.statistics(range, channel, filter).max,
            Statistic::Variance(channel) => self.statistics(range, channel, filter).variance,
            Statistic::BurdenRatio => {
                let plaque = self.statistics(range, Channel::Plaque, filter).sum;
                let eem = self.statistics(range, Channel::Eem, filter).sum;
                if eem == 0.0 {
                    0.0
                } else {
                    plaque / eem
                }
            }
        }
    }

    fn statistics(
        &self,
        range: FrameRange,
        channel: Channel,
        filter: Option<&FrameMask>,
    ) -> RegionStatistics {
        let values: Vec<f64> = self
            .series(channel)
            .select(range, filter)
            .filter(|v| !v.is_nan())
            .collect();
        RegionStatistics::compute(&values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn aggregator_test<F: FnOnce(&FeatureAggregator)>(lumen: Vec<f64>, plaque: Vec<f64>, f: F) {
        let len = lumen.len();
        let case = SignalPair::new(lumen, plaque, 0, len).unwrap();
        let burden = BurdenSignal::from_pair(&case);
        f(&FeatureAggregator::new(&case, &burden));
    }

    #[test]
    fn test_region_statistics() {
        let stats = RegionStatistics::compute(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert_eq!(stats.count, 8);
        assert!((stats.sum - 40.0).abs() < 1e-12);
        assert!((stats.mean - 5.0).abs() < 1e-12);
        assert!((stats.max - 9.0).abs() < 1e-12);
        assert!((stats.variance - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_statistics() {
        let stats = RegionStatistics::compute(&[]);
        assert_eq!(stats.count, 0);
        assert_eq!(stats.mean, 0.0);
        assert_eq!(stats.max, 0.0);
    }

    #[test]
    fn test_burden_ratio_half() {
        aggregator_test(vec![2.0, 2.0], vec![2.0, 2.0], |agg| {
            let region = Region::Span(FrameRange::new(0, 2));
            let plaque = agg.aggregate(&region, Statistic::Sum(Channel::Plaque), None);
            let eem = agg.aggregate(&region, Statistic::Sum(Channel::Eem), None);
            assert!((plaque - 4.0).abs() < 1e-12);
            assert!((eem - 8.0).abs() < 1e-12);
            assert!((agg.aggregate(&region, Statistic::BurdenRatio, None) - 0.5).abs() < 1e-12);
        });
    }

    #[test]
    fn test_burden_ratio_zero_area() {
        aggregator_test(vec![0.0, 0.0], vec![0.0, 0.0], |agg| {
            let region = Region::Span(FrameRange::new(0, 2));
            assert_eq!(agg.aggregate(&region, Statistic::BurdenRatio, None), 0.0);
        });
    }

    #[test]
    fn test_empty_region_is_zero() {
        aggregator_test(vec![2.0; 4], vec![2.0; 4], |agg| {
            for statistic in [
                Statistic::CountBelowArea { threshold: 4.0 },
                Statistic::Sum(Channel::Eem),
                Statistic::Mean(Channel::Lumen),
                Statistic::Max(Channel::Eem),
                Statistic::Variance(Channel::Plaque),
                Statistic::BurdenRatio,
            ] {
                assert_eq!(agg.aggregate(&Region::Empty, statistic, None), 0.0);
            }
        });
    }

    #[test]
    fn test_count_below_area_with_burden_filter() {
        // burden: 0.2, 0.6, 0.6, 0.2
        let lumen = vec![4.0, 2.0, 3.5, 1.0];
        let plaque = vec![1.0, 3.0, 5.25, 0.25];
        aggregator_test(lumen, plaque, |agg| {
            let region = Region::Span(FrameRange::new(0, 4));
            let below_3 = Statistic::CountBelowArea { threshold: 3.0 };
            assert_eq!(agg.aggregate(&region, below_3, None), 2.0);
            assert_eq!(agg.aggregate(&region, below_3, Some(0.4)), 1.0);
            assert_eq!(agg.aggregate(&region, below_3, Some(0.7)), 0.0);
        });
    }

    #[test]
    fn test_filtered_mean_empty_is_zero() {
        aggregator_test(vec![3.0; 4], vec![1.0; 4], |agg| {
            let region = Region::Span(FrameRange::new(0, 4));
            assert_eq!(agg.aggregate(&region, Statistic::Mean(Channel::Lumen), Some(0.7)), 0.0);
            let mean = agg.aggregate(&region, Statistic::Mean(Channel::Lumen), Some(0.0));
            assert!((mean - 3.0).abs() < 1e-12);
        });
    }

    #[test]
    fn test_count_above_burden() {
        aggregator_test(vec![1.0, 1.0, 1.0], vec![0.5, 3.0, 1.0], |agg| {
            let region = Region::Span(FrameRange::new(0, 3));
            // burden: 0.33, 0.75, 0.5
            let above = |threshold| Statistic::CountAboveBurden { threshold };
            assert_eq!(agg.aggregate(&region, above(0.4), None), 2.0);
            assert_eq!(agg.aggregate(&region, above(0.7), None), 1.0);
        });
    }

    #[test]
    fn test_max_eem_and_variance() {
        aggregator_test(vec![1.0, 2.0, 3.0], vec![1.0, 1.0, 1.0], |agg| {
            let region = Region::Span(FrameRange::new(0, 3));
            let max_eem = agg.aggregate(&region, Statistic::Max(Channel::Eem), None);
            let variance = agg.aggregate(&region, Statistic::Variance(Channel::Lumen), None);
            assert!((max_eem - 4.0).abs() < 1e-12);
            assert!((variance - 2.0 / 3.0).abs() < 1e-12);
            assert_eq!(agg.aggregate(&region, Statistic::Variance(Channel::Plaque), None), 0.0);
        });
    }

    #[test]
    fn test_average_region() {
        aggregator_test(vec![2.0, 2.0, 4.0, 4.0], vec![1.0; 4], |agg| {
            let mean_lumen = Statistic::Mean(Channel::Lumen);
            let both = Region::Average {
                proximal: Some(FrameRange::new(2, 4)),
                distal: Some(FrameRange::new(0, 2)),
            };
            assert!((agg.aggregate(&both, mean_lumen, None) - 3.0).abs() < 1e-12);

            // Only the proximal side is guarded
            let distal_missing = Region::Average {
                proximal: Some(FrameRange::new(2, 4)),
                distal: None,
            };
            assert!((agg.aggregate(&distal_missing, mean_lumen, None) - 2.0).abs() < 1e-12);

            let proximal_missing = Region::Average {
                proximal: None,
                distal: Some(FrameRange::new(0, 2)),
            };
            assert_eq!(agg.aggregate(&proximal_missing, mean_lumen, None), 0.0);
        });
    }

    #[test]
    fn test_ratios() {
        assert!((stenosis_ratio(4.0, 1.0) - 0.75).abs() < 1e-12);
        assert_eq!(stenosis_ratio(0.0, 1.0), 0.0);
        assert!((remodeling_index(3.0, 4.0) - 0.75).abs() < 1e-12);
        assert_eq!(remodeling_index(3.0, 0.0), 0.0);
    }

    proptest! {
        #[test]
        fn prop_burden_ratio_in_unit_interval(
            areas in proptest::collection::vec((0.01f64..20.0, 0.0f64..20.0), 1..200)
        ) {
            let (lumen, plaque): (Vec<f64>, Vec<f64>) = areas.into_iter().unzip();
            aggregator_test(lumen, plaque, |agg| {
                let region = Region::Span(agg.case.lumen().extent());
                let ratio = agg.aggregate(&region, Statistic::BurdenRatio, None);
                assert!((0.0..=1.0).contains(&ratio));
            });
        }
    }
}
