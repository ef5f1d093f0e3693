//! Stenosis Feature Engine
//!
//! Plaque burden, lesion segmentation, analysis regions and the named
//! feature catalog evaluated per pullback case.

mod aggregate;
mod burden;
mod catalog;
mod lesion;
mod region;

pub use aggregate::{
    remodeling_index, stenosis_ratio, Channel, FeatureAggregator, RegionStatistics, Statistic,
};
pub use burden::{plaque_burden, BurdenSignal};
pub use catalog::{CaseContext, FeatureCatalog, FeatureRequest, Measure};
pub use lesion::{LesionInterval, LesionParams, LesionSegmenter, LesionSet};
pub use region::{Region, RegionKind, RegionResolver};

/// Frames covering 5 mm of pullback
pub const FIVE_MM_FRAMES: usize = 300;
