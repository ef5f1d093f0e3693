//! Feature Catalog
//!
//! Every named feature is a [`FeatureRequest`]: a [`Measure`] plus the
//! lesion segmentation parameters it depends on. The standard catalog is
//! generated from region × statistic combinators rather than listed by hand.

use crate::aggregate::{remodeling_index, stenosis_ratio, Channel, FeatureAggregator, Statistic};
use crate::burden::BurdenSignal;
use crate::lesion::{LesionParams, LesionSegmenter, LesionSet};
use crate::region::{RegionKind, RegionResolver};
use pullback_signal::SignalPair;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Lumen area thresholds (mm²) and their name infixes
const LUMEN_THRESHOLDS: [(&str, f64); 3] = [("40", 4.0), ("25", 2.5), ("30", 3.0)];

/// Burden threshold of the `PB40` features
const MODERATE_BURDEN: f64 = 0.4;

/// Burden threshold of the `PB70` features
const HIGH_BURDEN: f64 = 0.7;

/// What a feature measures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Measure {
    /// A statistic over a resolved region
    Region {
        region: RegionKind,
        statistic: Statistic,
        burden_filter: Option<f64>,
    },
    /// Sum of `end - start` over all lesions
    LesionLength,
    /// Frames from the end of the last lesion to OS
    OsToLastLesion,
    /// Frames from the minimum-lumen frame to OS
    OsToMla,
    /// Minimum lumen area inside the ROI
    MinimumLumenArea,
    /// A channel at the minimum-lumen frame
    AtMla(Channel),
    /// `(reference - local) / reference`
    StenosisRatio {
        reference: Box<Measure>,
        local: Box<Measure>,
    },
    /// `local / reference`
    RemodelingIndex {
        local: Box<Measure>,
        reference: Box<Measure>,
    },
}

impl Measure {
    /// Statistic over a region without burden filtering
    pub fn region(region: RegionKind, statistic: Statistic) -> Self {
        Measure::Region {
            region,
            statistic,
            burden_filter: None,
        }
    }

    /// Statistic over the ROI frames whose burden exceeds `threshold`
    pub fn filtered_roi(statistic: Statistic, threshold: f64) -> Self {
        Measure::Region {
            region: RegionKind::Roi,
            statistic,
            burden_filter: Some(threshold),
        }
    }

    pub fn stenosis(reference: Measure, local: Measure) -> Self {
        Measure::StenosisRatio {
            reference: Box::new(reference),
            local: Box::new(local),
        }
    }

    pub fn remodeling(local: Measure, reference: Measure) -> Self {
        Measure::RemodelingIndex {
            local: Box::new(local),
            reference: Box::new(reference),
        }
    }
}

/// One named feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRequest {
    pub name: String,
    pub measure: Measure,
    pub lesion: LesionParams,
}

impl FeatureRequest {
    pub fn new(name: impl Into<String>, measure: Measure, lesion: LesionParams) -> Self {
        Self {
            name: name.into(),
            measure,
            lesion,
        }
    }
}

/// Per-case evaluation state
///
/// Holds the burden signal and the lesion sets already segmented for this
/// case, so that features sharing parameters segment only once.
pub struct CaseContext<'a> {
    case: &'a SignalPair,
    burden: BurdenSignal,
    lesions: Vec<(LesionParams, LesionSet)>,
}

impl<'a> CaseContext<'a> {
    pub fn new(case: &'a SignalPair) -> Self {
        Self {
            case,
            burden: BurdenSignal::from_pair(case),
            lesions: Vec::new(),
        }
    }

    pub fn burden(&self) -> &BurdenSignal {
        &self.burden
    }

    /// Lesions of this case for `params`, segmenting on first use
    pub fn lesions(&mut self, params: &LesionParams) -> &LesionSet {
        let index = self.lesion_index(params);
        &self.lesions[index].1
    }

    fn lesion_index(&mut self, params: &LesionParams) -> usize {
        if let Some(index) = self.lesions.iter().position(|(p, _)| p == params) {
            return index;
        }
        let set = LesionSegmenter::new(*params).segment_roi(&self.burden, self.case.roi());
        self.lesions.push((*params, set));
        self.lesions.len() - 1
    }

    /// Evaluate one feature; always finite for a valid case
    pub fn evaluate(&mut self, request: &FeatureRequest) -> f64 {
        self.measure(&request.measure, &request.lesion)
    }

    fn measure(&mut self, measure: &Measure, params: &LesionParams) -> f64 {
        match measure {
            Measure::Region {
                region,
                statistic,
                burden_filter,
            } => {
                let no_lesion = LesionSet::NoLesion;
                let lesions = if region.is_lesion_anchored() {
                    let index = self.lesion_index(params);
                    &self.lesions[index].1
                } else {
                    &no_lesion
                };
                let region = RegionResolver::new(self.case, lesions).resolve(*region);
                FeatureAggregator::new(self.case, &self.burden).aggregate(
                    &region,
                    *statistic,
                    *burden_filter,
                )
            }
            Measure::LesionLength => self.lesions(params).total_length() as f64,
            Measure::OsToLastLesion => {
                let os = self.case.os();
                self.lesions(params)
                    .last()
                    .map_or(0.0, |lesion| os as f64 - lesion.end as f64)
            }
            Measure::OsToMla => (self.case.os() - self.mla_frame()) as f64,
            Measure::MinimumLumenArea => {
                let mla = self.mla_frame();
                self.aggregator().value_at(Channel::Lumen, mla)
            }
            Measure::AtMla(channel) => {
                let mla = self.mla_frame();
                let value = self.aggregator().value_at(*channel, mla);
                if value.is_finite() {
                    value
                } else {
                    0.0
                }
            }
            Measure::StenosisRatio { reference, local } => {
                let reference = self.measure(reference, params);
                let local = self.measure(local, params);
                stenosis_ratio(reference, local)
            }
            Measure::RemodelingIndex { local, reference } => {
                let local = self.measure(local, params);
                let reference = self.measure(reference, params);
                remodeling_index(local, reference)
            }
        }
    }

    fn mla_frame(&self) -> usize {
        RegionResolver::new(self.case, &LesionSet::NoLesion).mla_frame()
    }

    fn aggregator(&self) -> FeatureAggregator<'_> {
        FeatureAggregator::new(self.case, &self.burden)
    }
}

/// Ordered list of named features
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeatureCatalog {
    requests: Vec<FeatureRequest>,
}

impl FeatureCatalog {
    /// Catalog from explicit requests
    pub fn new(requests: Vec<FeatureRequest>) -> Self {
        Self { requests }
    }

    /// The standard stenosis catalog
    ///
    /// Only `gap` and `min_length` are taken from `segmentation`. Burden
    /// thresholds follow the feature names: `PB40` features segment and
    /// filter at 0.4, `PB70` features at 0.7.
    pub fn standard(segmentation: LesionParams) -> Self {
        let mut builder = CatalogBuilder::new(segmentation.with_threshold(MODERATE_BURDEN));
        builder.lesion_features();
        builder.mla_features();
        builder.roi_families();
        builder.area_family(RegionKind::Worst5mm, false);
        for kind in [
            RegionKind::ProximalRef,
            RegionKind::DistalRef,
            RegionKind::Proximal5mm,
            RegionKind::Distal5mm,
        ] {
            builder.area_family(kind, true);
        }
        builder.average_features();
        builder.stenosis_features();
        builder.remodeling_features();
        builder.variance_features();

        let catalog = Self::new(builder.requests);
        info!("Standard feature catalog: {} features", catalog.len());
        catalog
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    pub fn requests(&self) -> &[FeatureRequest] {
        &self.requests
    }

    /// Feature names in output order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.requests.iter().map(|r| r.name.as_str())
    }

    /// Look up a request by name
    pub fn get(&self, name: &str) -> Option<&FeatureRequest> {
        self.requests.iter().find(|r| r.name == name)
    }

    /// Evaluate a single request against a case
    pub fn evaluate(case: &SignalPair, request: &FeatureRequest) -> f64 {
        CaseContext::new(case).evaluate(request)
    }

    /// Evaluate every feature of the catalog, in order
    pub fn evaluate_all(&self, case: &SignalPair) -> Vec<f64> {
        let mut context = CaseContext::new(case);
        let row: Vec<f64> = self.requests.iter().map(|r| context.evaluate(r)).collect();
        debug!(
            "Evaluated {} features over {} frames",
            row.len(),
            case.len()
        );
        row
    }
}

struct CatalogBuilder {
    base: LesionParams,
    requests: Vec<FeatureRequest>,
}

impl CatalogBuilder {
    fn new(base: LesionParams) -> Self {
        Self {
            base,
            requests: Vec::new(),
        }
    }

    fn push(&mut self, name: impl Into<String>, measure: Measure) {
        self.push_with(name, measure, self.base);
    }

    fn push_with(&mut self, name: impl Into<String>, measure: Measure, lesion: LesionParams) {
        self.requests.push(FeatureRequest::new(name, measure, lesion));
    }

    fn high_burden(&self) -> LesionParams {
        self.base.with_threshold(HIGH_BURDEN)
    }

    fn lesion_features(&mut self) {
        let high = self.high_burden();
        self.push("len_PB40", Measure::LesionLength);
        self.push_with("len_PB70", Measure::LesionLength, high);
        self.push("OS_PB40", Measure::OsToLastLesion);
        self.push_with("OS_PB70", Measure::OsToLastLesion, high);
    }

    fn mla_features(&mut self) {
        self.push("OS_MLA", Measure::OsToMla);
        self.push("MLA", Measure::MinimumLumenArea);
        self.push("EEM_MLA", Measure::AtMla(Channel::Eem));
        self.push("PB_MLA", Measure::AtMla(Channel::Burden));
        self.push(
            "max_PB_ROI",
            Measure::region(RegionKind::Roi, Statistic::Max(Channel::Burden)),
        );
        for (tag, threshold) in [("40", MODERATE_BURDEN), ("70", HIGH_BURDEN)] {
            self.push(
                format!("No_PB{tag}"),
                Measure::region(RegionKind::Roi, Statistic::CountAboveBurden { threshold }),
            );
        }
    }

    /// Area statistics over the ROI at burden filters 0, 0.4 and 0.7
    fn roi_families(&mut self) {
        for (suffix, threshold) in [
            ("ROI", 0.0),
            ("PB40", MODERATE_BURDEN),
            ("PB70", HIGH_BURDEN),
        ] {
            for (name, statistic) in area_statistics(suffix, false) {
                self.push(name, Measure::filtered_roi(statistic, threshold));
            }
        }
    }

    fn area_family(&mut self, region: RegionKind, with_max: bool) {
        for (name, statistic) in area_statistics(region.suffix(), with_max) {
            self.push(name, Measure::region(region, statistic));
        }
    }

    fn average_features(&mut self) {
        self.push(
            "mean_lumen_aver",
            Measure::region(RegionKind::Average, Statistic::Mean(Channel::Lumen)),
        );
        self.push(
            "mean_EEM_aver",
            Measure::region(RegionKind::Average, Statistic::Mean(Channel::Eem)),
        );
    }

    /// area1: lumen vs MLA, area2: EEM vs MLA, area3: lumen vs worst lumen,
    /// area4: EEM vs worst lumen
    fn stenosis_features(&mut self) {
        let worst_lumen =
            || Measure::region(RegionKind::Worst5mm, Statistic::Mean(Channel::Lumen));
        let families: [(&str, Channel, fn() -> Measure); 4] = [
            ("area1", Channel::Lumen, || Measure::MinimumLumenArea),
            ("area2", Channel::Eem, || Measure::MinimumLumenArea),
            ("area3", Channel::Lumen, worst_lumen),
            ("area4", Channel::Eem, worst_lumen),
        ];
        for (prefix, channel, local) in families {
            for reference in [RegionKind::Average, RegionKind::Proximal5mm, RegionKind::Distal5mm] {
                let reference_mean = Measure::region(reference, Statistic::Mean(channel));
                self.push(
                    format!("{prefix}_stenosis_{}", reference.suffix()),
                    Measure::stenosis(reference_mean, local()),
                );
            }
        }
    }

    fn remodeling_features(&mut self) {
        let locals = [
            ("MLA", Measure::AtMla(Channel::Eem)),
            ("worst", Measure::region(RegionKind::Worst5mm, Statistic::Mean(Channel::Eem))),
        ];
        let references = [("ref", RegionKind::Average), ("prox5", RegionKind::Proximal5mm)];
        for (local_name, local) in locals {
            for (reference_name, reference) in references {
                self.push(
                    format!("RI_{local_name}_{reference_name}"),
                    Measure::remodeling(
                        local.clone(),
                        Measure::region(reference, Statistic::Mean(Channel::Eem)),
                    ),
                );
            }
        }
    }

    fn variance_features(&mut self) {
        let worst = |channel| Measure::region(RegionKind::Worst5mm, Statistic::Variance(channel));
        let filtered =
            |channel| Measure::filtered_roi(Statistic::Variance(channel), MODERATE_BURDEN);

        self.push("variance_lumen_worst", worst(Channel::Lumen));
        self.push("variance_lumen_PB40", filtered(Channel::Lumen));
        self.push("variance_plaque_worst", worst(Channel::Plaque));
        self.push("variance_plaque_PB40", filtered(Channel::Plaque));
        self.push("long_eccentricity_worst", worst(Channel::Plaque));
        self.push("long_eccentricity_PB40", filtered(Channel::Plaque));
    }
}

/// The area statistic family with names suffixed by `suffix`
fn area_statistics(suffix: &str, with_max: bool) -> Vec<(String, Statistic)> {
    let mut family: Vec<(String, Statistic)> = LUMEN_THRESHOLDS
        .iter()
        .map(|&(tag, threshold)| {
            (
                format!("No_lumen{tag}_{suffix}"),
                Statistic::CountBelowArea { threshold },
            )
        })
        .collect();
    family.extend([
        (format!("Sum_plaque_{suffix}"), Statistic::Sum(Channel::Plaque)),
        (format!("Sum_EEM_{suffix}"), Statistic::Sum(Channel::Eem)),
        (format!("PB_{suffix}"), Statistic::BurdenRatio),
        (format!("mean_lumen_{suffix}"), Statistic::Mean(Channel::Lumen)),
        (format!("mean_plaque_{suffix}"), Statistic::Mean(Channel::Plaque)),
        (format!("mean_EEM_{suffix}"), Statistic::Mean(Channel::Eem)),
    ]);
    if with_max {
        family.push((format!("max_EEM_{suffix}"), Statistic::Max(Channel::Eem)));
    }
    family
}
