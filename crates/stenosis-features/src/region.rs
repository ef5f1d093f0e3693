//! Analysis Regions
//!
//! Regions are derived from the ROI, the minimum-lumen frame and the lesion
//! boundaries of one case. Lesion-anchored regions resolve to
//! [`Region::Empty`] when the case has no lesion or when the lesion touches
//! the corresponding landmark. Statistics over an empty region are `0`, so a
//! zero feature may mean "not computable" rather than "zero".

use crate::lesion::LesionSet;
use crate::FIVE_MM_FRAMES;
use pullback_signal::{FrameRange, SignalPair};
use serde::{Deserialize, Serialize};

/// Kinds of analysis region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegionKind {
    /// `[distal, os)`
    Roi,
    /// 5 mm window centered on the minimum lumen area, clipped to the ROI
    Worst5mm,
    /// From the end of the last lesion to OS
    ProximalRef,
    /// From distal to the start of the first lesion
    DistalRef,
    /// First 5 mm of the proximal reference
    Proximal5mm,
    /// Last 5 mm of the distal reference
    Distal5mm,
    /// Mean of the proximal and distal 5 mm statistics
    Average,
}

impl RegionKind {
    /// Suffix used in feature names
    pub fn suffix(&self) -> &'static str {
        match self {
            RegionKind::Roi => "ROI",
            RegionKind::Worst5mm => "worst",
            RegionKind::ProximalRef => "prox",
            RegionKind::DistalRef => "distal",
            RegionKind::Proximal5mm => "prox5",
            RegionKind::Distal5mm => "dist5",
            RegionKind::Average => "aver",
        }
    }

    /// Whether resolving this kind needs the lesion boundaries
    pub fn is_lesion_anchored(&self) -> bool {
        !matches!(self, RegionKind::Roi | RegionKind::Worst5mm)
    }
}

/// A resolved region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    /// Contiguous frames
    Span(FrameRange),
    /// Virtual region averaging two 5 mm references
    Average {
        proximal: Option<FrameRange>,
        distal: Option<FrameRange>,
    },
    /// Not defined for this case
    Empty,
}

impl Region {
    fn from_span(range: Option<FrameRange>) -> Self {
        match range {
            Some(range) if !range.is_empty() => Region::Span(range),
            _ => Region::Empty,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Region::Empty)
    }

    /// Frames of a contiguous region
    pub fn span(&self) -> Option<FrameRange> {
        match self {
            Region::Span(range) => Some(*range),
            _ => None,
        }
    }
}

/// Resolves region kinds against one case and its lesions
#[derive(Debug, Clone, Copy)]
pub struct RegionResolver<'a> {
    case: &'a SignalPair,
    lesions: &'a LesionSet,
}

impl<'a> RegionResolver<'a> {
    pub fn new(case: &'a SignalPair, lesions: &'a LesionSet) -> Self {
        Self { case, lesions }
    }

    /// Resolve a region kind
    pub fn resolve(&self, kind: RegionKind) -> Region {
        match kind {
            RegionKind::Roi => Region::Span(self.roi()),
            RegionKind::Worst5mm => Region::Span(self.worst_5mm()),
            RegionKind::ProximalRef => Region::from_span(self.proximal_ref()),
            RegionKind::DistalRef => Region::from_span(self.distal_ref()),
            RegionKind::Proximal5mm => Region::from_span(self.proximal_5mm()),
            RegionKind::Distal5mm => Region::from_span(self.distal_5mm()),
            RegionKind::Average => Region::Average {
                proximal: self.proximal_5mm(),
                distal: self.distal_5mm(),
            },
        }
    }

    pub fn roi(&self) -> FrameRange {
        self.case.roi().frames()
    }

    /// First frame of minimum lumen area inside the ROI
    pub fn mla_frame(&self) -> usize {
        self.case
            .lumen()
            .argmin_in(self.roi())
            .unwrap_or(self.case.distal())
    }

    /// `[mla - 150, mla + 150)`, each side clipped at its landmark
    pub fn worst_5mm(&self) -> FrameRange {
        let half = FIVE_MM_FRAMES / 2;
        let mla = self.mla_frame();
        FrameRange::new(
            mla.saturating_sub(half).max(self.case.distal()),
            (mla + half).min(self.case.os()),
        )
    }

    /// `[last.end, os)` when the last lesion ends before OS
    pub fn proximal_ref(&self) -> Option<FrameRange> {
        let last = self.lesions.last()?;
        (last.end < self.case.os()).then(|| FrameRange::new(last.end, self.case.os()))
    }

    /// `[distal, first.start)` when the first lesion starts after distal
    pub fn distal_ref(&self) -> Option<FrameRange> {
        let first = self.lesions.first()?;
        let distal = self.case.distal();
        (first.start > distal).then(|| FrameRange::new(distal, first.start))
    }

    /// Up to 5 mm of the proximal reference next to the lesion
    pub fn proximal_5mm(&self) -> Option<FrameRange> {
        let reference = self.proximal_ref()?;
        Some(FrameRange::new(
            reference.start,
            (reference.start + FIVE_MM_FRAMES).min(reference.end),
        ))
    }

    /// Up to 5 mm of the distal reference next to the lesion
    pub fn distal_5mm(&self) -> Option<FrameRange> {
        let reference = self.distal_ref()?;
        Some(FrameRange::new(
            reference.end.saturating_sub(FIVE_MM_FRAMES).max(reference.start),
            reference.end,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lesion::LesionInterval;

    fn case_with_mla(len: usize, distal: usize, os: usize, mla: usize) -> SignalPair {
        let mut lumen = vec![5.0; len];
        lumen[mla] = 1.0;
        SignalPair::new(lumen, vec![2.0; len], distal, os).unwrap()
    }

    fn lesions(intervals: &[(usize, usize)]) -> LesionSet {
        LesionSet::from_intervals(
            intervals
                .iter()
                .map(|&(start, end)| LesionInterval { start, end })
                .collect(),
        )
    }

    #[test]
    fn test_roi() {
        let case = case_with_mla(1000, 100, 900, 500);
        let none = LesionSet::NoLesion;
        let resolver = RegionResolver::new(&case, &none);
        assert_eq!(resolver.resolve(RegionKind::Roi), Region::Span(FrameRange::new(100, 900)));
    }

    #[test]
    fn test_worst_window_centered() {
        let case = case_with_mla(1000, 0, 1000, 500);
        let none = LesionSet::NoLesion;
        let resolver = RegionResolver::new(&case, &none);
        assert_eq!(resolver.worst_5mm(), FrameRange::new(350, 650));
    }

    #[test]
    fn test_worst_window_clipped_at_distal() {
        let case = case_with_mla(1000, 0, 1000, 50);
        let none = LesionSet::NoLesion;
        let resolver = RegionResolver::new(&case, &none);
        assert_eq!(resolver.worst_5mm(), FrameRange::new(0, 200));
    }

    #[test]
    fn test_worst_window_clipped_at_os() {
        let case = case_with_mla(1000, 100, 800, 760);
        let none = LesionSet::NoLesion;
        let resolver = RegionResolver::new(&case, &none);
        assert_eq!(resolver.worst_5mm(), FrameRange::new(610, 800));
    }

    #[test]
    fn test_mla_ignores_frames_outside_roi() {
        let case = case_with_mla(1000, 100, 800, 50);
        let none = LesionSet::NoLesion;
        let resolver = RegionResolver::new(&case, &none);
        // Flat ROI: first ROI frame wins
        assert_eq!(resolver.mla_frame(), 100);
    }

    #[test]
    fn test_no_lesion_references_are_empty() {
        let case = case_with_mla(1000, 0, 1000, 500);
        let none = LesionSet::NoLesion;
        let resolver = RegionResolver::new(&case, &none);
        for kind in [
            RegionKind::ProximalRef,
            RegionKind::DistalRef,
            RegionKind::Proximal5mm,
            RegionKind::Distal5mm,
        ] {
            assert!(resolver.resolve(kind).is_empty(), "{kind:?}");
        }
        assert_eq!(
            resolver.resolve(RegionKind::Average),
            Region::Average {
                proximal: None,
                distal: None
            }
        );
    }

    #[test]
    fn test_references_around_lesions() {
        let case = case_with_mla(3000, 100, 2900, 1500);
        let set = lesions(&[(500, 900), (1400, 1900)]);
        let resolver = RegionResolver::new(&case, &set);

        assert_eq!(resolver.distal_ref(), Some(FrameRange::new(100, 500)));
        assert_eq!(resolver.proximal_ref(), Some(FrameRange::new(1900, 2900)));
        assert_eq!(resolver.distal_5mm(), Some(FrameRange::new(200, 500)));
        assert_eq!(resolver.proximal_5mm(), Some(FrameRange::new(1900, 2200)));
    }

    #[test]
    fn test_short_references_used_whole() {
        let case = case_with_mla(1000, 100, 900, 500);
        let set = lesions(&[(250, 800)]);
        let resolver = RegionResolver::new(&case, &set);

        assert_eq!(resolver.distal_5mm(), Some(FrameRange::new(100, 250)));
        assert_eq!(resolver.proximal_5mm(), Some(FrameRange::new(800, 900)));
    }

    #[test]
    fn test_lesion_touching_landmarks() {
        let case = case_with_mla(1000, 100, 900, 500);
        let set = lesions(&[(100, 900)]);
        let resolver = RegionResolver::new(&case, &set);

        assert!(resolver.resolve(RegionKind::ProximalRef).is_empty());
        assert!(resolver.resolve(RegionKind::DistalRef).is_empty());
        assert!(resolver.resolve(RegionKind::Proximal5mm).is_empty());
        assert!(resolver.resolve(RegionKind::Distal5mm).is_empty());
    }
}
