use pullback_signal::{MovingAverage, Series, SignalPair};
use stenosis_features::{
    BurdenSignal, FeatureCatalog, LesionInterval, LesionParams, LesionSegmenter, LesionSet,
    RegionKind, RegionResolver,
};

/// Burden 0.25 everywhere except 0.5 over `[start, end]`
fn single_lesion_case(
    len: usize,
    distal: usize,
    os: usize,
    start: usize,
    end: usize,
) -> SignalPair {
    let mut lumen = vec![6.0; len];
    let mut plaque = vec![2.0; len];
    for frame in start..=end {
        lumen[frame] = 4.0;
        plaque[frame] = 4.0;
    }
    SignalPair::new(lumen, plaque, distal, os).unwrap()
}

#[test]
fn test_single_lesion_round_trip() {
    let case = single_lesion_case(2000, 100, 1900, 700, 1100);
    let burden = BurdenSignal::from_pair(&case);
    let lesions = LesionSegmenter::default().segment(&burden, 100, 1900).unwrap();

    assert_eq!(
        lesions,
        LesionSet::Lesions(vec![LesionInterval { start: 700, end: 1100 }])
    );

    let resolver = RegionResolver::new(&case, &lesions);
    let proximal = resolver.resolve(RegionKind::ProximalRef).span().unwrap();
    assert_eq!(proximal.start, 1100);
    assert_eq!(proximal.end, 1900);
    let distal = resolver.resolve(RegionKind::DistalRef).span().unwrap();
    assert_eq!(distal.start, 100);
    assert_eq!(distal.end, 700);
}

#[test]
fn test_catalog_over_lesion_case() {
    let catalog = FeatureCatalog::standard(LesionParams::default());
    let case = single_lesion_case(2000, 100, 1900, 700, 1100);
    let row = catalog.evaluate_all(&case);

    assert_eq!(row.len(), catalog.len());
    assert!(row.iter().all(|v| v.is_finite()));

    let value = |name: &str| {
        let index = catalog.names().position(|n| n == name).unwrap();
        row[index]
    };
    assert_eq!(value("len_PB40"), 400.0);
    assert_eq!(value("OS_PB40"), 800.0);
    assert_eq!(value("MLA"), 4.0);
    assert_eq!(value("PB_PB40"), 0.5);
    assert_eq!(value("No_lumen40_PB40"), 0.0);
    assert_eq!(value("No_lumen40_ROI"), 0.0);
    // Proximal 5 mm starts on the last lesion frame
    let reference = (4.0 + 299.0 * 6.0) / 300.0;
    assert!((value("area1_stenosis_prox5") - (reference - 4.0) / reference).abs() < 1e-12);
}

#[test]
fn test_no_lesion_case_zeroes_reference_features() {
    let catalog = FeatureCatalog::standard(LesionParams::default());
    let case = SignalPair::new(vec![6.0; 1500], vec![2.0; 1500], 0, 1500).unwrap();
    let row = catalog.evaluate_all(&case);

    let reference_features = [
        "len_PB40",
        "OS_PB70",
        "mean_lumen_prox",
        "Sum_EEM_dist5",
        "mean_EEM_aver",
        "RI_worst_ref",
    ];
    for name in reference_features {
        let index = catalog.names().position(|n| n == name).unwrap();
        assert_eq!(row[index], 0.0, "{name}");
    }
}

#[test]
fn test_smoothed_signals_evaluate() {
    let raw = single_lesion_case(2000, 100, 1900, 700, 1100);
    let smoother = MovingAverage::default();
    let lumen: Series = smoother.apply(raw.lumen());
    let plaque: Series = smoother.apply(raw.plaque());
    assert_eq!(lumen.len(), 2000);

    let case = SignalPair::new(lumen, plaque, 100, 1900).unwrap();
    let row = FeatureCatalog::standard(LesionParams::default()).evaluate_all(&case);
    assert!(row.iter().all(|v| v.is_finite()));
}
