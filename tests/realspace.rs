mod common;

use common::synthetic_image::honeycomb_points;
use lattice_scale::image::ImageF32;
use lattice_scale::scale::realspace::{
    polygon_rmsd, stable_polygons, triangulate, PolygonTemplate, RealSpaceCalibrator,
    RealSpaceParams,
};
use lattice_scale::scale::{CrystalSystem, ScaleMethod, GRAPHENE_LATTICE_CONSTANT_NM};
use lattice_scale::{ScaleDetector, ScaleError, ScaleParams};

const SIZE: usize = 256;
const TRUE_SAMPLING: f32 = 0.01;

fn side_px() -> f32 {
    GRAPHENE_LATTICE_CONSTANT_NM / 3.0f32.sqrt() / TRUE_SAMPLING
}

fn sweep_params(min: f32, max: f32) -> RealSpaceParams {
    RealSpaceParams {
        alpha: 0.3,
        rmsd_max: 1.0,
        min_sampling: min,
        max_sampling: max,
        step: 0.0005,
    }
}

fn calibrator(params: &RealSpaceParams) -> RealSpaceCalibrator {
    let template = PolygonTemplate::new(
        CrystalSystem::Hexagonal.reference_polygon(GRAPHENE_LATTICE_CONSTANT_NM),
    )
    .expect("hexagon");
    RealSpaceCalibrator::new(template, params)
}

#[test]
fn honeycomb_decomposes_into_hexagons() {
    let points = honeycomb_points(SIZE, SIZE, side_px(), 0.05);
    let triangles = triangulate(&points);
    let polygons = stable_polygons(&points, &triangles, 0.3);

    let template = calibrator(&sweep_params(0.01, 0.01))
        .template
        .scaled(TRUE_SAMPLING);
    let matching = polygons
        .iter()
        .filter(|p| {
            let vertices: Vec<[f32; 2]> = p.iter().map(|&i| points[i]).collect();
            polygon_rmsd(&vertices, &template).is_some_and(|d| d < 0.3)
        })
        .count();
    // Roughly one hexagon per lattice cell away from the image border.
    assert!(matching > 60, "{matching} hexagons out of {} polygons", polygons.len());
}

#[test]
fn sweep_recovers_true_sampling() {
    let _ = env_logger::builder().is_test(true).try_init();
    let image = ImageF32::new(SIZE, SIZE);
    let points = honeycomb_points(SIZE, SIZE, side_px(), 0.05);
    let mut detector = |_: &ImageF32, _: f32| points.clone();

    let params = sweep_params(0.008, 0.012);
    let outcome = calibrator(&params)
        .calibrate(&image, &mut detector)
        .expect("hexagons accepted");
    assert_eq!(outcome.samples.len(), 9);
    assert!(
        (outcome.sampling - TRUE_SAMPLING).abs() <= params.step,
        "sampling={} best={:?}",
        outcome.sampling,
        outcome.best
    );
    assert!(outcome.best.score > 0.3, "score={}", outcome.best.score);
    // Samplings far from the truth accept nothing.
    assert_eq!(outcome.samples[0].accepted, 0);
    assert_eq!(outcome.samples[8].accepted, 0);
}

#[test]
fn sweep_without_truth_fails_explicitly() {
    let image = ImageF32::new(SIZE, SIZE);
    let points = honeycomb_points(SIZE, SIZE, side_px(), 0.05);
    let mut detector = |_: &ImageF32, _: f32| points.clone();

    let params = sweep_params(0.02, 0.03);
    let calibrator = calibrator(&params);
    assert_eq!(calibrator.sweep(&image, &mut detector), Ok(None));
    assert_eq!(
        calibrator.calibrate(&image, &mut detector),
        Err(ScaleError::CalibrationNotFound {
            min_sampling: 0.02,
            max_sampling: 0.03
        })
    );
}

#[test]
fn detector_runs_real_space_strategy() {
    let image = ImageF32::new(SIZE, SIZE);
    let points = honeycomb_points(SIZE, SIZE, side_px(), 0.05);
    let params = ScaleParams {
        method: ScaleMethod::RealSpace,
        real_space: sweep_params(0.009, 0.011),
        ..ScaleParams::default()
    };
    let mut detector = ScaleDetector::new(params).expect("hexagonal");
    // A model that only fires near its training sampling.
    let report = detector
        .detect_scale_real_space(&image, |_: &ImageF32, s: f32| {
            if (s - TRUE_SAMPLING).abs() < 0.0012 {
                points.clone()
            } else {
                Vec::new()
            }
        })
        .expect("calibrated");
    assert_eq!(report.method, ScaleMethod::RealSpace);
    assert!((report.scale - TRUE_SAMPLING).abs() <= 0.0005, "scale={}", report.scale);
    assert!(report.coverage.is_some_and(|c| c > 0.3));
    assert!(report.radius.is_none());
}
