use sfm_core::{
    nalgebra::{Matrix3, Point2, Point3, Rotation3, Vector3},
    FeatureMatch, Rigid3d,
};
use sfm_geom::{
    EssentialMatrix, FundamentalMatrix, Homography, TwoViewGeometry, TwoViewGeometryConfig,
};

const SAMPLE_POINTS: usize = 16;
const RESIDUAL_THRESHOLD: f64 = 1e-9;
const ROUND_TRIP_THRESHOLD: f64 = 1e-9;

const ROT_MAGNITUDE: f64 = 0.2;
const POINT_BOX_SIZE: f64 = 2.0;
const POINT_DISTANCE: f64 = 3.0;
const PLANE_DISTANCE: f64 = 4.0;

#[test]
fn randomized() {
    let _ = pretty_env_logger::try_init();
    let successes = (0..1000).filter(|_| run_round()).count();
    eprintln!("successes: {}", successes);
    assert_eq!(successes, 1000);
}

fn intrinsics() -> (Matrix3<f64>, Matrix3<f64>) {
    (
        Matrix3::new(520.0, 0.0, 320.0, 0.0, 520.0, 240.0, 0.0, 0.0, 1.0),
        Matrix3::new(700.0, 0.0, 400.0, 0.0, 700.0, 300.0, 0.0, 0.0, 1.0),
    )
}

fn normalized(p: &Point3<f64>) -> Point2<f64> {
    Point2::new(p.x / p.z, p.y / p.z)
}

fn pixel(k: &Matrix3<f64>, p: &Point3<f64>) -> Point2<f64> {
    let n = normalized(p);
    Point2::from_homogeneous(k * n.to_homogeneous()).unwrap()
}

fn run_round() -> bool {
    let mut success = true;
    let (k1, k2) = intrinsics();
    let (cam2_from_cam1, cams_a, cams_b) = some_test_data();

    let essential = EssentialMatrix::from(cam2_from_cam1);
    let fundamental = FundamentalMatrix::from_essential(&essential, &k1, &k2).unwrap();
    let normal = Vector3::z();
    let homography =
        Homography::from_plane(&cam2_from_cam1, &normal, PLANE_DISTANCE, &k1, &k2).unwrap();

    let geometry = TwoViewGeometry {
        config: TwoViewGeometryConfig::Calibrated,
        fundamental,
        essential,
        homography,
        cam2_from_cam1: Some(cam2_from_cam1),
        inlier_matches: (0..SAMPLE_POINTS as u32)
            .map(|ix| FeatureMatch::new(ix, ix + 100))
            .collect(),
        tri_angle: 0.1,
    };
    let inverted = geometry.inverted();

    // The inverted epipolar matrices must accept the correspondences in the swapped order.
    let f_scale = inverted.fundamental.amax();
    let e_scale = inverted.essential.amax();
    for (a, b) in cams_a.iter().zip(&cams_b) {
        let e_residual = inverted.essential.residual(&normalized(b), &normalized(a)) / e_scale;
        let f_residual =
            inverted.fundamental.residual(&pixel(&k2, b), &pixel(&k1, a)) / f_scale;
        if e_residual > RESIDUAL_THRESHOLD || f_residual > RESIDUAL_THRESHOLD {
            success = false;
            eprintln!("failed residual check: {} {}", e_residual, f_residual);
        }
    }

    // The inverted pose must map view 2 points back into view 1.
    let cam1_from_cam2 = inverted.cam2_from_cam1.unwrap();
    for (a, b) in cams_a.iter().zip(&cams_b) {
        if (cam1_from_cam2.transform_point(b) - a).norm() > RESIDUAL_THRESHOLD {
            success = false;
            eprintln!("failed pose check");
        }
    }

    // The inverted homography must map plane points of view 2 back to view 1.
    let on_plane = Point3::new(0.3, -0.4, PLANE_DISTANCE);
    let transferred = inverted
        .homography
        .transfer(&pixel(&k2, &cam2_from_cam1.transform_point(&on_plane)))
        .unwrap();
    if (transferred - pixel(&k1, &on_plane)).norm() > 1e-6 {
        success = false;
        eprintln!("failed homography check");
    }

    // Inverting twice restores everything.
    let restored = inverted.inverted();
    if restored.fundamental != geometry.fundamental
        || restored.essential != geometry.essential
        || restored.inlier_matches != geometry.inlier_matches
    {
        success = false;
        eprintln!("transpose or swap did not round trip exactly");
    }
    let homography_error = (restored.homography.0 - geometry.homography.0).amax()
        / geometry.homography.amax();
    let pose_error = restored
        .cam2_from_cam1
        .unwrap()
        .residual(&geometry.cam2_from_cam1.unwrap());
    if homography_error > ROUND_TRIP_THRESHOLD || pose_error > ROUND_TRIP_THRESHOLD {
        success = false;
        eprintln!("failed round trip: {} {}", homography_error, pose_error);
    }

    success
}

/// Gets a random relative pose and the camera points of both views.
fn some_test_data() -> (Rigid3d, Vec<Point3<f64>>, Vec<Point3<f64>>) {
    // The translation is kept mostly sideways so points stay in front of both cameras.
    let mut translation = Vector3::new_random() - Vector3::repeat(0.5);
    translation.z *= 0.1;
    let cam2_from_cam1 = Rigid3d::from_parts(
        translation,
        Rotation3::new(
            (Vector3::new_random() - Vector3::repeat(0.5)) * std::f64::consts::PI * ROT_MAGNITUDE,
        ),
    );

    let cams_a = (0..SAMPLE_POINTS)
        .map(|_| {
            let mut a = Point3::from(Vector3::new_random() * POINT_BOX_SIZE);
            a.x -= 0.5 * POINT_BOX_SIZE;
            a.y -= 0.5 * POINT_BOX_SIZE;
            a.z += POINT_DISTANCE;
            a
        })
        .collect::<Vec<_>>();
    let cams_b = cams_a
        .iter()
        .map(|a| cam2_from_cam1.transform_point(a))
        .collect();

    (cam2_from_cam1, cams_a, cams_b)
}
