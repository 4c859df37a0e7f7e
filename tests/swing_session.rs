use nalgebra::{Rotation3, Vector3};

use swing_analyst::config::Config;
use swing_analyst::pose::{Landmark, LandmarkIndex};
use swing_analyst::session::SwingSession;

const FRAMES: usize = 60;
const TOP_OF_SWING: usize = 24;

/// Shoulder turn in degrees: back to -90 at frame 24, through to +30 at 40.
fn shoulder_turn(i: usize) -> f32 {
    if i <= TOP_OF_SWING {
        -90.0 * i as f32 / TOP_OF_SWING as f32
    } else if i <= 40 {
        -90.0 + 120.0 * (i - TOP_OF_SWING) as f32 / 16.0
    } else {
        30.0
    }
}

/// Lead wrist forward position: still on the backswing, fast through 25..=32,
/// then drifting back.
fn wrist_forward(i: usize) -> f32 {
    match i {
        0..=24 => 0.0,
        25..=32 => 0.1 * (i - 24) as f32,
        _ => 0.8 - 0.02 * (i - 32) as f32,
    }
}

fn line(deg: f32, half: f32, z: f32) -> (Vector3<f32>, Vector3<f32>) {
    let (s, c) = deg.to_radians().sin_cos();
    (
        Vector3::new(-c * half, -s * half, z),
        Vector3::new(c * half, s * half, z),
    )
}

fn world_frame(i: usize) -> Vec<Vector3<f32>> {
    let shoulder = shoulder_turn(i);
    let mut points = vec![Vector3::new(0.0, 0.0, 0.6); LandmarkIndex::COUNT];
    let mut set = |idx: LandmarkIndex, p: Vector3<f32>| points[idx as usize] = p;

    let (ls, rs) = line(shoulder, 0.2, 0.5);
    let (lh, rh) = line(shoulder / 2.0, 0.15, 0.0);
    let (lf, rf) = line(0.0, 0.2, -0.9);
    set(LandmarkIndex::LeftShoulder, ls);
    set(LandmarkIndex::RightShoulder, rs);
    set(LandmarkIndex::LeftHip, lh);
    set(LandmarkIndex::RightHip, rh);
    set(LandmarkIndex::LeftHeel, lf);
    set(LandmarkIndex::RightHeel, rf);
    set(LandmarkIndex::LeftWrist, Vector3::new(-0.1, wrist_forward(i), 0.1));
    set(LandmarkIndex::RightElbow, Vector3::new(0.1, 0.1, 0.25));
    set(LandmarkIndex::RightWrist, Vector3::new(0.0, 0.2 + wrist_forward(i), 0.1));
    set(LandmarkIndex::RightThumb, Vector3::new(0.05, 0.25 + wrist_forward(i), 0.1));
    points
}

fn recording(transform: impl Fn(Vector3<f32>) -> Vector3<f32>) -> Vec<Vec<Option<Landmark>>> {
    (0..FRAMES)
        .map(|i| {
            world_frame(i)
                .into_iter()
                .map(|p| Some(Landmark::from(transform(p)).with_visibility(0.9)))
                .collect()
        })
        .collect()
}

fn run(frames: &[Vec<Option<Landmark>>]) -> SwingSession {
    let mut session = SwingSession::from_config(&Config::default());
    for frame in frames {
        session.push_frame(frame);
    }
    session
}

#[test]
fn synthetic_swing_produces_expected_metrics() {
    let session = run(&recording(|p| p));
    let report = session.finish().expect("swing should be analysed");
    let metrics = &report.metrics;

    assert_eq!(metrics.trajectory.len(), FRAMES);
    assert_eq!(metrics.top_of_swing_frame, TOP_OF_SWING);
    assert_eq!(metrics.shoulder_rotation, 90);
    assert_eq!(metrics.hip_rotation, 45);
    assert_eq!(metrics.x_factor, 45);
    assert_eq!(metrics.address_shoulder_angle, 0);
    assert_eq!(metrics.impact_frame, 35);
    assert_eq!(metrics.downswing_sequence, vec![28, 31, 35]);
    assert!(metrics.trajectory.iter().all(|pt| pt.x_factor >= 0.0));

    assert_eq!(report.address_frame, 0);
    assert!((report.top_of_swing_time_secs - 24.0 / 30.0).abs() < 1e-5);
    assert!((report.impact_time_secs - 35.0 / 30.0).abs() < 1e-5);

    assert_eq!(session.path().len(), FRAMES);
    assert_eq!(session.path().buffer().len(), FRAMES * 3);
}

#[test]
fn metrics_do_not_depend_on_camera_placement() {
    let rotation = Rotation3::from_euler_angles(0.3, -0.5, 1.2);
    let offset = Vector3::new(1.0, 2.0, 3.0);
    let moved = run(&recording(|p| rotation * p + offset))
        .finish()
        .expect("swing should be analysed");
    let reference = run(&recording(|p| p)).finish().unwrap();

    assert_eq!(moved.metrics.shoulder_rotation, reference.metrics.shoulder_rotation);
    assert_eq!(moved.metrics.hip_rotation, reference.metrics.hip_rotation);
    assert_eq!(moved.metrics.x_factor, reference.metrics.x_factor);
    assert_eq!(moved.metrics.top_of_swing_frame, reference.metrics.top_of_swing_frame);
    assert_eq!(moved.metrics.impact_frame, reference.metrics.impact_frame);
    assert!((moved.body_frame.origin - offset).norm() < 1e-5);
}

#[test]
fn recording_json_round_trips_through_session() {
    let frames = recording(|p| p);
    let json = serde_json::to_string(&frames).unwrap();
    let parsed: Vec<Vec<Option<Landmark>>> = serde_json::from_str(&json).unwrap();
    let report = run(&parsed).finish().unwrap();
    assert_eq!(report.metrics.top_of_swing_frame, TOP_OF_SWING);
}
