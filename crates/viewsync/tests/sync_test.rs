//! Integration tests for grouped camera synchronization.

use std::cell::Cell;
use std::rc::Rc;

use viewsync::*;

/// A shared, manually-advanced media clock.
#[derive(Clone, Default)]
struct TestClock {
    time: Rc<Cell<f64>>,
    duration: Rc<Cell<Option<f64>>>,
}

impl MediaClock for TestClock {
    fn current_time(&self) -> f64 {
        self.time.get()
    }

    fn duration(&self) -> Option<f64> {
        self.duration.get()
    }
}

fn translated(z: f32) -> ExtrinsicMatrix {
    ExtrinsicMatrix::from_rows([
        [1.0, 0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, z],
    ])
}

fn grouped_viewer(name: &str, group: &str) -> Viewer {
    Viewer::new(
        name,
        ViewerOptions::default().with_group(group),
        Box::new(OrbitCamera::new(640, 480)),
    )
}

fn hub_with_group(names: &[&str], group: &str) -> ViewerHub {
    let mut hub = ViewerHub::new();
    for name in names {
        hub.add_viewer(grouped_viewer(name, group)).unwrap();
    }
    hub
}

#[test]
fn test_duplicate_viewer_rejected() {
    let mut hub = hub_with_group(&["a"], "g");
    let err = hub.add_viewer(grouped_viewer("a", "g")).unwrap_err();
    assert!(matches!(err, ViewsyncError::ViewerExists(_)));
}

#[test]
fn test_sync_toggle_propagates_one_hop() {
    let mut hub = hub_with_group(&["a", "b", "c"], "g");

    hub.set_sync_enabled("a", true).unwrap();
    assert!(hub.viewer("a").unwrap().sync_enabled());
    assert!(hub.viewer("b").unwrap().sync_enabled());
    assert!(hub.viewer("c").unwrap().sync_enabled());

    // Toggling from another member converges the same way; the fact that
    // this terminates at all shows receivers do not re-broadcast.
    hub.set_sync_enabled("b", false).unwrap();
    assert!(!hub.viewer("a").unwrap().sync_enabled());
    assert!(!hub.viewer("b").unwrap().sync_enabled());
    assert!(!hub.viewer("c").unwrap().sync_enabled());
}

#[test]
fn test_camera_broadcast_copies_state_verbatim() {
    let mut hub = hub_with_group(&["a", "b", "c"], "g");
    hub.add_viewer(Viewer::new(
        "loner",
        ViewerOptions::default(),
        Box::new(OrbitCamera::new(640, 480)),
    ))
    .unwrap();
    let loner_before = hub.viewer("loner").unwrap().camera_state();

    {
        let camera = hub.viewer_mut("a").unwrap().camera_mut();
        camera.set_position(Vec3::new(4.0, -2.0, 1.0));
        camera.set_target(Vec3::new(0.0, 0.0, 1.0));
        camera.set_fov_y_degrees(42.0);
        camera.set_zoom(1.5);
    }
    hub.notify_camera_changed("a").unwrap();

    let expected = hub.viewer("a").unwrap().camera_state();
    assert_eq!(hub.viewer("b").unwrap().camera_state(), expected);
    assert_eq!(hub.viewer("c").unwrap().camera_state(), expected);
    // Viewers outside the group are untouched.
    assert_eq!(hub.viewer("loner").unwrap().camera_state(), loner_before);
}

#[test]
fn test_broadcast_not_echoed_while_applying_external() {
    let mut hub = hub_with_group(&["a", "b"], "g");

    {
        let camera = hub.viewer_mut("a").unwrap().camera_mut();
        camera.set_position(Vec3::new(9.0, 9.0, 9.0));
    }
    hub.notify_camera_changed("a").unwrap();
    let b_state = hub.viewer("b").unwrap().camera_state();

    // Moving "b" back and notifying works normally afterwards: the
    // suppression window is scoped to the apply itself.
    {
        let camera = hub.viewer_mut("b").unwrap().camera_mut();
        camera.set_position(Vec3::new(-3.0, 0.0, 0.0));
    }
    hub.notify_camera_changed("b").unwrap();
    assert_eq!(
        hub.viewer("a").unwrap().camera_state().position,
        Vec3::new(-3.0, 0.0, 0.0)
    );
    assert_ne!(b_state.position, Vec3::new(-3.0, 0.0, 0.0));
}

#[test]
fn test_user_interaction_disables_sync_group_wide() {
    let mut hub = hub_with_group(&["a", "b", "c"], "g");
    hub.set_sync_enabled("a", true).unwrap();

    hub.begin_camera_interaction("b").unwrap();
    assert!(!hub.viewer("a").unwrap().sync_enabled());
    assert!(!hub.viewer("b").unwrap().sync_enabled());
    assert!(!hub.viewer("c").unwrap().sync_enabled());

    // Without sync enabled the gesture start is a no-op.
    hub.begin_camera_interaction("b").unwrap();
    assert!(!hub.viewer("b").unwrap().sync_enabled());
}

#[test]
fn test_video_frame_drives_pose_and_group() {
    let mut hub = hub_with_group(&["a", "b"], "g");

    let clock = TestClock::default();
    clock.duration.set(Some(10.0));
    let poses = PoseSequence::from_poses((0u8..5).map(|i| translated(-f32::from(i))).collect())
        .unwrap();
    hub.viewer_mut("a")
        .unwrap()
        .attach_video_sync(Box::new(clock.clone()), poses, None);

    hub.set_sync_enabled("a", true).unwrap();

    // t = 5 of 10 over 5 poses: index round(0.5 * 4) = 2.
    let action = hub.on_video_frame("a", Some(5.0)).unwrap();
    assert_eq!(action, FrameCallbackAction::Rearm);
    let position = hub.viewer("a").unwrap().camera_state().position;
    assert!((position - Vec3::new(0.0, 0.0, 2.0)).length() < 1e-5);

    // Applying a video pose must not broadcast to the group by itself.
    let b_position = hub.viewer("b").unwrap().camera_state().position;
    assert_ne!(b_position, position);
}

#[test]
fn test_removed_viewer_stops_receiving() {
    let mut hub = hub_with_group(&["a", "b"], "g");

    let removed = hub.remove_viewer("b").unwrap();
    let before = removed.camera_state();

    {
        let camera = hub.viewer_mut("a").unwrap().camera_mut();
        camera.set_position(Vec3::new(1.0, 1.0, 1.0));
    }
    hub.notify_camera_changed("a").unwrap();

    assert_eq!(removed.camera_state(), before);
    assert!(hub.viewer("b").is_none());
    assert!(hub.registry().members_of("g").unwrap() == vec!["a".to_string()]);
}

#[test]
fn test_unknown_viewer_errors() {
    let mut hub = ViewerHub::new();
    assert!(matches!(
        hub.notify_camera_changed("ghost").unwrap_err(),
        ViewsyncError::ViewerNotFound(_)
    ));
    assert!(matches!(
        hub.set_sync_enabled("ghost", true).unwrap_err(),
        ViewsyncError::ViewerNotFound(_)
    ));
}

#[test]
fn test_resize_reapplies_intrinsics() {
    let mut hub = hub_with_group(&["a"], "g");
    let k = IntrinsicMatrix::from_rows([
        [500.0, 0.0, 310.0],
        [0.0, 500.0, 240.0],
        [0.0, 0.0, 1.0],
    ]);
    hub.viewer_mut("a")
        .unwrap()
        .set_pinhole_intrinsics(k, 640, 480);
    let fov = hub.viewer("a").unwrap().camera_state().fov_y_degrees;

    // Simulate a host resize: the render target changed, the projection
    // parameters derived from (K, W, H) must survive re-application.
    hub.handle_resize("a").unwrap();
    let state = hub.viewer("a").unwrap().camera_state();
    assert!((state.fov_y_degrees - fov).abs() < 1e-4);
}

#[test]
fn test_pose_pipeline_end_to_end() {
    // Text payload -> normalizer -> viewer camera, camera-to-world input.
    let payload = "1 0 0 4\n0 1 0 5\n0 0 1 6\n";
    let poses = parse_poses(payload, PoseConvention::CameraToWorld).unwrap();

    let mut hub = hub_with_group(&["a"], "g");
    let clock = TestClock::default();
    clock.duration.set(Some(1.0));
    hub.viewer_mut("a")
        .unwrap()
        .attach_video_sync(Box::new(clock), poses, None);
    hub.set_sync_enabled("a", true).unwrap();
    hub.on_video_frame("a", Some(0.0)).unwrap();

    // Recovered camera center equals the camera-to-world translation.
    let position = hub.viewer("a").unwrap().camera_state().position;
    assert!((position - Vec3::new(4.0, 5.0, 6.0)).length() < 1e-4);
}
