//! Demo: two synchronized viewers driven by a recorded camera trajectory.
//!
//! Builds a hub with two grouped viewers, loads a short camera-to-world
//! trajectory from an inline text payload, attaches both viewers to a fake
//! media clock, and steps playback. Enabling sync on one viewer enables the
//! whole group; a simulated user drag then takes both out of video sync.

use std::cell::Cell;
use std::rc::Rc;

use viewsync::*;

/// A manually-stepped media clock standing in for a real video element.
#[derive(Clone)]
struct DemoClock {
    time: Rc<Cell<f64>>,
    duration: f64,
}

impl MediaClock for DemoClock {
    fn current_time(&self) -> f64 {
        self.time.get()
    }

    fn duration(&self) -> Option<f64> {
        Some(self.duration)
    }
}

const TRAJECTORY: &str = "\
1 0 0 0
0 1 0 -4
0 0 1 1

1 0 0 1
0 1 0 -3.5
0 0 1 1.2

1 0 0 2
0 1 0 -3
0 0 1 1.4

1 0 0 3
0 1 0 -2.5
0 0 1 1.6
";

fn format_position(position: Vec3) -> String {
    format!(
        "({:6.2}, {:6.2}, {:6.2})",
        position.x, position.y, position.z
    )
}

fn print_positions(hub: &ViewerHub, label: &str) {
    let left = hub.viewer("left").unwrap().camera_state().position;
    let right = hub.viewer("right").unwrap().camera_state().position;
    println!(
        "{label:<28} left {}   right {}",
        format_position(left),
        format_position(right)
    );
}

fn main() -> Result<()> {
    env_logger::init();

    let mut hub = ViewerHub::new();
    let options = ViewerOptions::default().with_group("demo");
    hub.add_viewer(Viewer::new(
        "left",
        options.clone(),
        Box::new(OrbitCamera::new(640, 480)),
    ))?;
    hub.add_viewer(Viewer::new(
        "right",
        options,
        Box::new(OrbitCamera::new(640, 480)),
    ))?;

    // Pinhole intrinsics for the recording camera (640x480 source).
    let k = parse_intrinsics("[[500, 0, 320], [0, 500, 240], [0, 0, 1]]")?;
    hub.viewer_mut("left")
        .unwrap()
        .set_pinhole_intrinsics(k, 640, 480);
    println!(
        "left viewer FOV from intrinsics: {:.2} degrees\n",
        hub.viewer("left").unwrap().camera_state().fov_y_degrees
    );

    // The trajectory is recorded camera-to-world; normalize on ingest.
    let poses = parse_poses(TRAJECTORY, PoseConvention::CameraToWorld)?;
    println!("loaded {} poses\n", poses.len());

    // Both viewers watch the same clock; enabling sync on one enables the
    // whole group.
    let clock = DemoClock {
        time: Rc::new(Cell::new(0.0)),
        duration: 4.0,
    };
    hub.viewer_mut("left")
        .unwrap()
        .attach_video_sync(Box::new(clock.clone()), poses.clone(), None);
    hub.viewer_mut("right")
        .unwrap()
        .attach_video_sync(Box::new(clock.clone()), poses, None);
    hub.set_sync_enabled("left", true)?;

    print_positions(&hub, "sync enabled, t=0.0");

    // Step playback; every decoded frame drives both cameras.
    for step in 1..=4 {
        let t = f64::from(step);
        clock.time.set(t);
        hub.on_video_frame("left", Some(t))?;
        hub.on_video_frame("right", Some(t))?;
        print_positions(&hub, &format!("frame at t={t:.1}"));
    }

    // The user grabs the right viewer: video sync drops group-wide.
    hub.begin_camera_interaction("right")?;
    println!(
        "\nafter user drag: left sync={} right sync={}",
        hub.viewer("left").unwrap().sync_enabled(),
        hub.viewer("right").unwrap().sync_enabled()
    );

    hub.viewer_mut("right").unwrap().camera_mut().set_position(Vec3::new(5.0, 5.0, 5.0));
    hub.notify_camera_changed("right")?;
    print_positions(&hub, "after manual move of right");

    Ok(())
}
