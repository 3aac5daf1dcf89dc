//! viewsync-rs: camera-pose synchronization for external 3D viewers.
//!
//! The rendering engine, DOM/UI, and video decoding live elsewhere; this
//! library is the pipeline between them:
//!
//! - **Pose ingest** — heterogeneous pose payloads (JSON or free text, flat
//!   or nested, extrinsic or camera-to-world) normalized into canonical
//!   row-major 3x4 extrinsics.
//! - **Intrinsics mapping** — a pinhole `K` plus source resolution turned
//!   into a vertical FOV and an asymmetric-frustum view offset.
//! - **Video-driven cameras** — a media clock's playback position mapped to
//!   the nearest recorded pose, by per-frame callback or playback events.
//! - **Grouped synchronization** — any number of viewers in a named group
//!   kept in lockstep camera motion, with one-hop broadcasts and no feedback
//!   loops.
//!
//! # Quick Start
//!
//! ```no_run
//! use viewsync::*;
//!
//! fn main() -> Result<()> {
//!     let mut hub = ViewerHub::new();
//!
//!     let options = ViewerOptions::default().with_group("scene");
//!     hub.add_viewer(Viewer::new(
//!         "left",
//!         options.clone(),
//!         Box::new(OrbitCamera::new(640, 480)),
//!     ))?;
//!     hub.add_viewer(Viewer::new(
//!         "right",
//!         options,
//!         Box::new(OrbitCamera::new(640, 480)),
//!     ))?;
//!
//!     // Load a recorded trajectory and drive "left" from a media clock;
//!     // "right" follows through the group.
//!     let poses = fetch_poses("http://example.com/poses.txt", PoseConvention::Extrinsic)?;
//!     # let clock: Box<dyn MediaClock> = unimplemented!();
//!     hub.viewer_mut("left").unwrap().attach_video_sync(clock, poses, Some(30.0));
//!     hub.set_sync_enabled("left", true)?;
//!     Ok(())
//! }
//! ```

mod annotations;
mod camera;
mod hub;
mod loader;
mod video;
mod viewer;

// Re-export core types
pub use viewsync_core::{
    error::{Result, ViewsyncError},
    options::{RenderMode, ViewerOptions},
    registry::SyncRegistry,
    Mat3, Mat4, Quat, Vec2, Vec3, Vec4,
};

// Re-export the numeric core
pub use viewsync_pose::{
    index_from_fps, index_from_ratio, parse_intrinsics, parse_poses, CameraPose,
    ExtrinsicMatrix, IntrinsicMatrix, PoseBlock, PoseConvention, PoseSequence,
    ProjectionParams,
};

pub use annotations::{
    class_name_for_id, parse_annotations, AnnotationLabel, BoxAnnotation, DEFAULT_CLASS_NAMES,
};
pub use camera::{CameraState, OrbitCamera, ViewOffset, ViewportCamera};
pub use hub::ViewerHub;
pub use loader::{fetch_annotations, fetch_intrinsics, fetch_poses, fetch_text};
pub use video::{FrameCallbackAction, MediaClock, MediaEvent, VideoSync};
pub use viewer::Viewer;
