//! A single viewer instance: live camera, retained intrinsics, annotations,
//! and video-sync state.
//!
//! Everything here is viewer-local. Cross-viewer propagation (camera and
//! sync-toggle broadcast) lives in [`crate::hub::ViewerHub`]; the apply
//! methods on `Viewer` never broadcast, which is what makes hub broadcasts
//! one-hop by construction.

use viewsync_core::ViewerOptions;
use viewsync_pose::{
    index_from_fps, index_from_ratio, ExtrinsicMatrix, IntrinsicMatrix, PoseSequence,
    ProjectionParams,
};

use crate::annotations::BoxAnnotation;
use crate::camera::{CameraState, ViewportCamera};
use crate::video::{FrameCallbackAction, MediaClock, MediaEvent, VideoSync};

/// A live viewer driving one host viewport.
pub struct Viewer {
    name: String,
    options: ViewerOptions,
    camera: Box<dyn ViewportCamera>,
    /// Last-set intrinsics and source resolution, retained so projection
    /// parameters can be recomputed on resize.
    intrinsics: Option<(IntrinsicMatrix, u32, u32)>,
    annotations: Vec<BoxAnnotation>,
    annotations_visible: bool,
    video: VideoSync,
    /// Set while external state (a peer broadcast or a video pose) is being
    /// applied; host change-detection must not re-broadcast while true.
    applying_external: bool,
}

impl Viewer {
    /// Creates a viewer around a host camera.
    pub fn new(
        name: impl Into<String>,
        options: ViewerOptions,
        camera: Box<dyn ViewportCamera>,
    ) -> Self {
        let annotations_visible = options.show_annotations;
        Self {
            name: name.into(),
            options,
            camera,
            intrinsics: None,
            annotations: Vec::new(),
            annotations_visible,
            video: VideoSync::new(),
            applying_external: false,
        }
    }

    /// Returns the viewer name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the viewer options.
    #[must_use]
    pub fn options(&self) -> &ViewerOptions {
        &self.options
    }

    /// Returns the live camera.
    #[must_use]
    pub fn camera(&self) -> &dyn ViewportCamera {
        self.camera.as_ref()
    }

    /// Returns the live camera mutably. Mutations made here are direct user
    /// control as far as the sync pipeline is concerned.
    pub fn camera_mut(&mut self) -> &mut dyn ViewportCamera {
        self.camera.as_mut()
    }

    /// True while the viewer is applying externally-originated state.
    #[must_use]
    pub fn is_applying_external(&self) -> bool {
        self.applying_external
    }

    /// Snapshots the full camera state for broadcast.
    #[must_use]
    pub fn camera_state(&self) -> CameraState {
        CameraState::capture(self.camera.as_ref())
    }

    /// Copies a peer's camera state verbatim, suppressing re-broadcast.
    pub fn apply_camera_state(&mut self, state: &CameraState) {
        self.applying_external = true;
        state.apply_to(self.camera.as_mut());
        self.applying_external = false;
    }

    /// Drives the camera from one extrinsic pose, preserving the current
    /// viewing distance. Non-finite input leaves the camera unchanged.
    pub fn apply_extrinsic(&mut self, extrinsic: &ExtrinsicMatrix) {
        let Some(pose) =
            extrinsic.to_camera_pose(self.camera.position(), self.camera.target())
        else {
            log::debug!("viewer '{}': ignoring non-finite extrinsic", self.name);
            return;
        };

        self.applying_external = true;
        self.camera.set_position(pose.position);
        self.camera.set_orientation(pose.orientation);
        self.camera.set_target(pose.target);
        self.applying_external = false;
    }

    // ---- Intrinsics -----------------------------------------------------

    /// Sets pinhole intrinsics with their source resolution and applies the
    /// derived projection. The triple is retained and re-applied on resize.
    ///
    /// Unusable intrinsics (non-finite or non-positive focal lengths, zero
    /// resolution) are stored but leave the current projection untouched.
    pub fn set_pinhole_intrinsics(&mut self, k: IntrinsicMatrix, width: u32, height: u32) {
        self.intrinsics = Some((k, width, height));
        self.apply_projection();
    }

    /// Clears intrinsics and any view offset they imposed.
    pub fn clear_pinhole_intrinsics(&mut self) {
        self.intrinsics = None;
        self.camera.clear_view_offset();
    }

    /// Recomputes the projection from the retained intrinsics; the host
    /// calls this after resizing the render target. Viewport aspect comes
    /// from the live camera, not from the stored source resolution.
    pub fn handle_resize(&mut self) {
        self.apply_projection();
    }

    fn apply_projection(&mut self) {
        let Some((k, width, height)) = &self.intrinsics else {
            return;
        };
        let Some(params) = ProjectionParams::from_intrinsics(k, *width, *height) else {
            log::debug!(
                "viewer '{}': unusable intrinsics, keeping previous projection",
                self.name
            );
            return;
        };

        self.camera.set_fov_y_degrees(params.fov_y_degrees);
        self.camera.set_view_offset(
            params.source_width,
            params.source_height,
            params.offset_x,
            params.offset_y,
        );
    }

    // ---- Annotations ----------------------------------------------------

    /// Replaces the annotation set.
    pub fn set_annotations(&mut self, annotations: Vec<BoxAnnotation>) {
        self.annotations = annotations;
    }

    /// Returns the current annotations.
    #[must_use]
    pub fn annotations(&self) -> &[BoxAnnotation] {
        &self.annotations
    }

    /// Shows or hides annotations (host rendering reads this).
    pub fn set_annotations_visible(&mut self, visible: bool) {
        self.annotations_visible = visible;
    }

    /// Whether annotations should be rendered.
    #[must_use]
    pub fn annotations_visible(&self) -> bool {
        self.annotations_visible
    }

    // ---- Video sync -----------------------------------------------------

    /// Attaches a media clock and pose sequence (replacing any previous
    /// attachment) with an optional frames-per-second hint. If sync is
    /// already enabled the camera snaps to the current position at once.
    pub fn attach_video_sync(
        &mut self,
        clock: Box<dyn MediaClock>,
        poses: PoseSequence,
        fps: Option<f64>,
    ) {
        self.video.attach(clock, poses, fps);
        if self.video.enabled() {
            self.update_from_clock();
        }
    }

    /// Detaches video sync, dropping the clock and poses. Idempotent.
    pub fn detach_video_sync(&mut self) {
        self.video.detach();
    }

    /// Returns true if a clock and poses are attached.
    #[must_use]
    pub fn video_attached(&self) -> bool {
        self.video.is_attached()
    }

    /// Whether video-driven pose following is enabled.
    #[must_use]
    pub fn sync_enabled(&self) -> bool {
        self.video.enabled()
    }

    /// Sets the sync flag without any broadcast; enabling pulls a pose from
    /// the clock immediately.
    pub fn apply_sync_enabled(&mut self, enabled: bool) {
        self.video.set_enabled(enabled);
        if enabled {
            self.update_from_clock();
        }
    }

    /// Handles an ordinary playback event from the host media element.
    pub fn on_media_event(&mut self, event: MediaEvent) {
        log::trace!("viewer '{}': media event {event:?}", self.name);
        self.update_from_clock();
    }

    /// Handles one decoded video frame.
    ///
    /// `media_time` is the frame's presentation timestamp when the host API
    /// reports one; the clock position is used otherwise. Returns
    /// [`FrameCallbackAction::Rearm`] for as long as an attachment exists —
    /// including while sync is disabled, so that re-enabling is picked up on
    /// the next frame — and [`FrameCallbackAction::Stop`] once detached.
    pub fn on_video_frame(&mut self, media_time: Option<f64>) -> FrameCallbackAction {
        if !self.video.is_attached() {
            return FrameCallbackAction::Stop;
        }
        if !self.video.enabled() {
            return FrameCallbackAction::Rearm;
        }

        let (Some(clock), Some(poses)) = (self.video.clock(), self.video.poses()) else {
            return FrameCallbackAction::Stop;
        };
        let time = media_time.unwrap_or_else(|| clock.current_time());

        let index = match clock.duration() {
            Some(duration) => index_from_ratio(time, duration, poses.len()),
            None => None,
        };

        match index.and_then(|i| poses.get(i)).copied() {
            Some(extrinsic) => self.apply_extrinsic(&extrinsic),
            // Duration unknown inside the frame callback: fall back to the
            // event-path selection rules.
            None => self.update_from_clock(),
        }
        FrameCallbackAction::Rearm
    }

    /// Event-path pose selection: fps rule first, then duration ratio, else
    /// nothing (insufficient information).
    fn update_from_clock(&mut self) {
        if !self.video.enabled() {
            return;
        }
        let (Some(clock), Some(poses)) = (self.video.clock(), self.video.poses()) else {
            return;
        };

        let time = clock.current_time();
        let len = poses.len();
        let index = self
            .video
            .fps()
            .and_then(|fps| index_from_fps(time, fps, len))
            .or_else(|| {
                clock
                    .duration()
                    .and_then(|duration| index_from_ratio(time, duration, len))
            });

        if let Some(extrinsic) = index.and_then(|i| poses.get(i)).copied() {
            self.apply_extrinsic(&extrinsic);
        }
    }
}

impl std::fmt::Debug for Viewer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Viewer")
            .field("name", &self.name)
            .field("group", &self.options.group)
            .field("video", &self.video)
            .field("annotations", &self.annotations.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::OrbitCamera;
    use glam::Vec3;
    use std::cell::Cell;
    use std::rc::Rc;

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

    fn test_viewer() -> Viewer {
        Viewer::new(
            "test",
            ViewerOptions::default(),
            Box::new(OrbitCamera::new(640, 480)),
        )
    }

    fn translated(z: f32) -> ExtrinsicMatrix {
        ExtrinsicMatrix::from_rows([
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, z],
        ])
    }

    #[test]
    fn test_apply_extrinsic_moves_camera() {
        let mut viewer = test_viewer();
        viewer.apply_extrinsic(&translated(-5.0));
        assert!((viewer.camera().position() - Vec3::new(0.0, 0.0, 5.0)).length() < 1e-5);
    }

    #[test]
    fn test_non_finite_extrinsic_is_noop() {
        let mut viewer = test_viewer();
        let before = viewer.camera().position();
        viewer.apply_extrinsic(&ExtrinsicMatrix::from_rows([
            [1.0, 0.0, 0.0, f32::INFINITY],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
        ]));
        assert_eq!(viewer.camera().position(), before);
    }

    #[test]
    fn test_bad_intrinsics_keep_previous_projection() {
        let mut viewer = test_viewer();
        let good = IntrinsicMatrix::from_rows([
            [500.0, 0.0, 320.0],
            [0.0, 500.0, 240.0],
            [0.0, 0.0, 1.0],
        ]);
        viewer.set_pinhole_intrinsics(good, 640, 480);
        let fov = viewer.camera().fov_y_degrees();

        let bad = IntrinsicMatrix::from_rows([
            [0.0, 0.0, 320.0],
            [0.0, -1.0, 240.0],
            [0.0, 0.0, 1.0],
        ]);
        viewer.set_pinhole_intrinsics(bad, 640, 480);
        assert!((viewer.camera().fov_y_degrees() - fov).abs() < 1e-5);
    }

    #[test]
    fn test_fps_event_path() {
        let mut viewer = test_viewer();
        let clock = TestClock::default();
        clock.time.set(0.5);

        let poses = PoseSequence::from_poses((0..10).map(|i| translated(-(i as f32))).collect())
            .unwrap();
        viewer.attach_video_sync(Box::new(clock), poses, Some(30.0));
        viewer.apply_sync_enabled(true);

        // round(0.5 * 30) = 15, clamped to 9.
        assert!((viewer.camera().position() - Vec3::new(0.0, 0.0, 9.0)).length() < 1e-5);
    }

    #[test]
    fn test_duration_ratio_event_path() {
        let mut viewer = test_viewer();
        let clock = TestClock::default();
        clock.time.set(5.0);
        clock.duration.set(Some(10.0));

        let poses = PoseSequence::from_poses((0..3).map(|i| translated(-(i as f32))).collect())
            .unwrap();
        viewer.attach_video_sync(Box::new(clock.clone()), poses, None);
        viewer.apply_sync_enabled(true);
        viewer.on_media_event(MediaEvent::TimeUpdate);

        assert!((viewer.camera().position() - Vec3::new(0.0, 0.0, 1.0)).length() < 1e-5);
    }

    #[test]
    fn test_no_duration_no_fps_is_inert() {
        let mut viewer = test_viewer();
        let clock = TestClock::default();
        clock.time.set(5.0);

        let poses =
            PoseSequence::from_poses(vec![translated(-1.0), translated(-2.0)]).unwrap();
        viewer.attach_video_sync(Box::new(clock), poses, None);
        let before = viewer.camera().position();
        viewer.apply_sync_enabled(true);
        viewer.on_media_event(MediaEvent::TimeUpdate);
        assert_eq!(viewer.camera().position(), before);
    }

    #[test]
    fn test_frame_callback_rearms_while_disabled() {
        let mut viewer = test_viewer();
        let clock = TestClock::default();
        clock.duration.set(Some(10.0));

        let poses = PoseSequence::from_poses(vec![translated(-1.0)]).unwrap();
        viewer.attach_video_sync(Box::new(clock), poses, None);

        let before = viewer.camera().position();
        assert_eq!(
            viewer.on_video_frame(Some(2.0)),
            FrameCallbackAction::Rearm
        );
        // Disabled: no camera motion, but the callback stays armed.
        assert_eq!(viewer.camera().position(), before);

        viewer.apply_sync_enabled(true);
        assert_eq!(
            viewer.on_video_frame(Some(2.0)),
            FrameCallbackAction::Rearm
        );
        assert_ne!(viewer.camera().position(), before);

        viewer.detach_video_sync();
        assert_eq!(viewer.on_video_frame(Some(2.0)), FrameCallbackAction::Stop);
    }

    #[test]
    fn test_detach_is_idempotent() {
        let mut viewer = test_viewer();
        viewer.detach_video_sync();
        viewer.detach_video_sync();
        assert!(!viewer.video_attached());
    }

    #[test]
    fn test_enable_snaps_immediately() {
        let mut viewer = test_viewer();
        let clock = TestClock::default();
        clock.time.set(0.0);
        clock.duration.set(Some(10.0));

        let poses = PoseSequence::from_poses(vec![translated(-7.0)]).unwrap();
        viewer.attach_video_sync(Box::new(clock), poses, None);
        viewer.apply_sync_enabled(true);
        assert!((viewer.camera().position() - Vec3::new(0.0, 0.0, 7.0)).length() < 1e-5);
    }
}
