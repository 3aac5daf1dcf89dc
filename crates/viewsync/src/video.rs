//! Video-driven camera synchronization state.
//!
//! The host owns the media element; the core sees it through [`MediaClock`]
//! plus the playback events the host routes in. When the host media API
//! supports per-decoded-frame callbacks it calls the per-frame path and
//! re-arms for as long as [`FrameCallbackAction::Rearm`] is returned — even
//! while sync is disabled, so re-enabling takes effect on the very next
//! frame.

use viewsync_pose::PoseSequence;

/// Playback clock supplied by the host media layer.
pub trait MediaClock {
    /// Current playback position in seconds.
    fn current_time(&self) -> f64;

    /// Total duration in seconds, if known. Implementations should return
    /// `None` rather than NaN/infinity for unknown durations.
    fn duration(&self) -> Option<f64>;
}

/// Ordinary playback events routed from the host media element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaEvent {
    /// Periodic playback-position update.
    TimeUpdate,
    /// A seek completed.
    Seeked,
    /// Metadata (duration) became available.
    LoadedMetadata,
    /// Playback started.
    Play,
    /// Playback reached the end.
    Ended,
}

/// What the host should do with its per-frame callback registration after a
/// frame has been handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameCallbackAction {
    /// Schedule the callback again for the next decoded frame.
    Rearm,
    /// Nothing is attached; stop scheduling.
    Stop,
}

/// Per-viewer video synchronization state.
///
/// Holds the attached clock, the pose sequence it indexes into, an optional
/// frames-per-second hint, and the enabled flag. The pose sequence is owned
/// here for the lifetime of the attachment.
pub struct VideoSync {
    clock: Option<Box<dyn MediaClock>>,
    poses: Option<PoseSequence>,
    fps: Option<f64>,
    enabled: bool,
}

impl Default for VideoSync {
    fn default() -> Self {
        Self::new()
    }
}

impl VideoSync {
    /// Creates a detached, disabled state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            clock: None,
            poses: None,
            fps: None,
            enabled: false,
        }
    }

    /// Attaches a clock and pose sequence, replacing any previous
    /// attachment. A non-finite fps hint is discarded.
    pub fn attach(&mut self, clock: Box<dyn MediaClock>, poses: PoseSequence, fps: Option<f64>) {
        self.detach();
        self.fps = fps.filter(|f| f.is_finite());
        self.clock = Some(clock);
        self.poses = Some(poses);
    }

    /// Drops the clock, poses, and fps hint. Idempotent; the enabled flag
    /// survives so a later attach resumes in the same mode.
    pub fn detach(&mut self) {
        self.clock = None;
        self.poses = None;
        self.fps = None;
    }

    /// Returns true if a clock and poses are attached.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.clock.is_some() && self.poses.is_some()
    }

    /// Whether pose-following is currently enabled.
    #[must_use]
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Sets the enabled flag.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// The frames-per-second hint, if one was given.
    #[must_use]
    pub fn fps(&self) -> Option<f64> {
        self.fps
    }

    /// The attached pose sequence, if any.
    #[must_use]
    pub fn poses(&self) -> Option<&PoseSequence> {
        self.poses.as_ref()
    }

    /// The attached clock, if any.
    #[must_use]
    pub fn clock(&self) -> Option<&dyn MediaClock> {
        self.clock.as_deref()
    }
}

impl std::fmt::Debug for VideoSync {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoSync")
            .field("attached", &self.is_attached())
            .field("enabled", &self.enabled)
            .field("fps", &self.fps)
            .field("poses", &self.poses.as_ref().map(PoseSequence::len))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use viewsync_pose::ExtrinsicMatrix;

    struct StillClock;

    impl MediaClock for StillClock {
        fn current_time(&self) -> f64 {
            0.0
        }

        fn duration(&self) -> Option<f64> {
            None
        }
    }

    fn one_pose() -> PoseSequence {
        PoseSequence::from_poses(vec![ExtrinsicMatrix::IDENTITY]).unwrap()
    }

    #[test]
    fn test_attach_detach() {
        let mut sync = VideoSync::new();
        assert!(!sync.is_attached());

        sync.attach(Box::new(StillClock), one_pose(), Some(30.0));
        assert!(sync.is_attached());
        assert_eq!(sync.fps(), Some(30.0));

        sync.detach();
        assert!(!sync.is_attached());
        assert!(sync.fps().is_none());
        // Idempotent.
        sync.detach();
        assert!(!sync.is_attached());
    }

    #[test]
    fn test_non_finite_fps_discarded() {
        let mut sync = VideoSync::new();
        sync.attach(Box::new(StillClock), one_pose(), Some(f64::NAN));
        assert!(sync.fps().is_none());
    }

    #[test]
    fn test_enabled_survives_reattach() {
        let mut sync = VideoSync::new();
        sync.set_enabled(true);
        sync.attach(Box::new(StillClock), one_pose(), None);
        assert!(sync.enabled());
    }
}
