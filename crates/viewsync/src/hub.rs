//! The viewer hub: owns all live viewers and the sync-group registry, and
//! propagates camera and sync-toggle changes across groups.
//!
//! Broadcasts are one-hop by construction: the hub mutates peers through
//! viewer-local apply methods which never call back into the hub, so a
//! propagated change cannot propagate again. Peer sets are snapshotted
//! before application, so recipients may register or unregister without
//! disturbing the pass.

use std::collections::HashMap;

use viewsync_core::{Result, SyncRegistry, ViewsyncError};

use crate::camera::CameraState;
use crate::video::{FrameCallbackAction, MediaEvent};
use crate::viewer::Viewer;

/// Owns every live [`Viewer`] plus the group membership registry.
///
/// Created at application startup; dropping it drains all viewers and
/// memberships. There is deliberately no process-global instance.
#[derive(Default)]
pub struct ViewerHub {
    viewers: HashMap<String, Viewer>,
    registry: SyncRegistry,
}

impl ViewerHub {
    /// Creates an empty hub.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a viewer, registering it with its declared sync group (if any).
    ///
    /// # Errors
    ///
    /// Returns [`ViewsyncError::ViewerExists`] if the name is taken.
    pub fn add_viewer(&mut self, viewer: Viewer) -> Result<()> {
        let name = viewer.name().to_string();
        if self.viewers.contains_key(&name) {
            return Err(ViewsyncError::ViewerExists(name));
        }
        if let Some(group) = viewer.options().group.clone() {
            self.registry.register(&name, group);
        }
        log::info!("viewer '{name}' added");
        self.viewers.insert(name, viewer);
        Ok(())
    }

    /// Removes a viewer, deregistering it from its group. The returned
    /// viewer no longer receives or causes broadcasts.
    pub fn remove_viewer(&mut self, name: &str) -> Option<Viewer> {
        self.registry.unregister(name);
        let viewer = self.viewers.remove(name);
        if viewer.is_some() {
            log::info!("viewer '{name}' removed");
        }
        viewer
    }

    /// Returns a viewer by name.
    #[must_use]
    pub fn viewer(&self, name: &str) -> Option<&Viewer> {
        self.viewers.get(name)
    }

    /// Returns a viewer by name, mutably.
    pub fn viewer_mut(&mut self, name: &str) -> Option<&mut Viewer> {
        self.viewers.get_mut(name)
    }

    /// Returns the number of live viewers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.viewers.len()
    }

    /// Returns true if no viewers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.viewers.is_empty()
    }

    /// Returns the membership registry.
    #[must_use]
    pub fn registry(&self) -> &SyncRegistry {
        &self.registry
    }

    /// Removes every viewer and membership.
    pub fn clear(&mut self) {
        self.viewers.clear();
        self.registry.clear();
    }

    // ---- Broadcast paths ------------------------------------------------

    /// Notifies the hub that a viewer's camera changed under direct user
    /// control. The full camera state is copied verbatim to every other
    /// group member.
    ///
    /// Ignored while the viewer is itself applying external state, so
    /// received broadcasts and video poses do not echo.
    ///
    /// # Errors
    ///
    /// Returns [`ViewsyncError::ViewerNotFound`] for an unknown name.
    pub fn notify_camera_changed(&mut self, name: &str) -> Result<()> {
        let viewer = self
            .viewers
            .get(name)
            .ok_or_else(|| ViewsyncError::ViewerNotFound(name.to_string()))?;
        if viewer.is_applying_external() {
            return Ok(());
        }

        let state = viewer.camera_state();
        self.broadcast_camera_state(name, &state);
        Ok(())
    }

    /// Enables or disables video sync on a viewer and propagates the same
    /// flag to every other group member, exactly one hop.
    ///
    /// # Errors
    ///
    /// Returns [`ViewsyncError::ViewerNotFound`] for an unknown name.
    pub fn set_sync_enabled(&mut self, name: &str, enabled: bool) -> Result<()> {
        let viewer = self
            .viewers
            .get_mut(name)
            .ok_or_else(|| ViewsyncError::ViewerNotFound(name.to_string()))?;
        viewer.apply_sync_enabled(enabled);

        for peer in self.registry.peers_of(name) {
            if let Some(other) = self.viewers.get_mut(&peer) {
                other.apply_sync_enabled(enabled);
            }
        }
        log::debug!("viewer '{name}': sync {}", if enabled { "enabled" } else { "disabled" });
        Ok(())
    }

    /// Marks the start of a direct camera interaction (drag/zoom gesture).
    ///
    /// Manual control wins over pose-following: if the viewer is currently
    /// video-synced, sync is disabled and the disablement is broadcast to
    /// the group before any camera-change notifications arrive.
    ///
    /// # Errors
    ///
    /// Returns [`ViewsyncError::ViewerNotFound`] for an unknown name.
    pub fn begin_camera_interaction(&mut self, name: &str) -> Result<()> {
        let viewer = self
            .viewers
            .get(name)
            .ok_or_else(|| ViewsyncError::ViewerNotFound(name.to_string()))?;
        if viewer.sync_enabled() {
            self.set_sync_enabled(name, false)?;
        }
        Ok(())
    }

    // ---- Media dispatch -------------------------------------------------

    /// Routes an ordinary playback event to a viewer.
    ///
    /// # Errors
    ///
    /// Returns [`ViewsyncError::ViewerNotFound`] for an unknown name.
    pub fn on_media_event(&mut self, name: &str, event: MediaEvent) -> Result<()> {
        self.viewers
            .get_mut(name)
            .ok_or_else(|| ViewsyncError::ViewerNotFound(name.to_string()))?
            .on_media_event(event);
        Ok(())
    }

    /// Routes one decoded video frame to a viewer; see
    /// [`Viewer::on_video_frame`] for the re-arm contract.
    ///
    /// # Errors
    ///
    /// Returns [`ViewsyncError::ViewerNotFound`] for an unknown name.
    pub fn on_video_frame(
        &mut self,
        name: &str,
        media_time: Option<f64>,
    ) -> Result<FrameCallbackAction> {
        Ok(self
            .viewers
            .get_mut(name)
            .ok_or_else(|| ViewsyncError::ViewerNotFound(name.to_string()))?
            .on_video_frame(media_time))
    }

    /// Re-applies a viewer's retained intrinsics after a host resize.
    ///
    /// # Errors
    ///
    /// Returns [`ViewsyncError::ViewerNotFound`] for an unknown name.
    pub fn handle_resize(&mut self, name: &str) -> Result<()> {
        self.viewers
            .get_mut(name)
            .ok_or_else(|| ViewsyncError::ViewerNotFound(name.to_string()))?
            .handle_resize();
        Ok(())
    }

    fn broadcast_camera_state(&mut self, origin: &str, state: &CameraState) {
        for peer in self.registry.peers_of(origin) {
            if let Some(other) = self.viewers.get_mut(&peer) {
                other.apply_camera_state(state);
            }
        }
    }
}

impl std::fmt::Debug for ViewerHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewerHub")
            .field("viewers", &self.viewers.len())
            .field("groups", &self.registry.len())
            .finish()
    }
}
