//! Configuration options for viewer instances.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// How loaded geometry should be rendered by the host engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RenderMode {
    /// Meshes with faces render as meshes, bare vertex data as points.
    #[default]
    Auto,
    /// Always render as a triangle mesh.
    Mesh,
    /// Always render as a point cloud.
    Points,
}

/// Per-viewer configuration options.
///
/// These are consumed partly by the core (group membership, annotation
/// visibility) and partly passed through to the host rendering layer
/// (background, point size, line width).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewerOptions {
    /// Initial viewport width in pixels.
    pub width: u32,

    /// Initial viewport height in pixels.
    pub height: u32,

    /// Background color.
    pub background_color: Vec3,

    /// Whether 3D box annotations start out visible.
    pub show_annotations: bool,

    /// Sync group identifier; `None` keeps the viewer standalone.
    pub group: Option<String>,

    /// Geometry render mode hint for the host engine.
    pub render_mode: RenderMode,

    /// Point size in world units; `None` lets the host derive one from the
    /// scene bounding box.
    pub point_size: Option<f32>,

    /// Annotation box line width in pixels.
    pub bbox_line_width_px: f32,
}

impl Default for ViewerOptions {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            background_color: Vec3::new(0.066, 0.078, 0.094),
            show_annotations: true,
            group: None,
            render_mode: RenderMode::Auto,
            point_size: None,
            bbox_line_width_px: 3.0,
        }
    }
}

impl ViewerOptions {
    /// Returns options joined to the given sync group.
    #[must_use]
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Returns options with the given viewport size.
    #[must_use]
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }
}
