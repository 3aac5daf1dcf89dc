//! The viewport-camera seam and a self-contained reference implementation.
//!
//! The rendering engine owns the live camera; the core drives it through
//! [`ViewportCamera`]. [`OrbitCamera`] implements the trait for demos and
//! tests and for hosts without a camera of their own.

use glam::{Mat3, Mat4, Quat, Vec3, Vec4};

/// Live camera mutation surface supplied by the host rendering layer.
///
/// Orientation follows the pipeline-wide convention that the camera looks
/// along its local +Z axis.
pub trait ViewportCamera {
    /// Camera position in world coordinates.
    fn position(&self) -> Vec3;
    /// Moves the camera.
    fn set_position(&mut self, position: Vec3);

    /// Camera-to-world orientation.
    fn orientation(&self) -> Quat;
    /// Sets the orientation verbatim.
    fn set_orientation(&mut self, orientation: Quat);

    /// Current look-at target.
    fn target(&self) -> Vec3;
    /// Sets the look-at target without touching the orientation.
    fn set_target(&mut self, target: Vec3);

    /// Vertical field of view in degrees.
    fn fov_y_degrees(&self) -> f32;
    /// Sets the vertical field of view in degrees.
    fn set_fov_y_degrees(&mut self, degrees: f32);

    /// Zoom factor.
    fn zoom(&self) -> f32;
    /// Sets the zoom factor.
    fn set_zoom(&mut self, zoom: f32);

    /// Size of the live render target in pixels.
    fn viewport_size(&self) -> (u32, u32);

    /// Applies an asymmetric-frustum view offset referencing a source
    /// resolution (independent of the live viewport size).
    fn set_view_offset(&mut self, full_width: u32, full_height: u32, offset_x: i32, offset_y: i32);

    /// Removes any view offset.
    fn clear_view_offset(&mut self);
}

/// A full camera snapshot for verbatim copy between synchronized viewers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    /// Camera position in world coordinates.
    pub position: Vec3,
    /// Camera-to-world orientation.
    pub orientation: Quat,
    /// Look-at target.
    pub target: Vec3,
    /// Vertical field of view in degrees.
    pub fov_y_degrees: f32,
    /// Zoom factor.
    pub zoom: f32,
}

impl CameraState {
    /// Snapshots the full state of a camera.
    #[must_use]
    pub fn capture(camera: &dyn ViewportCamera) -> Self {
        Self {
            position: camera.position(),
            orientation: camera.orientation(),
            target: camera.target(),
            fov_y_degrees: camera.fov_y_degrees(),
            zoom: camera.zoom(),
        }
    }

    /// Copies the state verbatim onto a camera (no interpolation).
    pub fn apply_to(&self, camera: &mut dyn ViewportCamera) {
        camera.set_position(self.position);
        camera.set_target(self.target);
        camera.set_orientation(self.orientation);
        camera.set_fov_y_degrees(self.fov_y_degrees);
        camera.set_zoom(self.zoom);
    }
}

/// Asymmetric-frustum view offset, expressed against a source resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewOffset {
    /// Source width the offset references.
    pub full_width: u32,
    /// Source height the offset references.
    pub full_height: u32,
    /// Horizontal shift in source pixels.
    pub offset_x: i32,
    /// Vertical shift in source pixels.
    pub offset_y: i32,
}

/// A turntable-style perspective camera.
///
/// Self-contained [`ViewportCamera`] implementation with orbit/pan/dolly
/// helpers and view-offset-aware projection. The viewport aspect ratio is
/// always taken from the live viewport size, never from a view offset's
/// source resolution.
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    position: Vec3,
    orientation: Quat,
    target: Vec3,
    up: Vec3,
    /// Vertical field of view in radians.
    fov_y: f32,
    zoom: f32,
    near: f32,
    far: f32,
    viewport: (u32, u32),
    view_offset: Option<ViewOffset>,
}

impl OrbitCamera {
    /// Creates a camera looking at the origin from (2, 2, 2), Z up.
    #[must_use]
    pub fn new(viewport_width: u32, viewport_height: u32) -> Self {
        let position = Vec3::new(2.0, 2.0, 2.0);
        let target = Vec3::ZERO;
        let up = Vec3::Z;
        Self {
            position,
            orientation: orientation_towards(position, target, up),
            target,
            up,
            fov_y: 60.0f32.to_radians(),
            zoom: 1.0,
            near: 0.01,
            far: 1000.0,
            viewport: (viewport_width, viewport_height),
            view_offset: None,
        }
    }

    /// Points the camera at `target`, re-deriving the orientation.
    pub fn look_at(&mut self, target: Vec3) {
        self.target = target;
        self.orientation = orientation_towards(self.position, target, self.up);
    }

    /// Returns the up vector.
    #[must_use]
    pub fn up(&self) -> Vec3 {
        self.up
    }

    /// Sets the up vector and re-derives the orientation.
    pub fn set_up(&mut self, up: Vec3) {
        self.up = up;
        self.orientation = orientation_towards(self.position, self.target, up);
    }

    /// Updates the live viewport size (host resize plumbing).
    pub fn set_viewport_size(&mut self, width: u32, height: u32) {
        self.viewport = (width, height);
    }

    /// Returns the current view offset, if any.
    #[must_use]
    pub fn view_offset(&self) -> Option<ViewOffset> {
        self.view_offset
    }

    /// Live viewport aspect ratio.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn aspect_ratio(&self) -> f32 {
        let (w, h) = self.viewport;
        if h == 0 {
            1.0
        } else {
            w as f32 / h as f32
        }
    }

    /// Orbits around the target, keeping the distance fixed.
    pub fn orbit(&mut self, delta_theta: f32, delta_phi: f32) {
        let offset = self.position - self.target;
        let radius = offset.length();
        let mut theta = offset.x.atan2(offset.y);
        let mut phi = (offset.z / radius).acos();

        theta -= delta_theta;
        phi = (phi - delta_phi).clamp(0.01, std::f32::consts::PI - 0.01);

        self.position = self.target
            + Vec3::new(
                radius * phi.sin() * theta.sin(),
                radius * phi.sin() * theta.cos(),
                radius * phi.cos(),
            );
        self.orientation = orientation_towards(self.position, self.target, self.up);
    }

    /// Pans camera and target together in the view plane.
    pub fn pan(&mut self, delta_x: f32, delta_y: f32) {
        let right = self.orientation * Vec3::X;
        let up = self.orientation * Vec3::Y;
        let offset = right * delta_x + up * delta_y;
        self.position += offset;
        self.target += offset;
    }

    /// Moves toward (positive delta) or away from the target.
    pub fn dolly(&mut self, delta: f32) {
        let distance = (self.position - self.target).length();
        let new_distance = (distance - delta).max(0.01);
        let back = (self.position - self.target) / distance;
        self.position = self.target + back * new_distance;
    }

    /// Returns the view matrix (world to camera space).
    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        let rotation = Mat3::from_quat(self.orientation).transpose();
        let translation = -(rotation * self.position);
        Mat4::from_cols(
            rotation.x_axis.extend(0.0),
            rotation.y_axis.extend(0.0),
            rotation.z_axis.extend(0.0),
            translation.extend(1.0),
        )
    }

    /// Returns the perspective projection matrix, honoring zoom and any
    /// asymmetric view offset.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn projection_matrix(&self) -> Mat4 {
        let mut top = self.near * (self.fov_y * 0.5).tan() / self.zoom;
        let height = 2.0 * top;
        let width = self.aspect_ratio() * height;
        let mut left = -0.5 * width;

        if let Some(offset) = self.view_offset {
            if offset.full_width > 0 && offset.full_height > 0 {
                left += offset.offset_x as f32 * width / offset.full_width as f32;
                top -= offset.offset_y as f32 * height / offset.full_height as f32;
            }
        }

        frustum_rh(
            left,
            left + width,
            top - height,
            top,
            self.near,
            self.far,
        )
    }
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::new(640, 480)
    }
}

impl ViewportCamera for OrbitCamera {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    fn orientation(&self) -> Quat {
        self.orientation
    }

    fn set_orientation(&mut self, orientation: Quat) {
        self.orientation = orientation;
    }

    fn target(&self) -> Vec3 {
        self.target
    }

    fn set_target(&mut self, target: Vec3) {
        self.target = target;
    }

    fn fov_y_degrees(&self) -> f32 {
        self.fov_y.to_degrees()
    }

    fn set_fov_y_degrees(&mut self, degrees: f32) {
        self.fov_y = degrees
            .to_radians()
            .clamp(0.1, std::f32::consts::PI - 0.1);
    }

    fn zoom(&self) -> f32 {
        self.zoom
    }

    fn set_zoom(&mut self, zoom: f32) {
        self.zoom = zoom.max(0.01);
    }

    fn viewport_size(&self) -> (u32, u32) {
        self.viewport
    }

    fn set_view_offset(&mut self, full_width: u32, full_height: u32, offset_x: i32, offset_y: i32) {
        self.view_offset = Some(ViewOffset {
            full_width,
            full_height,
            offset_x,
            offset_y,
        });
    }

    fn clear_view_offset(&mut self) {
        self.view_offset = None;
    }
}

/// Camera-to-world orientation looking from `position` toward `target`,
/// +Z forward.
fn orientation_towards(position: Vec3, target: Vec3, up: Vec3) -> Quat {
    let Some(forward) = (target - position).try_normalize() else {
        return Quat::IDENTITY;
    };
    let right = up.cross(forward).try_normalize().unwrap_or(Vec3::X);
    let true_up = forward.cross(right);
    Quat::from_mat3(&Mat3::from_cols(right, true_up, forward))
}

/// Right-handed perspective frustum with arbitrary bounds.
fn frustum_rh(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Mat4 {
    let x = 2.0 * near / (right - left);
    let y = 2.0 * near / (top - bottom);
    let a = (right + left) / (right - left);
    let b = (top + bottom) / (top - bottom);
    let c = -(far + near) / (far - near);
    let d = -2.0 * far * near / (far - near);
    Mat4::from_cols(
        Vec4::new(x, 0.0, 0.0, 0.0),
        Vec4::new(0.0, y, 0.0, 0.0),
        Vec4::new(a, b, c, -1.0),
        Vec4::new(0.0, 0.0, d, 0.0),
    )
}
