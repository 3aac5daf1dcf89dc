//! Extrinsic camera matrices and derived camera poses.
//!
//! An extrinsic matrix is the row-major 3x4 rigid transform `[R|t]` taking
//! world coordinates to camera coordinates. `R` is assumed (approximately)
//! orthonormal; inputs are accepted without validation and a non-orthonormal
//! rotation block yields an undefined orientation downstream.

use glam::{Mat3, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Numeric convention of raw pose input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum PoseConvention {
    /// Rows are already world-to-camera `[R|t]`.
    #[default]
    Extrinsic,
    /// Rows are camera-to-world and must be inverted on ingest.
    CameraToWorld,
}

impl PoseConvention {
    /// Normalizes a raw pose matrix read under this convention into a
    /// world-to-camera extrinsic.
    #[must_use]
    pub fn to_extrinsic(self, raw: ExtrinsicMatrix) -> ExtrinsicMatrix {
        match self {
            PoseConvention::Extrinsic => raw,
            PoseConvention::CameraToWorld => raw.inverted(),
        }
    }
}

/// A row-major 3x4 world-to-camera rigid transform `[R|t]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExtrinsicMatrix {
    rows: [[f32; 4]; 3],
}

impl ExtrinsicMatrix {
    /// The identity transform.
    pub const IDENTITY: Self = Self {
        rows: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
        ],
    };

    /// Creates an extrinsic from row-major 3x4 rows.
    #[must_use]
    pub fn from_rows(rows: [[f32; 4]; 3]) -> Self {
        Self { rows }
    }

    /// Creates an extrinsic from a rotation matrix and translation vector.
    #[must_use]
    pub fn from_rotation_translation(rotation: Mat3, translation: Vec3) -> Self {
        let mut rows = [[0.0; 4]; 3];
        for (r, row) in rows.iter_mut().enumerate() {
            for (c, cell) in row.iter_mut().take(3).enumerate() {
                *cell = rotation.col(c)[r];
            }
            row[3] = translation[r];
        }
        Self { rows }
    }

    /// Returns the row-major 3x4 rows.
    #[must_use]
    pub fn rows(&self) -> &[[f32; 4]; 3] {
        &self.rows
    }

    /// Returns the rotation block `R`.
    #[must_use]
    pub fn rotation(&self) -> Mat3 {
        Mat3::from_cols(
            Vec3::new(self.rows[0][0], self.rows[1][0], self.rows[2][0]),
            Vec3::new(self.rows[0][1], self.rows[1][1], self.rows[2][1]),
            Vec3::new(self.rows[0][2], self.rows[1][2], self.rows[2][2]),
        )
    }

    /// Returns the translation column `t`.
    #[must_use]
    pub fn translation(&self) -> Vec3 {
        Vec3::new(self.rows[0][3], self.rows[1][3], self.rows[2][3])
    }

    /// Returns the inverse rigid transform: `R' = R^T`, `t' = -R^T * t`.
    #[must_use]
    pub fn inverted(&self) -> Self {
        let rt = self.rotation().transpose();
        Self::from_rotation_translation(rt, -(rt * self.translation()))
    }

    /// Returns the camera center in world coordinates, `-R^T * t`.
    #[must_use]
    pub fn camera_center(&self) -> Vec3 {
        -(self.rotation().transpose() * self.translation())
    }

    /// Returns the camera-to-world orientation quaternion, from `R^T`.
    #[must_use]
    pub fn orientation(&self) -> Quat {
        Quat::from_mat3(&self.rotation().transpose())
    }

    /// Returns true if every component is finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.rows.iter().flatten().all(|v| v.is_finite())
    }

    /// Derives a full camera pose from this extrinsic, preserving the
    /// current viewing distance.
    ///
    /// The new target sits `distance` along the camera's forward axis, where
    /// `distance = |current_position - current_target|` (falling back to 1.0
    /// when degenerate) and forward is the local +Z axis under the new
    /// orientation.
    ///
    /// Returns `None` when any component of the extrinsic is non-finite, so
    /// callers can leave the live camera untouched.
    #[must_use]
    pub fn to_camera_pose(&self, current_position: Vec3, current_target: Vec3) -> Option<CameraPose> {
        if !self.is_finite() {
            return None;
        }

        let position = self.camera_center();
        let orientation = self.orientation();

        let mut distance = (current_position - current_target).length();
        if !distance.is_finite() || distance <= 0.0 {
            distance = 1.0;
        }

        let forward = orientation * Vec3::Z;
        let target = position + forward * distance;

        Some(CameraPose {
            position,
            orientation,
            target,
        })
    }
}

/// A derived, transient camera pose.
///
/// Recomputed from an [`ExtrinsicMatrix`] or copied from a peer viewer;
/// never persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    /// Camera position in world coordinates.
    pub position: Vec3,
    /// Camera-to-world orientation (unit quaternion).
    pub orientation: Quat,
    /// Look-at target point.
    pub target: Vec3,
}

/// An immutable, index-addressable sequence of extrinsic poses.
///
/// Guaranteed non-empty by construction.
#[derive(Debug, Clone, PartialEq)]
pub struct PoseSequence {
    poses: Vec<ExtrinsicMatrix>,
}

impl PoseSequence {
    /// Wraps a vector of poses; returns `None` if the vector is empty.
    #[must_use]
    pub fn from_poses(poses: Vec<ExtrinsicMatrix>) -> Option<Self> {
        if poses.is_empty() {
            None
        } else {
            Some(Self { poses })
        }
    }

    /// Returns the number of poses.
    #[must_use]
    pub fn len(&self) -> usize {
        self.poses.len()
    }

    /// Always false; sequences cannot be constructed empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.poses.is_empty()
    }

    /// Returns the pose at `index`, if in range.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&ExtrinsicMatrix> {
        self.poses.get(index)
    }

    /// Iterates over the poses in order.
    pub fn iter(&self) -> std::slice::Iter<'_, ExtrinsicMatrix> {
        self.poses.iter()
    }
}

impl std::ops::Index<usize> for PoseSequence {
    type Output = ExtrinsicMatrix;

    fn index(&self, index: usize) -> &Self::Output {
        &self.poses[index]
    }
}

impl<'a> IntoIterator for &'a PoseSequence {
    type Item = &'a ExtrinsicMatrix;
    type IntoIter = std::slice::Iter<'a, ExtrinsicMatrix>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
