//! Pose normalization and camera math for viewsync-rs.
//!
//! This crate is the pure numeric core of the pipeline:
//! - [`ExtrinsicMatrix`] / [`PoseSequence`] and the camera-pose derivation
//! - [`parse::parse_poses`] — heterogeneous raw pose payloads to canonical
//!   row-major 3x4 extrinsics
//! - [`IntrinsicMatrix`] / [`ProjectionParams`] — pinhole intrinsics to
//!   vertical FOV plus principal-point view offset
//! - [`timing`] — playback position to pose index
//!
//! No I/O and no viewer state live here; everything is deterministic and
//! directly testable.

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]

pub mod extrinsic;
pub mod intrinsics;
pub mod parse;
pub mod timing;

pub use extrinsic::{CameraPose, ExtrinsicMatrix, PoseConvention, PoseSequence};
pub use intrinsics::{parse_intrinsics, IntrinsicMatrix, ProjectionParams};
pub use parse::{parse_poses, PoseBlock};
pub use timing::{index_from_fps, index_from_ratio};
