//! Core abstractions for viewsync-rs.
//!
//! This crate provides the fundamental types used throughout viewsync-rs:
//! - [`ViewsyncError`] and the crate-wide [`Result`] alias
//! - [`SyncRegistry`] for sync-group membership bookkeeping
//! - [`ViewerOptions`] for per-viewer configuration

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Builder patterns return Self which doesn't need must_use
#![allow(clippy::must_use_candidate)]

pub mod error;
pub mod options;
pub mod registry;

pub use error::{Result, ViewsyncError};
pub use options::{RenderMode, ViewerOptions};
pub use registry::SyncRegistry;

// Re-export glam types for convenience
pub use glam::{Mat3, Mat4, Quat, Vec2, Vec3, Vec4};
