//! One-shot HTTP loaders for pose, intrinsics, and annotation payloads.
//!
//! Fetches are plain blocking GETs that complete before the dependent viewer
//! state is considered ready. Failures are fatal to the individual load and
//! never retried here; callers retry if they want to.

use viewsync_core::{Result, ViewsyncError};
use viewsync_pose::{
    parse_intrinsics, parse_poses, IntrinsicMatrix, PoseConvention, PoseSequence,
};

use crate::annotations::{parse_annotations, BoxAnnotation};

/// Fetches a text payload over HTTP GET.
///
/// # Errors
///
/// Returns [`ViewsyncError::Fetch`] for non-2xx statuses and transport
/// failures, with the URL and status/reason in the message.
pub fn fetch_text(url: &str) -> Result<String> {
    match ureq::get(url).call() {
        Ok(response) => Ok(response.into_string()?),
        Err(ureq::Error::Status(status, _)) => Err(ViewsyncError::Fetch {
            url: url.to_string(),
            detail: format!("HTTP status {status}"),
        }),
        Err(err) => Err(ViewsyncError::Fetch {
            url: url.to_string(),
            detail: err.to_string(),
        }),
    }
}

/// Fetches and normalizes a pose payload.
///
/// # Errors
///
/// Returns [`ViewsyncError::Fetch`] on HTTP failure and
/// [`ViewsyncError::Format`] when no poses can be recognized.
pub fn fetch_poses(url: &str, convention: PoseConvention) -> Result<PoseSequence> {
    let text = fetch_text(url)?;
    log::debug!("fetched pose payload from '{url}' ({} bytes)", text.len());
    parse_poses(&text, convention)
}

/// Fetches and parses a pinhole intrinsics payload.
///
/// # Errors
///
/// Returns [`ViewsyncError::Fetch`] on HTTP failure and
/// [`ViewsyncError::Format`] when fewer than nine numbers are found.
pub fn fetch_intrinsics(url: &str) -> Result<IntrinsicMatrix> {
    let text = fetch_text(url)?;
    parse_intrinsics(&text)
}

/// Fetches and parses an annotation payload.
///
/// # Errors
///
/// Returns [`ViewsyncError::Fetch`] on HTTP failure and
/// [`ViewsyncError::Json`] when the payload is not valid JSON.
pub fn fetch_annotations(url: &str, label_as_name: bool) -> Result<Vec<BoxAnnotation>> {
    let text = fetch_text(url)?;
    parse_annotations(&text, label_as_name)
}
