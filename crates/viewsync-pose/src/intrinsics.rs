//! Pinhole intrinsics and the projection parameters derived from them.

use serde_json::Value;

use viewsync_core::{Result, ViewsyncError};

use crate::parse::numeric_tokens;

/// A 3x3 pinhole intrinsic matrix `K`.
///
/// Row-major: `fx` and `fy` on the diagonal, principal point `(cx, cy)` in
/// the last column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntrinsicMatrix {
    rows: [[f32; 3]; 3],
}

impl IntrinsicMatrix {
    /// Creates an intrinsic matrix from row-major 3x3 rows.
    #[must_use]
    pub fn from_rows(rows: [[f32; 3]; 3]) -> Self {
        Self { rows }
    }

    /// Creates an intrinsic matrix from at least nine row-major numbers.
    ///
    /// Extra trailing numbers are ignored.
    #[must_use]
    pub fn from_flat(numbers: &[f32]) -> Option<Self> {
        if numbers.len() < 9 {
            return None;
        }
        Some(Self::from_rows([
            [numbers[0], numbers[1], numbers[2]],
            [numbers[3], numbers[4], numbers[5]],
            [numbers[6], numbers[7], numbers[8]],
        ]))
    }

    /// Returns the row-major 3x3 rows.
    #[must_use]
    pub fn rows(&self) -> &[[f32; 3]; 3] {
        &self.rows
    }

    /// Horizontal focal length.
    #[must_use]
    pub fn fx(&self) -> f32 {
        self.rows[0][0]
    }

    /// Vertical focal length.
    #[must_use]
    pub fn fy(&self) -> f32 {
        self.rows[1][1]
    }

    /// Principal point x.
    #[must_use]
    pub fn cx(&self) -> f32 {
        self.rows[0][2]
    }

    /// Principal point y.
    #[must_use]
    pub fn cy(&self) -> f32 {
        self.rows[1][2]
    }
}

/// Projection parameters derived from intrinsics and a source resolution.
///
/// The offsets express the principal point as an asymmetric-frustum view
/// offset against the *source* resolution; the live viewport aspect is
/// deliberately not part of this — it always comes from the render target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectionParams {
    /// Vertical field of view in degrees.
    pub fov_y_degrees: f32,
    /// Horizontal view offset in source pixels, `round(W/2 - cx)`.
    pub offset_x: i32,
    /// Vertical view offset in source pixels, `round(H/2 - cy)`.
    pub offset_y: i32,
    /// Source image width the offsets reference.
    pub source_width: u32,
    /// Source image height the offsets reference.
    pub source_height: u32,
}

impl ProjectionParams {
    /// Derives projection parameters from `K` and the source resolution.
    ///
    /// Returns `None` when `fx`/`fy` are non-finite or non-positive, or the
    /// resolution is degenerate; callers keep their previous projection.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    pub fn from_intrinsics(k: &IntrinsicMatrix, width: u32, height: u32) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }
        let (fx, fy) = (k.fx(), k.fy());
        if !fx.is_finite() || !fy.is_finite() || fx <= 0.0 || fy <= 0.0 {
            return None;
        }

        let fov_y_degrees = (2.0 * ((height as f32 * 0.5) / fy).atan()).to_degrees();
        let offset_x = (width as f32 * 0.5 - k.cx()).round() as i32;
        let offset_y = (height as f32 * 0.5 - k.cy()).round() as i32;

        Some(Self {
            fov_y_degrees,
            offset_x,
            offset_y,
            source_width: width,
            source_height: height,
        })
    }
}

/// Parses an intrinsics payload: JSON nested 3x3, JSON flat array of at
/// least nine numbers, or free text with at least nine numeric tokens.
///
/// # Errors
///
/// Returns [`ViewsyncError::Format`] when fewer than nine numbers can be
/// recovered from any accepted layout.
pub fn parse_intrinsics(input: &str) -> Result<IntrinsicMatrix> {
    if let Ok(value) = serde_json::from_str::<Value>(input) {
        if let Some(k) = intrinsics_from_json(&value) {
            return Ok(k);
        }
    }

    let numbers: Vec<f32> = input.lines().flat_map(numeric_tokens).collect();
    IntrinsicMatrix::from_flat(&numbers)
        .ok_or_else(|| ViewsyncError::Format("no recognizable intrinsics in input".into()))
}

#[allow(clippy::cast_possible_truncation)]
fn intrinsics_from_json(value: &Value) -> Option<IntrinsicMatrix> {
    let Value::Array(items) = value else {
        return None;
    };

    if items.iter().any(Value::is_array) {
        // Nested rows: need three rows of at least three numbers.
        if items.len() < 3 {
            return None;
        }
        let mut rows = [[0.0f32; 3]; 3];
        for (dst, row) in rows.iter_mut().zip(items) {
            let cells = row.as_array()?;
            if cells.len() < 3 {
                return None;
            }
            for (out, cell) in dst.iter_mut().zip(cells) {
                *out = cell.as_f64()? as f32;
            }
        }
        return Some(IntrinsicMatrix::from_rows(rows));
    }

    let numbers: Vec<f32> = items
        .iter()
        .map(|cell| cell.as_f64().map(|v| v as f32))
        .collect::<Option<_>>()?;
    IntrinsicMatrix::from_flat(&numbers)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_k() -> IntrinsicMatrix {
        IntrinsicMatrix::from_rows([[500.0, 0.0, 320.0], [0.0, 500.0, 240.0], [0.0, 0.0, 1.0]])
    }

    #[test]
    fn test_vertical_fov() {
        let params = ProjectionParams::from_intrinsics(&sample_k(), 640, 480).unwrap();
        // 2 * atan(240 / 500) in degrees.
        assert!((params.fov_y_degrees - 51.282).abs() < 0.01);
        assert_eq!(params.offset_x, 0);
        assert_eq!(params.offset_y, 0);
    }

    #[test]
    fn test_principal_point_offset() {
        let k = IntrinsicMatrix::from_rows([
            [500.0, 0.0, 310.5],
            [0.0, 500.0, 250.0],
            [0.0, 0.0, 1.0],
        ]);
        let params = ProjectionParams::from_intrinsics(&k, 640, 480).unwrap();
        assert_eq!(params.offset_x, 10); // round(320 - 310.5)
        assert_eq!(params.offset_y, -10); // round(240 - 250)
        assert_eq!(params.source_width, 640);
        assert_eq!(params.source_height, 480);
    }

    #[test]
    fn test_invalid_focal_lengths_rejected() {
        let zero_fy =
            IntrinsicMatrix::from_rows([[500.0, 0.0, 320.0], [0.0, 0.0, 240.0], [0.0, 0.0, 1.0]]);
        assert!(ProjectionParams::from_intrinsics(&zero_fy, 640, 480).is_none());

        let nan_fx = IntrinsicMatrix::from_rows([
            [f32::NAN, 0.0, 320.0],
            [0.0, 500.0, 240.0],
            [0.0, 0.0, 1.0],
        ]);
        assert!(ProjectionParams::from_intrinsics(&nan_fx, 640, 480).is_none());

        assert!(ProjectionParams::from_intrinsics(&sample_k(), 0, 480).is_none());
    }

    #[test]
    fn test_parse_json_nested() {
        let k = parse_intrinsics("[[500, 0, 320], [0, 500, 240], [0, 0, 1]]").unwrap();
        assert_eq!(k, sample_k());
    }

    #[test]
    fn test_parse_json_flat() {
        let k = parse_intrinsics("[500, 0, 320, 0, 500, 240, 0, 0, 1]").unwrap();
        assert_eq!(k, sample_k());
    }

    #[test]
    fn test_parse_free_text() {
        let k = parse_intrinsics("500 0 320\n0 500 240\n0 0 1\n").unwrap();
        assert_eq!(k, sample_k());
        assert_eq!(k.fx(), 500.0);
        assert_eq!(k.cy(), 240.0);
    }

    #[test]
    fn test_parse_too_few_numbers() {
        let err = parse_intrinsics("500 0 320\n").unwrap_err();
        assert!(matches!(err, ViewsyncError::Format(_)));
    }
}
