//! Pose normalization: raw pose payloads to [`PoseSequence`].
//!
//! Raw pose data arrives in heterogeneous shapes: a JSON array of flat
//! 12/16-number arrays or nested row arrays, or free-form whitespace text
//! with blank-line-separated numeric blocks. Classification is explicit — a
//! [`PoseBlock`] tag per recognized shape with a single conversion each —
//! and the parser strategies run in a fixed order, first success winning:
//! JSON array, then numeric blocks, then one pose per line.

use serde_json::Value;

use viewsync_core::{Result, ViewsyncError};

use crate::extrinsic::{ExtrinsicMatrix, PoseConvention, PoseSequence};

/// A raw pose payload element classified by shape.
#[derive(Debug, Clone, PartialEq)]
pub enum PoseBlock {
    /// Twelve numbers, row-major 3x4.
    Flat12([f32; 12]),
    /// Sixteen numbers, row-major 4x4; the last row is discarded.
    Flat16([f32; 16]),
    /// Three rows of four numbers.
    Nested3x4([[f32; 4]; 3]),
    /// Four rows of four numbers; the last row is discarded.
    Nested4x4([[f32; 4]; 4]),
}

impl PoseBlock {
    /// Classifies one element of a JSON pose array.
    ///
    /// Exact nested 3x4/4x4 shapes take priority; anything else is flattened
    /// and reinterpreted as a flat 12/16 pose. Returns `None` for elements
    /// with no recognizable shape.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn classify_value(value: &Value) -> Option<Self> {
        let Value::Array(items) = value else {
            return None;
        };

        if items.iter().any(Value::is_array) {
            let rows: Vec<Vec<f32>> = items
                .iter()
                .map(|row| {
                    row.as_array().map(|cells| {
                        cells
                            .iter()
                            .filter_map(Value::as_f64)
                            .map(|v| v as f32)
                            .collect()
                    })
                })
                .collect::<Option<_>>()?;
            return Self::classify_rows(&rows);
        }

        let numbers: Vec<f32> = items
            .iter()
            .map(|cell| cell.as_f64().map(|v| v as f32))
            .collect::<Option<_>>()?;
        Self::classify_flat(&numbers)
    }

    /// Classifies a block of numeric rows from free text (or flattened JSON).
    ///
    /// Row shape is checked before flat reinterpretation of the concatenated
    /// numbers.
    #[must_use]
    pub fn classify_rows(rows: &[Vec<f32>]) -> Option<Self> {
        if rows.len() == 3 && rows.iter().all(|row| row.len() == 4) {
            let mut out = [[0.0; 4]; 3];
            for (dst, src) in out.iter_mut().zip(rows) {
                dst.copy_from_slice(src);
            }
            return Some(PoseBlock::Nested3x4(out));
        }
        if rows.len() == 4 && rows.iter().all(|row| row.len() == 4) {
            let mut out = [[0.0; 4]; 4];
            for (dst, src) in out.iter_mut().zip(rows) {
                dst.copy_from_slice(src);
            }
            return Some(PoseBlock::Nested4x4(out));
        }

        let flat: Vec<f32> = rows.iter().flatten().copied().collect();
        Self::classify_flat(&flat)
    }

    /// Classifies a flat run of numbers: exactly 12 or 16, or nothing.
    #[must_use]
    pub fn classify_flat(numbers: &[f32]) -> Option<Self> {
        match numbers.len() {
            12 => {
                let mut out = [0.0; 12];
                out.copy_from_slice(numbers);
                Some(PoseBlock::Flat12(out))
            }
            16 => {
                let mut out = [0.0; 16];
                out.copy_from_slice(numbers);
                Some(PoseBlock::Flat16(out))
            }
            _ => None,
        }
    }

    /// Converts the classified block into a row-major 3x4 matrix.
    ///
    /// 4x4 shapes drop their last row; `[0,0,0,1]` is assumed and discarded.
    #[must_use]
    pub fn into_matrix(self) -> ExtrinsicMatrix {
        match self {
            PoseBlock::Flat12(m) => ExtrinsicMatrix::from_rows([
                [m[0], m[1], m[2], m[3]],
                [m[4], m[5], m[6], m[7]],
                [m[8], m[9], m[10], m[11]],
            ]),
            PoseBlock::Flat16(m) => ExtrinsicMatrix::from_rows([
                [m[0], m[1], m[2], m[3]],
                [m[4], m[5], m[6], m[7]],
                [m[8], m[9], m[10], m[11]],
            ]),
            PoseBlock::Nested3x4(rows) => ExtrinsicMatrix::from_rows(rows),
            PoseBlock::Nested4x4(rows) => {
                ExtrinsicMatrix::from_rows([rows[0], rows[1], rows[2]])
            }
        }
    }
}

/// Extracts numeric tokens (integer, decimal, or exponential) from a line.
///
/// Non-numeric characters act as separators, so surrounding punctuation and
/// labels are tolerated.
#[must_use]
pub fn numeric_tokens(line: &str) -> Vec<f32> {
    line.chars()
        .map(|c| {
            if c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E') {
                c
            } else {
                ' '
            }
        })
        .collect::<String>()
        .split_whitespace()
        .filter_map(|token| token.parse::<f32>().ok())
        .collect()
}

/// One parsing strategy: `Some(blocks)` claims the input (even with zero
/// recognized poses, which then fails the whole parse), `None` passes to the
/// next strategy.
type Strategy = fn(&str) -> Option<Vec<PoseBlock>>;

/// JSON array of poses. A successful JSON-array parse is final; unclassifiable
/// elements are skipped.
fn json_strategy(input: &str) -> Option<Vec<PoseBlock>> {
    let value: Value = serde_json::from_str(input).ok()?;
    let Value::Array(items) = value else {
        return None;
    };

    let mut blocks = Vec::with_capacity(items.len());
    let mut skipped = 0usize;
    for item in &items {
        match PoseBlock::classify_value(item) {
            Some(block) => blocks.push(block),
            None => skipped += 1,
        }
    }
    if skipped > 0 {
        log::debug!("pose JSON: skipped {skipped} element(s) with unrecognized shape");
    }
    Some(blocks)
}

/// Blank-line-separated numeric blocks from free text.
fn block_strategy(input: &str) -> Option<Vec<PoseBlock>> {
    let mut blocks = Vec::new();
    let mut current: Vec<Vec<f32>> = Vec::new();

    for line in input.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
            continue;
        }
        let numbers = numeric_tokens(line);
        if !numbers.is_empty() {
            current.push(numbers);
        }
    }
    if !current.is_empty() {
        blocks.push(current);
    }

    let classified: Vec<PoseBlock> = blocks
        .iter()
        .filter_map(|rows| PoseBlock::classify_rows(rows))
        .collect();
    if classified.is_empty() {
        None
    } else {
        Some(classified)
    }
}

/// Last resort: every line independently as one flat 12/16 pose.
fn line_strategy(input: &str) -> Option<Vec<PoseBlock>> {
    let classified: Vec<PoseBlock> = input
        .lines()
        .filter_map(|line| PoseBlock::classify_flat(&numeric_tokens(line)))
        .collect();
    if classified.is_empty() {
        None
    } else {
        Some(classified)
    }
}

/// Parses raw pose data of unknown shape into a [`PoseSequence`].
///
/// Strategies run in a fixed order (JSON array, numeric blocks, per-line);
/// the order is part of the format contract. Input read under
/// [`PoseConvention::CameraToWorld`] is inverted into world-to-camera form.
///
/// # Errors
///
/// Returns [`ViewsyncError::Format`] when no strategy yields at least one
/// valid pose. There are no partial results.
pub fn parse_poses(input: &str, convention: PoseConvention) -> Result<PoseSequence> {
    const STRATEGIES: [Strategy; 3] = [json_strategy, block_strategy, line_strategy];

    for strategy in STRATEGIES {
        if let Some(blocks) = strategy(input) {
            let poses: Vec<ExtrinsicMatrix> = blocks
                .into_iter()
                .map(|block| convention.to_extrinsic(block.into_matrix()))
                .collect();
            return PoseSequence::from_poses(poses)
                .ok_or_else(|| ViewsyncError::Format("no valid poses in input".into()));
        }
    }

    Err(ViewsyncError::Format(
        "no recognizable pose structure in input".into(),
    ))
}
