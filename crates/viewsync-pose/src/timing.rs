//! Playback-position to pose-index mapping.
//!
//! Pure index math shared by the per-frame and event-driven video sync
//! paths. Media timestamps are `f64` seconds, as host media clocks report
//! them.

/// Selects the pose index nearest to `media_time / duration` of the way
/// through a sequence of `len` poses: `round((t/dur)*(len-1))`, clamped to
/// `[0, len-1]`.
///
/// Returns `None` when the sequence is empty, the duration is unknown
/// (non-finite or non-positive), or the timestamp is non-finite.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
pub fn index_from_ratio(media_time: f64, duration: f64, len: usize) -> Option<usize> {
    if len == 0 || !duration.is_finite() || duration <= 0.0 || !media_time.is_finite() {
        return None;
    }
    let last = (len - 1) as f64;
    let index = (media_time / duration * last).round().clamp(0.0, last);
    Some(index as usize)
}

/// Selects the pose index for a known frame rate: `round(t * fps)`, clamped
/// to `[0, len-1]`.
///
/// Returns `None` when the sequence is empty, the frame rate is unusable
/// (non-finite or non-positive), or the timestamp is non-finite.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
pub fn index_from_fps(current_time: f64, fps: f64, len: usize) -> Option<usize> {
    if len == 0 || !fps.is_finite() || fps <= 0.0 || !current_time.is_finite() {
        return None;
    }
    let last = (len - 1) as f64;
    let index = (current_time * fps).round().clamp(0.0, last);
    Some(index as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_ratio_endpoints() {
        assert_eq!(index_from_ratio(0.0, 10.0, 100), Some(0));
        assert_eq!(index_from_ratio(10.0, 10.0, 100), Some(99));
        assert_eq!(index_from_ratio(5.0, 10.0, 101), Some(50));
    }

    #[test]
    fn test_ratio_overrun_clamps() {
        assert_eq!(index_from_ratio(25.0, 10.0, 100), Some(99));
        assert_eq!(index_from_ratio(-1.0, 10.0, 100), Some(0));
    }

    #[test]
    fn test_ratio_insufficient_information() {
        assert_eq!(index_from_ratio(1.0, f64::NAN, 100), None);
        assert_eq!(index_from_ratio(1.0, f64::INFINITY, 100), None);
        assert_eq!(index_from_ratio(1.0, 0.0, 100), None);
        assert_eq!(index_from_ratio(f64::NAN, 10.0, 100), None);
        assert_eq!(index_from_ratio(1.0, 10.0, 0), None);
    }

    #[test]
    fn test_fps_selection() {
        // 10 poses at 30 fps: t = 0.5 lands on frame 15, clamped to 9.
        assert_eq!(index_from_fps(0.5, 30.0, 10), Some(9));
        assert_eq!(index_from_fps(0.1, 30.0, 10), Some(3));
        assert_eq!(index_from_fps(0.0, 30.0, 10), Some(0));
    }

    #[test]
    fn test_fps_insufficient_information() {
        assert_eq!(index_from_fps(1.0, 0.0, 10), None);
        assert_eq!(index_from_fps(1.0, -30.0, 10), None);
        assert_eq!(index_from_fps(1.0, f64::NAN, 10), None);
        assert_eq!(index_from_fps(1.0, 30.0, 0), None);
    }

    proptest! {
        // Clamping law: any finite non-negative combination stays in range.
        #[test]
        fn prop_ratio_index_in_range(
            time in 0.0f64..1e7,
            duration in 1e-6f64..1e7,
            len in 1usize..10_000,
        ) {
            let index = index_from_ratio(time, duration, len).unwrap();
            prop_assert!(index < len);
        }

        #[test]
        fn prop_fps_index_in_range(
            time in 0.0f64..1e7,
            fps in 1e-6f64..1000.0,
            len in 1usize..10_000,
        ) {
            let index = index_from_fps(time, fps, len).unwrap();
            prop_assert!(index < len);
        }

        #[test]
        fn prop_ratio_monotone_in_time(
            duration in 1.0f64..1e4,
            len in 2usize..1000,
        ) {
            let early = index_from_ratio(duration * 0.25, duration, len).unwrap();
            let late = index_from_ratio(duration * 0.75, duration, len).unwrap();
            prop_assert!(early <= late);
        }
    }
}
