//! 3D box annotations: parsing and class-label resolution.
//!
//! Annotation payloads are JSON objects with an `instances` array; each
//! instance carries a `bbox_3d` of at least six numbers (center then size)
//! and optionally a `bbox_label_3d` that is a numeric class id or a name.
//! Malformed instances are skipped, never fatal. Geometry and colors for
//! the boxes are the host rendering layer's business.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use viewsync_core::Result;

/// Default class order for numeric label ids.
pub const DEFAULT_CLASS_NAMES: [&str; 19] = [
    "cabinet",
    "bed",
    "chair",
    "sofa",
    "table",
    "door",
    "window",
    "bookshelf",
    "picture",
    "counter",
    "desk",
    "curtain",
    "refrigerator",
    "showercurtrain",
    "toilet",
    "sink",
    "bathtub",
    "garbagebin",
    "",
];

/// Resolves a numeric class id through the default class table.
#[must_use]
pub fn class_name_for_id(id: i64) -> Option<&'static str> {
    usize::try_from(id)
        .ok()
        .and_then(|index| DEFAULT_CLASS_NAMES.get(index).copied())
}

/// An annotation's class label, either a raw numeric id or a name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnnotationLabel {
    /// Numeric class id, resolvable through [`DEFAULT_CLASS_NAMES`].
    Id(i64),
    /// Class name.
    Name(String),
}

impl AnnotationLabel {
    /// Resolves the label to a class name, mapping ids through the default
    /// table; out-of-range ids degrade to their decimal string.
    #[must_use]
    pub fn resolve_name(&self) -> String {
        match self {
            AnnotationLabel::Id(id) => class_name_for_id(*id)
                .map_or_else(|| id.to_string(), std::string::ToString::to_string),
            AnnotationLabel::Name(name) => name.clone(),
        }
    }
}

/// One axis-aligned 3D box annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxAnnotation {
    /// Box center.
    pub center: Vec3,
    /// Box extents along x, y, z.
    pub size: Vec3,
    /// Class label, if present.
    pub label: Option<AnnotationLabel>,
}

/// Parses an annotation payload.
///
/// With `label_as_name` set, numeric ids are resolved to class names at
/// parse time. Instances with a missing or short `bbox_3d` are skipped
/// silently; an object without an `instances` array yields an empty batch.
///
/// # Errors
///
/// Returns [`viewsync_core::ViewsyncError::Json`] when the payload is not
/// valid JSON at all.
pub fn parse_annotations(input: &str, label_as_name: bool) -> Result<Vec<BoxAnnotation>> {
    let data: Value = serde_json::from_str(input)?;

    let instances = match data.get("instances") {
        Some(Value::Array(items)) => items.as_slice(),
        _ => &[],
    };

    let mut out = Vec::with_capacity(instances.len());
    let mut skipped = 0usize;
    for instance in instances {
        match parse_instance(instance, label_as_name) {
            Some(annotation) => out.push(annotation),
            None => skipped += 1,
        }
    }
    if skipped > 0 {
        log::debug!("annotations: skipped {skipped} malformed instance(s)");
    }
    Ok(out)
}

#[allow(clippy::cast_possible_truncation)]
fn parse_instance(instance: &Value, label_as_name: bool) -> Option<BoxAnnotation> {
    let bbox = instance.get("bbox_3d")?.as_array()?;
    if bbox.len() < 6 {
        return None;
    }
    let mut numbers = [0.0f32; 6];
    for (out, cell) in numbers.iter_mut().zip(bbox) {
        *out = cell.as_f64()? as f32;
    }

    let label = instance.get("bbox_label_3d").and_then(|raw| match raw {
        Value::Number(number) => number
            .as_i64()
            .map(AnnotationLabel::Id)
            .or_else(|| Some(AnnotationLabel::Name(number.to_string()))),
        Value::String(name) => Some(AnnotationLabel::Name(name.clone())),
        _ => None,
    });
    let label = if label_as_name {
        label.map(|l| AnnotationLabel::Name(l.resolve_name()))
    } else {
        label
    };

    Some(BoxAnnotation {
        center: Vec3::new(numbers[0], numbers[1], numbers[2]),
        size: Vec3::new(numbers[3], numbers[4], numbers[5]),
        label,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_instances() {
        let input = r#"{
            "instances": [
                {"bbox_3d": [1, 2, 3, 0.5, 0.6, 0.7], "bbox_label_3d": 2},
                {"bbox_3d": [0, 0, 0, 1, 1, 1], "bbox_label_3d": "sofa"}
            ]
        }"#;
        let annotations = parse_annotations(input, false).unwrap();
        assert_eq!(annotations.len(), 2);
        assert_eq!(annotations[0].center, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(annotations[0].size, Vec3::new(0.5, 0.6, 0.7));
        assert_eq!(annotations[0].label, Some(AnnotationLabel::Id(2)));
        assert_eq!(
            annotations[1].label,
            Some(AnnotationLabel::Name("sofa".into()))
        );
    }

    #[test]
    fn test_malformed_instance_skipped_sibling_kept() {
        let input = r#"{
            "instances": [
                {"bbox_3d": [1, 2, 3, 4]},
                {"bbox_3d": [0, 0, 0, 1, 1, 1], "bbox_label_3d": "chair"}
            ]
        }"#;
        let annotations = parse_annotations(input, false).unwrap();
        assert_eq!(annotations.len(), 1);
        assert_eq!(
            annotations[0].label,
            Some(AnnotationLabel::Name("chair".into()))
        );
    }

    #[test]
    fn test_label_as_name_resolution() {
        let input = r#"{
            "instances": [
                {"bbox_3d": [0, 0, 0, 1, 1, 1], "bbox_label_3d": 0},
                {"bbox_3d": [0, 0, 0, 1, 1, 1], "bbox_label_3d": 99}
            ]
        }"#;
        let annotations = parse_annotations(input, true).unwrap();
        assert_eq!(
            annotations[0].label,
            Some(AnnotationLabel::Name("cabinet".into()))
        );
        // Out-of-range ids degrade to their decimal string.
        assert_eq!(
            annotations[1].label,
            Some(AnnotationLabel::Name("99".into()))
        );
    }

    #[test]
    fn test_missing_instances_is_empty_batch() {
        assert!(parse_annotations("{}", false).unwrap().is_empty());
        assert!(parse_annotations(r#"{"instances": 5}"#, false)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_invalid_json_is_error() {
        assert!(parse_annotations("not json", false).is_err());
    }

    #[test]
    fn test_class_table() {
        assert_eq!(class_name_for_id(0), Some("cabinet"));
        assert_eq!(class_name_for_id(17), Some("garbagebin"));
        assert_eq!(class_name_for_id(18), Some(""));
        assert_eq!(class_name_for_id(19), None);
        assert_eq!(class_name_for_id(-1), None);
    }
}
