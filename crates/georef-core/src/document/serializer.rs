//! Conversion between [`TransformDocument`] and its JSON record.
//!
//! Serialization always writes image coordinates in pixels and world
//! coordinates in degrees. Deserialization also accepts normalized image
//! coordinates and Web Mercator meters, converting them on load.

use log::debug;
use serde_json::Value;

use super::schema::{
    BoundsRecord, DimensionsRecord, DocumentRecord, GeoreferencingRecord, ImageCoordRecord,
    ImageUnit, MetadataRecord, ParametersRecord, ReferencePointRecord, SourceRecord,
    TransformationRecord, WorldCoordRecord, WorldUnit, XyRecord,
};
use super::{DocumentMetadata, SourceInfo, TransformDocument, SUPPORTED_MAJOR_VERSION};
use crate::control_points::ControlPointSet;
use crate::error::{GeorefError, GeorefResult};
use crate::projection;
use crate::transform::{BoundsQuad, Transform};
use crate::types::{ControlPointPair, GeoPoint, ImagePoint, ProjectedPoint};

/// Encode a document as pretty-printed JSON.
pub fn serialize(document: &TransformDocument) -> GeorefResult<String> {
    let record = to_record(document);
    let text = serde_json::to_string_pretty(&record)?;
    debug!(
        "serialized document for '{}' ({} bytes)",
        document.source().filename,
        text.len()
    );
    Ok(text)
}

/// Encode a document as UTF-8 JSON bytes.
pub fn serialize_bytes(document: &TransformDocument) -> GeorefResult<Vec<u8>> {
    serialize(document).map(String::into_bytes)
}

/// Decode a document from JSON text.
///
/// # Errors
///
/// - `IncompatibleVersion` if the major version is not supported
/// - `MalformedDocument` if the JSON is invalid, fields are missing or of the
///   wrong type, any value is out of range, or `metadata.modified` is earlier
///   than `metadata.created`
pub fn deserialize(text: &str) -> GeorefResult<TransformDocument> {
    let value: Value = serde_json::from_str(text)?;

    // Version first, so a future layout is reported as such rather than as
    // a structural error
    let version = value
        .get("version")
        .and_then(Value::as_str)
        .ok_or_else(|| GeorefError::malformed("missing or non-string field `version`"))?;
    check_version(version)?;

    let record: DocumentRecord = serde_json::from_value(value)?;
    let document = from_record(record)?;
    debug!(
        "deserialized document for '{}' (version {})",
        document.source().filename,
        document.version()
    );
    Ok(document)
}

/// Decode a document from UTF-8 JSON bytes.
pub fn deserialize_bytes(bytes: &[u8]) -> GeorefResult<TransformDocument> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| GeorefError::malformed(format!("document is not valid UTF-8: {}", e)))?;
    deserialize(text)
}

/// Parse the major component of a `major.minor` version string.
fn check_version(version: &str) -> GeorefResult<()> {
    let major = version
        .split('.')
        .next()
        .and_then(|m| m.trim().parse::<u32>().ok())
        .ok_or_else(|| GeorefError::malformed(format!("unparsable version '{}'", version)))?;

    if major != SUPPORTED_MAJOR_VERSION {
        return Err(GeorefError::IncompatibleVersion {
            found: version.to_string(),
            supported: SUPPORTED_MAJOR_VERSION,
        });
    }
    Ok(())
}

fn to_record(document: &TransformDocument) -> DocumentRecord {
    let source = document.source();
    let transform = document.transform();
    let bounds = document.bounds();
    let translation = transform.translation();

    let reference_points = document
        .control_points()
        .pairs()
        .iter()
        .map(|pair| ReferencePointRecord {
            id: pair.id.clone(),
            image: ImageCoordRecord {
                x: pair.image.x,
                y: pair.image.y,
                unit: ImageUnit::Pixels,
            },
            world: WorldCoordRecord {
                x: pair.geo.longitude,
                y: pair.geo.latitude,
                unit: WorldUnit::Degrees,
            },
        })
        .collect();

    let lon_lat = |g: GeoPoint| [g.longitude, g.latitude];

    DocumentRecord {
        version: document.version().to_string(),
        metadata: MetadataRecord {
            created: document.metadata().created,
            modified: document.metadata().modified,
            software: document.metadata().software.clone(),
        },
        source: SourceRecord {
            filename: source.filename.clone(),
            dimensions: DimensionsRecord {
                width: source.width,
                height: source.height,
            },
            coordinate_system: source.coordinate_system.clone(),
        },
        preparation: document.preparation().cloned(),
        georeferencing: GeoreferencingRecord {
            reference_points,
            transformation: TransformationRecord {
                kind: document.transformation_kind(),
                parameters: ParametersRecord {
                    scale: transform.scale(),
                    rotation: transform.rotation_degrees(),
                    translation: XyRecord {
                        x: translation.longitude,
                        y: translation.latitude,
                    },
                },
                bounds: BoundsRecord {
                    top_left: lon_lat(bounds.top_left),
                    top_right: lon_lat(bounds.top_right),
                    bottom_right: lon_lat(bounds.bottom_right),
                    bottom_left: lon_lat(bounds.bottom_left),
                },
            },
        },
    }
}

fn from_record(record: DocumentRecord) -> GeorefResult<TransformDocument> {
    let DimensionsRecord { width, height } = record.source.dimensions;
    if width == 0 || height == 0 {
        return Err(GeorefError::malformed(format!(
            "source dimensions must be positive, got {}x{}",
            width, height
        )));
    }

    let points = record.georeferencing.reference_points;
    if points.len() != 2 {
        return Err(GeorefError::malformed(format!(
            "expected exactly 2 reference points, found {}",
            points.len()
        )));
    }
    let mut pairs = points
        .into_iter()
        .map(|p| reference_point(p, width, height))
        .collect::<GeorefResult<Vec<_>>>()?
        .into_iter();
    let (first, second) = match (pairs.next(), pairs.next()) {
        (Some(first), Some(second)) => (first, second),
        _ => return Err(GeorefError::malformed("expected exactly 2 reference points")),
    };

    let transformation = record.georeferencing.transformation;
    let params = transformation.parameters;
    let anchor = checked_geo(
        "transformation.parameters.translation",
        params.translation.x,
        params.translation.y,
    )?;
    let transform = Transform::new(params.scale, params.rotation, anchor).map_err(|e| match e {
        GeorefError::MalformedDocument(msg) => GeorefError::malformed(format!("transformation: {}", msg)),
        other => GeorefError::malformed(format!("transformation: {}", other)),
    })?;

    let b = transformation.bounds;
    let bounds = BoundsQuad::from_corners([
        checked_geo("bounds.topLeft", b.top_left[0], b.top_left[1])?,
        checked_geo("bounds.topRight", b.top_right[0], b.top_right[1])?,
        checked_geo("bounds.bottomRight", b.bottom_right[0], b.bottom_right[1])?,
        checked_geo("bounds.bottomLeft", b.bottom_left[0], b.bottom_left[1])?,
    ]);

    let MetadataRecord {
        created,
        modified,
        software,
    } = record.metadata;
    if modified < created {
        return Err(GeorefError::malformed(format!(
            "metadata.modified ({}) is earlier than metadata.created ({})",
            modified.to_rfc3339(),
            created.to_rfc3339()
        )));
    }

    Ok(TransformDocument::from_parts(
        record.version,
        DocumentMetadata {
            created,
            modified,
            software,
        },
        SourceInfo {
            filename: record.source.filename,
            width,
            height,
            coordinate_system: record.source.coordinate_system,
        },
        record.preparation,
        ControlPointSet::new(first, second),
        transform,
        transformation.kind,
        bounds,
    ))
}

/// Build a geographic point and reject it if it is outside the projection domain.
fn checked_geo(field: &str, longitude: f64, latitude: f64) -> GeorefResult<GeoPoint> {
    let geo = GeoPoint::new(longitude, latitude);
    geo.validate()
        .map_err(|e| GeorefError::malformed(format!("{}: {}", field, e)))?;
    Ok(geo)
}

fn reference_point(
    record: ReferencePointRecord,
    width: u32,
    height: u32,
) -> GeorefResult<ControlPointPair> {
    let field = format!("referencePoints['{}']", record.id);

    let image = match record.image.unit {
        ImageUnit::Pixels => ImagePoint::new(record.image.x, record.image.y),
        ImageUnit::Normalized => ImagePoint::new(
            record.image.x * width as f64,
            record.image.y * height as f64,
        ),
    };
    if !image.is_finite() {
        return Err(GeorefError::malformed(format!(
            "{}.image is not finite",
            field
        )));
    }

    let geo = match record.world.unit {
        WorldUnit::Degrees => checked_geo(&format!("{}.world", field), record.world.x, record.world.y)?,
        WorldUnit::Meters => {
            if !record.world.x.is_finite() || !record.world.y.is_finite() {
                return Err(GeorefError::malformed(format!(
                    "{}.world is not finite",
                    field
                )));
            }
            let geo = projection::unproject(ProjectedPoint::new(record.world.x, record.world.y));
            checked_geo(&format!("{}.world", field), geo.longitude, geo.latitude)?
        }
    };

    Ok(ControlPointPair::new(record.id, image, geo))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeorefConfig;
    use crate::document::test_support::{scenario_document, scenario_set};
    use crate::document::{
        LegendRemoval, Preparation, RemovalMode, Selection, TransformationKind,
    };

    fn scenario_value() -> Value {
        serde_json::from_str(&serialize(&scenario_document()).unwrap()).unwrap()
    }

    fn with_preparation() -> TransformDocument {
        let selection: Selection = serde_json::from_str(
            r#"{ "id": "legend-1", "x": 0.7, "y": 0.8, "width": 0.25, "height": 0.15, "unit": "normalized" }"#,
        )
        .unwrap();
        TransformDocument::create(
            SourceInfo::new("sheet-42.png", 1000, 800, "WGS84"),
            scenario_set(),
            Some(Preparation {
                legend_removal: LegendRemoval {
                    enabled: true,
                    mode: RemovalMode::Remove,
                    selections: vec![selection],
                    ..Default::default()
                },
                ..Default::default()
            }),
            &GeorefConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_round_trip() {
        let doc = scenario_document();
        let back = deserialize(&serialize(&doc).unwrap()).unwrap();
        assert!(back.approx_eq(&doc), "{:#?}\n!=\n{:#?}", back, doc);
    }

    #[test]
    fn test_round_trip_with_preparation() {
        let doc = with_preparation();
        let back = deserialize(&serialize(&doc).unwrap()).unwrap();
        assert!(back.approx_eq(&doc));
        assert_eq!(back.preparation(), doc.preparation());
    }

    #[test]
    fn test_bytes_round_trip() {
        let doc = scenario_document();
        let back = deserialize_bytes(&serialize_bytes(&doc).unwrap()).unwrap();
        assert!(back.approx_eq(&doc));
    }

    #[test]
    fn test_invalid_utf8_is_malformed() {
        assert!(matches!(
            deserialize_bytes(&[0xff, 0xfe, 0x00]),
            Err(GeorefError::MalformedDocument(_))
        ));
    }

    #[test]
    fn test_field_layout() {
        let value = scenario_value();
        assert_eq!(value["version"], "1.0");
        assert_eq!(value["source"]["dimensions"]["width"], 1000);
        assert_eq!(value["source"]["coordinateSystem"], "WGS84");
        assert!(value.get("preparation").is_none());

        let georef = &value["georeferencing"];
        assert_eq!(georef["referencePoints"].as_array().unwrap().len(), 2);
        assert_eq!(georef["referencePoints"][0]["image"]["unit"], "pixels");
        assert_eq!(georef["referencePoints"][0]["world"]["unit"], "degrees");
        assert_eq!(georef["referencePoints"][1]["world"]["x"], 13.847);
        assert_eq!(georef["transformation"]["type"], "similarity");
        assert!(georef["transformation"]["parameters"]["scale"].is_f64());
        assert_eq!(
            georef["transformation"]["bounds"]["topLeft"]
                .as_array()
                .unwrap()
                .len(),
            2
        );
    }

    #[test]
    fn test_incompatible_major_version() {
        let mut value = scenario_value();
        value["version"] = Value::from("2.0");
        let result = deserialize(&value.to_string());
        assert!(matches!(
            result,
            Err(GeorefError::IncompatibleVersion { ref found, supported: 1 }) if found == "2.0"
        ));
    }

    #[test]
    fn test_incompatible_version_reported_before_structure() {
        let result = deserialize(r#"{ "version": "3.1", "somethingElse": true }"#);
        assert!(matches!(
            result,
            Err(GeorefError::IncompatibleVersion { .. })
        ));
    }

    #[test]
    fn test_minor_version_accepted() {
        let mut value = scenario_value();
        value["version"] = Value::from("1.7");
        let doc = deserialize(&value.to_string()).unwrap();
        assert_eq!(doc.version(), "1.7");
    }

    #[test]
    fn test_bad_version_strings() {
        for version in [Value::from("one.zero"), Value::from(""), Value::from(1.0)] {
            let mut value = scenario_value();
            value["version"] = version;
            assert!(matches!(
                deserialize(&value.to_string()),
                Err(GeorefError::MalformedDocument(_))
            ));
        }
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            deserialize("{ \"version\": \"1.0\", "),
            Err(GeorefError::MalformedDocument(_))
        ));
    }

    #[test]
    fn test_missing_field() {
        let mut value = scenario_value();
        value["georeferencing"]["transformation"]["parameters"]
            .as_object_mut()
            .unwrap()
            .remove("scale");
        assert!(matches!(
            deserialize(&value.to_string()),
            Err(GeorefError::MalformedDocument(_))
        ));
    }

    #[test]
    fn test_non_numeric_field() {
        let mut value = scenario_value();
        value["georeferencing"]["transformation"]["parameters"]["rotation"] = Value::from("north");
        assert!(matches!(
            deserialize(&value.to_string()),
            Err(GeorefError::MalformedDocument(_))
        ));
    }

    #[test]
    fn test_out_of_range_parameters() {
        let cases: [(&str, Value); 4] = [
            ("scale", Value::from(0.0)),
            ("scale", Value::from(-1.5)),
            ("rotation", Value::from(540.0)),
            ("rotation", Value::from(-180.0)),
        ];
        for (key, bad) in cases {
            let mut value = scenario_value();
            value["georeferencing"]["transformation"]["parameters"][key] = bad.clone();
            assert!(
                matches!(
                    deserialize(&value.to_string()),
                    Err(GeorefError::MalformedDocument(_))
                ),
                "{} = {} should be rejected",
                key,
                bad
            );
        }
    }

    #[test]
    fn test_out_of_domain_coordinates() {
        let mut value = scenario_value();
        value["georeferencing"]["referencePoints"][0]["world"]["y"] = Value::from(90.0);
        assert!(matches!(
            deserialize(&value.to_string()),
            Err(GeorefError::MalformedDocument(_))
        ));

        let mut value = scenario_value();
        value["georeferencing"]["transformation"]["bounds"]["bottomRight"] =
            serde_json::json!([200.0, 46.0]);
        assert!(matches!(
            deserialize(&value.to_string()),
            Err(GeorefError::MalformedDocument(_))
        ));

        let mut value = scenario_value();
        value["georeferencing"]["transformation"]["parameters"]["translation"]["y"] =
            Value::from(-95.0);
        assert!(matches!(
            deserialize(&value.to_string()),
            Err(GeorefError::MalformedDocument(_))
        ));
    }

    #[test]
    fn test_wrong_reference_point_count() {
        let mut value = scenario_value();
        let points = value["georeferencing"]["referencePoints"]
            .as_array_mut()
            .unwrap();
        let extra = points[0].clone();
        points.push(extra);
        assert!(matches!(
            deserialize(&value.to_string()),
            Err(GeorefError::MalformedDocument(_))
        ));

        let mut value = scenario_value();
        value["georeferencing"]["referencePoints"]
            .as_array_mut()
            .unwrap()
            .truncate(1);
        assert!(matches!(
            deserialize(&value.to_string()),
            Err(GeorefError::MalformedDocument(_))
        ));
    }

    #[test]
    fn test_zero_dimensions() {
        let mut value = scenario_value();
        value["source"]["dimensions"]["height"] = Value::from(0);
        assert!(matches!(
            deserialize(&value.to_string()),
            Err(GeorefError::MalformedDocument(_))
        ));

        let mut value = scenario_value();
        value["source"]["dimensions"]["width"] = Value::from(-5);
        assert!(matches!(
            deserialize(&value.to_string()),
            Err(GeorefError::MalformedDocument(_))
        ));
    }

    #[test]
    fn test_unknown_transformation_type() {
        let mut value = scenario_value();
        value["georeferencing"]["transformation"]["type"] = Value::from("homography");
        assert!(matches!(
            deserialize(&value.to_string()),
            Err(GeorefError::MalformedDocument(_))
        ));
    }

    #[test]
    fn test_legacy_affine_label_preserved() {
        let mut value = scenario_value();
        value["georeferencing"]["transformation"]["type"] = Value::from("affine");
        let doc = deserialize(&value.to_string()).unwrap();
        assert_eq!(doc.transformation_kind(), TransformationKind::Affine);

        let written: Value = serde_json::from_str(&serialize(&doc).unwrap()).unwrap();
        assert_eq!(written["georeferencing"]["transformation"]["type"], "affine");
    }

    #[test]
    fn test_normalized_image_units() {
        let mut value = scenario_value();
        let point = &mut value["georeferencing"]["referencePoints"][1]["image"];
        point["x"] = Value::from(0.9);
        point["y"] = Value::from(0.125);
        point["unit"] = Value::from("normalized");

        let doc = deserialize(&value.to_string()).unwrap();
        let image = doc.control_points().second().image;
        assert!((image.x - 900.0).abs() < 1e-9);
        assert!((image.y - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_meter_world_units() {
        let doc = scenario_document();
        let projected = projection::project(doc.control_points().first().geo).unwrap();

        let mut value = scenario_value();
        let world = &mut value["georeferencing"]["referencePoints"][0]["world"];
        world["x"] = Value::from(projected.x);
        world["y"] = Value::from(projected.y);
        world["unit"] = Value::from("meters");

        let loaded = deserialize(&value.to_string()).unwrap();
        assert!(loaded
            .control_points()
            .first()
            .geo
            .approx_eq(&doc.control_points().first().geo, 1e-9));
    }

    #[test]
    fn test_unknown_units_rejected() {
        let mut value = scenario_value();
        value["georeferencing"]["referencePoints"][0]["image"]["unit"] = Value::from("inches");
        assert!(matches!(
            deserialize(&value.to_string()),
            Err(GeorefError::MalformedDocument(_))
        ));
    }

    #[test]
    fn test_preparation_requires_selection_keys() {
        let mut value: Value =
            serde_json::from_str(&serialize(&with_preparation()).unwrap()).unwrap();
        value["preparation"]["legendRemoval"]["selections"][0]
            .as_object_mut()
            .unwrap()
            .remove("height");
        assert!(matches!(
            deserialize(&value.to_string()),
            Err(GeorefError::MalformedDocument(_))
        ));
    }

    #[test]
    fn test_preparation_values_carried_unchanged() {
        let mut value: Value =
            serde_json::from_str(&serialize(&with_preparation()).unwrap()).unwrap();
        value["preparation"]["legendRemoval"]["selections"][0]["x"] = Value::from("not-a-number");
        value["preparation"]["legendRemoval"]["selections"][0]["note"] = Value::from("scale bar");
        value["preparation"]["legendRemoval"]["strokeColor"] = Value::from("#f00");
        value["preparation"]["frameRemoval"] = serde_json::json!({ "enabled": false });

        let doc = deserialize(&value.to_string()).unwrap();
        let rewritten: Value = serde_json::from_str(&serialize(&doc).unwrap()).unwrap();
        assert_eq!(rewritten["preparation"], value["preparation"]);
        assert_eq!(
            rewritten["preparation"]["legendRemoval"]["strokeColor"],
            "#f00"
        );
        assert_eq!(
            rewritten["preparation"]["frameRemoval"]["enabled"],
            Value::Bool(false)
        );
    }

    #[test]
    fn test_stale_bounds_are_not_repaired() {
        let mut value = scenario_value();
        value["georeferencing"]["transformation"]["bounds"]["bottomRight"] =
            serde_json::json!([14.0, 46.0]);
        let doc = deserialize(&value.to_string()).unwrap();
        assert_eq!(doc.bounds().bottom_right, GeoPoint::new(14.0, 46.0));
        assert!(!doc.is_bounds_current(1e-6));
    }

    #[test]
    fn test_timestamps_round_trip() {
        let doc = scenario_document();
        let value = scenario_value();
        assert!(value["metadata"]["created"].as_str().unwrap().ends_with('Z'));
        let back = deserialize(&value.to_string()).unwrap();
        assert_eq!(back.metadata().created, doc.metadata().created);
    }

    #[test]
    fn test_timestamp_with_offset_accepted() {
        let mut value = scenario_value();
        value["metadata"]["created"] = Value::from("2024-03-01T10:00:00+02:00");
        let doc = deserialize(&value.to_string()).unwrap();
        assert_eq!(doc.metadata().created.to_rfc3339(), "2024-03-01T08:00:00+00:00");
    }

    #[test]
    fn test_modified_before_created_is_malformed() {
        let mut value = scenario_value();
        value["metadata"]["created"] = Value::from("2024-03-02T00:00:00Z");
        value["metadata"]["modified"] = Value::from("2024-03-01T00:00:00Z");
        assert!(matches!(
            deserialize(&value.to_string()),
            Err(GeorefError::MalformedDocument(ref msg)) if msg.contains("metadata.modified")
        ));
    }

    #[test]
    fn test_equal_timestamps_accepted() {
        let mut value = scenario_value();
        value["metadata"]["created"] = Value::from("2024-03-01T00:00:00Z");
        value["metadata"]["modified"] = Value::from("2024-03-01T00:00:00Z");
        let doc = deserialize(&value.to_string()).unwrap();
        assert_eq!(doc.metadata().created, doc.metadata().modified);
    }

    #[test]
    fn test_bad_timestamp() {
        let mut value = scenario_value();
        value["metadata"]["modified"] = Value::from("yesterday");
        assert!(matches!(
            deserialize(&value.to_string()),
            Err(GeorefError::MalformedDocument(_))
        ));
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================
