use certstamp_core::placement::{
    HorizontalAnchor, PlacementConfig, PlacementError, VerticalAnchor, DEFAULT_MARGIN_PERCENT,
    DEFAULT_SIZE_PERCENT,
};
use tempfile::tempdir;

/// Defaults are 15% at top-left with a 2% margin.
#[test]
fn default_matches_top_left_fifteen_percent() {
    let config = PlacementConfig::default();
    assert_eq!(config.size_percent, DEFAULT_SIZE_PERCENT);
    assert_eq!(config.margin_percent, DEFAULT_MARGIN_PERCENT);
    assert_eq!(config.horizontal, HorizontalAnchor::Left);
    assert_eq!(config.vertical, VerticalAnchor::Top);
    assert!(config.validate().is_ok());
}

/// A zero or NaN size and a negative margin fail validation.
#[test]
fn validate_rejects_non_positive_size_and_negative_margin() {
    let zero = PlacementConfig { size_percent: 0.0, ..Default::default() };
    assert!(matches!(zero.validate(), Err(PlacementError::InvalidSize(_))));

    let nan = PlacementConfig { size_percent: f64::NAN, ..Default::default() };
    assert!(matches!(nan.validate(), Err(PlacementError::InvalidSize(_))));

    let negative = PlacementConfig { margin_percent: -1.0, ..Default::default() };
    assert!(matches!(negative.validate(), Err(PlacementError::InvalidMargin(_))));
}

/// Size plus margins over 100% passes validation but is flagged.
#[test]
fn oversized_placement_is_valid_but_flagged() {
    let config = PlacementConfig { size_percent: 90.0, margin_percent: 10.0, ..Default::default() };
    assert!(config.validate().is_ok());
    assert!(config.exceeds_recommended());
    assert!(!PlacementConfig::default().exceeds_recommended());
}

/// Anchor names parse regardless of case and surrounding spaces.
#[test]
fn anchors_parse_case_insensitively() {
    assert_eq!("Right".parse::<HorizontalAnchor>().unwrap(), HorizontalAnchor::Right);
    assert_eq!(" center ".parse::<HorizontalAnchor>().unwrap(), HorizontalAnchor::Center);
    assert_eq!("BOTTOM".parse::<VerticalAnchor>().unwrap(), VerticalAnchor::Bottom);

    let err = "diagonal".parse::<HorizontalAnchor>().unwrap_err();
    assert!(err.to_string().contains("left, center, right"));
    let err = "left".parse::<VerticalAnchor>().unwrap_err();
    assert!(err.to_string().contains("top, middle, bottom"));
}

/// A partial YAML file fills in the remaining defaults.
#[test]
fn loads_yaml_with_defaults_for_missing_fields() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("placement.yaml");
    std::fs::write(&path, "size_percent: 20\nhorizontal: right\n").unwrap();

    let config = PlacementConfig::from_path(&path).expect("load yaml");
    assert_eq!(config.size_percent, 20.0);
    assert_eq!(config.horizontal, HorizontalAnchor::Right);
    assert_eq!(config.vertical, VerticalAnchor::Top);
    assert_eq!(config.margin_percent, DEFAULT_MARGIN_PERCENT);
}

/// A `.json` path is parsed as JSON.
#[test]
fn loads_json_by_extension() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("placement.json");
    std::fs::write(
        &path,
        r#"{"size_percent":10,"horizontal":"center","vertical":"middle","margin_percent":0}"#,
    )
    .unwrap();

    let config = PlacementConfig::from_path(&path).expect("load json");
    assert_eq!(
        config,
        PlacementConfig::new(10.0, HorizontalAnchor::Center, VerticalAnchor::Middle, 0.0)
    );
}

/// Missing files and bad syntax map to distinct error variants.
#[test]
fn load_errors_are_typed() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("missing.yaml");
    assert!(matches!(PlacementConfig::from_path(&missing), Err(PlacementError::Read { .. })));

    let bad = dir.path().join("bad.json");
    std::fs::write(&bad, "{ not json").unwrap();
    assert!(matches!(PlacementConfig::from_path(&bad), Err(PlacementError::Json(_))));

    let bad_anchor = dir.path().join("anchor.yaml");
    std::fs::write(&bad_anchor, "vertical: sideways\n").unwrap();
    assert!(matches!(PlacementConfig::from_path(&bad_anchor), Err(PlacementError::Yaml(_))));
}
