//! Tests for parameter space expansion
//!
//! These tests verify:
//! - Factorial order (last declared parameter fastest)
//! - Single-variable sorting and the ambiguous-variation policy
//! - One-at-a-time designs around shared defaults
//! - Legacy parameter names and declaration order from YAML-like input

use crate::error::ConfigError;
use crate::model::{ParamValue, ParameterSpace, RunConfig, SweepSchema};
use crate::sweep::{SweepDesign, SweepMode, expand};

fn ints(values: &[i64]) -> Vec<ParamValue> {
    values.iter().copied().map(ParamValue::Int).collect()
}

fn column(configs: &[RunConfig], name: &str) -> Vec<ParamValue> {
    configs.iter().map(|c| c.get(name).unwrap().clone()).collect()
}

#[test]
fn test_factorial_two_by_one() {
    let space = ParameterSpace::new([("a", ints(&[1, 2])), ("b", ints(&[3]))]).unwrap();
    let expansion = expand(&space, SweepMode::Factorial).unwrap();
    assert_eq!(expansion.len(), 2);
    assert_eq!(
        expansion.configs[0],
        RunConfig::new([("a", ParamValue::Int(1)), ("b", ParamValue::Int(3))]).unwrap()
    );
    assert_eq!(
        expansion.configs[1],
        RunConfig::new([("a", ParamValue::Int(2)), ("b", ParamValue::Int(3))]).unwrap()
    );
    assert_eq!(expansion.varying.as_deref(), Some("a"));
}

#[test]
fn test_factorial_last_axis_fastest() {
    let space = ParameterSpace::new([
        ("a", ints(&[1, 2])),
        ("b", ints(&[10, 20, 30])),
        ("c", ints(&[0])),
    ])
    .unwrap();
    let expansion = expand(&space, SweepMode::Factorial).unwrap();
    assert_eq!(expansion.len(), space.total_points());
    assert_eq!(column(&expansion.configs, "a"), ints(&[1, 1, 1, 2, 2, 2]));
    assert_eq!(
        column(&expansion.configs, "b"),
        ints(&[10, 20, 30, 10, 20, 30])
    );
    assert_eq!(expansion.shape, vec![2, 3, 1]);
    assert_eq!(expansion.varying, None);
}

#[test]
fn test_single_variable_sorted_by_value() {
    let space = ParameterSpace::new([("a", ints(&[1])), ("b", ints(&[5, 3, 4]))]).unwrap();
    let expansion = expand(&space, SweepMode::SingleVariable).unwrap();
    assert_eq!(expansion.varying.as_deref(), Some("b"));
    assert_eq!(column(&expansion.configs, "b"), ints(&[3, 4, 5]));
    assert_eq!(column(&expansion.configs, "a"), ints(&[1, 1, 1]));
}

#[test]
fn test_single_variable_mixed_numbers_sort_numerically() {
    let space = ParameterSpace::new([(
        "delta",
        vec![
            ParamValue::Float(0.05),
            ParamValue::Int(1),
            ParamValue::Float(0.0125),
        ],
    )])
    .unwrap();
    let expansion = expand(&space, SweepMode::SingleVariable).unwrap();
    assert_eq!(
        column(&expansion.configs, "delta"),
        vec![
            ParamValue::Float(0.0125),
            ParamValue::Float(0.05),
            ParamValue::Int(1)
        ]
    );
}

#[test]
fn test_single_variable_rejects_two_varying_axes() {
    let space = ParameterSpace::new([("a", ints(&[1, 2])), ("b", ints(&[3, 4]))]).unwrap();
    assert_eq!(
        expand(&space, SweepMode::SingleVariable),
        Err(ConfigError::AmbiguousVariation(vec![
            "a".to_string(),
            "b".to_string()
        ]))
    );
}

#[test]
fn test_single_variable_without_variation_yields_one_run() {
    let space = ParameterSpace::new([("a", ints(&[1])), ("b", ints(&[2]))]).unwrap();
    let expansion = expand(&space, SweepMode::SingleVariable).unwrap();
    assert_eq!(expansion.len(), 1);
    assert_eq!(expansion.varying, None);
}

#[test]
fn test_space_invariants() {
    assert_eq!(
        ParameterSpace::new([("a", ints(&[]))]),
        Err(ConfigError::EmptyCandidates("a".into()))
    );
    assert_eq!(
        ParameterSpace::new([("a", ints(&[1])), ("a", ints(&[2]))]),
        Err(ConfigError::DuplicateParameter("a".into()))
    );
}

#[test]
fn test_legacy_names_are_canonicalized() {
    let space = ParameterSpace::new([
        ("delta", vec![ParamValue::Float(0.1)]),
        ("n_aois", ints(&[10])),
        ("aoi_size", vec![ParamValue::Float(0.25)]),
        ("archive", ints(&[1000])),
    ])
    .unwrap();
    let canonical = space.canonicalize(SweepSchema::Query).unwrap();
    assert_eq!(
        canonical.names(),
        vec!["delta", "n_regions", "region_size", "archive_size"]
    );
    canonical.require_complete(SweepSchema::Query).unwrap();

    let unknown = ParameterSpace::new([("colour", ints(&[1]))]).unwrap();
    assert!(matches!(
        unknown.canonicalize(SweepSchema::Query),
        Err(ConfigError::UnknownParameter { .. })
    ));
}

#[test]
fn test_space_deserializes_in_declared_order() {
    let space: ParameterSpace =
        serde_json::from_str(r#"{"z": [1, 2], "a": [0.5], "m": ["x"]}"#).unwrap();
    assert_eq!(space.names(), vec!["z", "a", "m"]);
    assert_eq!(space.axis("a").unwrap().values, vec![ParamValue::Float(0.5)]);
    assert_eq!(space.axis("m").unwrap().values, vec![ParamValue::from("x")]);
}

#[test]
fn test_one_at_a_time_holds_defaults() {
    let defaults = RunConfig::new([
        ("delta", ParamValue::Float(0.05)),
        ("n_regions", ParamValue::Int(10)),
        ("region_size", ParamValue::Float(0.25)),
        ("archive_size", ParamValue::Int(1000)),
    ])
    .unwrap();
    let design = SweepDesign::OneAtATime {
        defaults,
        vary: vec![
            ParameterSpace::new([("delta", vec![ParamValue::Float(0.1), ParamValue::Float(0.025)])])
                .unwrap(),
            ParameterSpace::new([("n_aois", ints(&[20, 40]))]).unwrap(),
        ],
    };

    let sweeps = design
        .canonicalize(SweepSchema::Query)
        .unwrap()
        .expand()
        .unwrap();
    assert_eq!(sweeps.len(), 2);

    assert_eq!(sweeps[0].varying.as_deref(), Some("delta"));
    assert_eq!(
        column(&sweeps[0].configs, "delta"),
        vec![ParamValue::Float(0.025), ParamValue::Float(0.1)]
    );
    assert_eq!(column(&sweeps[0].configs, "n_regions"), ints(&[10, 10]));

    assert_eq!(sweeps[1].varying.as_deref(), Some("n_regions"));
    assert_eq!(column(&sweeps[1].configs, "n_regions"), ints(&[20, 40]));
    assert_eq!(
        column(&sweeps[1].configs, "delta"),
        vec![ParamValue::Float(0.05), ParamValue::Float(0.05)]
    );
}

#[test]
fn test_one_at_a_time_requires_defaults_for_every_field() {
    let design = SweepDesign::OneAtATime {
        defaults: RunConfig::new([("delta", ParamValue::Float(0.05))]).unwrap(),
        vary: vec![],
    };
    assert!(matches!(
        design.canonicalize(SweepSchema::Query),
        Err(ConfigError::MissingParameter { .. })
    ));
}
