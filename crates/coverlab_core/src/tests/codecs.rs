//! Tests for the tag and cell codecs

use proptest::prelude::*;

use crate::cell::{CellId, cell_index, decode_cell};
use crate::model::{ParamValue, RunConfig, SweepSchema};
use crate::tag::tag;

fn query_config(archive: ParamValue) -> RunConfig {
    RunConfig::new([
        ("delta", ParamValue::Float(0.05)),
        ("n_regions", ParamValue::Int(10)),
        ("region_size", ParamValue::Float(0.25)),
        ("archive_size", archive),
    ])
    .unwrap()
}

fn param_value() -> impl Strategy<Value = ParamValue> {
    prop_oneof![
        (-20i64..20).prop_map(ParamValue::Int),
        any::<i64>().prop_map(ParamValue::Int),
        (1u8..10, -12i32..24).prop_map(|(m, e)| ParamValue::Float(f64::from(m) * 10f64.powi(e))),
        prop::num::f64::NORMAL.prop_map(ParamValue::Float),
        "[a-z0-9%/\\\\-]{0,4}".prop_map(ParamValue::Text),
        prop_oneof![Just("inf"), Just("NaN"), Just("1e"), Just("2e")]
            .prop_map(ParamValue::from),
    ]
}

fn mixed_config(values: Vec<ParamValue>) -> RunConfig {
    let names = ["delta", "n_regions", "region_size", "archive_size"];
    RunConfig::new(names.into_iter().zip(values)).unwrap()
}

#[test]
fn test_exponent_floats_do_not_collide_with_text() {
    let a = mixed_config(vec![
        ParamValue::Float(1e-7),
        ParamValue::Int(5),
        ParamValue::from("2e"),
        ParamValue::Int(8),
    ]);
    let b = mixed_config(vec![
        ParamValue::from("1e"),
        ParamValue::Int(7),
        ParamValue::Int(5),
        ParamValue::Float(2e-8),
    ]);
    let ta = tag(&a, SweepSchema::Query).unwrap();
    let tb = tag(&b, SweepSchema::Query).unwrap();
    assert_ne!(ta, tb);
    assert_eq!(ta.as_str(), "1e%2D7-5-%32e-8");
    assert_eq!(tb.as_str(), "%31e-7-5-2e%2D8");
}

#[test]
fn test_tag_is_deterministic() {
    let config = query_config(ParamValue::Int(1000));
    let a = tag(&config, SweepSchema::Query).unwrap();
    let b = tag(&config.clone(), SweepSchema::Query).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.as_str(), "0.05-10-0.25-1000");
}

#[test]
fn test_coverage_tag_uses_ratio() {
    let config = RunConfig::new([
        ("archive_size", ParamValue::Int(500)),
        ("ratio", ParamValue::Float(0.01)),
        ("n_regions", ParamValue::Int(4)),
        ("delta", ParamValue::Float(0.1)),
    ])
    .unwrap();
    assert_eq!(
        tag(&config, SweepSchema::Coverage).unwrap().as_str(),
        "0.1-4-0.01-500"
    );
    assert!(tag(&config, SweepSchema::Query).is_err());
}

#[test]
fn test_decode_cell_example() {
    let id = (7u64 << 32) | 3;
    assert_eq!(
        decode_cell(id, 0.5),
        [[1.5, 3.5], [2.0, 3.5], [2.0, 4.0], [1.5, 4.0]]
    );
}

#[test]
fn test_cell_index_matches_decoded_square() {
    let delta = 0.02;
    let id = cell_index(126.131, 46.275, delta).unwrap();
    let [[x0, y0], _, [x1, y1], _] = id.polygon(delta);
    assert!(x0 <= 126.131 && 126.131 < x1);
    assert!(y0 <= 46.275 && 46.275 < y1);
}

proptest! {
    #[test]
    fn prop_cell_round_trip(xi in any::<u32>(), yi in any::<u32>()) {
        let id = CellId::encode(xi, yi);
        prop_assert_eq!(id.decode(), (xi, yi));
        prop_assert_eq!(id.0 & 0xFFFF_FFFF, u64::from(xi));
        prop_assert_eq!(id.0 >> 32, u64::from(yi));
    }

    #[test]
    fn prop_cell_square_has_side_delta(xi in 0u32..1_000_000, yi in 0u32..1_000_000) {
        let delta = 0.25;
        let [[x0, y0], [x1, _], [_, y2], _] = CellId::encode(xi, yi).polygon(delta);
        prop_assert!((x1 - x0 - delta).abs() < 1e-6);
        prop_assert!((y2 - y0 - delta).abs() < 1e-6);
    }

    #[test]
    fn prop_distinct_text_gives_distinct_tags(
        a in "[a-z0-9%/\\\\-]{0,6}",
        b in "[a-z0-9%/\\\\-]{0,6}",
    ) {
        prop_assume!(a != b);
        let ta = tag(&query_config(ParamValue::from(a.as_str())), SweepSchema::Query).unwrap();
        let tb = tag(&query_config(ParamValue::from(b.as_str())), SweepSchema::Query).unwrap();
        prop_assert_ne!(&ta, &tb);
        prop_assert!(!ta.as_str().contains('/'));
        prop_assert_eq!(ta.as_str().split('-').count(), 4);
    }

    #[test]
    fn prop_distinct_configs_give_distinct_tags(
        a in prop::collection::vec(param_value(), 4),
        b in prop::collection::vec(param_value(), 4),
    ) {
        let (ca, cb) = (mixed_config(a), mixed_config(b));
        prop_assume!(ca != cb);
        let ta = tag(&ca, SweepSchema::Query).unwrap();
        let tb = tag(&cb, SweepSchema::Query).unwrap();
        prop_assert_ne!(&ta, &tb);
        prop_assert!(!ta.as_str().contains('/'));
    }
}
