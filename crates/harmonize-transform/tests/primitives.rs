//! Tests for the harmonization primitives.

use harmonize_model::{
    Bounds, ClipSpec, CollapseMode, ComparisonOp, Condition, ConditionalRule, Crosswalk,
    FamilyGroup, LookupJoin, OverrideRule, RecodeMap, RecodeSpec, Value,
};
use harmonize_transform::cells::cell_at;
use harmonize_transform::{
    apply_overrides, apply_recode, cast_numeric, clip_columns, collapse_family, conditional_set,
    filter_rows, join_lookup, rename_columns, validate_required,
};
use polars::prelude::*;
use proptest::prelude::*;

fn names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect()
}

fn cells(df: &DataFrame, column: &str) -> Vec<Value> {
    let column = df.column(column).unwrap();
    (0..column.len()).map(|idx| cell_at(column, idx)).collect()
}

#[test]
fn rename_ignores_absent_sources() {
    let mut df = DataFrame::new(vec![
        Series::new("CH04".into(), vec![1i64, 2]).into(),
        Series::new("CODUSU".into(), vec!["a", "b"]).into(),
    ])
    .unwrap();
    let crosswalk = Crosswalk::from_pairs([("CH04", "P02"), ("IV1", "V01")]);

    let renamed = rename_columns(&mut df, &crosswalk).unwrap();

    assert_eq!(renamed, 1);
    assert_eq!(names(&df), vec!["P02", "CODUSU"]);
    assert_eq!(cells(&df, "P02"), vec![Value::Int(1), Value::Int(2)]);
}

#[test]
fn rename_skips_collisions() {
    let mut df = DataFrame::new(vec![
        Series::new("ESTADO".into(), vec![1i64]).into(),
        Series::new("CONDACT".into(), vec![3i64]).into(),
    ])
    .unwrap();
    let crosswalk = Crosswalk::from_pairs([("ESTADO", "CONDACT")]);

    let renamed = rename_columns(&mut df, &crosswalk).unwrap();

    assert_eq!(renamed, 0);
    assert_eq!(names(&df), vec!["ESTADO", "CONDACT"]);
}

#[test]
fn one_of_picks_the_strongest_member() {
    let mut df = DataFrame::new(vec![
        Series::new("V21_01".into(), vec![0i64, 0, 4]).into(),
        Series::new("V21_02".into(), vec![5i64, 0, 4]).into(),
        Series::new("V21_03".into(), vec![3i64, 0, 1]).into(),
    ])
    .unwrap();
    let family = FamilyGroup::new("V21", "V21", CollapseMode::OneOf).unwrap();

    let active = collapse_family(&mut df, &family).unwrap();

    assert_eq!(active, 2);
    assert_eq!(
        cells(&df, "V21"),
        vec![Value::from("02"), Value::Null, Value::from("01")]
    );
    assert_eq!(df.width(), 4, "members are kept");
}

#[test]
fn one_of_prefer_first_ignores_magnitude() {
    let mut df = DataFrame::new(vec![
        Series::new("V5_01".into(), vec![1i64]).into(),
        Series::new("V5_02".into(), vec![7i64]).into(),
    ])
    .unwrap();
    let family = FamilyGroup::new("V5", "V5", CollapseMode::OneOfPreferFirst).unwrap();

    collapse_family(&mut df, &family).unwrap();

    assert_eq!(cells(&df, "V5"), vec![Value::from("01")]);
}

#[test]
fn multi_any_lists_active_suffixes() {
    let mut df = DataFrame::new(vec![
        Series::new("V2_01".into(), vec![Some(1i64), Some(0)]).into(),
        Series::new("V2_02".into(), vec![Some(0i64), None]).into(),
        Series::new("V2_03".into(), vec![Some(2i64), Some(0)]).into(),
    ])
    .unwrap();
    let family = FamilyGroup::new("V2", "V2", CollapseMode::MultiAny).unwrap();

    let active = collapse_family(&mut df, &family).unwrap();

    assert_eq!(active, 1);
    assert_eq!(
        cells(&df, "V2"),
        vec![
            Value::from(vec!["01", "03"]),
            Value::List(Vec::new()),
        ]
    );
}

#[test]
fn collapse_without_members_is_a_no_op() {
    let mut df = DataFrame::new(vec![Series::new("IX_TOT".into(), vec![3i64]).into()]).unwrap();
    let family = FamilyGroup::new("V22", "V22", CollapseMode::OneOf).unwrap();

    assert_eq!(collapse_family(&mut df, &family).unwrap(), 0);
    assert_eq!(names(&df), vec!["IX_TOT"]);
}

#[test]
fn clip_saturates_and_nulls_garbage() {
    let mut df = DataFrame::new(vec![
        Series::new("H16".into(), vec!["15", "abc", "4"]).into(),
        Series::new("CH06".into(), vec![-3i64, 40, 7]).into(),
    ])
    .unwrap();
    let spec = ClipSpec::new()
        .with("H16", Bounds::between(0.0, 9.0))
        .with("CH06", Bounds::at_least(0.0))
        .with("ABSENT", Bounds::at_most(1.0));

    let clipped = clip_columns(&mut df, &spec).unwrap();

    assert_eq!(clipped, 2);
    assert_eq!(
        cells(&df, "H16"),
        vec![Value::Float(9.0), Value::Null, Value::Float(4.0)]
    );
    assert_eq!(
        cells(&df, "CH06"),
        vec![Value::Float(0.0), Value::Float(40.0), Value::Float(7.0)]
    );
}

#[test]
fn recode_leaves_unmapped_values_and_nulls() {
    let mut df = DataFrame::new(vec![
        Series::new("V01".into(), vec![Some(1i64), Some(2), Some(7), None]).into(),
    ])
    .unwrap();
    let spec = RecodeSpec::new().with("V01", RecodeMap::from_pairs([(1, 1), (2, 6)]));

    let changed = apply_recode(&mut df, &spec).unwrap();

    assert_eq!(changed, 1);
    assert_eq!(
        cells(&df, "V01"),
        vec![Value::Int(1), Value::Int(6), Value::Int(7), Value::Null]
    );
}

#[test]
fn filter_drops_matching_rows_in_order() {
    let mut df = DataFrame::new(vec![
        Series::new("IV1".into(), vec![1i64, 9, 2]).into(),
        Series::new("ROW".into(), vec!["a", "b", "c"]).into(),
    ])
    .unwrap();
    let rules = [
        Condition::new("IV1", ComparisonOp::Ne, 9),
        Condition::new("MISSING", ComparisonOp::Eq, 1),
    ];

    let removed = filter_rows(&mut df, &rules).unwrap();

    assert_eq!(removed, 1);
    assert_eq!(cells(&df, "ROW"), vec![Value::from("a"), Value::from("c")]);
}

#[test]
fn conditional_set_respects_requirements() {
    let mut df = DataFrame::new(vec![
        Series::new("CH06".into(), vec![10i64, 30]).into(),
        Series::new("CONDACT".into(), vec![1i64, 1]).into(),
        Series::new("CH12".into(), vec![9i64, 4]).into(),
    ])
    .unwrap();
    let minors = ConditionalRule::new(Condition::new("CH06", ComparisonOp::Lt, 14)).set("CONDACT", 0);
    let no_school = ConditionalRule::new(Condition::new("CH12", ComparisonOp::In, vec![0, 1, 9]))
        .set("CH13", 0)
        .requires("CH13");

    assert_eq!(conditional_set(&mut df, &minors).unwrap(), 1);
    assert_eq!(conditional_set(&mut df, &no_school).unwrap(), 0);

    assert_eq!(cells(&df, "CONDACT"), vec![Value::Int(0), Value::Int(1)]);
    assert!(df.column("CH13").is_err());
}

#[test]
fn conditional_set_creates_target_columns() {
    let mut df = DataFrame::new(vec![Series::new("CH06".into(), vec![10i64, 30]).into()]).unwrap();
    let rule = ConditionalRule::new(Condition::new("CH06", ComparisonOp::Lt, 14)).set("CONDACT", 0);

    conditional_set(&mut df, &rule).unwrap();

    assert_eq!(cells(&df, "CONDACT"), vec![Value::Int(0), Value::Null]);
}

#[test]
fn enrichment_then_override() {
    let mut df = DataFrame::new(vec![
        Series::new("DPTO".into(), vec![1i64, 2, 3]).into(),
        Series::new("AGLOMERADO".into(), vec![33i64, 13, 33]).into(),
    ])
    .unwrap();
    let lookup = DataFrame::new(vec![
        Series::new("DPTO".into(), vec![1i64, 2, 2]).into(),
        Series::new("Region".into(), vec!["Pampeana", "Pampeana", "Noreste"]).into(),
    ])
    .unwrap();
    let join = LookupJoin::new("DPTO", "Region");
    let rules = [OverrideRule::new()
        .matching("AGLOMERADO", 33)
        .matching("Region", "Pampeana")
        .set("Region", "Gran Buenos Aires")];

    assert_eq!(join_lookup(&mut df, &lookup, &join).unwrap(), 2);
    assert_eq!(df.height(), 3);
    assert_eq!(apply_overrides(&mut df, &rules).unwrap(), 1);

    assert_eq!(
        cells(&df, "Region"),
        vec![
            Value::from("Gran Buenos Aires"),
            Value::from("Pampeana"),
            Value::Null,
        ]
    );
}

#[test]
fn join_keys_match_across_types() {
    let mut df = DataFrame::new(vec![Series::new("DPTO".into(), vec!["7", "8"]).into()]).unwrap();
    let lookup = DataFrame::new(vec![
        Series::new("DPTO".into(), vec![7.0f64]).into(),
        Series::new("Region".into(), vec!["NOA"]).into(),
    ])
    .unwrap();

    join_lookup(&mut df, &lookup, &LookupJoin::new("DPTO", "Region")).unwrap();

    assert_eq!(cells(&df, "Region"), vec![Value::from("NOA"), Value::Null]);
}

#[test]
fn join_coalesces_into_existing_column() {
    let mut df = DataFrame::new(vec![
        Series::new("DPTO".into(), vec![1i64, 2]).into(),
        Series::new("Region".into(), vec!["Cuyo", "Cuyo"]).into(),
    ])
    .unwrap();
    let lookup = DataFrame::new(vec![
        Series::new("DPTO".into(), vec![1i64]).into(),
        Series::new("Region".into(), vec!["NEA"]).into(),
    ])
    .unwrap();

    join_lookup(&mut df, &lookup, &LookupJoin::new("DPTO", "Region")).unwrap();

    assert_eq!(cells(&df, "Region"), vec![Value::from("NEA"), Value::from("Cuyo")]);
}

#[test]
fn overrides_apply_in_order() {
    let mut df = DataFrame::new(vec![Series::new("Region".into(), vec!["A", "B"]).into()]).unwrap();
    let rules = [
        OverrideRule::new().matching("Region", "A").set("Region", "B"),
        OverrideRule::new().matching("Region", "B").set("Region", "C"),
    ];

    assert_eq!(apply_overrides(&mut df, &rules).unwrap(), 3);
    assert_eq!(cells(&df, "Region"), vec![Value::from("C"), Value::from("C")]);
}

#[test]
fn override_on_absent_match_column_matches_nothing() {
    let mut df = DataFrame::new(vec![Series::new("Region".into(), vec!["Pampeana", "Cuyo"]).into()])
        .unwrap();
    let rules = [OverrideRule::new()
        .matching("AGLOMERADO", 33)
        .matching("Region", "Pampeana")
        .set("Region", "Gran Buenos Aires")];

    assert_eq!(apply_overrides(&mut df, &rules).unwrap(), 0);
    assert_eq!(names(&df), vec!["Region"]);
    assert_eq!(cells(&df, "Region"), vec![Value::from("Pampeana"), Value::from("Cuyo")]);
}

#[test]
fn join_without_key_or_value_columns_is_a_no_op() {
    let table = || {
        DataFrame::new(vec![
            Series::new("DPTO".into(), vec![1i64, 2]).into(),
            Series::new("Region".into(), vec!["Cuyo", "NEA"]).into(),
        ])
        .unwrap()
    };
    let lookup = DataFrame::new(vec![
        Series::new("DPTO".into(), vec![1i64, 2]).into(),
        Series::new("Region".into(), vec!["Pampeana", "Pampeana"]).into(),
    ])
    .unwrap();
    let cases = [
        (LookupJoin::new("PROV", "Region"), lookup.clone()),
        (LookupJoin::new("DPTO", "Region"), lookup.drop("DPTO").unwrap()),
        (LookupJoin::new("DPTO", "Zona"), lookup.clone()),
    ];

    for (join, lookup) in cases {
        let mut df = table();
        assert_eq!(join_lookup(&mut df, &lookup, &join).unwrap(), 0, "{join:?}");
        assert_eq!(names(&df), vec!["DPTO", "Region"]);
        assert_eq!(cells(&df, "Region"), vec![Value::from("Cuyo"), Value::from("NEA")]);
    }
}

#[test]
fn conditional_on_absent_column_is_skipped() {
    let mut df = DataFrame::new(vec![Series::new("CONDACT".into(), vec![1i64, 2]).into()]).unwrap();
    let rule = ConditionalRule::new(Condition::new("CH06", ComparisonOp::Lt, 14)).set("CONDACT", 0);

    assert_eq!(conditional_set(&mut df, &rule).unwrap(), 0);
    assert_eq!(cells(&df, "CONDACT"), vec![Value::Int(1), Value::Int(2)]);
}

#[test]
fn recode_on_absent_column_is_skipped() {
    let mut df = DataFrame::new(vec![Series::new("H06".into(), vec![8i64]).into()]).unwrap();
    let spec = RecodeSpec::new().with("V01", RecodeMap::from_pairs([(8, 6)]));

    assert_eq!(apply_recode(&mut df, &spec).unwrap(), 0);
    assert_eq!(names(&df), vec!["H06"]);
    assert_eq!(cells(&df, "H06"), vec![Value::Int(8)]);
}

#[test]
fn recode_keeps_narrow_integer_columns() {
    let mut df = DataFrame::new(vec![Series::new("H13".into(), vec![1i32, 4]).into()]).unwrap();
    let spec = RecodeSpec::new().with("H13", RecodeMap::from_pairs([(4, 0)]));

    assert_eq!(apply_recode(&mut df, &spec).unwrap(), 1);
    assert_eq!(df.column("H13").unwrap().dtype(), &DataType::Int32);
    assert_eq!(cells(&df, "H13"), vec![Value::Int(1), Value::Int(0)]);
}

#[test]
fn filter_combines_conditions_with_and() {
    let mut df = DataFrame::new(vec![
        Series::new("IV1".into(), vec![1i64, 9, 2, 2]).into(),
        Series::new("CH06".into(), vec![30i64, 40, 10, 50]).into(),
        Series::new("ROW".into(), vec!["a", "b", "c", "d"]).into(),
    ])
    .unwrap();
    let rules = [
        Condition::new("IV1", ComparisonOp::Ne, 9),
        Condition::new("CH06", ComparisonOp::Ge, 14),
    ];

    assert_eq!(filter_rows(&mut df, &rules).unwrap(), 2);
    assert_eq!(cells(&df, "ROW"), vec![Value::from("a"), Value::from("d")]);
}

#[test]
fn cast_numeric_nulls_unparseable() {
    let mut df = DataFrame::new(vec![Series::new("P21".into(), vec!["1500", "n/a", " 2.5 "]).into()])
        .unwrap();

    assert_eq!(cast_numeric(&mut df, &["P21", "ABSENT"]).unwrap(), 1);
    assert_eq!(df.column("P21").unwrap().dtype(), &DataType::Float64);
    assert_eq!(
        cells(&df, "P21"),
        vec![Value::Float(1500.0), Value::Null, Value::Float(2.5)]
    );
}

#[test]
fn validation_names_every_missing_column() {
    let df = DataFrame::new(vec![Series::new("IX_TOT".into(), vec![1i64]).into()]).unwrap();

    let err = validate_required(&df, &["IX_TOT", "CONDACT", "P02"], "eph_to_censo_household")
        .unwrap_err();

    assert_eq!(err.missing, vec!["CONDACT", "P02"]);
    insta::assert_snapshot!(err.to_string(), @"missing required columns at eph_to_censo_household: CONDACT, P02");
}

#[test]
fn validation_passes_complete_tables() {
    let df = DataFrame::new(vec![Series::new("CONDACT".into(), vec![1i64]).into()]).unwrap();
    assert!(validate_required(&df, &["CONDACT"], "stage").is_ok());
}

proptest! {
    #[test]
    fn rename_is_stable(
        present in prop::collection::btree_set(0u8..10, 1..6),
        mapped in prop::collection::btree_set(0u8..10, 0..10),
    ) {
        let columns: Vec<Column> = present
            .iter()
            .map(|i| Series::new(format!("A{i}").into(), vec![1i64]).into())
            .collect();
        let mut df = DataFrame::new(columns).unwrap();
        let crosswalk =
            Crosswalk::from_pairs(mapped.iter().map(|i| (format!("A{i}"), format!("B{i}"))));

        rename_columns(&mut df, &crosswalk).unwrap();
        let once = names(&df);
        rename_columns(&mut df, &crosswalk).unwrap();

        prop_assert_eq!(names(&df), once.clone());
        for i in &present {
            let expected = if mapped.contains(i) { format!("B{i}") } else { format!("A{i}") };
            prop_assert!(once.contains(&expected));
        }
    }

    #[test]
    fn recode_only_touches_mapped_codes(codes in prop::collection::vec(-3i64..6, 0..20)) {
        let mut df = DataFrame::new(vec![Series::new("H13".into(), codes.clone()).into()]).unwrap();
        let spec = RecodeSpec::new().with("H13", RecodeMap::from_pairs([(1, 10), (2, 20)]));

        let changed = apply_recode(&mut df, &spec).unwrap();

        let expected: Vec<Value> = codes
            .iter()
            .map(|code| match code {
                1 => Value::Int(10),
                2 => Value::Int(20),
                other => Value::Int(*other),
            })
            .collect();
        prop_assert_eq!(cells(&df, "H13"), expected);
        prop_assert_eq!(changed, codes.iter().filter(|code| matches!(code, 1 | 2)).count());
    }
}
