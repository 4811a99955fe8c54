//! CSV round trips through the harmonizer.

use harmonize_cli::io::{read_table, with_row_index, write_table};
use harmonize_core::{Harmonizer, PipelineKind};
use harmonize_model::Value;
use polars::prelude::*;

#[test]
fn csv_types_are_inferred() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hogares.csv");
    std::fs::write(&path, "IX_TOT,CODUSU,P21\n3,A1,1500.5\n4,B2,\n").unwrap();

    let df = read_table(&path).unwrap();

    assert_eq!(df.height(), 2);
    assert_eq!(df.column("IX_TOT").unwrap().dtype(), &DataType::Int64);
    assert_eq!(df.column("CODUSU").unwrap().dtype(), &DataType::String);
    assert_eq!(df.column("P21").unwrap().null_count(), 1);
}

#[test]
fn missing_input_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let err = read_table(&dir.path().join("absent.csv")).unwrap_err();
    assert!(format!("{err:#}").contains("absent.csv"));
}

#[test]
fn list_cells_are_joined() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.csv");
    let df = DataFrame::new(vec![
        Series::new("ID".into(), vec![1i64, 2]).into(),
        Series::new(
            "V2".into(),
            vec![
                Series::new("".into(), vec!["01", "03"]),
                Series::new_empty("".into(), &DataType::String),
            ],
        )
        .into(),
        Series::new("NOTE".into(), vec![Some("x"), None]).into(),
    ])
    .unwrap();

    write_table(&df, &path, "|").unwrap();

    let written = std::fs::read_to_string(&path).unwrap();
    insta::assert_snapshot!(written, @r"
    ID,V2,NOTE
    1,01|03,x
    2,,
    ");
}

#[test]
fn row_index_tracks_filtered_rows() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("hogares.csv");
    let output = dir.path().join("censo.csv");
    std::fs::write(
        &input,
        "IX_TOT,CH04,CH06,CONDACT,AGLOMERADO,IV1,V2_01,V2_02\n\
         3,1,40,1,33,1,1,1\n\
         5,2,35,1,13,9,0,0\n\
         12,1,51,2,93,2,0,1\n",
    )
    .unwrap();

    let df = with_row_index(&read_table(&input).unwrap(), "row_id").unwrap();
    let out = Harmonizer::new(PipelineKind::EphToCensoHousehold)
        .unwrap()
        .run(&df, None)
        .unwrap();
    write_table(&out, &output, ";").unwrap();

    let reread = read_table(&output).unwrap();
    let ids = reread.column("row_id").unwrap();
    assert_eq!(ids.len(), 2);
    assert_eq!(ids.get(0).unwrap().try_extract::<i64>().unwrap(), 0);
    assert_eq!(ids.get(1).unwrap().try_extract::<i64>().unwrap(), 2);

    let text = std::fs::read_to_string(&output).unwrap();
    assert!(text.lines().next().unwrap().contains("V01"));
    assert!(text.contains("01;02"));
    let clipped = reread.column("IX_TOT").unwrap().get(1).unwrap();
    assert!(Value::Int(8).loose_eq(&number(clipped)), "IX_TOT is clipped to 8");
}

fn number(value: AnyValue<'_>) -> Value {
    match value {
        AnyValue::Int64(value) => Value::Int(value),
        AnyValue::Float64(value) => Value::Float(value),
        other => Value::from(other.to_string().as_str()),
    }
}
