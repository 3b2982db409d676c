//! End-to-end runs over files on disk.

use std::fs::{self, File};
use std::path::Path;

use filtercsv::{Config, Dialect, FilterError, compile, parse_rules, process_csv};
use tempfile::tempdir;

const PEOPLE: &str = "id,name,score\n1,alice,10\n2,bob,20\n";

fn run_file(
    input: &Path,
    output: &Path,
    dialect: &Dialect,
    config: &mut Config,
) -> filtercsv::Result<()> {
    let rdr = File::open(input).unwrap();
    let wtr = File::create(output).unwrap();
    process_csv(rdr, wtr, dialect, config).map(|_| ())
}

#[test]
fn test_filter_file_to_file() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("people.csv");
    let output = dir.path().join("out.csv");
    fs::write(&input, PEOPLE).unwrap();

    let mut config = Config::new()
        .with_keep_column(|name| name != "score")
        .with_keep_row(|row| Ok(row.field("score")? < "15"))
        .with_modify_row(|row| {
            let name = row.field("name")?.to_uppercase();
            row.set_field("name", name)
        });
    run_file(&input, &output, &Dialect::default(), &mut config).unwrap();

    assert_eq!(fs::read_to_string(&output).unwrap(), "id,name\n1,ALICE\n");
}

#[test]
fn test_duplicate_header_writes_zero_bytes() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("dup.csv");
    let output = dir.path().join("out.csv");
    fs::write(&input, "a,b,a\n1,2,3\n").unwrap();

    let err = run_file(&input, &output, &Dialect::default(), &mut Config::default()).unwrap_err();
    assert!(matches!(err, FilterError::DuplicateColumn { .. }));
    assert_eq!(fs::metadata(&output).unwrap().len(), 0);
}

#[test]
fn test_header_only_file() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("empty.csv");
    let output = dir.path().join("out.csv");
    fs::write(&input, "a,b,c\n").unwrap();

    let rules = parse_rules("DROP b").unwrap();
    run_file(&input, &output, &Dialect::default(), &mut compile(&rules)).unwrap();
    assert_eq!(fs::read_to_string(&output).unwrap(), "a,c\n");
}

#[test]
fn test_runs_are_byte_identical() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("people.csv");
    let first = dir.path().join("first.csv");
    let second = dir.path().join("second.csv");
    fs::write(&input, PEOPLE).unwrap();

    let rules = parse_rules("WHERE score >= 15\nSET name = \"x, y\"").unwrap();
    let mut config = compile(&rules);
    run_file(&input, &first, &Dialect::default(), &mut config).unwrap();
    run_file(&input, &second, &Dialect::default(), &mut config).unwrap();

    let first = fs::read(&first).unwrap();
    assert_eq!(first, fs::read(&second).unwrap());
    assert_eq!(
        String::from_utf8(first).unwrap(),
        "id,name,score\n2,\"x, y\",20\n"
    );
}

#[test]
fn test_tab_delimited_with_ragged_row() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("data.tsv");
    let output = dir.path().join("out.tsv");
    fs::write(&input, "a\tb\n1\t2\n3\n").unwrap();

    let dialect = Dialect::default().with_delimiter(b'\t').with_flexible(true);
    let err = run_file(&input, &output, &dialect, &mut Config::default()).unwrap_err();
    match err {
        FilterError::RowWidth {
            line,
            expected,
            found,
        } => {
            assert_eq!((line, expected, found), (3, 2, 1));
        }
        other => panic!("Expected RowWidth, got {other:?}"),
    }
}
