use pretty_assertions::assert_eq;
use serde_json::json;
use std::io::Write;
use workforce_cli::{check_validation, write_descriptors, write_table, CliConfig};
use workforce_client::SourceDescriptor;
use workforce_report::{
    validate, Definition, Record, SourceTable, SourceTables, Table, ValidationReport,
};

#[test]
fn table_renders_as_csv() {
    let table = Table {
        headers: vec!["name".to_string(), "score".to_string()],
        rows: vec![
            vec![json!("Al"), json!(90)],
            vec![json!(""), json!(70)],
            vec![json!("Smith, J"), json!(null)],
        ],
    };

    let mut out = Vec::new();
    write_table(&mut out, &table).unwrap();

    assert_eq!(
        String::from_utf8(out).unwrap(),
        "name,score\nAl,90\n,70\n\"Smith, J\",\n"
    );
}

#[test]
fn descriptors_render_as_csv() {
    let descriptors = vec![SourceDescriptor {
        name: "Skills".to_string(),
        id: "102".to_string(),
    }];

    let mut out = Vec::new();
    write_descriptors(&mut out, &descriptors).unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), "name,id\nSkills,102\n");
}

#[test]
fn config_defaults_without_file() {
    let config = CliConfig::load_or_default(None).unwrap();
    assert_eq!(config.report.member_source_name, "基本情報");
    assert_eq!(config.client.token_header, "Kaonavi-Token");
}

#[test]
fn config_file_overrides_selected_keys() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{"client": {{"base_url": "http://localhost:9000"}}, "report": {{"member_source_name": "members"}}}}"#
    )
    .unwrap();

    let config = CliConfig::load(file.path()).unwrap();
    assert_eq!(config.client.base_url, "http://localhost:9000");
    assert_eq!(config.client.token_path, "/token");
    assert_eq!(config.report.member_source_name, "members");
}

#[test]
fn malformed_config_names_the_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "not json").unwrap();

    let err = CliConfig::load(file.path()).unwrap_err();
    assert!(err.to_string().contains("Failed to parse config file"));
}

// ── Validation strictness ───────────────────────────────────────

fn report_with_missing_source() -> ValidationReport {
    let mut record = Record::new();
    record.insert("name".to_string(), json!("Al"));
    let mut members = SourceTable::new();
    members.insert("E1".to_string(), record);
    let mut sources = SourceTables::new();
    sources.insert("members".to_string(), members);

    let definitions = vec![
        Definition::new("members", "name"),
        Definition::new("sheetZ", "score"),
    ];
    validate(&definitions, &sources)
}

#[test]
fn validation_is_advisory_by_default() {
    let validation = report_with_missing_source();
    assert!(!validation.is_valid());
    assert!(check_validation(&validation, false).is_ok());
}

#[test]
fn strict_validation_fails_on_mismatch() {
    let validation = report_with_missing_source();

    let err = check_validation(&validation, true).unwrap_err();
    let message = format!("{err:#}");
    assert!(message.contains("Definition table does not match the fetched data"));
    assert!(message.contains("sheetZ"));
}

#[test]
fn strict_validation_passes_clean_report() {
    assert!(check_validation(&ValidationReport::default(), true).is_ok());
}
