use async_trait::async_trait;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use workforce_client::{ClientError, ClientResult, WorkforceApi};
use workforce_report::{Definition, ReportBuilder, ReportConfig, ReportError};

/// In-memory API that records which resources were requested.
struct FakeApi {
    catalog: Value,
    members: Value,
    sheets: Vec<(&'static str, Value)>,
    failing_sheet: Option<&'static str>,
    layout_calls: AtomicU32,
    requested: Mutex<Vec<String>>,
}

impl FakeApi {
    fn new() -> Self {
        Self {
            catalog: json!({
                "sheet_layouts": [
                    {"id": 101, "name": "sheetA"},
                    {"id": 102, "name": "Skills"}
                ]
            }),
            members: json!({
                "member_data": [
                    {"code": "E1", "name": "Al", "email": "al@example.com"}
                ]
            }),
            sheets: vec![
                (
                    "101",
                    json!({"sheet_data": [
                        {"member_code": "E1", "score": 90},
                        {"member_code": "E2", "score": 70}
                    ]}),
                ),
                (
                    "102",
                    json!({"sheet_data": [
                        {"member_code": "E3", "level": "senior"}
                    ]}),
                ),
            ],
            failing_sheet: None,
            layout_calls: AtomicU32::new(0),
            requested: Mutex::new(Vec::new()),
        }
    }

    fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }

    fn log(&self, what: impl Into<String>) {
        self.requested.lock().unwrap().push(what.into());
    }
}

#[async_trait]
impl WorkforceApi for FakeApi {
    async fn member_layouts(&self) -> ClientResult<Value> {
        self.log("member_layouts");
        Ok(json!({}))
    }

    async fn members(&self) -> ClientResult<Value> {
        self.log("members");
        Ok(self.members.clone())
    }

    async fn sheet_layouts(&self) -> ClientResult<Value> {
        self.layout_calls.fetch_add(1, Ordering::SeqCst);
        self.log("sheet_layouts");
        Ok(self.catalog.clone())
    }

    async fn sheet(&self, sheet_id: &str) -> ClientResult<Value> {
        self.log(format!("sheet:{sheet_id}"));
        if self.failing_sheet == Some(sheet_id) {
            return Err(ClientError::RemoteRequest {
                path: format!("/sheets/{sheet_id}"),
                status: 403,
                body: "forbidden".to_string(),
            });
        }
        self.sheets
            .iter()
            .find(|(id, _)| *id == sheet_id)
            .map(|(_, data)| data.clone())
            .ok_or_else(|| ClientError::RemoteRequest {
                path: format!("/sheets/{sheet_id}"),
                status: 404,
                body: String::new(),
            })
    }
}

fn config() -> ReportConfig {
    ReportConfig {
        member_source_name: "members".to_string(),
    }
}

fn builder(api: Arc<FakeApi>) -> ReportBuilder {
    ReportBuilder::new(api, config())
}

#[tokio::test]
async fn builds_outer_joined_report() {
    let api = Arc::new(FakeApi::new());
    let report = builder(api.clone())
        .build(vec![
            Definition::new("members", "name"),
            Definition::new("sheetA", "score"),
        ])
        .await
        .unwrap();

    assert_eq!(report.headers, vec!["name", "score"]);
    assert_eq!(report.joined.keys().collect::<Vec<_>>(), vec!["E1", "E2"]);
    assert_eq!(
        report.rows,
        vec![vec![json!("Al"), json!(90)], vec![json!(""), json!(70)]]
    );
    assert!(report.validation.is_valid());
}

#[tokio::test]
async fn sources_are_fetched_in_reference_order() {
    let api = Arc::new(FakeApi::new());
    let report = builder(api.clone())
        .build(vec![
            Definition::new("Skills", "level"),
            Definition::new("members", "name"),
            Definition::new("sheetA", "score"),
        ])
        .await
        .unwrap();

    assert_eq!(
        report.collected.keys().collect::<Vec<_>>(),
        vec!["Skills", "members", "sheetA"]
    );
    assert_eq!(
        api.requested(),
        vec!["sheet_layouts", "sheet:102", "member_layouts", "members", "sheet:101"]
    );
    assert_eq!(api.layout_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn member_only_report_skips_sheet_catalog() {
    let api = Arc::new(FakeApi::new());
    builder(api.clone())
        .build(vec![Definition::new("members", "email")])
        .await
        .unwrap();

    assert_eq!(api.layout_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn unknown_sheet_name_fails_whole_build() {
    let api = Arc::new(FakeApi::new());
    let err = builder(api.clone())
        .build(vec![
            Definition::new("members", "name"),
            Definition::new("sheetZ", "score"),
        ])
        .await
        .unwrap_err();

    match err {
        ReportError::SourceNotFound { name } => assert_eq!(name, "sheetZ"),
        other => panic!("expected SourceNotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn sheet_names_match_exactly() {
    let api = Arc::new(FakeApi::new());
    let result = builder(api)
        .build(vec![Definition::new("sheeta", "score")])
        .await;
    assert!(matches!(result, Err(ReportError::SourceNotFound { .. })));
}

#[tokio::test]
async fn catalog_without_layouts_is_rejected() {
    let mut fake = FakeApi::new();
    fake.catalog = json!({"error": "unexpected"});

    let result = builder(Arc::new(fake))
        .build(vec![Definition::new("sheetA", "score")])
        .await;
    assert!(matches!(result, Err(ReportError::InvalidCatalog(_))));
}

#[tokio::test]
async fn sheet_fetch_failure_names_the_sheet() {
    let mut fake = FakeApi::new();
    fake.failing_sheet = Some("101");

    let err = builder(Arc::new(fake))
        .build(vec![Definition::new("sheetA", "score")])
        .await
        .unwrap_err();

    assert!(matches!(err, ReportError::Fetch { ref stage, .. } if stage == "sheet \"sheetA\""));
    assert!(err.to_string().contains("sheetA"));
    assert!(err.to_string().contains("403"));
}

#[tokio::test]
async fn unknown_field_is_advisory() {
    let api = Arc::new(FakeApi::new());
    let report = builder(api)
        .build(vec![
            Definition::new("members", "name"),
            Definition::new("sheetA", "grade"),
        ])
        .await
        .unwrap();

    assert_eq!(report.validation.issues.len(), 1);
    assert_eq!(report.rows.len(), 2);
    assert!(report.rows.iter().all(|row| row[1] == json!("")));
    assert!(matches!(
        report.validation.clone().into_result(),
        Err(ReportError::Validation(_))
    ));
}

#[tokio::test]
async fn default_member_source_name() {
    let api = Arc::new(FakeApi::new());
    let report = ReportBuilder::new(api.clone(), ReportConfig::default())
        .build(vec![Definition::new("基本情報", "name")])
        .await
        .unwrap();

    assert_eq!(report.rows, vec![vec![json!("Al")]]);
    assert!(api.requested().contains(&"members".to_string()));
}
