use position_groups::adapters::csv_source::parse_records;
use position_groups::web::{router, AppState, ErrorResponse, HealthResponse};
use position_groups::{ForestLoader, PredictionEngine, RaceReport};
use std::path::PathBuf;
use tokio::net::TcpListener;

fn demo(file: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("demos").join(file)
}

/// Serves the demo data on an ephemeral port and returns its base URL.
async fn spawn_app(model: PathBuf) -> String {
    let data = std::fs::read(demo("races.csv")).unwrap();
    let records = parse_records(&data, b',').unwrap();
    let app = router(AppState::new(records, PredictionEngine::new(ForestLoader, model)));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn test_index_lists_races_and_drivers() {
    let base = spawn_app(demo("grid_forest.json")).await;

    let page = reqwest::get(format!("{}/?race=Monaco%20Grand%20Prix%202021", base))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    assert!(page.contains("<option value=\"Bahrain Grand Prix 2021\">"));
    assert!(page.contains("<option value=\"Monaco Grand Prix 2021\" selected>"));
    assert!(page.contains("<option value=\"Guest Driver\">Guest Driver</option>"));
    assert!(page.contains("Specific driver"));
}

#[tokio::test]
async fn test_form_predicts_whole_race() {
    let base = spawn_app(demo("grid_forest.json")).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/predict", base))
        .form(&[("race", "Bahrain Grand Prix 2021"), ("mode", "all")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let page = response.text().await.unwrap();
    assert!(page.contains("Results for Bahrain Grand Prix 2021"));
    assert!(page.contains("<td>Lewis Hamilton</td>"));
    assert!(page.contains("Correct predictions: 13"));
}

#[tokio::test]
async fn test_form_predicts_single_driver() {
    let base = spawn_app(demo("grid_forest.json")).await;
    let client = reqwest::Client::new();

    let page = client
        .post(format!("{}/predict", base))
        .form(&[
            ("race", "Monaco Grand Prix 2021"),
            ("mode", "driver"),
            ("driver", "Max Verstappen"),
        ])
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    assert!(page.contains("<td>Max Verstappen</td>"));
    assert!(!page.contains("<td>Lewis Hamilton</td>"));
    assert!(page.contains("Correct predictions: 1"));
    assert!(page.contains("value=\"driver\" checked"));
    assert!(page.contains("<option value=\"Max Verstappen\" selected>"));
}

#[tokio::test]
async fn test_driver_mode_without_driver_is_bad_request() {
    let base = spawn_app(demo("grid_forest.json")).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/predict", base))
        .form(&[("race", "Monaco Grand Prix 2021"), ("mode", "driver"), ("driver", "")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    let page = response.text().await.unwrap();
    assert!(page.contains("class=\"error\""));
    assert!(page.contains("value=\"driver\" checked"));
    assert!(!page.contains("correct-count"));
}

#[tokio::test]
async fn test_json_api() {
    let base = spawn_app(demo("grid_forest.json")).await;
    let client = reqwest::Client::new();

    let races: Vec<String> = reqwest::get(format!("{}/api/races", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(races, vec!["Bahrain Grand Prix 2021", "Monaco Grand Prix 2021"]);

    let report: RaceReport = client
        .post(format!("{}/api/predict", base))
        .json(&serde_json::json!({"race": "Monaco Grand Prix 2021"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(report.result_table.len(), 21);
    assert_eq!(report.correct_count, 11);

    let health: HealthResponse = reqwest::get(format!("{}/health", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health.status, "ok");
    assert_eq!(health.rows, 41);
    assert_eq!(health.races, 2);
}

#[tokio::test]
async fn test_unknown_race_is_not_found() {
    let base = spawn_app(demo("grid_forest.json")).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/api/predict", base))
        .json(&serde_json::json!({"race": "Las Vegas 1981"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
    let body: ErrorResponse = response.json().await.unwrap();
    assert_eq!(body.error, "not_found");

    let response = reqwest::get(format!("{}/api/races/Las%20Vegas%201981/drivers", base))
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_model_failure_is_server_error() {
    let base = spawn_app(demo("missing.json")).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/api/predict", base))
        .json(&serde_json::json!({"race": "Monaco Grand Prix 2021"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 500);
    let body: ErrorResponse = response.json().await.unwrap();
    assert_eq!(body.error, "model_error");
}
