// ==========================================
// 装箱单导出测试
// ==========================================
// 测试范围:
// 1. 本地前置校验失败 → 零网络请求
// 2. 二进制错误报文的 文本 → JSON 解码与消息透出
// 3. 产物落盘与命名
// ==========================================

mod helpers;

use container_loading_planner::api::ApiError;
use container_loading_planner::app::AppState;
use container_loading_planner::config::{config_keys, ConfigManager};
use container_loading_planner::domain::loading::LoadingPlan;
use helpers::mock_service::{sample_containers, ExportBehavior, MockOptimizerService};
use std::collections::HashMap;
use std::sync::atomic::Ordering;
use std::sync::Arc;

fn build_state(mock: &Arc<MockOptimizerService>, export_dir: &std::path::Path) -> AppState {
    let mut overrides = HashMap::new();
    overrides.insert(
        config_keys::EXPORT_DIR.to_string(),
        export_dir.display().to_string(),
    );
    AppState::with_service(ConfigManager::with_overrides(overrides), mock.clone())
}

fn default_mock() -> Arc<MockOptimizerService> {
    let mock = Arc::new(MockOptimizerService::new(&["A", "B"]));
    mock.register_columns("A", 3, &["Qty", "GW/Pallet"]);
    mock
}

/// 驱动工作流到 Results 步骤
async fn reach_results(state: &AppState, mock: &Arc<MockOptimizerService>) {
    let api = &state.workflow_api;
    api.upload("shipment.xlsx", b"excel".to_vec()).await.unwrap();
    api.refresh_columns().await.unwrap();
    api.set_quantity_column("Qty").unwrap();
    api.set_weight_column("GW/Pallet").unwrap();
    mock.set_results(sample_containers());
    api.submit().await.unwrap();
}

// ==========================================
// 测试用例
// ==========================================

#[tokio::test]
async fn test_export_empty_plan_fails_locally_with_zero_calls() {
    let export_dir = tempfile::tempdir().unwrap();
    let mock = default_mock();
    let state = build_state(&mock, export_dir.path());

    // 空结果集: 前置校验直接失败,不发出任何网络请求
    let empty_plan = LoadingPlan::from_results(Vec::new(), "uploads/shipment.xlsx", "A")
        .expect("空结果集本身是合法模型");
    let result = state.export_api.request_export(&empty_plan).await;

    assert!(matches!(result, Err(ApiError::ValidationError(_))));
    assert_eq!(mock.export_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_export_without_result_model_fails_locally() {
    let export_dir = tempfile::tempdir().unwrap();
    let mock = default_mock();
    let state = build_state(&mock, export_dir.path());

    // 尚无结果模型: 工作流层直接拒绝,零网络请求
    let result = state.workflow_api.export_packing_list().await;
    assert!(matches!(
        result,
        Err(ApiError::InvalidStateTransition { .. })
    ));
    assert_eq!(mock.export_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_export_server_error_message_surfaced_exactly() {
    let export_dir = tempfile::tempdir().unwrap();
    let mock = default_mock();
    let state = build_state(&mock, export_dir.path());
    reach_results(&state, &mock).await;

    // 二进制通道上的结构化错误报文
    mock.set_export_behavior(ExportBehavior::ErrorBody {
        status: 400,
        body: br#"{"error": "sheet not found"}"#.to_vec(),
    });

    let result = state.workflow_api.export_packing_list().await;
    match result {
        Err(ApiError::ServerError { status, message }) => {
            assert_eq!(status, 400);
            // 服务端消息原样透出,不得退化为通用解码失败
            assert_eq!(message, "sheet not found");
        }
        other => panic!("期望 ServerError,实际 {:?}", other.map(|_| ())),
    }
}

#[tokio::test]
async fn test_export_undecodable_error_reports_status() {
    let export_dir = tempfile::tempdir().unwrap();
    let mock = default_mock();
    let state = build_state(&mock, export_dir.path());
    reach_results(&state, &mock).await;

    mock.set_export_behavior(ExportBehavior::ErrorBody {
        status: 502,
        body: b"<html>Bad Gateway</html>".to_vec(),
    });

    let result = state.workflow_api.export_packing_list().await;
    assert!(matches!(
        result,
        Err(ApiError::DecodeError { status: 502 })
    ));
}

#[tokio::test]
async fn test_export_writes_named_artifact() {
    let export_dir = tempfile::tempdir().unwrap();
    let mock = default_mock();
    let state = build_state(&mock, export_dir.path());
    reach_results(&state, &mock).await;

    let payload = b"PK\x03\x04 real workbook".to_vec();
    mock.set_export_behavior(ExportBehavior::Payload(payload.clone()));

    let response = state
        .workflow_api
        .export_packing_list()
        .await
        .unwrap()
        .into_applied()
        .unwrap();

    // 文件名由 sheet 名派生
    assert!(response.artifact_path.ends_with("PackingList_A.xlsx"));
    assert_eq!(response.artifact_bytes, payload.len());
    let written = std::fs::read(&response.artifact_path).unwrap();
    assert_eq!(written, payload);
    // 本地化说明携带落盘路径
    assert!(response
        .message
        .contains(&response.artifact_path.display().to_string()));
}

#[tokio::test]
async fn test_export_sanitizes_sheet_name_in_artifact() {
    let export_dir = tempfile::tempdir().unwrap();
    let mock = default_mock();
    let state = build_state(&mock, export_dir.path());

    let plan = LoadingPlan::from_results(
        sample_containers(),
        "uploads/shipment.xlsx",
        "2024/Q1*plan",
    )
    .unwrap();

    let bytes = state.export_api.request_export(&plan).await.unwrap();
    let response = state
        .export_api
        .write_artifact(plan.sheet_name(), &bytes)
        .await
        .unwrap();

    assert!(response
        .artifact_path
        .ends_with("PackingList_2024_Q1_plan.xlsx"));
    assert!(response.artifact_path.exists());
}
