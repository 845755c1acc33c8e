// ==========================================
// 过期响应抑制与单飞控制测试
// ==========================================
// 测试范围:
// 1. 在途请求期间回退 → 响应按纪元失配被丢弃
// 2. 同一步骤的并发请求被拒绝(触发控件禁用语义)
// ==========================================

mod helpers;

use container_loading_planner::api::ApiError;
use container_loading_planner::app::AppState;
use container_loading_planner::config::ConfigManager;
use container_loading_planner::domain::types::WorkflowStep;
use helpers::mock_service::{sample_containers, MockOptimizerService, ProcessGate};
use std::collections::HashMap;
use std::sync::atomic::Ordering;
use std::sync::Arc;

fn build_state(mock: &Arc<MockOptimizerService>) -> AppState {
    AppState::with_service(ConfigManager::with_overrides(HashMap::new()), mock.clone())
}

async fn reach_submittable(state: &AppState) {
    let api = &state.workflow_api;
    api.upload("shipment.xlsx", b"excel".to_vec()).await.unwrap();
    api.refresh_columns().await.unwrap();
    api.set_quantity_column("Qty").unwrap();
    api.set_weight_column("GW/Pallet").unwrap();
}

fn default_mock() -> Arc<MockOptimizerService> {
    let mock = Arc::new(MockOptimizerService::new(&["A", "B"]));
    mock.register_columns("A", 3, &["Qty", "GW/Pallet"]);
    mock.set_results(sample_containers());
    mock
}

// ==========================================
// 测试用例
// ==========================================

/// 排载请求在途时回退到 Upload:
/// 传输层不取消请求,但迟到的响应必须被丢弃
#[tokio::test]
async fn test_back_navigation_discards_in_flight_response() {
    let mock = default_mock();
    let gate = ProcessGate::new();
    mock.set_process_gate(gate.clone());

    let state = build_state(&mock);
    reach_submittable(&state).await;

    // 在独立任务中发起提交,使其悬停在服务端闸门上
    let api = state.workflow_api.clone();
    let handle = tokio::spawn(async move { api.submit().await });
    gate.entered.notified().await;

    // 用户离开发起请求的步骤(回退允许在请求在途时发生)
    state.workflow_api.back_to_upload().unwrap();
    assert_eq!(state.workflow_api.current_step(), WorkflowStep::Upload);

    // 放行服务端响应
    gate.release.notify_one();
    let outcome = handle.await.unwrap().unwrap();

    // 响应纪元失配 → 显式丢弃,不产生任何状态变化
    assert!(outcome.is_stale());
    assert_eq!(state.workflow_api.current_step(), WorkflowStep::Upload);
    assert!(!state.workflow_api.snapshot().unwrap().has_plan);
    // 请求确实到达过服务端(未在传输层取消)
    assert_eq!(mock.process_calls.load(Ordering::SeqCst), 1);
}

/// 同一步骤至多一个在途请求
#[tokio::test]
async fn test_second_request_rejected_while_in_flight() {
    let mock = default_mock();
    let gate = ProcessGate::new();
    mock.set_process_gate(gate.clone());

    let state = build_state(&mock);
    reach_submittable(&state).await;

    let api = state.workflow_api.clone();
    let handle = tokio::spawn(async move { api.submit().await });
    gate.entered.notified().await;

    // 在途期间: 触发控件禁用,重复提交被拒绝
    assert!(state.workflow_api.is_busy());
    assert!(!state.workflow_api.can_submit());
    let result = state.workflow_api.submit().await;
    assert!(matches!(result, Err(ApiError::RequestInFlight { .. })));

    // 放行后首个请求正常完成
    gate.release.notify_one();
    let outcome = handle.await.unwrap().unwrap().into_applied().unwrap();
    assert_eq!(outcome.container_count, 2);
    assert_eq!(state.workflow_api.current_step(), WorkflowStep::Results);
    assert_eq!(mock.process_calls.load(Ordering::SeqCst), 1);
}

/// 迟到响应被丢弃后,新会话轮次不受污染
#[tokio::test]
async fn test_new_round_unaffected_by_discarded_response() {
    let mock = default_mock();
    let gate = ProcessGate::new();
    mock.set_process_gate(gate.clone());

    let state = build_state(&mock);
    reach_submittable(&state).await;

    let api = state.workflow_api.clone();
    let handle = tokio::spawn(async move { api.submit().await });
    gate.entered.notified().await;
    state.workflow_api.back_to_upload().unwrap();
    gate.release.notify_one();
    assert!(handle.await.unwrap().unwrap().is_stale());

    // 换一个预先放行的闸门,重新走完整链路
    let gate2 = ProcessGate::new();
    gate2.release.notify_one();
    mock.set_process_gate(gate2);

    reach_submittable(&state).await;
    mock.set_results(sample_containers());
    let outcome = state.workflow_api.submit().await.unwrap().into_applied().unwrap();
    assert_eq!(outcome.container_count, 2);
    assert_eq!(state.workflow_api.current_step(), WorkflowStep::Results);
}
