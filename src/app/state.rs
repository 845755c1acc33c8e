// ==========================================
// 集装箱排载工具 - 应用状态
// ==========================================
// 职责: 装配配置、服务客户端与各 API 实例
// 用途: 作为嵌入方(桌面壳/Web 壳)的组装入口
// ==========================================

use std::sync::Arc;

use crate::api::{ExportApi, WorkflowApi};
use crate::config::ConfigManager;
use crate::optimizer::{HttpOptimizerService, OptimizerService};

/// 应用状态
///
/// 包含全部 API 实例与共享配置;
/// 一个 AppState 对应一个用户会话
pub struct AppState {
    /// 注入配置
    pub config: Arc<ConfigManager>,

    /// 工作流API
    pub workflow_api: Arc<WorkflowApi>,

    /// 装箱单导出API
    pub export_api: Arc<ExportApi>,
}

impl AppState {
    /// 基于 HTTP 服务实现创建 AppState
    ///
    /// # 参数
    /// - config: 注入配置(服务地址/超时/区域设置)
    ///
    /// # 返回
    /// - Ok(AppState): 应用状态实例
    /// - Err(String): 初始化错误
    pub fn new(config: ConfigManager) -> Result<Self, String> {
        tracing::info!(base_url = %config.get_base_url(), "初始化 AppState");

        let service = Arc::new(
            HttpOptimizerService::new(&config)
                .map_err(|e| format!("无法创建 HttpOptimizerService: {}", e))?,
        );

        Ok(Self::with_service(config, service))
    }

    /// 基于任意服务实现创建 AppState(测试或自定义传输)
    pub fn with_service(config: ConfigManager, service: Arc<dyn OptimizerService>) -> Self {
        let export_api = Arc::new(ExportApi::new(service.clone(), &config));
        let workflow_api = Arc::new(WorkflowApi::new(service, export_api.clone(), &config));

        tracing::info!("AppState 初始化完成");

        Self {
            config: Arc::new(config),
            workflow_api,
            export_api,
        }
    }
}
