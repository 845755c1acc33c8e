// ==========================================
// 集装箱排载工具 - 装箱单导出API
// ==========================================
// 职责: 导出前置校验、二进制产物获取、本地落盘
// 红线: 前置校验失败必须零网络请求直接返回
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::ConfigManager;
use crate::domain::loading::LoadingPlan;
use crate::i18n;
use crate::optimizer::wire::ExportRequest;
use crate::optimizer::OptimizerService;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// 导出API响应
#[derive(Debug, Clone, Serialize)]
pub struct ExportApiResponse {
    /// 落盘后的产物路径
    pub artifact_path: PathBuf,
    /// 产物字节数
    pub artifact_bytes: usize,
    /// 导出耗时(毫秒)
    pub elapsed_ms: i64,
    /// 本地化的结果说明
    pub message: String,
}

// ==========================================
// ExportApi - 导出协调器
// ==========================================
pub struct ExportApi {
    service: Arc<dyn OptimizerService>,
    export_dir: PathBuf,
}

impl ExportApi {
    /// 创建新的ExportApi实例
    pub fn new(service: Arc<dyn OptimizerService>, config: &ConfigManager) -> Self {
        Self {
            service,
            export_dir: config.get_export_dir(),
        }
    }

    pub fn export_dir(&self) -> &Path {
        &self.export_dir
    }

    /// 请求装箱单二进制产物
    ///
    /// # 前置校验(零网络请求)
    /// - 结果模型非空,否则直接返回本地 ValidationError
    ///
    /// # 返回
    /// - Ok(Vec<u8>): 非空二进制工作簿
    /// - Err(ApiError): 本地校验失败 / 服务端结构化错误 / 传输失败
    pub async fn request_export(&self, plan: &LoadingPlan) -> ApiResult<Vec<u8>> {
        if plan.is_empty() {
            return Err(ApiError::ValidationError(i18n::t("export.empty_plan")));
        }

        let request = ExportRequest {
            optimized_results: plan.containers(),
            original_filepath: plan.source_file_path(),
            sheet_name: plan.sheet_name(),
        };

        let bytes = self.service.generate_packing_list(request).await?;
        Ok(bytes)
    }

    /// 将产物落盘为 PackingList_{sheet}.xlsx
    pub async fn write_artifact(
        &self,
        sheet_name: &str,
        bytes: &[u8],
    ) -> ApiResult<ExportApiResponse> {
        let started = Instant::now();

        let file_name = format!("PackingList_{}.xlsx", sanitize_file_stem(sheet_name));
        let artifact_path = self.export_dir.join(file_name);

        tokio::fs::create_dir_all(&self.export_dir)
            .await
            .map_err(|e| ApiError::InternalError(format!("创建导出目录失败: {}", e)))?;
        tokio::fs::write(&artifact_path, bytes)
            .await
            .map_err(|e| ApiError::InternalError(format!("写入装箱单失败: {}", e)))?;

        tracing::info!(
            path = %artifact_path.display(),
            bytes = bytes.len(),
            "装箱单已落盘"
        );

        Ok(ExportApiResponse {
            message: i18n::t_with_args(
                "export.completed",
                &[("path", &artifact_path.display().to_string())],
            ),
            artifact_path,
            artifact_bytes: bytes.len(),
            elapsed_ms: started.elapsed().as_millis() as i64,
        })
    }
}

/// 清理 sheet 名中不适合做文件名的字符
fn sanitize_file_stem(sheet_name: &str) -> String {
    let trimmed = sheet_name.trim();
    if trimmed.is_empty() {
        return "export".to_string();
    }
    trimmed
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}
