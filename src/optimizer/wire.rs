// ==========================================
// 集装箱排载工具 - 服务端报文结构
// ==========================================
// 职责: JSON-over-HTTP 边界的请求/响应载荷
// 约定: 全部 snake_case 字段;结果采用 type 标签联合
// ==========================================

use crate::domain::configuration::LoadConfiguration;
use crate::domain::loading::Container;
use crate::domain::types::FilterMatchMode;
use serde::{Deserialize, Serialize};

// ==========================================
// 响应信封
// ==========================================
// 服务端约定: 成功为 {"success": true, ...数据},
// 失败为 {"success": false, "error": "..."}(错误也可能伴随 2xx)

/// 上传响应
#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub error: Option<String>,
    /// 服务端保存的文件路径(后续请求的标识)
    #[serde(default)]
    pub filepath: Option<String>,
    /// 工作簿内 sheet 名列表
    #[serde(default)]
    pub sheets: Option<Vec<String>>,
    /// 服务端判定的文件类型(可选,缺省由客户端按后缀判定)
    #[serde(default)]
    pub file_kind: Option<String>,
}

/// 列名发现响应
#[derive(Debug, Clone, Deserialize)]
pub struct ColumnsResponse {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub columns: Option<Vec<String>>,
}

/// 排载计算响应
#[derive(Debug, Clone, Deserialize)]
pub struct ProcessResponse {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub results: Option<Vec<Container>>,
}

// ==========================================
// 请求载荷
// ==========================================

/// 列名发现请求
#[derive(Debug, Clone, Serialize)]
pub struct ColumnsRequest {
    pub filepath: String,
    pub sheet_name: String,
    pub header_row: u32,
}

/// 排载计算请求
#[derive(Debug, Clone, Serialize)]
pub struct ProcessRequest {
    pub filepath: String,
    pub sheet_name: String,
    pub header_row: u32,
    pub quantity_column: String,
    pub weight_column: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_column: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_value: Option<String>,
    /// 过滤匹配语义(EXACT/CONTAINS),显式下发避免两端各自假设
    pub filter_match_mode: String,
}

impl ProcessRequest {
    /// 由会话配置构造请求载荷
    ///
    /// # 返回
    /// - Some(ProcessRequest): 必填列齐备
    /// - None: 数量列或重量列缺失(提交门禁未通过)
    pub fn from_configuration(
        file_path: &str,
        config: &LoadConfiguration,
        match_mode: FilterMatchMode,
    ) -> Option<Self> {
        let quantity_column = config.quantity_column.as_deref()?.trim().to_string();
        let weight_column = config.weight_column.as_deref()?.trim().to_string();
        if quantity_column.is_empty() || weight_column.is_empty() || config.sheet_name.is_empty() {
            return None;
        }

        // 过滤值为空时整组省略(视为无过滤)
        let (filter_column, filter_value) = match config.effective_filter() {
            Some((column, value)) => (Some(column.to_string()), Some(value.to_string())),
            None => (None, None),
        };

        Some(Self {
            filepath: file_path.to_string(),
            sheet_name: config.sheet_name.clone(),
            header_row: config.header_row,
            quantity_column,
            weight_column,
            filter_column,
            filter_value,
            filter_match_mode: match_mode.to_wire_str().to_string(),
        })
    }
}

/// 装箱单导出请求(字段名与文档服务既有约定对齐)
#[derive(Debug, Clone, Serialize)]
pub struct ExportRequest<'a> {
    pub optimized_results: &'a [Container],
    pub original_filepath: &'a str,
    pub sheet_name: &'a str,
}
