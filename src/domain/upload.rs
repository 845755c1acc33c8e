// ==========================================
// 集装箱排载工具 - 上传文件与列结构实体
// ==========================================
// 职责: 上传成功后的会话内快照 + 列名发现结果
// 红线: SheetSchema 只整体替换,不与旧数据合并
// ==========================================

use crate::domain::types::FileKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// UploadedFile - 已上传文件
// ==========================================
// 生命周期: 上传成功创建;回退到 Upload 步骤时丢弃
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadedFile {
    pub file_path: String,          // 服务端返回的文件路径(后续请求的标识)
    pub sheets: Vec<String>,        // 工作簿内的 sheet 名列表(保序)
    pub file_kind: FileKind,        // 文件类型
    pub uploaded_at: DateTime<Utc>, // 上传完成时间
}

impl UploadedFile {
    /// 判断某个 sheet 是否存在于工作簿
    pub fn has_sheet(&self, sheet_name: &str) -> bool {
        self.sheets.iter().any(|s| s == sheet_name)
    }

    /// 默认选中的 sheet(列表第一项)
    pub fn default_sheet(&self) -> Option<&str> {
        self.sheets.first().map(|s| s.as_str())
    }
}

// ==========================================
// SheetSchema - 列结构快照
// ==========================================
// 一次列名发现的结果,绑定 (sheet, header_row) 组合;
// sheet 或表头行变化时整体重算
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetSchema {
    pub sheet_name: String,   // 所属 sheet
    pub header_row: u32,      // 表头行下标(0 起)
    pub columns: Vec<String>, // 可映射列名(保序)
}

impl SheetSchema {
    /// 判断列名是否在当前快照中
    pub fn contains_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }
}
