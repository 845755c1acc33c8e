// ==========================================
// 集装箱排载工具 - 领域类型定义
// ==========================================
// 职责: 工作流/文件/过滤等封闭枚举类型
// 序列化格式: SCREAMING_SNAKE_CASE (与服务端一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 工作流步骤 (Workflow Step)
// ==========================================
// 红线: Processing 只是瞬态忙标志,不是独立步骤
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkflowStep {
    Upload,    // 上传文件
    Configure, // 配置 sheet/列映射
    Results,   // 查看排载结果
}

impl fmt::Display for WorkflowStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkflowStep::Upload => write!(f, "UPLOAD"),
            WorkflowStep::Configure => write!(f, "CONFIGURE"),
            WorkflowStep::Results => write!(f, "RESULTS"),
        }
    }
}

// ==========================================
// 请求操作类型 (Operation Kind)
// ==========================================
// 用途: 单飞控制(每步骤至多一个在途请求)与超时归因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationKind {
    Upload,       // 文件上传
    FetchColumns, // 列名发现
    Process,      // 排载计算
    Export,       // 装箱单导出
}

impl OperationKind {
    /// 操作发起时所处的工作流步骤
    pub fn step(&self) -> WorkflowStep {
        match self {
            OperationKind::Upload => WorkflowStep::Upload,
            OperationKind::FetchColumns | OperationKind::Process => WorkflowStep::Configure,
            OperationKind::Export => WorkflowStep::Results,
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationKind::Upload => write!(f, "UPLOAD"),
            OperationKind::FetchColumns => write!(f, "FETCH_COLUMNS"),
            OperationKind::Process => write!(f, "PROCESS"),
            OperationKind::Export => write!(f, "EXPORT"),
        }
    }
}

// ==========================================
// 文件类型 (File Kind)
// ==========================================
// 仅接受 Excel 工作簿,与服务端解析能力对齐
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FileKind {
    Xlsx, // Office Open XML 工作簿
    Xls,  // 旧版二进制工作簿
}

impl FileKind {
    /// 按文件名后缀判定文件类型(大小写不敏感)
    ///
    /// # 返回
    /// - Some(FileKind): 受支持的后缀
    /// - None: 不支持的格式
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let lower = file_name.trim().to_lowercase();
        if lower.ends_with(".xlsx") {
            Some(FileKind::Xlsx)
        } else if lower.ends_with(".xls") {
            Some(FileKind::Xls)
        } else {
            None
        }
    }

    /// 从服务端返回的标识解析(可选字段,缺省由后缀判定)
    pub fn from_wire_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "XLSX" => Some(FileKind::Xlsx),
            "XLS" => Some(FileKind::Xls),
            _ => None,
        }
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileKind::Xlsx => write!(f, "XLSX"),
            FileKind::Xls => write!(f, "XLS"),
        }
    }
}

// ==========================================
// 过滤匹配模式 (Filter Match Mode)
// ==========================================
// 观察行为无法确定原实现是精确匹配还是包含匹配,
// 作为显式配置项暴露(默认 EXACT),随 process 请求下发
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FilterMatchMode {
    Exact,    // 精确相等
    Contains, // 子串包含
}

impl FilterMatchMode {
    /// 从配置值解析匹配模式
    pub fn from_config_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "EXACT" => Some(FilterMatchMode::Exact),
            "CONTAINS" => Some(FilterMatchMode::Contains),
            _ => None,
        }
    }

    /// 转换为下发给服务端的字符串
    pub fn to_wire_str(&self) -> &'static str {
        match self {
            FilterMatchMode::Exact => "EXACT",
            FilterMatchMode::Contains => "CONTAINS",
        }
    }
}

impl fmt::Display for FilterMatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_wire_str())
    }
}

// ==========================================
// 数字显示区域 (Display Locale)
// ==========================================
// 控制结果渲染的千分位/小数点符号;
// 与 i18n 消息语言相互独立
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisplayLocale {
    #[serde(rename = "de-DE")]
    DeDe, // 1.234,50
    #[serde(rename = "en-US")]
    EnUs, // 1,234.50
    #[serde(rename = "vi-VN")]
    ViVn, // 1.234,50
}

impl DisplayLocale {
    /// 从 BCP 47 风格的配置值解析(大小写不敏感)
    pub fn from_config_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "de-de" | "de" => Some(DisplayLocale::DeDe),
            "en-us" | "en" => Some(DisplayLocale::EnUs),
            "vi-vn" | "vi" => Some(DisplayLocale::ViVn),
            _ => None,
        }
    }

    pub fn as_tag(&self) -> &'static str {
        match self {
            DisplayLocale::DeDe => "de-DE",
            DisplayLocale::EnUs => "en-US",
            DisplayLocale::ViVn => "vi-VN",
        }
    }
}

impl fmt::Display for DisplayLocale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_kind_from_file_name() {
        assert_eq!(FileKind::from_file_name("shipment.xlsx"), Some(FileKind::Xlsx));
        assert_eq!(FileKind::from_file_name("SHIPMENT.XLS"), Some(FileKind::Xls));
        assert_eq!(FileKind::from_file_name("  plan.Xlsx  "), Some(FileKind::Xlsx));
        assert_eq!(FileKind::from_file_name("notes.csv"), None);
        assert_eq!(FileKind::from_file_name("xlsx"), None);
    }

    #[test]
    fn test_filter_match_mode_parse() {
        assert_eq!(FilterMatchMode::from_config_str("exact"), Some(FilterMatchMode::Exact));
        assert_eq!(
            FilterMatchMode::from_config_str(" CONTAINS "),
            Some(FilterMatchMode::Contains)
        );
        assert_eq!(FilterMatchMode::from_config_str("regex"), None);
    }

    #[test]
    fn test_operation_kind_step() {
        assert_eq!(OperationKind::Upload.step(), WorkflowStep::Upload);
        assert_eq!(OperationKind::FetchColumns.step(), WorkflowStep::Configure);
        assert_eq!(OperationKind::Process.step(), WorkflowStep::Configure);
        assert_eq!(OperationKind::Export.step(), WorkflowStep::Results);
    }
}
