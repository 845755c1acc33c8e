// ==========================================
// 集装箱排载工具 - 排载配置模型
// ==========================================
// 职责: 持有并校验当前的 sheet/表头行/列映射选择
// 红线: 仅由用户输入与列结构失效两条路径修改
// ==========================================

use crate::domain::upload::SheetSchema;
use serde::{Deserialize, Serialize};

/// 表头行下标默认值(0 起,对应工作簿第 4 行)
pub const DEFAULT_HEADER_ROW: u32 = 3;

// ==========================================
// LoadConfiguration - 排载配置
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfiguration {
    pub sheet_name: String,             // 选中的 sheet
    pub header_row: u32,                // 表头行下标(非负,默认 3)
    pub quantity_column: Option<String>, // 数量列(必选)
    pub weight_column: Option<String>,   // 单板重量列(必选)
    pub filter_column: Option<String>,   // 过滤列(可选)
    pub filter_value: Option<String>,    // 过滤值(配合过滤列)
}

impl Default for LoadConfiguration {
    fn default() -> Self {
        Self {
            sheet_name: String::new(),
            header_row: DEFAULT_HEADER_ROW,
            quantity_column: None,
            weight_column: None,
            filter_column: None,
            filter_value: None,
        }
    }
}

impl LoadConfiguration {
    /// 判断当前配置是否满足提交条件
    ///
    /// 规则:
    /// - sheet_name / quantity_column / weight_column 均非空
    /// - 选中的列必须存在于当前列结构快照(过期选择不得静默保留)
    /// - 快照缺失(尚未发现或上次发现失败)时一律禁止提交
    pub fn is_submittable(&self, schema: Option<&SheetSchema>) -> bool {
        let schema = match schema {
            Some(s) => s,
            None => return false,
        };

        if self.sheet_name.trim().is_empty() {
            return false;
        }

        let quantity = match &self.quantity_column {
            Some(c) if !c.trim().is_empty() => c,
            _ => return false,
        };
        let weight = match &self.weight_column {
            Some(c) if !c.trim().is_empty() => c,
            _ => return false,
        };

        if !schema.contains_column(quantity) || !schema.contains_column(weight) {
            return false;
        }

        // 过滤列可选;一旦设置也必须在快照内
        if let Some(filter) = &self.filter_column {
            if !filter.trim().is_empty() && !schema.contains_column(filter) {
                return false;
            }
        }

        true
    }

    /// 生效的过滤条件
    ///
    /// 过滤列已设置但过滤值为空 → 视为"无过滤",不是错误
    pub fn effective_filter(&self) -> Option<(&str, &str)> {
        let column = self.filter_column.as_deref()?.trim();
        let value = self.filter_value.as_deref()?.trim();
        if column.is_empty() || value.is_empty() {
            return None;
        }
        Some((column, value))
    }

    /// 按刷新后的列结构使失效选择立即作废
    ///
    /// # 返回
    /// - 被清除的列选择名称(用于向用户提示)
    pub fn invalidate_missing_columns(&mut self, schema: &SheetSchema) -> Vec<String> {
        let mut invalidated = Vec::new();

        for slot in [
            &mut self.quantity_column,
            &mut self.weight_column,
            &mut self.filter_column,
        ] {
            if let Some(column) = slot.as_deref() {
                if !schema.contains_column(column) {
                    invalidated.push(column.to_string());
                    *slot = None;
                }
            }
        }

        // 过滤列被清除后,孤立的过滤值一并清除
        if self.filter_column.is_none() {
            self.filter_value = None;
        }

        invalidated
    }
}
