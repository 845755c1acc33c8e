// ==========================================
// 集装箱排载工具 - 数字格式化器
// ==========================================
// 职责: 两位小数 + 区域千分位/小数点约定
// 红线: 缺失或非数字一律渲染 N/A 标记,绝不抛错
// ==========================================

use crate::domain::types::DisplayLocale;

/// "不可用"显示标记
pub const NOT_AVAILABLE: &str = "N/A";

// ==========================================
// NumberFormatter - 数字格式化器
// ==========================================
#[derive(Debug, Clone, Copy)]
pub struct NumberFormatter {
    locale: DisplayLocale,
}

impl NumberFormatter {
    pub fn new(locale: DisplayLocale) -> Self {
        Self { locale }
    }

    pub fn locale(&self) -> DisplayLocale {
        self.locale
    }

    /// (千分位符, 小数点符)
    fn separators(&self) -> (char, char) {
        match self.locale {
            DisplayLocale::DeDe => ('.', ','),
            DisplayLocale::EnUs => (',', '.'),
            DisplayLocale::ViVn => ('.', ','),
        }
    }

    /// 按区域约定格式化为两位小数
    ///
    /// NaN/无穷 → N/A
    pub fn format(&self, value: f64) -> String {
        if !value.is_finite() {
            return NOT_AVAILABLE.to_string();
        }

        let (group_sep, decimal_sep) = self.separators();

        let rendered = format!("{:.2}", value.abs());
        let (int_part, frac_part) = match rendered.split_once('.') {
            Some(parts) => parts,
            None => (rendered.as_str(), "00"),
        };

        // 整数部分自右向左每三位插入千分位符
        let digits: Vec<char> = int_part.chars().collect();
        let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
        for (i, c) in digits.iter().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(group_sep);
            }
            grouped.push(*c);
        }

        let sign = if value < 0.0 { "-" } else { "" };
        format!("{}{}{}{}", sign, grouped, decimal_sep, frac_part)
    }

    /// 缺失值 → N/A
    pub fn format_opt(&self, value: Option<f64>) -> String {
        match value {
            Some(v) => self.format(v),
            None => NOT_AVAILABLE.to_string(),
        }
    }

    /// 格式化任意 JSON 值: 仅数字可渲染,其余一律 N/A
    pub fn format_value(&self, value: &serde_json::Value) -> String {
        match value.as_f64() {
            Some(v) => self.format(v),
            None => NOT_AVAILABLE.to_string(),
        }
    }

    /// 比例 → 百分数显示(两位小数)
    pub fn format_percent(&self, ratio: f64) -> String {
        if !ratio.is_finite() {
            return NOT_AVAILABLE.to_string();
        }
        format!("{}%", self.format(ratio * 100.0))
    }
}
