// ==========================================
// 集装箱排载工具 - 配置管理器
// ==========================================
// 职责: 注入式配置的加载、查询、默认值兜底
// 存储: 显式覆写 + CONTAINER_PLANNER_* 环境变量
// ==========================================

use crate::domain::types::{DisplayLocale, FilterMatchMode};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

/// 环境变量前缀
const ENV_PREFIX: &str = "CONTAINER_PLANNER_";

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
// 查询顺序: 显式覆写 → 环境变量 → 默认值
pub struct ConfigManager {
    overrides: HashMap<String, String>,
}

impl ConfigManager {
    /// 创建仅读取环境变量的配置管理器
    pub fn from_env() -> Self {
        Self {
            overrides: HashMap::new(),
        }
    }

    /// 创建带显式覆写的配置管理器
    ///
    /// # 参数
    /// - overrides: 配置键(config_keys 常量) → 值
    ///
    /// # 用途
    /// - 嵌入方注入 baseUrl/超时/区域设置
    /// - 测试中隔离环境变量
    pub fn with_overrides(overrides: HashMap<String, String>) -> Self {
        Self { overrides }
    }

    /// 读取配置值
    fn get_value(&self, key: &str) -> Option<String> {
        if let Some(v) = self.overrides.get(key) {
            return Some(v.clone());
        }

        let env_name = format!("{}{}", ENV_PREFIX, key.to_uppercase());
        match std::env::var(env_name) {
            Ok(v) if !v.trim().is_empty() => Some(v),
            _ => None,
        }
    }

    /// 读取配置值,带默认值
    fn get_or_default(&self, key: &str, default: &str) -> String {
        self.get_value(key).unwrap_or_else(|| default.to_string())
    }

    /// 解析秒数配置,非法值回退默认并告警
    fn get_secs_or_default(&self, key: &str, default_secs: u64) -> Duration {
        let raw = self.get_or_default(key, &default_secs.to_string());
        let secs = raw.parse::<u64>().unwrap_or_else(|_| {
            tracing::warn!(config_key = key, raw_value = %raw, "超时配置格式错误,使用默认值");
            default_secs
        });
        Duration::from_secs(secs)
    }

    // ===== 服务地址 =====

    /// 优化服务基地址(无尾部斜杠)
    pub fn get_base_url(&self) -> String {
        let url = self.get_or_default(config_keys::BASE_URL, defaults::BASE_URL);
        url.trim_end_matches('/').to_string()
    }

    // ===== 分操作超时 =====

    /// 文件上传超时(默认 300s)
    pub fn get_upload_timeout(&self) -> Duration {
        self.get_secs_or_default(config_keys::UPLOAD_TIMEOUT_SECS, defaults::UPLOAD_TIMEOUT_SECS)
    }

    /// 列名发现超时(默认 120s)
    pub fn get_schema_timeout(&self) -> Duration {
        self.get_secs_or_default(config_keys::SCHEMA_TIMEOUT_SECS, defaults::SCHEMA_TIMEOUT_SECS)
    }

    /// 排载计算超时(默认 300s)
    pub fn get_process_timeout(&self) -> Duration {
        self.get_secs_or_default(
            config_keys::PROCESS_TIMEOUT_SECS,
            defaults::PROCESS_TIMEOUT_SECS,
        )
    }

    /// 装箱单导出超时(默认 300s)
    pub fn get_export_timeout(&self) -> Duration {
        self.get_secs_or_default(config_keys::EXPORT_TIMEOUT_SECS, defaults::EXPORT_TIMEOUT_SECS)
    }

    // ===== 渲染与过滤 =====

    /// 数字显示区域(默认 de-DE,与原型渲染口径一致)
    pub fn get_display_locale(&self) -> DisplayLocale {
        let raw = self.get_or_default(config_keys::LOCALE, defaults::LOCALE);
        DisplayLocale::from_config_str(&raw).unwrap_or_else(|| {
            tracing::warn!(config_key = config_keys::LOCALE, raw_value = %raw, "区域设置无法识别,使用 de-DE");
            DisplayLocale::DeDe
        })
    }

    /// 过滤匹配模式(默认 EXACT)
    pub fn get_filter_match_mode(&self) -> FilterMatchMode {
        let raw = self.get_or_default(config_keys::FILTER_MATCH_MODE, defaults::FILTER_MATCH_MODE);
        FilterMatchMode::from_config_str(&raw).unwrap_or_else(|| {
            tracing::warn!(
                config_key = config_keys::FILTER_MATCH_MODE,
                raw_value = %raw,
                "过滤匹配模式无法识别,使用 EXACT"
            );
            FilterMatchMode::Exact
        })
    }

    // ===== 导出目录 =====

    /// 装箱单落盘目录
    ///
    /// 顺序: 配置值 → 用户下载目录 → 当前目录
    pub fn get_export_dir(&self) -> PathBuf {
        if let Some(dir) = self.get_value(config_keys::EXPORT_DIR) {
            return PathBuf::from(dir);
        }
        dirs::download_dir().unwrap_or_else(|| PathBuf::from("."))
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 服务地址
    pub const BASE_URL: &str = "base_url";

    // 分操作超时(秒)
    pub const UPLOAD_TIMEOUT_SECS: &str = "upload_timeout_secs";
    pub const SCHEMA_TIMEOUT_SECS: &str = "schema_timeout_secs";
    pub const PROCESS_TIMEOUT_SECS: &str = "process_timeout_secs";
    pub const EXPORT_TIMEOUT_SECS: &str = "export_timeout_secs";

    // 渲染与过滤
    pub const LOCALE: &str = "locale";
    pub const FILTER_MATCH_MODE: &str = "filter_match_mode";

    // 导出
    pub const EXPORT_DIR: &str = "export_dir";
}

// ==========================================
// 默认值
// ==========================================
mod defaults {
    pub const BASE_URL: &str = "http://127.0.0.1:5001";
    pub const UPLOAD_TIMEOUT_SECS: u64 = 300;
    pub const SCHEMA_TIMEOUT_SECS: u64 = 120;
    pub const PROCESS_TIMEOUT_SECS: u64 = 300;
    pub const EXPORT_TIMEOUT_SECS: u64 = 300;
    pub const LOCALE: &str = "de-DE";
    pub const FILTER_MATCH_MODE: &str = "EXACT";
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager(pairs: &[(&str, &str)]) -> ConfigManager {
        let overrides = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ConfigManager::with_overrides(overrides)
    }

    #[test]
    fn test_defaults() {
        let config = manager(&[]);
        assert_eq!(config.get_base_url(), "http://127.0.0.1:5001");
        assert_eq!(config.get_upload_timeout(), Duration::from_secs(300));
        assert_eq!(config.get_schema_timeout(), Duration::from_secs(120));
        assert_eq!(config.get_display_locale(), DisplayLocale::DeDe);
        assert_eq!(config.get_filter_match_mode(), FilterMatchMode::Exact);
    }

    #[test]
    fn test_overrides_take_precedence() {
        let config = manager(&[
            (config_keys::BASE_URL, "https://planner.example.com/"),
            (config_keys::SCHEMA_TIMEOUT_SECS, "30"),
            (config_keys::LOCALE, "en-US"),
            (config_keys::FILTER_MATCH_MODE, "CONTAINS"),
        ]);
        // 尾部斜杠被规范化
        assert_eq!(config.get_base_url(), "https://planner.example.com");
        assert_eq!(config.get_schema_timeout(), Duration::from_secs(30));
        assert_eq!(config.get_display_locale(), DisplayLocale::EnUs);
        assert_eq!(config.get_filter_match_mode(), FilterMatchMode::Contains);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = manager(&[
            (config_keys::PROCESS_TIMEOUT_SECS, "abc"),
            (config_keys::LOCALE, "xx-YY"),
            (config_keys::FILTER_MATCH_MODE, "regex"),
        ]);
        assert_eq!(config.get_process_timeout(), Duration::from_secs(300));
        assert_eq!(config.get_display_locale(), DisplayLocale::DeDe);
        assert_eq!(config.get_filter_match_mode(), FilterMatchMode::Exact);
    }

    #[test]
    fn test_export_dir_override() {
        let config = manager(&[(config_keys::EXPORT_DIR, "/tmp/packing_lists")]);
        assert_eq!(config.get_export_dir(), PathBuf::from("/tmp/packing_lists"));
    }
}
