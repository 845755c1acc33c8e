// ==========================================
// 集装箱装柜优化排载工具 - 客户端编排核心库
// ==========================================
// 技术栈: Rust + tokio + reqwest
// 系统定位: 外部优化服务的会话编排与结果建模
// 工作流: Upload → Configure → Results → (Export)
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "zh-CN");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 服务边界层 - 外部优化服务
pub mod optimizer;

// 配置层 - 注入式配置
pub mod config;

// 渲染层 - 展示树与数字格式化
pub mod render;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 工作流与导出接口
pub mod api;

// 应用层 - 装配入口
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{
    DisplayLocale, FileKind, FilterMatchMode, OperationKind, WorkflowStep,
};

// 领域实体
pub use domain::{
    CombinedItem, CombinedPallet, Container, LoadConfiguration, LoadingPlan, PalletEntry,
    PlanInvariantError, SheetSchema, SinglePallet, UploadedFile,
};

// 容量常量
pub use domain::loading::{CONTAINER_CAPACITY_PALLETS, CONTAINER_CAPACITY_WEIGHT_KG};

// 服务边界
pub use optimizer::{HttpOptimizerService, OptimizerError, OptimizerResult, OptimizerService};

// 配置
pub use config::{config_keys, ConfigManager};

// 渲染
pub use render::{NumberFormatter, PlanRenderer, PlanView};

// API
pub use api::{Applied, ApiError, ApiResult, ExportApi, SessionSnapshot, WorkflowApi};

// 应用
pub use app::AppState;

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "集装箱装柜优化排载工具";
