// ==========================================
// 集装箱排载工具 - 结果渲染层
// ==========================================
// 职责: 结果模型到展示树的纯映射 + 区域数字格式化
// ==========================================

pub mod dto;
pub mod formatter;

// 重导出核心类型
pub use dto::{
    CombinedItemView, CombinedPalletView, ContainerView, PalletView, PlanRenderer, PlanView,
    SinglePalletView,
};
pub use formatter::{NumberFormatter, NOT_AVAILABLE};
