// ==========================================
// 集装箱排载工具 - 应用层
// ==========================================
// 职责: 面向嵌入方的装配入口
// ==========================================

pub mod state;

// 重导出
pub use state::AppState;
