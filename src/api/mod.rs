// ==========================================
// 集装箱排载工具 - API 层
// ==========================================
// 职责: 面向嵌入方的业务接口(工作流编排/导出)
// ==========================================

pub mod error;
pub mod export_api;
pub mod workflow_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use export_api::{ExportApi, ExportApiResponse};
pub use workflow_api::{
    Applied, SchemaRefresh, SessionSnapshot, SubmitOutcome, WorkflowApi,
};
