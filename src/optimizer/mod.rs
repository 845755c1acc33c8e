// ==========================================
// 集装箱排载工具 - 优化服务边界层
// ==========================================
// 职责: 外部优化服务的接口、报文与 HTTP 实现
// 红线: 工作流层只依赖 OptimizerService trait
// ==========================================

pub mod error;
pub mod http_service;
pub mod optimizer_service_trait;
pub mod wire;

// 重导出核心类型
pub use error::{OptimizerError, OptimizerResult};
pub use http_service::{HttpOptimizerService, OperationTimeouts};
pub use optimizer_service_trait::OptimizerService;
pub use wire::{ColumnsRequest, ExportRequest, ProcessRequest};
