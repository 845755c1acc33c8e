// ==========================================
// 集装箱排载工具 - 领域模型层
// ==========================================
// 职责: 定义会话实体、结果模型、业务不变量
// 红线: 不含网络访问逻辑,不含渲染逻辑
// ==========================================

pub mod configuration;
pub mod loading;
pub mod types;
pub mod upload;

// 重导出核心类型
pub use configuration::{LoadConfiguration, DEFAULT_HEADER_ROW};
pub use loading::{
    CombinedItem, CombinedPallet, Container, LoadingPlan, PalletEntry, PlanInvariantError,
    SinglePallet, CONTAINER_CAPACITY_PALLETS, CONTAINER_CAPACITY_WEIGHT_KG, QUANTITY_EPSILON,
};
pub use types::{DisplayLocale, FileKind, FilterMatchMode, OperationKind, WorkflowStep};
pub use upload::{SheetSchema, UploadedFile};
